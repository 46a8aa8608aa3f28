//! Boundary-aware text shaping.
//!
//! Lengths and cut positions are measured in `char`s, never bytes, so a cut
//! can not land inside a multi-byte character.
//!
//! Both truncators refuse to cut at a boundary that sits at or before 60% of
//! the limit; below that they would throw most of the text away, so the word
//! truncator falls back to a hard cut instead.

/// Sentence terminators followed by a space, searched by [`truncate_to_sentence`].
const SENTENCE_ENDINGS: [&str; 3] = [". ", "! ", "? "];

/// Index (in chars) a boundary must exceed to be used: `floor(max_len * 0.6)`.
fn min_boundary(max_len: usize) -> usize {
    max_len * 3 / 5
}

/// Returns the longest prefix of `s` holding at most `n` chars.
fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Collapses every run of whitespace to a single space and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shrinks `text` to at most `max_len` chars, cutting at the last space when
/// that space lies past 60% of the limit and hard-cutting otherwise.
///
/// Text that already fits is returned trimmed and otherwise unchanged.
pub fn truncate_at_word(text: &str, max_len: usize) -> String {
    let t = text.trim();
    if char_len(t) <= max_len {
        return t.to_string();
    }

    let prefix = char_prefix(t, max_len);
    match prefix.rfind(' ') {
        Some(space) if char_len(&prefix[..space]) > min_boundary(max_len) => {
            prefix[..space].trim().to_string()
        }
        _ => prefix.trim().to_string(),
    }
}

/// Shrinks `text` to at most `max_len` chars, preferring to end on a complete
/// sentence.
///
/// Looks for the last `". "`, `"! "` or `"? "` inside the first `max_len`
/// chars and keeps everything up to and including the terminator when it
/// lies past 60% of the limit. Otherwise behaves like [`truncate_at_word`].
pub fn truncate_to_sentence(text: &str, max_len: usize) -> String {
    let t = text.trim();
    if char_len(t) <= max_len {
        return t.to_string();
    }

    let prefix = char_prefix(t, max_len);
    let last_end = SENTENCE_ENDINGS
        .iter()
        .filter_map(|ending| prefix.rfind(ending))
        .max();

    match last_end {
        // Terminators are ASCII, so `end + 1` is a char boundary.
        Some(end) if char_len(&prefix[..end]) > min_boundary(max_len) => {
            t[..end + 1].trim().to_string()
        }
        _ => truncate_at_word(t, max_len),
    }
}

/// Splits text into sentences at whitespace that follows `.`, `!` or `?`.
///
/// Terminators stay attached to their sentence; the separating whitespace is
/// dropped. Text without terminators comes back as a single sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let t = text.trim();
    if t.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev = None;
    let mut chars = t.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            sentences.push(&t[start..idx]);
            while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
            // `t` is trimmed, so a non-whitespace char always follows.
            start = chars.peek().map_or(t.len(), |&(i, _)| i);
            prev = None;
            continue;
        }
        prev = Some(ch);
    }
    sentences.push(&t[start..]);
    sentences
}
