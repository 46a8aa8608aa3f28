mod common;

use std::time::Duration;

use common::{conforming_json, FakeImages, Reply, ScriptedModel};
use nodes::{BackoffPolicy, ModelGateway, SeoReviewer};
use pipeline::{PromptTemplate, ReviewError, ReviewInput, SeoField};

fn input(image_url: &str) -> ReviewInput {
    ReviewInput {
        image_url: image_url.into(),
        subject: "cats".into(),
        style: "Kawaii".into(),
        medium: "Markers".into(),
        original_prompt: Some("a sleepy cat".into()),
    }
}

#[tokio::test]
async fn invalid_json_then_valid_json_returns_second_answer() {
    let model = ScriptedModel::new([
        Reply::Text("Sorry, here you go: {\"title\": ".into()),
        Reply::Text(conforming_json("Sleepy Cat Coloring Page")),
    ]);
    let reviewer = SeoReviewer::new(FakeImages::default(), model);

    let fields = reviewer.review(&input("https://cdn.test/cat.png")).await.unwrap();

    assert_eq!(fields.title, "Sleepy Cat Coloring Page");
    assert_eq!(reviewer.model().calls(), 2);
}

#[tokio::test]
async fn corrective_prompt_echoes_first_failure() {
    let model = ScriptedModel::new([
        Reply::Text("no json at all".into()),
        Reply::Text(conforming_json("Cat Page")),
    ]);
    let reviewer = SeoReviewer::new(FakeImages::default(), model)
        .with_template(PromptTemplate::from_text("Describe {{subject}}."));

    reviewer.review(&input("https://cdn.test/cat.png")).await.unwrap();

    let model = reviewer.model();
    assert_eq!(model.prompt(0), "Describe cats.");
    let second = model.prompt(1);
    assert!(second.starts_with("Describe cats.\n\nIMPORTANT: Your previous response was invalid"));
    assert!(second.contains("(Model did not return JSON.)"));
}

#[tokio::test]
async fn validation_failure_is_corrected_once() {
    let short = serde_json::json!({
        "title": "Cat",
        "description": "too short",
        "pinterest_title": "Cat",
        "pinterest_description": common::text_of(250),
        "prompt": "A cat."
    })
    .to_string();
    let model = ScriptedModel::new([Reply::Text(short), Reply::Text(conforming_json("Cat"))]);
    let reviewer = SeoReviewer::new(FakeImages::default(), model);

    let fields = reviewer.review(&input("https://cdn.test/cat.png")).await.unwrap();

    assert_eq!(fields.title, "Cat");
    assert!(reviewer.model().prompt(1).contains("SEO output validation failed"));
}

#[tokio::test]
async fn image_fetch_failure_is_fatal_without_model_calls() {
    let model = ScriptedModel::new([Reply::Text(conforming_json("Cat"))]);
    let reviewer = SeoReviewer::new(FakeImages::default(), model);

    let err = reviewer.review(&input("https://cdn.test/missing.png")).await.unwrap_err();

    assert!(matches!(err, ReviewError::ImageFetch { status: 404, .. }));
    assert_eq!(err.to_string(), "Failed to fetch image (404): Not Found");
    assert_eq!(reviewer.model().calls(), 0);
}

#[tokio::test]
async fn second_failure_propagates_unchanged() {
    let still_short = serde_json::json!({
        "title": "Cat",
        "description": "still too short",
        "pinterest_title": "Cat",
        "pinterest_description": common::text_of(250),
        "prompt": "A cat."
    })
    .to_string();
    let model = ScriptedModel::new([Reply::Text("nope".into()), Reply::Text(still_short)]);
    let reviewer = SeoReviewer::new(FakeImages::default(), model);

    let err = reviewer.review(&input("https://cdn.test/cat.png")).await.unwrap_err();

    match err {
        ReviewError::Validation(v) => {
            assert!(v.has_field(SeoField::Description));
            assert!(!v.has_field(SeoField::Title));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(reviewer.model().calls(), 2);
}

#[tokio::test]
async fn transport_failures_are_corrected_like_parse_failures() {
    let model = ScriptedModel::new([
        Reply::Fail("503 Service Unavailable".into()),
        Reply::Text(conforming_json("Cat")),
    ]);
    let reviewer = SeoReviewer::new(FakeImages::default(), model);

    assert!(reviewer.review(&input("https://cdn.test/cat.png")).await.is_ok());
    assert!(reviewer.model().prompt(1).contains("Vision model request failed: 503"));
}

#[tokio::test(start_paused = true)]
async fn gateway_retries_sit_inside_the_corrective_retry() {
    // Two transport failures are absorbed by the gateway; the garbled answer
    // then costs one corrective re-prompt.
    let model = ScriptedModel::new([
        Reply::Fail("503".into()),
        Reply::Fail("503".into()),
        Reply::Text("garbled".into()),
        Reply::Text(conforming_json("Cat")),
    ]);
    let policy = BackoffPolicy::new(3, Duration::from_millis(100), 2.0).unwrap();
    let images = FakeImages::default();
    let reviewer = SeoReviewer::new(images, ModelGateway::new(model, policy));

    let fields = reviewer.review(&input("https://cdn.test/cat.png")).await.unwrap();

    assert_eq!(fields.title, "Cat");
    assert_eq!(reviewer.model().inner().calls(), 4);
}
