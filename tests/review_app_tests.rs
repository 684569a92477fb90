mod common;

use common::{FakeDeploy, FakeSourceControl, Harness, WEBHOOK_SECRET};
use releasebot::api::handler::handle_request;
use releasebot::api::signature::compute_github_signature;
use releasebot::features::review_apps::{ReviewAppOutcome, parse_pull_request_event};
use serde_json::{Value, json};

fn pull_request_payload(action: &str, repo: &str, fork: bool, labels: &[&str]) -> Value {
    json!({
        "action": action,
        "number": 12,
        "pull_request": {
            "head": {
                "ref": "feature/login",
                "repo": { "name": repo, "fork": fork }
            },
            "labels": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>()
        }
    })
}

fn webhook_request(event: &str, body: &str, signature: Option<String>) -> Value {
    let mut headers = json!({ "X-GitHub-Event": event });
    if let Some(signature) = signature {
        headers["X-Hub-Signature-256"] = Value::String(signature);
    }
    json!({
        "rawPath": "/github/webhook",
        "headers": headers,
        "body": body
    })
}

fn signed_webhook(event: &str, body: &str) -> Value {
    webhook_request(
        event,
        body,
        Some(compute_github_signature(WEBHOOK_SECRET, body.as_bytes())),
    )
}

async fn run(harness: &Harness, payload: &Value) -> Result<ReviewAppOutcome, releasebot::BotError> {
    let event = parse_pull_request_event(payload)?;
    harness.bot.review_app_binder().on_pull_request_event(&event).await
}

#[tokio::test]
async fn test_unbound_repository_makes_no_calls() {
    let harness = Harness::new();
    let outcome = run(&harness, &pull_request_payload("opened", "other-repo", false, &[]))
        .await
        .unwrap();

    assert_eq!(outcome, ReviewAppOutcome::NotConfigured);
    assert_eq!(outcome.to_string(), "No RA configured for this repository");
    assert!(harness.deploy.calls().is_empty());
    assert!(harness.source_control.comments().is_empty());
}

#[tokio::test]
async fn test_fork_makes_no_calls() {
    let harness = Harness::new();
    let outcome = run(&harness, &pull_request_payload("opened", "pix-site", true, &[]))
        .await
        .unwrap();

    assert_eq!(outcome, ReviewAppOutcome::NoReviewAppForFork);
    assert_eq!(outcome.to_string(), "No RA for a fork");
    assert!(harness.deploy.calls().is_empty());
}

#[tokio::test]
async fn test_deleted_head_repository_is_treated_as_fork() {
    let harness = Harness::new();
    let payload = json!({
        "action": "opened",
        "number": 12,
        "pull_request": { "head": { "ref": "feature/login", "repo": null } }
    });

    let outcome = run(&harness, &payload).await.unwrap();
    assert_eq!(outcome, ReviewAppOutcome::NoReviewAppForFork);
    assert!(harness.deploy.calls().is_empty());
}

#[tokio::test]
async fn test_no_review_app_label_makes_no_calls() {
    let harness = Harness::new();
    let outcome = run(
        &harness,
        &pull_request_payload("opened", "pix-site", false, &["team-x", "no-review-app"]),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ReviewAppOutcome::DisabledByLabel);
    assert_eq!(outcome.to_string(), "RA disabled for this PR");
    assert!(harness.deploy.calls().is_empty());
    assert!(harness.source_control.comments().is_empty());
}

#[tokio::test]
async fn test_label_also_blocks_redeploy() {
    let harness = Harness::new();
    let outcome = run(
        &harness,
        &pull_request_payload("synchronize", "pix-site", false, &["no-review-app"]),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ReviewAppOutcome::DisabledByLabel);
    assert!(harness.deploy.calls().is_empty());
}

#[tokio::test]
async fn test_opened_creates_review_apps_and_comments_once() {
    let harness = Harness::new();
    let outcome = run(&harness, &pull_request_payload("opened", "pix-site", false, &[]))
        .await
        .unwrap();

    assert_eq!(
        harness.deploy.calls(),
        vec![
            "review_app pix-site-review 12".to_string(),
            "review_app pix-pro-review 12".to_string(),
        ]
    );
    assert_eq!(
        outcome.to_string(),
        "Created RA on app pix-site-review, pix-pro-review with pr 12"
    );

    let comments = harness.source_control.comments();
    assert_eq!(comments.len(), 1);
    let (repository, pull_request_id, comment) = &comments[0];
    assert_eq!(repository, "pix-site");
    assert_eq!(*pull_request_id, 12);
    assert!(comment.contains("https://pix-site-review-pr12.review.pix.fr"));
    assert!(comment.contains(
        "https://dashboard.scalingo.com/apps/osc-fr1/pix-site-review-pr12/environment"
    ));
    assert!(comment.contains("#12"));
    assert!(!comment.contains("{{"));
}

#[tokio::test]
async fn test_first_creation_failure_aborts_remaining() {
    let deploy = FakeDeploy {
        failing_app: Some("pix-site-review".to_string()),
        ..FakeDeploy::default()
    };
    let harness = Harness::with(FakeSourceControl::default(), deploy, Default::default());

    let result = run(&harness, &pull_request_payload("opened", "pix-site", false, &[])).await;

    assert!(result.is_err());
    assert_eq!(harness.deploy.calls(), vec!["review_app pix-site-review 12".to_string()]);
    assert!(harness.source_control.comments().is_empty());
}

#[tokio::test]
async fn test_synchronize_redeploys_each_review_app_from_head_ref() {
    let harness = Harness::new();
    let outcome = run(&harness, &pull_request_payload("synchronize", "pix-site", false, &[]))
        .await
        .unwrap();

    assert_eq!(
        harness.deploy.calls(),
        vec![
            "scm pix-site-review-pr12 feature/login".to_string(),
            "scm pix-pro-review-pr12 feature/login".to_string(),
        ]
    );
    assert_eq!(
        outcome.to_string(),
        "Triggered deployment of RA on app pix-site-review, pix-pro-review with pr 12"
    );
    assert!(harness.source_control.comments().is_empty());
}

#[tokio::test]
async fn test_other_actions_are_ignored() {
    let harness = Harness::new();
    let outcome = run(&harness, &pull_request_payload("closed", "pix-site", false, &[]))
        .await
        .unwrap();

    assert_eq!(outcome.to_string(), "Ignoring closed action");
    assert!(harness.deploy.calls().is_empty());
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature_before_any_call() {
    let harness = Harness::new();
    let body = pull_request_payload("opened", "pix-site", false, &[]).to_string();

    let unsigned = handle_request(&harness.bot, &webhook_request("pull_request", &body, None)).await;
    assert_eq!(unsigned["statusCode"], 401);

    let forged = webhook_request(
        "pull_request",
        &body,
        Some(compute_github_signature("wrong", body.as_bytes())),
    );
    let response = handle_request(&harness.bot, &forged).await;
    assert_eq!(response["statusCode"], 401);
    assert!(harness.deploy.calls().is_empty());
}

#[tokio::test]
async fn test_webhook_ignores_non_pull_request_events() {
    let harness = Harness::new();
    let response = handle_request(&harness.bot, &signed_webhook("push", "{}")).await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["body"], "Ignoring push event");
    assert!(harness.deploy.calls().is_empty());
}

#[tokio::test]
async fn test_webhook_opened_pull_request_end_to_end() {
    let harness = Harness::new();
    let body = pull_request_payload("opened", "pix-site", false, &[]).to_string();
    let response = handle_request(&harness.bot, &signed_webhook("pull_request", &body)).await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(
        response["body"],
        "Created RA on app pix-site-review, pix-pro-review with pr 12"
    );
    assert_eq!(harness.deploy.calls().len(), 2);
    assert_eq!(harness.source_control.comments().len(), 1);
}

#[tokio::test]
async fn test_webhook_deploy_failure_maps_to_bad_gateway() {
    let deploy = FakeDeploy {
        failing_app: Some("pix-pro-review".to_string()),
        ..FakeDeploy::default()
    };
    let harness = Harness::with(FakeSourceControl::default(), deploy, Default::default());
    let body = pull_request_payload("opened", "pix-site", false, &[]).to_string();

    let response = handle_request(&harness.bot, &signed_webhook("pull_request", &body)).await;

    assert_eq!(response["statusCode"], 502);
    assert_eq!(harness.deploy.calls().len(), 2);
    assert!(harness.source_control.comments().is_empty());
}

#[tokio::test]
async fn test_webhook_malformed_payload_is_bad_request() {
    let harness = Harness::new();
    let body = r#"{"action":"opened"}"#;
    let response = handle_request(&harness.bot, &signed_webhook("pull_request", body)).await;

    assert_eq!(response["statusCode"], 400);
}
