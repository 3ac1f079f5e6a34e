//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the hub APIs and drive the full
//! resolve -> fetch -> sink cycle end-to-end.

use oslm_crawler::config::{Config, RetryConfig};
use oslm_crawler::crawler::{plan_crawl, run_crawl};
use oslm_crawler::output::{error_log_path, output_log_path, read_records};
use oslm_crawler::target::{ResolveRequest, SkipSet, TargetKind};
use oslm_crawler::{Category, FetchResult, Platform};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORGS: &str = r#"
[[orgs]]
org = "Acme"
type = "company"
country = "Nowhere"
hf_accounts = ["acme"]
ms_accounts = ["acme"]
"#;

/// Creates a configuration pointing at the mock server with near-zero backoff
fn create_test_config(endpoint: &str, workspace: &Path, max_attempts: u32) -> Config {
    let orgs_path = workspace.join("orgs.toml");
    std::fs::write(&orgs_path, ORGS).expect("Failed to write org directory");

    let mut config = Config::default();
    config.retry = RetryConfig {
        max_attempts,
        multiplier_ms: 1,
        min_wait_ms: 0,
        max_wait_ms: 1,
    };
    config.hub.endpoint = Some(endpoint.to_string());
    config.output.root = workspace.join("data");
    config.output.orgs_path = Some(orgs_path);
    config
}

/// Answers every discussion listing with an empty page
async fn mount_no_discussions(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/(models|datasets)/[^/]+/[^/]+/discussions$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"discussions":[],"count":0,"start":0}"#),
        )
        .mount(server)
        .await;
}

fn records(path: &Path) -> Vec<FetchResult> {
    read_records(path).expect("Failed to read records")
}

#[tokio::test]
async fn test_account_crawl_writes_every_item() {
    let server = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), workspace.path(), 2);

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .and(query_param("author", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"id":"acme/m1","downloads":10,"likes":1},
                {"id":"acme/m2","downloads":"1.5k","likes":2},
                {"id":"acme/m3","downloads":0,"likes":0}]"#,
        ))
        .mount(&server)
        .await;
    mount_no_discussions(&server).await;

    let request = ResolveRequest::new("acme", Platform::Huggingface, Category::Model);
    let report = run_crawl(&config, &request).await.unwrap();

    assert_eq!(report.sources, 1);
    assert_eq!(report.successes, 3);
    assert_eq!(report.failures, 0);
    assert!(report
        .output_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("huggingface_"));

    let written = records(&output_log_path(&report.output_dir, Category::Model));
    assert_eq!(written.len(), 3);
    let m2 = written.iter().find(|r| r.name == "m2").unwrap();
    assert_eq!(m2.repo, "acme");
    assert_eq!(m2.downloads, Some(1500));
    assert_eq!(m2.discussion_count, Some(0));
    assert_eq!(
        m2.link.as_deref(),
        Some(format!("{}/acme/m2", server.uri()).as_str())
    );
    assert!(!error_log_path(&report.output_dir, Category::Model).exists());
}

#[tokio::test]
async fn test_long_listed_id_does_not_abort_crawl() {
    let server = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), workspace.path(), 1);

    let author = "a".repeat(20);
    let long_name = "b".repeat(80);
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .and(query_param("author", author.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"[{{"id":"{a}/ok"}},{{"id":"{a}/{n}"}},{{"id":"{a}/after"}}]"#,
            a = author,
            n = long_name
        )))
        .mount(&server)
        .await;
    mount_no_discussions(&server).await;

    let request = ResolveRequest::new(author.as_str(), Platform::Huggingface, Category::Model);
    let report = run_crawl(&config, &request).await.unwrap();

    assert_eq!(report.successes, 3);
    assert_eq!(report.failures, 0);
    let written = records(&output_log_path(&report.output_dir, Category::Model));
    assert!(written.iter().any(|r| r.name == long_name));
    assert!(written.iter().any(|r| r.name == "after"));

    let single = ResolveRequest::new(
        format!("id:{}/{}", author, long_name),
        Platform::Huggingface,
        Category::Model,
    );
    assert!(plan_crawl(&config, &single).is_ok());
}

#[tokio::test]
async fn test_failed_item_is_resumed() {
    let server = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), workspace.path(), 2);

    Mock::given(method("GET"))
        .and(path("/api/models/acme/flaky"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(2)
        .mount(&server)
        .await;

    let request = ResolveRequest::new("id:acme/flaky", Platform::Huggingface, Category::Model);
    let report = run_crawl(&config, &request).await.unwrap();

    // Exhausted retries are recorded, not fatal
    assert_eq!(report.successes, 0);
    assert_eq!(report.failures, 1);
    let err_path = error_log_path(&report.output_dir, Category::Model);
    let failed = records(&err_path);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].name, "flaky");
    assert!(failed[0].error.as_deref().unwrap().contains("503"));
    server.verify().await;

    // The hub recovers; resuming from the output directory retries the item in place
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/models/acme/flaky"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"id":"acme/flaky","downloads":7,"likes":3}"#),
        )
        .mount(&server)
        .await;
    mount_no_discussions(&server).await;

    let resume = ResolveRequest::new(
        report.output_dir.to_string_lossy(),
        Platform::Huggingface,
        Category::Model,
    );
    let plan = plan_crawl(&config, &resume).unwrap();
    assert_eq!(plan.kind, TargetKind::Resume);
    assert_eq!(plan.sources.len(), 1);
    assert_eq!(plan.sources[0].org, "Acme");

    let resumed = run_crawl(&config, &resume).await.unwrap();
    assert_eq!(resumed.output_dir, report.output_dir);
    assert_eq!(resumed.successes, 1);
    assert_eq!(resumed.failures, 0);
    assert!(!err_path.exists());

    let written = records(&output_log_path(&report.output_dir, Category::Model));
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].downloads, Some(7));

    // Nothing left to do
    let again = run_crawl(&config, &resume).await.unwrap();
    assert_eq!(again.total(), 0);
}

#[tokio::test]
async fn test_discussion_counts() {
    let server = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), workspace.path(), 1);

    Mock::given(method("GET"))
        .and(path("/api/datasets/acme/corpus"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"id":"acme/corpus","downloads":100,"likes":5}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/acme/corpus/discussions"))
        .and(query_param("p", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"discussions":[{"num":1},{"num":2}],"count":2,"start":0}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/acme/corpus/discussions/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"events":[{},{},{}]}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/acme/corpus/discussions/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"events":[{}]}"#))
        .mount(&server)
        .await;

    let request = ResolveRequest::new("id:acme/corpus", Platform::Huggingface, Category::Dataset);
    let report = run_crawl(&config, &request).await.unwrap();

    let written = records(&output_log_path(&report.output_dir, Category::Dataset));
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].discussion_count, Some(2));
    assert_eq!(written[0].discussion_message_count, Some(4));
    assert_eq!(
        written[0].link.as_deref(),
        Some(format!("{}/datasets/acme/corpus", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_modelscope_org_config() {
    let server = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), workspace.path(), 1);

    let target = workspace.path().join("crawl-orgs.toml");
    std::fs::write(
        &target,
        r#"
[[orgs]]
org = "Acme"
ms_accounts = ["acme"]

[[orgs]]
org = "Skipped"
ms_accounts = ["other"]
"#,
    )
    .unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"Success":true,"Data":{"Models":[
                {"Name":"m1","Path":"acme","Downloads":12,"Stars":1},
                {"Name":"m2","Path":"acme","Downloads":"3,400","Stars":2}
            ],"TotalCount":2}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = ResolveRequest::new(
        target.to_string_lossy(),
        Platform::ModelScope,
        Category::Model,
    )
    .with_skip(SkipSet::parse(["org:Skipped"]));
    let report = run_crawl(&config, &request).await.unwrap();

    assert_eq!(report.sources, 1);
    assert_eq!(report.successes, 2);
    assert!(report
        .output_dir
        .ends_with(format!("modelscope_{}", oslm_crawler::model::today())));

    let written = records(&output_log_path(&report.output_dir, Category::Model));
    let m2 = written.iter().find(|r| r.name == "m2").unwrap();
    assert_eq!(m2.downloads, Some(3400));
    assert_eq!(m2.discussion_count, None);
    assert_eq!(
        m2.link.as_deref(),
        Some(format!("{}/models/acme/m2", server.uri()).as_str())
    );
    server.verify().await;
}

#[tokio::test]
async fn test_plan_creates_nothing() {
    let server = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), workspace.path(), 1);

    let request = ResolveRequest::new("acme", Platform::Huggingface, Category::Model);
    let plan = plan_crawl(&config, &request).unwrap();

    assert_eq!(plan.kind, TargetKind::Account);
    assert_eq!(plan.sources[0].org, "Acme");
    assert!(!plan.output_dir.exists());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_identifier_is_fatal() {
    let server = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), workspace.path(), 1);

    let request = ResolveRequest::new("id:acme", Platform::Huggingface, Category::Model);
    let result = run_crawl(&config, &request).await;

    assert!(matches!(
        result,
        Err(oslm_crawler::CrawlError::InvalidIdentifier(_))
    ));
    assert!(!workspace.path().join("data").exists());
}
