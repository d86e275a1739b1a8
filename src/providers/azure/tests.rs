use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use crate::auth::Token;
use crate::error::AdoLensError;
use crate::providers::azure::AzurePipeline;
use crate::summary::BuildComparison;

const PROJECT: &str = "myproject";

fn build_body(id: u32, result: &str) -> String {
    json!({
        "id": id,
        "buildNumber": format!("20240731.{id}"),
        "status": "completed",
        "result": result,
        "sourceBranch": "refs/heads/main",
        "sourceVersion": "0f2c9a1d",
        "definition": { "id": 17, "name": "nightly" },
        "requestedBy": { "displayName": "Ada Lovelace", "uniqueName": "ada@example.com" }
    })
    .to_string()
}

fn timeline_body_with_failures() -> String {
    json!({
        "records": [
            { "id": "s1", "type": "Stage", "name": "Build" },
            { "id": "p1", "parentId": "s1", "type": "Phase", "name": "Build phase" },
            { "id": "j1", "parentId": "p1", "type": "Job", "name": "compile", "result": "failed" },
            {
                "id": "t1", "parentId": "j1", "type": "Task", "name": "cargo build",
                "result": "failed", "log": { "id": 5 },
                "issues": [ { "type": "error", "message": "build broke" } ]
            },
            { "id": "t2", "parentId": "j1", "type": "Task", "name": "checkout", "result": "succeeded" }
        ]
    })
    .to_string()
}

fn timeline_body_duplicate_task_names() -> String {
    json!({
        "records": [
            { "id": "s1", "type": "Stage", "name": "Build" },
            { "id": "j1", "parentId": "s1", "type": "Job", "name": "compile", "result": "failed" },
            { "id": "j2", "parentId": "s1", "type": "Job", "name": "unit-tests", "result": "failed" },
            {
                "id": "t1", "parentId": "j1", "type": "Task", "name": "run script",
                "result": "failed", "log": { "id": 5 }
            },
            {
                "id": "t2", "parentId": "j2", "type": "Task", "name": "run script",
                "result": "failed", "log": { "id": 6 }
            }
        ]
    })
    .to_string()
}

fn timeline_body_clean() -> String {
    json!({
        "records": [
            { "id": "s1", "type": "Stage", "name": "Build" },
            { "id": "j1", "parentId": "s1", "type": "Job", "name": "compile", "result": "succeeded" }
        ]
    })
    .to_string()
}

async fn mock_build(server: &mut ServerGuard, id: u32, result: &str) -> mockito::Mock {
    server
        .mock("GET", format!("/{PROJECT}/_apis/build/builds/{id}").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(build_body(id, result))
        .create_async()
        .await
}

async fn connect(server: &ServerGuard, build_id: u32) -> AzurePipeline {
    AzurePipeline::connect(&server.url(), PROJECT, build_id, None)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_connect_and_summary() {
    let mut server = Server::new_async().await;
    let _build = mock_build(&mut server, 42, "failed").await;

    let pipeline = connect(&server, 42).await;
    let summary = pipeline.summary();

    assert_eq!(summary.name, "nightly");
    assert_eq!(summary.build_id, 42);
    assert_eq!(summary.result, "failed");
    assert_eq!(summary.status, "completed");
    assert_eq!(summary.branch, "refs/heads/main");
    assert_eq!(summary.commit_id, "0f2c9a1d");
    assert_eq!(summary.triggered_by, "Ada Lovelace");
    // No web link in the payload, so the URL is constructed
    assert_eq!(
        summary.url,
        format!("{}/{PROJECT}/_build/results?buildId=42", server.url())
    );
}

#[tokio::test]
async fn test_connect_missing_build_is_not_found() {
    let mut server = Server::new_async().await;
    let _build = server
        .mock("GET", format!("/{PROJECT}/_apis/build/builds/999").as_str())
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message":"Build 999 was not found."}"#)
        .create_async()
        .await;

    let result = AzurePipeline::connect(&server.url(), PROJECT, 999, None).await;
    assert!(matches!(result, Err(AdoLensError::BuildNotFound(999))));
}

#[tokio::test]
async fn test_token_is_sent_as_basic_auth() {
    let mut server = Server::new_async().await;
    let _build = server
        .mock("GET", format!("/{PROJECT}/_apis/build/builds/42").as_str())
        .match_query(Matcher::Any)
        .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(build_body(42, "succeeded"))
        .create_async()
        .await;

    let pipeline = AzurePipeline::connect(
        &server.url(),
        PROJECT,
        42,
        Some(Token::from("secret-pat")),
    )
    .await;
    assert!(pipeline.is_ok());
}

#[tokio::test]
async fn test_failed_tasks_and_logs() {
    let mut server = Server::new_async().await;
    let _build = mock_build(&mut server, 42, "failed").await;
    let _timeline = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/42/timeline").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body_with_failures())
        .create_async()
        .await;
    let _log = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/42/logs/5").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "count": 2, "value": ["error[E0599]", "build failed"] }).to_string())
        .create_async()
        .await;

    let pipeline = connect(&server, 42).await;
    let timeline = pipeline.timeline(None).await.unwrap();

    let failed = pipeline.failed_tasks(&timeline);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].name.as_deref(), Some("cargo build"));

    let logs = pipeline.failed_task_logs(&timeline).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].task, "cargo build");
    assert_eq!(logs[0].parent_job.as_deref(), Some("compile"));
    assert_eq!(logs[0].issues, vec!["build broke".to_string()]);
    assert_eq!(
        logs[0].lines,
        vec!["error[E0599]".to_string(), "build failed".to_string()]
    );
}

#[tokio::test]
async fn test_failed_task_logs_keeps_same_named_tasks_from_different_jobs() {
    let mut server = Server::new_async().await;
    let _build = mock_build(&mut server, 42, "failed").await;
    let _timeline = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/42/timeline").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body_duplicate_task_names())
        .create_async()
        .await;
    let _compile_log = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/42/logs/5").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "count": 1, "value": ["compile output"] }).to_string())
        .create_async()
        .await;
    let _test_log = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/42/logs/6").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "count": 1, "value": ["test output"] }).to_string())
        .create_async()
        .await;

    let pipeline = connect(&server, 42).await;
    let timeline = pipeline.timeline(None).await.unwrap();
    let logs = pipeline.failed_task_logs(&timeline).await.unwrap();

    // Same-named tasks under different jobs must both survive
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|log| log.task == "run script"));

    let parents: Vec<_> = logs
        .iter()
        .map(|log| log.parent_job.as_deref().unwrap())
        .collect();
    assert_eq!(parents, vec!["compile", "unit-tests"]);

    assert_eq!(logs[0].lines, vec!["compile output".to_string()]);
    assert_eq!(logs[1].lines, vec!["test output".to_string()]);
}

#[tokio::test]
async fn test_failed_jobs_grouped_by_stage() {
    let mut server = Server::new_async().await;
    let _build = mock_build(&mut server, 42, "failed").await;
    let _timeline = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/42/timeline").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body_with_failures())
        .create_async()
        .await;

    let pipeline = connect(&server, 42).await;
    let failed = pipeline.failed_jobs(None).await.unwrap();

    assert_eq!(failed.stages.len(), 1);
    assert_eq!(failed.stages["Build"], vec!["compile".to_string()]);
}

#[tokio::test]
async fn test_previous_build_walks_newest_first_list() {
    let mut server = Server::new_async().await;
    let _build = mock_build(&mut server, 42, "failed").await;
    let _builds = server
        .mock("GET", format!("/{PROJECT}/_apis/build/builds").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("definitions".into(), "17".into()),
            Matcher::UrlEncoded("queryOrder".into(), "startTimeDescending".into()),
            Matcher::UrlEncoded("branchName".into(), "refs/heads/main".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "count": 3,
                "value": [
                    serde_json::from_str::<serde_json::Value>(&build_body(42, "failed")).unwrap(),
                    serde_json::from_str::<serde_json::Value>(&build_body(41, "succeeded")).unwrap(),
                    serde_json::from_str::<serde_json::Value>(&build_body(40, "succeeded")).unwrap(),
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let pipeline = connect(&server, 42).await;
    assert_eq!(pipeline.previous_build().await.unwrap(), Some(41));
}

#[tokio::test]
async fn test_compare_builds_repeated_failure() {
    let mut server = Server::new_async().await;
    let _build = mock_build(&mut server, 42, "failed").await;
    let _curr = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/42/timeline").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body_with_failures())
        .create_async()
        .await;
    let _prev = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/41/timeline").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body_with_failures())
        .create_async()
        .await;

    let pipeline = connect(&server, 42).await;
    let verdict = pipeline.compare_builds(Some(41), None).await.unwrap();
    assert_eq!(verdict, Some(BuildComparison::RepeatedFailure));
}

#[tokio::test]
async fn test_compare_builds_back_to_normal() {
    let mut server = Server::new_async().await;
    let _build = mock_build(&mut server, 42, "succeeded").await;
    let _curr = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/42/timeline").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body_clean())
        .create_async()
        .await;
    let _prev = server
        .mock(
            "GET",
            format!("/{PROJECT}/_apis/build/builds/41/timeline").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(timeline_body_with_failures())
        .create_async()
        .await;

    let pipeline = connect(&server, 42).await;
    let verdict = pipeline.compare_builds(Some(41), None).await.unwrap();
    assert_eq!(verdict, Some(BuildComparison::BackToNormal));
}
