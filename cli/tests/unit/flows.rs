//! End-to-end driver tests over the scripted CLI: provision, feature, sync.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use fabric_deploy::application::services::dev_sync::{sync_dev_workspaces, sync_targets};
use fabric_deploy::application::services::feature::{FeatureRequest, create_feature_workspaces};
use fabric_deploy::application::services::provision::provision_solution;
use fabric_deploy::domain::api::CliReply;
use fabric_deploy::domain::config::{Pacing, SolutionConfig};
use fabric_deploy::domain::permissions::{Permission, WorkspaceRole};
use fabric_deploy::domain::report::{RunReport, Step};
use fabric_deploy::infra::config::parse_solution;
use serde_json::json;

use crate::helpers::{FakeFabric, Recorder, WS_ID, api, blank, exit, ok, session};

const ENG: &str = "aaaaaaaa-0000-0000-0000-000000000001";
const HASH: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

fn solution(capacities: &str, workspaces: &str) -> SolutionConfig {
    let text = format!(
        r"
solution_version: av01
azure:
  subscription_id: sub-1
  capacity_defaults:
    resource_group: rg-fabric
    region: westeurope
    sku: F2
  security_groups:
    Eng: {ENG}
github:
  organization: contoso
  repository: analytics
capacities: {capacities}
workspaces: {workspaces}
"
    );
    parse_solution(&text, "test.yml", |_| None::<String>).unwrap()
}

fn steps(report: &RunReport) -> Vec<(String, Step, bool)> {
    report
        .results
        .iter()
        .map(|r| (r.unit.clone(), r.step, r.ok))
        .collect()
}

fn position(fake: &FakeFabric, fragment: &str) -> usize {
    fake.calls()
        .iter()
        .position(|c| c.contains(fragment))
        .unwrap_or_else(|| panic!("no call matching {fragment}"))
}

fn last_position(fake: &FakeFabric, fragment: &str) -> usize {
    fake.calls()
        .iter()
        .rposition(|c| c.contains(fragment))
        .unwrap_or_else(|| panic!("no call matching {fragment}"))
}

// ── provision ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn provision_creates_missing_capacity_then_suspends_it() {
    let config = solution("[{name: fc01}]", "[]");
    let fake = FakeFabric::new()
        .on("api get /subscriptions", [api(404, json!({}))])
        .on("api put /subscriptions", [api(201, json!({}))])
        .on("/suspend", [api(202, json!({}))]);
    let rec = Recorder::new();
    let pacing = Pacing::default();

    let report = provision_solution(&session(&fake, &rec, &pacing), &config, None).await;

    assert_eq!(fake.count("api put"), 1);
    assert_eq!(fake.count("/resume"), 0);
    assert_eq!(
        rec.waits(),
        vec![Duration::from_secs(40), Duration::from_secs(20)]
    );
    assert!(fake.calls().last().unwrap().contains("/suspend"));
    assert_eq!(
        steps(&report),
        vec![
            ("fc01".to_string(), Step::Capacity, true),
            ("fc01".to_string(), Step::Suspend, true),
        ]
    );
    assert!(report.is_clean());
    assert!(report.finished_at.is_some());
}

#[tokio::test]
async fn provision_runs_full_workspace_pipeline() {
    let config = solution(
        "[]",
        "[{name: av01-dev-processing, capacity: fc01, permissions: [{group: Eng, role: Admin}], connect_to_git_folder: solution/processing/}]",
    );
    let fake = FakeFabric::new()
        .on("ls av01-dev-processing.Workspace", [exit(1, "not found")])
        .on("create ", [ok("")])
        .on("-q id", [ok(WS_ID)])
        .on(
            "roleAssignments",
            [api(200, json!({"value": [{"principal": {"id": ENG}, "role": "Admin"}]}))],
        )
        .on(
            "api get connections",
            [api(200, json!({"value": [{"id": "c-1", "displayName": "GitHub-contoso-analytics"}]}))],
        )
        .on(
            "git/status",
            [
                api(400, json!({"errorCode": "WorkspaceNotConnectedToGit"})),
                api(200, json!({"remoteCommitHash": HASH})),
            ],
        )
        .on("git/connect", [api(200, json!({}))])
        .on("git/updateFromGit", [api(202, json!({}))]);
    let rec = Recorder::new();
    let pacing = Pacing::default();

    let report = provision_solution(&session(&fake, &rec, &pacing), &config, None).await;

    let ws = "av01-dev-processing".to_string();
    assert_eq!(
        steps(&report),
        vec![
            (ws.clone(), Step::Workspace, true),
            (ws.clone(), Step::Permissions, true),
            (ws.clone(), Step::GitConnect, true),
            (ws, Step::GitUpdate, true),
        ]
    );
    assert_eq!(fake.count("api post workspaces"), 2);
    assert_eq!(fake.count("initializeConnection"), 0);
    assert_eq!(
        rec.waits(),
        vec![Duration::from_secs(5), Duration::from_secs(10)]
    );
}

#[tokio::test]
async fn provision_continues_after_a_failed_workspace() {
    let config = solution(
        "[]",
        "[{name: ws-a, capacity: fc01}, {name: ws-b, capacity: fc01}]",
    );
    let fake = FakeFabric::new()
        .on("ls ws-a", [exit(1, "")])
        .on("create ws-a", [exit(1, "capacity paused")])
        .on("ls ws-b", [ok("")])
        .on("get ws-b", [ok(WS_ID)]);
    let rec = Recorder::new();
    let pacing = Pacing::default();

    let report = provision_solution(&session(&fake, &rec, &pacing), &config, None).await;

    assert_eq!(
        steps(&report),
        vec![
            ("ws-a".to_string(), Step::Workspace, false),
            ("ws-b".to_string(), Step::Workspace, true),
        ]
    );
    assert!(report.results[0].detail.contains("capacity paused"));
}

#[tokio::test]
async fn unresolved_workspace_id_skips_later_steps() {
    let config = solution(
        "[]",
        "[{name: ws-a, capacity: fc01, permissions: [{group: Eng, role: Admin}], connect_to_git_folder: d/}]",
    );
    let fake = FakeFabric::new()
        .on("ls ", [exit(1, "")])
        .on("create ", [ok("")])
        .on("-q id", [ok("None")]);
    let rec = Recorder::new();
    let pacing = Pacing::default();

    let report = provision_solution(&session(&fake, &rec, &pacing), &config, None).await;

    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].ok);
    assert!(report.results[0].detail.contains("id unresolved"));
    assert_eq!(fake.count("api "), 0);
}

#[tokio::test]
async fn git_folder_without_github_section_is_a_failure() {
    let mut config = solution("[]", "[{name: ws-a, capacity: fc01, connect_to_git_folder: d/}]");
    config.github = None;
    let fake = FakeFabric::new()
        .on("ls ", [ok("")])
        .on("-q id", [ok(WS_ID)]);
    let rec = Recorder::new();
    let pacing = Pacing::default();

    let report = provision_solution(&session(&fake, &rec, &pacing), &config, None).await;

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.step, Step::GitConnect);
    assert_eq!(fake.count("api "), 0);
}

#[tokio::test]
async fn missing_token_fails_connection_step_only_for_git_workspaces() {
    let config = solution(
        "[]",
        "[{name: ws-a, capacity: fc01, connect_to_git_folder: d/}, {name: ws-b, capacity: fc01}]",
    );
    let fake = FakeFabric::new()
        .on("ls ", [ok("")])
        .on("-q id", [ok(WS_ID)])
        .on("api get connections", [api(200, json!({"value": []}))]);
    let rec = Recorder::new();
    let pacing = Pacing::default();

    let report = provision_solution(&session(&fake, &rec, &pacing), &config, None).await;

    assert_eq!(
        steps(&report),
        vec![
            ("ws-a".to_string(), Step::Workspace, true),
            ("ws-a".to_string(), Step::Connection, false),
            ("ws-b".to_string(), Step::Workspace, true),
        ]
    );
    assert_eq!(fake.count("api post"), 0);
}

// ── feature ──────────────────────────────────────────────────────────────────

fn feature_fake() -> FakeFabric {
    feature_fake_initializing(api(202, json!({})))
}

fn feature_fake_initializing(initialize: CliReply) -> FakeFabric {
    FakeFabric::new()
        .on("ls ", [exit(1, "")])
        .on("create ", [ok("")])
        .on("-q id", [ok(WS_ID)])
        .on(
            "roleAssignments",
            [api(200, json!({"value": [{"principal": {"id": ENG}, "role": "Admin"}]}))],
        )
        .on(
            "api get connections",
            [api(200, json!({"value": [{"id": "c-1", "displayName": "GitHub-contoso-analytics"}]}))],
        )
        .on(
            "git/status",
            [
                api(400, json!({})),
                api(200, json!({"remoteCommitHash": HASH})),
                api(400, json!({})),
                api(200, json!({"remoteCommitHash": HASH})),
            ],
        )
        .on("git/connect", [api(200, json!({}))])
        .on("git/initializeConnection", [initialize])
        .on("git/updateFromGit", [api(202, json!({}))])
        .on("/resume", [api(202, json!({}))])
        .on("/suspend", [api(202, json!({}))])
}

#[tokio::test]
async fn feature_resumes_shared_capacity_once_and_suspends_last() {
    let config = solution("[]", "[]");
    let fake = feature_fake();
    let rec = Recorder::new();
    let pacing = Pacing::default();
    let types = vec!["processing".to_string(), "datastores".to_string()];
    let request = FeatureRequest {
        branch: "feature-x",
        types: &types,
        grant: Permission {
            group: "Eng".into(),
            role: WorkspaceRole::Admin,
        },
        git_token: None,
    };

    let report = create_feature_workspaces(&session(&fake, &rec, &pacing), &config, &request).await;

    assert!(report.is_clean(), "{:?}", report.results);
    assert_eq!(fake.count("/resume"), 1);
    assert!(fake.calls()[position(&fake, "/resume")].contains("fcav01devengineering"));
    assert_eq!(fake.count("/suspend"), 1);
    assert!(last_position(&fake, "/suspend") > last_position(&fake, "git/updateFromGit"));
    assert!(position(&fake, "/resume") < position(&fake, "create "));
    assert_eq!(fake.count("git/initializeConnection"), 2);
    assert!(
        fake.calls()
            .contains(&"create av01-feature-x-processing.Workspace -P capacityname=fcav01devengineering".to_string())
    );

    let connect = fake.body_of("git/connect").unwrap();
    assert_eq!(connect["gitProviderDetails"]["branchName"], "feature-x");
    assert_eq!(connect["gitProviderDetails"]["directoryName"], "solution/processing/");
}

#[tokio::test]
async fn feature_blank_initialize_reply_counts_as_accepted() {
    let config = solution("[]", "[]");
    let fake = feature_fake_initializing(blank());
    let rec = Recorder::new();
    let pacing = Pacing::default();
    let types = vec!["processing".to_string()];
    let request = FeatureRequest {
        branch: "feature-x",
        types: &types,
        grant: Permission {
            group: "Eng".into(),
            role: WorkspaceRole::Admin,
        },
        git_token: None,
    };

    let report = create_feature_workspaces(&session(&fake, &rec, &pacing), &config, &request).await;

    assert!(report.is_clean(), "{:?}", report.results);
    assert!(steps(&report).contains(&(
        "av01-feature-x-processing".to_string(),
        Step::GitInitialize,
        true
    )));
    assert_eq!(fake.count("git/updateFromGit"), 1);
}

#[tokio::test]
async fn feature_unknown_type_is_recorded_without_calls() {
    let config = solution("[]", "[]");
    let fake = feature_fake();
    let rec = Recorder::new();
    let pacing = Pacing::default();
    let types = vec!["reporting".to_string()];
    let request = FeatureRequest {
        branch: "feature-x",
        types: &types,
        grant: Permission {
            group: "Eng".into(),
            role: WorkspaceRole::Admin,
        },
        git_token: None,
    };

    let report = create_feature_workspaces(&session(&fake, &rec, &pacing), &config, &request).await;

    assert_eq!(
        steps(&report),
        vec![("av01-feature-x-reporting".to_string(), Step::Workspace, false)]
    );
    assert!(fake.calls().is_empty());
    assert!(rec.waits().is_empty());
}

// ── sync ─────────────────────────────────────────────────────────────────────

#[test]
fn sync_targets_are_dev_workspaces_with_a_folder() {
    let config = solution(
        "[]",
        "[{name: av01-dev-processing, capacity: c, connect_to_git_folder: d/}, {name: av01-dev-loose, capacity: c}, {name: av01-prd-processing, capacity: c, connect_to_git_folder: d/}]",
    );
    let names: Vec<&str> = sync_targets(&config).iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["av01-dev-processing"]);
}

#[tokio::test]
async fn sync_reports_missing_workspace_and_pulls_the_rest() {
    let config = solution(
        "[]",
        "[{name: av01-dev-gone, capacity: c, connect_to_git_folder: a/}, {name: av01-dev-processing, capacity: c, connect_to_git_folder: b/}]",
    );
    let fake = FakeFabric::new()
        .on("get av01-dev-gone", [ok("")])
        .on("get av01-dev-processing", [ok(WS_ID)])
        .on("git/status", [api(200, json!({"remoteCommitHash": HASH}))])
        .on("git/updateFromGit", [api(202, json!({}))]);
    let rec = Recorder::new();
    let pacing = Pacing::default();

    let targets = sync_targets(&config);
    let report = sync_dev_workspaces(&session(&fake, &rec, &pacing), &targets).await;

    assert_eq!(
        steps(&report),
        vec![
            ("av01-dev-gone".to_string(), Step::Workspace, false),
            ("av01-dev-processing".to_string(), Step::GitUpdate, true),
        ]
    );
    assert!(report.results[0].detail.contains("not found"));
    assert_eq!(fake.count("git/updateFromGit"), 1);
    assert_eq!(fake.count("create "), 0);
}
