//! Tests for workspace role assignment.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::time::Duration;

use fabric_deploy::application::services::permissions::assign_permissions;
use fabric_deploy::domain::config::Pacing;
use fabric_deploy::domain::permissions::{Permission, WorkspaceRole};
use serde_json::{Value, json};

use crate::helpers::{FakeFabric, Level, Recorder, WS_ID, api, blank};

const ENG: &str = "aaaaaaaa-0000-0000-0000-000000000001";
const OPS: &str = "aaaaaaaa-0000-0000-0000-000000000002";

fn groups() -> BTreeMap<String, String> {
    BTreeMap::from([("Eng".to_string(), ENG.to_string()), ("Ops".to_string(), OPS.to_string())])
}

fn grant(group: &str, role: WorkspaceRole) -> Permission {
    Permission {
        group: group.to_string(),
        role,
    }
}

fn listing(entries: &[(&str, &str)]) -> Value {
    let value: Vec<Value> = entries
        .iter()
        .map(|(id, role)| json!({"principal": {"id": id, "type": "Group"}, "role": role}))
        .collect();
    json!({ "value": value })
}

fn posts(fake: &FakeFabric) -> usize {
    fake.count("api post")
}

#[tokio::test]
async fn already_admin_issues_no_assignment_call() {
    let fake = FakeFabric::new().on("api get", [api(200, listing(&[(ENG, "Admin")]))]);
    let rec = Recorder::new();

    let summary = assign_permissions(
        &fake,
        &rec,
        &rec,
        WS_ID,
        &[grant("Eng", WorkspaceRole::Admin)],
        &groups(),
        &Pacing::default(),
    )
    .await;

    assert_eq!(posts(&fake), 0);
    assert_eq!(summary.unchanged, vec!["Eng"]);
    assert!(
        rec.messages(Level::Success)
            .iter()
            .any(|m| m.contains("already has"))
    );
}

#[tokio::test]
async fn second_run_with_same_desired_state_assigns_nothing() {
    let desired = [grant("Eng", WorkspaceRole::Admin), grant("Ops", WorkspaceRole::Viewer)];

    // First run: nothing assigned yet.
    let first = FakeFabric::new()
        .on("api get", [api(200, listing(&[]))])
        .on("api post", [api(201, json!({"id": "ra-1"}))]);
    let rec = Recorder::new();
    let summary = assign_permissions(&first, &rec, &rec, WS_ID, &desired, &groups(), &Pacing::default()).await;
    assert_eq!(posts(&first), 2);
    assert_eq!(summary.assigned.len(), 2);

    // Second run: the service now reports both assignments.
    let second = FakeFabric::new().on(
        "api get",
        [api(200, listing(&[(ENG, "Admin"), (OPS, "Viewer")]))],
    );
    let summary = assign_permissions(&second, &rec, &rec, WS_ID, &desired, &groups(), &Pacing::default()).await;
    assert_eq!(posts(&second), 0);
    assert_eq!(summary.unchanged.len(), 2);
    assert!(summary.is_ok());
}

#[tokio::test]
async fn assignment_body_names_security_group_and_role() {
    let fake = FakeFabric::new()
        .on("api get", [api(200, listing(&[]))])
        .on("api post", [api(200, json!({}))]);
    let rec = Recorder::new();

    assign_permissions(
        &fake,
        &rec,
        &rec,
        WS_ID,
        &[grant("Ops", WorkspaceRole::Contributor)],
        &groups(),
        &Pacing::default(),
    )
    .await;

    assert_eq!(
        fake.calls()[1],
        format!("api post workspaces/{WS_ID}/roleAssignments")
    );
    let body = fake.body_of("api post").unwrap();
    assert_eq!(body["principal"]["id"], OPS);
    assert_eq!(body["principal"]["groupDetails"]["groupType"], "SecurityGroup");
    assert_eq!(body["role"], "Contributor");
}

#[tokio::test]
async fn waits_role_settle_before_listing() {
    let fake = FakeFabric::new().on("api get", [api(200, listing(&[]))]);
    let rec = Recorder::new();

    assign_permissions(&fake, &rec, &rec, WS_ID, &[], &groups(), &Pacing::default()).await;

    assert_eq!(rec.waits(), vec![Duration::from_secs(10)]);
}

#[tokio::test]
async fn different_existing_role_is_a_conflict_not_a_change() {
    let fake = FakeFabric::new().on("api get", [api(200, listing(&[(ENG, "Viewer")]))]);
    let rec = Recorder::new();

    let summary = assign_permissions(
        &fake,
        &rec,
        &rec,
        WS_ID,
        &[grant("Eng", WorkspaceRole::Admin)],
        &groups(),
        &Pacing::default(),
    )
    .await;

    assert_eq!(posts(&fake), 0);
    assert_eq!(summary.conflicts, vec![("Eng".to_string(), "Viewer".to_string())]);
    assert!(summary.is_ok());
    assert_eq!(rec.messages(Level::Warn).len(), 1);
}

#[tokio::test]
async fn unknown_group_is_a_failure_without_call() {
    let fake = FakeFabric::new().on("api get", [api(200, listing(&[]))]);
    let rec = Recorder::new();

    let summary = assign_permissions(
        &fake,
        &rec,
        &rec,
        WS_ID,
        &[grant("Finance", WorkspaceRole::Member)],
        &groups(),
        &Pacing::default(),
    )
    .await;

    assert_eq!(posts(&fake), 0);
    assert!(!summary.is_ok());
    assert_eq!(summary.failed[0].0, "Finance");
}

#[tokio::test]
async fn listing_failure_is_treated_as_no_assignments() {
    let fake = FakeFabric::new()
        .on("api get", [blank()])
        .on("api post", [api(201, json!({}))]);
    let rec = Recorder::new();

    let summary = assign_permissions(
        &fake,
        &rec,
        &rec,
        WS_ID,
        &[grant("Eng", WorkspaceRole::Admin)],
        &groups(),
        &Pacing::default(),
    )
    .await;

    assert_eq!(posts(&fake), 1);
    assert_eq!(summary.assigned, vec!["Eng"]);
}

#[tokio::test]
async fn empty_assignment_reply_is_a_failure() {
    let fake = FakeFabric::new()
        .on("api get", [api(200, listing(&[]))])
        .on("api post", [blank()]);
    let rec = Recorder::new();

    let summary = assign_permissions(
        &fake,
        &rec,
        &rec,
        WS_ID,
        &[grant("Eng", WorkspaceRole::Admin)],
        &groups(),
        &Pacing::default(),
    )
    .await;

    assert!(!summary.is_ok());
    assert_eq!(summary.failed[0].1, "status 0");
}

#[tokio::test]
async fn duplicate_desired_entries_assign_once() {
    let fake = FakeFabric::new()
        .on("api get", [api(200, listing(&[]))])
        .on("api post", [api(201, json!({}))]);
    let rec = Recorder::new();

    let summary = assign_permissions(
        &fake,
        &rec,
        &rec,
        WS_ID,
        &[grant("Eng", WorkspaceRole::Admin), grant("Eng", WorkspaceRole::Admin)],
        &groups(),
        &Pacing::default(),
    )
    .await;

    assert_eq!(posts(&fake), 1);
    assert_eq!(summary.assigned.len(), 1);
    assert_eq!(summary.unchanged.len(), 1);
}
