//! Integration tests for criteria reads: find_by_id, find_one, find_all,
//! count and exists.

mod common;

use projectx_core::ErrorKind;
use projectx_core::error::ErrorDetail;
use projectx_database::FetchGraph;
use projectx_database::criteria::{
    ActionCriteria, AdministratorCriteria, LoginHistoryCriteria, RoleCriteria,
};
use projectx_entity::Entity;
use projectx_entity::administrator::AdministratorStatus;
use projectx_entity::administrator::login_history::LOGIN_HISTORY;
use projectx_entity::administrator::model::ADMINISTRATOR;
use projectx_entity::role::model::ROLE;

use common::{TestDb, day, ids};

#[tokio::test]
async fn test_find_all_ignores_limit_without_paging() {
    let mut db = TestDb::new();
    for i in 0..137 {
        db.administrator(&format!("Admin {i}"), &format!("admin{i:03}")).await;
    }

    let criteria = AdministratorCriteria::builder().limit(10).build().unwrap();
    let all = db
        .administrators()
        .find_all(&mut db.store, &criteria, &FetchGraph::none(&ADMINISTRATOR))
        .await
        .unwrap();
    assert_eq!(all.len(), 137);
}

#[tokio::test]
async fn test_find_all_rejects_paging() {
    let mut db = TestDb::new();
    db.administrator("Root", "root").await;

    for (criteria, field) in [
        (AdministratorCriteria::builder().page(1).build().unwrap(), "page"),
        (
            AdministratorCriteria::builder().offset(0).limit(5).build().unwrap(),
            "offset",
        ),
    ] {
        let err = db
            .administrators()
            .find_all(&mut db.store, &criteria, &FetchGraph::none(&ADMINISTRATOR))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert_eq!(
            err.detail,
            Some(ErrorDetail::Field {
                entity: "Administrator".to_string(),
                field: field.to_string(),
            })
        );
    }
}

#[tokio::test]
async fn test_find_one_rejects_non_unique_matches() {
    let mut db = TestDb::new();
    db.administrator("Operator", "op1").await;
    db.administrator("Operator", "op2").await;
    let graph = FetchGraph::none(&ADMINISTRATOR);

    let shared = AdministratorCriteria::builder().name("Operator").build().unwrap();
    let err = db
        .administrators()
        .find_one(&mut db.store, &shared, &graph)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NonUniqueResult);

    let unique = AdministratorCriteria::builder().login_id("op2").build().unwrap();
    let found = db
        .administrators()
        .find_one(&mut db.store, &unique, &graph)
        .await
        .unwrap()
        .expect("administrator op2");
    assert_eq!(found.login_id, "op2");

    let missing = AdministratorCriteria::builder().login_id("nobody").build().unwrap();
    assert!(
        db.administrators()
            .find_one(&mut db.store, &missing, &graph)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_find_one_with_collection_graph_checks_uniqueness_on_roots() {
    let mut db = TestDb::new();
    let admin = db.administrator("Solo", "solo").await;
    let admin_id = admin.id().unwrap();
    for name in ["auditor", "editor", "viewer"] {
        let role = db.role("admin", name).await;
        db.assign_role(admin_id, role.id().unwrap()).await;
    }
    let graph = FetchGraph::parse(&ADMINISTRATOR, "administratorRoles(role)").unwrap();

    // Three link rows join to one root; that is still a unique result.
    let criteria = AdministratorCriteria::builder().login_id("solo").build().unwrap();
    let found = db
        .administrators()
        .find_one(&mut db.store, &criteria, &graph)
        .await
        .unwrap()
        .expect("administrator solo");
    let links = found.administrator_roles.expect("roles fetched");
    assert_eq!(links.len(), 3);
    let names: Vec<_> = links
        .iter()
        .map(|link| link.role.as_ref().expect("role fetched").name.clone())
        .collect();
    assert_eq!(names, ["auditor", "editor", "viewer"]);

    db.administrator("Other", "other").await;
    let err = db
        .administrators()
        .find_one(&mut db.store, &AdministratorCriteria::default(), &graph)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NonUniqueResult);
}

#[tokio::test]
async fn test_find_by_id_populates_to_one_relation() {
    let mut db = TestDb::new();
    let admin = db.administrator("Root", "root").await;
    let history = db.login(admin.id().unwrap(), "10.0.0.1", day(0)).await;

    let graph = FetchGraph::parse(&LOGIN_HISTORY, "administrator").unwrap();
    let found = db
        .login_histories()
        .find_by_id(&mut db.store, history.id().unwrap(), &graph)
        .await
        .unwrap()
        .expect("login history");
    assert_eq!(found.ip_address.as_deref(), Some("10.0.0.1"));
    assert_eq!(found.administrator.expect("administrator fetched").login_id, "root");

    let plain = db
        .login_histories()
        .find_by_id(&mut db.store, history.id().unwrap(), &FetchGraph::none(&LOGIN_HISTORY))
        .await
        .unwrap()
        .expect("login history");
    assert!(plain.administrator.is_none());

    assert!(
        db.login_histories()
            .find_by_id(&mut db.store, 999, &graph)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_fetch_graph_must_match_repository() {
    let mut db = TestDb::new();
    let err = db
        .administrators()
        .find_all(&mut db.store, &AdministratorCriteria::default(), &FetchGraph::none(&ROLE))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_keyword_is_case_insensitive_across_columns() {
    let mut db = TestDb::new();
    db.administrator("Alice Admin", "alice").await;
    db.administrator("Bob", "bob_admin").await;
    db.administrator("Carol", "carol").await;

    let criteria = AdministratorCriteria::builder().keyword("ADMIN").build().unwrap();
    let found = db
        .administrators()
        .find_all(&mut db.store, &criteria, &FetchGraph::none(&ADMINISTRATOR))
        .await
        .unwrap();
    let mut logins: Vec<_> = found.iter().map(|a| a.login_id.as_str()).collect();
    logins.sort_unstable();
    assert_eq!(logins, ["alice", "bob_admin"]);

    // LIKE wildcards in the keyword match literally.
    let criteria = AdministratorCriteria::builder().keyword("%").build().unwrap();
    assert_eq!(
        db.administrators()
            .count(&mut db.store, &criteria)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_id_filters() {
    let mut db = TestDb::new();
    for i in 1..=6 {
        db.role("admin", &format!("role-{i}")).await;
    }
    let graph = FetchGraph::none(&ROLE);

    let criteria = RoleCriteria::builder()
        .include_ids([1, 2, 3, 4])
        .exclude_ids([2])
        .sort("id", projectx_core::types::SortDirection::Asc)
        .build()
        .unwrap();
    let roles = db
        .roles()
        .find_all(&mut db.store, &criteria, &graph)
        .await
        .unwrap();
    assert_eq!(ids(&roles), [1, 3, 4]);

    let criteria = RoleCriteria::builder().from_id(4).build().unwrap();
    let roles = db
        .roles()
        .find_all(&mut db.store, &criteria, &graph)
        .await
        .unwrap();
    assert_eq!(ids(&roles), [6, 5]);
}

#[tokio::test]
async fn test_nested_role_filter_matches_each_administrator_once() {
    let mut db = TestDb::new();
    let auditor = db.role("admin", "auditor").await.id().unwrap();
    let editor = db.role("admin", "editor").await.id().unwrap();
    let both = db.administrator("Both", "both").await.id().unwrap();
    let audits = db.administrator("Audits", "audits").await.id().unwrap();
    let edits = db.administrator("Edits", "edits").await.id().unwrap();
    db.assign_role(both, auditor).await;
    db.assign_role(both, editor).await;
    db.assign_role(audits, auditor).await;
    db.assign_role(edits, editor).await;

    let role = RoleCriteria::builder().app_name("admin").build().unwrap();
    let criteria = AdministratorCriteria::builder().role(role).build().unwrap();
    assert_eq!(
        db.administrators()
            .count(&mut db.store, &criteria)
            .await
            .unwrap(),
        3
    );

    let role = RoleCriteria::builder().name("auditor").build().unwrap();
    let criteria = AdministratorCriteria::builder().role(role).build().unwrap();
    let found = db
        .administrators()
        .find_all(&mut db.store, &criteria, &FetchGraph::none(&ADMINISTRATOR))
        .await
        .unwrap();
    assert_eq!(ids(&found), [audits, both]);
}

#[tokio::test]
async fn test_empty_nested_criteria_does_not_filter() {
    let mut db = TestDb::new();
    let role = db.role("admin", "auditor").await.id().unwrap();
    let assigned = db.administrator("Assigned", "assigned").await.id().unwrap();
    db.administrator("Unassigned", "unassigned").await;
    db.assign_role(assigned, role).await;

    let criteria = AdministratorCriteria::builder()
        .role(RoleCriteria::default())
        .build()
        .unwrap();
    assert_eq!(
        db.administrators()
            .count(&mut db.store, &criteria)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_nested_filters_recurse_through_link_tables() {
    let mut db = TestDb::new();
    let export = db.action("admin", "reports", "export").await.id().unwrap();
    let view = db.action("admin", "reports", "view").await.id().unwrap();
    let analyst = db.role("admin", "analyst").await.id().unwrap();
    let reader = db.role("admin", "reader").await.id().unwrap();
    db.grant_action(analyst, export).await;
    db.grant_action(analyst, view).await;
    db.grant_action(reader, view).await;
    let alice = db.administrator("Alice", "alice").await.id().unwrap();
    let bob = db.administrator("Bob", "bob").await.id().unwrap();
    db.assign_role(alice, analyst).await;
    db.assign_role(bob, reader).await;

    // Administrators holding a role that grants the export action.
    let action = ActionCriteria::builder().action_name("export").build().unwrap();
    let role = RoleCriteria::builder().action(action).build().unwrap();
    let criteria = AdministratorCriteria::builder().role(role).build().unwrap();
    let found = db
        .administrators()
        .find_all(&mut db.store, &criteria, &FetchGraph::none(&ADMINISTRATOR))
        .await
        .unwrap();
    assert_eq!(ids(&found), [alice]);

    // Actions granted to a role held by Bob.
    let administrator = AdministratorCriteria::builder().login_id("bob").build().unwrap();
    let role = RoleCriteria::builder().administrator(administrator).build().unwrap();
    let criteria = ActionCriteria::builder().role(role).build().unwrap();
    let found = db
        .actions()
        .find_ids(&mut db.store, &criteria)
        .await
        .unwrap();
    assert_eq!(found, [view]);
}

#[tokio::test]
async fn test_login_history_filters() {
    let mut db = TestDb::new();
    let root = db.administrator("Root", "root").await.id().unwrap();
    let guest = db.administrator("Guest", "guest").await.id().unwrap();
    db.login(root, "10.0.0.1", day(0)).await;
    db.login(root, "10.0.0.2", day(5)).await;
    db.login(guest, "10.0.0.3", day(6)).await;

    let criteria = LoginHistoryCriteria::builder()
        .login_between(Some(day(5)), Some(day(6)))
        .build()
        .unwrap();
    assert_eq!(
        db.login_histories()
            .count(&mut db.store, &criteria)
            .await
            .unwrap(),
        2
    );

    let administrator = AdministratorCriteria::builder()
        .status(AdministratorStatus::Active)
        .login_id("root")
        .build()
        .unwrap();
    let criteria = LoginHistoryCriteria::builder()
        .administrator(administrator)
        .build()
        .unwrap();
    assert_eq!(
        db.login_histories()
            .count(&mut db.store, &criteria)
            .await
            .unwrap(),
        2
    );

    let criteria = LoginHistoryCriteria::builder().keyword("0.0.3").build().unwrap();
    assert!(
        db.login_histories()
            .exists(&mut db.store, &criteria)
            .await
            .unwrap()
    );
    let criteria = LoginHistoryCriteria::builder().ip_address("192.168.0.1").build().unwrap();
    assert!(
        !db.login_histories()
            .exists(&mut db.store, &criteria)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_repository_specific_queries() {
    let mut db = TestDb::new();
    let users_view = db.action("admin", "users", "view").await.id().unwrap();
    db.action("admin", "users", "edit").await;
    let roles_view = db.action("admin", "roles", "view").await.id().unwrap();
    db.action("portal", "home", "view").await;

    let pages = db
        .actions()
        .select_pages(&mut db.store, "admin")
        .await
        .unwrap();
    assert_eq!(pages, ["roles", "users"]);

    let role = db.role("admin", "viewer").await.id().unwrap();
    db.grant_action(role, roles_view).await;
    db.grant_action(role, users_view).await;
    let action_ids = db
        .role_actions()
        .find_action_ids_by_role_id(&mut db.store, role)
        .await
        .unwrap();
    assert_eq!(action_ids, [users_view, roles_view]);

    let admin = db.administrator("Root", "root").await.id().unwrap();
    db.assign_role(admin, role).await;
    let role_ids = db
        .administrator_roles()
        .find_role_ids_by_administrator_id(&mut db.store, admin)
        .await
        .unwrap();
    assert_eq!(role_ids, [role]);
}
