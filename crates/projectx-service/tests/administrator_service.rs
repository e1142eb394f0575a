//! Integration tests for AdministratorService: creation with roles and
//! role sync.

mod common;

use projectx_core::ErrorKind;
use projectx_database::store::JournalEntry;
use projectx_database::{FetchGraph, UpdateSpec};
use projectx_entity::administrator::model::ADMINISTRATOR;
use projectx_entity::administrator::{Administrator, AdministratorStatus};
use projectx_service::{AdministratorService, LinkChanges};

use common::{Fixture, SEED_USER};

const EDITOR: i64 = 7;

async fn seed_roles(fx: &mut Fixture) -> [i64; 3] {
    [
        fx.role("admin", "auditor").await,
        fx.role("admin", "editor").await,
        fx.role("admin", "viewer").await,
    ]
}

fn suspend() -> UpdateSpec<Administrator> {
    UpdateSpec::new()
        .set("status", AdministratorStatus::Suspended)
        .unwrap()
}

fn link_inserts(fx: &Fixture) -> usize {
    fx.store
        .journal()
        .iter()
        .filter(|entry| matches!(entry, JournalEntry::Insert { table: "mjr_admin_x_role", .. }))
        .count()
}

#[tokio::test]
async fn test_create_links_each_role_once() {
    let mut fx = Fixture::new();
    let [auditor, editor, _] = seed_roles(&mut fx).await;
    fx.store.clear_journal();
    let service = AdministratorService::new(fx.policy);

    let administrator = service
        .create(
            &mut fx.store,
            Administrator::new("Carol", "carol", "secret"),
            &[editor, auditor, editor],
            SEED_USER,
        )
        .await
        .unwrap();
    let administrator_id = administrator.audit.id.expect("administrator id");

    let linked: Vec<i64> = administrator
        .administrator_roles
        .as_ref()
        .expect("role links returned")
        .iter()
        .map(|link| link.role_id)
        .collect();
    assert_eq!(linked, [editor, auditor]);
    assert_eq!(link_inserts(&fx), 2);
    assert_eq!(fx.held_roles(administrator_id).await, [auditor, editor]);
}

#[tokio::test]
async fn test_create_without_roles_links_nothing() {
    let mut fx = Fixture::new();
    let service = AdministratorService::new(fx.policy);

    let administrator = service
        .create(&mut fx.store, Administrator::new("Dan", "dan", "secret"), &[], SEED_USER)
        .await
        .unwrap();
    assert_eq!(administrator.administrator_roles, Some(Vec::new()));
    assert_eq!(fx.store.row_count("mjr_admin_x_role"), 0);
}

#[tokio::test]
async fn test_update_with_roles_syncs_links() {
    let mut fx = Fixture::new();
    let [auditor, editor, viewer] = seed_roles(&mut fx).await;
    let service = AdministratorService::new(fx.policy);
    let administrator_id = service
        .create(
            &mut fx.store,
            Administrator::new("Carol", "carol", "secret"),
            &[auditor, editor],
            SEED_USER,
        )
        .await
        .unwrap()
        .audit
        .id
        .expect("administrator id");
    fx.store.clear_journal();

    let changes = service
        .update_with_roles(&mut fx.store, administrator_id, &suspend(), &[viewer, editor, viewer], EDITOR)
        .await
        .unwrap();
    assert_eq!(
        changes,
        LinkChanges {
            added: vec![viewer],
            removed: vec![auditor],
        }
    );
    assert_eq!(link_inserts(&fx), 1);
    assert_eq!(fx.held_roles(administrator_id).await, [editor, viewer]);

    let updated = service
        .repository()
        .find_by_id(&mut fx.store, administrator_id, &FetchGraph::none(&ADMINISTRATOR))
        .await
        .unwrap()
        .expect("administrator");
    assert_eq!(updated.status, AdministratorStatus::Suspended);
    assert_eq!(updated.audit.updated_by, EDITOR);
}

#[tokio::test]
async fn test_sync_leaves_other_administrators_alone() {
    let mut fx = Fixture::new();
    let [auditor, editor, _] = seed_roles(&mut fx).await;
    let service = AdministratorService::new(fx.policy);
    let mut ids = Vec::new();
    for login_id in ["carol", "dan"] {
        let administrator = service
            .create(
                &mut fx.store,
                Administrator::new(login_id, login_id, "secret"),
                &[auditor, editor],
                SEED_USER,
            )
            .await
            .unwrap();
        ids.push(administrator.audit.id.expect("administrator id"));
    }

    service
        .update_with_roles(&mut fx.store, ids[0], &suspend(), &[], EDITOR)
        .await
        .unwrap();
    assert!(fx.held_roles(ids[0]).await.is_empty());
    assert_eq!(fx.held_roles(ids[1]).await, [auditor, editor]);
}

#[tokio::test]
async fn test_update_with_roles_rejects_missing_rows() {
    let mut fx = Fixture::new();
    let [auditor, ..] = seed_roles(&mut fx).await;
    let service = AdministratorService::new(fx.policy);

    let err = service
        .update_with_roles(&mut fx.store, 42, &suspend(), &[auditor], EDITOR)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(fx.store.row_count("mjr_admin_x_role"), 0);

    let administrator_id = fx.administrator("erin").await;
    let err = service
        .update_with_roles(&mut fx.store, administrator_id, &suspend(), &[auditor, 99], EDITOR)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let unchanged = service
        .repository()
        .find_by_id(&mut fx.store, administrator_id, &FetchGraph::none(&ADMINISTRATOR))
        .await
        .unwrap()
        .expect("administrator");
    assert_eq!(unchanged.status, AdministratorStatus::Active);
    assert!(fx.held_roles(administrator_id).await.is_empty());
}
