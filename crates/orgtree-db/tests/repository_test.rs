//! Integration tests for the SurrealDB organization repository using
//! in-memory SurrealDB.

use orgtree_core::lifecycle::{LifecycleState, RowFilter, Transition};
use orgtree_core::models::organization::CreateOrganization;
use orgtree_core::repository::{OrganizationRepository, Pagination};
use orgtree_db::repository::SurrealOrganizationRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    orgtree_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn insert_assigns_sequential_ids() {
    let repo = SurrealOrganizationRepository::new(setup().await);

    let root = repo.insert(CreateOrganization::root("ACME")).await.unwrap();
    let child = repo
        .insert(CreateOrganization::child_of(root.id, "Engineering"))
        .await
        .unwrap();

    assert_eq!(root.id, 1);
    assert_eq!(child.id, 2);
    assert!(root.is_root());
    assert_eq!(child.parent_id, Some(root.id));
    assert_eq!(child.name, "Engineering");
    assert_eq!(child.state(), LifecycleState::Active);
}

#[tokio::test]
async fn find_by_id_respects_filter() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let org = repo.insert(CreateOrganization::root("ACME")).await.unwrap();

    let fetched = repo.find_by_id(org.id, RowFilter::Existing).await.unwrap();
    assert_eq!(fetched, org);

    repo.apply_transition(&[org.id], Transition::Disable)
        .await
        .unwrap();
    let disabled = repo.find_by_id(org.id, RowFilter::Existing).await.unwrap();
    assert_eq!(disabled.state(), LifecycleState::Disabled);
    assert!(
        repo.find_by_id(org.id, RowFilter::Active)
            .await
            .unwrap_err()
            .is_not_found()
    );

    repo.apply_transition(&[org.id], Transition::SoftDelete)
        .await
        .unwrap();
    assert!(
        repo.find_by_id(org.id, RowFilter::Existing)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn find_by_id_missing_is_not_found() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let err = repo.find_by_id(42, RowFilter::Existing).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn find_by_parent_and_roots_in_creation_order() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let a = repo.insert(CreateOrganization::root("A")).await.unwrap();
    let b = repo.insert(CreateOrganization::root("B")).await.unwrap();
    let a1 = repo
        .insert(CreateOrganization::child_of(a.id, "A1"))
        .await
        .unwrap();
    let a2 = repo
        .insert(CreateOrganization::child_of(a.id, "A2"))
        .await
        .unwrap();

    let roots = repo.find_roots(RowFilter::Existing).await.unwrap();
    assert_eq!(
        roots.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![a.id, b.id]
    );

    let children = repo.find_by_parent(a.id, RowFilter::Existing).await.unwrap();
    assert_eq!(
        children.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![a1.id, a2.id]
    );

    repo.apply_transition(&[a1.id], Transition::Disable)
        .await
        .unwrap();
    let active = repo.find_by_parent(a.id, RowFilter::Active).await.unwrap();
    assert_eq!(active.iter().map(|o| o.id).collect::<Vec<_>>(), vec![a2.id]);
}

#[tokio::test]
async fn find_by_name_skips_deleted_rows() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let first = repo.insert(CreateOrganization::root("Sales")).await.unwrap();
    let second = repo.insert(CreateOrganization::root("Sales")).await.unwrap();
    repo.insert(CreateOrganization::root("Support"))
        .await
        .unwrap();

    let found = repo.find_by_name("Sales", RowFilter::Existing).await.unwrap();
    assert_eq!(found.len(), 2);

    repo.apply_transition(&[first.id], Transition::SoftDelete)
        .await
        .unwrap();
    let found = repo.find_by_name("Sales", RowFilter::Existing).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, second.id);
}

#[tokio::test]
async fn list_children_paginates() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let root = repo.insert(CreateOrganization::root("Root")).await.unwrap();
    for i in 0..5 {
        repo.insert(CreateOrganization::child_of(root.id, format!("Team {i}")))
            .await
            .unwrap();
    }

    let page = repo
        .list_children(
            Some(root.id),
            RowFilter::Existing,
            Pagination {
                offset: 0,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "Team 0");

    let last = repo
        .list_children(
            Some(root.id),
            RowFilter::Existing,
            Pagination {
                offset: 4,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].name, "Team 4");

    let roots = repo
        .list_children(None, RowFilter::Existing, Pagination::default())
        .await
        .unwrap();
    assert_eq!(roots.total, 1);
    assert_eq!(roots.items[0].id, root.id);
}

#[tokio::test]
async fn update_name_requires_active_row() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let org = repo.insert(CreateOrganization::root("Old")).await.unwrap();

    let renamed = repo
        .update_name(org.id, Some("New".into()))
        .await
        .unwrap();
    assert_eq!(renamed.name, "New");
    assert_eq!(renamed.id, org.id);
    assert!(renamed.updated_at >= org.updated_at);

    let touched = repo.update_name(org.id, None).await.unwrap();
    assert_eq!(touched.name, "New");

    repo.apply_transition(&[org.id], Transition::Disable)
        .await
        .unwrap();
    let err = repo
        .update_name(org.id, Some("Nope".into()))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = repo.update_name(999, Some("Ghost".into())).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(
        repo.find_by_id(999, RowFilter::Existing).await.is_err(),
        "update must not create missing rows"
    );
}

#[tokio::test]
async fn transitions_report_rows_changed() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let a = repo.insert(CreateOrganization::root("A")).await.unwrap();
    let b = repo.insert(CreateOrganization::root("B")).await.unwrap();
    let c = repo.insert(CreateOrganization::root("C")).await.unwrap();

    let disabled = repo
        .apply_transition(&[a.id, b.id], Transition::Disable)
        .await
        .unwrap();
    assert_eq!(disabled, 2);

    // Already disabled rows and unknown ids are skipped.
    let again = repo
        .apply_transition(&[a.id, c.id, 77], Transition::Disable)
        .await
        .unwrap();
    assert_eq!(again, 1);

    let deleted = repo
        .apply_transition(&[a.id, b.id, c.id], Transition::SoftDelete)
        .await
        .unwrap();
    assert_eq!(deleted, 3);
    let deleted_again = repo
        .apply_transition(&[a.id], Transition::SoftDelete)
        .await
        .unwrap();
    assert_eq!(deleted_again, 0);

    // Enable does not touch deleted rows.
    let enabled = repo
        .apply_transition(&[a.id], Transition::Enable)
        .await
        .unwrap();
    assert_eq!(enabled, 0);

    let restored = repo
        .apply_transition(&[a.id], Transition::Restore)
        .await
        .unwrap();
    assert_eq!(restored, 1);
    let a = repo.find_by_id(a.id, RowFilter::Existing).await.unwrap();
    assert_eq!(a.state(), LifecycleState::Disabled);
}

#[tokio::test]
async fn empty_transition_is_noop() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let changed = repo
        .apply_transition(&[], Transition::SoftDelete)
        .await
        .unwrap();
    assert_eq!(changed, 0);
}

#[tokio::test]
async fn keyed_transitions_leave_other_rows_alone() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let a = repo.insert(CreateOrganization::root("A")).await.unwrap();
    let b = repo.insert(CreateOrganization::root("B")).await.unwrap();

    assert_eq!(
        repo.apply_transition(&[a.id], Transition::SoftDelete)
            .await
            .unwrap(),
        1
    );
    let b_after = repo.find_by_id(b.id, RowFilter::Active).await.unwrap();
    assert_eq!(b_after.updated_at, b.updated_at);

    // Restore carries no guard; unknown ids still must not be created.
    assert_eq!(
        repo.apply_transition(&[a.id, 500], Transition::Restore)
            .await
            .unwrap(),
        1
    );
    assert!(
        repo.find_by_id(500, RowFilter::Existing)
            .await
            .unwrap_err()
            .is_not_found()
    );
}
