//! Unit of work and repository behaviour against the in-memory store.
//!
//! These exercise the persistence ports the way handlers use them: stage,
//! flush, read back, commit or roll back, with several units of work
//! sharing one database.

use proptest::prelude::*;
use std::sync::Arc;

use user_accounts::adapters::memory::{InMemoryDatabase, InMemoryUnitOfWork};
use user_accounts::application::transaction::scoped;
use user_accounts::domain::foundation::UserId;
use user_accounts::domain::user::{
    User, UserChanges, UserCriteria, UserPasswordHash, UserRole, UserSortField, Username,
};
use user_accounts::ports::{
    DataMapperError, FlushError, Pagination, Repository, RepositoryFactory, Sorting,
    TransactionStatus, UnitOfWork,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn user(name: &str) -> User {
    User::new(
        UserId::new(),
        Username::new(name).unwrap(),
        UserPasswordHash::new("hash"),
        UserRole::User,
        true,
    )
}

async fn begin(db: &InMemoryDatabase) -> (InMemoryUnitOfWork, Arc<dyn Repository<User>>) {
    let uow = InMemoryUnitOfWork::new(db.clone());
    uow.begin().await.unwrap();
    let repo: Arc<dyn Repository<User>> = uow.repository();
    (uow, repo)
}

async fn committed_count(db: &InMemoryDatabase) -> usize {
    let (uow, repo) = begin(db).await;
    let count = repo
        .all(None, None, &UserCriteria::default())
        .await
        .unwrap()
        .len();
    uow.rollback().await.unwrap();
    count
}

// =============================================================================
// Staging and visibility
// =============================================================================

#[tokio::test]
async fn created_entity_is_readable_after_flush() {
    let db = InMemoryDatabase::new();
    let (uow, repo) = begin(&db).await;
    let alice = user("alice");

    repo.create(&alice).await.unwrap();
    uow.flush().await.unwrap();

    let found = repo.get(&alice.id()).await.unwrap().unwrap();
    assert_eq!(found.username().as_str(), "alice");
}

#[tokio::test]
async fn repositories_of_one_unit_share_flushed_state() {
    let db = InMemoryDatabase::new();
    let (uow, first) = begin(&db).await;
    let second: Arc<dyn Repository<User>> = uow.repository();
    let alice = user("alice");

    first.create(&alice).await.unwrap();
    uow.flush().await.unwrap();

    assert!(second.get(&alice.id()).await.unwrap().is_some());
}

#[tokio::test]
async fn partial_update_changes_only_given_fields() {
    let db = InMemoryDatabase::new();
    let (uow, repo) = begin(&db).await;
    let mut alice = user("alice");
    repo.create(&alice).await.unwrap();

    repo.update(
        &mut alice,
        UserChanges {
            role: Some(UserRole::Admin),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    uow.commit().await.unwrap();

    let (_uow, repo) = begin(&db).await;
    let stored = repo.get(&alice.id()).await.unwrap().unwrap();
    assert_eq!(stored.role(), UserRole::Admin);
    assert_eq!(stored.username().as_str(), "alice");
    assert!(stored.is_active());
    assert_eq!(stored.password_hash().as_str(), "hash");
}

#[tokio::test]
async fn other_units_see_only_committed_writes() {
    let db = InMemoryDatabase::new();
    let (writer, repo) = begin(&db).await;
    let alice = user("alice");
    repo.create(&alice).await.unwrap();
    writer.flush().await.unwrap();

    let (_reader, other) = begin(&db).await;
    assert!(other.get(&alice.id()).await.unwrap().is_none());

    writer.commit().await.unwrap();
    assert!(other.get(&alice.id()).await.unwrap().is_some());
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn double_commit_is_a_noop() {
    let db = InMemoryDatabase::new();
    let (uow, repo) = begin(&db).await;
    repo.create(&user("alice")).await.unwrap();

    uow.commit().await.unwrap();
    uow.commit().await.unwrap();

    assert_eq!(committed_count(&db).await, 1);
}

#[tokio::test]
async fn repository_rejects_use_after_commit() {
    let db = InMemoryDatabase::new();
    let (uow, repo) = begin(&db).await;
    uow.commit().await.unwrap();

    let err = repo.create(&user("alice")).await.unwrap_err();

    assert!(matches!(
        err,
        DataMapperError::InvalidTransactionState {
            status: TransactionStatus::Committed,
            ..
        }
    ));
}

#[tokio::test]
async fn duplicate_username_surfaces_on_flush() {
    let db = InMemoryDatabase::new();
    let (uow, repo) = begin(&db).await;
    repo.create_all(&[user("alice"), user("alice")])
        .await
        .unwrap();

    let err = uow.flush().await.unwrap_err();

    assert_eq!(err, FlushError::UsernameAlreadyExists("alice".to_string()));
}

#[tokio::test]
async fn username_flushed_by_an_open_unit_is_taken_for_others() {
    let db = InMemoryDatabase::new();
    let (holder, holder_repo) = begin(&db).await;
    let (rival, rival_repo) = begin(&db).await;
    holder_repo.create(&user("alice")).await.unwrap();
    holder.flush().await.unwrap();

    rival_repo.create(&user("alice")).await.unwrap();
    let err = rival.flush().await.unwrap_err();

    assert_eq!(err, FlushError::UsernameAlreadyExists("alice".to_string()));
    holder.commit().await.unwrap();
    assert_eq!(committed_count(&db).await, 1);
}

// =============================================================================
// Transaction scope
// =============================================================================

#[tokio::test]
async fn scope_commits_on_success() {
    let db = InMemoryDatabase::new();
    let uow = InMemoryUnitOfWork::new(db.clone());
    let repo: Arc<dyn Repository<User>> = uow.repository();

    let result: Result<(), DataMapperError> =
        scoped(&uow, async { repo.create(&user("alice")).await }).await;

    assert!(result.is_ok());
    assert_eq!(uow.status().await, TransactionStatus::Committed);
    assert_eq!(committed_count(&db).await, 1);
}

#[tokio::test]
async fn scope_rolls_back_on_error() {
    let db = InMemoryDatabase::new();
    let uow = InMemoryUnitOfWork::new(db.clone());
    let repo: Arc<dyn Repository<User>> = uow.repository();

    let result: Result<(), DataMapperError> = scoped(&uow, async {
        repo.create(&user("alice")).await?;
        Err(DataMapperError::QueryFailed("handler gave up".to_string()))
    })
    .await;

    assert_eq!(
        result,
        Err(DataMapperError::QueryFailed("handler gave up".to_string()))
    );
    assert_eq!(uow.status().await, TransactionStatus::RolledBack);
    assert_eq!(committed_count(&db).await, 0);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn page_is_the_matching_window_of_the_ordered_rows(
        count in 0usize..12,
        limit in 0i64..15,
        offset in 0i64..15,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let (page, all) = runtime.block_on(async {
            let db = InMemoryDatabase::new();
            let (uow, repo) = begin(&db).await;
            let users: Vec<User> = (0..count).map(|i| user(&format!("user{:02}", i))).collect();
            repo.create_all(&users).await.unwrap();
            uow.flush().await.unwrap();

            let sorting = Sorting::asc(UserSortField::Username);
            let page = repo
                .all(
                    Some(Pagination::new(limit, offset).unwrap()),
                    Some(sorting),
                    &UserCriteria::default(),
                )
                .await
                .unwrap();
            let all = repo
                .all(None, Some(sorting), &UserCriteria::default())
                .await
                .unwrap();
            (page, all)
        });

        let expected: Vec<_> = all
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|u| u.id())
            .collect();
        let actual: Vec<_> = page.iter().map(|u| u.id()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert!(page.len() as i64 <= limit);
    }
}
