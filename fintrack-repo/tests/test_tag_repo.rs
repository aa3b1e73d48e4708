mod utils;

use chrono::NaiveDate;
use fintrack_repo::account_repo::{AccountType, NewAccount};
use fintrack_repo::error::LedgerRepoError;
use fintrack_repo::tag_repo::NewTag;
use fintrack_repo::transaction_repo::NewTransaction;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use utils::Repos;

async fn setup_transaction(repos: &Repos, user: &str) -> i32 {
    let (account_repo, transaction_repo, _) = repos;
    let account = account_repo
        .create_account(
            user,
            NewAccount::new("Main".to_string(), AccountType::Checking, Decimal::ZERO),
        )
        .await
        .unwrap();
    transaction_repo
        .create_transaction(
            user,
            NewTransaction::new(
                account.id,
                Decimal::from(-15),
                "Lunch".to_string(),
                NaiveDate::from_str("2024-05-01").unwrap(),
                HashSet::new(),
            ),
        )
        .await
        .unwrap()
        .id
}

#[actix_rt::test]
async fn test_create_update_and_list_tags() {
    let repos = utils::build_repos();
    let (_, _, tag_repo) = &repos;
    let user = utils::test_user();

    let travel = tag_repo
        .create_tag(&user, NewTag::new("Travel".to_string(), "#10B981".to_string()))
        .await
        .unwrap();
    tag_repo
        .create_tag(&user, NewTag::new("Food".to_string(), "#EF4444".to_string()))
        .await
        .unwrap();

    // name ascending
    let tags = tag_repo.get_all_tags(&user).await.unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Food", "Travel"]);

    let renamed = tag_repo
        .update_tag(
            &user,
            travel.id,
            NewTag::new("Trips".to_string(), "#10B981".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Trips");
    assert_eq!(
        tag_repo.get_tag(&user, travel.id).await.unwrap().name,
        "Trips"
    );
}

#[actix_rt::test]
async fn test_attach_is_idempotent() {
    let repos = utils::build_repos();
    let user = utils::test_user();
    let transaction_id = setup_transaction(&repos, &user).await;
    let (_, transaction_repo, tag_repo) = &repos;

    let tag = tag_repo
        .create_tag(&user, NewTag::new("Food".to_string(), "#EF4444".to_string()))
        .await
        .unwrap();

    transaction_repo
        .attach_tag(&user, transaction_id, tag.id)
        .await
        .unwrap();
    transaction_repo
        .attach_tag(&user, transaction_id, tag.id)
        .await
        .unwrap();

    let transaction = transaction_repo
        .get_transaction(&user, transaction_id)
        .await
        .unwrap();
    assert_eq!(transaction.tags.len(), 1);
    assert_eq!(transaction.tags[0].id, tag.id);
}

#[actix_rt::test]
async fn test_detach_missing_pair_is_noop() {
    let repos = utils::build_repos();
    let user = utils::test_user();
    let transaction_id = setup_transaction(&repos, &user).await;
    let (_, transaction_repo, tag_repo) = &repos;

    let tag = tag_repo
        .create_tag(&user, NewTag::new("Food".to_string(), "#EF4444".to_string()))
        .await
        .unwrap();

    // never attached; detaching is still a success
    transaction_repo
        .detach_tag(&user, transaction_id, tag.id)
        .await
        .unwrap();

    let transaction = transaction_repo
        .get_transaction(&user, transaction_id)
        .await
        .unwrap();
    assert!(transaction.tags.is_empty());
}

#[actix_rt::test]
async fn test_replace_tags_symmetric_difference() {
    let repos = utils::build_repos();
    let user = utils::test_user();
    let transaction_id = setup_transaction(&repos, &user).await;
    let (_, transaction_repo, tag_repo) = &repos;

    let food = tag_repo
        .create_tag(&user, NewTag::new("Food".to_string(), "#EF4444".to_string()))
        .await
        .unwrap();
    let travel = tag_repo
        .create_tag(&user, NewTag::new("Travel".to_string(), "#10B981".to_string()))
        .await
        .unwrap();
    let business = tag_repo
        .create_tag(&user, NewTag::new("Business".to_string(), "#6366F1".to_string()))
        .await
        .unwrap();

    transaction_repo
        .replace_tags(&user, transaction_id, HashSet::from([food.id, travel.id]))
        .await
        .unwrap();

    let transaction = transaction_repo
        .replace_tags(&user, transaction_id, HashSet::from([travel.id, business.id]))
        .await
        .unwrap();

    let tag_ids: HashSet<i32> = transaction.tags.iter().map(|t| t.id).collect();
    assert_eq!(tag_ids, HashSet::from([travel.id, business.id]));
}

#[actix_rt::test]
async fn test_replace_tags_with_unknown_tag_fails() {
    let repos = utils::build_repos();
    let user = utils::test_user();
    let transaction_id = setup_transaction(&repos, &user).await;
    let (_, transaction_repo, _) = &repos;

    let result = transaction_repo
        .replace_tags(&user, transaction_id, HashSet::from([999]))
        .await;
    assert!(matches!(
        result.unwrap_err(),
        LedgerRepoError::TagNotFound(999)
    ));
}

#[actix_rt::test]
async fn test_delete_tag_cascades_links_only() {
    let repos = utils::build_repos();
    let user = utils::test_user();
    let transaction_id = setup_transaction(&repos, &user).await;
    let (_, transaction_repo, tag_repo) = &repos;

    let tag = tag_repo
        .create_tag(&user, NewTag::new("Food".to_string(), "#EF4444".to_string()))
        .await
        .unwrap();
    transaction_repo
        .attach_tag(&user, transaction_id, tag.id)
        .await
        .unwrap();

    tag_repo.delete_tag(&user, tag.id).await.unwrap();

    // transaction survives, untagged
    let transaction = transaction_repo
        .get_transaction(&user, transaction_id)
        .await
        .unwrap();
    assert!(transaction.tags.is_empty());
    let result = tag_repo.get_tag(&user, tag.id).await;
    assert!(matches!(result.unwrap_err(), LedgerRepoError::TagNotFound(_)));
}

#[actix_rt::test]
async fn test_delete_transaction_leaves_tags_intact() {
    let repos = utils::build_repos();
    let user = utils::test_user();
    let transaction_id = setup_transaction(&repos, &user).await;
    let (_, transaction_repo, tag_repo) = &repos;

    let food = tag_repo
        .create_tag(&user, NewTag::new("Food".to_string(), "#EF4444".to_string()))
        .await
        .unwrap();
    let travel = tag_repo
        .create_tag(&user, NewTag::new("Travel".to_string(), "#10B981".to_string()))
        .await
        .unwrap();
    transaction_repo
        .replace_tags(&user, transaction_id, HashSet::from([food.id, travel.id]))
        .await
        .unwrap();

    let deleted = transaction_repo
        .delete_transaction(&user, transaction_id)
        .await
        .unwrap();
    assert_eq!(deleted.tags.len(), 2);

    // both tags still exist
    assert_eq!(tag_repo.get_all_tags(&user).await.unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_ownership_isolation() {
    let repos = utils::build_repos();
    let user1 = utils::test_user();
    let user2 = utils::test_user();
    let transaction_id = setup_transaction(&repos, &user1).await;
    let (_, transaction_repo, tag_repo) = &repos;

    let tag = tag_repo
        .create_tag(&user1, NewTag::new("Private".to_string(), "#EF4444".to_string()))
        .await
        .unwrap();

    let result = tag_repo.get_tag(&user2, tag.id).await;
    assert!(matches!(result.unwrap_err(), LedgerRepoError::TagNotFound(_)));

    // user2 cannot attach user1's tag, nor tag user1's transaction
    let result = transaction_repo.attach_tag(&user2, transaction_id, tag.id).await;
    assert!(matches!(
        result.unwrap_err(),
        LedgerRepoError::TransactionNotFound(_)
    ));

    let foreign_tagging = transaction_repo
        .replace_tags(&user1, transaction_id, HashSet::from([tag.id]))
        .await
        .unwrap();
    assert_eq!(foreign_tagging.tags.len(), 1);
    let result = tag_repo.delete_tag(&user2, tag.id).await;
    assert!(matches!(result.unwrap_err(), LedgerRepoError::TagNotFound(_)));
}
