use std::sync::Arc;

use fintrack_lib::identity::UserId;
use rstest::*;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

use fintrack_repo::account_repo::AccountRepo;
use fintrack_repo::tag_repo::TagRepo;
use fintrack_repo::transaction_repo::TransactionRepo;

pub mod mock;

macro_rules! build_app {
    ($account_repo:ident, $transaction_repo:ident, $tag_repo:ident, $user_id:expr) => {{
        let app = App::new()
            .app_data(Data::new($account_repo))
            .app_data(Data::new($transaction_repo))
            .app_data(Data::new($tag_repo))
            .wrap(fintrack_lib::tracing::create_middleware())
            .service(
                fintrack_lib::account::account_service().wrap(MockIdentity {
                    user_id: $user_id.clone(),
                }),
            )
            .service(
                fintrack_lib::transaction::transaction_service().wrap(MockIdentity {
                    user_id: $user_id.clone(),
                }),
            )
            .service(fintrack_lib::tag::tag_service().wrap(MockIdentity {
                user_id: $user_id.clone(),
            }))
            .service(fintrack_lib::report::report_service().wrap(MockIdentity {
                user_id: $user_id.clone(),
            }));
        tracing::info!("Built app");
        app
    }};
}

macro_rules! create_account {
    (&$service:ident, $new_account:ident) => {{
        let request = TestRequest::post()
            .uri("/accounts")
            .set_json(&$new_account)
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when creating account",
            response.status()
        );
        test::read_body_json(response).await
    }};
}

macro_rules! get_account {
    (&$service:ident, $account_id:expr) => {{
        let request = TestRequest::get()
            .uri(&format!("/accounts/{}", $account_id))
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when fetching account",
            response.status()
        );
        test::read_body_json(response).await
    }};
}

macro_rules! create_transaction {
    (&$service:ident, $new_transaction:ident) => {{
        let request = TestRequest::post()
            .uri("/transactions")
            .set_json(&$new_transaction)
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when creating transaction",
            response.status()
        );
        test::read_body_json(response).await
    }};
}

pub fn test_user() -> UserId {
    let user_id = "test-user-".to_owned() + &Uuid::new_v4().to_string();
    info!(%user_id, "Using test user");
    user_id
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> (
    Arc<dyn AccountRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn TagRepo>,
) {
    let (account_repo, transaction_repo, tag_repo, _health) = fintrack_repo::mem_repo::create_repos();
    (account_repo, transaction_repo, tag_repo)
}
