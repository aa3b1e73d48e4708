use actix_web::{web, Scope};

mod handlers;

pub fn account_service() -> Scope {
    web::scope("/accounts")
        .service(handlers::create_account)
        .service(handlers::get_all_accounts)
        .service(handlers::get_account)
        .service(handlers::update_account)
        .service(handlers::delete_account)
}
