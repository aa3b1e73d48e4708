use actix_web::{web, Scope};

mod handlers;

pub fn transaction_service() -> Scope {
    web::scope("/transactions")
        .service(handlers::create_transaction)
        .service(handlers::get_all_transactions)
        .service(handlers::attach_tag)
        .service(handlers::detach_tag)
        .service(handlers::replace_tags)
        .service(handlers::get_transaction)
        .service(handlers::update_transaction)
        .service(handlers::delete_transaction)
}
