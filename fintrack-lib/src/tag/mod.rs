use actix_web::{web, Scope};

mod handlers;

pub fn tag_service() -> Scope {
    web::scope("/tags")
        .service(handlers::create_tag)
        .service(handlers::get_all_tags)
        .service(handlers::get_tag)
        .service(handlers::update_tag)
        .service(handlers::delete_tag)
}
