use crate::error::HandlerError;
use crate::identity::UserId;
use crate::validate;
use actix_web::{web, HttpResponse, Responder};
use fintrack_repo::transaction_repo::{NewTransaction, TransactionRepo};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TransactionQuery {
    account: Option<i32>,
}

#[post("")]
pub async fn create_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    new_transaction: web::Json<NewTransaction>,
) -> Result<impl Responder, HandlerError> {
    let new_transaction = new_transaction.into_inner();
    validate::new_transaction(&new_transaction)?;
    let transaction = transaction_repo
        .create_transaction(&user_id.into_inner(), new_transaction)
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("")]
pub async fn get_all_transactions(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<TransactionQuery>,
) -> Result<impl Responder, HandlerError> {
    let transactions = transaction_repo
        .get_all_transactions(&user_id.into_inner(), query.account)
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/{transaction_id}")]
pub async fn get_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .get_transaction(&user_id.into_inner(), transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[put("/{transaction_id}")]
pub async fn update_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
    updated_transaction: web::Json<NewTransaction>,
) -> Result<impl Responder, HandlerError> {
    let updated_transaction = updated_transaction.into_inner();
    validate::new_transaction(&updated_transaction)?;
    let transaction = transaction_repo
        .update_transaction(
            &user_id.into_inner(),
            transaction_id.into_inner(),
            updated_transaction,
        )
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[delete("/{transaction_id}")]
pub async fn delete_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .delete_transaction(&user_id.into_inner(), transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[post("/{transaction_id}/tags/{tag_id}")]
pub async fn attach_tag(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    path: web::Path<(i32, i32)>,
) -> Result<impl Responder, HandlerError> {
    let (transaction_id, tag_id) = path.into_inner();
    transaction_repo
        .attach_tag(&user_id.into_inner(), transaction_id, tag_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{transaction_id}/tags/{tag_id}")]
pub async fn detach_tag(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    path: web::Path<(i32, i32)>,
) -> Result<impl Responder, HandlerError> {
    let (transaction_id, tag_id) = path.into_inner();
    transaction_repo
        .detach_tag(&user_id.into_inner(), transaction_id, tag_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/{transaction_id}/tags")]
pub async fn replace_tags(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
    tag_ids: web::Json<HashSet<i32>>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .replace_tags(
            &user_id.into_inner(),
            transaction_id.into_inner(),
            tag_ids.into_inner(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}
