use crate::error::HandlerError;
use crate::identity::UserId;
use crate::validate;
use actix_web::{web, HttpResponse, Responder};
use fintrack_repo::account_repo::{AccountRepo, AccountUpdate, NewAccount};
use std::sync::Arc;

#[post("")]
pub async fn create_account(
    account_repo: web::Data<Arc<dyn AccountRepo>>,
    user_id: web::ReqData<UserId>,
    new_account: web::Json<NewAccount>,
) -> Result<impl Responder, HandlerError> {
    let new_account = new_account.into_inner();
    validate::new_account(&new_account)?;
    let account = account_repo
        .create_account(&user_id.into_inner(), new_account)
        .await?;
    Ok(HttpResponse::Ok().json(account))
}

#[get("")]
pub async fn get_all_accounts(
    account_repo: web::Data<Arc<dyn AccountRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let accounts = account_repo.get_all_accounts(&user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(accounts))
}

#[get("/{account_id}")]
pub async fn get_account(
    account_repo: web::Data<Arc<dyn AccountRepo>>,
    user_id: web::ReqData<UserId>,
    account_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let account = account_repo
        .get_account(&user_id.into_inner(), account_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(account))
}

#[put("/{account_id}")]
pub async fn update_account(
    account_repo: web::Data<Arc<dyn AccountRepo>>,
    user_id: web::ReqData<UserId>,
    account_id: web::Path<i32>,
    update: web::Json<AccountUpdate>,
) -> Result<impl Responder, HandlerError> {
    let update = update.into_inner();
    validate::account_update(&update)?;
    let account = account_repo
        .update_account(&user_id.into_inner(), account_id.into_inner(), update)
        .await?;
    Ok(HttpResponse::Ok().json(account))
}

#[delete("/{account_id}")]
pub async fn delete_account(
    account_repo: web::Data<Arc<dyn AccountRepo>>,
    user_id: web::ReqData<UserId>,
    account_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let account = account_repo
        .delete_account(&user_id.into_inner(), account_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(account))
}
