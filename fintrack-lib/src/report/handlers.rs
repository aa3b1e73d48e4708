use crate::error::HandlerError;
use crate::identity::UserId;
use crate::report;
use actix_web::{web, HttpResponse, Responder};
use fintrack_repo::transaction_repo::TransactionRepo;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ReportQuery {
    account: Option<i32>,
}

#[get("/summary")]
pub async fn get_summary(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<ReportQuery>,
) -> Result<impl Responder, HandlerError> {
    let transactions = transaction_repo
        .get_all_transactions(&user_id.into_inner(), query.account)
        .await?;
    Ok(HttpResponse::Ok().json(report::summarize(&transactions)))
}

#[get("/tag-usage")]
pub async fn get_tag_usage(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<ReportQuery>,
) -> Result<impl Responder, HandlerError> {
    let transactions = transaction_repo
        .get_all_transactions(&user_id.into_inner(), query.account)
        .await?;
    Ok(HttpResponse::Ok().json(report::tag_usage(&transactions)))
}
