use crate::error::HandlerError;
use crate::identity::UserId;
use crate::validate;
use actix_web::{web, HttpResponse, Responder};
use fintrack_repo::tag_repo::{NewTag, TagRepo};
use std::sync::Arc;

#[post("")]
pub async fn create_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    new_tag: web::Json<NewTag>,
) -> Result<impl Responder, HandlerError> {
    let new_tag = new_tag.into_inner();
    validate::new_tag(&new_tag)?;
    let tag = tag_repo.create_tag(&user_id.into_inner(), new_tag).await?;
    Ok(HttpResponse::Ok().json(tag))
}

#[get("")]
pub async fn get_all_tags(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let tags = tag_repo.get_all_tags(&user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tags))
}

#[get("/{tag_id}")]
pub async fn get_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    tag_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let tag = tag_repo
        .get_tag(&user_id.into_inner(), tag_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tag))
}

#[put("/{tag_id}")]
pub async fn update_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    tag_id: web::Path<i32>,
    updated_tag: web::Json<NewTag>,
) -> Result<impl Responder, HandlerError> {
    let updated_tag = updated_tag.into_inner();
    validate::new_tag(&updated_tag)?;
    let tag = tag_repo
        .update_tag(&user_id.into_inner(), tag_id.into_inner(), updated_tag)
        .await?;
    Ok(HttpResponse::Ok().json(tag))
}

#[delete("/{tag_id}")]
pub async fn delete_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user_id: web::ReqData<UserId>,
    tag_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let tag = tag_repo
        .delete_tag(&user_id.into_inner(), tag_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tag))
}
