#[macro_use]
extern crate tracing;
extern crate serde_json;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::error::JsonPayloadError;
use actix_web::web::Data;
use actix_web::{web, App};
use actix_web::{HttpResponse, HttpServer};
use anyhow::Context;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

use fintrack_lib::config::Config;
use fintrack_lib::identity::IdentityGate;
use fintrack_lib::{account, report, tag, transaction};
use fintrack_repo::HealthCheck;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    tracing::subscriber::set_global_default(subscriber).expect("set up subscriber");
    info!("tracing initialized");

    let config = match get_config_file() {
        Ok(config_path) => Config::from_file(config_path)?,
        Err(_) => {
            info!("Config file not found, reading configuration from environment");
            Config::from_env()?
        }
    };

    let (account_repo, transaction_repo, tag_repo, health_check) =
        fintrack_repo::sqlx_repo::create_repos(config.database_url, config.max_pool_size)
            .await
            .context("Unable to set up ledger store")?;

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(account_repo.clone()))
            .app_data(Data::new(transaction_repo.clone()))
            .app_data(Data::new(tag_repo.clone()))
            .app_data(Data::new(health_check.clone()))
            .wrap(fintrack_lib::tracing::create_middleware())
            .service(account::account_service().wrap(IdentityGate))
            .service(transaction::transaction_service().wrap(IdentityGate))
            .service(tag::tag_service().wrap(IdentityGate))
            .service(report::report_service().wrap(IdentityGate))
            .route("/health", web::get().to(health))
            .app_data(web::JsonConfig::default().error_handler(|err, req| {
                error!(req_path = req.path(), %err);
                match err {
                    JsonPayloadError::Deserialize(deserialize_err) => {
                        let error_body = serde_json::json!({
                            "error": "Unable to parse JSON payload",
                            "detail": format!("{}", deserialize_err),
                        });
                        actix_web::error::InternalError::from_response(
                            deserialize_err,
                            HttpResponse::BadRequest()
                                .content_type("application/json")
                                .body(error_body.to_string()),
                        )
                        .into()
                    }
                    _ => err.into(),
                }
            }))
    })
    .bind("0.0.0.0:8000")?
    .run()
    .await?;

    Ok(())
}

async fn health(health_check: Data<Arc<dyn HealthCheck>>) -> HttpResponse {
    if health_check.check().await {
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::ServiceUnavailable().finish()
    }
}

fn get_config_file() -> Result<PathBuf, &'static str> {
    let config_current_dir = PathBuf::from("config.toml");
    if config_current_dir.exists() {
        return Ok(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join("config.toml");
        if config_path.exists() {
            return Ok(config_path);
        }
    }

    Err("Config file not found")
}
