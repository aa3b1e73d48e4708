#[macro_use]
extern crate actix_web;

pub mod account;
pub mod config;
mod error;
pub mod identity;
pub mod report;
pub mod tag;
pub mod tracing;
pub mod transaction;
pub mod validate;
