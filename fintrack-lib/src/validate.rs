use fintrack_repo::account_repo::{AccountUpdate, NewAccount};
use fintrack_repo::tag_repo::NewTag;
use fintrack_repo::transaction_repo::NewTransaction;
use rust_decimal::Decimal;
use thiserror::Error;

pub const MAX_ACCOUNT_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MAX_TAG_NAME_LEN: usize = 50;

/// Rejected before anything is persisted; the message names the offending
/// field.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> ValidationError {
        ValidationError {
            field,
            reason: reason.into(),
        }
    }
}

/// 999,999.99, the fixed precision range for per-write amounts.
fn amount_limit() -> Decimal {
    Decimal::new(99_999_999, 2)
}

fn check_text(field: &'static str, value: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }
    Ok(())
}

fn check_amount(field: &'static str, amount: Decimal) -> Result<(), ValidationError> {
    let limit = amount_limit();
    if amount < -limit || amount > limit {
        return Err(ValidationError::new(
            field,
            format!("must be between -{} and {}", limit, limit),
        ));
    }
    if amount.scale() > 2 {
        return Err(ValidationError::new(
            field,
            "must have at most two decimal places",
        ));
    }
    Ok(())
}

fn check_color(color: &str) -> Result<(), ValidationError> {
    let digits = match color.strip_prefix('#') {
        Some(digits) => digits,
        None => return Err(ValidationError::new("color", "must start with '#'")),
    };
    let hex = (digits.len() == 3 || digits.len() == 6)
        && digits.chars().all(|c| c.is_ascii_hexdigit());
    if !hex {
        return Err(ValidationError::new(
            "color",
            "must be a #RGB or #RRGGBB hex specifier",
        ));
    }
    Ok(())
}

pub fn new_account(new_account: &NewAccount) -> Result<(), ValidationError> {
    check_text("name", &new_account.name, MAX_ACCOUNT_NAME_LEN)?;
    check_amount("balance", new_account.balance)
}

pub fn account_update(update: &AccountUpdate) -> Result<(), ValidationError> {
    check_text("name", &update.name, MAX_ACCOUNT_NAME_LEN)
}

pub fn new_transaction(new_transaction: &NewTransaction) -> Result<(), ValidationError> {
    check_text(
        "description",
        &new_transaction.description,
        MAX_DESCRIPTION_LEN,
    )?;
    check_amount("amount", new_transaction.amount)
}

pub fn new_tag(new_tag: &NewTag) -> Result<(), ValidationError> {
    check_text("name", &new_tag.name, MAX_TAG_NAME_LEN)?;
    check_color(&new_tag.color)
}
