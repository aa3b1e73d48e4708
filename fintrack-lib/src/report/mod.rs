mod handlers;

use actix_web::Scope;
use fintrack_repo::transaction_repo::Transaction;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn report_service() -> Scope {
    actix_web::web::scope("/reports")
        .service(handlers::get_summary)
        .service(handlers::get_tag_usage)
}

#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct LedgerSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
}

#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct TagUsage {
    pub tag_id: i32,
    pub name: String,
    pub color: String,
    pub transaction_count: usize,
}

/// Totals income and expenses over a set of transactions. Expenses are
/// reported as a positive magnitude. Zero amounts count towards neither side.
pub fn summarize(transactions: &[Transaction]) -> LedgerSummary {
    let mut summary = LedgerSummary {
        income: Decimal::ZERO,
        expenses: Decimal::ZERO,
        income_count: 0,
        expense_count: 0,
    };
    for transaction in transactions {
        if transaction.amount > Decimal::ZERO {
            summary.income += transaction.amount;
            summary.income_count += 1;
        } else if transaction.amount < Decimal::ZERO {
            summary.expenses -= transaction.amount;
            summary.expense_count += 1;
        }
    }
    summary
}

/// Counts how many transactions carry each tag, most used first. Ties are
/// broken by tag name.
pub fn tag_usage(transactions: &[Transaction]) -> Vec<TagUsage> {
    let mut usage: HashMap<i32, TagUsage> = HashMap::new();
    for transaction in transactions {
        for tag in &transaction.tags {
            usage
                .entry(tag.id)
                .or_insert_with(|| TagUsage {
                    tag_id: tag.id,
                    name: tag.name.clone(),
                    color: tag.color.clone(),
                    transaction_count: 0,
                })
                .transaction_count += 1;
        }
    }
    let mut usage: Vec<TagUsage> = usage.into_values().collect();
    usage.sort_by(|a, b| {
        b.transaction_count
            .cmp(&a.transaction_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    usage
}
