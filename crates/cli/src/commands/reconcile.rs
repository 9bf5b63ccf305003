use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rust_decimal::Decimal;

use atelier_core::{reconcile, Discount, Quote, ReconcileOptions};

use crate::commands::CommandResult;

#[derive(Debug, Clone)]
pub struct ReconcileArgs {
    pub quote_path: PathBuf,
    pub fallback: Option<Decimal>,
    pub separate_courtesy: bool,
    pub legacy_discount: Option<Decimal>,
}

pub fn run(args: ReconcileArgs) -> CommandResult {
    let mut quote = match load_quote(&args.quote_path) {
        Ok(quote) => quote,
        Err(error) => {
            return CommandResult::failure("reconcile", "quote_load", format!("{error:#}"), 4)
        }
    };

    if let Some(value) = args.legacy_discount {
        let discount = Discount::from_legacy(value, quote.price);
        if let Err(error) = quote.set_discount(discount) {
            return CommandResult::failure("reconcile", "frozen_quote", error.to_string(), 2);
        }
    }

    let breakdown = reconcile(
        &quote,
        &ReconcileOptions {
            fallback_price: args.fallback,
            fold_courtesy_into_discounts: !args.separate_courtesy,
        },
    );

    match serde_json::to_value(&breakdown) {
        Ok(data) => CommandResult::success_with_data("reconcile", "reconciled quote", data),
        Err(error) => CommandResult::failure("reconcile", "serialization", error.to_string(), 3),
    }
}

fn load_quote(path: &Path) -> anyhow::Result<Quote> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read quote file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse quote file `{}`", path.display()))
}
