use rust_decimal::Decimal;

use atelier_core::config::AppConfig;
use atelier_core::{compose, CostBasis, PricingPolicy};

use crate::commands::CommandResult;

#[derive(Debug, Clone)]
pub struct ComposeArgs {
    pub cost: Decimal,
    pub expense: Decimal,
    pub profit_percent: Option<Decimal>,
    pub commission_percent: Option<Decimal>,
    pub overprice_percent: Option<Decimal>,
}

pub fn run(config: &AppConfig, args: ComposeArgs) -> CommandResult {
    let policy = PricingPolicy {
        profit_percent: args.profit_percent.unwrap_or(config.policy.profit_percent),
        commission_percent: args.commission_percent.unwrap_or(config.policy.commission_percent),
        overprice_percent: args.overprice_percent.unwrap_or(config.policy.overprice_percent),
    };
    let basis = CostBasis::new(args.cost, args.expense);

    let composition = match compose(&basis, &policy) {
        Ok(composition) => composition.rounded(),
        Err(error) => {
            return CommandResult::failure("compose", "invalid_policy", error.to_string(), 2)
        }
    };

    match serde_json::to_value(&composition) {
        Ok(data) => CommandResult::success_with_data("compose", "composed list price", data),
        Err(error) => CommandResult::failure("compose", "serialization", error.to_string(), 3),
    }
}
