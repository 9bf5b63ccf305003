use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::policy::{CostBasis, PricingPolicy};
use crate::errors::DomainError;

/// Derived list-price composition. Fields carry full precision; callers round
/// through [`PriceComposition::rounded`] at the display boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceComposition {
    pub utility_base: Decimal,
    pub subtotal: Decimal,
    pub base_price: Decimal,
    pub commission_amount: Decimal,
    pub overprice_amount: Decimal,
    pub final_price: Decimal,
    pub real_profit_percent: Decimal,
}

impl PriceComposition {
    /// Cent precision, half-up. Rounding happens here and nowhere upstream so
    /// intermediate steps never compound rounding error.
    pub fn rounded(&self) -> Self {
        let cents = |value: Decimal| {
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        Self {
            utility_base: cents(self.utility_base),
            subtotal: cents(self.subtotal),
            base_price: cents(self.base_price),
            commission_amount: cents(self.commission_amount),
            overprice_amount: cents(self.overprice_amount),
            final_price: cents(self.final_price),
            real_profit_percent: cents(self.real_profit_percent),
        }
    }
}

pub trait ComposeEngine: Send + Sync {
    fn compose(
        &self,
        basis: &CostBasis,
        policy: &PricingPolicy,
    ) -> Result<PriceComposition, DomainError>;
}

#[derive(Default)]
pub struct DeterministicComposeEngine;

impl ComposeEngine for DeterministicComposeEngine {
    fn compose(
        &self,
        basis: &CostBasis,
        policy: &PricingPolicy,
    ) -> Result<PriceComposition, DomainError> {
        compose(basis, policy)
    }
}

/// Derives a list price from a cost basis and policy percentages.
///
/// Ordering is load-bearing: utility applies to the pre-commission subtotal,
/// while commission and overprice apply to the commission-inclusive base
/// price. The base price is chosen so the commission can be deducted from it
/// while leaving the full subtotal intact (`base - commission == subtotal`).
pub fn compose(
    basis: &CostBasis,
    policy: &PricingPolicy,
) -> Result<PriceComposition, DomainError> {
    policy.validate()?;
    if basis.cost < Decimal::ZERO || basis.expense < Decimal::ZERO {
        return Err(DomainError::InvariantViolation(
            "cost basis amounts must be non-negative".to_string(),
        ));
    }

    let direct_cost = basis.direct_cost();
    let utility_base = direct_cost * policy.profit_percent / Decimal::ONE_HUNDRED;
    let subtotal = direct_cost + utility_base;

    let commission_rate = policy.commission_percent / Decimal::ONE_HUNDRED;
    let base_price = subtotal / (Decimal::ONE - commission_rate);
    let commission_amount = base_price * commission_rate;

    let overprice_amount = base_price * policy.overprice_percent / Decimal::ONE_HUNDRED;
    let final_price = base_price + overprice_amount;

    // Equals profit_percent whenever the commission is fully absorbed.
    let real_profit_percent = if direct_cost.is_zero() {
        Decimal::ZERO
    } else {
        (base_price - commission_amount - direct_cost) / direct_cost * Decimal::ONE_HUNDRED
    };

    Ok(PriceComposition {
        utility_base,
        subtotal,
        base_price,
        commission_amount,
        overprice_amount,
        final_price,
        real_profit_percent,
    })
}
