use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Direct cost snapshotted into a quote line from the catalog item or
/// package. Immutable once the quote carries it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBasis {
    pub cost: Decimal,
    pub expense: Decimal,
}

impl CostBasis {
    pub fn new(cost: Decimal, expense: Decimal) -> Self {
        Self { cost, expense }
    }

    pub fn direct_cost(&self) -> Decimal {
        self.cost + self.expense
    }
}

/// Studio pricing percentages, each in [0, 100). A commission of 100% would
/// leave no base price from which the commission could be absorbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub profit_percent: Decimal,
    pub commission_percent: Decimal,
    pub overprice_percent: Decimal,
}

impl PricingPolicy {
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            ("profit_percent", self.profit_percent),
            ("commission_percent", self.commission_percent),
            ("overprice_percent", self.overprice_percent),
        ];

        for (field, value) in fields {
            if value < Decimal::ZERO || value >= Decimal::ONE_HUNDRED {
                return Err(DomainError::InvalidPolicy { field, value });
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReferralReward {
    /// Fraction of the commission pool, in [0, 1].
    Percentage(Decimal),
    /// Flat amount, capped at the pool when it is paid out.
    Fixed(Decimal),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSettings {
    pub sales_commission_rate: Decimal,
    pub referral_reward: ReferralReward,
}

/// Explicit, versioned studio configuration passed into the engines. The
/// engines never fetch a "current configuration" row themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioSettings {
    pub version: u32,
    pub policy: PricingPolicy,
    pub commission: CommissionSettings,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::errors::DomainError;

    use super::PricingPolicy;

    #[test]
    fn full_commission_is_rejected() {
        let policy = PricingPolicy {
            profit_percent: Decimal::from(30),
            commission_percent: Decimal::ONE_HUNDRED,
            overprice_percent: Decimal::from(15),
        };

        let error = policy.validate().expect_err("100% commission has no base price");
        assert!(matches!(error, DomainError::InvalidPolicy { field: "commission_percent", .. }));
    }

    #[test]
    fn negative_percentages_are_rejected() {
        let policy = PricingPolicy {
            profit_percent: Decimal::from(-1),
            commission_percent: Decimal::from(10),
            overprice_percent: Decimal::from(15),
        };

        assert!(policy.validate().is_err());
    }

    #[test]
    fn zero_percentages_are_a_valid_policy() {
        let policy = PricingPolicy {
            profit_percent: Decimal::ZERO,
            commission_percent: Decimal::ZERO,
            overprice_percent: Decimal::ZERO,
        };

        assert!(policy.validate().is_ok());
    }
}
