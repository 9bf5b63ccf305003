use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl std::fmt::Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quotes are mutable while negotiation is open and snapshot-frozen once the
/// contract is signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteState {
    Draft,
    Frozen,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub price: Decimal,
    pub quantity: u32,
    pub is_courtesy: bool,
}

impl LineItem {
    pub fn catalog_value(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Discount with an explicit unit. The upstream data model stored a single
/// unlabeled number; `from_legacy` is the migration shim for that encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Discount {
    Percent(Decimal),
    Amount(Decimal),
}

impl Discount {
    pub fn none() -> Self {
        Self::Amount(Decimal::ZERO)
    }

    /// Interprets an unlabeled discount the way legacy rows did: non-positive
    /// values mean no discount, a positive integer up to 100 against a
    /// positive reference price is a percentage, anything else is money.
    pub fn from_legacy(value: Decimal, reference_price: Decimal) -> Self {
        if value <= Decimal::ZERO {
            return Self::Amount(Decimal::ZERO);
        }
        if value <= Decimal::ONE_HUNDRED
            && value.fract().is_zero()
            && reference_price > Decimal::ZERO
        {
            return Self::Percent(value);
        }
        Self::Amount(value)
    }

    pub fn in_money(&self, reference_price: Decimal) -> Decimal {
        let amount = match self {
            Self::Percent(percent) => reference_price * *percent / Decimal::ONE_HUNDRED,
            Self::Amount(amount) => *amount,
        };
        amount.max(Decimal::ZERO)
    }
}

impl Default for Discount {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub state: QuoteState,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Discount,
    pub negotiated_price: Option<Decimal>,
    pub closing_total: Option<Decimal>,
    pub special_bonus: Option<Decimal>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub frozen_at: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn new(id: QuoteId, price: Decimal) -> Self {
        Self {
            id,
            state: QuoteState::Draft,
            price,
            discount: Discount::none(),
            negotiated_price: None,
            closing_total: None,
            special_bonus: None,
            line_items: Vec::new(),
            created_at: Utc::now(),
            frozen_at: None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.state == QuoteState::Frozen
    }

    /// Snapshots the quote at contract signature. Freezing twice is a no-op.
    pub fn freeze(&mut self) {
        if self.state == QuoteState::Draft {
            self.state = QuoteState::Frozen;
            self.frozen_at = Some(Utc::now());
        }
    }

    fn ensure_draft(&self) -> Result<(), DomainError> {
        match self.state {
            QuoteState::Draft => Ok(()),
            QuoteState::Frozen => Err(DomainError::FrozenQuote { id: self.id.clone() }),
        }
    }

    pub fn set_discount(&mut self, discount: Discount) -> Result<(), DomainError> {
        self.ensure_draft()?;
        self.discount = discount;
        Ok(())
    }

    pub fn set_negotiated_price(&mut self, price: Option<Decimal>) -> Result<(), DomainError> {
        self.ensure_draft()?;
        self.negotiated_price = price;
        Ok(())
    }

    pub fn set_closing_total(&mut self, total: Option<Decimal>) -> Result<(), DomainError> {
        self.ensure_draft()?;
        self.closing_total = total;
        Ok(())
    }

    pub fn set_special_bonus(&mut self, bonus: Option<Decimal>) -> Result<(), DomainError> {
        self.ensure_draft()?;
        self.special_bonus = bonus;
        Ok(())
    }

    pub fn push_line_item(&mut self, item: LineItem) -> Result<(), DomainError> {
        self.ensure_draft()?;
        self.line_items.push(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::errors::DomainError;

    use super::{Discount, LineItem, Quote, QuoteId, QuoteState};

    fn quote() -> Quote {
        Quote::new(QuoteId("Q-1".to_string()), Decimal::new(10_000_00, 2))
    }

    #[test]
    fn draft_quote_accepts_negotiation_changes() {
        let mut quote = quote();
        quote.set_negotiated_price(Some(Decimal::new(8_500_00, 2))).expect("draft is mutable");
        quote
            .push_line_item(LineItem {
                price: Decimal::new(500_00, 2),
                quantity: 2,
                is_courtesy: false,
            })
            .expect("draft accepts line items");

        assert_eq!(quote.negotiated_price, Some(Decimal::new(8_500_00, 2)));
        assert_eq!(quote.line_items.len(), 1);
    }

    #[test]
    fn frozen_quote_rejects_every_mutation() {
        let mut quote = quote();
        quote.freeze();

        assert_eq!(quote.state, QuoteState::Frozen);
        assert!(quote.is_frozen());
        assert!(quote.frozen_at.is_some());

        let error = quote
            .set_discount(Discount::Percent(Decimal::from(10)))
            .expect_err("frozen quote must reject discount changes");
        assert!(matches!(error, DomainError::FrozenQuote { .. }));

        assert!(quote.set_negotiated_price(None).is_err());
        assert!(quote.set_closing_total(None).is_err());
        assert!(quote.set_special_bonus(None).is_err());
        assert!(quote
            .push_line_item(LineItem {
                price: Decimal::ONE,
                quantity: 1,
                is_courtesy: true,
            })
            .is_err());
    }

    #[test]
    fn freezing_twice_keeps_the_first_snapshot_stamp() {
        let mut quote = quote();
        quote.freeze();
        let first = quote.frozen_at;
        quote.freeze();

        assert_eq!(quote.frozen_at, first);
    }

    #[test]
    fn legacy_discount_reads_small_integers_as_percentages() {
        let price = Decimal::new(10_000_00, 2);

        let percent = Discount::from_legacy(Decimal::from(10), price);
        assert_eq!(percent, Discount::Percent(Decimal::from(10)));
        assert_eq!(percent.in_money(price), Decimal::new(1_000_00, 2));

        let amount = Discount::from_legacy(Decimal::new(1_050_50, 2), price);
        assert_eq!(amount, Discount::Amount(Decimal::new(1_050_50, 2)));
    }

    #[test]
    fn legacy_discount_degrades_non_positive_values_to_zero() {
        let zeroed = Discount::from_legacy(Decimal::from(-25), Decimal::ONE_HUNDRED);
        assert_eq!(zeroed, Discount::Amount(Decimal::ZERO));
    }

    #[test]
    fn legacy_discount_treats_percent_without_reference_price_as_money() {
        // 10 against a zero price cannot be a percentage of anything.
        let amount = Discount::from_legacy(Decimal::from(10), Decimal::ZERO);
        assert_eq!(amount, Discount::Amount(Decimal::from(10)));
    }

    #[test]
    fn fractional_legacy_values_are_always_money() {
        let amount = Discount::from_legacy(Decimal::new(105, 1), Decimal::ONE_HUNDRED);
        assert_eq!(amount, Discount::Amount(Decimal::new(105, 1)));
    }
}
