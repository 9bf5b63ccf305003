use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::quote::{LineItem, Quote};

/// Reconciliation of catalog value against the amount actually owed. The
/// adjustment term absorbs whatever the named buckets do not explain, so
/// `final_closing_price` always equals the clamped arithmetic base plus
/// `closing_adjustment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialBreakdown {
    pub discount_in_money: Decimal,
    pub list_price: Decimal,
    pub courtesy_savings: Decimal,
    pub bonus_amount: Decimal,
    pub bonus_and_discounts_total: Decimal,
    pub base_for_commercial_condition: Decimal,
    pub final_closing_price: Decimal,
    pub closing_adjustment: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Closing price used when the quote carries neither a computed closing
    /// total nor a negotiated price. Typically the composed final price.
    pub fallback_price: Option<Decimal>,
    /// Whether courtesy savings are folded into `bonus_and_discounts_total`
    /// or reported only as their own line.
    pub fold_courtesy_into_discounts: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self { fallback_price: None, fold_courtesy_into_discounts: true }
    }
}

pub trait ReconcileEngine: Send + Sync {
    fn reconcile(&self, quote: &Quote, options: &ReconcileOptions) -> FinancialBreakdown;
}

#[derive(Default)]
pub struct DeterministicReconcileEngine;

impl ReconcileEngine for DeterministicReconcileEngine {
    fn reconcile(&self, quote: &Quote, options: &ReconcileOptions) -> FinancialBreakdown {
        reconcile(quote, options)
    }
}

/// Produces a displayable breakdown for any quote, however partial. Missing
/// or non-positive inputs degrade to zero-valued buckets instead of failing;
/// input validation is the caller's concern.
pub fn reconcile(quote: &Quote, options: &ReconcileOptions) -> FinancialBreakdown {
    let discount_in_money = quote.discount.in_money(quote.price);

    // Courtesy items stay in the list price: the value was delivered, the
    // charge was waived.
    let list_price = if quote.line_items.is_empty() {
        quote.price.max(Decimal::ZERO)
    } else {
        quote.line_items.iter().map(LineItem::catalog_value).sum()
    };

    let courtesy_savings: Decimal = quote
        .line_items
        .iter()
        .filter(|item| item.is_courtesy)
        .map(LineItem::catalog_value)
        .sum();

    let bonus_amount = quote.special_bonus.unwrap_or(Decimal::ZERO).max(Decimal::ZERO);

    let mut bonus_and_discounts_total = discount_in_money + bonus_amount;
    if options.fold_courtesy_into_discounts {
        bonus_and_discounts_total += courtesy_savings;
    }

    let base_for_commercial_condition =
        (list_price - bonus_and_discounts_total).max(Decimal::ZERO);

    let final_closing_price = select_closing_price(quote, options);

    // Courtesy is subtracted once here; bonus_amount deliberately excludes it
    // so folded courtesy is not double-counted.
    let arithmetic_base =
        (list_price - courtesy_savings - discount_in_money - bonus_amount).max(Decimal::ZERO);
    let closing_adjustment = final_closing_price - arithmetic_base;

    FinancialBreakdown {
        discount_in_money,
        list_price,
        courtesy_savings,
        bonus_amount,
        bonus_and_discounts_total,
        base_for_commercial_condition,
        final_closing_price,
        closing_adjustment,
    }
}

/// First positive of: engine-computed closing total, negotiated price, caller
/// fallback. Whole currency units at this boundary.
fn select_closing_price(quote: &Quote, options: &ReconcileOptions) -> Decimal {
    [quote.closing_total, quote.negotiated_price, options.fallback_price]
        .into_iter()
        .flatten()
        .find(|candidate| *candidate > Decimal::ZERO)
        .unwrap_or_else(|| quote.price.max(Decimal::ZERO))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::quote::{Discount, LineItem, Quote, QuoteId};

    use super::{reconcile, ReconcileOptions};

    fn quote(price: i64) -> Quote {
        Quote::new(QuoteId("Q-5501".to_string()), Decimal::from(price))
    }

    fn item(price: i64, quantity: u32, is_courtesy: bool) -> LineItem {
        LineItem { price: Decimal::from(price), quantity, is_courtesy }
    }

    #[test]
    fn negotiated_quote_reports_the_goodwill_residual() {
        let mut quote = quote(10_000);
        quote.discount = Discount::from_legacy(Decimal::from(10), quote.price);
        quote.negotiated_price = Some(Decimal::from(8_500));

        let breakdown = reconcile(&quote, &ReconcileOptions::default());

        assert_eq!(breakdown.list_price, Decimal::from(10_000));
        assert_eq!(breakdown.discount_in_money, Decimal::from(1_000));
        assert_eq!(breakdown.bonus_and_discounts_total, Decimal::from(1_000));
        assert_eq!(breakdown.base_for_commercial_condition, Decimal::from(9_000));
        assert_eq!(breakdown.final_closing_price, Decimal::from(8_500));
        assert_eq!(breakdown.closing_adjustment, Decimal::from(-500));
    }

    #[test]
    fn line_items_take_precedence_over_the_raw_price() {
        let mut quote = quote(1);
        quote.line_items =
            vec![item(2_000, 2, false), item(500, 1, true), item(750, 4, false)];

        let breakdown = reconcile(&quote, &ReconcileOptions::default());

        assert_eq!(breakdown.list_price, Decimal::from(7_500));
        assert_eq!(breakdown.courtesy_savings, Decimal::from(500));
    }

    #[test]
    fn courtesy_folding_is_caller_selectable() {
        let mut quote = quote(0);
        quote.line_items = vec![item(3_000, 1, false), item(400, 1, true)];

        let folded = reconcile(&quote, &ReconcileOptions::default());
        assert_eq!(folded.bonus_and_discounts_total, Decimal::from(400));

        let separate = reconcile(
            &quote,
            &ReconcileOptions { fold_courtesy_into_discounts: false, ..Default::default() },
        );
        assert_eq!(separate.bonus_and_discounts_total, Decimal::ZERO);
        assert_eq!(separate.courtesy_savings, Decimal::from(400));

        // The adjustment identity does not depend on where courtesy lands.
        assert_eq!(folded.closing_adjustment, separate.closing_adjustment);
    }

    #[test]
    fn closing_total_wins_over_negotiated_price() {
        let mut quote = quote(10_000);
        quote.closing_total = Some(Decimal::from(9_200));
        quote.negotiated_price = Some(Decimal::from(8_500));

        let breakdown = reconcile(&quote, &ReconcileOptions::default());
        assert_eq!(breakdown.final_closing_price, Decimal::from(9_200));
    }

    #[test]
    fn non_positive_closing_total_falls_through_the_chain() {
        let mut quote = quote(10_000);
        quote.closing_total = Some(Decimal::ZERO);
        quote.negotiated_price = Some(Decimal::from(8_500));

        let breakdown = reconcile(&quote, &ReconcileOptions::default());
        assert_eq!(breakdown.final_closing_price, Decimal::from(8_500));
    }

    #[test]
    fn caller_fallback_is_used_before_the_raw_price() {
        let quote = quote(10_000);
        let breakdown = reconcile(
            &quote,
            &ReconcileOptions {
                fallback_price: Some(Decimal::new(9_876_49, 2)),
                ..Default::default()
            },
        );

        // Whole-unit rounding at the closing boundary.
        assert_eq!(breakdown.final_closing_price, Decimal::from(9_876));
    }

    #[test]
    fn closing_price_rounds_half_up_to_whole_units() {
        let mut quote = quote(0);
        quote.negotiated_price = Some(Decimal::new(8_500_50, 2));

        let breakdown = reconcile(&quote, &ReconcileOptions::default());
        assert_eq!(breakdown.final_closing_price, Decimal::from(8_501));
    }

    #[test]
    fn oversized_discounts_clamp_the_commercial_base_at_zero() {
        let mut quote = quote(1_000);
        quote.discount = Discount::Amount(Decimal::from(5_000));
        quote.negotiated_price = Some(Decimal::from(800));

        let breakdown = reconcile(&quote, &ReconcileOptions::default());

        assert_eq!(breakdown.base_for_commercial_condition, Decimal::ZERO);
        // Buckets exceed list price, so the adjustment carries the whole
        // closing price relative to the clamped base.
        assert_eq!(breakdown.closing_adjustment, Decimal::from(800));
    }

    #[test]
    fn empty_quote_still_renders_a_breakdown() {
        let breakdown = reconcile(&quote(0), &ReconcileOptions::default());

        assert_eq!(breakdown.list_price, Decimal::ZERO);
        assert_eq!(breakdown.discount_in_money, Decimal::ZERO);
        assert_eq!(breakdown.final_closing_price, Decimal::ZERO);
        assert_eq!(breakdown.closing_adjustment, Decimal::ZERO);
    }

    #[test]
    fn breakdown_always_sums_to_the_closing_price() {
        let mut quote = quote(12_000);
        quote.discount = Discount::Percent(Decimal::from(5));
        quote.special_bonus = Some(Decimal::from(300));
        quote.line_items = vec![item(6_000, 2, false), item(900, 1, true)];
        quote.negotiated_price = Some(Decimal::from(10_750));

        let breakdown = reconcile(&quote, &ReconcileOptions::default());

        let rebuilt = breakdown.list_price
            - breakdown.courtesy_savings
            - breakdown.discount_in_money
            - breakdown.bonus_amount
            + breakdown.closing_adjustment;
        assert_eq!(rebuilt, breakdown.final_closing_price);
    }
}
