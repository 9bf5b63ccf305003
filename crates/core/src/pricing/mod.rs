pub mod composition;
pub mod distribution;
pub mod reconciler;

use serde::{Deserialize, Serialize};

use crate::domain::policy::{CostBasis, PricingPolicy};
use crate::domain::quote::Quote;
use crate::errors::DomainError;

use self::composition::{ComposeEngine, DeterministicComposeEngine, PriceComposition};
use self::reconciler::{
    DeterministicReconcileEngine, FinancialBreakdown, ReconcileEngine, ReconcileOptions,
};

#[derive(Clone, Debug)]
pub struct QuoteEvaluationInput<'a> {
    pub quote: &'a Quote,
    pub basis: &'a CostBasis,
    pub policy: &'a PricingPolicy,
    pub fold_courtesy_into_discounts: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    pub composition: PriceComposition,
    pub breakdown: FinancialBreakdown,
}

/// Composition feeding the reconciler for one quote. Distribution stays
/// outside: it aggregates across a promise's quotes on demand.
pub trait PricingRuntime: Send + Sync {
    fn evaluate_quote(
        &self,
        input: QuoteEvaluationInput<'_>,
    ) -> Result<QuoteEvaluation, DomainError>;
}

pub struct DeterministicPricingRuntime<C, R> {
    compose_engine: C,
    reconcile_engine: R,
}

impl<C, R> DeterministicPricingRuntime<C, R> {
    pub fn new(compose_engine: C, reconcile_engine: R) -> Self {
        Self { compose_engine, reconcile_engine }
    }
}

impl Default
    for DeterministicPricingRuntime<DeterministicComposeEngine, DeterministicReconcileEngine>
{
    fn default() -> Self {
        Self::new(DeterministicComposeEngine, DeterministicReconcileEngine)
    }
}

impl<C, R> PricingRuntime for DeterministicPricingRuntime<C, R>
where
    C: ComposeEngine,
    R: ReconcileEngine,
{
    fn evaluate_quote(
        &self,
        input: QuoteEvaluationInput<'_>,
    ) -> Result<QuoteEvaluation, DomainError> {
        let composition = self.compose_engine.compose(input.basis, input.policy)?;

        // The composed final price backs the closing price when negotiation
        // recorded nothing; full precision here, whole-unit rounding happens
        // inside the reconciler at the closing boundary.
        let options = ReconcileOptions {
            fallback_price: Some(composition.final_price),
            fold_courtesy_into_discounts: input.fold_courtesy_into_discounts,
        };
        let breakdown = self.reconcile_engine.reconcile(input.quote, &options);

        Ok(QuoteEvaluation { composition: composition.rounded(), breakdown })
    }
}
