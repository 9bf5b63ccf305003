use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::attribution::{Attribution, PromiseId};
use crate::domain::policy::{CommissionSettings, ReferralReward};
use crate::errors::DomainError;

/// One active (non-archived, non-rejected) quote as seen by the aggregation.
/// The discount here is already resolved to money by the owning quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveQuote {
    pub price: Decimal,
    pub discount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromiseSnapshot {
    pub attribution: Attribution,
    pub active_quotes: Vec<ActiveQuote>,
    pub settings: Option<CommissionSettings>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSplit {
    pub total_quote_amount: Decimal,
    pub commission_pool: Decimal,
    pub sales_agent_amount: Decimal,
    pub referrer_amount: Decimal,
}

/// Data-fetch boundary for distribution: the single await in the pipeline.
#[async_trait]
pub trait PromiseSource: Send + Sync {
    async fn fetch(&self, promise_id: &PromiseId) -> Option<PromiseSnapshot>;
}

#[derive(Default)]
pub struct InMemoryPromiseSource {
    promises: HashMap<PromiseId, PromiseSnapshot>,
}

impl InMemoryPromiseSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, promise_id: PromiseId, snapshot: PromiseSnapshot) {
        self.promises.insert(promise_id, snapshot);
    }
}

#[async_trait]
impl PromiseSource for InMemoryPromiseSource {
    async fn fetch(&self, promise_id: &PromiseId) -> Option<PromiseSnapshot> {
        self.promises.get(promise_id).cloned()
    }
}

/// Splits the promise's commission pool between the sales agent and an
/// optional referrer. Fails with `PromiseNotFound` when the promise is
/// unknown or carries no commission settings; everything past the fetch is a
/// pure aggregation.
pub async fn distribute<S>(
    source: &S,
    promise_id: &PromiseId,
) -> Result<CommissionSplit, DomainError>
where
    S: PromiseSource + ?Sized,
{
    let snapshot = source
        .fetch(promise_id)
        .await
        .ok_or_else(|| DomainError::PromiseNotFound(promise_id.clone()))?;
    let settings = snapshot
        .settings
        .as_ref()
        .ok_or_else(|| DomainError::PromiseNotFound(promise_id.clone()))?;

    Ok(split_pool(&snapshot.attribution, &snapshot.active_quotes, settings))
}

pub fn split_pool(
    attribution: &Attribution,
    active_quotes: &[ActiveQuote],
    settings: &CommissionSettings,
) -> CommissionSplit {
    let total_quote_amount: Decimal = active_quotes
        .iter()
        .map(|quote| (quote.price - quote.discount).max(Decimal::ZERO))
        .sum();
    let commission_pool = total_quote_amount * settings.sales_commission_rate;

    // Only staff referrers draw from the pool; contact referrals are
    // acknowledged without compensation.
    let referrer_amount = match attribution.staff_referrer() {
        Some(_) => match settings.referral_reward {
            ReferralReward::Percentage(share) => commission_pool * share,
            ReferralReward::Fixed(amount) => amount.min(commission_pool),
        },
        None => Decimal::ZERO,
    };

    // Remainder split keeps conservation exact in every branch.
    let sales_agent_amount = commission_pool - referrer_amount;

    CommissionSplit { total_quote_amount, commission_pool, sales_agent_amount, referrer_amount }
}
