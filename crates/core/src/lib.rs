pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};
pub use domain::attribution::{
    AgentId, Attribution, PromiseId, Referrer, ReferrerId, ReferrerKind,
};
pub use domain::policy::{
    CommissionSettings, CostBasis, PricingPolicy, ReferralReward, StudioSettings,
};
pub use domain::quote::{Discount, LineItem, Quote, QuoteId, QuoteState};
pub use errors::DomainError;
pub use pricing::composition::{
    compose, ComposeEngine, DeterministicComposeEngine, PriceComposition,
};
pub use pricing::distribution::{
    distribute, split_pool, ActiveQuote, CommissionSplit, InMemoryPromiseSource, PromiseSnapshot,
    PromiseSource,
};
pub use pricing::reconciler::{
    reconcile, DeterministicReconcileEngine, FinancialBreakdown, ReconcileEngine, ReconcileOptions,
};
pub use pricing::{
    DeterministicPricingRuntime, PricingRuntime, QuoteEvaluation, QuoteEvaluationInput,
};
