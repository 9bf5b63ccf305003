use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::attribution::PromiseId;
use crate::domain::quote::QuoteId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid pricing policy: {field} = {value} is outside [0, 100)")]
    InvalidPolicy { field: &'static str, value: Decimal },
    #[error("promise {0} does not exist or carries no commission settings")]
    PromiseNotFound(PromiseId),
    #[error("quote {id} is frozen and no longer accepts changes")]
    FrozenQuote { id: QuoteId },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::domain::attribution::PromiseId;

    use super::DomainError;

    #[test]
    fn invalid_policy_names_the_offending_field() {
        let error =
            DomainError::InvalidPolicy { field: "commission_percent", value: Decimal::from(100) };

        assert_eq!(
            error.to_string(),
            "invalid pricing policy: commission_percent = 100 is outside [0, 100)"
        );
    }

    #[test]
    fn promise_not_found_carries_the_promise_id() {
        let id = PromiseId(Uuid::nil());
        let error = DomainError::PromiseNotFound(id.clone());

        assert!(error.to_string().contains(&id.to_string()));
    }
}
