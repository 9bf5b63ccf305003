use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromiseId(pub Uuid);

impl std::fmt::Display for PromiseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferrerId(pub Uuid);

/// Staff referrers are eligible for a share of the commission pool; contact
/// referrers are acknowledged but not paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferrerKind {
    Staff,
    Contact,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    pub id: ReferrerId,
    pub kind: ReferrerKind,
}

/// Who gets credit for a deal. Set once when the deal is created; finalized
/// payouts must not be re-attributed, which the persisting caller enforces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub promise_id: PromiseId,
    pub sales_agent_id: Option<AgentId>,
    pub referrer: Option<Referrer>,
}

impl Attribution {
    pub fn staff_referrer(&self) -> Option<&Referrer> {
        self.referrer.as_ref().filter(|referrer| referrer.kind == ReferrerKind::Staff)
    }
}
