use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Premium,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Premium => "premium",
        }
    }

    /// Unknown plan names fall back to the free tier.
    pub fn parse(value: &str) -> Self {
        match value {
            "premium" => Plan::Premium,
            _ => Plan::Free,
        }
    }
}

/// Plan and usage as held by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserAccount {
    pub user_id: String,
    pub plan: Plan,
    pub free_usage: u32,
}

impl UserAccount {
    pub fn new(user_id: impl Into<String>, plan: Plan, free_usage: u32) -> Self {
        Self {
            user_id: user_id.into(),
            plan,
            free_usage,
        }
    }

    pub fn is_premium(&self) -> bool {
        self.plan == Plan::Premium
    }
}
