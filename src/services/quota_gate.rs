use crate::models::{CreationType, UserAccount};

/// Flat free-tier allowance, one unit per metered action.
pub const DEFAULT_FREE_USAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Article,
    BlogTitle,
    ResumeReview,
    ImageGeneration,
    BackgroundRemoval,
    ObjectRemoval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Free users may run it while under the limit; each run costs one unit.
    Metered,
    PremiumOnly,
}

impl Feature {
    pub fn access(&self) -> Access {
        match self {
            Feature::Article | Feature::BlogTitle | Feature::ResumeReview => Access::Metered,
            Feature::ImageGeneration | Feature::BackgroundRemoval | Feature::ObjectRemoval => {
                Access::PremiumOnly
            }
        }
    }

    pub fn creation_type(&self) -> CreationType {
        match self {
            Feature::Article => CreationType::Article,
            Feature::BlogTitle => CreationType::BlogTitle,
            Feature::ResumeReview => CreationType::ResumeReview,
            Feature::ImageGeneration | Feature::BackgroundRemoval | Feature::ObjectRemoval => {
                CreationType::Image
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Article => "article",
            Feature::BlogTitle => "blog_title",
            Feature::ResumeReview => "resume_review",
            Feature::ImageGeneration => "image_generation",
            Feature::BackgroundRemoval => "background_removal",
            Feature::ObjectRemoval => "object_removal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    LimitReached,
    PlanDenied,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::LimitReached => "limit_reached",
            DenyReason::PlanDenied => "plan_denied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// `metered` is set when the action must consume a unit of free usage.
    Allow { metered: bool },
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy)]
pub struct QuotaGate {
    free_limit: u32,
}

impl Default for QuotaGate {
    fn default() -> Self {
        Self::new(DEFAULT_FREE_USAGE_LIMIT)
    }
}

impl QuotaGate {
    pub fn new(free_limit: u32) -> Self {
        Self { free_limit }
    }

    pub fn free_limit(&self) -> u32 {
        self.free_limit
    }

    pub fn check(&self, feature: Feature, account: &UserAccount) -> Decision {
        if account.is_premium() {
            return Decision::Allow { metered: false };
        }

        match feature.access() {
            Access::PremiumOnly => Decision::Deny(DenyReason::PlanDenied),
            Access::Metered if account.free_usage >= self.free_limit => {
                Decision::Deny(DenyReason::LimitReached)
            }
            Access::Metered => Decision::Allow { metered: true },
        }
    }
}
