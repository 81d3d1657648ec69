use std::future::Future;
use std::sync::Arc;

use crate::{
    errors::{AppError, Result},
    models::{NewCreation, UserAccount},
    services::{
        creations::CreationStore,
        identity::IdentityStore,
        metrics::MetricsService,
        providers::ProviderResult,
        quota_gate::{Decision, DenyReason, Feature, QuotaGate},
    },
};

/// Permission to run one feature for one user, issued by the quota gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    user_id: String,
    feature: Feature,
    metered: bool,
}

impl Grant {
    pub fn is_metered(&self) -> bool {
        self.metered
    }
}

/// What to record once the provider has produced content.
#[derive(Debug, Clone)]
pub struct CreationDraft {
    pub prompt: String,
    pub publish: bool,
}

impl CreationDraft {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            publish: false,
        }
    }

    pub fn published(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }
}

/// Runs the authorize → reserve → provider → record sequence shared by
/// every generation endpoint.
#[derive(Clone)]
pub struct GenerationService {
    gate: QuotaGate,
    identity: Arc<dyn IdentityStore>,
    creations: Arc<dyn CreationStore>,
    metrics: Arc<MetricsService>,
}

impl GenerationService {
    pub fn new(
        gate: QuotaGate,
        identity: Arc<dyn IdentityStore>,
        creations: Arc<dyn CreationStore>,
        metrics: Arc<MetricsService>,
    ) -> Self {
        Self {
            gate,
            identity,
            creations,
            metrics,
        }
    }

    /// Pure plan/quota check. Has no side effects beyond metrics.
    pub fn authorize(&self, account: &UserAccount, feature: Feature) -> Result<Grant> {
        match self.gate.check(feature, account) {
            Decision::Allow { metered } => Ok(Grant {
                user_id: account.user_id.clone(),
                feature,
                metered,
            }),
            Decision::Deny(reason) => {
                tracing::info!(
                    user_id = %account.user_id,
                    feature = feature.as_str(),
                    free_usage = account.free_usage,
                    reason = reason.as_str(),
                    "request denied by quota gate"
                );
                self.metrics.record_denial(feature, reason);
                Err(match reason {
                    DenyReason::LimitReached => AppError::LimitReached,
                    DenyReason::PlanDenied => AppError::PlanDenied,
                })
            }
        }
    }

    /// Takes a unit of free usage (metered grants only), runs `produce`, and
    /// records the result. A provider failure hands the unit back and writes
    /// nothing. A failed record write is logged and does not fail the call.
    pub async fn execute<F, Fut>(&self, grant: Grant, draft: CreationDraft, produce: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ProviderResult<String>>,
    {
        if grant.metered
            && !self
                .identity
                .try_consume(&grant.user_id, self.gate.free_limit())
                .await?
        {
            tracing::info!(user_id = %grant.user_id, "free usage exhausted by a concurrent request");
            self.metrics
                .record_denial(grant.feature, DenyReason::LimitReached);
            return Err(AppError::LimitReached);
        }

        let content = match produce().await {
            Ok(content) => content,
            Err(e) => {
                self.metrics.record_provider_failure(grant.feature);
                if grant.metered {
                    if let Err(release_error) = self.identity.release(&grant.user_id).await {
                        tracing::warn!(
                            user_id = %grant.user_id,
                            error = %release_error,
                            "failed to release free usage after provider failure"
                        );
                    }
                }
                return Err(e.into());
            }
        };

        let record = NewCreation {
            user_id: grant.user_id.clone(),
            prompt: draft.prompt,
            content: content.clone(),
            creation_type: grant.feature.creation_type(),
            publish: draft.publish,
        };

        match self.creations.insert(record).await {
            Ok(creation) => {
                tracing::info!(
                    user_id = %grant.user_id,
                    creation_id = %creation.id,
                    feature = grant.feature.as_str(),
                    "creation recorded"
                );
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %grant.user_id,
                    feature = grant.feature.as_str(),
                    error = %e,
                    "failed to record creation"
                );
                self.metrics.record_persistence_failure();
            }
        }

        self.metrics.record_generation(grant.feature);
        Ok(content)
    }
}
