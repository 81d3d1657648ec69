use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    services::{
        providers::Providers, CreationStore, GenerationService, IdentityStore, MetricsService,
        QuotaGate,
    },
};

pub mod ai;
pub mod docs;
pub mod health;
pub mod metrics;
pub mod user;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: Arc<JwtService>,
    pub identity: Arc<dyn IdentityStore>,
    pub creations: Arc<dyn CreationStore>,
    pub providers: Providers,
    pub generation: GenerationService,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(
        config: Config,
        jwt: JwtService,
        identity: Arc<dyn IdentityStore>,
        creations: Arc<dyn CreationStore>,
        providers: Providers,
    ) -> Self {
        let metrics = Arc::new(MetricsService::new());
        let generation = GenerationService::new(
            QuotaGate::new(config.free_usage_limit),
            identity.clone(),
            creations.clone(),
            metrics.clone(),
        );

        Self {
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            identity,
            creations,
            providers,
            generation,
            metrics,
        }
    }
}
