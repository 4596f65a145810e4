// ABOUTME: Ordered capability list of nutrition providers built from configuration
// ABOUTME: Selects the providers applicable to a query kind, preserving configured order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::core::ProviderClient;
use crate::image_guess::ImageGuessProvider;
use crate::open_food_facts::{OpenFoodFactsConfig, OpenFoodFactsProvider};
use crate::usda::{UsdaConfig, UsdaProvider};
use larder_core::models::{ProviderId, QueryKind};
use std::sync::Arc;
use tracing::{info, warn};

/// Which providers to build, in order, and how
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Enabled providers in priority order
    pub enabled: Vec<ProviderId>,
    /// USDA settings
    pub usda: UsdaConfig,
    /// Open Food Facts settings
    pub open_food_facts: OpenFoodFactsConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: vec![
                ProviderId::Usda,
                ProviderId::OpenFoodFacts,
                ProviderId::ImageGuess,
            ],
            usda: UsdaConfig::default(),
            open_food_facts: OpenFoodFactsConfig::default(),
        }
    }
}

/// Ordered list of provider capabilities
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled provider from settings
    ///
    /// A provider whose configuration is incomplete (USDA without an API key)
    /// is skipped with a warning rather than failing startup.
    #[must_use]
    pub fn from_settings(settings: &ProviderSettings, http_client: &reqwest::Client) -> Self {
        let mut registry = Self::new();
        for id in &settings.enabled {
            match id {
                ProviderId::Usda => {
                    match UsdaProvider::new(settings.usda.clone(), http_client.clone()) {
                        Ok(provider) => registry.register(Arc::new(provider)),
                        Err(e) => warn!(provider = %id, error = %e, "Skipping provider"),
                    }
                }
                ProviderId::OpenFoodFacts => registry.register(Arc::new(
                    OpenFoodFactsProvider::new(settings.open_food_facts.clone(), http_client.clone()),
                )),
                ProviderId::ImageGuess => registry.register(Arc::new(ImageGuessProvider::new())),
                ProviderId::Estimate => {
                    warn!("The estimator is always the final fallback and cannot be registered");
                }
            }
        }
        info!(providers = ?registry.ids(), "Provider registry built");
        registry
    }

    /// Append a provider; duplicates by id replace the earlier entry in place
    pub fn register(&mut self, provider: Arc<dyn ProviderClient>) {
        if let Some(slot) = self.providers.iter_mut().find(|p| p.id() == provider.id()) {
            *slot = provider;
        } else {
            self.providers.push(provider);
        }
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ProviderClient>) -> Self {
        self.register(provider);
        self
    }

    /// Providers that answer `kind`, in registration order
    #[must_use]
    pub fn applicable(&self, kind: QueryKind) -> Vec<Arc<dyn ProviderClient>> {
        self.providers
            .iter()
            .filter(|p| p.supports(kind))
            .cloned()
            .collect()
    }

    /// Registered provider ids in order
    #[must_use]
    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Number of registered providers
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
