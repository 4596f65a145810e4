// ABOUTME: USDA FoodData Central provider for authoritative free-text nutrition lookup
// ABOUTME: Search with per-100g scaling, bounded response cache, rate limiting, and circuit breaker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! USDA `FoodData` Central provider
//!
//! Queries `GET {base_url}/foods/search`. Search hits carry nutrient amounts
//! per 100 g, which are scaled to the requested portion before returning.
//! The provider's own relevance order is the native match signal.
//!
//! API reference: <https://fdc.nal.usda.gov/api-guide.html>

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::core::ProviderClient;
use crate::http_client::{status_error, transport_error};
use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use larder_core::errors::provider::{ProviderError, ProviderResult};
use larder_core::errors::{AppError, AppResult, ErrorCode};
use larder_core::models::{
    FoodQuery, MatchSignal, NutritionFacts, Portion, ProviderId, QueryKind, RawResult,
};
use larder_core::units;
use lru::LruCache;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// FDC nutrient ids mapped onto `NutritionFacts`
mod nutrient_ids {
    pub const ENERGY_KCAL: u32 = 1008;
    pub const ENERGY_ATWATER_GENERAL: u32 = 2047;
    pub const PROTEIN: u32 = 1003;
    pub const FAT: u32 = 1004;
    pub const CARBS: u32 = 1005;
    pub const FIBER: u32 = 1079;
    pub const SODIUM: u32 = 1093;
    pub const SUGAR: u32 = 2000;
    pub const SATURATED_FAT: u32 = 1258;
}

/// USDA provider configuration
#[derive(Debug, Clone)]
pub struct UsdaConfig {
    /// API key from <https://fdc.nal.usda.gov/api-key-signup.html>
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Hits requested per search
    pub page_size: u32,
    /// How long a search response stays cached
    pub cache_ttl_secs: u64,
    /// Maximum cached search responses
    pub cache_capacity: usize,
    /// Requests allowed per minute
    pub rate_limit_per_minute: u32,
}

impl Default for UsdaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            page_size: 10,
            cache_ttl_secs: 86_400,
            cache_capacity: 512,
            rate_limit_per_minute: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    description: String,
    #[serde(default)]
    brand_name: Option<String>,
    #[serde(default)]
    brand_owner: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<SearchNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNutrient {
    nutrient_id: Option<u32>,
    value: Option<f64>,
}

/// A search hit reduced to what resolution needs, per 100 g
#[derive(Debug, Clone, PartialEq)]
struct UsdaFood {
    name: String,
    brand: Option<String>,
    per_100g: NutritionFacts,
}

impl UsdaFood {
    fn to_raw(&self, position: usize, portion: &Portion) -> RawResult {
        let factor = units::per_100g_factor(portion.quantity, &portion.unit);
        RawResult {
            name: self.name.clone(),
            brand: self.brand.clone(),
            quantity: portion.quantity,
            unit: portion.unit.clone(),
            nutrition: self.per_100g.scaled(factor),
            signal: MatchSignal::Rank { position },
        }
    }
}

fn nutrition_from(nutrients: &[SearchNutrient]) -> NutritionFacts {
    let value = |id: u32| {
        nutrients
            .iter()
            .find(|n| n.nutrient_id == Some(id))
            .and_then(|n| n.value)
    };

    NutritionFacts {
        calories: value(nutrient_ids::ENERGY_KCAL)
            .or_else(|| value(nutrient_ids::ENERGY_ATWATER_GENERAL)),
        protein_g: value(nutrient_ids::PROTEIN),
        carbs_g: value(nutrient_ids::CARBS),
        fat_g: value(nutrient_ids::FAT),
        fiber_g: value(nutrient_ids::FIBER),
        sodium_mg: value(nutrient_ids::SODIUM),
        sugar_g: value(nutrient_ids::SUGAR),
        saturated_fat_g: value(nutrient_ids::SATURATED_FAT),
    }
}

/// Parse a `/foods/search` body, dropping hits without any usable nutrient
fn parse_search_response(body: &[u8]) -> Result<Vec<UsdaFood>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response
        .foods
        .into_iter()
        .filter_map(|food| {
            let per_100g = nutrition_from(&food.food_nutrients);
            if per_100g.is_empty() || food.description.trim().is_empty() {
                return None;
            }
            Some(UsdaFood {
                name: food.description,
                brand: food
                    .brand_name
                    .or(food.brand_owner)
                    .filter(|b| !b.trim().is_empty()),
                per_100g,
            })
        })
        .collect())
}

struct CachedSearch {
    foods: Vec<UsdaFood>,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

/// USDA `FoodData` Central search provider
pub struct UsdaProvider {
    config: UsdaConfig,
    api_key: String,
    http_client: reqwest::Client,
    cache: Mutex<LruCache<String, CachedSearch>>,
    rate_limiter: Mutex<RateLimiter>,
    breaker: CircuitBreaker,
}

impl UsdaProvider {
    /// Build the provider
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_MISSING` when no API key is configured.
    pub fn new(config: UsdaConfig, http_client: reqwest::Client) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::new(ErrorCode::ConfigMissing, "USDA_API_KEY is not set"))?;

        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            rate_limiter: Mutex::new(RateLimiter::per_minute(config.rate_limit_per_minute)),
            cache: Mutex::new(LruCache::new(capacity)),
            breaker: CircuitBreaker::with_config(
                ProviderId::Usda,
                CircuitBreakerConfig::new(5, Duration::from_secs(30), 1),
            ),
            config,
            api_key,
            http_client,
        })
    }

    fn cache_key(&self, text: &str) -> String {
        format!("{}:{}", text.trim().to_lowercase(), self.config.page_size)
    }

    async fn cached(&self, key: &str) -> Option<Vec<UsdaFood>> {
        let mut cache = self.cache.lock().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at.is_none_or(|at| Instant::now() < at) => {
                Some(entry.foods.clone())
            }
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    async fn store(&self, key: String, foods: Vec<UsdaFood>) {
        let expires_at =
            Instant::now().checked_add(Duration::from_secs(self.config.cache_ttl_secs));
        self.cache
            .lock()
            .await
            .put(key, CachedSearch { foods, expires_at });
    }

    async fn fetch(&self, text: &str, timeout: Duration) -> ProviderResult<Vec<UsdaFood>> {
        let url = format!("{}/foods/search", self.config.base_url.trim_end_matches('/'));
        let page_size = self.config.page_size.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", text),
                ("pageSize", page_size.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(ProviderId::Usda, timeout, &e))?;

        if !response.status().is_success() {
            return Err(status_error(ProviderId::Usda, response.status()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(ProviderId::Usda, timeout, &e))?;

        parse_search_response(&body)
            .map_err(|e| ProviderError::malformed(ProviderId::Usda, e.to_string()))
    }
}

#[async_trait]
impl ProviderClient for UsdaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Usda
    }

    fn supports(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Text
    }

    async fn search(
        &self,
        query: &FoodQuery,
        portion: &Portion,
        timeout: Duration,
    ) -> ProviderResult<Vec<RawResult>> {
        let FoodQuery::Text { text } = query else {
            return Ok(Vec::new());
        };

        let key = self.cache_key(text);
        let foods = if let Some(foods) = self.cached(&key).await {
            debug!(provider = %ProviderId::Usda, query = %text, "USDA cache hit");
            foods
        } else {
            self.rate_limiter
                .lock()
                .await
                .try_acquire()
                .map_err(|wait| ProviderError::RateLimited {
                    provider: ProviderId::Usda,
                    retry_after_secs: wait.as_secs().max(1),
                })?;

            let foods = self.breaker.call(self.fetch(text.trim(), timeout)).await?;
            self.store(key, foods.clone()).await;
            foods
        };

        Ok(foods
            .iter()
            .enumerate()
            .map(|(position, food)| food.to_raw(position, portion))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_FIXTURE: &str = r#"{
        "totalHits": 3,
        "foods": [
            {
                "fdcId": 173944,
                "description": "Bananas, raw",
                "dataType": "SR Legacy",
                "foodNutrients": [
                    {"nutrientId": 1003, "nutrientName": "Protein", "unitName": "G", "value": 1.09},
                    {"nutrientId": 1004, "nutrientName": "Total lipid (fat)", "unitName": "G", "value": 0.33},
                    {"nutrientId": 1005, "nutrientName": "Carbohydrate, by difference", "unitName": "G", "value": 22.8},
                    {"nutrientId": 1008, "nutrientName": "Energy", "unitName": "KCAL", "value": 89.0},
                    {"nutrientId": 1093, "nutrientName": "Sodium, Na", "unitName": "MG", "value": 1.0}
                ]
            },
            {
                "fdcId": 2345678,
                "description": "BANANA CHIPS",
                "dataType": "Branded",
                "brandOwner": "Snack Co",
                "foodNutrients": [
                    {"nutrientId": 2047, "nutrientName": "Energy (Atwater General Factors)", "unitName": "KCAL", "value": 519.0},
                    {"nutrientId": 1258, "nutrientName": "Fatty acids, total saturated", "unitName": "G", "value": 29.0}
                ]
            },
            {
                "fdcId": 1,
                "description": "Banana, no data",
                "dataType": "Foundation",
                "foodNutrients": []
            }
        ]
    }"#;

    fn provider(rate_limit_per_minute: u32) -> UsdaProvider {
        UsdaProvider::new(
            UsdaConfig {
                api_key: Some("test-key".into()),
                base_url: "http://127.0.0.1:9".into(),
                rate_limit_per_minute,
                ..UsdaConfig::default()
            },
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_search_fixture() {
        let foods = parse_search_response(SEARCH_FIXTURE.as_bytes()).unwrap();
        assert_eq!(foods.len(), 2, "hits with no nutrients are dropped");

        assert_eq!(foods[0].name, "Bananas, raw");
        assert_eq!(foods[0].brand, None);
        assert_eq!(foods[0].per_100g.calories, Some(89.0));
        assert_eq!(foods[0].per_100g.carbs_g, Some(22.8));
        assert_eq!(foods[0].per_100g.fiber_g, None);

        assert_eq!(foods[1].brand.as_deref(), Some("Snack Co"));
        assert_eq!(foods[1].per_100g.calories, Some(519.0));
        assert_eq!(foods[1].per_100g.saturated_fat_g, Some(29.0));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_search_response(b"<html>maintenance</html>").is_err());
    }

    #[test]
    fn test_results_scaled_to_portion_with_rank_signal() {
        let foods = parse_search_response(SEARCH_FIXTURE.as_bytes()).unwrap();
        let raw = foods[0].to_raw(0, &Portion::new(150.0, "g"));
        assert_eq!(raw.quantity, 150.0);
        assert_eq!(raw.nutrition.calories, Some(133.5));
        assert_eq!(raw.signal, MatchSignal::Rank { position: 0 });
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let error = UsdaProvider::new(UsdaConfig::default(), reqwest::Client::new())
            .err()
            .unwrap();
        assert_eq!(error.code, ErrorCode::ConfigMissing);
    }

    #[tokio::test]
    async fn test_rate_limit_fails_fast() {
        let usda = provider(0);
        let error = usda
            .search(
                &FoodQuery::text("banana"),
                &Portion::default(),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let usda = provider(0);
        let foods = parse_search_response(SEARCH_FIXTURE.as_bytes()).unwrap();
        usda.store(usda.cache_key("Banana "), foods).await;

        let results = usda
            .search(
                &FoodQuery::text("banana"),
                &Portion::new(50.0, "g"),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].signal, MatchSignal::Rank { position: 1 });
        assert_eq!(results[0].nutrition.calories, Some(44.5));
    }

    #[tokio::test]
    async fn test_unbounded_cache_ttl_never_expires() {
        let usda = UsdaProvider::new(
            UsdaConfig {
                api_key: Some("test-key".into()),
                base_url: "http://127.0.0.1:9".into(),
                rate_limit_per_minute: 0,
                cache_ttl_secs: u64::MAX,
                ..UsdaConfig::default()
            },
            reqwest::Client::new(),
        )
        .unwrap();
        let foods = parse_search_response(SEARCH_FIXTURE.as_bytes()).unwrap();
        usda.store(usda.cache_key("banana"), foods).await;

        let cached = usda.cached(&usda.cache_key("banana")).await.unwrap();
        assert_eq!(cached.len(), 2);
    }

    #[tokio::test]
    async fn test_barcode_queries_are_not_answered() {
        let usda = provider(30);
        assert!(!usda.supports(QueryKind::Barcode));
        let results = usda
            .search(
                &FoodQuery::barcode("3017620422003"),
                &Portion::default(),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
