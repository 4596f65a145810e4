// ABOUTME: Open Food Facts provider for barcode lookup and brand-aware product search
// ABOUTME: Parses loosely typed nutriments and scales per-100g values to the requested portion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Open Food Facts provider
//!
//! - Barcode: `GET {base}/api/v2/product/{code}.json`. An unknown product
//!   (`status: 0` or HTTP 404) is an empty answer, not an error. A hit is an
//!   exact identifier match.
//! - Text: `GET {base}/cgi/search.pl?...&json=1`, ranked by the provider.
//!
//! Community-maintained nutriments are numbers or numeric strings depending
//! on the product, and sodium is reported in grams.

use crate::circuit_breaker::CircuitBreaker;
use crate::core::ProviderClient;
use crate::http_client::{status_error, transport_error};
use async_trait::async_trait;
use larder_core::errors::provider::{ProviderError, ProviderResult};
use larder_core::models::{
    FoodQuery, MatchSignal, NutritionFacts, Portion, ProviderId, QueryKind, RawResult,
};
use larder_core::units;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Open Food Facts provider configuration
#[derive(Debug, Clone)]
pub struct OpenFoodFactsConfig {
    /// API base URL
    pub base_url: String,
    /// Products requested per text search
    pub page_size: u32,
    /// User-Agent sent with every request, as the API asks clients to identify themselves
    pub user_agent: String,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            page_size: 10,
            user_agent: format!("larder/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    generic_name: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    nutriments: HashMap<String, Value>,
}

impl Product {
    fn name(&self) -> Option<&str> {
        [&self.product_name, &self.generic_name]
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
    }

    /// First listed brand; the field is a comma separated list
    fn brand(&self) -> Option<String> {
        self.brands
            .as_deref()
            .and_then(|brands| brands.split(',').next())
            .map(str::trim)
            .filter(|brand| !brand.is_empty())
            .map(str::to_owned)
    }

    fn nutriment(&self, key: &str) -> Option<f64> {
        match self.nutriments.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    fn per_100g(&self) -> NutritionFacts {
        NutritionFacts {
            calories: self.nutriment("energy-kcal_100g"),
            protein_g: self.nutriment("proteins_100g"),
            carbs_g: self.nutriment("carbohydrates_100g"),
            fat_g: self.nutriment("fat_100g"),
            fiber_g: self.nutriment("fiber_100g"),
            sodium_mg: self.nutriment("sodium_100g").map(|grams| grams * 1000.0),
            sugar_g: self.nutriment("sugars_100g"),
            saturated_fat_g: self.nutriment("saturated-fat_100g"),
        }
    }

    fn to_raw(&self, signal: MatchSignal, portion: &Portion) -> Option<RawResult> {
        let name = self.name()?;
        let per_100g = self.per_100g();
        if per_100g.is_empty() {
            return None;
        }
        Some(RawResult {
            name: name.to_owned(),
            brand: self.brand(),
            quantity: portion.quantity,
            unit: portion.unit.clone(),
            nutrition: per_100g.scaled(units::per_100g_factor(portion.quantity, &portion.unit)),
            signal,
        })
    }
}

fn parse_product_response(
    body: &[u8],
    portion: &Portion,
) -> Result<Vec<RawResult>, serde_json::Error> {
    let response: ProductResponse = serde_json::from_slice(body)?;
    if response.status == 0 {
        return Ok(Vec::new());
    }
    Ok(response
        .product
        .and_then(|product| product.to_raw(MatchSignal::ExactMatch, portion))
        .into_iter()
        .collect())
}

fn parse_search_response(
    body: &[u8],
    portion: &Portion,
) -> Result<Vec<RawResult>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response
        .products
        .iter()
        .filter_map(|product| product.to_raw(MatchSignal::Missing, portion))
        .enumerate()
        .map(|(position, mut raw)| {
            raw.signal = MatchSignal::Rank { position };
            raw
        })
        .collect())
}

/// Open Food Facts barcode and text search provider
pub struct OpenFoodFactsProvider {
    config: OpenFoodFactsConfig,
    http_client: reqwest::Client,
    breaker: CircuitBreaker,
}

impl OpenFoodFactsProvider {
    /// Build the provider
    #[must_use]
    pub fn new(config: OpenFoodFactsConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
            breaker: CircuitBreaker::new(ProviderId::OpenFoodFacts),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn get(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
        missing_is_empty: bool,
    ) -> ProviderResult<Option<Vec<u8>>> {
        let id = ProviderId::OpenFoodFacts;
        let response = request
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(id, timeout, &e))?;

        let status = response.status();
        if missing_is_empty && status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(id, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(id, timeout, &e))?;
        Ok(Some(body.to_vec()))
    }

    async fn lookup_barcode(
        &self,
        barcode: &str,
        portion: &Portion,
        timeout: Duration,
    ) -> ProviderResult<Vec<RawResult>> {
        let url = format!("{}/api/v2/product/{}.json", self.base_url(), barcode.trim());
        let Some(body) = self.get(self.http_client.get(url), timeout, true).await? else {
            return Ok(Vec::new());
        };
        parse_product_response(&body, portion)
            .map_err(|e| ProviderError::malformed(ProviderId::OpenFoodFacts, e.to_string()))
    }

    async fn search_text(
        &self,
        text: &str,
        portion: &Portion,
        timeout: Duration,
    ) -> ProviderResult<Vec<RawResult>> {
        let url = format!("{}/cgi/search.pl", self.base_url());
        let page_size = self.config.page_size.to_string();
        let request = self.http_client.get(url).query(&[
            ("search_terms", text.trim()),
            ("search_simple", "1"),
            ("action", "process"),
            ("json", "1"),
            ("page_size", page_size.as_str()),
        ]);
        let body = self
            .get(request, timeout, false)
            .await?
            .unwrap_or_default();
        parse_search_response(&body, portion)
            .map_err(|e| ProviderError::malformed(ProviderId::OpenFoodFacts, e.to_string()))
    }
}

#[async_trait]
impl ProviderClient for OpenFoodFactsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenFoodFacts
    }

    fn supports(&self, kind: QueryKind) -> bool {
        matches!(kind, QueryKind::Text | QueryKind::Barcode)
    }

    async fn search(
        &self,
        query: &FoodQuery,
        portion: &Portion,
        timeout: Duration,
    ) -> ProviderResult<Vec<RawResult>> {
        match query {
            FoodQuery::Barcode { barcode } => {
                self.breaker
                    .call(self.lookup_barcode(barcode, portion, timeout))
                    .await
            }
            FoodQuery::Text { text } => {
                self.breaker
                    .call(self.search_text(text, portion, timeout))
                    .await
            }
            FoodQuery::ImageGuess(_) => Ok(Vec::new()),
        }
    }
}
