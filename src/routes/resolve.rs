// ABOUTME: Nutrition resolution and usage management route handlers
// ABOUTME: POST resolve, GET usage snapshot, and DELETE usage reset for a subject
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition routes
//!
//! Quota exhaustion is reported as a flag on a `200 OK` body; the caller
//! decides how to surface it. Only invalid input and "nothing found, no
//! estimate permitted" are error responses.

use super::ResolverResources;
use crate::constants::defaults;
use crate::errors::AppError;
use crate::models::{FoodQuery, Portion};
use crate::resolution::{Resolution, ResolutionRequest};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Body of `POST /api/nutrition/resolve`
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveBody {
    /// Guest session id or user id
    pub subject_key: String,
    /// Query payload tagged by `kind`
    pub query: FoodQuery,
    /// Portion amount for text and barcode queries
    #[serde(default)]
    pub quantity: Option<f64>,
    /// Portion unit for text and barcode queries
    #[serde(default)]
    pub unit: Option<String>,
}

impl From<ResolveBody> for ResolutionRequest {
    fn from(body: ResolveBody) -> Self {
        let portion = (body.quantity.is_some() || body.unit.is_some()).then(|| {
            Portion::new(
                body.quantity.unwrap_or(defaults::PORTION_QUANTITY),
                body.unit
                    .unwrap_or_else(|| defaults::PORTION_UNIT.to_owned()),
            )
        });
        Self {
            subject_key: body.subject_key,
            query: body.query,
            portion,
        }
    }
}

/// Response of `POST /api/nutrition/resolve`
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// Correlation id, also attached to the request's log span
    pub request_id: Uuid,
    /// Resolution outcome
    #[serde(flatten)]
    pub resolution: Resolution,
}

/// Nutrition routes implementation
pub struct NutritionRoutes;

impl NutritionRoutes {
    /// Create all nutrition routes
    pub fn routes(resources: Arc<ResolverResources>) -> Router {
        Router::new()
            .route("/api/nutrition/resolve", post(Self::handle_resolve))
            .route(
                "/api/nutrition/usage/:subject_key",
                get(Self::handle_get_usage).delete(Self::handle_reset_usage),
            )
            .with_state(resources)
    }

    async fn handle_resolve(
        State(resources): State<Arc<ResolverResources>>,
        Json(body): Json<ResolveBody>,
    ) -> Result<Response, AppError> {
        let request_id = Uuid::new_v4();
        let request = ResolutionRequest::from(body);
        let span = info_span!(
            "resolve",
            request_id = %request_id,
            query.kind = %request.query.kind()
        );

        let resolution = resources
            .orchestrator
            .resolve(&request)
            .instrument(span)
            .await?;

        Ok((
            StatusCode::OK,
            Json(ResolveResponse {
                request_id,
                resolution,
            }),
        )
            .into_response())
    }

    async fn handle_get_usage(
        State(resources): State<Arc<ResolverResources>>,
        Path(subject_key): Path<String>,
    ) -> Result<Response, AppError> {
        let snapshot = resources.ledger.usage(&subject_key).await?;
        Ok((StatusCode::OK, Json(snapshot)).into_response())
    }

    async fn handle_reset_usage(
        State(resources): State<Arc<ResolverResources>>,
        Path(subject_key): Path<String>,
    ) -> Result<Response, AppError> {
        let removed = resources.ledger.reset(&subject_key).await?;
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "subject_key": subject_key,
                "removed": removed
            })),
        )
            .into_response())
    }
}
