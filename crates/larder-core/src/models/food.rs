// ABOUTME: Food query and canonical nutrition record models
// ABOUTME: FoodQuery, Portion, ImageGuess, NutritionFacts, and ResolvedFood definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::provider::ProviderId;
use crate::constants::{defaults, limits};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of food query, used to select applicable providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Free-text description
    Text,
    /// Product barcode (EAN/UPC/GTIN)
    Barcode,
    /// Guess produced by an external image-recognition model
    ImageGuess,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Barcode => f.write_str("barcode"),
            Self::ImageGuess => f.write_str("image_guess"),
        }
    }
}

/// A single food guess from the image-recognition model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGuess {
    /// Guessed food name
    pub name: String,
    /// Guessed quantity
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Model's own confidence in this guess, if it reported one
    #[serde(default, alias = "sourceConfidence")]
    pub source_confidence: Option<f64>,
}

/// Input to resolution, constructed once per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FoodQuery {
    /// Free-text search
    Text {
        /// Food description as typed by the user
        text: String,
    },
    /// Barcode lookup
    Barcode {
        /// Digits of the scanned barcode
        barcode: String,
    },
    /// AI-derived guess from an image
    ImageGuess(ImageGuess),
}

impl FoodQuery {
    /// Build a text query
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Build a barcode query
    #[must_use]
    pub fn barcode(barcode: impl Into<String>) -> Self {
        Self::Barcode {
            barcode: barcode.into(),
        }
    }

    /// Kind of this query
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        match self {
            Self::Text { .. } => QueryKind::Text,
            Self::Barcode { .. } => QueryKind::Barcode,
            Self::ImageGuess(_) => QueryKind::ImageGuess,
        }
    }

    /// Human-readable food name carried by the query, if any
    #[must_use]
    pub fn food_name(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text.trim()),
            Self::ImageGuess(guess) => Some(guess.name.trim()),
            Self::Barcode { .. } => None,
        }
    }

    /// Validate the query payload
    ///
    /// # Errors
    ///
    /// Returns `AppError` with `INVALID_INPUT` or `VALUE_OUT_OF_RANGE` when the
    /// payload is empty, too long, not a valid barcode, or has a non-positive quantity.
    pub fn validate(&self) -> AppResult<()> {
        match self {
            Self::Text { text } => validate_name("text", text),
            Self::Barcode { barcode } => {
                let code = barcode.trim();
                if code.is_empty() {
                    return Err(AppError::missing_field("barcode"));
                }
                if !code.chars().all(|c| c.is_ascii_digit()) {
                    return Err(AppError::invalid_input("Barcode must contain only digits"));
                }
                if !limits::BARCODE_LENGTHS.contains(&code.len()) {
                    return Err(AppError::invalid_input(format!(
                        "Barcode must be 8, 12, 13, or 14 digits, got {}",
                        code.len()
                    )));
                }
                Ok(())
            }
            Self::ImageGuess(guess) => {
                validate_name("name", &guess.name)?;
                Portion::new(guess.quantity, guess.unit.clone()).validate()
            }
        }
    }
}

fn validate_name(field: &str, value: &str) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    if trimmed.chars().count() > limits::MAX_QUERY_TEXT_LEN {
        return Err(AppError::out_of_range(format!(
            "'{field}' must be at most {} characters",
            limits::MAX_QUERY_TEXT_LEN
        )));
    }
    Ok(())
}

/// Requested portion for text and barcode queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portion {
    /// Amount
    pub quantity: f64,
    /// Unit of `quantity` (g, oz, piece, ...)
    pub unit: String,
}

impl Portion {
    /// Create a portion
    #[must_use]
    pub fn new(quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            quantity,
            unit: unit.into(),
        }
    }

    /// Validate quantity and unit
    ///
    /// # Errors
    ///
    /// Returns `AppError` when the quantity is not a finite positive number or
    /// the unit is blank.
    pub fn validate(&self) -> AppResult<()> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(AppError::out_of_range(format!(
                "Quantity must be a positive number, got {}",
                self.quantity
            )));
        }
        if self.unit.trim().is_empty() {
            return Err(AppError::missing_field("unit"));
        }
        Ok(())
    }
}

impl Default for Portion {
    fn default() -> Self {
        Self::new(defaults::PORTION_QUANTITY, defaults::PORTION_UNIT)
    }
}

/// Canonical nutrition values for a portion; every field is optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    /// Energy in kcal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    /// Protein in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    /// Carbohydrates in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
    /// Fat in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
    /// Fiber in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
    /// Sodium in milligrams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium_mg: Option<f64>,
    /// Sugar in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_g: Option<f64>,
    /// Saturated fat in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat_g: Option<f64>,
}

impl NutritionFacts {
    fn map(self, f: impl Fn(f64) -> Option<f64>) -> Self {
        Self {
            calories: self.calories.and_then(&f),
            protein_g: self.protein_g.and_then(&f),
            carbs_g: self.carbs_g.and_then(&f),
            fat_g: self.fat_g.and_then(&f),
            fiber_g: self.fiber_g.and_then(&f),
            sodium_mg: self.sodium_mg.and_then(&f),
            sugar_g: self.sugar_g.and_then(&f),
            saturated_fat_g: self.saturated_fat_g.and_then(&f),
        }
    }

    fn present_count(&self) -> usize {
        [
            self.calories,
            self.protein_g,
            self.carbs_g,
            self.fat_g,
            self.fiber_g,
            self.sodium_mg,
            self.sugar_g,
            self.saturated_fat_g,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }

    /// Multiply every present value by `factor`
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        self.map(|v| Some(v * factor))
    }

    /// Drop negative and non-finite values, returning the cleaned facts and
    /// how many fields were dropped
    #[must_use]
    pub fn sanitized(self) -> (Self, usize) {
        let before = self.present_count();
        let cleaned = self.map(|v| (v.is_finite() && v >= 0.0).then_some(v));
        let dropped = before - cleaned.present_count();
        (cleaned, dropped)
    }

    /// Whether no nutrient value is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }
}

/// Canonical resolved record produced per query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFood {
    /// Food name as reported by the source
    pub name: String,
    /// Brand, for packaged products
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Portion amount `nutrition` refers to
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Nutrition values for the portion
    pub nutrition: NutritionFacts,
    /// Normalized confidence in [0, 1], comparable across providers
    pub confidence: f64,
    /// Provider that produced this record
    pub source: ProviderId,
}
