// ABOUTME: Portion unit conversion from caller units to grams
// ABOUTME: Providers report per-100g values and scale them with these helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Grams per ounce
pub const GRAMS_PER_OUNCE: f64 = 28.349_523_125;

/// Grams per pound
pub const GRAMS_PER_POUND: f64 = 453.592_37;

/// Weight assumed for one count unit (piece, serving, cup, ...)
pub const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// Reference amount most nutrition databases report against
pub const REFERENCE_GRAMS: f64 = 100.0;

/// Grams represented by one `unit`, or `None` for count units.
///
/// Volume units assume the density of water.
#[must_use]
pub fn grams_per_unit(unit: &str) -> Option<f64> {
    match unit.trim().to_lowercase().as_str() {
        "g" | "gr" | "gram" | "grams" | "ml" | "milliliter" | "milliliters" => Some(1.0),
        "kg" | "kilogram" | "kilograms" | "l" | "liter" | "liters" | "litre" | "litres" => {
            Some(1000.0)
        }
        "mg" | "milligram" | "milligrams" => Some(0.001),
        "oz" | "ounce" | "ounces" => Some(GRAMS_PER_OUNCE),
        "lb" | "lbs" | "pound" | "pounds" => Some(GRAMS_PER_POUND),
        _ => None,
    }
}

/// Whether `unit` is a mass (or water-density volume) unit
#[must_use]
pub fn is_mass_unit(unit: &str) -> bool {
    grams_per_unit(unit).is_some()
}

/// Total grams of a portion; count units weigh [`DEFAULT_SERVING_GRAMS`] each
#[must_use]
pub fn portion_grams(quantity: f64, unit: &str) -> f64 {
    quantity * grams_per_unit(unit).unwrap_or(DEFAULT_SERVING_GRAMS)
}

/// Factor that converts per-100g values into values for the given portion
#[must_use]
pub fn per_100g_factor(quantity: f64, unit: &str) -> f64 {
    portion_grams(quantity, unit) / REFERENCE_GRAMS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_units() {
        assert!((per_100g_factor(150.0, "g") - 1.5).abs() < f64::EPSILON);
        assert!((per_100g_factor(1.0, "KG") - 10.0).abs() < f64::EPSILON);
        assert!((portion_grams(2.0, "oz") - 56.699_046_25).abs() < 1e-9);
    }

    #[test]
    fn test_count_units_use_default_serving() {
        assert!(!is_mass_unit("piece"));
        assert!((per_100g_factor(2.0, "piece") - 2.0).abs() < f64::EPSILON);
        assert!((per_100g_factor(1.0, "serving") - 1.0).abs() < f64::EPSILON);
    }
}
