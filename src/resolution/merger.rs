// ABOUTME: Deduplicates and ranks resolved foods gathered from multiple providers
// ABOUTME: Sorts by confidence then provider priority and keeps one record per name/brand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::ResolvedFood;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Case-folded name with every run of whitespace or punctuation collapsed to one space
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut pending_space = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_space && !normalized.is_empty() {
                normalized.push(' ');
            }
            pending_space = false;
            normalized.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    normalized
}

fn dedup_key(food: &ResolvedFood) -> (String, Option<String>) {
    let brand = food
        .brand
        .as_deref()
        .map(normalize_name)
        .filter(|b| !b.is_empty());
    (normalize_name(&food.name), brand)
}

fn rank_order(a: &ResolvedFood, b: &ResolvedFood) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.source.priority().cmp(&b.source.priority()))
}

/// Rank and deduplicate `results`
///
/// Output is sorted non-increasing by confidence, ties broken by provider
/// priority (authoritative, community, AI-derived). Two records are the same
/// food when their normalized names match and their normalized brands match
/// or are both absent; only the best-ranked of each group survives. The sort
/// is stable, so equal records keep their input order.
#[must_use]
pub fn merge(mut results: Vec<ResolvedFood>) -> Vec<ResolvedFood> {
    results.sort_by(rank_order);

    let mut seen = HashSet::with_capacity(results.len());
    results.retain(|food| seen.insert(dedup_key(food)));
    results
}
