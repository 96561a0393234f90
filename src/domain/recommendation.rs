//! Keyword-based listing recommendations.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::listing::Listing;
use crate::config::{
    MIN_SEARCH_TERM_LENGTH, RECOMMENDATION_ALTERNATIVES, RECOMMENDATION_PRICE_FLOOR,
};

static TERM_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\s]+").expect("term separator pattern is valid"));

/// Free-text shopping request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecommendationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please describe what you are looking for"))]
    #[schema(example = "rice, onions and jute bags")]
    pub query: String,
    /// Accepted for compatibility; not used in ranking
    pub location: Option<String>,
}

/// Listing with its ranking score and a human-readable reason
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub ai_score: f64,
    pub reason_for_recommendation: String,
}

/// Best match and runner-up for one search term
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub search_term: String,
    pub recommended_material: RankedListing,
    pub alternatives: Vec<RankedListing>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub recommendations: Vec<Recommendation>,
    pub total_found: usize,
}

/// Split a request into search terms.
///
/// Words of three or more characters are kept; if none survive the whole
/// input is used as a single term.
pub fn extract_terms(input: &str) -> Vec<String> {
    let lowered = input.to_lowercase();
    let words: Vec<String> = TERM_SEPARATOR
        .split(&lowered)
        .map(str::trim)
        .filter(|word| word.chars().count() > MIN_SEARCH_TERM_LENGTH)
        .map(str::to_string)
        .collect();

    if words.is_empty() {
        vec![lowered.trim().to_string()]
    } else {
        words
    }
}

/// Listings whose name contains the term, or is contained in it.
pub fn matching<'a>(term: &str, listings: &'a [Listing]) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| {
            let name = listing.name.to_lowercase();
            name.contains(term) || term.contains(name.as_str())
        })
        .collect()
}

/// Score and order a group of candidate listings, best first.
pub fn rank(candidates: &[&Listing]) -> Vec<RankedListing> {
    let max_price = candidates
        .iter()
        .map(|listing| listing.price)
        .fold(RECOMMENDATION_PRICE_FLOOR, f64::max);

    let mut ranked: Vec<RankedListing> = candidates
        .iter()
        .map(|listing| {
            let score = listing.ratings * 10.0
                + f64::from((listing.num_reviews * 2).min(20))
                + (max_price - listing.price) / max_price * 30.0;
            RankedListing {
                listing: (*listing).clone(),
                ai_score: (score * 100.0).round() / 100.0,
                reason_for_recommendation: reason(listing),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.ai_score.total_cmp(&a.ai_score));
    ranked
}

/// Short explanation of why a listing is worth buying
pub fn reason(listing: &Listing) -> String {
    let mut reasons = Vec::new();
    if listing.ratings >= 4.0 {
        reasons.push("Highly rated".to_string());
    }
    if listing.discount > 10 {
        reasons.push(format!("{}% discount", listing.discount));
    }
    if listing.num_reviews > 5 {
        reasons.push("Well reviewed".to_string());
    }
    if listing.quantity > 50 {
        reasons.push("Good stock".to_string());
    }
    if listing.price < 1000.0 {
        reasons.push("Affordable price".to_string());
    }

    if reasons.is_empty() {
        "Available item".to_string()
    } else {
        reasons.join(", ")
    }
}

/// Build recommendations for a request over the active catalogue.
pub fn recommend(query: &str, listings: &[Listing]) -> Recommendations {
    let recommendations: Vec<Recommendation> = extract_terms(query)
        .into_iter()
        .filter_map(|term| {
            let mut ranked = rank(&matching(&term, listings)).into_iter();
            let best = ranked.next()?;
            Some(Recommendation {
                search_term: term,
                recommended_material: best,
                alternatives: ranked.take(RECOMMENDATION_ALTERNATIVES).collect(),
            })
        })
        .collect();

    Recommendations {
        total_found: recommendations.len(),
        recommendations,
    }
}
