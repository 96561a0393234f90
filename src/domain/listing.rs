//! Listing (raw material) entity, submission handling and browse filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::user::SellerSummary;
use crate::errors::{AppError, AppResult};

/// Alt text used when an uploaded image arrives before the listing has a name
pub const DEFAULT_IMAGE_ALT: &str = "Raw material image";

/// Listing image reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListingImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// Listing domain entity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub original_price: Option<f64>,
    /// Percent off, 0..=100
    pub discount: i32,
    /// Units in stock
    pub quantity: i32,
    pub category: String,
    pub subcategory: Option<String>,
    pub features: Vec<String>,
    pub tags: Vec<String>,
    pub images: Vec<ListingImage>,
    pub main_image: Option<String>,
    /// Mean of active review ratings, one decimal
    pub ratings: f64,
    pub num_reviews: i32,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Apply a partial update. Images are replaced only when new ones were supplied.
    pub fn apply(&mut self, patch: ListingInput) {
        if let Some(name) = non_empty(patch.name) {
            self.name = name;
        }
        if let Some(description) = non_empty(patch.description) {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(original_price) = patch.original_price {
            self.original_price = Some(original_price);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(category) = non_empty(patch.category) {
            self.category = category;
        }
        if let Some(subcategory) = non_empty(patch.subcategory) {
            self.subcategory = Some(subcategory);
        }
        if let Some(features) = patch.features {
            self.features = features;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }

        let images = patch.images.unwrap_or_default();
        if !images.is_empty() {
            self.main_image = images.first().map(|image| image.url.clone());
            self.images = with_alt_text(images, &self.name);
        }

        if let Some(discount) =
            derive_discount(patch.original_price, patch.price, patch.discount)
        {
            self.discount = discount;
        }
        self.updated_at = Utc::now();
    }

    /// Compact view used inside cart lines
    pub fn summary(&self) -> ListingSummary {
        ListingSummary {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            main_image: self.main_image.clone(),
            quantity: self.quantity,
            is_active: self.is_active,
        }
    }
}

/// Listing fields shown next to a cart line
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub main_image: Option<String>,
    pub quantity: i32,
    pub is_active: bool,
}

/// Public listing with its seller attribution
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingWithSeller {
    #[serde(flatten)]
    pub listing: Listing,
    pub seller: Option<SellerSummary>,
}

/// Create/update submission, from JSON or a multipart form.
///
/// Every field is optional so the same shape serves partial updates.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount: Option<i32>,
    pub quantity: Option<i32>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub features: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<ListingImage>>,
    pub is_active: Option<bool>,
}

/// Validated fields for inserting a listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount: i32,
    pub quantity: i32,
    pub category: String,
    pub subcategory: Option<String>,
    pub features: Vec<String>,
    pub tags: Vec<String>,
    pub images: Vec<ListingImage>,
    pub main_image: Option<String>,
}

impl ListingInput {
    /// Names of required fields that are absent, blank or zero.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.name) {
            missing.push("name");
        }
        if is_blank(&self.description) {
            missing.push("description");
        }
        if self.price.map_or(true, |p| p == 0.0 || p.is_nan()) {
            missing.push("price");
        }
        if self.quantity.map_or(true, |q| q == 0) {
            missing.push("quantity");
        }
        if is_blank(&self.category) {
            missing.push("category");
        }
        missing
    }

    /// Check the submission and turn it into an insertable draft.
    pub fn into_draft(self) -> AppResult<ListingDraft> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let price = self.price.unwrap_or_default();
        if price < 0.0 {
            return Err(AppError::validation(
                "Price must be a valid positive number",
            ));
        }
        let quantity = self.quantity.unwrap_or_default();
        if quantity < 0 {
            return Err(AppError::validation(
                "Quantity must be a valid non-negative number",
            ));
        }

        let discount = derive_discount(self.original_price, self.price, self.discount)
            .unwrap_or_default();
        let name = self.name.unwrap_or_default().trim().to_string();
        let images = with_alt_text(self.images.unwrap_or_default(), &name);

        Ok(ListingDraft {
            main_image: images.first().map(|image| image.url.clone()),
            name,
            description: self.description.unwrap_or_default(),
            price,
            original_price: self.original_price,
            discount,
            quantity,
            category: self.category.unwrap_or_default(),
            subcategory: non_empty(self.subcategory),
            features: self.features.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            images,
        })
    }
}

/// Percent discount implied by an original and current price.
///
/// When both prices are present and non-zero the discount is derived from them
/// (0 if the original is not higher); otherwise the submitted value is kept.
pub fn derive_discount(
    original_price: Option<f64>,
    price: Option<f64>,
    submitted: Option<i32>,
) -> Option<i32> {
    match (original_price, price) {
        (Some(original), Some(current)) if original != 0.0 && current != 0.0 => {
            if original > current {
                Some(((original - current) / original * 100.0).round() as i32)
            } else {
                Some(0)
            }
        }
        _ => submitted,
    }
}

/// Parse a list field: a JSON array, else a comma-separated string.
pub fn parse_list(raw: &str) -> Vec<String> {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(raw) {
        return items;
    }
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn with_alt_text(images: Vec<ListingImage>, name: &str) -> Vec<ListingImage> {
    let fallback = if name.is_empty() { DEFAULT_IMAGE_ALT } else { name };
    images
        .into_iter()
        .map(|mut image| {
            if image.alt.is_empty() {
                image.alt = fallback.to_string();
            }
            image
        })
        .collect()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Browse filters
// =============================================================================

/// Sort order for the public catalogue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
    Popularity,
    Discount,
}

/// Query filters for `GET /api/rawmaterials/available`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Seller user id
    pub seller: Option<Uuid>,
    /// Case-insensitive match against name or description
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    /// Only listings with a discount
    pub discounted: Option<bool>,
    /// Comma-separated; a listing matches if it has any of them
    pub features: Option<String>,
    #[param(value_type = Option<String>)]
    pub sort: Option<SortOrder>,
}

impl ListingFilter {
    /// Lower-cased category, if one was asked for.
    pub fn category(&self) -> Option<String> {
        lowered(self.category.as_deref())
    }

    pub fn subcategory(&self) -> Option<String> {
        lowered(self.subcategory.as_deref())
    }

    /// Lower-cased, trimmed search text.
    pub fn search(&self) -> Option<String> {
        lowered(self.search.as_deref())
    }

    /// Lower-cased features; a listing matches if it carries any of them.
    pub fn wanted_features(&self) -> Vec<String> {
        self.features
            .as_deref()
            .map(parse_list)
            .unwrap_or_default()
            .into_iter()
            .map(|f| f.to_lowercase())
            .collect()
    }

    pub fn sort(&self) -> SortOrder {
        self.sort.unwrap_or_default()
    }
}

fn lowered(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}
