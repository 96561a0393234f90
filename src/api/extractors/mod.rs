//! Custom request extractors.

mod listing_form;
mod params;
mod validated_json;

pub use listing_form::ListingForm;
pub use params::{ApiPath, ApiQuery};
pub use validated_json::ValidatedJson;
