//! Path and query extractors that reject with the API error envelope.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// `Path<T>` whose rejection is an [`AppError::Validation`].
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        Ok(ApiPath(value))
    }
}

/// `Query<T>` whose rejection is an [`AppError::Validation`].
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    use crate::domain::ListingFilter;

    #[tokio::test]
    async fn test_bad_query_value_is_a_validation_error() {
        let (mut parts, _) = Request::builder()
            .uri("/api/rawmaterials/available?seller=abc")
            .body(())
            .unwrap()
            .into_parts();

        let result = ApiQuery::<ListingFilter>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_good_query_passes_through() {
        let seller = Uuid::new_v4();
        let (mut parts, _) = Request::builder()
            .uri(format!("/api/rawmaterials/available?seller={seller}&minPrice=5"))
            .body(())
            .unwrap()
            .into_parts();

        let ApiQuery(filter) = ApiQuery::<ListingFilter>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(filter.seller, Some(seller));
        assert_eq!(filter.min_price, Some(5.0));
    }
}
