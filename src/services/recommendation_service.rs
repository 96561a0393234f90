//! Recommendation service - keyword matching over the active catalogue.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::recommendation::recommend;
use crate::domain::Recommendations;
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Best match and alternatives for every term of a free-text request
    async fn recommend(&self, query: String) -> AppResult<Recommendations>;
}

pub struct Recommender<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Recommender<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> RecommendationService for Recommender<U> {
    async fn recommend(&self, query: String) -> AppResult<Recommendations> {
        let catalogue = self.uow.listings().list_active().await?;
        let result = recommend(&query, &catalogue);

        tracing::debug!(
            terms_matched = result.total_found,
            catalogue = catalogue.len(),
            "Recommendations computed"
        );
        Ok(result)
    }
}
