//! Listing service - public catalogue and the owner's raw materials.

use std::collections::HashMap;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Listing, ListingFilter, ListingInput, ListingWithSeller, SellerSummary, User,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const EDIT_DENIED: &str = "Raw material not found or you do not have permission to edit it";
const DELETE_DENIED: &str = "Raw material not found or you do not have permission to delete it";

/// Listing service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Filtered, sorted, paginated active listings with seller attribution
    async fn browse(
        &self,
        filter: ListingFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<ListingWithSeller>>;

    /// A single active listing
    async fn get_public(&self, id: Uuid) -> AppResult<ListingWithSeller>;

    /// Every listing the user owns, newest first
    async fn list_own(&self, owner: Uuid) -> AppResult<Vec<Listing>>;

    async fn create(&self, owner: Uuid, input: ListingInput) -> AppResult<Listing>;

    /// Partial update of an owned listing
    async fn update(&self, owner: Uuid, id: Uuid, input: ListingInput) -> AppResult<Listing>;

    async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ListingService using Unit of Work.
pub struct ListingManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ListingManager<U> {
    /// Create new listing service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn sellers(&self, listings: &[Listing]) -> AppResult<HashMap<Uuid, User>> {
        let mut owners: Vec<Uuid> = listings.iter().map(|l| l.created_by).collect();
        owners.sort_unstable();
        owners.dedup();
        if owners.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.uow.users().find_by_ids(owners).await?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }
}

fn with_seller(listing: Listing, sellers: &HashMap<Uuid, User>) -> ListingWithSeller {
    ListingWithSeller {
        seller: sellers.get(&listing.created_by).map(SellerSummary::from),
        listing,
    }
}

fn check_amounts(input: &ListingInput) -> AppResult<()> {
    if input.price.is_some_and(|price| price < 0.0) {
        return Err(AppError::validation("Price must be a valid positive number"));
    }
    if input.quantity.is_some_and(|quantity| quantity < 0) {
        return Err(AppError::validation(
            "Quantity must be a valid non-negative number",
        ));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> ListingService for ListingManager<U> {
    async fn browse(
        &self,
        filter: ListingFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<ListingWithSeller>> {
        let selected = self.uow.listings().browse(filter, page).await?;
        let sellers = self.sellers(&selected.data).await?;

        let data = selected
            .data
            .into_iter()
            .map(|listing| with_seller(listing, &sellers))
            .collect();

        Ok(Paginated {
            data,
            meta: selected.meta,
        })
    }

    async fn get_public(&self, id: Uuid) -> AppResult<ListingWithSeller> {
        let listing = self
            .uow
            .listings()
            .find_by_id(id)
            .await?
            .filter(|listing| listing.is_active)
            .ok_or_not_found("Raw material not found")?;

        let seller = self.uow.users().find_by_id(listing.created_by).await?;
        Ok(ListingWithSeller {
            seller: seller.as_ref().map(SellerSummary::from),
            listing,
        })
    }

    async fn list_own(&self, owner: Uuid) -> AppResult<Vec<Listing>> {
        self.uow.listings().list_by_owner(owner).await
    }

    async fn create(&self, owner: Uuid, input: ListingInput) -> AppResult<Listing> {
        let draft = input.into_draft()?;
        let listing = self.uow.listings().create(owner, draft).await?;

        tracing::info!(listing_id = %listing.id, %owner, "Raw material listed");
        Ok(listing)
    }

    async fn update(&self, owner: Uuid, id: Uuid, input: ListingInput) -> AppResult<Listing> {
        check_amounts(&input)?;

        let mut listing = self
            .uow
            .listings()
            .find_by_id(id)
            .await?
            .filter(|listing| listing.created_by == owner)
            .ok_or_else(|| {
                tracing::warn!(listing_id = %id, %owner, "Edit denied");
                AppError::not_found(EDIT_DENIED)
            })?;

        listing.apply(input);
        self.uow.listings().update(listing).await
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        if !self.uow.listings().delete_owned(id, owner).await? {
            tracing::warn!(listing_id = %id, %owner, "Delete denied");
            return Err(AppError::not_found(DELETE_DENIED));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListingImage;
    use crate::services::test_support::{listing, user, Repos};
    use mockall::predicate::eq;

    fn full_input() -> ListingInput {
        ListingInput {
            name: Some("Basmati rice".to_string()),
            description: Some("Aged long grain".to_string()),
            price: Some(80.0),
            original_price: Some(100.0),
            quantity: Some(40),
            category: Some("grains".to_string()),
            images: Some(vec![ListingImage {
                url: "data:image/png;base64,AAAA".to_string(),
                alt: String::new(),
            }]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_browse_attaches_sellers_to_the_page() {
        let seller_id = Uuid::new_v4();
        let rows = vec![
            listing(seller_id, "Rice", 50.0, 10),
            listing(seller_id, "Wheat", 30.0, 10),
        ];

        let mut repos = Repos::default();
        repos
            .listings
            .expect_browse()
            .withf(|filter, page| filter.search.as_deref() == Some("rice") && page.per_page == 2)
            .times(1)
            .returning(move |_, page| {
                Ok(Paginated::new(rows.clone(), page.current_page(), page.limit(), 3))
            });
        repos
            .users
            .expect_find_by_ids()
            .with(eq(vec![seller_id]))
            .times(1)
            .returning(|ids| {
                Ok(ids
                    .into_iter()
                    .map(|id| user(id, "seller@example.com", "secret1"))
                    .collect())
            });

        let service = ListingManager::new(repos.into_uow());
        let page = service
            .browse(
                ListingFilter {
                    search: Some("rice".to_string()),
                    ..Default::default()
                },
                PaginationParams {
                    page: 1,
                    per_page: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.total_pages, 2);
        assert_eq!(page.data.len(), 2);
        assert!(page
            .data
            .iter()
            .all(|l| l.seller.as_ref().map(|s| s.id) == Some(seller_id)));
    }

    #[tokio::test]
    async fn test_browse_empty_page_skips_seller_lookup() {
        let mut repos = Repos::default();
        repos
            .listings
            .expect_browse()
            .returning(|_, page| Ok(Paginated::new(Vec::new(), page.current_page(), page.limit(), 0)));
        repos.users.expect_find_by_ids().never();

        let service = ListingManager::new(repos.into_uow());
        let page = service
            .browse(ListingFilter::default(), PaginationParams::default())
            .await
            .unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 0);
    }

    #[tokio::test]
    async fn test_get_public_hides_inactive() {
        let mut inactive = listing(Uuid::new_v4(), "Rice", 50.0, 10);
        inactive.is_active = false;

        let mut repos = Repos::default();
        repos
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(inactive.clone())));

        let service = ListingManager::new(repos.into_uow());
        let result = service.get_public(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_reports_missing_fields_without_insert() {
        let mut repos = Repos::default();
        repos.listings.expect_create().never();

        let service = ListingManager::new(repos.into_uow());
        let input = ListingInput {
            name: Some("Rice".to_string()),
            ..Default::default()
        };
        let err = service.create(Uuid::new_v4(), input).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required fields: description, price, quantity, category"
        );
    }

    #[tokio::test]
    async fn test_create_derives_discount_and_main_image() {
        let owner = Uuid::new_v4();
        let mut repos = Repos::default();
        repos
            .listings
            .expect_create()
            .withf(move |o, draft| {
                *o == owner
                    && draft.discount == 20
                    && draft.main_image.as_deref() == Some("data:image/png;base64,AAAA")
                    && draft.images[0].alt == "Basmati rice"
            })
            .returning(|owner, draft| {
                let mut created = listing(owner, &draft.name, draft.price, draft.quantity);
                created.discount = draft.discount;
                Ok(created)
            });

        let service = ListingManager::new(repos.into_uow());
        let created = service.create(owner, full_input()).await.unwrap();

        assert_eq!(created.discount, 20);
    }

    #[tokio::test]
    async fn test_update_foreign_listing_is_not_found() {
        let mut repos = Repos::default();
        repos
            .listings
            .expect_find_by_id()
            .returning(|_| Ok(Some(listing(Uuid::new_v4(), "Rice", 50.0, 10))));
        repos.listings.expect_update().never();

        let service = ListingManager::new(repos.into_uow());
        let err = service
            .update(Uuid::new_v4(), Uuid::new_v4(), ListingInput::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), EDIT_DENIED);
    }

    #[tokio::test]
    async fn test_update_keeps_images_when_none_supplied() {
        let owner = Uuid::new_v4();
        let mut existing = listing(owner, "Rice", 50.0, 10);
        existing.images = vec![ListingImage {
            url: "https://img/old.png".to_string(),
            alt: "Rice".to_string(),
        }];
        existing.main_image = Some("https://img/old.png".to_string());

        let mut repos = Repos::default();
        repos
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repos
            .listings
            .expect_update()
            .withf(|updated| {
                updated.quantity == 3
                    && !updated.is_active
                    && updated.main_image.as_deref() == Some("https://img/old.png")
            })
            .returning(Ok);

        let service = ListingManager::new(repos.into_uow());
        let input = ListingInput {
            quantity: Some(3),
            is_active: Some(false),
            ..Default::default()
        };
        let updated = service.update(owner, Uuid::new_v4(), input).await.unwrap();

        assert_eq!(updated.images.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_negative_price() {
        let repos = Repos::default();
        let service = ListingManager::new(repos.into_uow());
        let input = ListingInput {
            price: Some(-1.0),
            ..Default::default()
        };

        let result = service.update(Uuid::new_v4(), Uuid::new_v4(), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_not_owned() {
        let mut repos = Repos::default();
        repos.listings.expect_delete_owned().returning(|_, _| Ok(false));

        let service = ListingManager::new(repos.into_uow());
        let err = service
            .delete(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), DELETE_DENIED);
    }
}
