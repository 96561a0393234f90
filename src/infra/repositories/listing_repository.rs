//! Raw material (listing) repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::raw_material::{
    self, ActiveModel, Entity as RawMaterialEntity, ImageList, StringList,
};
use crate::domain::{Listing, ListingDraft, ListingFilter, SortOrder};
use crate::errors::{AppError, AppResult};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Listing repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Find a listing regardless of its active flag
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>>;

    /// Find several listings at once (missing ids are skipped)
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Listing>>;

    /// All active listings, newest first
    async fn list_active(&self) -> AppResult<Vec<Listing>>;

    /// One page of active listings matching a catalogue filter
    async fn browse(
        &self,
        filter: ListingFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Listing>>;

    /// Every listing owned by a user, newest first
    async fn list_by_owner(&self, owner: Uuid) -> AppResult<Vec<Listing>>;

    /// Ids of every listing owned by a user
    async fn ids_by_owner(&self, owner: Uuid) -> AppResult<Vec<Uuid>>;

    /// Count a user's listings, optionally only the active ones
    async fn count_by_owner(&self, owner: Uuid, active_only: bool) -> AppResult<u64>;

    /// Insert a new listing owned by `owner`
    async fn create(&self, owner: Uuid, draft: ListingDraft) -> AppResult<Listing>;

    /// Persist every mutable field of an existing listing
    async fn update(&self, listing: Listing) -> AppResult<Listing>;

    /// Delete a listing if `owner` owns it; returns whether a row was removed
    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> AppResult<bool>;

    /// Store a recomputed review aggregate
    async fn update_rating(&self, id: Uuid, ratings: f64, num_reviews: i32) -> AppResult<()>;
}

/// Concrete implementation of ListingRepository
pub struct ListingStore {
    db: DatabaseConnection,
}

impl ListingStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingRepository for ListingStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let result = RawMaterialEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Listing::from))
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = RawMaterialEntity::find()
            .filter(raw_material::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Listing::from).collect())
    }

    async fn list_active(&self) -> AppResult<Vec<Listing>> {
        let models = RawMaterialEntity::find()
            .filter(raw_material::Column::IsActive.eq(true))
            .order_by_desc(raw_material::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Listing::from).collect())
    }

    async fn browse(
        &self,
        filter: ListingFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Listing>> {
        let query = catalogue_query(&filter);
        let total = query.clone().count(&self.db).await.map_err(AppError::from)?;

        let offset = page.offset();
        let data = if offset >= total {
            Vec::new()
        } else {
            query
                .offset(offset)
                .limit(page.limit())
                .all(&self.db)
                .await
                .map_err(AppError::from)?
                .into_iter()
                .map(Listing::from)
                .collect()
        };

        Ok(Paginated::new(data, page.current_page(), page.limit(), total))
    }

    async fn list_by_owner(&self, owner: Uuid) -> AppResult<Vec<Listing>> {
        let models = RawMaterialEntity::find()
            .filter(raw_material::Column::CreatedBy.eq(owner))
            .order_by_desc(raw_material::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Listing::from).collect())
    }

    async fn ids_by_owner(&self, owner: Uuid) -> AppResult<Vec<Uuid>> {
        let ids = RawMaterialEntity::find()
            .select_only()
            .column(raw_material::Column::Id)
            .filter(raw_material::Column::CreatedBy.eq(owner))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(ids)
    }

    async fn count_by_owner(&self, owner: Uuid, active_only: bool) -> AppResult<u64> {
        let mut query =
            RawMaterialEntity::find().filter(raw_material::Column::CreatedBy.eq(owner));
        if active_only {
            query = query.filter(raw_material::Column::IsActive.eq(true));
        }

        query.count(&self.db).await.map_err(AppError::from)
    }

    async fn create(&self, owner: Uuid, draft: ListingDraft) -> AppResult<Listing> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name),
            description: Set(draft.description),
            price: Set(draft.price),
            original_price: Set(draft.original_price),
            discount: Set(draft.discount),
            quantity: Set(draft.quantity),
            category: Set(draft.category),
            subcategory: Set(draft.subcategory),
            features: Set(StringList(draft.features)),
            tags: Set(StringList(draft.tags)),
            images: Set(ImageList(draft.images)),
            main_image: Set(draft.main_image),
            ratings: Set(0.0),
            num_reviews: Set(0),
            created_by: Set(owner),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Listing::from(model))
    }

    async fn update(&self, listing: Listing) -> AppResult<Listing> {
        let existing = RawMaterialEntity::find_by_id(listing.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Raw material not found"))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(listing.name);
        active.description = Set(listing.description);
        active.price = Set(listing.price);
        active.original_price = Set(listing.original_price);
        active.discount = Set(listing.discount);
        active.quantity = Set(listing.quantity);
        active.category = Set(listing.category);
        active.subcategory = Set(listing.subcategory);
        active.features = Set(StringList(listing.features));
        active.tags = Set(StringList(listing.tags));
        active.images = Set(ImageList(listing.images));
        active.main_image = Set(listing.main_image);
        active.is_active = Set(listing.is_active);
        active.updated_at = Set(listing.updated_at);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Listing::from(model))
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> AppResult<bool> {
        let result = RawMaterialEntity::delete_many()
            .filter(raw_material::Column::Id.eq(id))
            .filter(raw_material::Column::CreatedBy.eq(owner))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn update_rating(&self, id: Uuid, ratings: f64, num_reviews: i32) -> AppResult<()> {
        let existing = RawMaterialEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Raw material not found"))?;

        let mut active: ActiveModel = existing.into();
        active.ratings = Set(ratings);
        active.num_reviews = Set(num_reviews);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }
}

const HAS_FEATURE: &str = "EXISTS (SELECT 1 FROM jsonb_array_elements_text(\"raw_materials\".\"features\") AS feature WHERE lower(feature) = $1)";

/// Active listings narrowed and ordered by a catalogue filter.
fn catalogue_query(filter: &ListingFilter) -> Select<RawMaterialEntity> {
    let mut query = RawMaterialEntity::find().filter(raw_material::Column::IsActive.eq(true));

    if let Some(category) = filter.category() {
        query = query.filter(lower(raw_material::Column::Category).eq(category));
    }
    if let Some(subcategory) = filter.subcategory() {
        query = query.filter(lower(raw_material::Column::Subcategory).eq(subcategory));
    }
    if let Some(seller) = filter.seller {
        query = query.filter(raw_material::Column::CreatedBy.eq(seller));
    }
    if let Some(search) = filter.search() {
        let pattern = LikeExpr::new(format!("%{}%", escape_like(&search))).escape('\\');
        query = query.filter(
            Condition::any()
                .add(lower(raw_material::Column::Name).like(pattern.clone()))
                .add(lower(raw_material::Column::Description).like(pattern)),
        );
    }
    if let Some(min) = filter.min_price {
        query = query.filter(raw_material::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(raw_material::Column::Price.lte(max));
    }
    if let Some(min) = filter.min_rating {
        query = query.filter(raw_material::Column::Ratings.gte(min));
    }
    if filter.discounted == Some(true) {
        query = query.filter(raw_material::Column::Discount.gt(0));
    }

    let features = filter.wanted_features();
    if !features.is_empty() {
        let any_feature = features.into_iter().fold(Condition::any(), |cond, feature| {
            cond.add(Expr::cust_with_values(HAS_FEATURE, [feature]))
        });
        query = query.filter(any_feature);
    }

    let query = match filter.sort() {
        SortOrder::Newest => query,
        SortOrder::PriceLow => query.order_by_asc(raw_material::Column::Price),
        SortOrder::PriceHigh => query.order_by_desc(raw_material::Column::Price),
        SortOrder::Rating => query.order_by_desc(raw_material::Column::Ratings),
        SortOrder::Popularity => query.order_by_desc(raw_material::Column::NumReviews),
        SortOrder::Discount => query.order_by_desc(raw_material::Column::Discount),
    };
    query.order_by_desc(raw_material::Column::CreatedAt)
}

fn lower(column: raw_material::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

/// Escape LIKE wildcards so search text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
