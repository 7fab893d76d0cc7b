use crate::entities::{brand_entity as brands, category_entity as categories, product_entity as products};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{MAX_PRICE, require_text};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

const NAME_MAX_LEN: usize = 255;
const CATEGORY_NAME_TAKEN: &str = "Category with this name already exists";
const BRAND_NAME_TAKEN: &str = "Brand with this name already exists";

/// 批量加载商品的分类与品牌，避免逐条查询
pub(crate) async fn load_product_responses<C: ConnectionTrait>(
    conn: &C,
    list: Vec<products::Model>,
) -> AppResult<Vec<ProductResponse>> {
    let category_ids: Vec<i32> = list.iter().filter_map(|p| p.category_id).collect();
    let brand_ids: Vec<i32> = list.iter().filter_map(|p| p.brand_id).collect();

    let category_map: HashMap<i32, CategoryResponse> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| (c.id, CategoryResponse::from(c)))
            .collect()
    };

    let brand_map: HashMap<i32, BrandResponse> = if brand_ids.is_empty() {
        HashMap::new()
    } else {
        brands::Entity::find()
            .filter(brands::Column::Id.is_in(brand_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|b| (b.id, BrandResponse::from(b)))
            .collect()
    };

    Ok(list
        .into_iter()
        .map(|p| {
            let category = p.category_id.and_then(|id| category_map.get(&id).cloned());
            let brand = p.brand_id.and_then(|id| brand_map.get(&id).cloned());
            ProductResponse::from_parts(p, category, brand)
        })
        .collect())
}

fn require_catalog_manager(user: &AuthUser) -> AppResult<()> {
    if !user.can_manage_catalog() {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

/// 管理员可修改任意商品，卖家仅限自己的商品
fn require_product_owner(user: &AuthUser, product: &products::Model) -> AppResult<()> {
    require_catalog_manager(user)?;
    if !user.is_admin() && product.seller_id != user.id {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

fn validate_price_and_stock(price: Option<i64>, stock: Option<i32>) -> AppResult<()> {
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::ValidationError(
            "Price must be greater than or equal to 0".to_string(),
        ));
    }
    if price.is_some_and(|p| p > MAX_PRICE) {
        return Err(AppError::ValidationError(format!(
            "Price must be at most {MAX_PRICE}"
        )));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::ValidationError(
            "Stock must be greater than or equal to 0".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    // ---------- 分类 ----------

    pub async fn list_categories(&self) -> AppResult<Vec<CategoryResponse>> {
        let list = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(CategoryResponse::from).collect())
    }

    pub async fn get_category(&self, id: i32) -> AppResult<CategoryResponse> {
        Ok(CategoryResponse::from(self.find_category(id).await?))
    }

    pub async fn create_category(
        &self,
        user: &AuthUser,
        request: CategoryRequest,
    ) -> AppResult<CategoryResponse> {
        require_catalog_manager(user)?;
        let name = require_text("Name", &request.name, NAME_MAX_LEN)?;
        self.ensure_category_name_free(&name, None).await?;

        let category = categories::ActiveModel {
            name: Set(name),
            description: Set(request.description.trim().to_string()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, CATEGORY_NAME_TAKEN))?;
        Ok(CategoryResponse::from(category))
    }

    pub async fn update_category(
        &self,
        user: &AuthUser,
        id: i32,
        request: CategoryRequest,
    ) -> AppResult<CategoryResponse> {
        require_catalog_manager(user)?;
        let name = require_text("Name", &request.name, NAME_MAX_LEN)?;
        let mut model = self.find_category(id).await?.into_active_model();
        self.ensure_category_name_free(&name, Some(id)).await?;

        model.name = Set(name);
        model.description = Set(request.description.trim().to_string());
        let updated = model
            .update(&self.pool)
            .await
            .map_err(|e| AppError::unique_violation(e, CATEGORY_NAME_TAKEN))?;
        Ok(CategoryResponse::from(updated))
    }

    pub async fn delete_category(&self, user: &AuthUser, id: i32) -> AppResult<()> {
        require_catalog_manager(user)?;
        let res = categories::Entity::delete_by_id(id).exec(&self.pool).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }

    async fn find_category(&self, id: i32) -> AppResult<categories::Model> {
        categories::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    async fn ensure_category_name_free(&self, name: &str, except: Option<i32>) -> AppResult<()> {
        let mut query = categories::Entity::find().filter(categories::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::ValidationError(CATEGORY_NAME_TAKEN.to_string()));
        }
        Ok(())
    }

    // ---------- 品牌 ----------

    pub async fn list_brands(&self) -> AppResult<Vec<BrandResponse>> {
        let list = brands::Entity::find()
            .order_by_asc(brands::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(BrandResponse::from).collect())
    }

    pub async fn get_brand(&self, id: i32) -> AppResult<BrandResponse> {
        Ok(BrandResponse::from(self.find_brand(id).await?))
    }

    pub async fn create_brand(
        &self,
        user: &AuthUser,
        request: BrandRequest,
    ) -> AppResult<BrandResponse> {
        require_catalog_manager(user)?;
        let name = require_text("Name", &request.name, NAME_MAX_LEN)?;
        self.ensure_brand_name_free(&name, None).await?;

        let brand = brands::ActiveModel {
            name: Set(name),
            description: Set(request.description.trim().to_string()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, BRAND_NAME_TAKEN))?;
        Ok(BrandResponse::from(brand))
    }

    pub async fn update_brand(
        &self,
        user: &AuthUser,
        id: i32,
        request: BrandRequest,
    ) -> AppResult<BrandResponse> {
        require_catalog_manager(user)?;
        let name = require_text("Name", &request.name, NAME_MAX_LEN)?;
        let mut model = self.find_brand(id).await?.into_active_model();
        self.ensure_brand_name_free(&name, Some(id)).await?;

        model.name = Set(name);
        model.description = Set(request.description.trim().to_string());
        let updated = model
            .update(&self.pool)
            .await
            .map_err(|e| AppError::unique_violation(e, BRAND_NAME_TAKEN))?;
        Ok(BrandResponse::from(updated))
    }

    pub async fn delete_brand(&self, user: &AuthUser, id: i32) -> AppResult<()> {
        require_catalog_manager(user)?;
        let res = brands::Entity::delete_by_id(id).exec(&self.pool).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Brand not found".to_string()));
        }
        Ok(())
    }

    async fn find_brand(&self, id: i32) -> AppResult<brands::Model> {
        brands::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Brand not found".to_string()))
    }

    async fn ensure_brand_name_free(&self, name: &str, except: Option<i32>) -> AppResult<()> {
        let mut query = brands::Entity::find().filter(brands::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(brands::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::ValidationError(BRAND_NAME_TAKEN.to_string()));
        }
        Ok(())
    }

    // ---------- 商品 ----------

    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> AppResult<PaginatedResponse<ProductResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let mut select = products::Entity::find();

        if let Some(search) = query.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            let pattern = format!("%{}%", search.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(products::Column::Name)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(products::Column::Description)))
                            .like(pattern),
                    ),
            );
        }
        if let Some(category_id) = query.category_id {
            select = select.filter(products::Column::CategoryId.eq(category_id));
        }
        if let Some(brand_id) = query.brand_id {
            select = select.filter(products::Column::BrandId.eq(brand_id));
        }

        let total = select.clone().count(&self.pool).await?;

        select = match query.ordering.as_deref().unwrap_or("-created_at") {
            "price" => select.order_by_asc(products::Column::Price),
            "-price" => select.order_by_desc(products::Column::Price),
            "created_at" => select.order_by_asc(products::Column::CreatedAt),
            "-created_at" => select.order_by_desc(products::Column::CreatedAt),
            other => {
                return Err(AppError::ValidationError(format!(
                    "Unsupported ordering: {other}"
                )));
            }
        };

        let list = select
            .order_by_asc(products::Column::Id)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        let data = load_product_responses(&self.pool, list).await?;
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn get_product(&self, id: i32) -> AppResult<ProductResponse> {
        let product = self.find_product(id).await?;
        self.product_response(product).await
    }

    pub async fn create_product(
        &self,
        user: &AuthUser,
        request: CreateProductRequest,
    ) -> AppResult<ProductResponse> {
        require_catalog_manager(user)?;
        let name = require_text("Name", &request.name, NAME_MAX_LEN)?;
        validate_price_and_stock(Some(request.price), Some(request.stock))?;
        self.ensure_references(request.category_id, request.brand_id)
            .await?;

        let now = Utc::now();
        let product = products::ActiveModel {
            name: Set(name),
            description: Set(request.description.trim().to_string()),
            price: Set(request.price),
            stock: Set(request.stock),
            category_id: Set(request.category_id),
            brand_id: Set(request.brand_id),
            seller_id: Set(user.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Product {} created by user {}", product.id, user.id);
        self.product_response(product).await
    }

    pub async fn update_product(
        &self,
        user: &AuthUser,
        id: i32,
        request: UpdateProductRequest,
    ) -> AppResult<ProductResponse> {
        let product = self.find_product(id).await?;
        require_product_owner(user, &product)?;
        validate_price_and_stock(request.price, request.stock)?;
        self.ensure_references(request.category_id, request.brand_id)
            .await?;

        let mut model = product.into_active_model();
        if let Some(name) = &request.name {
            model.name = Set(require_text("Name", name, NAME_MAX_LEN)?);
        }
        if let Some(description) = request.description {
            model.description = Set(description.trim().to_string());
        }
        if let Some(price) = request.price {
            model.price = Set(price);
        }
        if let Some(stock) = request.stock {
            model.stock = Set(stock);
        }
        if let Some(category_id) = request.category_id {
            model.category_id = Set(Some(category_id));
        }
        if let Some(brand_id) = request.brand_id {
            model.brand_id = Set(Some(brand_id));
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.pool).await?;
        self.product_response(updated).await
    }

    pub async fn delete_product(&self, user: &AuthUser, id: i32) -> AppResult<()> {
        let product = self.find_product(id).await?;
        require_product_owner(user, &product)?;
        products::Entity::delete_by_id(product.id)
            .exec(&self.pool)
            .await?;
        log::info!("Product {} deleted by user {}", id, user.id);
        Ok(())
    }

    async fn find_product(&self, id: i32) -> AppResult<products::Model> {
        products::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    async fn product_response(&self, product: products::Model) -> AppResult<ProductResponse> {
        load_product_responses(&self.pool, vec![product])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Product response missing".to_string()))
    }

    async fn ensure_references(
        &self,
        category_id: Option<i32>,
        brand_id: Option<i32>,
    ) -> AppResult<()> {
        if let Some(id) = category_id
            && categories::Entity::find_by_id(id)
                .one(&self.pool)
                .await?
                .is_none()
        {
            return Err(AppError::ValidationError(format!(
                "Category {id} does not exist"
            )));
        }
        if let Some(id) = brand_id
            && brands::Entity::find_by_id(id).one(&self.pool).await?.is_none()
        {
            return Err(AppError::ValidationError(format!("Brand {id} does not exist")));
        }
        Ok(())
    }
}
