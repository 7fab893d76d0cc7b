use super::wishlist::wishlist_config;
use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

// ---------- 分类 ----------

#[utoipa::path(
    get,
    path = "/catalog/categories",
    tag = "catalog",
    responses(
        (status = 200, description = "分类列表", body = [CategoryResponse])
    )
)]
pub async fn list_categories(catalog: web::Data<CatalogService>) -> Result<HttpResponse> {
    match catalog.list_categories().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalog/categories/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "分类ID")),
    responses(
        (status = 200, description = "分类详情", body = CategoryResponse),
        (status = 404, description = "分类不存在")
    )
)]
pub async fn get_category(
    catalog: web::Data<CatalogService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match catalog.get_category(path.into_inner()).await {
        Ok(c) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/catalog/categories",
    tag = "catalog",
    request_body = CategoryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "创建成功", body = CategoryResponse),
        (status = 400, description = "名称为空或重复"),
        (status = 403, description = "需要管理员或卖家权限")
    )
)]
pub async fn create_category(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    request: web::Json<CategoryRequest>,
) -> Result<HttpResponse> {
    match catalog.create_category(&user, request.into_inner()).await {
        Ok(c) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/catalog/categories/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "分类ID")),
    request_body = CategoryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新成功", body = CategoryResponse),
        (status = 403, description = "需要管理员或卖家权限"),
        (status = 404, description = "分类不存在")
    )
)]
pub async fn update_category(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<CategoryRequest>,
) -> Result<HttpResponse> {
    match catalog
        .update_category(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(c) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/catalog/categories/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "分类ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "需要管理员或卖家权限"),
        (status = 404, description = "分类不存在")
    )
)]
pub async fn delete_category(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match catalog.delete_category(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Category deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---------- 品牌 ----------

#[utoipa::path(
    get,
    path = "/catalog/brands",
    tag = "catalog",
    responses(
        (status = 200, description = "品牌列表", body = [BrandResponse])
    )
)]
pub async fn list_brands(catalog: web::Data<CatalogService>) -> Result<HttpResponse> {
    match catalog.list_brands().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalog/brands/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "品牌ID")),
    responses(
        (status = 200, description = "品牌详情", body = BrandResponse),
        (status = 404, description = "品牌不存在")
    )
)]
pub async fn get_brand(
    catalog: web::Data<CatalogService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match catalog.get_brand(path.into_inner()).await {
        Ok(b) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": b }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/catalog/brands",
    tag = "catalog",
    request_body = BrandRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "创建成功", body = BrandResponse),
        (status = 400, description = "名称为空或重复"),
        (status = 403, description = "需要管理员或卖家权限")
    )
)]
pub async fn create_brand(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    request: web::Json<BrandRequest>,
) -> Result<HttpResponse> {
    match catalog.create_brand(&user, request.into_inner()).await {
        Ok(b) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": b }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/catalog/brands/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "品牌ID")),
    request_body = BrandRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新成功", body = BrandResponse),
        (status = 403, description = "需要管理员或卖家权限"),
        (status = 404, description = "品牌不存在")
    )
)]
pub async fn update_brand(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<BrandRequest>,
) -> Result<HttpResponse> {
    match catalog
        .update_brand(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(b) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": b }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/catalog/brands/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "品牌ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "需要管理员或卖家权限"),
        (status = 404, description = "品牌不存在")
    )
)]
pub async fn delete_brand(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match catalog.delete_brand(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Brand deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---------- 商品 ----------

#[utoipa::path(
    get,
    path = "/catalog/products",
    tag = "catalog",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量"),
        ("search" = Option<String>, Query, description = "按名称或描述搜索"),
        ("ordering" = Option<String>, Query, description = "price, -price, created_at, -created_at"),
        ("category_id" = Option<i32>, Query, description = "分类ID"),
        ("brand_id" = Option<i32>, Query, description = "品牌ID")
    ),
    responses(
        (status = 200, description = "商品分页列表"),
        (status = 400, description = "排序参数无效")
    )
)]
pub async fn list_products(
    catalog: web::Data<CatalogService>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse> {
    match catalog.list_products(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalog/products/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "商品ID")),
    responses(
        (status = 200, description = "商品详情", body = ProductResponse),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn get_product(
    catalog: web::Data<CatalogService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match catalog.get_product(path.into_inner()).await {
        Ok(p) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": p }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/catalog/products",
    tag = "catalog",
    request_body = CreateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "创建成功", body = ProductResponse),
        (status = 400, description = "请求参数错误"),
        (status = 403, description = "需要管理员或卖家权限")
    )
)]
pub async fn create_product(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    request: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
    match catalog.create_product(&user, request.into_inner()).await {
        Ok(p) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": p }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/catalog/products/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "商品ID")),
    request_body = UpdateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新成功", body = ProductResponse),
        (status = 403, description = "只能修改自己的商品"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn update_product(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
    match catalog
        .update_product(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(p) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": p }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/catalog/products/{id}",
    tag = "catalog",
    params(("id" = i32, Path, description = "商品ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "只能删除自己的商品"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn delete_product(
    catalog: web::Data<CatalogService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match catalog.delete_product(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Product deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog")
            .configure(wishlist_config)
            .route("/categories", web::get().to(list_categories))
            .route("/categories", web::post().to(create_category))
            .route("/categories/{id}", web::get().to(get_category))
            .route("/categories/{id}", web::put().to(update_category))
            .route("/categories/{id}", web::delete().to(delete_category))
            .route("/brands", web::get().to(list_brands))
            .route("/brands", web::post().to(create_brand))
            .route("/brands/{id}", web::get().to(get_brand))
            .route("/brands/{id}", web::put().to(update_brand))
            .route("/brands/{id}", web::delete().to(delete_brand))
            .route("/products", web::get().to(list_products))
            .route("/products", web::post().to(create_product))
            .route("/products/{id}", web::get().to(get_product))
            .route("/products/{id}", web::put().to(update_product))
            .route("/products/{id}", web::delete().to(delete_product)),
    );
}
