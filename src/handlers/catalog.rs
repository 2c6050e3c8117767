// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{validate_not_negative, validate_percentage};
use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::ProductFields,
    middleware::tenancy::TenantContext,
    models::catalog::{Category, Product},
};

// ---
// Payload: Categoria
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    #[schema(example = "Eletrônicos")]
    pub name: String,
}

// ---
// Payload: Produto (criação e edição)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub category_id: Option<Uuid>,

    #[validate(length(min = 1, max = 64, message = "O SKU é obrigatório."))]
    #[schema(example = "FONE-BT-001")]
    pub sku: String,

    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[schema(example = "Fone Bluetooth")]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "35.90")]
    pub cost_unit: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(example = "2.50")]
    pub packaging_cost: Decimal,

    /// Alíquota de imposto (0–100)
    #[validate(custom(function = "validate_percentage"))]
    #[serde(default)]
    #[schema(example = "6")]
    pub tax_rate: Decimal,
}

impl ProductPayload {
    fn fields(&self) -> ProductFields<'_> {
        ProductFields {
            category_id: self.category_id,
            sku: self.sku.trim(),
            name: self.name.trim(),
            cost_unit: self.cost_unit,
            packaging_cost: self.packaging_cost,
            tax_rate: self.tax_rate,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/catalog/categories",
    tag = "Catálogo",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 400, description = "Dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let category = app_state
        .catalog_service
        .create_category(tenant.0, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/api/catalog/categories",
    tag = "Catálogo",
    responses((status = 200, description = "Lista de categorias", body = Vec<Category>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state.catalog_service.list_categories(tenant.0).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    post,
    path = "/api/catalog/products",
    tag = "Catálogo",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "SKU já cadastrado")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .catalog_service
        .create_product(tenant.0, &payload.fields())
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products",
    tag = "Catálogo",
    responses((status = 200, description = "Lista de produtos", body = Vec<Product>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja"))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state.catalog_service.list_products(tenant.0).await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}",
    tag = "Catálogo",
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do produto")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state.catalog_service.get_product(tenant.0, product_id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    put,
    path = "/api/catalog/products/{id}",
    tag = "Catálogo",
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do produto")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .catalog_service
        .update_product(tenant.0, product_id, &payload.fields())
        .await?;

    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/products/{id}",
    tag = "Catálogo",
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Produto com vendas ou regras vinculadas")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do produto")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.catalog_service.delete_product(tenant.0, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn payload_de_produto_em_camel_case() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "sku": " FONE-1 ",
            "name": "Fone",
            "costUnit": 35.5
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.packaging_cost, Decimal::ZERO);
        assert_eq!(payload.fields().sku, "FONE-1");
        assert_eq!(payload.cost_unit, dec!(35.5));
    }

    #[test]
    fn payload_invalido_lista_os_campos() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "sku": "",
            "name": "Fone",
            "costUnit": -1,
            "taxRate": 150
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("sku"));
        assert!(fields.contains_key("cost_unit"));
        assert!(fields.contains_key("tax_rate"));
    }
}
