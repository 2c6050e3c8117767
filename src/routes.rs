// src/routes.rs

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// Monta o router completo. Toda rota de dados exige o cabeçalho X-Tenant-ID
/// (o extrator `TenantContext` recusa a requisição sem ele).
pub fn router(app_state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route(
            "/categories",
            post(handlers::catalog::create_category).get(handlers::catalog::list_categories),
        )
        .route(
            "/products",
            post(handlers::catalog::create_product).get(handlers::catalog::list_products),
        )
        .route(
            "/products/{id}",
            get(handlers::catalog::get_product)
                .put(handlers::catalog::update_product)
                .delete(handlers::catalog::delete_product),
        );

    let marketplace_routes = Router::new()
        .route(
            "/",
            post(handlers::marketplaces::create_marketplace).get(handlers::marketplaces::list_marketplaces),
        )
        .route("/platforms", get(handlers::marketplaces::list_platforms))
        .route("/{id}", delete(handlers::marketplaces::delete_marketplace))
        .route(
            "/{id}/commissions",
            post(handlers::marketplaces::create_commission).get(handlers::marketplaces::list_commissions),
        )
        .route("/{id}/commissions/resolve", get(handlers::marketplaces::resolve_commission))
        .route(
            "/{id}/fixed-fees",
            post(handlers::marketplaces::create_fixed_fee).get(handlers::marketplaces::list_fixed_fees),
        );

    let pricing_routes = Router::new()
        .route(
            "/settings",
            get(handlers::pricing::get_settings).put(handlers::pricing::update_settings),
        )
        .route("/calculate", post(handlers::pricing::calculate))
        .route("/compare", post(handlers::pricing::compare))
        .route("/margin", post(handlers::pricing::margin))
        .route(
            "/saved",
            post(handlers::pricing::save_pricing).get(handlers::pricing::list_saved_pricings),
        );

    let sales_routes = Router::new()
        .route("/", post(handlers::sales::create_sale).get(handlers::sales::list_sales))
        .route("/{id}/margin", get(handlers::sales::sale_margin));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::health))
        .nest("/api/catalog", catalog_routes)
        .nest("/api/marketplaces", marketplace_routes)
        .route(
            "/api/commissions/{id}",
            put(handlers::marketplaces::update_commission).delete(handlers::marketplaces::delete_commission),
        )
        .route("/api/fixed-fees/{id}", delete(handlers::marketplaces::delete_fixed_fee))
        .route(
            "/api/shipping-rules",
            post(handlers::marketplaces::upsert_shipping_rule).get(handlers::marketplaces::list_shipping_rules),
        )
        .nest("/api/pricing", pricing_routes)
        .nest("/api/sales", sales_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
