// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pricing::calculator::ProductInputs;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Eletrônicos")]
    pub name: String,

    pub created_at: DateTime<Utc>,
}

// --- 2. Produtos ---
// Só o que a precificação precisa: custos, embalagem e alíquota.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub category_id: Option<Uuid>,

    #[schema(example = "FONE-BT-001")]
    pub sku: String,

    #[schema(example = "Fone Bluetooth")]
    pub name: String,

    #[schema(example = "35.90")]
    pub cost_unit: Decimal,

    #[schema(example = "2.50")]
    pub packaging_cost: Decimal,

    /// Alíquota de imposto em percentual (0–100)
    #[schema(example = "6")]
    pub tax_rate: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn pricing_inputs(&self) -> ProductInputs {
        ProductInputs {
            product_id: self.id,
            cost_unit: self.cost_unit,
            packaging_cost: self.packaging_cost,
            tax_rate: self.tax_rate,
            category_id: self.category_id,
        }
    }
}
