// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pricing::calculator::{round_money, MarginBreakdown};

// --- VENDA (lançada pelo vendedor) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub product_id: Uuid,
    pub marketplace_id: Uuid,

    #[schema(example = "129.90")]
    pub price_charged: Decimal,

    #[schema(example = 2)]
    pub quantity: i32,

    pub sold_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Margem realizada de uma venda (unitária e total).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleMargin {
    pub sale_id: Uuid,
    pub quantity: i32,
    pub unit: MarginBreakdown,
    pub total_revenue: Decimal,
    pub total_margin: Decimal,
}

impl SaleMargin {
    pub fn new(sale: &Sale, unit: MarginBreakdown) -> Self {
        let quantity = Decimal::from(sale.quantity);
        Self {
            sale_id: sale.id,
            quantity: sale.quantity,
            total_revenue: round_money(sale.price_charged * quantity),
            total_margin: round_money(unit.margem_unitaria * quantity),
            unit,
        }
    }
}
