//! Stage and sale repository
//!
//! Every stage table holds at most one row per vehicle. Saves are a single
//! `INSERT ... ON CONFLICT (vehicle_id) DO UPDATE` statement, so re-saving a
//! stage rewrites the existing row in place.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use core_kernel::{
    BuyerId, CurrencyCode, KabulExpensesId, PurchaseId, RepairExpensesId, SaleId, ShippingId,
    VehicleId, WorldExpensesId,
};
use domain_vehicle::{
    KabulExpenses, Purchase, RepairExpenses, SaleInfo, SaleStatus, Shipping, WorldExpenses,
};

use super::{
    bind_amount, bind_cost, bind_outstanding, cost_entry, currency_amount, outstanding, PgQuery,
};
use crate::error::DatabaseError;

/// A column, or a group of columns stored for one value
#[derive(Debug, Clone, Copy)]
enum Column {
    Plain(&'static str),
    /// `{name}_amount`, `{name}_currency`, `{name}_date`
    Cost(&'static str),
    /// `{name}_amount`, `{name}_currency`
    Amount(&'static str),
}

use Column::{Amount, Cost, Plain};

fn column_names(columns: &[Column]) -> Vec<String> {
    let mut names = Vec::new();
    for column in columns {
        match column {
            Plain(name) => names.push((*name).to_string()),
            Cost(name) => {
                names.push(format!("{name}_amount"));
                names.push(format!("{name}_currency"));
                names.push(format!("{name}_date"));
            }
            Amount(name) => {
                names.push(format!("{name}_amount"));
                names.push(format!("{name}_currency"));
            }
        }
    }
    names
}

fn select_sql(table: &str, columns: &[Column], key: &str) -> String {
    format!(
        "SELECT {} FROM {table} WHERE {key} = $1",
        column_names(columns).join(", ")
    )
}

fn upsert_sql(table: &str, columns: &[Column]) -> String {
    let names = column_names(columns);
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("${i}")).collect();
    let updates: Vec<String> = names
        .iter()
        .filter(|name| !matches!(name.as_str(), "id" | "vehicle_id" | "created_at"))
        .map(|name| format!("{name} = EXCLUDED.{name}"))
        .collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) ON CONFLICT (vehicle_id) DO UPDATE SET {}",
        names.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    )
}

fn currency_columns(columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .filter_map(|column| match column {
            Cost(name) | Amount(name) => Some(format!("{name}_currency")),
            Plain(_) => None,
        })
        .collect()
}

/// One query telling whether any stage or sale amount is in the code bound to `$1`
fn currency_usage_sql() -> String {
    let checks: Vec<String> = STAGE_TABLES
        .iter()
        .map(|(table, columns)| {
            format!(
                "EXISTS (SELECT 1 FROM {table} WHERE $1 IN ({}))",
                currency_columns(columns).join(", ")
            )
        })
        .collect();
    format!("SELECT {}", checks.join(" OR "))
}

const PURCHASE: &[Column] = &[
    Plain("id"),
    Plain("vehicle_id"),
    Amount("purchase_price"),
    Amount("paid_amount"),
    Plain("buy_date"),
    Plain("payment_date"),
    Plain("remain_purchase"),
    Plain("created_at"),
    Plain("updated_at"),
];

const SHIPPING: &[Column] = &[
    Plain("id"),
    Plain("vehicle_id"),
    Cost("commission"),
    Cost("clearing"),
    Cost("duty_vat"),
    Cost("delivery_order"),
    Cost("red_sea"),
    Cost("towing"),
    Cost("shipping"),
    Cost("port_clips_prmi"),
    Cost("attestation"),
    Cost("cash_paid_commission"),
    Cost("dubai_paid_invoice"),
    Amount("total_price_to_dubai"),
    Plain("date_arrived_in_dubai"),
    Plain("etd_from_usa"),
    Plain("container_number"),
    Plain("booking_number"),
    Plain("created_at"),
    Plain("updated_at"),
];

const WORLD: &[Column] = &[
    Plain("id"),
    Plain("vehicle_id"),
    Cost("business_commission"),
    Plain("remaining_commission"),
    Plain("remaining_commission_date"),
    Cost("gomrok_payment"),
    Plain("remaining_gomrok"),
    Plain("remaining_gomrok_date"),
    Cost("shipping_to_border"),
    Cost("paid_for_shipping"),
    Plain("remain_shipping"),
    Plain("return_date_from_dubai"),
    Plain("herat_arrival_date"),
    Plain("created_at"),
    Plain("updated_at"),
];

const KABUL: &[Column] = &[
    Plain("id"),
    Plain("vehicle_id"),
    Cost("herat_to_kabul"),
    Plain("remaining"),
    Plain("remaining_date"),
    Plain("arrival_date_kabul"),
    Plain("created_at"),
    Plain("updated_at"),
];

const REPAIR: &[Column] = &[
    Plain("id"),
    Plain("vehicle_id"),
    Cost("repair_cost"),
    Plain("remaining_repair_cost"),
    Cost("palate_cost"),
    Plain("palate_remaining_cost"),
    Plain("created_at"),
    Plain("updated_at"),
];

const SALE: &[Column] = &[
    Plain("id"),
    Plain("vehicle_id"),
    Plain("status"),
    Plain("buyer_id"),
    Amount("sale_price"),
    Plain("sale_date"),
    Plain("remaining_price_of_buyer"),
    Plain("buyer_remain_payment_date"),
    Plain("split_note"),
    Plain("created_at"),
    Plain("updated_at"),
];

const STAGE_TABLES: &[(&str, &[Column])] = &[
    ("purchases", PURCHASE),
    ("shipments", SHIPPING),
    ("world_expenses", WORLD),
    ("kabul_expenses", KABUL),
    ("repair_expenses", REPAIR),
    ("sales", SALE),
];

fn vehicle_id(row: &PgRow) -> Result<VehicleId, DatabaseError> {
    Ok(VehicleId::from_uuid(row.try_get("vehicle_id")?))
}

fn purchase_from_row(row: &PgRow) -> Result<Purchase, DatabaseError> {
    Ok(Purchase {
        id: PurchaseId::from_uuid(row.try_get("id")?),
        vehicle_id: vehicle_id(row)?,
        purchase_price: currency_amount(row, "purchase_price")?,
        paid_amount: currency_amount(row, "paid_amount")?,
        buy_date: row.try_get("buy_date")?,
        payment_date: row.try_get("payment_date")?,
        remain_purchase: row.try_get("remain_purchase")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn shipping_from_row(row: &PgRow) -> Result<Shipping, DatabaseError> {
    Ok(Shipping {
        id: ShippingId::from_uuid(row.try_get("id")?),
        vehicle_id: vehicle_id(row)?,
        commission: cost_entry(row, "commission")?,
        clearing: cost_entry(row, "clearing")?,
        duty_vat: cost_entry(row, "duty_vat")?,
        delivery_order: cost_entry(row, "delivery_order")?,
        red_sea: cost_entry(row, "red_sea")?,
        towing: cost_entry(row, "towing")?,
        shipping: cost_entry(row, "shipping")?,
        port_clips_prmi: cost_entry(row, "port_clips_prmi")?,
        attestation: cost_entry(row, "attestation")?,
        cash_paid_commission: cost_entry(row, "cash_paid_commission")?,
        dubai_paid_invoice: cost_entry(row, "dubai_paid_invoice")?,
        total_price_to_dubai: currency_amount(row, "total_price_to_dubai")?,
        date_arrived_in_dubai: row.try_get("date_arrived_in_dubai")?,
        etd_from_usa: row.try_get("etd_from_usa")?,
        container_number: row.try_get("container_number")?,
        booking_number: row.try_get("booking_number")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn world_from_row(row: &PgRow) -> Result<WorldExpenses, DatabaseError> {
    Ok(WorldExpenses {
        id: WorldExpensesId::from_uuid(row.try_get("id")?),
        vehicle_id: vehicle_id(row)?,
        business_commission: cost_entry(row, "business_commission")?,
        remaining_commission: outstanding(row, "remaining_commission", "remaining_commission_date")?,
        gomrok_payment: cost_entry(row, "gomrok_payment")?,
        remaining_gomrok: outstanding(row, "remaining_gomrok", "remaining_gomrok_date")?,
        shipping_to_border: cost_entry(row, "shipping_to_border")?,
        paid_for_shipping: cost_entry(row, "paid_for_shipping")?,
        remain_shipping: row.try_get("remain_shipping")?,
        return_date_from_dubai: row.try_get("return_date_from_dubai")?,
        herat_arrival_date: row.try_get("herat_arrival_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn kabul_from_row(row: &PgRow) -> Result<KabulExpenses, DatabaseError> {
    Ok(KabulExpenses {
        id: KabulExpensesId::from_uuid(row.try_get("id")?),
        vehicle_id: vehicle_id(row)?,
        herat_to_kabul: cost_entry(row, "herat_to_kabul")?,
        remaining: outstanding(row, "remaining", "remaining_date")?,
        arrival_date_kabul: row.try_get("arrival_date_kabul")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn repair_from_row(row: &PgRow) -> Result<RepairExpenses, DatabaseError> {
    Ok(RepairExpenses {
        id: RepairExpensesId::from_uuid(row.try_get("id")?),
        vehicle_id: vehicle_id(row)?,
        repair_cost: cost_entry(row, "repair_cost")?,
        remaining_repair_cost: row.try_get("remaining_repair_cost")?,
        palate_cost: cost_entry(row, "palate_cost")?,
        palate_remaining_cost: row.try_get("palate_remaining_cost")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn sale_from_row(row: &PgRow) -> Result<SaleInfo, DatabaseError> {
    let status: String = row.try_get("status")?;
    let buyer_id: Option<Uuid> = row.try_get("buyer_id")?;
    Ok(SaleInfo {
        id: SaleId::from_uuid(row.try_get("id")?),
        vehicle_id: vehicle_id(row)?,
        status: status.parse::<SaleStatus>().map_err(DatabaseError::corrupt)?,
        buyer_id: buyer_id.map(BuyerId::from_uuid),
        sale_price: currency_amount(row, "sale_price")?,
        sale_date: row.try_get("sale_date")?,
        remaining_price_of_buyer: row.try_get("remaining_price_of_buyer")?,
        buyer_remain_payment_date: row.try_get("buyer_remain_payment_date")?,
        split_note: row.try_get("split_note")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Repository for the five stage tables and the sale table
#[derive(Debug, Clone)]
pub struct StageRepository {
    pool: PgPool,
}

impl StageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch<T>(
        &self,
        table: &str,
        columns: &[Column],
        key: &str,
        value: Uuid,
        map: fn(&PgRow) -> Result<T, DatabaseError>,
    ) -> Result<Option<T>, DatabaseError> {
        let sql = select_sql(table, columns, key);
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map).transpose()
    }

    async fn execute(&self, query: PgQuery<'_>) -> Result<(), DatabaseError> {
        query.execute(&self.pool).await?;
        Ok(())
    }

    pub async fn currency_in_use(&self, code: &CurrencyCode) -> Result<bool, DatabaseError> {
        let in_use: bool = sqlx::query_scalar(&currency_usage_sql())
            .bind(code.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(in_use)
    }

    // ========================================================================
    // Purchase
    // ========================================================================

    pub async fn purchase_for(&self, vehicle_id: VehicleId) -> Result<Option<Purchase>, DatabaseError> {
        self.fetch("purchases", PURCHASE, "vehicle_id", vehicle_id.into(), purchase_from_row)
            .await
    }

    pub async fn get_purchase(&self, id: PurchaseId) -> Result<Purchase, DatabaseError> {
        self.fetch("purchases", PURCHASE, "id", id.into(), purchase_from_row)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Purchase", id))
    }

    pub async fn save_purchase(&self, purchase: &Purchase) -> Result<(), DatabaseError> {
        let sql = upsert_sql("purchases", PURCHASE);
        let query = sqlx::query(&sql)
            .bind(Uuid::from(purchase.id))
            .bind(Uuid::from(purchase.vehicle_id));
        let query = bind_amount(query, &purchase.purchase_price);
        let query = bind_amount(query, &purchase.paid_amount)
            .bind(purchase.buy_date)
            .bind(purchase.payment_date)
            .bind(purchase.remain_purchase)
            .bind(purchase.created_at)
            .bind(purchase.updated_at);
        self.execute(query).await
    }

    // ========================================================================
    // Shipping
    // ========================================================================

    pub async fn shipping_for(&self, vehicle_id: VehicleId) -> Result<Option<Shipping>, DatabaseError> {
        self.fetch("shipments", SHIPPING, "vehicle_id", vehicle_id.into(), shipping_from_row)
            .await
    }

    pub async fn get_shipping(&self, id: ShippingId) -> Result<Shipping, DatabaseError> {
        self.fetch("shipments", SHIPPING, "id", id.into(), shipping_from_row)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Shipping", id))
    }

    pub async fn save_shipping(&self, shipping: &Shipping) -> Result<(), DatabaseError> {
        let sql = upsert_sql("shipments", SHIPPING);
        let mut query = sqlx::query(&sql)
            .bind(Uuid::from(shipping.id))
            .bind(Uuid::from(shipping.vehicle_id));
        for fee in shipping.invoice_fees() {
            query = bind_cost(query, fee);
        }
        query = bind_cost(query, &shipping.cash_paid_commission);
        query = bind_cost(query, &shipping.dubai_paid_invoice);
        let query = bind_amount(query, &shipping.total_price_to_dubai)
            .bind(shipping.date_arrived_in_dubai)
            .bind(shipping.etd_from_usa)
            .bind(&shipping.container_number)
            .bind(&shipping.booking_number)
            .bind(shipping.created_at)
            .bind(shipping.updated_at);
        self.execute(query).await
    }

    // ========================================================================
    // World expenses
    // ========================================================================

    pub async fn world_expenses_for(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<WorldExpenses>, DatabaseError> {
        self.fetch("world_expenses", WORLD, "vehicle_id", vehicle_id.into(), world_from_row)
            .await
    }

    pub async fn get_world_expenses(&self, id: WorldExpensesId) -> Result<WorldExpenses, DatabaseError> {
        self.fetch("world_expenses", WORLD, "id", id.into(), world_from_row)
            .await?
            .ok_or_else(|| DatabaseError::not_found("WorldExpenses", id))
    }

    pub async fn save_world_expenses(&self, world: &WorldExpenses) -> Result<(), DatabaseError> {
        let sql = upsert_sql("world_expenses", WORLD);
        let query = sqlx::query(&sql)
            .bind(Uuid::from(world.id))
            .bind(Uuid::from(world.vehicle_id));
        let query = bind_cost(query, &world.business_commission);
        let query = bind_outstanding(query, world.remaining_commission.as_ref());
        let query = bind_cost(query, &world.gomrok_payment);
        let query = bind_outstanding(query, world.remaining_gomrok.as_ref());
        let query = bind_cost(query, &world.shipping_to_border);
        let query = bind_cost(query, &world.paid_for_shipping)
            .bind(world.remain_shipping)
            .bind(world.return_date_from_dubai)
            .bind(world.herat_arrival_date)
            .bind(world.created_at)
            .bind(world.updated_at);
        self.execute(query).await
    }

    // ========================================================================
    // Kabul expenses
    // ========================================================================

    pub async fn kabul_expenses_for(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<KabulExpenses>, DatabaseError> {
        self.fetch("kabul_expenses", KABUL, "vehicle_id", vehicle_id.into(), kabul_from_row)
            .await
    }

    pub async fn get_kabul_expenses(&self, id: KabulExpensesId) -> Result<KabulExpenses, DatabaseError> {
        self.fetch("kabul_expenses", KABUL, "id", id.into(), kabul_from_row)
            .await?
            .ok_or_else(|| DatabaseError::not_found("KabulExpenses", id))
    }

    pub async fn save_kabul_expenses(&self, kabul: &KabulExpenses) -> Result<(), DatabaseError> {
        let sql = upsert_sql("kabul_expenses", KABUL);
        let query = sqlx::query(&sql)
            .bind(Uuid::from(kabul.id))
            .bind(Uuid::from(kabul.vehicle_id));
        let query = bind_cost(query, &kabul.herat_to_kabul);
        let query = bind_outstanding(query, kabul.remaining.as_ref())
            .bind(kabul.arrival_date_kabul)
            .bind(kabul.created_at)
            .bind(kabul.updated_at);
        self.execute(query).await
    }

    // ========================================================================
    // Repair expenses
    // ========================================================================

    pub async fn repair_expenses_for(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<RepairExpenses>, DatabaseError> {
        self.fetch("repair_expenses", REPAIR, "vehicle_id", vehicle_id.into(), repair_from_row)
            .await
    }

    pub async fn get_repair_expenses(&self, id: RepairExpensesId) -> Result<RepairExpenses, DatabaseError> {
        self.fetch("repair_expenses", REPAIR, "id", id.into(), repair_from_row)
            .await?
            .ok_or_else(|| DatabaseError::not_found("RepairExpenses", id))
    }

    pub async fn save_repair_expenses(&self, repair: &RepairExpenses) -> Result<(), DatabaseError> {
        let sql = upsert_sql("repair_expenses", REPAIR);
        let query = sqlx::query(&sql)
            .bind(Uuid::from(repair.id))
            .bind(Uuid::from(repair.vehicle_id));
        let query = bind_cost(query, &repair.repair_cost).bind(repair.remaining_repair_cost);
        let query = bind_cost(query, &repair.palate_cost)
            .bind(repair.palate_remaining_cost)
            .bind(repair.created_at)
            .bind(repair.updated_at);
        self.execute(query).await
    }

    // ========================================================================
    // Sale
    // ========================================================================

    pub async fn sale_for(&self, vehicle_id: VehicleId) -> Result<Option<SaleInfo>, DatabaseError> {
        self.fetch("sales", SALE, "vehicle_id", vehicle_id.into(), sale_from_row)
            .await
    }

    pub async fn get_sale(&self, id: SaleId) -> Result<SaleInfo, DatabaseError> {
        self.fetch("sales", SALE, "id", id.into(), sale_from_row)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Sale", id))
    }

    pub async fn save_sale(&self, sale: &SaleInfo) -> Result<(), DatabaseError> {
        let sql = upsert_sql("sales", SALE);
        let query = sqlx::query(&sql)
            .bind(Uuid::from(sale.id))
            .bind(Uuid::from(sale.vehicle_id))
            .bind(sale.status.as_str())
            .bind(sale.buyer_id.map(Uuid::from));
        let query = bind_amount(query, &sale.sale_price)
            .bind(sale.sale_date)
            .bind(sale.remaining_price_of_buyer)
            .bind(sale.buyer_remain_payment_date)
            .bind(&sale.split_note)
            .bind(sale.created_at)
            .bind(sale.updated_at);
        self.execute(query).await
    }
}
