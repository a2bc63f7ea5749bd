//! Portfolio summary across all vehicles

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use domain_currency::CurrencyConverter;

use crate::chain::VehicleDossier;
use crate::sale::SaleStatus;

const RECENT_VEHICLES: usize = 5;
const TOP_PERFORMERS: usize = 3;

/// A vehicle as listed on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardVehicle {
    pub vehicle_id: String,
    pub lot_number: String,
    pub vin: String,
    pub sale_status: Option<SaleStatus>,
    pub final_cost: Option<Decimal>,
    pub benefit: Decimal,
}

/// Counts and totals in base units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub base_currency: Option<String>,
    pub vehicle_count: usize,
    pub sold_count: usize,
    pub ready_count: usize,
    pub in_transit_count: usize,
    pub sold_percentage: Decimal,
    pub ready_percentage: Decimal,
    pub in_transit_percentage: Decimal,
    /// Base value of sold vehicles' sale prices
    pub total_sales: Decimal,
    pub total_benefit: Decimal,
    pub average_benefit: Decimal,
    /// Base value of every purchase price
    pub total_investment: Decimal,
    pub total_expenses: Decimal,
    pub recent_vehicles: Vec<DashboardVehicle>,
    pub top_performers: Vec<DashboardVehicle>,
}

fn percentage(count: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(count) * dec!(100) / Decimal::from(total))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

impl DashboardSummary {
    /// Summarises `dossiers`; vehicles without a sale record count in no status
    pub fn compute(dossiers: &[VehicleDossier], converter: CurrencyConverter<'_>) -> Self {
        let count_status = |status: SaleStatus| {
            dossiers
                .iter()
                .filter(|d| d.sale_status() == Some(status))
                .count()
        };
        let vehicle_count = dossiers.len();
        let sold_count = count_status(SaleStatus::Sold);
        let ready_count = count_status(SaleStatus::ReadyForSale);
        let in_transit_count = count_status(SaleStatus::InTransit);

        let mut total_sales = Decimal::ZERO;
        let mut total_benefit = Decimal::ZERO;
        let mut total_investment = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        let mut listed = Vec::with_capacity(dossiers.len());

        for dossier in dossiers {
            let chain = dossier.chain(converter);
            let summary = chain.sale_summary();
            if dossier.is_sold() {
                total_sales += summary.sale_price_in_base;
                total_benefit += summary.benefit;
            }
            total_investment += chain.purchase_price().unwrap_or_default();
            total_expenses += chain.expenses();

            listed.push((
                dossier.vehicle.created_at,
                DashboardVehicle {
                    vehicle_id: dossier.vehicle.id.to_string(),
                    lot_number: dossier.vehicle.lot_number.clone(),
                    vin: dossier.vehicle.vin.clone(),
                    sale_status: dossier.sale_status(),
                    final_cost: chain.final_cost(),
                    benefit: summary.benefit,
                },
            ));
        }

        let average_benefit = if sold_count > 0 {
            total_benefit / Decimal::from(sold_count)
        } else {
            Decimal::ZERO
        };

        let mut top_performers: Vec<_> = listed
            .iter()
            .filter(|(_, v)| v.sale_status == Some(SaleStatus::Sold))
            .map(|(_, v)| v.clone())
            .collect();
        top_performers.sort_by(|a, b| b.benefit.cmp(&a.benefit));
        top_performers.truncate(TOP_PERFORMERS);

        listed.sort_by(|a, b| b.0.cmp(&a.0));
        let recent_vehicles = listed
            .into_iter()
            .take(RECENT_VEHICLES)
            .map(|(_, v)| v)
            .collect();

        Self {
            base_currency: converter.base_code().map(ToString::to_string),
            vehicle_count,
            sold_count,
            ready_count,
            in_transit_count,
            sold_percentage: percentage(sold_count, vehicle_count),
            ready_percentage: percentage(ready_count, vehicle_count),
            in_transit_percentage: percentage(in_transit_count, vehicle_count),
            total_sales,
            total_benefit,
            average_benefit,
            total_investment,
            total_expenses,
            recent_vehicles,
            top_performers,
        }
    }
}
