use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use contracts::dashboards::d301_sales_overview::{MonthlyPoint, SalesOverview, SummaryStats};
use contracts::domain::a002_order::aggregate::Order;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::a002_order::repository::parse_order_list;
use crate::shared::api_client::{ApiError, CommerceApi};

/// Загрузчик сводки продаж: заказы + счетчики summary
pub struct SalesOverviewLoader {
    api: Arc<dyn CommerceApi>,
}

impl SalesOverviewLoader {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        Self { api }
    }

    pub async fn load(&self) -> Result<SalesOverview, ApiError> {
        let orders_payload = self.api.get_json("/api/orders").await?;
        let orders = parse_order_list(orders_payload);

        let stats_payload = self.api.get_json("/api/admin/summary").await?;
        let stats: SummaryStats = serde_json::from_value(stats_payload).unwrap_or_default();

        Ok(build_overview(&orders, stats, Utc::now()))
    }
}

/// Раскладывает заказы по календарным месяцам и считает выручку
/// и налоги текущего/прошлого месяца с процентом изменения.
pub fn build_overview(orders: &[Order], stats: SummaryStats, now: DateTime<Utc>) -> SalesOverview {
    let current = (now.year(), now.month());
    let last = if now.month() == 1 {
        (now.year() - 1, 12u32)
    } else {
        (now.year(), now.month() - 1)
    };

    let mut monthly: BTreeMap<u32, MonthlyPoint> = BTreeMap::new();
    let mut overview = SalesOverview {
        stats,
        ..SalesOverview::default()
    };

    for order in orders {
        let created = order.created_at;
        let month = created.month();
        let point = monthly.entry(month).or_insert_with(|| MonthlyPoint {
            month,
            ..MonthlyPoint::default()
        });
        point.total_sales += order.total;
        point.total_tax += order.tax;
        point.total_orders += 1;

        overview.total_revenue += order.total;
        overview.total_tax += order.tax;
        overview.all_time_tax += order.tax;

        if (created.year(), created.month()) == current {
            overview.current_month_revenue += order.total;
            overview.current_month_tax += order.tax;
        }
        if (created.year(), created.month()) == last {
            overview.last_month_revenue += order.total;
            overview.last_month_tax += order.tax;
        }
    }

    overview.revenue_change =
        percent_change(overview.current_month_revenue, overview.last_month_revenue);
    overview.tax_change = percent_change(overview.current_month_tax, overview.last_month_tax);
    overview.income = monthly.into_values().collect();
    overview
}

/// Процент изменения к прошлому месяцу, 1 знак после запятой;
/// при пустом прошлом месяце - 0
fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous > Decimal::ZERO {
        ((current - previous) / previous * Decimal::from(100))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    }
}
