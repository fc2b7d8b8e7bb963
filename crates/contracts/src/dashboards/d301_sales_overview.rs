use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Счетчики из GET /api/admin/summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryStats {
    pub total_orders: i64,
    pub total_users: i64,
    pub total_products: i64,
}

/// Точка графика продаж: агрегаты одного календарного месяца (1..=12)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyPoint {
    pub month: u32,
    pub total_sales: Decimal,
    pub total_tax: Decimal,
    pub total_orders: i32,
}

/// Сводка продаж/налогов для дашборда и страницы аналитики
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOverview {
    /// По месяцам, в порядке возрастания месяца
    pub income: Vec<MonthlyPoint>,
    pub current_month_revenue: Decimal,
    pub last_month_revenue: Decimal,
    /// Процент к прошлому месяцу, 1 знак после запятой
    pub revenue_change: Decimal,
    pub current_month_tax: Decimal,
    pub last_month_tax: Decimal,
    pub tax_change: Decimal,
    pub all_time_tax: Decimal,
    pub total_revenue: Decimal,
    pub total_tax: Decimal,
    pub stats: SummaryStats,
}
