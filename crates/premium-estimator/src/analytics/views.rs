use crate::storage::PredictionRecord;
use serde::Serialize;

/// Dashboard metrics derived from an owner's prediction history. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub current_premium: i64,
    pub family_members: u32,
    pub health_score: u32,
    /// Percentage change between the two newest premiums, one decimal place.
    pub premium_change: f64,
    pub avg_monthly_premium: i64,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    pub health_trend: Vec<HealthTrendPoint>,
    pub recent_predictions: Vec<PredictionRecord>,
    pub total_predictions: usize,
}

/// Average monthly premium for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendPoint {
    /// Display label such as `Mar 2026`.
    pub month: String,
    pub year: i32,
    pub month_number: u32,
    pub value: Option<i64>,
    pub insufficient_data: bool,
}

/// Health score of the record at `position` in the newest-first history (1 = newest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthTrendPoint {
    pub position: u32,
    pub score: Option<u32>,
    pub insufficient_data: bool,
}
