//! Dashboard analytics derived from prediction history.

mod summary;
pub mod views;

pub use summary::{summarize, EMPTY_HEALTH_SCORE, HEALTH_TREND_POSITIONS, TREND_MONTHS};
pub use views::{DashboardSummary, HealthTrendPoint, MonthlyTrendPoint};
