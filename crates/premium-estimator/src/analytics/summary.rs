use super::views::{DashboardSummary, HealthTrendPoint, MonthlyTrendPoint};
use crate::estimation::health_score;
use crate::storage::PredictionRecord;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub const TREND_MONTHS: u32 = 6;
pub const HEALTH_TREND_POSITIONS: u32 = 6;
pub const RECENT_PREDICTIONS: usize = 5;
pub const EMPTY_HEALTH_SCORE: u32 = 85;

/// Build the dashboard from `history`, which must be ordered newest first.
///
/// `now` anchors the monthly trend window.
pub fn summarize(history: &[PredictionRecord], now: DateTime<Utc>) -> DashboardSummary {
    let Some(latest) = history.first() else {
        return empty_summary();
    };

    DashboardSummary {
        current_premium: latest.premium,
        family_members: latest.input.dependants.saturating_add(1),
        health_score: health_score(&latest.input),
        premium_change: premium_change(history),
        avg_monthly_premium: monthly(latest.premium as f64),
        monthly_trend: monthly_trend(history, now),
        health_trend: health_trend(history),
        recent_predictions: history.iter().take(RECENT_PREDICTIONS).cloned().collect(),
        total_predictions: history.len(),
    }
}

fn empty_summary() -> DashboardSummary {
    DashboardSummary {
        current_premium: 0,
        family_members: 1,
        health_score: EMPTY_HEALTH_SCORE,
        premium_change: 0.0,
        avg_monthly_premium: 0,
        monthly_trend: Vec::new(),
        health_trend: Vec::new(),
        recent_predictions: Vec::new(),
        total_predictions: 0,
    }
}

fn premium_change(history: &[PredictionRecord]) -> f64 {
    match history {
        [latest, previous, ..] if previous.premium != 0 => {
            let change =
                (latest.premium - previous.premium) as f64 / previous.premium as f64 * 100.0;
            (change * 10.0).round() / 10.0
        }
        _ => 0.0,
    }
}

fn monthly(annual: f64) -> i64 {
    (annual / 12.0).round() as i64
}

fn monthly_trend(history: &[PredictionRecord], now: DateTime<Utc>) -> Vec<MonthlyTrendPoint> {
    (0..TREND_MONTHS)
        .rev()
        .map(|months_back| {
            let (year, month) = shift_month(now.year(), now.month(), months_back);
            let premiums: Vec<i64> = history
                .iter()
                .filter(|record| {
                    record.created_at.year() == year && record.created_at.month() == month
                })
                .map(|record| record.premium)
                .collect();

            let value = if premiums.is_empty() {
                None
            } else {
                let total: i64 = premiums.iter().sum();
                Some(monthly(total as f64 / premiums.len() as f64))
            };

            MonthlyTrendPoint {
                month: month_label(year, month),
                year,
                month_number: month,
                insufficient_data: value.is_none(),
                value,
            }
        })
        .collect()
}

fn health_trend(history: &[PredictionRecord]) -> Vec<HealthTrendPoint> {
    (0..HEALTH_TREND_POSITIONS)
        .map(|index| {
            let score = history
                .get(index as usize)
                .map(|record| health_score(&record.input));
            HealthTrendPoint {
                position: index + 1,
                insufficient_data: score.is_none(),
                score,
            }
        })
        .collect()
}

/// Calendar month `months_back` months before (`year`, `month`).
fn shift_month(year: i32, month: u32, months_back: u32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) - months_back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}
