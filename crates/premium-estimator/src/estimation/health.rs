use super::domain::{BmiCategory, PredictionInput, SmokingStatus};

pub const HEALTH_SCORE_CEILING: u32 = 100;
pub const HEALTH_SCORE_FLOOR: u32 = 60;

/// Secondary wellness score in `[60, 100]`. Penalties are summed independently and the
/// result is clamped at the floor.
pub fn health_score(input: &PredictionInput) -> u32 {
    let age_penalty = match input.age {
        age if age > 50 => 10,
        age if age > 35 => 5,
        _ => 0,
    };

    let smoking_penalty = match input.smoking_status {
        SmokingStatus::Regular => 15,
        SmokingStatus::Occasional => 8,
        SmokingStatus::NoSmoking => 0,
    };

    let bmi_penalty = match input.bmi_category {
        BmiCategory::Obesity => 12,
        BmiCategory::Overweight => 6,
        BmiCategory::Underweight => 4,
        BmiCategory::Normal => 0,
    };

    let medical_penalty = if input.medical_history.has_condition() {
        10
    } else {
        0
    };

    let genetic_penalty = match input.genetical_risk {
        risk if risk > 5 => 8,
        risk if risk > 2 => 4,
        _ => 0,
    };

    let penalties =
        age_penalty + smoking_penalty + bmi_penalty + medical_penalty + genetic_penalty;

    HEALTH_SCORE_CEILING
        .saturating_sub(penalties)
        .max(HEALTH_SCORE_FLOOR)
}
