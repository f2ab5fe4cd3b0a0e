use super::domain::{InsurancePlan, PredictionInput, PredictionKind, SmokingStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const BASE_PREMIUM: i64 = 5_000;
const PER_YEAR_OF_AGE: i64 = 50;
const PER_DEPENDANT: i64 = 2_000;
const PER_LAKH_OF_INCOME: i64 = 100;
const PER_GENETIC_RISK_POINT: i64 = 500;
const MEDICAL_CONDITION_ADD_ON: i64 = 2_000;

/// Term of the premium formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumFactor {
    Base,
    Age,
    Dependants,
    Income,
    GeneticalRisk,
    Smoking,
    InsurancePlan,
    MedicalHistory,
}

impl PremiumFactor {
    pub const fn label(self) -> &'static str {
        match self {
            PremiumFactor::Base => "Base premium",
            PremiumFactor::Age => "Age",
            PremiumFactor::Dependants => "Dependants",
            PremiumFactor::Income => "Income",
            PremiumFactor::GeneticalRisk => "Genetical risk",
            PremiumFactor::Smoking => "Smoking",
            PremiumFactor::InsurancePlan => "Insurance plan",
            PremiumFactor::MedicalHistory => "Medical history",
        }
    }
}

/// Contribution of a single factor, so callers can show how a premium was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumComponent {
    pub factor: PremiumFactor,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumEstimate {
    pub premium: i64,
    pub components: Vec<PremiumComponent>,
}

/// Annual premium for `input` under the fixed linear model.
pub fn score(input: &PredictionInput) -> i64 {
    estimate(input).premium
}

/// Premium plus the per-factor breakdown. Components always sum to the premium.
pub fn estimate(input: &PredictionInput) -> PremiumEstimate {
    let components = vec![
        PremiumComponent {
            factor: PremiumFactor::Base,
            amount: BASE_PREMIUM,
        },
        PremiumComponent {
            factor: PremiumFactor::Age,
            amount: i64::from(input.age) * PER_YEAR_OF_AGE,
        },
        PremiumComponent {
            factor: PremiumFactor::Dependants,
            amount: i64::from(input.dependants) * PER_DEPENDANT,
        },
        PremiumComponent {
            factor: PremiumFactor::Income,
            amount: i64::from(input.income_lakhs) * PER_LAKH_OF_INCOME,
        },
        PremiumComponent {
            factor: PremiumFactor::GeneticalRisk,
            amount: i64::from(input.genetical_risk) * PER_GENETIC_RISK_POINT,
        },
        PremiumComponent {
            factor: PremiumFactor::Smoking,
            amount: smoking_add_on(input.smoking_status),
        },
        PremiumComponent {
            factor: PremiumFactor::InsurancePlan,
            amount: plan_add_on(input.insurance_plan),
        },
        PremiumComponent {
            factor: PremiumFactor::MedicalHistory,
            amount: if input.medical_history.has_condition() {
                MEDICAL_CONDITION_ADD_ON
            } else {
                0
            },
        },
    ];

    let premium = components.iter().map(|component| component.amount).sum();
    PremiumEstimate {
        premium,
        components,
    }
}

fn smoking_add_on(status: SmokingStatus) -> i64 {
    match status {
        SmokingStatus::Regular => 3_000,
        SmokingStatus::Occasional => 1_500,
        SmokingStatus::NoSmoking => 0,
    }
}

fn plan_add_on(plan: InsurancePlan) -> i64 {
    match plan {
        InsurancePlan::Gold => 2_000,
        InsurancePlan::Silver => 1_000,
        InsurancePlan::Bronze => 0,
    }
}

/// A source of premium estimates. The formula is the default; alternates report their own kind
/// and may be unavailable.
pub trait PremiumScorer: Send + Sync {
    fn kind(&self) -> PredictionKind;
    fn estimate(&self, input: &PredictionInput) -> Result<PremiumEstimate, ScorerError>;
}

/// Scorer backed by the deterministic formula above.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormulaScorer;

impl PremiumScorer for FormulaScorer {
    fn kind(&self) -> PredictionKind {
        PredictionKind::Formula
    }

    fn estimate(&self, input: &PredictionInput) -> Result<PremiumEstimate, ScorerError> {
        Ok(estimate(input))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("premium scorer unavailable: {0}")]
    Unavailable(String),
    #[error("premium scorer timed out after {0:?}")]
    TimedOut(Duration),
}
