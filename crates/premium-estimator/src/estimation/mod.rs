//! Premium estimation: raw intake validation, field mapping, the premium formula, and the
//! health-score heuristic.

mod batch;
pub mod domain;
mod health;
pub mod mapping;
mod normalizer;
pub mod scoring;
mod validation;

pub use batch::{quote_csv, quote_csv_path, BatchError, BatchQuote, QuotedApplicant};
pub use domain::{
    BmiCategory, EmploymentStatus, Gender, InsurancePlan, MaritalStatus, MedicalHistory,
    PredictionInput, PredictionKind, Region, SmokingStatus,
};
pub use health::{health_score, HEALTH_SCORE_CEILING, HEALTH_SCORE_FLOOR};
pub use mapping::{normalize, Categorical, CategoricalField};
pub use scoring::{
    estimate, score, FormulaScorer, PremiumComponent, PremiumEstimate, PremiumFactor,
    PremiumScorer, ScorerError, BASE_PREMIUM,
};
pub use validation::{RawPredictionRequest, ValidationError};
