//! Field mapper turning free-form category strings into canonical labels.
//!
//! Lookups never fail: an empty, absent, or unrecognized token resolves to the field's default.

use super::domain::{
    BmiCategory, EmploymentStatus, Gender, InsurancePlan, MaritalStatus, MedicalHistory, Region,
    SmokingStatus,
};
use super::normalizer::normalize_token;
use serde::Serialize;

/// Categorical inputs accepted by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoricalField {
    InsurancePlan,
    EmploymentStatus,
    Gender,
    MaritalStatus,
    BmiCategory,
    SmokingStatus,
    Region,
    MedicalHistory,
}

impl CategoricalField {
    pub const fn ordered() -> [CategoricalField; 8] {
        [
            CategoricalField::InsurancePlan,
            CategoricalField::EmploymentStatus,
            CategoricalField::Gender,
            CategoricalField::MaritalStatus,
            CategoricalField::BmiCategory,
            CategoricalField::SmokingStatus,
            CategoricalField::Region,
            CategoricalField::MedicalHistory,
        ]
    }

    /// Wire name of the field in raw prediction requests.
    pub const fn name(self) -> &'static str {
        match self {
            CategoricalField::InsurancePlan => "insurancePlan",
            CategoricalField::EmploymentStatus => "employmentStatus",
            CategoricalField::Gender => "gender",
            CategoricalField::MaritalStatus => "maritalStatus",
            CategoricalField::BmiCategory => "bmiCategory",
            CategoricalField::SmokingStatus => "smokingStatus",
            CategoricalField::Region => "region",
            CategoricalField::MedicalHistory => "medicalHistory",
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            CategoricalField::InsurancePlan => InsurancePlan::default().label(),
            CategoricalField::EmploymentStatus => EmploymentStatus::default().label(),
            CategoricalField::Gender => Gender::default().label(),
            CategoricalField::MaritalStatus => MaritalStatus::default().label(),
            CategoricalField::BmiCategory => BmiCategory::default().label(),
            CategoricalField::SmokingStatus => SmokingStatus::default().label(),
            CategoricalField::Region => Region::default().label(),
            CategoricalField::MedicalHistory => MedicalHistory::default().label(),
        }
    }
}

/// Map `raw` for `field` to its canonical label.
pub fn normalize(field: CategoricalField, raw: Option<&str>) -> &'static str {
    match field {
        CategoricalField::InsurancePlan => InsurancePlan::from_raw(raw).label(),
        CategoricalField::EmploymentStatus => EmploymentStatus::from_raw(raw).label(),
        CategoricalField::Gender => Gender::from_raw(raw).label(),
        CategoricalField::MaritalStatus => MaritalStatus::from_raw(raw).label(),
        CategoricalField::BmiCategory => BmiCategory::from_raw(raw).label(),
        CategoricalField::SmokingStatus => SmokingStatus::from_raw(raw).label(),
        CategoricalField::Region => Region::from_raw(raw).label(),
        CategoricalField::MedicalHistory => MedicalHistory::from_raw(raw).label(),
    }
}

/// A closed set of canonical values with a lookup table of accepted tokens.
pub trait Categorical: Copy + Default + 'static {
    /// Normalized tokens (see `normalize_token`) and the value each one selects.
    const TOKENS: &'static [(&'static str, Self)];

    fn label(self) -> &'static str;

    fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let token = normalize_token(raw);
        Self::TOKENS
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, value)| *value)
            .unwrap_or_default()
    }
}

impl Categorical for InsurancePlan {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("bronze", InsurancePlan::Bronze),
        ("silver", InsurancePlan::Silver),
        ("gold", InsurancePlan::Gold),
    ];

    fn label(self) -> &'static str {
        match self {
            InsurancePlan::Bronze => "Bronze",
            InsurancePlan::Silver => "Silver",
            InsurancePlan::Gold => "Gold",
        }
    }
}

impl Categorical for EmploymentStatus {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("salaried", EmploymentStatus::Salaried),
        ("self-employed", EmploymentStatus::SelfEmployed),
        ("freelancer", EmploymentStatus::Freelancer),
        ("unemployed", EmploymentStatus::Unemployed),
    ];

    fn label(self) -> &'static str {
        match self {
            EmploymentStatus::Salaried => "Salaried",
            EmploymentStatus::SelfEmployed => "Self-Employed",
            EmploymentStatus::Freelancer => "Freelancer",
            EmploymentStatus::Unemployed => "",
        }
    }
}

impl Categorical for Gender {
    const TOKENS: &'static [(&'static str, Self)] =
        &[("male", Gender::Male), ("female", Gender::Female)];

    fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl Categorical for MaritalStatus {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("married", MaritalStatus::Married),
        ("unmarried", MaritalStatus::Unmarried),
    ];

    fn label(self) -> &'static str {
        match self {
            MaritalStatus::Married => "Married",
            MaritalStatus::Unmarried => "Unmarried",
        }
    }
}

impl Categorical for BmiCategory {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("underweight", BmiCategory::Underweight),
        ("normal", BmiCategory::Normal),
        ("overweight", BmiCategory::Overweight),
        ("obese", BmiCategory::Obesity),
        ("obesity", BmiCategory::Obesity),
    ];

    fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obesity => "Obesity",
        }
    }
}

impl Categorical for SmokingStatus {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("no-smoking", SmokingStatus::NoSmoking),
        ("smoking", SmokingStatus::Regular),
        ("regular", SmokingStatus::Regular),
        ("occasional", SmokingStatus::Occasional),
    ];

    fn label(self) -> &'static str {
        match self {
            SmokingStatus::NoSmoking => "No Smoking",
            SmokingStatus::Regular => "Regular",
            SmokingStatus::Occasional => "Occasional",
        }
    }
}

impl Categorical for Region {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("northwest", Region::Northwest),
        ("northeast", Region::Northeast),
        ("southeast", Region::Southeast),
        ("southwest", Region::Southwest),
    ];

    fn label(self) -> &'static str {
        match self {
            Region::Northwest => "Northwest",
            Region::Northeast => "Northeast",
            Region::Southeast => "Southeast",
            Region::Southwest => "Southwest",
        }
    }
}

impl Categorical for MedicalHistory {
    const TOKENS: &'static [(&'static str, Self)] = &[
        ("no-disease", MedicalHistory::NoDisease),
        ("diabetes", MedicalHistory::Diabetes),
        ("heart-disease", MedicalHistory::HeartDisease),
        ("high-blood-pressure", MedicalHistory::HighBloodPressure),
        ("thyroid", MedicalHistory::Thyroid),
    ];

    fn label(self) -> &'static str {
        match self {
            MedicalHistory::NoDisease => "No Disease",
            MedicalHistory::Diabetes => "Diabetes",
            MedicalHistory::HeartDisease => "Heart disease",
            MedicalHistory::HighBloodPressure => "High blood pressure",
            MedicalHistory::Thyroid => "Thyroid",
        }
    }
}
