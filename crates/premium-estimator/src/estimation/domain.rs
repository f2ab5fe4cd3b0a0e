use serde::{Deserialize, Serialize};

/// One person's self-reported attributes for a single estimate, after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub age: u32,
    pub dependants: u32,
    pub income_lakhs: u32,
    #[serde(default)]
    pub genetical_risk: u32,
    #[serde(default)]
    pub insurance_plan: InsurancePlan,
    #[serde(default)]
    pub employment_status: EmploymentStatus,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub bmi_category: BmiCategory,
    #[serde(default)]
    pub smoking_status: SmokingStatus,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub medical_history: MedicalHistory,
}

impl PredictionInput {
    /// Input with the required numeric fields set and every other field at its documented default.
    pub fn new(age: u32, dependants: u32, income_lakhs: u32) -> Self {
        Self {
            age,
            dependants,
            income_lakhs,
            genetical_risk: 0,
            insurance_plan: InsurancePlan::default(),
            employment_status: EmploymentStatus::default(),
            gender: Gender::default(),
            marital_status: MaritalStatus::default(),
            bmi_category: BmiCategory::default(),
            smoking_status: SmokingStatus::default(),
            region: Region::default(),
            medical_history: MedicalHistory::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsurancePlan {
    #[default]
    Bronze,
    Silver,
    Gold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    #[default]
    Salaried,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
    Freelancer,
    /// Canonical label is the empty string.
    #[serde(rename = "")]
    Unemployed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    Married,
    #[default]
    Unmarried,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    #[default]
    Normal,
    Overweight,
    Obesity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingStatus {
    #[default]
    #[serde(rename = "No Smoking")]
    NoSmoking,
    Regular,
    Occasional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Northwest,
    Northeast,
    Southeast,
    Southwest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicalHistory {
    #[default]
    #[serde(rename = "No Disease")]
    NoDisease,
    Diabetes,
    #[serde(rename = "Heart disease")]
    HeartDisease,
    #[serde(rename = "High blood pressure")]
    HighBloodPressure,
    Thyroid,
}

impl MedicalHistory {
    pub fn has_condition(self) -> bool {
        self != MedicalHistory::NoDisease
    }
}

/// Which scoring path produced a stored estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionKind {
    #[default]
    Formula,
    ExternalScrape,
}

impl PredictionKind {
    pub const fn label(self) -> &'static str {
        match self {
            PredictionKind::Formula => "formula",
            PredictionKind::ExternalScrape => "external_scrape",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "formula" => Some(PredictionKind::Formula),
            "external_scrape" => Some(PredictionKind::ExternalScrape),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_canonical_labels() {
        let mut input = PredictionInput::new(42, 1, 12);
        input.employment_status = EmploymentStatus::Unemployed;
        input.medical_history = MedicalHistory::HighBloodPressure;

        let value = serde_json::to_value(&input).expect("serializes");
        assert_eq!(value["incomeLakhs"], json!(12));
        assert_eq!(value["employmentStatus"], json!(""));
        assert_eq!(value["smokingStatus"], json!("No Smoking"));
        assert_eq!(value["medicalHistory"], json!("High blood pressure"));

        let back: PredictionInput = serde_json::from_value(value).expect("deserializes");
        assert_eq!(back, input);
    }

    #[test]
    fn prediction_kind_labels_match_serde() {
        for kind in [PredictionKind::Formula, PredictionKind::ExternalScrape] {
            let value = serde_json::to_value(kind).expect("serializes");
            assert_eq!(value, json!(kind.label()));
            assert_eq!(PredictionKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(PredictionKind::from_label("streamlit"), None);
    }
}
