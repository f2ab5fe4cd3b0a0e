use super::domain::{
    BmiCategory, EmploymentStatus, Gender, InsurancePlan, MaritalStatus, MedicalHistory,
    PredictionInput, Region, SmokingStatus,
};
use super::mapping::Categorical;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Prediction request exactly as submitted by a form: every field optional and stringly typed.
///
/// Numeric fields accept JSON strings or numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPredictionRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dependants: Option<String>,
    #[serde(default, alias = "incomeLakhs", deserialize_with = "lenient_text")]
    pub income: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genetical_risk: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub insurance_plan: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employment_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bmi_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub smoking_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("field '{field}' must be a non-negative integer, got '{value}'")]
    Malformed { field: &'static str, value: String },
}

impl RawPredictionRequest {
    /// Check the required numeric fields and normalize everything else.
    pub fn validate(&self) -> Result<PredictionInput, ValidationError> {
        let required = [
            ("age", &self.age),
            ("dependants", &self.dependants),
            ("income", &self.income),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| present(value).is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let age = required_count("age", &self.age)?;
        let dependants = required_count("dependants", &self.dependants)?;
        let income_lakhs = required_count("income", &self.income)?;

        let genetical_risk = match present(&self.genetical_risk) {
            Some(raw) => parse_count(raw).unwrap_or_else(|| {
                debug!(value = raw, "unparseable geneticalRisk, using 0");
                0
            }),
            None => 0,
        };

        Ok(PredictionInput {
            age,
            dependants,
            income_lakhs,
            genetical_risk,
            insurance_plan: InsurancePlan::from_raw(self.insurance_plan.as_deref()),
            employment_status: EmploymentStatus::from_raw(self.employment_status.as_deref()),
            gender: Gender::from_raw(self.gender.as_deref()),
            marital_status: MaritalStatus::from_raw(self.marital_status.as_deref()),
            bmi_category: BmiCategory::from_raw(self.bmi_category.as_deref()),
            smoking_status: SmokingStatus::from_raw(self.smoking_status.as_deref()),
            region: Region::from_raw(self.region.as_deref()),
            medical_history: MedicalHistory::from_raw(self.medical_history.as_deref()),
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

fn required_count(field: &'static str, value: &Option<String>) -> Result<u32, ValidationError> {
    let raw = present(value).unwrap_or_default();
    parse_count(raw).ok_or_else(|| ValidationError::Malformed {
        field,
        value: raw.to_string(),
    })
}

/// Whole numbers pass through; decimals are truncated toward zero. Negatives are rejected.
fn parse_count(raw: &str) -> Option<u32> {
    if let Ok(value) = raw.parse::<u32>() {
        return Some(value);
    }

    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value.trunc() as u32)
    } else {
        None
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form_request() -> RawPredictionRequest {
        serde_json::from_value(json!({
            "age": "30",
            "dependants": "2",
            "income": "10",
            "geneticalRisk": "1",
            "insurancePlan": "silver",
            "employmentStatus": "salaried",
            "gender": "male",
            "maritalStatus": "married",
            "bmiCategory": "normal",
            "smokingStatus": "no-smoking",
            "region": "northwest",
            "medicalHistory": "no-disease"
        }))
        .expect("form payload deserializes")
    }

    #[test]
    fn validates_a_complete_form_submission() {
        let input = form_request().validate().expect("valid request");
        assert_eq!(input.age, 30);
        assert_eq!(input.dependants, 2);
        assert_eq!(input.income_lakhs, 10);
        assert_eq!(input.genetical_risk, 1);
        assert_eq!(input.insurance_plan, InsurancePlan::Silver);
        assert_eq!(input.marital_status, MaritalStatus::Married);
    }

    #[test]
    fn accepts_numbers_and_income_alias() {
        let request: RawPredictionRequest = serde_json::from_value(json!({
            "age": 44,
            "dependants": 0,
            "incomeLakhs": 12.0,
            "geneticalRisk": null
        }))
        .expect("numeric payload deserializes");

        let input = request.validate().expect("valid request");
        assert_eq!(input.age, 44);
        assert_eq!(input.dependants, 0);
        assert_eq!(input.income_lakhs, 12);
        assert_eq!(input.genetical_risk, 0);
        assert_eq!(input, PredictionInput::new(44, 0, 12));
    }

    #[test]
    fn reports_every_missing_required_field() {
        let request = RawPredictionRequest {
            dependants: Some("  ".to_string()),
            ..RawPredictionRequest::default()
        };

        let err = request.validate().expect_err("nothing required is present");
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["age", "dependants", "income"])
        );
        assert_eq!(
            err.to_string(),
            "Missing required fields: age, dependants, income"
        );
    }

    #[test]
    fn missing_age_alone_is_rejected() {
        let mut request = form_request();
        request.age = None;
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingFields(vec!["age"]))
        );
    }

    #[test]
    fn rejects_negative_or_non_numeric_required_fields() {
        let mut request = form_request();
        request.age = Some("-3".to_string());
        assert!(matches!(
            request.validate(),
            Err(ValidationError::Malformed { field: "age", .. })
        ));

        let mut request = form_request();
        request.income = Some("ten".to_string());
        assert!(matches!(
            request.validate(),
            Err(ValidationError::Malformed { field: "income", .. })
        ));
    }

    #[test]
    fn unparseable_genetical_risk_defaults_to_zero() {
        let mut request = form_request();
        request.genetical_risk = Some("high".to_string());
        assert_eq!(request.validate().expect("valid").genetical_risk, 0);
    }

    #[test]
    fn zero_age_is_present_not_missing() {
        let mut request = form_request();
        request.age = Some("0".to_string());
        assert_eq!(request.validate().expect("valid").age, 0);
    }
}
