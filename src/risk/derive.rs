//! Indicator features engineered from raw inputs.

use super::input::RawInput;

pub const HIGH_SUGAR_GLUCOSE: f64 = 140.0;
pub const OBESITY_BMI: f64 = 30.0;
/// Median cholesterol of the training population (200 mg/dL) plus 15%.
/// Written out because `200.0 * 1.15` rounds to just below 230.
pub const HIGH_CHOLESTEROL_MG: f64 = 230.0;

const SMOKER_HISTORIES: &[&str] = &["current", "former"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedFeatures {
    pub high_sugar: bool,
    pub obesity: bool,
    pub cancer_risk: bool,
    pub low_activity: bool,
    pub high_cholesterol: bool,
}

pub fn derive(raw: &RawInput) -> DerivedFeatures {
    let obese = raw.bmi() >= OBESITY_BMI;
    DerivedFeatures {
        high_sugar: raw.blood_glucose_level() >= HIGH_SUGAR_GLUCOSE,
        obesity: obese,
        cancer_risk: obese && SMOKER_HISTORIES.contains(&raw.smoking_history()),
        low_activity: raw.active() == 0,
        high_cholesterol: raw.cholesterol_mg() > HIGH_CHOLESTEROL_MG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawInput {
        RawInput::from_slice(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_high_sugar_boundary() {
        assert!(!derive(&raw(r#"{"blood_glucose_level": 139.99}"#)).high_sugar);
        assert!(derive(&raw(r#"{"blood_glucose_level": 140}"#)).high_sugar);
        assert!(derive(&raw(r#"{"blood_glucose_level": 210}"#)).high_sugar);
    }

    #[test]
    fn test_obesity_boundary() {
        assert!(!derive(&raw(r#"{"bmi": 29.99}"#)).obesity);
        assert!(derive(&raw(r#"{"bmi": 30.0}"#)).obesity);
    }

    #[test]
    fn test_cancer_risk_requires_smoker_and_obesity() {
        for history in ["current", "former"] {
            let obese = format!(r#"{{"bmi": 30, "smoking_history": "{history}"}}"#);
            let lean = format!(r#"{{"bmi": 29.5, "smoking_history": "{history}"}}"#);
            assert!(derive(&raw(&obese)).cancer_risk, "{history}");
            assert!(!derive(&raw(&lean)).cancer_risk, "{history}");
        }
        for history in ["never", "not current", "ever", "No Info", "Current"] {
            let json = format!(r#"{{"bmi": 45, "smoking_history": "{history}"}}"#);
            assert!(!derive(&raw(&json)).cancer_risk, "{history}");
        }
    }

    #[test]
    fn test_low_activity_only_when_inactive() {
        assert!(derive(&raw("{}")).low_activity);
        assert!(!derive(&raw(r#"{"active": 1}"#)).low_activity);
        assert!(!derive(&raw(r#"{"active": 3}"#)).low_activity);
    }

    #[test]
    fn test_high_cholesterol_boundary_is_exclusive() {
        assert!(!derive(&raw(r#"{"Cholesterol_mg": 230.0}"#)).high_cholesterol);
        assert!(derive(&raw(r#"{"Cholesterol_mg": 230.01}"#)).high_cholesterol);
    }

    #[test]
    fn test_obese_smoker_with_high_glucose_sets_all_flags() {
        let flags = derive(&raw(
            r#"{"age": 45, "bmi": 32, "blood_glucose_level": 150, "active": 0,
                "gender": "Male", "smoking_history": "current"}"#,
        ));
        assert!(flags.high_sugar);
        assert!(flags.obesity);
        assert!(flags.cancer_risk);
        assert!(flags.low_activity);
    }

    #[test]
    fn test_lean_active_non_smoker_clears_all_flags() {
        let flags = derive(&raw(
            r#"{"bmi": 22, "blood_glucose_level": 90, "active": 1, "smoking_history": "never"}"#,
        ));
        assert!(!flags.high_sugar);
        assert!(!flags.obesity);
        assert!(!flags.cancer_risk);
        assert!(!flags.low_activity);
    }
}
