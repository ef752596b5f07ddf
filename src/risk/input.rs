//! Client payload for `/predict`.
//!
//! Every field is optional on the wire. Accessors apply the documented
//! defaults, so the rest of the pipeline never deals with absence.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{BodyEchoError, Result};

pub const DEFAULT_AGE: f64 = 30.0;
pub const DEFAULT_BMI: f64 = 25.0;
pub const DEFAULT_BLOOD_GLUCOSE: f64 = 100.0;
pub const DEFAULT_ACTIVE: i64 = 0;
pub const DEFAULT_CALORIES_KCAL: f64 = 2000.0;
pub const DEFAULT_SODIUM_MG: f64 = 2000.0;
pub const DEFAULT_CHOLESTEROL_MG: f64 = 150.0;
pub const DEFAULT_WATER_INTAKE_ML: f64 = 2000.0;
pub const DEFAULT_GENDER: &str = "Female";
pub const DEFAULT_SMOKING_HISTORY: &str = "never";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawInput {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bmi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub blood_glucose_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub active: Option<i64>,
    #[serde(default, rename = "Calories_kcal", deserialize_with = "lenient_f64")]
    pub calories_kcal: Option<f64>,
    #[serde(default, rename = "Sodium_mg", deserialize_with = "lenient_f64")]
    pub sodium_mg: Option<f64>,
    #[serde(default, rename = "Cholesterol_mg", deserialize_with = "lenient_f64")]
    pub cholesterol_mg: Option<f64>,
    #[serde(default, rename = "Water_Intake_ml", deserialize_with = "lenient_f64")]
    pub water_intake_ml: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub smoking_history: Option<String>,
    /// Target-like field some clients echo back; accepted, never used as a feature.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub diabetes: Option<f64>,
}

impl RawInput {
    /// Parse a request body. Any shape or type problem rejects the whole request.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| BodyEchoError::Request(e.to_string()))?;
        if !value.is_object() {
            return Err(BodyEchoError::Request(
                "request body must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| BodyEchoError::Request(e.to_string()))
    }

    pub fn age(&self) -> f64 {
        self.age.unwrap_or(DEFAULT_AGE)
    }

    pub fn bmi(&self) -> f64 {
        self.bmi.unwrap_or(DEFAULT_BMI)
    }

    pub fn blood_glucose_level(&self) -> f64 {
        self.blood_glucose_level.unwrap_or(DEFAULT_BLOOD_GLUCOSE)
    }

    pub fn active(&self) -> i64 {
        self.active.unwrap_or(DEFAULT_ACTIVE)
    }

    pub fn calories_kcal(&self) -> f64 {
        self.calories_kcal.unwrap_or(DEFAULT_CALORIES_KCAL)
    }

    pub fn sodium_mg(&self) -> f64 {
        self.sodium_mg.unwrap_or(DEFAULT_SODIUM_MG)
    }

    pub fn cholesterol_mg(&self) -> f64 {
        self.cholesterol_mg.unwrap_or(DEFAULT_CHOLESTEROL_MG)
    }

    pub fn water_intake_ml(&self) -> f64 {
        self.water_intake_ml.unwrap_or(DEFAULT_WATER_INTAKE_ML)
    }

    pub fn gender(&self) -> &str {
        self.gender.as_deref().unwrap_or(DEFAULT_GENDER)
    }

    pub fn smoking_history(&self) -> &str {
        self.smoking_history
            .as_deref()
            .unwrap_or(DEFAULT_SMOKING_HISTORY)
    }
}

fn number_from_value(value: &Value) -> std::result::Result<Option<f64>, String> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("number out of range: {n}"))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("could not convert string to float: '{s}'"))?,
        other => return Err(format!("expected a number, got {other}")),
    };
    if !parsed.is_finite() {
        return Err(format!("expected a finite number, got {parsed}"));
    }
    Ok(Some(parsed))
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_from_value(&value).map_err(serde::de::Error::custom)
}

/// Integer flag: floats truncate toward zero, strings must be integral.
fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid literal for int: '{s}'"))),
        other => Ok(number_from_value(other)
            .map_err(serde::de::Error::custom)?
            .map(|v| v.trunc() as i64)),
    }
}
