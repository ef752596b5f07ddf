use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::schema::Column;

/// Columns the scalers were fit on when an artifact does not list its own.
pub const DEFAULT_SCALED_COLUMNS: &[Column] = &[
    Column::Age,
    Column::Bmi,
    Column::BloodGlucoseLevel,
    Column::CaloriesKcal,
    Column::SodiumMg,
    Column::CholesterolMg,
    Column::WaterIntakeMl,
    Column::Active,
    Column::Diabetes,
];

/// Target column dropped for every category.
pub const GLOBAL_TARGET: Column = Column::Diabetes;

/// One independently trained binary classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    DiabetesRisk,
    HighSugarRisk,
    ObesityRisk,
    CancerRisk,
    LowActivityRisk,
    HighCholesterolRisk,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 6] = [
        RiskCategory::DiabetesRisk,
        RiskCategory::HighSugarRisk,
        RiskCategory::ObesityRisk,
        RiskCategory::CancerRisk,
        RiskCategory::LowActivityRisk,
        RiskCategory::HighCholesterolRisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiabetesRisk => "diabetes_risk",
            Self::HighSugarRisk => "high_sugar_risk",
            Self::ObesityRisk => "obesity_risk",
            Self::CancerRisk => "cancer_risk",
            Self::LowActivityRisk => "low_activity_risk",
            Self::HighCholesterolRisk => "high_cholesterol_risk",
        }
    }

    /// Columns this category must never see: its raw input counterpart,
    /// its own derived target, and the global target.
    pub fn forbidden_columns(&self) -> &'static [Column] {
        match self {
            Self::DiabetesRisk => &[Column::Diabetes],
            Self::HighSugarRisk => &[
                Column::BloodGlucoseLevel,
                Column::HighSugarRisk,
                Column::Diabetes,
            ],
            Self::ObesityRisk => &[Column::Bmi, Column::ObesityRisk, Column::Diabetes],
            Self::CancerRisk => &[Column::CancerRiskScore, Column::Diabetes],
            Self::LowActivityRisk => &[Column::Active, Column::LowActivityScore, Column::Diabetes],
            Self::HighCholesterolRisk => &[
                Column::CholesterolMg,
                Column::HighCholesterolRisk,
                Column::Diabetes,
            ],
        }
    }

    pub fn is_forbidden(&self, column: Column) -> bool {
        column == GLOBAL_TARGET || self.forbidden_columns().contains(&column)
    }

    pub fn model_file_stem(&self) -> String {
        format!("{}_model", self.as_str())
    }

    pub fn scaler_file_stem(&self) -> String {
        format!("scaler_for_{}_model", self.as_str())
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown risk category: {s}"))
    }
}
