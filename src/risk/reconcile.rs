use super::derive::DerivedFeatures;
use super::input::RawInput;
use super::schema::{Column, FeatureRow};

fn gender_column(gender: &str) -> Option<Column> {
    match gender {
        "Male" => Some(Column::GenderMale),
        "Female" => Some(Column::GenderFemale),
        "Other" => Some(Column::GenderOther),
        _ => None,
    }
}

fn smoking_column(history: &str) -> Option<Column> {
    match history {
        "never" => Some(Column::SmokingNever),
        "former" => Some(Column::SmokingFormer),
        "current" => Some(Column::SmokingCurrent),
        "not current" => Some(Column::SmokingNotCurrent),
        "ever" => Some(Column::SmokingEver),
        _ => None,
    }
}

/// Expand a request into the full training schema.
///
/// Columns without a request-level signal (meal type, food category) stay at 0.
/// Unrecognized categorical values leave their indicator group all-zero.
pub fn reconcile(raw: &RawInput, derived: &DerivedFeatures) -> FeatureRow {
    let mut row = FeatureRow::zeroed();

    row.set(Column::Age, raw.age());
    row.set(Column::Bmi, raw.bmi());
    row.set(Column::BloodGlucoseLevel, raw.blood_glucose_level());
    row.set(Column::Active, raw.active() as f64);
    row.set(Column::CaloriesKcal, raw.calories_kcal());
    row.set(Column::SodiumMg, raw.sodium_mg());
    row.set(Column::CholesterolMg, raw.cholesterol_mg());
    row.set(Column::WaterIntakeMl, raw.water_intake_ml());
    if let Some(diabetes) = raw.diabetes {
        row.set(Column::Diabetes, diabetes);
    }

    row.set_flag(Column::HighSugarRisk, derived.high_sugar);
    row.set_flag(Column::ObesityRisk, derived.obesity);
    row.set_flag(Column::CancerRiskScore, derived.cancer_risk);
    row.set_flag(Column::LowActivityScore, derived.low_activity);
    row.set_flag(Column::HighCholesterolRisk, derived.high_cholesterol);

    if let Some(column) = gender_column(raw.gender()) {
        row.set(column, 1.0);
    }
    if let Some(column) = smoking_column(raw.smoking_history()) {
        row.set(column, 1.0);
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::category::{RiskCategory, DEFAULT_SCALED_COLUMNS};
    use crate::risk::derive::derive;

    const GENDER_COLUMNS: &[Column] = &[Column::GenderFemale, Column::GenderMale, Column::GenderOther];
    const SMOKING_COLUMNS: &[Column] = &[
        Column::SmokingNever,
        Column::SmokingFormer,
        Column::SmokingCurrent,
        Column::SmokingNotCurrent,
        Column::SmokingEver,
    ];

    fn reconciled(json: &str) -> FeatureRow {
        let raw = RawInput::from_slice(json.as_bytes()).unwrap();
        reconcile(&raw, &derive(&raw))
    }

    fn hot(row: &FeatureRow, group: &[Column]) -> Vec<Column> {
        group.iter().copied().filter(|c| row.get(*c) == 1.0).collect()
    }

    #[test]
    fn test_defaults_fill_base_columns() {
        let row = reconciled("{}");
        assert_eq!(row.get(Column::Age), 30.0);
        assert_eq!(row.get(Column::Bmi), 25.0);
        assert_eq!(row.get(Column::BloodGlucoseLevel), 100.0);
        assert_eq!(row.get(Column::Active), 0.0);
        assert_eq!(row.get(Column::CaloriesKcal), 2000.0);
        assert_eq!(row.get(Column::SodiumMg), 2000.0);
        assert_eq!(row.get(Column::CholesterolMg), 150.0);
        assert_eq!(row.get(Column::WaterIntakeMl), 2000.0);
        assert_eq!(row.get(Column::LowActivityScore), 1.0);
        assert_eq!(hot(&row, GENDER_COLUMNS), vec![Column::GenderFemale]);
        assert_eq!(hot(&row, SMOKING_COLUMNS), vec![Column::SmokingNever]);
    }

    #[test]
    fn test_one_hot_sets_single_indicator() {
        let cases = [
            ("Male", "current", Column::GenderMale, Column::SmokingCurrent),
            ("Other", "not current", Column::GenderOther, Column::SmokingNotCurrent),
            ("Female", "ever", Column::GenderFemale, Column::SmokingEver),
            ("Female", "former", Column::GenderFemale, Column::SmokingFormer),
        ];
        for (gender, smoking, gender_col, smoking_col) in cases {
            let row = reconciled(&format!(
                r#"{{"gender": "{gender}", "smoking_history": "{smoking}"}}"#
            ));
            assert_eq!(hot(&row, GENDER_COLUMNS), vec![gender_col]);
            assert_eq!(hot(&row, SMOKING_COLUMNS), vec![smoking_col]);
        }
    }

    #[test]
    fn test_unknown_categoricals_leave_indicators_zero() {
        let row = reconciled(r#"{"gender": "male", "smoking_history": "No Info"}"#);
        assert!(hot(&row, GENDER_COLUMNS).is_empty());
        assert!(hot(&row, SMOKING_COLUMNS).is_empty());
    }

    #[test]
    fn test_every_referenced_column_is_present() {
        for json in ["{}", r#"{"age": 70, "gender": "Other"}"#, r#"{"diabetes": 1}"#] {
            let row = reconciled(json);
            let present: Vec<Column> = row.iter().map(|(c, _)| c).collect();
            for category in RiskCategory::ALL {
                for column in category.forbidden_columns() {
                    assert!(present.contains(column), "{column} missing for {json}");
                }
            }
            for column in DEFAULT_SCALED_COLUMNS {
                assert!(present.contains(column), "{column} missing for {json}");
            }
        }
    }

    #[test]
    fn test_explicit_diabetes_is_carried() {
        assert_eq!(reconciled(r#"{"diabetes": 1}"#).get(Column::Diabetes), 1.0);
        assert_eq!(reconciled("{}").get(Column::Diabetes), 0.0);
    }

    #[test]
    fn test_unsignalled_columns_stay_zero() {
        let row = reconciled(r#"{"age": 45, "bmi": 32}"#);
        for column in [
            Column::MealTypeLunch,
            Column::MealTypeDinner,
            Column::MealTypeSnack,
            Column::CategoryDairy,
            Column::CategoryMeat,
            Column::CategoryFruits,
        ] {
            assert_eq!(row.get(column), 0.0, "{column}");
        }
    }
}
