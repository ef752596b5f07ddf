//! Fixed feature schema shared by every model in the corpus.
//!
//! Column names match the training data byte-for-byte; model and scaler
//! artifacts refer to columns by these names.

use std::fmt;

macro_rules! columns {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// One column of the training schema.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Column {
            $($variant),+
        }

        impl Column {
            /// Every column, in schema order.
            pub const ALL: &'static [Column] = &[$(Column::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Column::$variant => $name),+
                }
            }

            pub fn from_name(name: &str) -> Option<Column> {
                match name {
                    $($name => Some(Column::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

columns! {
    BloodGlucoseLevel => "blood_glucose_level",
    Age => "age",
    Bmi => "bmi",
    CaloriesKcal => "Calorieskcal",
    WaterIntakeMl => "Water_Intakeml",
    SodiumMg => "Sodiummg",
    CholesterolMg => "Cholesterolmg",
    HighSugarRisk => "High_Sugar_Risk",
    ObesityRisk => "Obesity_Risk",
    GenderFemale => "gender_Female",
    GenderMale => "gender_Male",
    GenderOther => "gender_Other",
    SmokingNever => "smoking_history_never",
    SmokingFormer => "smoking_history_former",
    SmokingCurrent => "smoking_history_current",
    SmokingNotCurrent => "smoking_history_notcurrent",
    SmokingEver => "smoking_history_ever",
    MealTypeLunch => "Meal_Type_Lunch",
    MealTypeDinner => "Meal_Type_Dinner",
    MealTypeSnack => "Meal_Type_Snack",
    HighCholesterolRisk => "High_Cholesterol_Risk",
    CancerRiskScore => "Cancer_Risk_Score",
    CategoryDairy => "Category_Dairy",
    CategoryVegetables => "Category_Vegetables",
    CategoryGrains => "Category_Grains",
    Active => "active",
    CategorySnacks => "Category_Snacks",
    LowActivityScore => "Low_Activity_Score",
    CategoryFruits => "Category_Fruits",
    CategoryMeat => "Category_Meat",
    Diabetes => "diabetes",
}

impl Column {
    pub const COUNT: usize = Column::ALL.len();

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully reconciled request: one value per schema column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: [f64; Column::COUNT],
}

impl FeatureRow {
    /// All columns at the neutral default.
    pub fn zeroed() -> Self {
        Self {
            values: [0.0; Column::COUNT],
        }
    }

    pub fn get(&self, column: Column) -> f64 {
        self.values[column.index()]
    }

    pub fn set(&mut self, column: Column, value: f64) {
        self.values[column.index()] = value;
    }

    pub fn set_flag(&mut self, column: Column, on: bool) {
        self.set(column, if on { 1.0 } else { 0.0 });
    }

    /// Columns with their values, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Column, f64)> + '_ {
        Column::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

impl Default for FeatureRow {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_lookup() {
        for &column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("HbA1c_level"), None);
    }

    #[test]
    fn test_schema_order_matches_indices() {
        for (idx, &column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), idx);
        }
    }

    #[test]
    fn test_zeroed_row_covers_every_column() {
        let row = FeatureRow::zeroed();
        assert_eq!(row.iter().count(), Column::COUNT);
        assert!(row.iter().all(|(_, v)| v == 0.0));
    }
}
