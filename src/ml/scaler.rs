use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Scaler;
use crate::error::ScaleError;
use crate::risk::category::DEFAULT_SCALED_COLUMNS;

/// Z-score scaler: `(x - mean) / scale`, fit per named column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Fit columns. Absent in older artifacts, which were all fit on the
    /// default scaled column set in its canonical order.
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl StandardScaler {
    pub fn new(feature_names: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        let mut scaler = Self {
            feature_names,
            mean,
            scale,
            index: HashMap::new(),
        };
        scaler.finish()?;
        Ok(scaler)
    }

    /// Validate and build the name index. Called after deserializing.
    pub fn finish(&mut self) -> Result<(), String> {
        if self.feature_names.is_empty() {
            self.feature_names = DEFAULT_SCALED_COLUMNS
                .iter()
                .map(|c| c.name().to_string())
                .collect();
        }
        let n = self.feature_names.len();
        if self.mean.len() != n || self.scale.len() != n {
            return Err(format!(
                "mean/scale lengths ({}, {}) do not match {} feature names",
                self.mean.len(),
                self.scale.len(),
                n
            ));
        }
        if self
            .mean
            .iter()
            .chain(&self.scale)
            .any(|v| !v.is_finite())
        {
            return Err("mean and scale must be finite".to_string());
        }

        self.index.clear();
        for (idx, name) in self.feature_names.iter().enumerate() {
            if self.index.insert(name.clone(), idx).is_some() {
                return Err(format!("duplicate feature name `{name}`"));
            }
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn transform(&self, columns: &[&str], values: &[f64]) -> Result<Vec<f64>, ScaleError> {
        if columns.len() != values.len() {
            return Err(ScaleError::LengthMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        columns
            .iter()
            .zip(values)
            .map(|(name, x)| {
                let idx = *self
                    .index
                    .get(*name)
                    .ok_or_else(|| ScaleError::UnfitColumn(name.to_string()))?;
                // A constant training column has zero variance; leave it centred only.
                let scale = if self.scale[idx] == 0.0 {
                    1.0
                } else {
                    self.scale[idx]
                };
                Ok((x - self.mean[idx]) / scale)
            })
            .collect()
    }
}
