use super::category::RiskCategory;
use super::schema::{Column, FeatureRow};
use crate::error::{ProjectionError, ScaleError};
use crate::ml::Scaler;

/// A model-ready row: ordered columns and their (scaled) values.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRow {
    columns: Vec<Column>,
    values: Vec<f64>,
}

impl ModelRow {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: Column) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|idx| self.values[idx])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Build the row one category's model sees.
///
/// Forbidden columns are dropped, the scaler is applied to the fit columns
/// that survive, and the result is reindexed to `layout` (the model's trained
/// feature order) when the artifact recorded one. Without a layout the row
/// keeps schema order.
pub fn project(
    row: &FeatureRow,
    category: RiskCategory,
    scaler: &dyn Scaler,
    layout: Option<&[String]>,
) -> Result<ModelRow, ProjectionError> {
    let mut working = row.clone();

    let mut scaled = Vec::new();
    for name in scaler.feature_names() {
        let column = Column::from_name(name)
            .ok_or_else(|| ProjectionError::UnknownScalerColumn(name.clone()))?;
        if !category.is_forbidden(column) {
            scaled.push(column);
        }
    }

    if !scaled.is_empty() {
        let names: Vec<&str> = scaled.iter().map(|c| c.name()).collect();
        let values: Vec<f64> = scaled.iter().map(|c| working.get(*c)).collect();
        let out = scaler.transform(&names, &values)?;
        if out.len() != scaled.len() {
            return Err(ScaleError::OutputWidth {
                got: out.len(),
                expected: scaled.len(),
            }
            .into());
        }
        for (column, value) in scaled.iter().zip(out) {
            working.set(*column, value);
        }
    }

    let columns: Vec<Column> = match layout {
        Some(names) => names
            .iter()
            .map(|name| {
                let column = Column::from_name(name)
                    .ok_or_else(|| ProjectionError::UnknownModelColumn(name.clone()))?;
                if category.is_forbidden(column) {
                    return Err(ProjectionError::ForbiddenModelColumn {
                        column: name.clone(),
                        category: category.to_string(),
                    });
                }
                Ok(column)
            })
            .collect::<Result<_, _>>()?,
        None => Column::ALL
            .iter()
            .copied()
            .filter(|c| !category.is_forbidden(*c))
            .collect(),
    };

    let values = columns.iter().map(|c| working.get(*c)).collect();
    Ok(ModelRow { columns, values })
}
