//! Column-labelled numeric matrix.

use crate::features::{FeatureColumn, ReservationFeatures};
use crate::preprocessing::error::PreprocessingError;
use ndarray::{Array2, ArrayView1, Axis};

/// Ordered feature columns plus one row of values per reservation.
///
/// Missing values are `NaN` until imputed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<FeatureColumn>,
    values: Array2<f64>,
}

impl FeatureTable {
    pub fn new(columns: Vec<FeatureColumn>, values: Array2<f64>) -> Result<Self, PreprocessingError> {
        if columns.len() != values.ncols() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: columns.len(),
                got_features: values.ncols(),
            });
        }
        Ok(Self { columns, values })
    }

    /// Select `columns` from each feature vector, in order.
    pub fn from_features(rows: &[ReservationFeatures], columns: &[FeatureColumn]) -> Self {
        let values = Array2::from_shape_fn((rows.len(), columns.len()), |(i, j)| {
            rows[i].get(columns[j]).unwrap_or(f64::NAN)
        });
        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    /// Same columns, new values of the same width.
    pub(crate) fn with_values(&self, values: Array2<f64>) -> Self {
        debug_assert_eq!(values.ncols(), self.columns.len());
        Self {
            columns: self.columns.clone(),
            values,
        }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, column: FeatureColumn) -> Option<ArrayView1<'_, f64>> {
        let index = self.columns.iter().position(|&c| c == column)?;
        Some(self.values.index_axis(Axis(1), index))
    }

    /// Columns that contain at least one `NaN`.
    pub fn columns_with_missing(&self) -> Vec<FeatureColumn> {
        self.columns
            .iter()
            .zip(self.values.axis_iter(Axis(1)))
            .filter(|(_, values)| values.iter().any(|v| v.is_nan()))
            .map(|(&column, _)| column)
            .collect()
    }

    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{DateFeatures, HistoricalFeatures};
    use ndarray::array;

    #[test]
    fn test_new_rejects_width_mismatch() {
        let result = FeatureTable::new(vec![FeatureColumn::PastRides], array![[1.0, 2.0]]);
        assert!(matches!(
            result,
            Err(PreprocessingError::FeatureMismatch {
                expected_features: 1,
                got_features: 2
            })
        ));
    }

    #[test]
    fn test_from_features_selects_in_order() {
        let rows = vec![
            ReservationFeatures {
                historical: HistoricalFeatures {
                    past_rides: 3.0,
                    ..Default::default()
                },
                dates: DateFeatures {
                    trip_duration: Some(2.0),
                    ..Default::default()
                },
                ..Default::default()
            },
            ReservationFeatures::default(),
        ];
        let table = FeatureTable::from_features(
            &rows,
            &[FeatureColumn::TripDuration, FeatureColumn::PastRides],
        );

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.values()[[0, 0]], 2.0);
        assert_eq!(table.values()[[0, 1]], 3.0);
        assert!(table.values()[[1, 0]].is_nan());
        assert_eq!(table.columns_with_missing(), vec![FeatureColumn::TripDuration]);
        assert_eq!(
            table.column(FeatureColumn::PastRides).unwrap().to_vec(),
            vec![3.0, 0.0]
        );
        assert!(table.column(FeatureColumn::UsedPromo).is_none());
    }
}
