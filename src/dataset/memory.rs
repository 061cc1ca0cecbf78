use crate::dataset::{Dataset, DatasetError};
use ndarray::{s, Array1, Array2};
use std::ops::Range;

/// Feature matrix and targets held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl InMemoryDataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self, DatasetError> {
        if x.nrows() != y.len() {
            return Err(DatasetError::LengthMismatch {
                features: x.nrows(),
                targets: y.len(),
            });
        }
        if x.nrows() == 0 {
            return Err(DatasetError::Empty);
        }
        Ok(Self { x, y })
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

impl Dataset for InMemoryDataset {
    type Error = std::convert::Infallible;

    fn len(&self) -> Option<usize> {
        Some(self.x.nrows())
    }

    fn get_batch(&self, range: Range<usize>) -> Result<(Array2<f64>, Array1<f64>), Self::Error> {
        let batch_x = self.x.slice(s![range.clone(), ..]).to_owned();
        let batch_y = self.y.slice(s![range]).to_owned();
        Ok((batch_x, batch_y))
    }
}
