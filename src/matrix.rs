use ndarray::Array2;

use crate::error::BciError;

/// Row-major `channels x samples` matrix of double-precision samples.
///
/// Owned exclusively by the acquisition result: filled once by the device
/// session, mutated in place by the signal conditioner, never resized.
#[derive(Clone, Debug)]
pub struct SampleMatrix {
    data: Array2<f64>,
}

impl SampleMatrix {
    pub fn zeros(num_rows: usize, sample_count: usize) -> Self {
        SampleMatrix {
            data: Array2::zeros((num_rows, sample_count)),
        }
    }

    /// Build from per-channel sample vectors; all rows must share one length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, BciError> {
        let sample_count = rows.first().map_or(0, Vec::len);
        let num_rows = rows.len();
        let mut flat = Vec::with_capacity(num_rows * sample_count);
        for row in &rows {
            if row.len() != sample_count {
                return Err(BciError::BufferMismatch {
                    expected: sample_count,
                    actual: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((num_rows, sample_count), flat)
            .map_err(|e| BciError::InvalidFilterParameters(e.to_string()))?;
        Ok(SampleMatrix { data })
    }

    pub fn num_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn sample_count(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        self.data
            .row(index)
            .to_slice()
            .unwrap_or_else(|| unreachable!("standard-layout rows are contiguous"))
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [f64] {
        self.data
            .row_mut(index)
            .into_slice()
            .unwrap_or_else(|| unreachable!("standard-layout rows are contiguous"))
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_preserves_layout() {
        let m = SampleMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.num_rows(), 2);
        assert_eq!(m.sample_count(), 2);
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = SampleMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, BciError::BufferMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn rows_are_mutable_in_place() {
        let mut m = SampleMatrix::zeros(1, 3);
        m.row_mut(0).copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
    }
}
