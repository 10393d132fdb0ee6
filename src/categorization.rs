//! Flattening of per-variable category indices
//!
//! Analysis regions are defined as the cartesian product of small
//! per-variable categories, e.g. (number of leptons) x (number of
//! b-tagged jets). Histogramming wants a single flat bin index; the
//! [IndexFlattener] maps between the two representations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error mapping between category indices and flat indices
#[derive(Debug, Clone, Error)]
pub enum CategoryError {
    #[error("expected {expected} category indices, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("category index {index} out of range for axis {axis} with {size} categories")]
    IndexOutOfRange {
        axis: usize,
        index: usize,
        size: usize,
    },
    #[error("flat index {index} out of range for {len} categories")]
    FlatIndexOutOfRange { index: usize, len: usize },
}

/// Bijection between per-axis category indices and a flat index
///
/// Row-major: the first axis varies slowest.
#[derive(
    Deserialize, Serialize, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct IndexFlattener {
    sizes: Vec<usize>,
}

impl IndexFlattener {
    pub fn new(sizes: Vec<usize>) -> Self {
        Self { sizes }
    }

    /// The number of axes
    pub fn n_axes(&self) -> usize {
        self.sizes.len()
    }

    /// The total number of flat categories
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The flat index of the given per-axis indices
    pub fn index(&self, indices: &[usize]) -> Result<usize, CategoryError> {
        if indices.len() != self.sizes.len() {
            return Err(CategoryError::DimensionMismatch {
                expected: self.sizes.len(),
                found: indices.len(),
            });
        }
        let mut flat = 0;
        for (axis, (&index, &size)) in
            indices.iter().zip(&self.sizes).enumerate()
        {
            if index >= size {
                return Err(CategoryError::IndexOutOfRange {
                    axis,
                    index,
                    size,
                });
            }
            flat = flat * size + index;
        }
        Ok(flat)
    }

    /// The per-axis indices of the given flat index
    pub fn indices(&self, flat: usize) -> Result<Vec<usize>, CategoryError> {
        if flat >= self.len() {
            return Err(CategoryError::FlatIndexOutOfRange {
                index: flat,
                len: self.len(),
            });
        }
        let mut rem = flat;
        let mut indices = vec![0; self.sizes.len()];
        for (idx, &size) in indices.iter_mut().zip(&self.sizes).rev() {
            *idx = rem % size;
            rem /= size;
        }
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let flattener = IndexFlattener::new(vec![3, 2, 4]);
        assert_eq!(flattener.len(), 24);
        for flat in 0..flattener.len() {
            let indices = flattener.indices(flat).unwrap();
            assert_eq!(flattener.index(&indices).unwrap(), flat);
        }
        // row-major: the last axis varies fastest
        assert_eq!(flattener.index(&[0, 0, 1]).unwrap(), 1);
        assert_eq!(flattener.index(&[1, 0, 0]).unwrap(), 8);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let flattener = IndexFlattener::new(vec![3, 2]);
        assert!(matches!(
            flattener.index(&[0, 2]),
            Err(CategoryError::IndexOutOfRange {
                axis: 1,
                index: 2,
                size: 2
            })
        ));
        assert!(matches!(
            flattener.index(&[0]),
            Err(CategoryError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            flattener.indices(6),
            Err(CategoryError::FlatIndexOutOfRange { index: 6, len: 6 })
        ));
    }
}
