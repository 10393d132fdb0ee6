use noisy_float::prelude::*;
use particle_id::ParticleID;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generator-level match of a reconstructed lepton
///
/// Only present for simulated samples.
#[derive(
    Deserialize, Serialize, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct GenMatch {
    /// PDG code of the matched generator particle
    pub id: ParticleID,
    /// PDG code of its mother, if stored
    pub mother_id: Option<ParticleID>,
    /// Whether the matched particle is prompt
    pub is_prompt: bool,
}

/// Error accessing generator weights
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("scale weight index {index} out of range for {len} stored weights")]
    ScaleWeightIndex { index: usize, len: usize },
    #[error("pdf weight index {index} out of range for {len} stored weights")]
    PdfWeightIndex { index: usize, len: usize },
}

/// Generator-level event information
///
/// Present exactly for events built from simulated records.
#[derive(
    Deserialize, Serialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct GeneratorInfo {
    weight: N64,
    n_true_interactions: N64,
    scale_weights: Vec<N64>,
    pdf_weights: Vec<N64>,
}

impl GeneratorInfo {
    pub fn new(
        weight: N64,
        n_true_interactions: N64,
        scale_weights: Vec<N64>,
        pdf_weights: Vec<N64>,
    ) -> Self {
        Self {
            weight,
            n_true_interactions,
            scale_weights,
            pdf_weights,
        }
    }

    /// The nominal generator weight
    pub fn weight(&self) -> N64 {
        self.weight
    }

    pub fn n_true_interactions(&self) -> N64 {
        self.n_true_interactions
    }

    pub fn n_scale_weights(&self) -> usize {
        self.scale_weights.len()
    }

    pub fn n_pdf_weights(&self) -> usize {
        self.pdf_weights.len()
    }

    /// Relative scale-variation weight `index`
    ///
    /// The error is catchable so callers can fall back to a unit
    /// weight for samples without stored variations.
    pub fn scale_weight(&self, index: usize) -> Result<N64, GeneratorError> {
        self.scale_weights.get(index).copied().ok_or(
            GeneratorError::ScaleWeightIndex {
                index,
                len: self.scale_weights.len(),
            },
        )
    }

    /// Relative pdf-variation weight `index`
    pub fn pdf_weight(&self, index: usize) -> Result<N64, GeneratorError> {
        self.pdf_weights.get(index).copied().ok_or(
            GeneratorError::PdfWeightIndex {
                index,
                len: self.pdf_weights.len(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_fallback() {
        let info =
            GeneratorInfo::new(n64(0.9), n64(23.), vec![n64(1.1)], vec![]);
        assert_eq!(info.scale_weight(0).unwrap(), n64(1.1));
        // the documented fall-back pattern for missing variations
        let w = info.scale_weight(7).unwrap_or(n64(1.));
        assert_eq!(w, n64(1.));
        assert!(matches!(
            info.pdf_weight(0),
            Err(GeneratorError::PdfWeightIndex { len: 0, .. })
        ));
    }
}
