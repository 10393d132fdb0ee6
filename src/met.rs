use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::four_momentum::{FourMomentum, KinematicsError};

/// Missing-energy variation
#[derive(
    Deserialize,
    Serialize,
    Display,
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
pub enum MetVariation {
    JecUp,
    JecDown,
    UnclusteredUp,
    UnclusteredDown,
}

impl MetVariation {
    pub const ALL: [Self; 4] = [
        Self::JecUp,
        Self::JecDown,
        Self::UnclusteredUp,
        Self::UnclusteredDown,
    ];
}

/// Varied missing-energy magnitude and direction
#[derive(
    Deserialize, Serialize, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct MetShift {
    pub pt: N64,
    pub phi: N64,
}

/// Missing transverse energy
///
/// A massless four-momentum with pseudorapidity fixed at zero.
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct Met {
    p4: FourMomentum,
    jec_up: MetShift,
    jec_down: MetShift,
    unclustered_up: MetShift,
    unclustered_down: MetShift,
}

impl Met {
    pub(crate) fn new(
        pt: N64,
        phi: N64,
        jec_up: MetShift,
        jec_down: MetShift,
        unclustered_up: MetShift,
        unclustered_down: MetShift,
    ) -> Result<Self, KinematicsError> {
        let p4 =
            FourMomentum::from_pt_eta_phi_energy(pt, n64(0.), phi, pt)?;
        Ok(Self {
            p4,
            jec_up,
            jec_down,
            unclustered_up,
            unclustered_down,
        })
    }

    pub fn momentum(&self) -> &FourMomentum {
        &self.p4
    }

    pub fn pt(&self) -> N64 {
        self.p4.pt()
    }

    pub fn phi(&self) -> N64 {
        self.p4.phi()
    }

    pub fn px(&self) -> N64 {
        self.p4.px()
    }

    pub fn py(&self) -> N64 {
        self.p4.py()
    }

    /// Sibling under the given variation, rebuilt from the varied
    /// momentum components
    pub fn variation(&self, var: MetVariation) -> Met {
        let shift = match var {
            MetVariation::JecUp => self.jec_up,
            MetVariation::JecDown => self.jec_down,
            MetVariation::UnclusteredUp => self.unclustered_up,
            MetVariation::UnclusteredDown => self.unclustered_down,
        };
        let px = shift.pt * shift.phi.cos();
        let py = shift.pt * shift.phi.sin();
        let pt = (px * px + py * py).sqrt();
        let mut res = self.clone();
        res.p4 = FourMomentum::from([pt, px, py, n64(0.)]);
        res
    }

    pub fn jec_up(&self) -> Met {
        self.variation(MetVariation::JecUp)
    }

    pub fn jec_down(&self) -> Met {
        self.variation(MetVariation::JecDown)
    }

    pub fn unclustered_up(&self) -> Met {
        self.variation(MetVariation::UnclusteredUp)
    }

    pub fn unclustered_down(&self) -> Met {
        self.variation(MetVariation::UnclusteredDown)
    }
}
