//! Tau identification tiers
//!
//! The tau selection uses the DeepTau working points directly and is
//! the same for all identification schemes.

use noisy_float::prelude::*;

use crate::lepton::LeptonLike;
use crate::tau::Tau;

const MIN_PT: f64 = 20.;
const MAX_ABS_ETA: f64 = 2.3;
const MAX_ABS_DZ: f64 = 0.2;

fn has_valid_decay_mode(tau: &Tau) -> bool {
    matches!(tau.decay_mode(), 0 | 1 | 10 | 11)
}

pub fn is_loose(tau: &Tau) -> bool {
    tau.pt() > MIN_PT
        && tau.eta().abs() < MAX_ABS_ETA
        && tau.base().dz().abs() < MAX_ABS_DZ
        && tau.passes_decay_mode_finding()
        && has_valid_decay_mode(tau)
        && tau.passes_vse_loose()
        && tau.passes_vsmu_loose()
}

pub fn is_fo(tau: &Tau) -> bool {
    is_loose(tau) && tau.passes_vsjet_loose()
}

pub fn is_tight(tau: &Tau) -> bool {
    is_fo(tau) && tau.passes_vsjet_tight()
}
