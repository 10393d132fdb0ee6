use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

use crate::lepton::{LeptonBase, LeptonLike};
use crate::selector;

/// A hadronically decaying tau candidate
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct Tau {
    pub(crate) base: LeptonBase,
    decay_mode: i32,
    passes_decay_mode_finding: bool,
    passes_vsjet_loose: bool,
    passes_vsjet_tight: bool,
    passes_vse_loose: bool,
    passes_vsmu_loose: bool,
}

impl Tau {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        base: LeptonBase,
        decay_mode: i32,
        passes_decay_mode_finding: bool,
        passes_vsjet_loose: bool,
        passes_vsjet_tight: bool,
        passes_vse_loose: bool,
        passes_vsmu_loose: bool,
    ) -> Self {
        Self {
            base,
            decay_mode,
            passes_decay_mode_finding,
            passes_vsjet_loose,
            passes_vsjet_tight,
            passes_vse_loose,
            passes_vsmu_loose,
        }
    }

    pub fn decay_mode(&self) -> i32 {
        self.decay_mode
    }

    pub fn passes_decay_mode_finding(&self) -> bool {
        self.passes_decay_mode_finding
    }

    pub fn passes_vsjet_loose(&self) -> bool {
        self.passes_vsjet_loose
    }

    pub fn passes_vsjet_tight(&self) -> bool {
        self.passes_vsjet_tight
    }

    pub fn passes_vse_loose(&self) -> bool {
        self.passes_vse_loose
    }

    pub fn passes_vsmu_loose(&self) -> bool {
        self.passes_vsmu_loose
    }
}

impl LeptonLike for Tau {
    fn base(&self) -> &LeptonBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LeptonBase {
        &mut self.base
    }

    fn is_loose(&self) -> bool {
        selector::tau::is_loose(self)
    }

    fn is_fo(&self) -> bool {
        selector::tau::is_fo(self)
    }

    fn is_tight(&self) -> bool {
        selector::tau::is_tight(self)
    }

    // taus are never cone-corrected
    fn cone_correction_factor(&self) -> Option<N64> {
        None
    }
}
