use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

use crate::lepton::{LeptonBase, LeptonLike, LightLeptonVars};
use crate::selector;

/// A reconstructed muon
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct Muon {
    pub(crate) base: LeptonBase,
    light: LightLeptonVars,
    segment_compatibility: N64,
    inner_track_pt: N64,
    is_pog_loose: bool,
    is_pog_medium: bool,
}

impl Muon {
    pub(crate) fn new(
        base: LeptonBase,
        light: LightLeptonVars,
        segment_compatibility: N64,
        inner_track_pt: N64,
        is_pog_loose: bool,
        is_pog_medium: bool,
    ) -> Self {
        Self {
            base,
            light,
            segment_compatibility,
            inner_track_pt,
            is_pog_loose,
            is_pog_medium,
        }
    }

    pub fn light_vars(&self) -> &LightLeptonVars {
        &self.light
    }

    pub fn segment_compatibility(&self) -> N64 {
        self.segment_compatibility
    }

    pub fn inner_track_pt(&self) -> N64 {
        self.inner_track_pt
    }

    pub fn is_pog_loose(&self) -> bool {
        self.is_pog_loose
    }

    pub fn is_pog_medium(&self) -> bool {
        self.is_pog_medium
    }
}

impl LeptonLike for Muon {
    fn base(&self) -> &LeptonBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LeptonBase {
        &mut self.base
    }

    fn is_loose(&self) -> bool {
        selector::muon::is_loose(self)
    }

    fn is_fo(&self) -> bool {
        selector::muon::is_fo(self)
    }

    fn is_tight(&self) -> bool {
        selector::muon::is_tight(self)
    }

    fn cone_correction_factor(&self) -> Option<N64> {
        selector::muon::cone_correction_factor(self)
    }
}
