use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

use crate::four_momentum::FourMomentum;
use crate::lepton::{LeptonBase, LeptonLike, LightLeptonVars};
use crate::selector;

/// A reconstructed electron
///
/// Carries the scale- and resolution-varied transverse momenta written
/// out by the ntuplizer, used by the variation constructors.
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct Electron {
    pub(crate) base: LeptonBase,
    light: LightLeptonVars,
    missing_hits: u32,
    passes_conversion_veto: bool,
    supercluster_eta: N64,
    mva_fall17_noiso: N64,
    pt_scale_up: N64,
    pt_scale_down: N64,
    pt_res_up: N64,
    pt_res_down: N64,
}

impl Electron {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        base: LeptonBase,
        light: LightLeptonVars,
        missing_hits: u32,
        passes_conversion_veto: bool,
        supercluster_eta: N64,
        mva_fall17_noiso: N64,
        pt_scale_up: N64,
        pt_scale_down: N64,
        pt_res_up: N64,
        pt_res_down: N64,
    ) -> Self {
        Self {
            base,
            light,
            missing_hits,
            passes_conversion_veto,
            supercluster_eta,
            mva_fall17_noiso,
            pt_scale_up,
            pt_scale_down,
            pt_res_up,
            pt_res_down,
        }
    }

    pub fn light_vars(&self) -> &LightLeptonVars {
        &self.light
    }

    pub fn missing_hits(&self) -> u32 {
        self.missing_hits
    }

    pub fn passes_conversion_veto(&self) -> bool {
        self.passes_conversion_veto
    }

    pub fn supercluster_eta(&self) -> N64 {
        self.supercluster_eta
    }

    pub fn mva_fall17_noiso(&self) -> N64 {
        self.mva_fall17_noiso
    }

    /// Sibling with the energy scale shifted up
    pub fn scale_up(&self) -> Electron {
        self.with_varied_pt(self.pt_scale_up)
    }

    /// Sibling with the energy scale shifted down
    pub fn scale_down(&self) -> Electron {
        self.with_varied_pt(self.pt_scale_down)
    }

    /// Sibling with the energy resolution smeared up
    pub fn res_up(&self) -> Electron {
        self.with_varied_pt(self.pt_res_up)
    }

    /// Sibling with the energy resolution smeared down
    pub fn res_down(&self) -> Electron {
        self.with_varied_pt(self.pt_res_down)
    }

    /// Sibling rescaled to `pt`, relative to the uncorrected momentum
    ///
    /// Working from the uncorrected values guarantees a cone correction
    /// applied to the nominal electron cannot be double-applied in the
    /// varied branch.
    fn with_varied_pt(&self, pt: N64) -> Electron {
        let mut res = self.clone();
        let nominal = self.base.uncorrected_pt();
        let energy = if nominal > 0. {
            self.base.uncorrected_energy() * pt / nominal
        } else {
            self.base.uncorrected_energy()
        };
        let p4 = FourMomentum::from_coords(
            pt,
            self.momentum().eta(),
            self.momentum().phi(),
            energy,
        );
        res.base.reset_momentum(p4);
        res
    }
}

impl LeptonLike for Electron {
    fn base(&self) -> &LeptonBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LeptonBase {
        &mut self.base
    }

    fn is_loose(&self) -> bool {
        selector::electron::is_loose(self)
    }

    fn is_fo(&self) -> bool {
        selector::electron::is_fo(self)
    }

    fn is_tight(&self) -> bool {
        selector::electron::is_tight(self)
    }

    fn cone_correction_factor(&self) -> Option<N64> {
        selector::electron::cone_correction_factor(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    #[test]
    fn variations_start_from_uncorrected_momentum() {
        let mut el = fo_electron(30., 0.5, 1., -1);
        el.apply_cone_correction();
        assert!(el.pt() != n64(30.));

        // a variation built after the cone correction still refers to
        // the momentum stored at construction
        let up = el.scale_up();
        assert!((up.pt() - n64(30. * 1.02)).abs() < 1e-9);
        assert!(!up.base().is_cone_corrected());
        assert_eq!(up.missing_hits(), el.missing_hits());
        assert_eq!(up.momentum().eta(), el.momentum().eta());

        let down = el.res_down();
        assert!((down.pt() - n64(30. * 0.99)).abs() < 1e-9);
    }
}
