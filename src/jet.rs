use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::config::{IdContext, SelectionConfig};
use crate::four_momentum::FourMomentum;
use crate::selector;
use crate::selector::jet::BTagWorkingPoint;

/// Generator-level flavor of the hadron a jet originates from
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
pub enum HadronFlavor {
    Light,
    Charm,
    Bottom,
}

/// Error parsing a hadron-flavor code outside {0, 4, 5}
#[derive(Debug, Clone, Error)]
#[error("invalid hadron flavor code: {0}")]
pub struct InvalidHadronFlavor(pub i32);

impl TryFrom<i32> for HadronFlavor {
    type Error = InvalidHadronFlavor;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Light),
            4 => Ok(Self::Charm),
            5 => Ok(Self::Bottom),
            _ => Err(InvalidHadronFlavor(code)),
        }
    }
}

/// Jet energy variation
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
pub enum JetVariation {
    JecUp,
    JecDown,
    JerUp,
    JerDown,
}

impl JetVariation {
    pub const ALL: [Self; 4] =
        [Self::JecUp, Self::JecDown, Self::JerUp, Self::JerDown];
}

/// A reconstructed jet
///
/// The JEC- and JER-varied transverse momenta delivered by the
/// ntuplizer are stored alongside the nominal momentum; the variation
/// constructors build full sibling jets from them.
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct Jet {
    p4: FourMomentum,
    deep_csv: N64,
    deep_flavor: N64,
    hadron_flavor: HadronFlavor,
    has_tight_id: bool,
    has_tight_lepton_veto_id: bool,
    pt_jec_up: N64,
    pt_jec_down: N64,
    pt_jer_up: N64,
    pt_jer_down: N64,
    ctx: IdContext,
}

impl Jet {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        p4: FourMomentum,
        deep_csv: N64,
        deep_flavor: N64,
        hadron_flavor: HadronFlavor,
        has_tight_id: bool,
        has_tight_lepton_veto_id: bool,
        pt_jec_up: N64,
        pt_jec_down: N64,
        pt_jer_up: N64,
        pt_jer_down: N64,
        ctx: IdContext,
    ) -> Self {
        Self {
            p4,
            deep_csv,
            deep_flavor,
            hadron_flavor,
            has_tight_id,
            has_tight_lepton_veto_id,
            pt_jec_up,
            pt_jec_down,
            pt_jer_up,
            pt_jer_down,
            ctx,
        }
    }

    pub fn momentum(&self) -> &FourMomentum {
        &self.p4
    }

    pub fn pt(&self) -> N64 {
        self.p4.pt()
    }

    pub fn eta(&self) -> N64 {
        self.p4.eta()
    }

    pub fn phi(&self) -> N64 {
        self.p4.phi()
    }

    pub fn deep_csv(&self) -> N64 {
        self.deep_csv
    }

    pub fn deep_flavor(&self) -> N64 {
        self.deep_flavor
    }

    pub fn hadron_flavor(&self) -> HadronFlavor {
        self.hadron_flavor
    }

    pub fn has_tight_id(&self) -> bool {
        self.has_tight_id
    }

    pub fn has_tight_lepton_veto_id(&self) -> bool {
        self.has_tight_lepton_veto_id
    }

    pub fn ctx(&self) -> IdContext {
        self.ctx
    }

    pub fn is_loose(&self) -> bool {
        selector::jet::is_loose(self)
    }

    pub fn is_good(&self, cfg: &SelectionConfig) -> bool {
        selector::jet::is_good(self, cfg)
    }

    pub fn in_btag_acceptance(&self) -> bool {
        selector::jet::in_btag_acceptance(self)
    }

    pub fn is_btagged(&self, wp: BTagWorkingPoint) -> bool {
        selector::jet::is_btagged(self, wp)
    }

    /// Sibling jet under the given energy variation
    ///
    /// Only the transverse momentum and energy differ from the nominal
    /// jet; all identification fields are shared.
    pub fn variation(&self, var: JetVariation) -> Jet {
        let pt = match var {
            JetVariation::JecUp => self.pt_jec_up,
            JetVariation::JecDown => self.pt_jec_down,
            JetVariation::JerUp => self.pt_jer_up,
            JetVariation::JerDown => self.pt_jer_down,
        };
        self.with_pt(pt)
    }

    pub fn jec_up(&self) -> Jet {
        self.variation(JetVariation::JecUp)
    }

    pub fn jec_down(&self) -> Jet {
        self.variation(JetVariation::JecDown)
    }

    pub fn jer_up(&self) -> Jet {
        self.variation(JetVariation::JerUp)
    }

    pub fn jer_down(&self) -> Jet {
        self.variation(JetVariation::JerDown)
    }

    fn with_pt(&self, pt: N64) -> Jet {
        let mut res = self.clone();
        if self.pt() > 0. {
            res.p4.rescale(pt / self.pt());
        }
        res
    }
}
