use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::config::IdContext;
use crate::electron::Electron;
use crate::four_momentum::FourMomentum;
use crate::generator::GenMatch;
use crate::muon::Muon;
use crate::selector::SelectionTier;
use crate::tau::Tau;

/// Lepton flavor
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
pub enum LeptonFlavor {
    Muon,
    Electron,
    Tau,
}

/// State shared by all lepton flavors
///
/// The transverse momentum and energy at construction time are kept
/// alongside the (possibly cone-corrected) four-momentum. Momentum
/// variations are always taken relative to these uncorrected values, so
/// a cone correction can never leak into a varied sibling.
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct LeptonBase {
    p4: FourMomentum,
    charge: i8,
    dxy: N64,
    dz: N64,
    sip3d: N64,
    gen_match: Option<GenMatch>,
    ctx: IdContext,
    cone_corrected: bool,
    uncorrected_pt: N64,
    uncorrected_energy: N64,
}

impl LeptonBase {
    pub(crate) fn new(
        p4: FourMomentum,
        charge: i8,
        dxy: N64,
        dz: N64,
        sip3d: N64,
        gen_match: Option<GenMatch>,
        ctx: IdContext,
    ) -> Self {
        let uncorrected_pt = p4.pt();
        let uncorrected_energy = p4.energy();
        Self {
            p4,
            charge,
            dxy,
            dz,
            sip3d,
            gen_match,
            ctx,
            cone_corrected: false,
            uncorrected_pt,
            uncorrected_energy,
        }
    }

    pub fn momentum(&self) -> &FourMomentum {
        &self.p4
    }

    pub fn charge(&self) -> i8 {
        self.charge
    }

    pub fn dxy(&self) -> N64 {
        self.dxy
    }

    pub fn dz(&self) -> N64 {
        self.dz
    }

    pub fn sip3d(&self) -> N64 {
        self.sip3d
    }

    pub fn gen_match(&self) -> Option<&GenMatch> {
        self.gen_match.as_ref()
    }

    pub fn ctx(&self) -> IdContext {
        self.ctx
    }

    pub fn is_cone_corrected(&self) -> bool {
        self.cone_corrected
    }

    /// Transverse momentum before any cone correction
    pub fn uncorrected_pt(&self) -> N64 {
        self.uncorrected_pt
    }

    /// Energy before any cone correction
    pub fn uncorrected_energy(&self) -> N64 {
        self.uncorrected_energy
    }

    pub(crate) fn rescale_momentum(&mut self, factor: N64) {
        self.p4.rescale(factor);
    }

    pub(crate) fn mark_cone_corrected(&mut self) {
        self.cone_corrected = true;
    }

    /// Replace the four-momentum, resetting the cone-correction state
    ///
    /// Used by the momentum-variation constructors.
    pub(crate) fn reset_momentum(&mut self, p4: FourMomentum) {
        self.uncorrected_pt = p4.pt();
        self.uncorrected_energy = p4.energy();
        self.cone_corrected = false;
        self.p4 = p4;
    }
}

/// Isolation and jet-proximity variables shared by muons and electrons
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct LightLeptonVars {
    /// Mini-isolation, all components
    pub mini_iso: N64,
    /// Mini-isolation, charged component only
    pub mini_iso_charged: N64,
    /// Relative isolation in a ΔR = 0.3 cone
    pub rel_iso_0p3: N64,
    /// Lepton pt over closest-jet pt
    pub pt_ratio: N64,
    /// Lepton pt transverse to the closest-jet axis
    pub pt_rel: N64,
    /// DeepFlavor discriminant of the closest jet
    pub closest_jet_deep_flavor: N64,
    /// tZq lepton MVA score
    pub lepton_mva_tzq: N64,
    /// ttH lepton MVA score
    pub lepton_mva_tth: N64,
}

/// Common interface of all lepton flavors
///
/// Classification delegates to the pure dispatch tables in
/// [crate::selector] via the context stamped on the lepton at
/// construction.
pub trait LeptonLike {
    fn base(&self) -> &LeptonBase;
    fn base_mut(&mut self) -> &mut LeptonBase;

    fn is_loose(&self) -> bool;
    fn is_fo(&self) -> bool;
    fn is_tight(&self) -> bool;

    /// Momentum rescaling factor for FO leptons, if the active scheme
    /// applies one to this flavor
    fn cone_correction_factor(&self) -> Option<N64>;

    fn momentum(&self) -> &FourMomentum {
        self.base().momentum()
    }

    fn pt(&self) -> N64 {
        self.momentum().pt()
    }

    fn eta(&self) -> N64 {
        self.momentum().eta()
    }

    fn phi(&self) -> N64 {
        self.momentum().phi()
    }

    fn energy(&self) -> N64 {
        self.momentum().energy()
    }

    fn charge(&self) -> i8 {
        self.base().charge()
    }

    fn ctx(&self) -> IdContext {
        self.base().ctx()
    }

    /// Rescale the momentum towards the embedding jet
    ///
    /// No-op if already applied, if the lepton is tight, or if it fails
    /// the FO selection. Applied at most once per instance.
    fn apply_cone_correction(&mut self) {
        if self.base().is_cone_corrected() || self.is_tight() || !self.is_fo()
        {
            return;
        }
        if let Some(factor) = self.cone_correction_factor() {
            self.base_mut().rescale_momentum(factor);
        }
        self.base_mut().mark_cone_corrected();
    }
}

/// A reconstructed lepton of any flavor
///
/// The closed set of flavors mirrors what the ntuplizer writes out.
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub enum Lepton {
    Muon(Muon),
    Electron(Electron),
    Tau(Tau),
}

macro_rules! delegate {
    ($self:ident, $lep:ident => $body:expr) => {
        match $self {
            Lepton::Muon($lep) => $body,
            Lepton::Electron($lep) => $body,
            Lepton::Tau($lep) => $body,
        }
    };
}

impl Lepton {
    pub fn flavor(&self) -> LeptonFlavor {
        match self {
            Lepton::Muon(_) => LeptonFlavor::Muon,
            Lepton::Electron(_) => LeptonFlavor::Electron,
            Lepton::Tau(_) => LeptonFlavor::Tau,
        }
    }

    pub fn is_muon(&self) -> bool {
        matches!(self, Lepton::Muon(_))
    }

    pub fn is_electron(&self) -> bool {
        matches!(self, Lepton::Electron(_))
    }

    pub fn is_tau(&self) -> bool {
        matches!(self, Lepton::Tau(_))
    }

    pub fn is_light_lepton(&self) -> bool {
        !self.is_tau()
    }

    pub fn as_muon(&self) -> Option<&Muon> {
        match self {
            Lepton::Muon(mu) => Some(mu),
            _ => None,
        }
    }

    pub fn as_electron(&self) -> Option<&Electron> {
        match self {
            Lepton::Electron(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_tau(&self) -> Option<&Tau> {
        match self {
            Lepton::Tau(tau) => Some(tau),
            _ => None,
        }
    }

    /// Isolation and jet-proximity variables, absent for taus
    pub fn light_vars(&self) -> Option<&LightLeptonVars> {
        match self {
            Lepton::Muon(mu) => Some(mu.light_vars()),
            Lepton::Electron(el) => Some(el.light_vars()),
            Lepton::Tau(_) => None,
        }
    }

    pub fn passes(&self, tier: SelectionTier) -> bool {
        match tier {
            SelectionTier::Loose => self.is_loose(),
            SelectionTier::FO => self.is_fo(),
            SelectionTier::Tight => self.is_tight(),
        }
    }

    /// Whether `self` and `other` form a same-flavor opposite-sign pair
    pub fn is_os_sf_partner(&self, other: &Self) -> bool {
        self.flavor() == other.flavor()
            && self.charge() * other.charge() < 0
    }
}

impl LeptonLike for Lepton {
    fn base(&self) -> &LeptonBase {
        delegate!(self, lep => lep.base())
    }

    fn base_mut(&mut self) -> &mut LeptonBase {
        delegate!(self, lep => lep.base_mut())
    }

    fn is_loose(&self) -> bool {
        delegate!(self, lep => lep.is_loose())
    }

    fn is_fo(&self) -> bool {
        delegate!(self, lep => lep.is_fo())
    }

    fn is_tight(&self) -> bool {
        delegate!(self, lep => lep.is_tight())
    }

    fn cone_correction_factor(&self) -> Option<N64> {
        delegate!(self, lep => lep.cone_correction_factor())
    }
}

impl From<Muon> for Lepton {
    fn from(mu: Muon) -> Self {
        Lepton::Muon(mu)
    }
}

impl From<Electron> for Lepton {
    fn from(el: Electron) -> Self {
        Lepton::Electron(el)
    }
}

impl From<Tau> for Lepton {
    fn from(tau: Tau) -> Self {
        Lepton::Tau(tau)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    #[test]
    fn tiers_are_monotonic() {
        let leptons: Vec<Lepton> = vec![
            tight_muon(30., 0.1, 0., 1).into(),
            fo_muon(30., 0.1, 0., 1).into(),
            loose_only_muon(30., 0.1, 0., 1).into(),
            tight_electron(30., 0.1, 0., -1).into(),
            fo_electron(30., 0.1, 0., -1).into(),
            loose_only_electron(30., 0.1, 0., -1).into(),
            tight_tau(30., 0.1, 0., 1).into(),
            fo_tau(30., 0.1, 0., 1).into(),
        ];
        for lepton in &leptons {
            if lepton.is_tight() {
                assert!(lepton.is_fo());
            }
            if lepton.is_fo() {
                assert!(lepton.is_loose());
            }
        }
        // the fixtures cover all three tiers
        assert!(leptons.iter().any(|l| l.is_tight()));
        assert!(leptons.iter().any(|l| l.is_fo() && !l.is_tight()));
        assert!(leptons.iter().any(|l| l.is_loose() && !l.is_fo()));
    }

    #[test]
    fn cone_correction_applies_at_most_once() {
        let mut mu: Lepton = fo_muon(30., 0.1, 0., 1).into();
        assert!(mu.is_fo() && !mu.is_tight());
        let before = mu.pt();
        mu.apply_cone_correction();
        // tZq factor 0.67 over the fixture's pt ratio of 0.8
        let corrected = mu.pt();
        assert!((corrected - before * (0.67 / 0.8)).abs() < 1e-9);
        assert!(
            (mu.energy() - n64(30.) * n64(0.1).cosh() * (0.67 / 0.8)).abs()
                < 1e-9
        );

        mu.apply_cone_correction();
        assert_eq!(mu.pt(), corrected);
    }

    #[test]
    fn cone_correction_no_op_conditions() {
        // tight leptons are never corrected
        let mut mu: Lepton = tight_muon(30., 0.1, 0., 1).into();
        let before = mu.pt();
        mu.apply_cone_correction();
        assert_eq!(mu.pt(), before);

        // leptons failing FO are never corrected
        let mut mu: Lepton = loose_only_muon(30., 0.1, 0., 1).into();
        let before = mu.pt();
        mu.apply_cone_correction();
        assert_eq!(mu.pt(), before);
    }

    #[test]
    fn os_sf_pairing() {
        let mu_plus: Lepton = tight_muon(30., 0.1, 0., 1).into();
        let mu_minus: Lepton = tight_muon(25., -0.1, 1., -1).into();
        let el_minus: Lepton = tight_electron(25., 0.5, 2., -1).into();
        assert!(mu_plus.is_os_sf_partner(&mu_minus));
        assert!(!mu_plus.is_os_sf_partner(&el_minus));
        assert!(!mu_minus.is_os_sf_partner(&el_minus));
    }
}
