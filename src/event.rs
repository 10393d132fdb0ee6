//! The analysis-level event
//!
//! An [Event] owns all reconstructed objects of one tree entry plus the
//! selection configuration it was built under. Derived quantities that
//! are expensive to find, like the Z-boson candidate, are cached; every
//! mutating operation drops the cache so a stale candidate can never be
//! observed.

use itertools::Itertools;
use log::debug;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SelectionConfig;
use crate::dmeson::DMesonCollection;
use crate::generator::GeneratorInfo;
use crate::jet_collection::JetCollection;
use crate::lepton::LeptonLike;
use crate::lepton_collection::LeptonCollection;
use crate::met::Met;
use crate::record::EventTags;
use crate::selector::SelectionTier;
use crate::trigger::TriggerInfo;
use crate::year::Year;

/// Nominal Z-boson mass in GeV
pub const Z_MASS: f64 = 91.1876;

/// Error requesting generator information from a data event
#[derive(Debug, Clone, Error)]
#[error("event {tags}: no generator information in a data event")]
pub struct NoGeneratorInfo {
    pub tags: EventTags,
}

/// Opposite-sign same-flavor lepton pair closest to the Z-boson mass
///
/// The indices point into the lepton collection at the time the
/// candidate was formed. Any mutation of the event invalidates them
/// together with the cached candidate.
#[derive(
    Deserialize, Serialize, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct ZCandidate {
    pub first: usize,
    pub second: usize,
    pub mass: N64,
}

/// One fully built event
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Event {
    cfg: SelectionConfig,
    year: Year,
    is_simulation: bool,
    tags: EventTags,
    leptons: LeptonCollection,
    jets: JetCollection,
    dmesons: DMesonCollection,
    met: Met,
    trigger: TriggerInfo,
    generator: Option<GeneratorInfo>,
    #[serde(skip)]
    z_cache: Option<Option<ZCandidate>>,
}

impl Event {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        cfg: SelectionConfig,
        year: Year,
        is_simulation: bool,
        tags: EventTags,
        leptons: LeptonCollection,
        jets: JetCollection,
        dmesons: DMesonCollection,
        met: Met,
        trigger: TriggerInfo,
        generator: Option<GeneratorInfo>,
    ) -> Self {
        Self {
            cfg,
            year,
            is_simulation,
            tags,
            leptons,
            jets,
            dmesons,
            met,
            trigger,
            generator,
            z_cache: None,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.cfg
    }

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn is_simulation(&self) -> bool {
        self.is_simulation
    }

    pub fn tags(&self) -> EventTags {
        self.tags
    }

    pub fn leptons(&self) -> &LeptonCollection {
        &self.leptons
    }

    pub fn jets(&self) -> &JetCollection {
        &self.jets
    }

    pub fn dmesons(&self) -> &DMesonCollection {
        &self.dmesons
    }

    pub fn met(&self) -> &Met {
        &self.met
    }

    pub fn trigger(&self) -> &TriggerInfo {
        &self.trigger
    }

    /// Generator-level information
    ///
    /// Only simulated events carry it; requesting it from a data event
    /// is an error rather than a silent unit weight.
    pub fn generator_info(&self) -> Result<&GeneratorInfo, NoGeneratorInfo> {
        self.generator
            .as_ref()
            .ok_or(NoGeneratorInfo { tags: self.tags })
    }

    fn invalidate(&mut self) {
        self.z_cache = None;
    }

    /// Keep only leptons passing `tier`
    pub fn select_leptons(&mut self, tier: SelectionTier) {
        self.invalidate();
        self.leptons.select(tier);
    }

    /// Drop all tau candidates
    pub fn remove_taus(&mut self) {
        self.invalidate();
        self.leptons.remove_taus();
    }

    /// Remove electrons overlapping with loose muons
    pub fn clean_electrons_from_loose_muons(&mut self) {
        self.invalidate();
        self.leptons.clean_electrons_from_muons(
            SelectionTier::Loose,
            n64(self.cfg.electron_muon_cone),
        );
    }

    /// Remove taus overlapping with loose light leptons
    pub fn clean_taus_from_loose_light_leptons(&mut self) {
        self.invalidate();
        self.leptons.clean_taus_from_light_leptons(
            SelectionTier::Loose,
            n64(self.cfg.tau_light_lepton_cone),
        );
    }

    /// Apply the cone correction to every lepton
    pub fn apply_cone_corrections(&mut self) {
        self.invalidate();
        self.leptons.apply_cone_corrections();
    }

    /// Sort leptons by descending transverse momentum
    pub fn sort_leptons_by_pt(&mut self) {
        self.invalidate();
        self.leptons.sort_by_pt();
    }

    /// Remove jets overlapping with FO leptons
    pub fn clean_jets_from_fo_leptons(&mut self) {
        self.invalidate();
        self.jets.clean_from_leptons(
            SelectionTier::FO,
            &self.leptons,
            n64(self.cfg.jet_lepton_cone),
        );
    }

    /// Keep only good jets
    pub fn select_good_jets(&mut self) {
        self.invalidate();
        self.jets.select_good(&self.cfg);
    }

    /// Sort jets by descending transverse momentum
    pub fn sort_jets_by_pt(&mut self) {
        self.invalidate();
        self.jets.sort_by_pt();
    }

    /// Keep only good D-meson candidates
    pub fn select_good_dmesons(&mut self) {
        self.invalidate();
        self.dmesons.select_good();
    }

    /// The standard object-level preparation
    ///
    /// Optional tau removal, loose lepton selection, overlap removal
    /// between lepton flavors, cone correction, jet-lepton cleaning and
    /// the good-jet selection, with all collections pt-sorted
    /// afterwards. Tighter lepton tiers are left to the caller since
    /// fake-rate estimates work on FO leptons.
    pub fn apply_baseline_selection(&mut self, remove_taus: bool) {
        debug!("baseline selection for event {}", self.tags);
        if remove_taus {
            self.remove_taus();
        }
        self.select_leptons(SelectionTier::Loose);
        self.clean_electrons_from_loose_muons();
        self.clean_taus_from_loose_light_leptons();
        self.apply_cone_corrections();
        self.sort_leptons_by_pt();
        self.clean_jets_from_fo_leptons();
        self.select_good_jets();
        self.sort_jets_by_pt();
        self.select_good_dmesons();
    }

    /// Scalar sum of jet transverse momenta
    pub fn ht(&self) -> N64 {
        self.jets.ht()
    }

    /// Scalar sum of the light-lepton and missing transverse momenta
    pub fn lt(&self) -> N64 {
        let lepton_sum: N64 = self
            .leptons
            .light_leptons()
            .map(|l| l.momentum().pt())
            .sum();
        lepton_sum + self.met.pt()
    }

    /// Invariant mass of the full lepton system
    pub fn lepton_system_mass(&self) -> N64 {
        self.leptons
            .iter()
            .map(|l| *l.momentum())
            .reduce(|a, b| a + b)
            .map(|p| p.m())
            .unwrap_or(n64(0.))
    }

    /// The Z-boson candidate, if any
    ///
    /// The opposite-sign same-flavor light-lepton pair with invariant
    /// mass closest to the Z mass. Sorts the leptons by descending pt
    /// as a side effect, so the candidate indices and the strict-`<`
    /// tie-break always refer to the pt-ordered collection. `None` for
    /// events with fewer than two light leptons or without any such
    /// pair. The result is cached until the next mutation.
    pub fn z_candidate(&mut self) -> Option<ZCandidate> {
        if let Some(cached) = self.z_cache {
            return cached;
        }
        self.sort_leptons_by_pt();
        let candidate = self.find_z_candidate();
        self.z_cache = Some(candidate);
        candidate
    }

    fn find_z_candidate(&self) -> Option<ZCandidate> {
        let mut best: Option<ZCandidate> = None;
        let light = self
            .leptons
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_light_lepton());
        for ((i, a), (j, b)) in light.tuple_combinations() {
            if !a.is_os_sf_partner(b) {
                continue;
            }
            let mass = (*a.momentum() + *b.momentum()).m();
            let dist = (mass - Z_MASS).abs();
            let improves = match &best {
                // strictly closer, so the first pair in collection
                // order wins ties
                Some(cur) => dist < (cur.mass - Z_MASS).abs(),
                None => true,
            };
            if improves {
                best = Some(ZCandidate {
                    first: i,
                    second: j,
                    mass,
                });
            }
        }
        best
    }

    /// Index of the lepton assigned to the W boson
    ///
    /// The highest-pt light lepton outside the Z candidate. `None` if
    /// there is no Z candidate or no lepton is left over.
    pub fn w_lepton_index(&mut self) -> Option<usize> {
        let z = self.z_candidate()?;
        self.leptons
            .iter()
            .enumerate()
            .filter(|(i, l)| {
                l.is_light_lepton() && *i != z.first && *i != z.second
            })
            .max_by_key(|(_, l)| l.momentum().pt())
            .map(|(i, _)| i)
    }

    /// Transverse mass of the W-lepton candidate and the missing energy
    pub fn mt_w(&mut self) -> Option<N64> {
        let w = self.w_lepton_index()?;
        let lepton = self.leptons.get(w)?;
        Some(lepton.momentum().mt(self.met.momentum()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lepton_collection::LeptonCollection;
    use crate::testutil::*;
    use crate::year::Year;

    fn test_event(leptons: LeptonCollection) -> Event {
        Event::from_parts(
            default_cfg(),
            Year::Run2018,
            false,
            EventTags {
                run: 1,
                lumi: 1,
                event: 1,
            },
            leptons,
            [jet_at(40., 0.5, 1.0), jet_at(30., -0.5, 2.0)]
                .into_iter()
                .collect(),
            DMesonCollection::default(),
            met_at(40., 0.),
            Default::default(),
            None,
        )
    }

    fn trilepton_event() -> Event {
        // back-to-back massless pairs: m = 2 sqrt(pt_a pt_b), so the
        // leading pair sits at 95 GeV and the (0, 2) pair at 85 GeV
        let leptons: LeptonCollection = [
            tight_muon(50., 0., 0., 1).into(),
            fo_muon(45.125, 0., std::f64::consts::PI, -1).into(),
            tight_muon(36.125, 0., std::f64::consts::PI, -1).into(),
        ]
        .into_iter()
        .collect();
        test_event(leptons)
    }

    #[test]
    fn z_candidate_picks_closest_pair() {
        let mut event = trilepton_event();
        let z = event.z_candidate().unwrap();
        assert_eq!((z.first, z.second), (0, 1));
        assert!((z.mass - n64(95.)).abs() < 1e-6);
        assert_eq!(event.w_lepton_index(), Some(2));
        let mt = event.mt_w().unwrap();
        let expected = event
            .leptons()
            .get(2)
            .unwrap()
            .momentum()
            .mt(event.met().momentum());
        assert_eq!(mt, expected);
        assert!(mt > 0.);
    }

    #[test]
    fn z_candidate_needs_two_light_leptons() {
        let mut event = test_event(
            [
                tight_muon(50., 0., 0., 1).into(),
                tight_tau(40., 0.5, 2., -1).into(),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(event.z_candidate(), None);
        assert_eq!(event.w_lepton_index(), None);
        assert_eq!(event.mt_w(), None);
    }

    #[test]
    fn cache_invalidated_by_selection() {
        let mut event = trilepton_event();
        let before = event.z_candidate().unwrap();
        assert!((before.mass - n64(95.)).abs() < 1e-6);

        // dropping the FO-only muon leaves only the 85 GeV pair
        event.select_leptons(SelectionTier::Tight);
        let after = event.z_candidate().unwrap();
        assert!((after.mass - n64(85.)).abs() < 1e-6);
        assert_eq!((after.first, after.second), (0, 1));
    }

    #[test]
    fn same_sign_pair_is_no_candidate() {
        let mut event = test_event(
            [
                tight_muon(50., 0., 0., 1).into(),
                tight_muon(45., 0., 2., 1).into(),
                tight_electron(40., 0.5, -2., -1).into(),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(event.z_candidate(), None);
    }

    #[test]
    fn baseline_selection_orders_and_cleans() {
        let leptons: LeptonCollection = [
            tight_muon(30., 0.5, 1.0, 1).into(),
            // electron on top of the muon, removed by overlap cleaning
            tight_electron(28., 0.5, 1.01, -1).into(),
            tight_electron(45., -1.0, -2.0, -1).into(),
        ]
        .into_iter()
        .collect();
        let mut event = test_event(leptons);
        event.apply_baseline_selection(false);
        assert_eq!(event.leptons().len(), 2);
        assert_eq!(event.leptons().n_electrons(), 1);
        // pt-sorted: the 45 GeV electron leads
        assert!(event.leptons().get(0).unwrap().is_electron());
        // the 40 GeV jet sits within the cleaning cone of the muon
        assert_eq!(event.jets().len(), 1);
    }

    #[test]
    fn z_candidate_sorts_leptons_first() {
        // same event as `trilepton_event`, constructed out of pt order
        let leptons: LeptonCollection = [
            tight_muon(36.125, 0., std::f64::consts::PI, -1).into(),
            tight_muon(50., 0., 0., 1).into(),
            fo_muon(45.125, 0., std::f64::consts::PI, -1).into(),
        ]
        .into_iter()
        .collect();
        let mut event = test_event(leptons);
        let z = event.z_candidate().unwrap();
        let pts: Vec<_> = event.leptons().iter().map(|l| l.pt()).collect();
        assert!(pts.windows(2).all(|pair| pair[0] >= pair[1]));
        // candidate indices refer to the pt-sorted collection
        assert_eq!((z.first, z.second), (0, 1));
        assert!((z.mass - n64(95.)).abs() < 1e-6);
        assert_eq!(event.w_lepton_index(), Some(2));
    }

    #[test]
    fn baseline_selection_can_drop_taus() {
        let leptons: LeptonCollection = [
            tight_muon(30., 0.5, 1.0, 1).into(),
            tight_tau(35., -1.0, -2.0, -1).into(),
        ]
        .into_iter()
        .collect();
        let mut event = test_event(leptons.clone());
        event.apply_baseline_selection(true);
        assert_eq!(event.leptons().n_taus(), 0);

        let mut event = test_event(leptons);
        event.apply_baseline_selection(false);
        assert_eq!(event.leptons().n_taus(), 1);
    }

    #[test]
    fn data_events_have_no_generator_info() {
        let event = test_event(LeptonCollection::default());
        let err = event.generator_info().unwrap_err();
        assert_eq!(err.tags, event.tags());
    }

    #[test]
    fn ht_and_lt() {
        let mut event = trilepton_event();
        assert!((event.ht() - n64(70.)).abs() < 1e-9);
        // three light leptons plus 40 GeV of missing energy
        assert!((event.lt() - n64(50. + 45.125 + 36.125 + 40.)).abs() < 1e-9);
        // the full trilepton mass is at least the heaviest pair mass
        assert!(
            event.lepton_system_mass() >= event.z_candidate().unwrap().mass
        );
    }
}
