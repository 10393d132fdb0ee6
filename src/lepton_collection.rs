use log::debug;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

use crate::electron::Electron;
use crate::lepton::{Lepton, LeptonLike};
use crate::muon::Muon;
use crate::selector::SelectionTier;
use crate::tau::Tau;

/// Ordered container of the leptons of one event
///
/// Selection and cleaning operate in place and preserve the relative
/// order of surviving leptons. Flavor-specific access is provided as
/// borrowing views into this collection, never as owning copies.
#[derive(
    Deserialize, Serialize, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct LeptonCollection {
    leptons: Vec<Lepton>,
}

impl LeptonCollection {
    pub fn new(leptons: Vec<Lepton>) -> Self {
        Self { leptons }
    }

    pub fn len(&self) -> usize {
        self.leptons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leptons.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Lepton> {
        self.leptons.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lepton> {
        self.leptons.iter()
    }

    /// Keep only leptons passing `tier`, preserving relative order
    pub fn select(&mut self, tier: SelectionTier) {
        self.leptons.retain(|l| l.passes(tier));
    }

    /// Drop all tau candidates
    pub fn remove_taus(&mut self) {
        self.leptons.retain(|l| !l.is_tau());
    }

    /// Sort by descending transverse momentum
    ///
    /// Stable, so leptons with equal pt keep their relative order.
    pub fn sort_by_pt(&mut self) {
        self.leptons.sort_by(|a, b| b.pt().cmp(&a.pt()));
    }

    /// Apply the cone correction to every lepton
    ///
    /// Each lepton enforces its own no-op rules (tight or non-FO
    /// leptons are untouched, nothing is corrected twice).
    pub fn apply_cone_corrections(&mut self) {
        for lepton in &mut self.leptons {
            lepton.apply_cone_correction();
        }
    }

    pub fn n_passing(&self, tier: SelectionTier) -> usize {
        self.leptons.iter().filter(|l| l.passes(tier)).count()
    }

    pub fn n_muons(&self) -> usize {
        self.leptons.iter().filter(|l| l.is_muon()).count()
    }

    pub fn n_electrons(&self) -> usize {
        self.leptons.iter().filter(|l| l.is_electron()).count()
    }

    pub fn n_taus(&self) -> usize {
        self.leptons.iter().filter(|l| l.is_tau()).count()
    }

    pub fn n_light_leptons(&self) -> usize {
        self.leptons.iter().filter(|l| l.is_light_lepton()).count()
    }

    /// Borrowing view of the muons
    pub fn muons(&self) -> impl Iterator<Item = &Muon> {
        self.leptons.iter().filter_map(Lepton::as_muon)
    }

    /// Borrowing view of the electrons
    pub fn electrons(&self) -> impl Iterator<Item = &Electron> {
        self.leptons.iter().filter_map(Lepton::as_electron)
    }

    /// Borrowing view of the taus
    pub fn taus(&self) -> impl Iterator<Item = &Tau> {
        self.leptons.iter().filter_map(Lepton::as_tau)
    }

    /// Borrowing view of muons and electrons
    pub fn light_leptons(&self) -> impl Iterator<Item = &Lepton> {
        self.leptons.iter().filter(|l| l.is_light_lepton())
    }

    /// Remove electrons within `cone` of a muon passing `tier`
    pub fn clean_electrons_from_muons(
        &mut self,
        tier: SelectionTier,
        cone: N64,
    ) {
        self.clean(
            |l| l.is_electron(),
            |l| l.is_muon() && l.passes(tier),
            cone,
        );
    }

    /// Remove taus within `cone` of a light lepton passing `tier`
    pub fn clean_taus_from_light_leptons(
        &mut self,
        tier: SelectionTier,
        cone: N64,
    ) {
        self.clean(
            |l| l.is_tau(),
            |l| l.is_light_lepton() && l.passes(tier),
            cone,
        );
    }

    /// Two-phase overlap removal
    ///
    /// The full scan runs on the unmodified collection; marked
    /// candidates are only swept out afterwards, so no removal can
    /// influence the scan.
    fn clean(
        &mut self,
        is_candidate: impl Fn(&Lepton) -> bool,
        is_cleaner: impl Fn(&Lepton) -> bool,
        cone: N64,
    ) {
        let mut remove = vec![false; self.leptons.len()];
        for (i, candidate) in self.leptons.iter().enumerate() {
            if !is_candidate(candidate) {
                continue;
            }
            for (j, cleaner) in self.leptons.iter().enumerate() {
                if i == j || !is_cleaner(cleaner) {
                    continue;
                }
                if candidate.momentum().delta_r(cleaner.momentum()) < cone {
                    remove[i] = true;
                    break;
                }
            }
        }
        let n_removed = remove.iter().filter(|&&r| r).count();
        if n_removed > 0 {
            debug!("removing {n_removed} overlapping leptons");
        }
        let mut idx = 0;
        self.leptons.retain(|_| {
            let keep = !remove[idx];
            idx += 1;
            keep
        });
    }
}

impl<'a> IntoIterator for &'a LeptonCollection {
    type Item = &'a Lepton;
    type IntoIter = std::slice::Iter<'a, Lepton>;

    fn into_iter(self) -> Self::IntoIter {
        self.leptons.iter()
    }
}

impl FromIterator<Lepton> for LeptonCollection {
    fn from_iter<I: IntoIterator<Item = Lepton>>(iter: I) -> Self {
        Self {
            leptons: iter.into_iter().collect(),
        }
    }
}
