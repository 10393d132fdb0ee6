use log::debug;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::jet::{Jet, JetVariation};
use crate::lepton::LeptonLike;
use crate::lepton_collection::LeptonCollection;
use crate::selector::jet::BTagWorkingPoint;
use crate::selector::SelectionTier;

/// Ordered container of the jets of one event
#[derive(
    Deserialize, Serialize, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct JetCollection {
    jets: Vec<Jet>,
}

impl JetCollection {
    pub fn new(jets: Vec<Jet>) -> Self {
        Self { jets }
    }

    pub fn len(&self) -> usize {
        self.jets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jets.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Jet> {
        self.jets.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Jet> {
        self.jets.iter()
    }

    /// Keep only good jets, preserving relative order
    pub fn select_good(&mut self, cfg: &SelectionConfig) {
        self.jets.retain(|j| j.is_good(cfg));
    }

    /// Filtered copy of the good jets
    pub fn good_jets(&self, cfg: &SelectionConfig) -> JetCollection {
        self.jets.iter().filter(|j| j.is_good(cfg)).cloned().collect()
    }

    /// Sort by descending transverse momentum
    pub fn sort_by_pt(&mut self) {
        self.jets.sort_by(|a, b| b.pt().cmp(&a.pt()));
    }

    pub fn n_btagged(&self, wp: BTagWorkingPoint) -> usize {
        self.jets.iter().filter(|j| j.is_btagged(wp)).count()
    }

    /// Scalar sum of jet transverse momenta
    pub fn ht(&self) -> N64 {
        self.jets.iter().map(Jet::pt).sum()
    }

    /// Remove jets within `cone` of a lepton passing `tier`
    ///
    /// Two-phase: the scan sees the unmodified collection, marked jets
    /// are swept out afterwards.
    pub fn clean_from_leptons(
        &mut self,
        tier: SelectionTier,
        leptons: &LeptonCollection,
        cone: N64,
    ) {
        let mut remove = vec![false; self.jets.len()];
        for (i, jet) in self.jets.iter().enumerate() {
            for lepton in leptons {
                if !lepton.passes(tier) {
                    continue;
                }
                if jet.momentum().delta_r(lepton.momentum()) < cone {
                    remove[i] = true;
                    break;
                }
            }
        }
        let n_removed = remove.iter().filter(|&&r| r).count();
        if n_removed > 0 {
            debug!("removing {n_removed} jets overlapping with leptons");
        }
        let mut idx = 0;
        self.jets.retain(|_| {
            let keep = !remove[idx];
            idx += 1;
            keep
        });
    }

    /// The sibling collection under the given energy variation
    pub fn variation(&self, var: JetVariation) -> JetCollection {
        self.jets.iter().map(|j| j.variation(var)).collect()
    }

    /// Jets passing the good-jet cuts nominally or under at least one
    /// energy variation
    ///
    /// Used by systematic event loops so a jet migrating over the pt
    /// threshold in a single variation is kept exactly once.
    pub fn good_in_any_variation(
        &self,
        cfg: &SelectionConfig,
    ) -> JetCollection {
        self.jets
            .iter()
            .filter(|j| {
                j.is_good(cfg)
                    || JetVariation::ALL
                        .iter()
                        .any(|&var| j.variation(var).is_good(cfg))
            })
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a JetCollection {
    type Item = &'a Jet;
    type IntoIter = std::slice::Iter<'a, Jet>;

    fn into_iter(self) -> Self::IntoIter {
        self.jets.iter()
    }
}

impl FromIterator<Jet> for JetCollection {
    fn from_iter<I: IntoIterator<Item = Jet>>(iter: I) -> Self {
        Self {
            jets: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    #[test]
    fn good_jet_boundary() {
        let cfg = jet_cfg_with_min_pt(20.);
        // just below threshold
        assert!(!jet_at(19.9, 1.0, 0.).is_good(&cfg));
        // just above, with default-good identification
        assert!(jet_at(20.1, 1.0, 0.).is_good(&cfg));
        // outside tracker acceptance
        assert!(!jet_at(50., 3.0, 0.).is_good(&cfg));
    }

    #[test]
    fn cleaning_against_leptons() {
        let cfg = default_cfg();
        let leptons: LeptonCollection = [
            tight_muon(30., 0.5, 1.0, 1).into(),
            loose_only_muon(15., -1.0, -2.0, -1).into(),
        ]
        .into_iter()
        .collect();
        let mut jets: JetCollection = [
            jet_at(40., 0.5, 1.1),  // within 0.4 of the tight muon
            jet_at(35., -1.0, -2.0), // on top of the loose-only muon
            jet_at(60., 2.0, 0.),
        ]
        .into_iter()
        .collect();
        let mut all_cleaned = jets.clone();

        jets.clean_from_leptons(
            SelectionTier::FO,
            &leptons,
            n64(cfg.jet_lepton_cone),
        );
        // loose-only muon does not clean in the FO pass
        assert_eq!(jets.len(), 2);

        all_cleaned.clean_from_leptons(
            SelectionTier::Loose,
            &leptons,
            n64(cfg.jet_lepton_cone),
        );
        assert_eq!(all_cleaned.len(), 1);
        assert!((all_cleaned.get(0).unwrap().pt() - n64(60.)).abs() < 1e-9);
    }

    #[test]
    fn variation_collection() {
        let cfg = default_cfg();
        let jets: JetCollection =
            [jet_at(30., 0.5, 1.0), jet_at(24., -0.5, 2.0)]
                .into_iter()
                .collect();
        let up = jets.variation(JetVariation::JecUp);
        assert_eq!(up.len(), 2);
        for (nominal, varied) in jets.iter().zip(up.iter()) {
            assert!(varied.pt() > nominal.pt());
            assert_eq!(varied.deep_flavor(), nominal.deep_flavor());
            assert_eq!(varied.hadron_flavor(), nominal.hadron_flavor());
        }
        // the 24 GeV jet only enters through a variation
        let any = jets.good_in_any_variation(&cfg);
        let mut nominal_good = jets.clone();
        nominal_good.select_good(&cfg);
        assert_eq!(nominal_good.len(), 1);
        assert_eq!(any.len(), 2);
    }

    #[test]
    fn btag_counting() {
        let jets: JetCollection = [
            bjet_at(30., 0.5, 1.0),
            bjet_at(40., -1.0, 2.0),
            // outside the tracker acceptance, never counted
            bjet_at(50., 3.0, 0.),
            jet_at(60., 0.5, -1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(jets.n_btagged(BTagWorkingPoint::Loose), 2);
        assert_eq!(jets.n_btagged(BTagWorkingPoint::Medium), 2);
        assert_eq!(jets.n_btagged(BTagWorkingPoint::Tight), 2);
    }

    #[test]
    fn ht_sums_pt() {
        let jets: JetCollection =
            [jet_at(30., 0.5, 1.0), jet_at(20., -0.5, 2.0)]
                .into_iter()
                .collect();
        assert!((jets.ht() - n64(50.)).abs() < 1e-9);
    }
}
