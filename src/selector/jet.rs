//! Jet identification and b-tagging working points

use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::SelectionConfig;
use crate::jet::Jet;
use crate::year::Year;

/// b-tagging working point
#[derive(
    Deserialize,
    Serialize,
    Display,
    EnumString,
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[strum(ascii_case_insensitive)]
pub enum BTagWorkingPoint {
    Loose,
    Medium,
    Tight,
}

/// DeepFlavor discriminant threshold for the given year and working point
pub fn deep_flavor_wp(year: Year, wp: BTagWorkingPoint) -> N64 {
    use BTagWorkingPoint::*;
    let cut = match (year, wp) {
        (Year::Run2016PreVFP, Loose) => 0.0508,
        (Year::Run2016PreVFP, Medium) => 0.2598,
        (Year::Run2016PreVFP, Tight) => 0.6502,
        (Year::Run2016PostVFP, Loose) => 0.0480,
        (Year::Run2016PostVFP, Medium) => 0.2489,
        (Year::Run2016PostVFP, Tight) => 0.6377,
        (Year::Run2017, Loose) => 0.0532,
        (Year::Run2017, Medium) => 0.3040,
        (Year::Run2017, Tight) => 0.7476,
        (Year::Run2018, Loose) => 0.0490,
        (Year::Run2018, Medium) => 0.2783,
        (Year::Run2018, Tight) => 0.7100,
    };
    n64(cut)
}

/// Jet identification flags required for the given year
///
/// The loose working point was retired after 2016; later years require
/// the tight ID with lepton veto.
pub fn is_loose(jet: &Jet) -> bool {
    match jet.ctx().year {
        Year::Run2016PreVFP | Year::Run2016PostVFP => jet.has_tight_id(),
        Year::Run2017 | Year::Run2018 => {
            jet.has_tight_id() && jet.has_tight_lepton_veto_id()
        }
    }
}

/// Kinematic acceptance plus identification
pub fn is_good(jet: &Jet, cfg: &SelectionConfig) -> bool {
    jet.pt() >= cfg.jet_min_pt
        && jet.eta().abs() <= cfg.jet_max_abs_eta
        && is_loose(jet)
}

/// Whether the jet lies inside the tracker b-tagging acceptance
pub fn in_btag_acceptance(jet: &Jet) -> bool {
    let max_abs_eta = if jet.ctx().year.is_2016() { 2.4 } else { 2.5 };
    jet.eta().abs() < max_abs_eta && jet.pt() > 25.
}

pub fn is_btagged(jet: &Jet, wp: BTagWorkingPoint) -> bool {
    in_btag_acceptance(jet)
        && jet.deep_flavor() > deep_flavor_wp(jet.ctx().year, wp)
}
