//! Muon identification tiers

use noisy_float::prelude::*;

use crate::config::LeptonIdScheme;
use crate::lepton::LeptonLike;
use crate::muon::Muon;
use crate::selector::jet::{deep_flavor_wp, BTagWorkingPoint};
use crate::selector::slide_cut;
use crate::year::Year;

const MIN_PT: f64 = 5.;
const MAX_ABS_ETA: f64 = 2.4;
const MAX_ABS_DXY: f64 = 0.05;
const MAX_ABS_DZ: f64 = 0.1;
const MAX_SIP3D: f64 = 8.;
const MAX_MINI_ISO: f64 = 0.4;

/// Tight lepton-MVA threshold of the tZq scheme
pub const MVA_CUT_TZQ: f64 = 0.4;
/// Tight lepton-MVA threshold of the ttH scheme
pub const MVA_CUT_TTH: f64 = 0.85;

const FO_PT_RATIO_TZQ: f64 = 0.4;
const FO_PT_RATIO_TTH: f64 = 0.65;

const CONE_FACTOR_TZQ: f64 = 0.67;
const CONE_FACTOR_TTH: f64 = 0.9;

pub fn is_loose(mu: &Muon) -> bool {
    is_loose_base(mu)
        && match mu.ctx().year {
            Year::Run2016PreVFP | Year::Run2016PostVFP => is_loose_2016(mu),
            Year::Run2017 => is_loose_2017(mu),
            Year::Run2018 => is_loose_2018(mu),
        }
}

fn is_loose_base(mu: &Muon) -> bool {
    mu.pt() > MIN_PT
        && mu.eta().abs() < MAX_ABS_ETA
        && mu.base().dxy().abs() < MAX_ABS_DXY
        && mu.base().dz().abs() < MAX_ABS_DZ
        && mu.base().sip3d() < MAX_SIP3D
        && mu.light_vars().mini_iso < MAX_MINI_ISO
        && mu.is_pog_loose()
}

// The POG muon reconstruction was stable across Run 2; the refinements
// below are intentionally empty.
fn is_loose_2016(_mu: &Muon) -> bool {
    true
}

fn is_loose_2017(_mu: &Muon) -> bool {
    true
}

fn is_loose_2018(_mu: &Muon) -> bool {
    true
}

pub fn is_fo(mu: &Muon) -> bool {
    if !is_loose(mu) {
        return false;
    }
    match mu.ctx().scheme {
        LeptonIdScheme::TZq => is_fo_tzq(mu),
        LeptonIdScheme::TTH => is_fo_tth(mu),
        LeptonIdScheme::OldTZq => is_fo_old_tzq(mu),
    }
}

/// DeepFlavor veto on the closest jet, sliding from the medium to the
/// loose working point between the two anchor momenta
fn interpolated_deep_flavor_cut(pt: N64, year: Year) -> N64 {
    slide_cut(
        pt,
        (n64(20.), deep_flavor_wp(year, BTagWorkingPoint::Medium)),
        (n64(45.), deep_flavor_wp(year, BTagWorkingPoint::Loose)),
    )
}

fn is_fo_tzq(mu: &Muon) -> bool {
    if !mu.is_pog_medium() {
        return false;
    }
    // leptons above the tight MVA cut skip the jet-proximity cuts
    if mu.light_vars().lepton_mva_tzq > MVA_CUT_TZQ {
        return true;
    }
    mu.light_vars().pt_ratio > FO_PT_RATIO_TZQ
        && mu.light_vars().closest_jet_deep_flavor
            < interpolated_deep_flavor_cut(mu.pt(), mu.ctx().year)
}

fn is_fo_tth(mu: &Muon) -> bool {
    if !mu.is_pog_medium() {
        return false;
    }
    if mu.light_vars().lepton_mva_tth > MVA_CUT_TTH {
        return true;
    }
    mu.light_vars().pt_ratio > FO_PT_RATIO_TTH
        && mu.light_vars().closest_jet_deep_flavor
            < interpolated_deep_flavor_cut(mu.pt(), mu.ctx().year)
}

fn is_fo_old_tzq(mu: &Muon) -> bool {
    mu.pt() > 10.
        && mu.is_pog_medium()
        && mu.light_vars().closest_jet_deep_flavor
            < deep_flavor_wp(mu.ctx().year, BTagWorkingPoint::Medium)
}

pub fn is_tight(mu: &Muon) -> bool {
    if !is_fo(mu) {
        return false;
    }
    match mu.ctx().scheme {
        LeptonIdScheme::TZq => {
            mu.light_vars().lepton_mva_tzq > MVA_CUT_TZQ
        }
        LeptonIdScheme::TTH => {
            mu.light_vars().lepton_mva_tth > MVA_CUT_TTH
        }
        LeptonIdScheme::OldTZq => mu.light_vars().rel_iso_0p3 < 0.12,
    }
}

/// Momentum rescaling towards the embedding jet for FO muons
pub fn cone_correction_factor(mu: &Muon) -> Option<N64> {
    let pt_ratio = mu.light_vars().pt_ratio;
    if pt_ratio <= 0. {
        return None;
    }
    match mu.ctx().scheme {
        LeptonIdScheme::TZq => Some(n64(CONE_FACTOR_TZQ) / pt_ratio),
        LeptonIdScheme::TTH => Some(n64(CONE_FACTOR_TTH) / pt_ratio),
        LeptonIdScheme::OldTZq => None,
    }
}
