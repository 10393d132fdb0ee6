//! Electron identification tiers

use noisy_float::prelude::*;

use crate::config::LeptonIdScheme;
use crate::electron::Electron;
use crate::lepton::LeptonLike;
use crate::selector::jet::{deep_flavor_wp, BTagWorkingPoint};
use crate::selector::slide_cut;
use crate::year::Year;

const MIN_PT: f64 = 7.;
const MAX_ABS_ETA: f64 = 2.5;
const MAX_ABS_DXY: f64 = 0.05;
const MAX_ABS_DZ: f64 = 0.1;
const MAX_SIP3D: f64 = 8.;
const MAX_MINI_ISO: f64 = 0.4;
const MAX_MISSING_HITS_LOOSE: u32 = 1;

/// Tight lepton-MVA threshold of the tZq scheme
pub const MVA_CUT_TZQ: f64 = 0.4;
/// Tight lepton-MVA threshold of the ttH scheme
pub const MVA_CUT_TTH: f64 = 0.8;

const FO_PT_RATIO_TZQ: f64 = 0.4;
const FO_PT_RATIO_TTH: f64 = 0.7;

const CONE_FACTOR_TZQ: f64 = 0.67;
const CONE_FACTOR_TTH: f64 = 0.9;

pub fn is_loose(el: &Electron) -> bool {
    is_loose_base(el)
        && match el.ctx().year {
            Year::Run2016PreVFP | Year::Run2016PostVFP => is_loose_2016(el),
            Year::Run2017 => is_loose_2017(el),
            Year::Run2018 => is_loose_2018(el),
        }
}

fn is_loose_base(el: &Electron) -> bool {
    el.pt() > MIN_PT
        && el.eta().abs() < MAX_ABS_ETA
        && el.base().dxy().abs() < MAX_ABS_DXY
        && el.base().dz().abs() < MAX_ABS_DZ
        && el.base().sip3d() < MAX_SIP3D
        && el.light_vars().mini_iso < MAX_MINI_ISO
        && el.missing_hits() <= MAX_MISSING_HITS_LOOSE
}

fn is_loose_2016(_el: &Electron) -> bool {
    true
}

fn is_loose_2017(_el: &Electron) -> bool {
    true
}

fn is_loose_2018(_el: &Electron) -> bool {
    true
}

pub fn is_fo(el: &Electron) -> bool {
    if !is_loose(el) {
        return false;
    }
    if el.missing_hits() != 0 || !el.passes_conversion_veto() {
        return false;
    }
    match el.ctx().scheme {
        LeptonIdScheme::TZq => is_fo_tzq(el),
        LeptonIdScheme::TTH => is_fo_tth(el),
        LeptonIdScheme::OldTZq => is_fo_old_tzq(el),
    }
}

fn interpolated_deep_flavor_cut(pt: N64, year: Year) -> N64 {
    slide_cut(
        pt,
        (n64(20.), deep_flavor_wp(year, BTagWorkingPoint::Medium)),
        (n64(45.), deep_flavor_wp(year, BTagWorkingPoint::Loose)),
    )
}

/// Fall17 no-iso MVA floor, binned in supercluster |η|
fn fall17_floor(supercluster_eta: N64) -> N64 {
    let abs_eta = supercluster_eta.abs();
    if abs_eta < 0.8 {
        n64(0.05)
    } else if abs_eta < 1.479 {
        n64(0.0)
    } else {
        n64(-0.35)
    }
}

fn is_fo_tzq(el: &Electron) -> bool {
    if el.light_vars().lepton_mva_tzq > MVA_CUT_TZQ {
        return true;
    }
    el.mva_fall17_noiso() > fall17_floor(el.supercluster_eta())
        && el.light_vars().pt_ratio > FO_PT_RATIO_TZQ
        && el.light_vars().closest_jet_deep_flavor
            < interpolated_deep_flavor_cut(el.pt(), el.ctx().year)
}

fn is_fo_tth(el: &Electron) -> bool {
    if el.light_vars().lepton_mva_tth > MVA_CUT_TTH {
        return true;
    }
    el.mva_fall17_noiso() > fall17_floor(el.supercluster_eta())
        && el.light_vars().pt_ratio > FO_PT_RATIO_TTH
        && el.light_vars().closest_jet_deep_flavor
            < interpolated_deep_flavor_cut(el.pt(), el.ctx().year)
}

fn is_fo_old_tzq(el: &Electron) -> bool {
    el.pt() > 10.
        && el.light_vars().closest_jet_deep_flavor
            < deep_flavor_wp(el.ctx().year, BTagWorkingPoint::Medium)
}

pub fn is_tight(el: &Electron) -> bool {
    if !is_fo(el) {
        return false;
    }
    match el.ctx().scheme {
        LeptonIdScheme::TZq => {
            el.light_vars().lepton_mva_tzq > MVA_CUT_TZQ
                && el.light_vars().closest_jet_deep_flavor
                    < deep_flavor_wp(el.ctx().year, BTagWorkingPoint::Medium)
        }
        LeptonIdScheme::TTH => {
            el.light_vars().lepton_mva_tth > MVA_CUT_TTH
        }
        LeptonIdScheme::OldTZq => el.light_vars().rel_iso_0p3 < 0.1,
    }
}

/// Momentum rescaling towards the embedding jet for FO electrons
pub fn cone_correction_factor(el: &Electron) -> Option<N64> {
    let pt_ratio = el.light_vars().pt_ratio;
    if pt_ratio <= 0. {
        return None;
    }
    match el.ctx().scheme {
        LeptonIdScheme::TZq => Some(n64(CONE_FACTOR_TZQ) / pt_ratio),
        LeptonIdScheme::TTH => Some(n64(CONE_FACTOR_TTH) / pt_ratio),
        LeptonIdScheme::OldTZq => None,
    }
}
