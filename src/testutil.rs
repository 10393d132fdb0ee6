//! Synthetic objects for unit tests

use noisy_float::prelude::*;

use crate::config::{IdContext, LeptonIdScheme, SelectionConfig, SelectionConfigBuilder};
use crate::electron::Electron;
use crate::four_momentum::FourMomentum;
use crate::jet::{HadronFlavor, Jet};
use crate::lepton::{LeptonBase, LightLeptonVars};
use crate::met::{Met, MetShift};
use crate::muon::Muon;
use crate::tau::Tau;
use crate::year::Year;

pub fn test_ctx() -> IdContext {
    IdContext {
        year: Year::Run2018,
        scheme: LeptonIdScheme::TZq,
    }
}

pub fn default_cfg() -> SelectionConfig {
    SelectionConfig::default()
}

pub fn jet_cfg_with_min_pt(min_pt: f64) -> SelectionConfig {
    SelectionConfigBuilder::default()
        .jet_min_pt(min_pt)
        .build()
        .unwrap()
}

fn base_at(pt: f64, eta: f64, phi: f64, charge: i8) -> LeptonBase {
    let p4 = FourMomentum::from_pt_eta_phi_energy(
        n64(pt),
        n64(eta),
        n64(phi),
        n64(pt) * n64(eta).cosh(),
    )
    .unwrap();
    LeptonBase::new(
        p4,
        charge,
        n64(0.01),
        n64(0.02),
        n64(1.),
        None,
        test_ctx(),
    )
}

fn light_vars(mva_tzq: f64, pt_ratio: f64, deep_flavor: f64) -> LightLeptonVars {
    LightLeptonVars {
        mini_iso: n64(0.1),
        mini_iso_charged: n64(0.05),
        rel_iso_0p3: n64(0.08),
        pt_ratio: n64(pt_ratio),
        pt_rel: n64(10.),
        closest_jet_deep_flavor: n64(deep_flavor),
        lepton_mva_tzq: n64(mva_tzq),
        lepton_mva_tth: n64(mva_tzq),
    }
}

fn muon_with(
    pt: f64,
    eta: f64,
    phi: f64,
    charge: i8,
    vars: LightLeptonVars,
) -> Muon {
    Muon::new(
        base_at(pt, eta, phi, charge),
        vars,
        n64(0.9),
        n64(pt),
        true,
        true,
    )
}

/// Muon passing the tight tZq selection
pub fn tight_muon(pt: f64, eta: f64, phi: f64, charge: i8) -> Muon {
    muon_with(pt, eta, phi, charge, light_vars(0.9, 1.0, 0.01))
}

/// Muon passing FO but failing the tight MVA cut
pub fn fo_muon(pt: f64, eta: f64, phi: f64, charge: i8) -> Muon {
    muon_with(pt, eta, phi, charge, light_vars(-0.5, 0.8, 0.0))
}

/// Muon passing only the loose selection
pub fn loose_only_muon(pt: f64, eta: f64, phi: f64, charge: i8) -> Muon {
    muon_with(pt, eta, phi, charge, light_vars(-0.5, 0.2, 0.9))
}

fn electron_with(
    pt: f64,
    eta: f64,
    phi: f64,
    charge: i8,
    vars: LightLeptonVars,
) -> Electron {
    Electron::new(
        base_at(pt, eta, phi, charge),
        vars,
        0,
        true,
        n64(eta),
        n64(0.8),
        n64(pt * 1.02),
        n64(pt * 0.98),
        n64(pt * 1.01),
        n64(pt * 0.99),
    )
}

/// Electron passing the tight tZq selection
pub fn tight_electron(pt: f64, eta: f64, phi: f64, charge: i8) -> Electron {
    electron_with(pt, eta, phi, charge, light_vars(0.9, 1.0, 0.01))
}

/// Electron passing FO but failing the tight MVA cut
pub fn fo_electron(pt: f64, eta: f64, phi: f64, charge: i8) -> Electron {
    electron_with(pt, eta, phi, charge, light_vars(-0.5, 0.8, 0.0))
}

/// Electron passing only the loose selection
pub fn loose_only_electron(pt: f64, eta: f64, phi: f64, charge: i8) -> Electron {
    electron_with(pt, eta, phi, charge, light_vars(-0.5, 0.2, 0.9))
}

/// Tau passing the tight DeepTau selection
pub fn tight_tau(pt: f64, eta: f64, phi: f64, charge: i8) -> Tau {
    Tau::new(base_at(pt, eta, phi, charge), 0, true, true, true, true, true)
}

/// Tau passing FO but not the tight VSjet working point
pub fn fo_tau(pt: f64, eta: f64, phi: f64, charge: i8) -> Tau {
    Tau::new(base_at(pt, eta, phi, charge), 0, true, true, false, true, true)
}

/// Light-flavor jet with default-good identification
pub fn jet_at(pt: f64, eta: f64, phi: f64) -> Jet {
    jet_with_flavor(pt, eta, phi, 0.01, HadronFlavor::Light)
}

/// b-tagged jet
pub fn bjet_at(pt: f64, eta: f64, phi: f64) -> Jet {
    jet_with_flavor(pt, eta, phi, 0.9, HadronFlavor::Bottom)
}

fn jet_with_flavor(
    pt: f64,
    eta: f64,
    phi: f64,
    deep_flavor: f64,
    flavor: HadronFlavor,
) -> Jet {
    let p4 = FourMomentum::from_pt_eta_phi_energy(
        n64(pt),
        n64(eta),
        n64(phi),
        n64(pt) * n64(eta).cosh(),
    )
    .unwrap();
    Jet::new(
        p4,
        n64(deep_flavor),
        n64(deep_flavor),
        flavor,
        true,
        true,
        n64(pt * 1.05),
        n64(pt * 0.95),
        n64(pt * 1.02),
        n64(pt * 0.98),
        test_ctx(),
    )
}

pub fn met_at(pt: f64, phi: f64) -> Met {
    let shift = |pt: f64, phi: f64| MetShift {
        pt: n64(pt),
        phi: n64(phi),
    };
    Met::new(
        n64(pt),
        n64(phi),
        shift(pt * 1.1, phi),
        shift(pt * 0.9, phi),
        shift(pt * 1.05, phi),
        shift(pt * 0.95, phi),
    )
    .unwrap()
}
