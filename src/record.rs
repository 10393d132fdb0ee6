//! Flat-array event records as delivered by the ntuplizer
//!
//! One [EventRecord] is a snapshot of a single tree entry: scalars plus
//! per-object arrays indexed by slot. Records are pure data; all
//! validation happens when an [crate::builder::EventBuilder] turns a
//! record into an [crate::event::Event].

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::year::Year;

/// Run, luminosity-section and event numbers identifying one record
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
pub struct EventTags {
    pub run: u64,
    pub lumi: u64,
    pub event: u64,
}

impl Display for EventTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}

/// A source of event records that can be restarted from the beginning
pub trait Rewind {
    type Error;

    fn rewind(&mut self) -> Result<(), Self::Error>;
}

/// Fallible conversion, used to turn records into events
pub trait TryConvert<From, To> {
    type Error;

    fn try_convert(&mut self, f: From) -> Result<To, Self::Error>;
}

/// Per-slot lepton arrays
///
/// Every array is indexed by lepton slot; all of them must have the
/// same length. Flavor codes follow the ntuplizer convention:
/// 0 = electron, 1 = muon, 2 = tau. Blocks that do not apply to a
/// flavor (e.g. the tau block for muon slots) carry don't-care values.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct LeptonArrays {
    pub flavor: Vec<i32>,
    pub pt: Vec<f64>,
    pub eta: Vec<f64>,
    pub phi: Vec<f64>,
    pub energy: Vec<f64>,
    pub charge: Vec<i32>,
    pub dxy: Vec<f64>,
    pub dz: Vec<f64>,
    pub sip3d: Vec<f64>,
    // light-lepton block
    pub mini_iso: Vec<f64>,
    pub mini_iso_charged: Vec<f64>,
    pub rel_iso_0p3: Vec<f64>,
    pub pt_ratio: Vec<f64>,
    pub pt_rel: Vec<f64>,
    pub closest_jet_deep_flavor: Vec<f64>,
    pub lepton_mva_tzq: Vec<f64>,
    pub lepton_mva_tth: Vec<f64>,
    // muon block
    pub segment_compatibility: Vec<f64>,
    pub inner_track_pt: Vec<f64>,
    pub is_pog_loose: Vec<bool>,
    pub is_pog_medium: Vec<bool>,
    // electron block
    pub missing_hits: Vec<u32>,
    pub passes_conversion_veto: Vec<bool>,
    pub supercluster_eta: Vec<f64>,
    pub mva_fall17_noiso: Vec<f64>,
    pub pt_scale_up: Vec<f64>,
    pub pt_scale_down: Vec<f64>,
    pub pt_res_up: Vec<f64>,
    pub pt_res_down: Vec<f64>,
    // tau block
    pub decay_mode: Vec<i32>,
    pub decay_mode_finding: Vec<bool>,
    pub vsjet_loose: Vec<bool>,
    pub vsjet_tight: Vec<bool>,
    pub vse_loose: Vec<bool>,
    pub vsmu_loose: Vec<bool>,
}

/// One lepton slot in struct form, for producers and tests
#[derive(Clone, Debug, PartialEq)]
pub struct LeptonSlot {
    pub flavor: i32,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub energy: f64,
    pub charge: i32,
    pub dxy: f64,
    pub dz: f64,
    pub sip3d: f64,
    pub mini_iso: f64,
    pub mini_iso_charged: f64,
    pub rel_iso_0p3: f64,
    pub pt_ratio: f64,
    pub pt_rel: f64,
    pub closest_jet_deep_flavor: f64,
    pub lepton_mva_tzq: f64,
    pub lepton_mva_tth: f64,
    pub segment_compatibility: f64,
    pub inner_track_pt: f64,
    pub is_pog_loose: bool,
    pub is_pog_medium: bool,
    pub missing_hits: u32,
    pub passes_conversion_veto: bool,
    pub supercluster_eta: f64,
    pub mva_fall17_noiso: f64,
    pub pt_scale_up: f64,
    pub pt_scale_down: f64,
    pub pt_res_up: f64,
    pub pt_res_down: f64,
    pub decay_mode: i32,
    pub decay_mode_finding: bool,
    pub vsjet_loose: bool,
    pub vsjet_tight: bool,
    pub vse_loose: bool,
    pub vsmu_loose: bool,
}

impl Default for LeptonSlot {
    /// A well-isolated 30 GeV muon
    fn default() -> Self {
        Self {
            flavor: 1,
            pt: 30.,
            eta: 0.1,
            phi: 0.,
            energy: 30. * 0.1f64.cosh(),
            charge: 1,
            dxy: 0.01,
            dz: 0.02,
            sip3d: 1.,
            mini_iso: 0.1,
            mini_iso_charged: 0.05,
            rel_iso_0p3: 0.08,
            pt_ratio: 1.,
            pt_rel: 10.,
            closest_jet_deep_flavor: 0.01,
            lepton_mva_tzq: 0.9,
            lepton_mva_tth: 0.9,
            segment_compatibility: 0.9,
            inner_track_pt: 30.,
            is_pog_loose: true,
            is_pog_medium: true,
            missing_hits: 0,
            passes_conversion_veto: true,
            supercluster_eta: 0.1,
            mva_fall17_noiso: 0.8,
            pt_scale_up: 30.6,
            pt_scale_down: 29.4,
            pt_res_up: 30.3,
            pt_res_down: 29.7,
            decay_mode: 0,
            decay_mode_finding: true,
            vsjet_loose: true,
            vsjet_tight: true,
            vse_loose: true,
            vsmu_loose: true,
        }
    }
}

impl LeptonArrays {
    pub fn len(&self) -> usize {
        self.flavor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flavor.is_empty()
    }

    pub fn push(&mut self, slot: LeptonSlot) {
        self.flavor.push(slot.flavor);
        self.pt.push(slot.pt);
        self.eta.push(slot.eta);
        self.phi.push(slot.phi);
        self.energy.push(slot.energy);
        self.charge.push(slot.charge);
        self.dxy.push(slot.dxy);
        self.dz.push(slot.dz);
        self.sip3d.push(slot.sip3d);
        self.mini_iso.push(slot.mini_iso);
        self.mini_iso_charged.push(slot.mini_iso_charged);
        self.rel_iso_0p3.push(slot.rel_iso_0p3);
        self.pt_ratio.push(slot.pt_ratio);
        self.pt_rel.push(slot.pt_rel);
        self.closest_jet_deep_flavor.push(slot.closest_jet_deep_flavor);
        self.lepton_mva_tzq.push(slot.lepton_mva_tzq);
        self.lepton_mva_tth.push(slot.lepton_mva_tth);
        self.segment_compatibility.push(slot.segment_compatibility);
        self.inner_track_pt.push(slot.inner_track_pt);
        self.is_pog_loose.push(slot.is_pog_loose);
        self.is_pog_medium.push(slot.is_pog_medium);
        self.missing_hits.push(slot.missing_hits);
        self.passes_conversion_veto.push(slot.passes_conversion_veto);
        self.supercluster_eta.push(slot.supercluster_eta);
        self.mva_fall17_noiso.push(slot.mva_fall17_noiso);
        self.pt_scale_up.push(slot.pt_scale_up);
        self.pt_scale_down.push(slot.pt_scale_down);
        self.pt_res_up.push(slot.pt_res_up);
        self.pt_res_down.push(slot.pt_res_down);
        self.decay_mode.push(slot.decay_mode);
        self.decay_mode_finding.push(slot.decay_mode_finding);
        self.vsjet_loose.push(slot.vsjet_loose);
        self.vsjet_tight.push(slot.vsjet_tight);
        self.vse_loose.push(slot.vse_loose);
        self.vsmu_loose.push(slot.vsmu_loose);
    }
}

/// Per-slot jet arrays
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct JetArrays {
    pub pt: Vec<f64>,
    pub eta: Vec<f64>,
    pub phi: Vec<f64>,
    pub energy: Vec<f64>,
    pub deep_csv: Vec<f64>,
    pub deep_flavor: Vec<f64>,
    pub hadron_flavor: Vec<i32>,
    pub tight_id: Vec<bool>,
    pub tight_lepton_veto_id: Vec<bool>,
    pub pt_jec_up: Vec<f64>,
    pub pt_jec_down: Vec<f64>,
    pub pt_jer_up: Vec<f64>,
    pub pt_jer_down: Vec<f64>,
}

/// One jet slot in struct form
#[derive(Clone, Debug, PartialEq)]
pub struct JetSlot {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub energy: f64,
    pub deep_csv: f64,
    pub deep_flavor: f64,
    pub hadron_flavor: i32,
    pub tight_id: bool,
    pub tight_lepton_veto_id: bool,
    pub pt_jec_up: f64,
    pub pt_jec_down: f64,
    pub pt_jer_up: f64,
    pub pt_jer_down: f64,
}

impl Default for JetSlot {
    /// A central 40 GeV light-flavor jet
    fn default() -> Self {
        Self {
            pt: 40.,
            eta: 0.5,
            phi: 1.,
            energy: 40. * 0.5f64.cosh(),
            deep_csv: 0.01,
            deep_flavor: 0.01,
            hadron_flavor: 0,
            tight_id: true,
            tight_lepton_veto_id: true,
            pt_jec_up: 42.,
            pt_jec_down: 38.,
            pt_jer_up: 41.,
            pt_jer_down: 39.,
        }
    }
}

impl JetArrays {
    pub fn len(&self) -> usize {
        self.pt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pt.is_empty()
    }

    pub fn push(&mut self, slot: JetSlot) {
        self.pt.push(slot.pt);
        self.eta.push(slot.eta);
        self.phi.push(slot.phi);
        self.energy.push(slot.energy);
        self.deep_csv.push(slot.deep_csv);
        self.deep_flavor.push(slot.deep_flavor);
        self.hadron_flavor.push(slot.hadron_flavor);
        self.tight_id.push(slot.tight_id);
        self.tight_lepton_veto_id.push(slot.tight_lepton_veto_id);
        self.pt_jec_up.push(slot.pt_jec_up);
        self.pt_jec_down.push(slot.pt_jec_down);
        self.pt_jer_up.push(slot.pt_jer_up);
        self.pt_jer_down.push(slot.pt_jer_down);
    }
}

/// Missing-energy scalars, nominal and varied
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct MetRecord {
    pub pt: f64,
    pub phi: f64,
    pub jec_up_pt: f64,
    pub jec_up_phi: f64,
    pub jec_down_pt: f64,
    pub jec_down_phi: f64,
    pub unclustered_up_pt: f64,
    pub unclustered_up_phi: f64,
    pub unclustered_down_pt: f64,
    pub unclustered_down_phi: f64,
}

impl Default for MetRecord {
    fn default() -> Self {
        Self {
            pt: 0.,
            phi: 0.,
            jec_up_pt: 0.,
            jec_up_phi: 0.,
            jec_down_pt: 0.,
            jec_down_phi: 0.,
            unclustered_up_pt: 0.,
            unclustered_up_phi: 0.,
            unclustered_down_pt: 0.,
            unclustered_down_phi: 0.,
        }
    }
}

/// Per-slot D-meson arrays with flattened constituent tracks
///
/// Track arrays hold the constituents of all candidates back to back;
/// `n_tracks[i]` gives the number belonging to candidate `i`.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct DMesonArrays {
    pub pt: Vec<f64>,
    pub eta: Vec<f64>,
    pub phi: Vec<f64>,
    pub energy: Vec<f64>,
    pub mass: Vec<f64>,
    pub decay_length_significance: Vec<f64>,
    pub n_tracks: Vec<usize>,
    pub track_pt: Vec<f64>,
    pub track_eta: Vec<f64>,
    pub track_phi: Vec<f64>,
    pub track_dxy: Vec<f64>,
    pub track_dz: Vec<f64>,
}

impl DMesonArrays {
    pub fn len(&self) -> usize {
        self.pt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pt.is_empty()
    }
}

/// Generator-level block, present only for simulated records
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct GeneratorArrays {
    pub weight: f64,
    pub n_true_interactions: f64,
    pub scale_weights: Vec<f64>,
    pub pdf_weights: Vec<f64>,
    /// PDG code of the generator particle matched to each lepton slot
    pub lepton_gen_id: Vec<i32>,
    /// PDG code of its mother, 0 if not stored
    pub lepton_mother_id: Vec<i32>,
    pub lepton_is_prompt: Vec<bool>,
}

/// One flat tree entry
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub year: Year,
    pub is_simulation: bool,
    pub tags: EventTags,
    pub leptons: LeptonArrays,
    pub jets: JetArrays,
    pub met: MetRecord,
    pub dmesons: DMesonArrays,
    pub triggers: BTreeMap<String, bool>,
    pub generator: Option<GeneratorArrays>,
}

impl EventRecord {
    /// An empty record for the given sample tags
    pub fn new(year: Year, is_simulation: bool, tags: EventTags) -> Self {
        Self {
            year,
            is_simulation,
            tags,
            leptons: Default::default(),
            jets: Default::default(),
            met: Default::default(),
            dmesons: Default::default(),
            triggers: Default::default(),
            generator: is_simulation.then(GeneratorArrays::default),
        }
    }
}

/// In-memory record source, mainly for tests and embedding
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryRecords {
    records: Vec<EventRecord>,
    pos: usize,
}

impl MemoryRecords {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self { records, pos: 0 }
    }
}

impl Iterator for MemoryRecords {
    type Item = Result<EventRecord, Infallible>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.get(self.pos)?;
        self.pos += 1;
        Some(Ok(record.clone()))
    }
}

impl Rewind for MemoryRecords {
    type Error = Infallible;

    fn rewind(&mut self) -> Result<(), Self::Error> {
        self.pos = 0;
        Ok(())
    }
}
