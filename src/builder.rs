//! Conversion of flat records into analysis-ready events
//!
//! All construction-time validation lives here: a record with invalid
//! object data is rejected as a whole and no event is built from it.

use noisy_float::prelude::*;
use particle_id::ParticleID;
use thiserror::Error;

use crate::config::{IdContext, SelectionConfig};
use crate::dmeson::{DMeson, DMesonCollection, TooManyTracks, Track};
use crate::electron::Electron;
use crate::event::Event;
use crate::four_momentum::{FourMomentum, KinematicsError};
use crate::generator::{GenMatch, GeneratorInfo};
use crate::jet::{HadronFlavor, InvalidHadronFlavor, Jet};
use crate::jet_collection::JetCollection;
use crate::lepton::{Lepton, LeptonBase, LightLeptonVars};
use crate::lepton_collection::LeptonCollection;
use crate::met::{Met, MetShift};
use crate::muon::Muon;
use crate::record::{
    EventRecord, EventTags, GeneratorArrays, LeptonArrays, TryConvert,
};
use crate::tau::Tau;
use crate::trigger::TriggerInfo;

/// Error building an event from a flat record
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("record {tags}: array {field} has {found} entries, expected {expected}")]
    SlotCountMismatch {
        tags: EventTags,
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("record {tags}: invalid lepton flavor code {code} in slot {slot}")]
    InvalidLeptonFlavor {
        tags: EventTags,
        slot: usize,
        code: i32,
    },
    #[error("record {tags}: jet slot {slot}: {source}")]
    InvalidHadronFlavor {
        tags: EventTags,
        slot: usize,
        source: InvalidHadronFlavor,
    },
    #[error("record {tags}: unphysical momentum in {object} slot {slot}: {source}")]
    Kinematics {
        tags: EventTags,
        object: &'static str,
        slot: usize,
        source: KinematicsError,
    },
    #[error("record {tags}: simulated record without generator block")]
    MissingGeneratorBlock { tags: EventTags },
    #[error("record {tags}: data record carries a generator block")]
    UnexpectedGeneratorBlock { tags: EventTags },
    #[error("record {tags}: D-meson slot {slot}: {source}")]
    Tracks {
        tags: EventTags,
        slot: usize,
        source: TooManyTracks,
    },
}

fn check_len(
    tags: EventTags,
    field: &'static str,
    found: usize,
    expected: usize,
) -> Result<(), BuildError> {
    if found == expected {
        Ok(())
    } else {
        Err(BuildError::SlotCountMismatch {
            tags,
            field,
            expected,
            found,
        })
    }
}

/// Builds one [Event] per [EventRecord]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventBuilder {
    cfg: SelectionConfig,
}

impl EventBuilder {
    pub fn new(cfg: SelectionConfig) -> Self {
        Self { cfg }
    }

    fn build_momentum(
        tags: EventTags,
        object: &'static str,
        slot: usize,
        pt: f64,
        eta: f64,
        phi: f64,
        energy: f64,
    ) -> Result<FourMomentum, BuildError> {
        FourMomentum::from_pt_eta_phi_energy(
            n64(pt),
            n64(eta),
            n64(phi),
            n64(energy),
        )
        .map_err(|source| BuildError::Kinematics {
            tags,
            object,
            slot,
            source,
        })
    }

    fn check_lepton_arrays(
        tags: EventTags,
        leptons: &LeptonArrays,
    ) -> Result<(), BuildError> {
        let n = leptons.len();
        let fields: [(&'static str, usize); 35] = [
            ("lepton pt", leptons.pt.len()),
            ("lepton eta", leptons.eta.len()),
            ("lepton phi", leptons.phi.len()),
            ("lepton energy", leptons.energy.len()),
            ("lepton charge", leptons.charge.len()),
            ("lepton dxy", leptons.dxy.len()),
            ("lepton dz", leptons.dz.len()),
            ("lepton sip3d", leptons.sip3d.len()),
            ("lepton mini_iso", leptons.mini_iso.len()),
            ("lepton mini_iso_charged", leptons.mini_iso_charged.len()),
            ("lepton rel_iso_0p3", leptons.rel_iso_0p3.len()),
            ("lepton pt_ratio", leptons.pt_ratio.len()),
            ("lepton pt_rel", leptons.pt_rel.len()),
            (
                "lepton closest_jet_deep_flavor",
                leptons.closest_jet_deep_flavor.len(),
            ),
            ("lepton lepton_mva_tzq", leptons.lepton_mva_tzq.len()),
            ("lepton lepton_mva_tth", leptons.lepton_mva_tth.len()),
            (
                "lepton segment_compatibility",
                leptons.segment_compatibility.len(),
            ),
            ("lepton inner_track_pt", leptons.inner_track_pt.len()),
            ("lepton is_pog_loose", leptons.is_pog_loose.len()),
            ("lepton is_pog_medium", leptons.is_pog_medium.len()),
            ("lepton missing_hits", leptons.missing_hits.len()),
            (
                "lepton passes_conversion_veto",
                leptons.passes_conversion_veto.len(),
            ),
            ("lepton supercluster_eta", leptons.supercluster_eta.len()),
            ("lepton mva_fall17_noiso", leptons.mva_fall17_noiso.len()),
            ("lepton pt_scale_up", leptons.pt_scale_up.len()),
            ("lepton pt_scale_down", leptons.pt_scale_down.len()),
            ("lepton pt_res_up", leptons.pt_res_up.len()),
            ("lepton pt_res_down", leptons.pt_res_down.len()),
            ("lepton decay_mode", leptons.decay_mode.len()),
            ("lepton decay_mode_finding", leptons.decay_mode_finding.len()),
            ("lepton vsjet_loose", leptons.vsjet_loose.len()),
            ("lepton vsjet_tight", leptons.vsjet_tight.len()),
            ("lepton vse_loose", leptons.vse_loose.len()),
            ("lepton vsmu_loose", leptons.vsmu_loose.len()),
            ("lepton flavor", leptons.flavor.len()),
        ];
        for (field, found) in fields {
            check_len(tags, field, found, n)?;
        }
        Ok(())
    }

    fn gen_match(
        tags: EventTags,
        generator: Option<&GeneratorArrays>,
        n_leptons: usize,
        slot: usize,
    ) -> Result<Option<GenMatch>, BuildError> {
        let Some(generator) = generator else {
            return Ok(None);
        };
        check_len(
            tags,
            "lepton_gen_id",
            generator.lepton_gen_id.len(),
            n_leptons,
        )?;
        check_len(
            tags,
            "lepton_mother_id",
            generator.lepton_mother_id.len(),
            n_leptons,
        )?;
        check_len(
            tags,
            "lepton_is_prompt",
            generator.lepton_is_prompt.len(),
            n_leptons,
        )?;
        let mother = match generator.lepton_mother_id[slot] {
            0 => None,
            id => Some(ParticleID::new(id)),
        };
        Ok(Some(GenMatch {
            id: ParticleID::new(generator.lepton_gen_id[slot]),
            mother_id: mother,
            is_prompt: generator.lepton_is_prompt[slot],
        }))
    }

    fn build_leptons(
        &self,
        record: &EventRecord,
        ctx: IdContext,
    ) -> Result<LeptonCollection, BuildError> {
        let tags = record.tags;
        let leptons = &record.leptons;
        Self::check_lepton_arrays(tags, leptons)?;

        let mut out = Vec::with_capacity(leptons.len());
        for slot in 0..leptons.len() {
            let p4 = Self::build_momentum(
                tags,
                "lepton",
                slot,
                leptons.pt[slot],
                leptons.eta[slot],
                leptons.phi[slot],
                leptons.energy[slot],
            )?;
            let gen_match = Self::gen_match(
                tags,
                record.generator.as_ref(),
                leptons.len(),
                slot,
            )?;
            let base = LeptonBase::new(
                p4,
                leptons.charge[slot] as i8,
                n64(leptons.dxy[slot]),
                n64(leptons.dz[slot]),
                n64(leptons.sip3d[slot]),
                gen_match,
                ctx,
            );
            let light = LightLeptonVars {
                mini_iso: n64(leptons.mini_iso[slot]),
                mini_iso_charged: n64(leptons.mini_iso_charged[slot]),
                rel_iso_0p3: n64(leptons.rel_iso_0p3[slot]),
                pt_ratio: n64(leptons.pt_ratio[slot]),
                pt_rel: n64(leptons.pt_rel[slot]),
                closest_jet_deep_flavor: n64(
                    leptons.closest_jet_deep_flavor[slot],
                ),
                lepton_mva_tzq: n64(leptons.lepton_mva_tzq[slot]),
                lepton_mva_tth: n64(leptons.lepton_mva_tth[slot]),
            };
            let lepton: Lepton = match leptons.flavor[slot] {
                0 => Electron::new(
                    base,
                    light,
                    leptons.missing_hits[slot],
                    leptons.passes_conversion_veto[slot],
                    n64(leptons.supercluster_eta[slot]),
                    n64(leptons.mva_fall17_noiso[slot]),
                    n64(leptons.pt_scale_up[slot]),
                    n64(leptons.pt_scale_down[slot]),
                    n64(leptons.pt_res_up[slot]),
                    n64(leptons.pt_res_down[slot]),
                )
                .into(),
                1 => Muon::new(
                    base,
                    light,
                    n64(leptons.segment_compatibility[slot]),
                    n64(leptons.inner_track_pt[slot]),
                    leptons.is_pog_loose[slot],
                    leptons.is_pog_medium[slot],
                )
                .into(),
                2 => Tau::new(
                    base,
                    leptons.decay_mode[slot],
                    leptons.decay_mode_finding[slot],
                    leptons.vsjet_loose[slot],
                    leptons.vsjet_tight[slot],
                    leptons.vse_loose[slot],
                    leptons.vsmu_loose[slot],
                )
                .into(),
                code => {
                    return Err(BuildError::InvalidLeptonFlavor {
                        tags,
                        slot,
                        code,
                    })
                }
            };
            out.push(lepton);
        }
        Ok(LeptonCollection::new(out))
    }

    fn build_jets(
        &self,
        record: &EventRecord,
        ctx: IdContext,
    ) -> Result<JetCollection, BuildError> {
        let tags = record.tags;
        let jets = &record.jets;
        let n = jets.len();
        let fields: [(&'static str, usize); 12] = [
            ("jet eta", jets.eta.len()),
            ("jet phi", jets.phi.len()),
            ("jet energy", jets.energy.len()),
            ("jet deep_csv", jets.deep_csv.len()),
            ("jet deep_flavor", jets.deep_flavor.len()),
            ("jet hadron_flavor", jets.hadron_flavor.len()),
            ("jet tight_id", jets.tight_id.len()),
            ("jet tight_lepton_veto_id", jets.tight_lepton_veto_id.len()),
            ("jet pt_jec_up", jets.pt_jec_up.len()),
            ("jet pt_jec_down", jets.pt_jec_down.len()),
            ("jet pt_jer_up", jets.pt_jer_up.len()),
            ("jet pt_jer_down", jets.pt_jer_down.len()),
        ];
        for (field, found) in fields {
            check_len(tags, field, found, n)?;
        }

        let mut out = Vec::with_capacity(n);
        for slot in 0..n {
            let p4 = Self::build_momentum(
                tags,
                "jet",
                slot,
                jets.pt[slot],
                jets.eta[slot],
                jets.phi[slot],
                jets.energy[slot],
            )?;
            let hadron_flavor =
                HadronFlavor::try_from(jets.hadron_flavor[slot]).map_err(
                    |source| BuildError::InvalidHadronFlavor {
                        tags,
                        slot,
                        source,
                    },
                )?;
            out.push(Jet::new(
                p4,
                n64(jets.deep_csv[slot]),
                n64(jets.deep_flavor[slot]),
                hadron_flavor,
                jets.tight_id[slot],
                jets.tight_lepton_veto_id[slot],
                n64(jets.pt_jec_up[slot]),
                n64(jets.pt_jec_down[slot]),
                n64(jets.pt_jer_up[slot]),
                n64(jets.pt_jer_down[slot]),
                ctx,
            ));
        }
        Ok(JetCollection::new(out))
    }

    fn build_met(record: &EventRecord) -> Result<Met, BuildError> {
        let met = &record.met;
        let shift = |pt: f64, phi: f64| MetShift {
            pt: n64(pt),
            phi: n64(phi),
        };
        Met::new(
            n64(met.pt),
            n64(met.phi),
            shift(met.jec_up_pt, met.jec_up_phi),
            shift(met.jec_down_pt, met.jec_down_phi),
            shift(met.unclustered_up_pt, met.unclustered_up_phi),
            shift(met.unclustered_down_pt, met.unclustered_down_phi),
        )
        .map_err(|source| BuildError::Kinematics {
            tags: record.tags,
            object: "met",
            slot: 0,
            source,
        })
    }

    fn build_dmesons(
        record: &EventRecord,
    ) -> Result<DMesonCollection, BuildError> {
        let tags = record.tags;
        let mesons = &record.dmesons;
        let n = mesons.len();
        let fields: [(&'static str, usize); 6] = [
            ("dmeson eta", mesons.eta.len()),
            ("dmeson phi", mesons.phi.len()),
            ("dmeson energy", mesons.energy.len()),
            ("dmeson mass", mesons.mass.len()),
            (
                "dmeson decay_length_significance",
                mesons.decay_length_significance.len(),
            ),
            ("dmeson n_tracks", mesons.n_tracks.len()),
        ];
        for (field, found) in fields {
            check_len(tags, field, found, n)?;
        }
        let n_tracks_total: usize = mesons.n_tracks.iter().sum();
        let track_fields: [(&'static str, usize); 5] = [
            ("dmeson track_pt", mesons.track_pt.len()),
            ("dmeson track_eta", mesons.track_eta.len()),
            ("dmeson track_phi", mesons.track_phi.len()),
            ("dmeson track_dxy", mesons.track_dxy.len()),
            ("dmeson track_dz", mesons.track_dz.len()),
        ];
        for (field, found) in track_fields {
            check_len(tags, field, found, n_tracks_total)?;
        }

        let mut out = Vec::with_capacity(n);
        let mut offset = 0;
        for slot in 0..n {
            let p4 = Self::build_momentum(
                tags,
                "dmeson",
                slot,
                mesons.pt[slot],
                mesons.eta[slot],
                mesons.phi[slot],
                mesons.energy[slot],
            )?;
            let tracks = (offset..offset + mesons.n_tracks[slot])
                .map(|t| {
                    Track::new(
                        n64(mesons.track_pt[t]),
                        n64(mesons.track_eta[t]),
                        n64(mesons.track_phi[t]),
                        n64(mesons.track_dxy[t]),
                        n64(mesons.track_dz[t]),
                    )
                })
                .collect();
            offset += mesons.n_tracks[slot];
            let meson = DMeson::new(
                p4,
                n64(mesons.mass[slot]),
                n64(mesons.decay_length_significance[slot]),
                tracks,
            )
            .map_err(|source| BuildError::Tracks { tags, slot, source })?;
            out.push(meson);
        }
        Ok(DMesonCollection::new(out))
    }

    fn build_generator_info(
        record: &EventRecord,
    ) -> Result<Option<GeneratorInfo>, BuildError> {
        match (&record.generator, record.is_simulation) {
            (Some(generator), true) => Ok(Some(GeneratorInfo::new(
                n64(generator.weight),
                n64(generator.n_true_interactions),
                generator.scale_weights.iter().copied().map(n64).collect(),
                generator.pdf_weights.iter().copied().map(n64).collect(),
            ))),
            (None, false) => Ok(None),
            (None, true) => {
                Err(BuildError::MissingGeneratorBlock { tags: record.tags })
            }
            (Some(_), false) => {
                Err(BuildError::UnexpectedGeneratorBlock { tags: record.tags })
            }
        }
    }
}

impl TryConvert<EventRecord, Event> for EventBuilder {
    type Error = BuildError;

    fn try_convert(&mut self, record: EventRecord) -> Result<Event, BuildError> {
        let ctx = self.cfg.id_context(record.year);
        let leptons = self.build_leptons(&record, ctx)?;
        let jets = self.build_jets(&record, ctx)?;
        let met = Self::build_met(&record)?;
        let dmesons = Self::build_dmesons(&record)?;
        let generator = Self::build_generator_info(&record)?;
        let trigger =
            TriggerInfo::new(record.triggers.clone());
        Ok(Event::from_parts(
            self.cfg.clone(),
            record.year,
            record.is_simulation,
            record.tags,
            leptons,
            jets,
            dmesons,
            met,
            trigger,
            generator,
        ))
    }
}
