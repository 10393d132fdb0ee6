use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::year::Year;

/// Named lepton identification scheme
///
/// Exactly one scheme is active per analysis. It is chosen through the
/// [SelectionConfig] passed to event construction, never through global
/// state.
#[derive(
    Deserialize,
    Serialize,
    Display,
    EnumString,
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
#[strum(ascii_case_insensitive)]
pub enum LeptonIdScheme {
    /// MVA-based identification of the tZq analysis
    #[default]
    #[strum(serialize = "tZq")]
    #[serde(rename = "tZq")]
    TZq,
    /// MVA-based identification of the ttH multilepton analysis
    #[strum(serialize = "ttH")]
    #[serde(rename = "ttH")]
    TTH,
    /// Cut-based identification of the early tZq measurement
    #[strum(serialize = "oldtZq")]
    #[serde(rename = "oldtZq")]
    OldTZq,
}

/// Object selection parameters
///
/// Built in code via [SelectionConfigBuilder] or loaded from YAML.
#[derive(Builder, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Active lepton identification scheme
    #[builder(default)]
    pub lepton_id: LeptonIdScheme,
    /// Cone size for removing electrons close to muons
    #[builder(default = "0.05")]
    pub electron_muon_cone: f64,
    /// Cone size for removing taus close to light leptons
    #[builder(default = "0.4")]
    pub tau_light_lepton_cone: f64,
    /// Cone size for removing jets close to leptons
    #[builder(default = "0.4")]
    pub jet_lepton_cone: f64,
    /// Minimum transverse momentum for a good jet
    #[builder(default = "25.")]
    pub jet_min_pt: f64,
    /// Maximum |η| for a good jet
    #[builder(default = "2.4")]
    pub jet_max_abs_eta: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            lepton_id: LeptonIdScheme::default(),
            electron_muon_cone: 0.05,
            tau_light_lepton_cone: 0.4,
            jet_lepton_cone: 0.4,
            jet_min_pt: 25.,
            jet_max_abs_eta: 2.4,
        }
    }
}

impl SelectionConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// The identification context stamped on objects built for `year`
    pub fn id_context(&self, year: Year) -> IdContext {
        IdContext {
            year,
            scheme: self.lepton_id,
        }
    }
}

/// Identification context carried by every analysis object
///
/// Replaces the selector-object-per-lepton pattern: classification is
/// dispatched on this value through pure functions in [crate::selector].
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
pub struct IdContext {
    pub year: Year,
    pub scheme: LeptonIdScheme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let cfg = SelectionConfigBuilder::default().build().unwrap();
        assert_eq!(cfg, SelectionConfig::default());

        let cfg = SelectionConfigBuilder::default()
            .lepton_id(LeptonIdScheme::TTH)
            .jet_min_pt(30.)
            .build()
            .unwrap();
        assert_eq!(cfg.lepton_id, LeptonIdScheme::TTH);
        assert_eq!(cfg.jet_min_pt, 30.);
        assert_eq!(cfg.jet_lepton_cone, 0.4);
    }

    #[test]
    fn yaml_round_trip() {
        let cfg = SelectionConfigBuilder::default()
            .lepton_id(LeptonIdScheme::OldTZq)
            .build()
            .unwrap();
        let yaml = cfg.to_yaml_string().unwrap();
        assert_eq!(SelectionConfig::from_yaml_str(&yaml).unwrap(), cfg);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let cfg = SelectionConfig::from_yaml_str("lepton_id: ttH\n").unwrap();
        assert_eq!(cfg.lepton_id, LeptonIdScheme::TTH);
        assert_eq!(cfg.jet_min_pt, 25.);
    }
}
