use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Data-taking period
///
/// Stamped on every analysis object at construction and never changed
/// afterwards. The 2016 dataset is split at the VFP transition.
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
pub enum Year {
    #[serde(rename = "2016PreVFP")]
    #[strum(serialize = "2016PreVFP")]
    Run2016PreVFP,
    #[serde(rename = "2016PostVFP")]
    #[strum(serialize = "2016PostVFP")]
    Run2016PostVFP,
    #[serde(rename = "2017")]
    #[strum(serialize = "2017")]
    Run2017,
    #[serde(rename = "2018")]
    #[strum(serialize = "2018")]
    Run2018,
}

impl Year {
    pub fn is_2016(self) -> bool {
        matches!(self, Self::Run2016PreVFP | Self::Run2016PostVFP)
    }

    pub fn is_2017(self) -> bool {
        self == Self::Run2017
    }

    pub fn is_2018(self) -> bool {
        self == Self::Run2018
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn string_round_trip() {
        for year in [
            Year::Run2016PreVFP,
            Year::Run2016PostVFP,
            Year::Run2017,
            Year::Run2018,
        ] {
            assert_eq!(Year::from_str(&year.to_string()).unwrap(), year);
        }
        assert!(Year::from_str("2015").is_err());
    }
}
