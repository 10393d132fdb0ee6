use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error requesting a trigger or filter decision that was not recorded
#[derive(Debug, Clone, Error)]
pub struct UnknownTrigger(pub String);

impl Display for UnknownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown trigger or filter: {}", self.0)
    }
}

/// Trigger and event-filter decisions of one event
#[derive(
    Deserialize, Serialize, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct TriggerInfo {
    decisions: BTreeMap<String, bool>,
}

impl TriggerInfo {
    pub fn new(decisions: BTreeMap<String, bool>) -> Self {
        Self { decisions }
    }

    /// The decision recorded under `name`
    ///
    /// Requesting a name that was never recorded is an error, not a
    /// silent `false`.
    pub fn passes(&self, name: &str) -> Result<bool, UnknownTrigger> {
        self.decisions
            .get(name)
            .copied()
            .ok_or_else(|| UnknownTrigger(name.to_owned()))
    }

    /// Whether any recorded decision with the given prefix fired
    pub fn passes_any_with_prefix(&self, prefix: &str) -> bool {
        self.decisions
            .range(prefix.to_owned()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .any(|(_, &fired)| fired)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decisions.keys().map(String::as_str)
    }
}

impl FromIterator<(String, bool)> for TriggerInfo {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self {
            decisions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        let trig: TriggerInfo = [
            ("HLT_IsoMu24".to_string(), true),
            ("HLT_Ele32_WPTight_Gsf".to_string(), false),
            ("Flag_goodVertices".to_string(), true),
        ]
        .into_iter()
        .collect();

        assert!(trig.passes("HLT_IsoMu24").unwrap());
        assert!(!trig.passes("HLT_Ele32_WPTight_Gsf").unwrap());
        assert!(trig.passes("HLT_Mu50").is_err());
        assert!(trig.passes_any_with_prefix("HLT_"));
        assert!(!trig.passes_any_with_prefix("HLT_Ele"));
    }
}
