pub use crate::{
    builder::EventBuilder,
    config::{LeptonIdScheme, SelectionConfig, SelectionConfigBuilder},
    event::{Event, ZCandidate},
    lepton::{Lepton, LeptonLike},
    pipeline::{build_events, select_events},
    record::{EventRecord, MemoryRecords, Rewind, TryConvert},
    selector::SelectionTier,
    year::Year,
};
