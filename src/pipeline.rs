//! Record-to-event conversion and parallel event selection

use log::info;
use rayon::prelude::*;
use thiserror::Error;

use crate::builder::{BuildError, EventBuilder};
use crate::event::Event;
use crate::record::{EventRecord, TryConvert};

/// Error turning a record stream into events
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("failed to read event record: {0}")]
    Read(E),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Build all events from a record stream
///
/// Stops at the first read or build error. Records are consumed in
/// stream order and the resulting events keep that order.
pub fn build_events<R, E>(
    records: R,
    builder: &mut EventBuilder,
) -> Result<Vec<Event>, PipelineError<E>>
where
    R: IntoIterator<Item = Result<EventRecord, E>>,
{
    let mut events = Vec::new();
    for record in records {
        let record = record.map_err(PipelineError::Read)?;
        events.push(builder.try_convert(record)?);
    }
    info!("built {} events", events.len());
    Ok(events)
}

/// Run the baseline selection and keep events passing `predicate`
///
/// `remove_taus` is forwarded to the baseline selection. Events are
/// processed in parallel; the surviving events come back in their
/// original order.
pub fn select_events<P>(
    events: Vec<Event>,
    remove_taus: bool,
    predicate: P,
) -> Vec<Event>
where
    P: Fn(&mut Event) -> bool + Sync + Send,
{
    let n_before = events.len();
    let selected: Vec<_> = events
        .into_par_iter()
        .filter_map(|mut event| {
            event.apply_baseline_selection(remove_taus);
            predicate(&mut event).then_some(event)
        })
        .collect();
    info!("selected {} out of {n_before} events", selected.len());
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionConfig;
    use crate::record::{
        EventTags, JetSlot, LeptonSlot, MemoryRecords, Rewind,
    };
    use crate::selector::SelectionTier;
    use crate::year::Year;

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn record_with_muons(event: u64, n_muons: usize) -> EventRecord {
        let tags = EventTags {
            run: 300000,
            lumi: 12,
            event,
        };
        let mut record = EventRecord::new(Year::Run2017, false, tags);
        for i in 0..n_muons {
            record.leptons.push(LeptonSlot {
                pt: 30. + 5. * i as f64,
                charge: if i % 2 == 0 { 1 } else { -1 },
                ..Default::default()
            });
        }
        record.jets.push(JetSlot {
            eta: 2.0,
            ..Default::default()
        });
        record.met.pt = 35.;
        record
    }

    #[test]
    fn end_to_end_selection() {
        log_init();
        let records = MemoryRecords::new(vec![
            record_with_muons(1, 3),
            record_with_muons(2, 1),
            record_with_muons(3, 2),
        ]);
        let mut builder = EventBuilder::new(SelectionConfig::default());
        let events = build_events(records, &mut builder).unwrap();
        assert_eq!(events.len(), 3);

        let dilepton = select_events(events, false, |event| {
            event.leptons().n_passing(SelectionTier::Tight) >= 2
        });
        assert_eq!(dilepton.len(), 2);
        // stream order survives the parallel selection
        assert_eq!(dilepton[0].tags().event, 1);
        assert_eq!(dilepton[1].tags().event, 3);
    }

    #[test]
    fn rewound_source_yields_the_same_events() {
        let mut records = MemoryRecords::new(vec![
            record_with_muons(1, 2),
            record_with_muons(2, 2),
        ]);
        let mut builder = EventBuilder::new(SelectionConfig::default());
        let first = build_events(records.by_ref(), &mut builder).unwrap();
        records.rewind().unwrap();
        let second = build_events(records, &mut builder).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn read_errors_propagate() {
        let records = vec![
            Ok(record_with_muons(1, 1)),
            Err("truncated input"),
        ];
        let mut builder = EventBuilder::new(SelectionConfig::default());
        let res = build_events(records, &mut builder);
        assert!(matches!(res, Err(PipelineError::Read("truncated input"))));
    }
}
