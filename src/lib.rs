//! `evsel` is the event object model and selection layer for collider
//! ntuple analyses with multiple leptons in the final state.
//!
//! Flat per-object arrays read from an ntuple ([record]) are validated
//! and turned into [event::Event]s holding typed physics objects. The
//! events support the standard object-level preparation (lepton
//! identification tiers, overlap removal, cone correction, good-jet
//! selection) and derived quantities like the Z-boson candidate.
//!
//! # How to use
//!
//! ## Most relevant modules
//!
//! - [prelude] exports the most relevant types and functions
//! - [record] defines the flat input records and record sources
//! - [builder] turns records into events
//! - [event] for the analysis-level event
//! - [selector] for the lepton, jet and b-tag classification rules
//! - [config] for the selection configuration
//! - [pipeline] for bulk conversion and parallel selection
//!

/// Conversion of flat records into events
pub mod builder;
/// Analysis region flattening
pub mod categorization;
/// Selection configuration
pub mod config;
/// D-meson candidates
pub mod dmeson;
/// Electron class
pub mod electron;
/// Analysis-level event class
pub mod event;
/// Four-momentum class
pub mod four_momentum;
/// Generator-level information
pub mod generator;
/// Jet class
pub mod jet;
/// Jet container
pub mod jet_collection;
/// Common lepton interface
pub mod lepton;
/// Lepton container
pub mod lepton_collection;
/// Missing transverse energy
pub mod met;
/// Muon class
pub mod muon;
/// Record-to-event pipeline
pub mod pipeline;
/// Most important exports
pub mod prelude;
/// Flat input records
pub mod record;
/// Object classification rules
pub mod selector;
/// Tau class
pub mod tau;
/// Trigger decisions
pub mod trigger;
/// Data-taking periods
pub mod year;

#[cfg(test)]
mod testutil;

use lazy_static::lazy_static;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
lazy_static! {
    pub static ref VERSION_MAJOR: u32 =
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap();
    pub static ref VERSION_MINOR: u32 =
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap();
    pub static ref VERSION_PATCH: u32 =
        env!("CARGO_PKG_VERSION_PATCH").parse().unwrap();
}
