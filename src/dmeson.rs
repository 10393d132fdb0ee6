use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::four_momentum::FourMomentum;

const PION_MASS: f64 = 0.13957;

/// Nominal D0 mass in GeV
pub const D0_MASS: f64 = 1.86484;

const MASS_WINDOW: f64 = 0.05;
const MIN_DECAY_LENGTH_SIG: f64 = 3.;
const MIN_TRACK_PT: f64 = 1.;
const MAX_TRACKS: usize = 3;

/// Error building a D-meson candidate with too many constituent tracks
#[derive(Debug, Clone, Error)]
#[error("D-meson candidate with {0} tracks, at most {MAX_TRACKS} supported")]
pub struct TooManyTracks(pub usize);

/// Charged track used as a D-meson constituent
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct Track {
    p4: FourMomentum,
    dxy: N64,
    dz: N64,
}

impl Track {
    /// Construct from track kinematics, assigning the pion mass
    pub fn new(pt: N64, eta: N64, phi: N64, dxy: N64, dz: N64) -> Self {
        let p = pt * eta.cosh();
        let energy = (p * p + n64(PION_MASS * PION_MASS)).sqrt();
        Self {
            p4: FourMomentum::from_coords(pt, eta, phi, energy),
            dxy,
            dz,
        }
    }

    pub fn momentum(&self) -> &FourMomentum {
        &self.p4
    }

    pub fn pt(&self) -> N64 {
        self.p4.pt()
    }

    pub fn dxy(&self) -> N64 {
        self.dxy
    }

    pub fn dz(&self) -> N64 {
        self.dz
    }
}

/// A D-meson candidate
///
/// Owns its constituent tracks exclusively; their lifetime is tied to
/// the candidate.
#[derive(
    Deserialize, Serialize, Clone, Debug, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct DMeson {
    p4: FourMomentum,
    mass: N64,
    decay_length_significance: N64,
    tracks: Vec<Track>,
}

impl DMeson {
    pub(crate) fn new(
        p4: FourMomentum,
        mass: N64,
        decay_length_significance: N64,
        tracks: Vec<Track>,
    ) -> Result<Self, TooManyTracks> {
        if tracks.len() > MAX_TRACKS {
            return Err(TooManyTracks(tracks.len()));
        }
        Ok(Self {
            p4,
            mass,
            decay_length_significance,
            tracks,
        })
    }

    pub fn momentum(&self) -> &FourMomentum {
        &self.p4
    }

    pub fn pt(&self) -> N64 {
        self.p4.pt()
    }

    /// The fitted candidate mass
    pub fn mass(&self) -> N64 {
        self.mass
    }

    pub fn decay_length_significance(&self) -> N64 {
        self.decay_length_significance
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Mass-window, displacement and track-quality selection
    pub fn is_good(&self) -> bool {
        (self.mass - D0_MASS).abs() < MASS_WINDOW
            && self.decay_length_significance > MIN_DECAY_LENGTH_SIG
            && self.tracks.iter().all(|t| t.pt() > MIN_TRACK_PT)
    }
}

/// Ordered container of D-meson candidates
#[derive(
    Deserialize, Serialize, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct DMesonCollection {
    mesons: Vec<DMeson>,
}

impl DMesonCollection {
    pub fn new(mesons: Vec<DMeson>) -> Self {
        Self { mesons }
    }

    pub fn len(&self) -> usize {
        self.mesons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesons.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DMeson> {
        self.mesons.iter()
    }

    /// Keep only good candidates, preserving relative order
    pub fn select_good(&mut self) {
        self.mesons.retain(DMeson::is_good);
    }
}

impl<'a> IntoIterator for &'a DMesonCollection {
    type Item = &'a DMeson;
    type IntoIter = std::slice::Iter<'a, DMeson>;

    fn into_iter(self) -> Self::IntoIter {
        self.mesons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mass: f64, sig: f64, track_pts: &[f64]) -> DMeson {
        let tracks = track_pts
            .iter()
            .map(|&pt| {
                Track::new(n64(pt), n64(0.1), n64(0.2), n64(0.01), n64(0.02))
            })
            .collect();
        let p4 = FourMomentum::from_coords(
            n64(20.),
            n64(0.5),
            n64(1.),
            n64(25.),
        );
        DMeson::new(p4, n64(mass), n64(sig), tracks).unwrap()
    }

    #[test]
    fn track_limit() {
        let tracks = vec![
            Track::new(n64(2.), n64(0.), n64(0.), n64(0.), n64(0.));
            4
        ];
        let p4 =
            FourMomentum::from_coords(n64(20.), n64(0.), n64(0.), n64(25.));
        let res = DMeson::new(p4, n64(D0_MASS), n64(5.), tracks);
        assert!(matches!(res, Err(TooManyTracks(4))));
    }

    #[test]
    fn good_candidate_selection() {
        let mut coll = DMesonCollection::new(vec![
            candidate(D0_MASS, 5., &[2., 3.]),
            candidate(D0_MASS + 0.2, 5., &[2., 3.]),
            candidate(D0_MASS, 1., &[2., 3.]),
            candidate(D0_MASS, 5., &[0.5, 3.]),
        ]);
        coll.select_good();
        assert_eq!(coll.len(), 1);
        assert!(coll.iter().all(DMeson::is_good));
    }
}
