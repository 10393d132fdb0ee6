use std::f64::consts::PI;

use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A four-momentum in collider coordinates
///
/// The Cartesian components are stored as `[E, px, py, pz]`. The
/// transverse momentum, pseudorapidity and azimuthal angle are cached
/// and refreshed on every mutation.
#[derive(
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Clone,
    Copy,
    Default,
)]
pub struct FourMomentum {
    p: [N64; 4],
    pt: N64,
    eta: N64,
    phi: N64,
}

/// Error constructing a four-momentum from unphysical input
#[derive(Debug, Clone, Error)]
pub enum KinematicsError {
    #[error("negative energy: {0}")]
    NegativeEnergy(f64),
    #[error("negative transverse momentum: {0}")]
    NegativePt(f64),
}

impl FourMomentum {
    /// Construct a four-momentum from detector coordinates
    ///
    /// Fails if the energy or the transverse momentum is negative.
    pub fn from_pt_eta_phi_energy(
        pt: N64,
        eta: N64,
        phi: N64,
        energy: N64,
    ) -> Result<Self, KinematicsError> {
        if energy < 0. {
            return Err(KinematicsError::NegativeEnergy(energy.raw()));
        }
        if pt < 0. {
            return Err(KinematicsError::NegativePt(pt.raw()));
        }
        Ok(Self::from_coords(pt, eta, phi, energy))
    }

    /// Like [Self::from_pt_eta_phi_energy], for inputs already known to
    /// be physical
    pub(crate) fn from_coords(pt: N64, eta: N64, phi: N64, energy: N64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        Self::from([energy, px, py, pz])
    }

    /// The energy component
    pub fn energy(&self) -> N64 {
        self.p[0]
    }

    /// The scalar transverse momentum
    pub fn pt(&self) -> N64 {
        self.pt
    }

    /// The pseudorapidity
    ///
    /// Zero for vanishing transverse momentum, matching the convention
    /// for missing transverse energy.
    pub fn eta(&self) -> N64 {
        self.eta
    }

    /// The azimuthal angle in (-π, π]
    pub fn phi(&self) -> N64 {
        self.phi
    }

    pub fn px(&self) -> N64 {
        self.p[1]
    }

    pub fn py(&self) -> N64 {
        self.p[2]
    }

    pub fn pz(&self) -> N64 {
        self.p[3]
    }

    /// The spatial norm \sqrt{\sum p_i^2} with i = 1,2,3
    pub fn spatial_norm(&self) -> N64 {
        self.spatial_norm_sq().sqrt()
    }

    /// The square \sum p_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> N64 {
        self.p.iter().skip(1).map(|e| *e * *e).sum()
    }

    /// The invariant mass square E^2 - \sum p_i^2 with i = 1,2,3
    pub fn m_sq(&self) -> N64 {
        self.p[0] * self.p[0] - self.spatial_norm_sq()
    }

    /// The invariant mass
    ///
    /// The mass square is clamped at zero before taking the root to
    /// absorb rounding below the light cone.
    pub fn m(&self) -> N64 {
        self.m_sq().max(n64(0.)).sqrt()
    }

    /// Pseudorapidity difference to `other`, as a magnitude
    pub fn delta_eta(&self, other: &Self) -> N64 {
        (self.eta - other.eta).abs()
    }

    /// Azimuthal angle difference to `other`, wrapped into (-π, π]
    pub fn delta_phi(&self, other: &Self) -> N64 {
        let mut dphi = self.phi - other.phi;
        if dphi > PI {
            dphi -= n64(2. * PI);
        } else if dphi <= -PI {
            dphi += n64(2. * PI);
        }
        dphi
    }

    /// The angular separation \sqrt{Δη^2 + Δφ^2} to `other`
    pub fn delta_r(&self, other: &Self) -> N64 {
        let deta = self.delta_eta(other);
        let dphi = self.delta_phi(other);
        (deta * deta + dphi * dphi).sqrt()
    }

    /// The transverse mass of the system formed with `other`
    pub fn mt(&self, other: &Self) -> N64 {
        let mt_sq =
            n64(2.) * self.pt * other.pt * (n64(1.) - self.delta_phi(other).cos());
        mt_sq.max(n64(0.)).sqrt()
    }

    /// Rescale all components by `factor`
    pub(crate) fn rescale(&mut self, factor: N64) {
        for c in &mut self.p {
            *c *= factor;
        }
        self.update_cached();
    }

    const fn len() -> usize {
        4
    }

    fn update_cached(&mut self) {
        let [_e, px, py, pz] = self.p;
        self.pt = (px * px + py * py).sqrt();
        if self.pt > 0. {
            self.phi = py.atan2(px);
            self.eta = (pz / self.pt).asinh();
        } else {
            self.phi = n64(0.);
            self.eta = n64(0.);
        }
    }
}

impl std::convert::From<[N64; 4]> for FourMomentum {
    fn from(p: [N64; 4]) -> Self {
        let mut res = FourMomentum {
            p,
            pt: n64(0.),
            eta: n64(0.),
            phi: n64(0.),
        };
        res.update_cached();
        res
    }
}

impl std::ops::Index<usize> for FourMomentum {
    type Output = N64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl std::ops::AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: FourMomentum) {
        for i in 0..Self::len() {
            self.p[i] += rhs[i]
        }
        self.update_cached();
    }
}

impl std::ops::SubAssign for FourMomentum {
    fn sub_assign(&mut self, rhs: FourMomentum) {
        for i in 0..Self::len() {
            self.p[i] -= rhs[i]
        }
        self.update_cached();
    }
}

impl std::ops::Add for FourMomentum {
    type Output = Self;

    fn add(mut self, rhs: FourMomentum) -> Self::Output {
        self += rhs;
        self
    }
}

impl std::ops::Sub for FourMomentum {
    type Output = Self;

    fn sub(mut self, rhs: FourMomentum) -> Self::Output {
        self -= rhs;
        self
    }
}

impl std::ops::Neg for FourMomentum {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        for c in &mut self.p {
            *c = -*c;
        }
        self.update_cached();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: N64, b: f64) -> bool {
        (a - n64(b)).abs() < 1e-9
    }

    #[test]
    fn coordinate_round_trip() {
        let p = FourMomentum::from_pt_eta_phi_energy(
            n64(30.),
            n64(1.2),
            n64(-0.7),
            n64(60.),
        )
        .unwrap();
        assert!(close(p.pt(), 30.));
        assert!(close(p.eta(), 1.2));
        assert!(close(p.phi(), -0.7));
        assert!(close(p.energy(), 60.));
    }

    #[test]
    fn unphysical_input_rejected() {
        let bad = FourMomentum::from_pt_eta_phi_energy(
            n64(30.),
            n64(0.),
            n64(0.),
            n64(-1.),
        );
        assert!(matches!(bad, Err(KinematicsError::NegativeEnergy(_))));
        let bad = FourMomentum::from_pt_eta_phi_energy(
            n64(-5.),
            n64(0.),
            n64(0.),
            n64(1.),
        );
        assert!(matches!(bad, Err(KinematicsError::NegativePt(_))));
    }

    #[test]
    fn delta_phi_wraps() {
        let a = FourMomentum::from_pt_eta_phi_energy(
            n64(10.),
            n64(0.),
            n64(3.0),
            n64(10.),
        )
        .unwrap();
        let b = FourMomentum::from_pt_eta_phi_energy(
            n64(10.),
            n64(0.),
            n64(-3.0),
            n64(10.),
        )
        .unwrap();
        // going the short way around the circle, with the sign of the
        // direction
        assert!(close(a.delta_phi(&b), 6.0 - 2. * PI));
        assert!(close(b.delta_phi(&a), 2. * PI - 6.0));
        assert!(close(a.delta_r(&b), 2. * PI - 6.0));
    }

    #[test]
    fn invariant_mass_of_pair() {
        // back-to-back massless pair: m = 2 pt
        let a = FourMomentum::from_pt_eta_phi_energy(
            n64(45.),
            n64(0.),
            n64(0.),
            n64(45.),
        )
        .unwrap();
        let b = FourMomentum::from_pt_eta_phi_energy(
            n64(45.),
            n64(0.),
            n64(PI),
            n64(45.),
        )
        .unwrap();
        assert!(close((a + b).m(), 90.));
    }

    #[test]
    fn transverse_mass() {
        let a = FourMomentum::from_pt_eta_phi_energy(
            n64(40.),
            n64(1.5),
            n64(0.),
            n64(100.),
        )
        .unwrap();
        let b = FourMomentum::from_pt_eta_phi_energy(
            n64(40.),
            n64(0.),
            n64(PI),
            n64(40.),
        )
        .unwrap();
        // maximal opening angle: mt = 2 pt
        assert!(close(a.mt(&b), 80.));
        // mt is symmetric and does not depend on pseudorapidity
        assert!((a.mt(&b) - b.mt(&a)).abs() < 1e-9);
    }
}
