//! Momentum sums and derived kinematic quantities

use serde::Serialize;

/// Vector sum of three-momenta
pub fn sum_momenta<'a, I>(momenta: I) -> [f64; 3]
where
    I: IntoIterator<Item = &'a [f64; 3]>,
{
    let mut sum = [0.; 3];
    for p in momenta {
        for (s, p) in sum.iter_mut().zip(p) {
            *s += p;
        }
    }
    sum
}

/// Kinematic quantities derived from a three-momentum
///
/// No attempt is made to guard against a vanishing momentum: for a null
/// vector the pseudorapidity is `atanh(0/0)`, i.e. NaN.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize)]
pub struct Kinematics {
    /// Longitudinal momentum
    pub pl: f64,
    /// Transverse momentum
    pub pt: f64,
    /// Momentum magnitude
    pub p: f64,
    /// Pseudorapidity
    pub eta: f64,
}

impl From<[f64; 3]> for Kinematics {
    fn from(p: [f64; 3]) -> Self {
        let [px, py, pz] = p;
        let pt = px.hypot(py);
        let mag = (px * px + py * py + pz * pz).sqrt();
        Self {
            pl: pz,
            pt,
            p: mag,
            eta: (pz / mag).atanh(),
        }
    }
}

pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Unit vector along `p`
pub fn normalize(p: [f64; 3]) -> [f64; 3] {
    let norm = dot(&p, &p).sqrt();
    p.map(|c| c / norm)
}

/// Opening angle between two unit vectors
pub fn angle_between(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    // rounding can push the dot product of parallel vectors above one
    dot(a, b).clamp(-1., 1.).acos()
}

/// Pseudorapidity of a track with dip angle tangent `tan_lambda`
pub fn track_eta(tan_lambda: f64) -> f64 {
    -((1. + tan_lambda * tan_lambda).sqrt() - tan_lambda).ln()
}

/// Unit momentum direction of a track
pub fn track_direction(phi: f64, tan_lambda: f64) -> [f64; 3] {
    let lambda = tan_lambda.atan();
    [
        phi.cos() * lambda.cos(),
        phi.sin() * lambda.cos(),
        lambda.sin(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn closed_form() {
        let p = [3., 4., 12.];
        let k = Kinematics::from(p);
        assert_relative_eq!(k.pl, 12.);
        assert_relative_eq!(k.pt, 5.);
        assert_relative_eq!(k.p, 13.);
        // η = -ln tan(θ/2) with cos θ = 12/13
        let theta = (12f64 / 13.).acos();
        assert_relative_eq!(k.eta, -(theta / 2.).tan().ln(), epsilon = 1e-12);
    }

    #[test]
    fn sum_is_order_independent() {
        let momenta = [[1., -2., 0.5], [0.25, 3., -7.], [-4., 0., 2.]];
        let fwd = sum_momenta(&momenta);
        let rev = sum_momenta(momenta.iter().rev());
        assert_eq!(fwd, [-2.75, 1., -4.5]);
        for (f, r) in fwd.iter().zip(rev.iter()) {
            assert_relative_eq!(*f, *r);
        }
    }

    #[test]
    fn null_vector() {
        let none: [[f64; 3]; 0] = [];
        let k = Kinematics::from(sum_momenta(&none));
        assert_eq!(k.p, 0.);
        assert_eq!(k.pt, 0.);
        assert!(k.eta.is_nan());
    }

    #[test]
    fn track_geometry() {
        assert_relative_eq!(track_eta(0.), 0.);
        // tan λ = sinh η
        let eta = 1.3f64;
        assert_relative_eq!(track_eta(eta.sinh()), eta, epsilon = 1e-12);

        let dir = track_direction(0.3, eta.sinh());
        assert_relative_eq!(dot(&dir, &dir), 1., epsilon = 1e-12);
        assert_relative_eq!(dir[2].atanh(), eta, epsilon = 1e-12);
    }

    #[test]
    fn angles() {
        let a = normalize([1., 1., 0.]);
        let b = normalize([1., 0., 0.]);
        assert_relative_eq!(
            angle_between(&a, &b),
            std::f64::consts::FRAC_PI_4,
            epsilon = 1e-12
        );
        assert!(angle_between(&a, &a) < 1e-7);
    }
}
