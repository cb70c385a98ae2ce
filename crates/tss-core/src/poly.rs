//! Polynomial evaluation and Lagrange interpolation over secp256k1

use std::collections::BTreeSet;

use crate::primitives::{GroupElement, Scalar};
use crate::{Error, MemberId, Result};

/// `c_0 + c_1 x + ... + c_{t-1} x^{t-1}` by Horner's rule
pub fn evaluate_scalar_polynomial(coeffs: &[Scalar], x: &Scalar) -> Scalar {
    coeffs
        .iter()
        .rev()
        .fold(Scalar::ZERO, |acc, c| acc * *x + *c)
}

/// Same as [`evaluate_scalar_polynomial`] with coefficients in the group
pub fn evaluate_point_polynomial<P: GroupElement>(coeffs: &[P], x: &P::Scalar) -> P {
    coeffs
        .iter()
        .rev()
        .fold(P::identity(), |acc, c| acc.scalar_mul(x).add(c))
}

pub fn sum_scalars(scalars: &[Scalar]) -> Scalar {
    scalars.iter().sum()
}

pub fn sum_points<P: GroupElement>(points: &[P]) -> P {
    points.iter().fold(P::identity(), |acc, p| acc.add(p))
}

/// Lagrange coefficient of `mid` at zero over `members`:
/// `prod_{j != mid} j / (j - mid)`
pub fn lagrange_coefficient(mid: MemberId, members: &[MemberId]) -> Result<Scalar> {
    let mut seen = BTreeSet::new();
    for id in members {
        if !seen.insert(*id) {
            return Err(Error::DuplicateMember(*id));
        }
    }
    if !seen.contains(&mid) {
        return Err(Error::MemberNotFound(mid));
    }

    let i = mid.to_scalar();
    let (num, den) = members
        .iter()
        .filter(|j| **j != mid)
        .fold((Scalar::ONE, Scalar::ONE), |(num, den), j| {
            let j = j.to_scalar();
            (num * j, den * (j - i))
        });

    Ok(num * den.invert()?)
}
