//! Schnorr signatures with an optional custom generator and Lagrange weight
//!
//! `R = k*G`, `s = k + c*lambda*x`, verified as `s*P == R + c*lambda*Y`
//! where `P` defaults to the curve generator and `lambda` to one.

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::hash::Suite;
use crate::primitives::{Point, PrivateKey, Scalar, Signature};
use crate::{Error, Result};

/// Sign a precomputed challenge with the given nonce
pub fn sign(
    secret: &Scalar,
    challenge: &Scalar,
    nonce: &Scalar,
    lagrange: Option<&Scalar>,
) -> Result<Signature> {
    if nonce.is_zero() {
        return Err(Error::PrivateKeyZero);
    }
    let r = Point::mul_base(nonce).ensure_not_identity()?;
    let lambda = lagrange.copied().unwrap_or(Scalar::ONE);
    let s = *nonce + *challenge * lambda * *secret;
    Ok(Signature::new(r, s))
}

/// Check `s*P == R + c*lambda*Y`
pub fn verify(
    r: &Point,
    s: &Scalar,
    challenge: &Scalar,
    public_key: &Point,
    generator: Option<&Point>,
    lagrange: Option<&Scalar>,
) -> Result<()> {
    let generator = generator.copied().unwrap_or(Point::GENERATOR);
    let lambda = lagrange.copied().unwrap_or(Scalar::ONE);

    let lhs = generator * *s;
    let rhs = *r + *public_key * (*challenge * lambda);
    if lhs.is_identity() || lhs != rhs {
        return Err(Error::InvalidSignature);
    }
    Ok(())
}

/// Derive a fresh nonce from randomness and the signing secret
pub fn generate_nonce(
    suite: &Suite,
    secret: &Scalar,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Scalar> {
    let mut random = [0u8; 32];
    loop {
        rng.try_fill_bytes(&mut random)?;
        match suite.hash_nonce(&random, secret) {
            Ok(nonce) if !nonce.is_zero() => {
                random.zeroize();
                return Ok(nonce);
            }
            Ok(_) | Err(Error::NotInOrder) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Self-signature whose challenge depends on the public nonce
///
/// Retries with a fresh nonce while the challenge digest falls outside the
/// scalar range.
pub fn sign_with_challenge<F>(
    suite: &Suite,
    secret: &PrivateKey,
    rng: &mut (impl RngCore + CryptoRng),
    challenge_of: F,
) -> Result<Signature>
where
    F: Fn(&Point) -> Result<Scalar>,
{
    loop {
        let mut nonce = generate_nonce(suite, secret.as_scalar(), rng)?;
        let pub_nonce = Point::mul_base(&nonce);
        let challenge = match challenge_of(&pub_nonce) {
            Ok(c) => c,
            Err(Error::NotInOrder) => {
                nonce.zeroize();
                continue;
            }
            Err(e) => return Err(e),
        };
        let signature = sign(secret.as_scalar(), &challenge, &nonce, None);
        nonce.zeroize();
        return signature;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn sign_then_verify() {
        let secret = Scalar::from_u64(1234);
        let public = Point::mul_base(&secret);
        let challenge = Scalar::from_u64(99);
        let nonce = Scalar::from_u64(5);

        let sig = sign(&secret, &challenge, &nonce, None).unwrap();
        assert_eq!(sig.r, Point::mul_base(&nonce));
        verify(&sig.r, &sig.s, &challenge, &public, None, None).unwrap();

        let wrong = Scalar::from_u64(100);
        assert_eq!(
            verify(&sig.r, &sig.s, &wrong, &public, None, None),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn lagrange_weighted_signature() {
        let secret = Scalar::from_u64(77);
        let public = Point::mul_base(&secret);
        let challenge = Scalar::from_u64(3);
        let lambda = -Scalar::ONE;

        let sig = sign(&secret, &challenge, &Scalar::from_u64(8), Some(&lambda)).unwrap();
        verify(&sig.r, &sig.s, &challenge, &public, None, Some(&lambda)).unwrap();
        assert!(verify(&sig.r, &sig.s, &challenge, &public, None, None).is_err());
    }

    #[test]
    fn custom_generator() {
        // s*P == R' + c*K with P = y*G, R' = k*P, K = x*P
        let x = Scalar::from_u64(11);
        let k = Scalar::from_u64(21);
        let c = Scalar::from_u64(31);
        let p = Point::mul_base(&Scalar::from_u64(41));
        let s = k + c * x;
        verify(&(p * k), &s, &c, &(p * x), Some(&p), None).unwrap();
        assert!(verify(&(p * k), &s, &c, &(p * x), None, None).is_err());
    }

    #[test]
    fn self_signature_round_trip() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let suite = Suite::default();
        let key = PrivateKey::random(&mut rng).unwrap();
        let public = key.public_key();

        let challenge_of = |r: &Point| Scalar::from_bytes(&suite.hash_sign_msg(&r.to_bytes()));
        let sig = sign_with_challenge(&suite, &key, &mut rng, challenge_of).unwrap();
        let challenge = challenge_of(&sig.r).unwrap();
        verify(&sig.r, &sig.s, &challenge, &public, None, None).unwrap();
    }
}
