//! `expand_message_xmd` and `hash_to_field` (RFC 9380, section 5)
//!
//! The expander is generic over the underlying hash so it can be checked
//! against the SHA-256 vectors while the suite functions run on Keccak-256.

use elliptic_curve::bigint::{Encoding, NonZero, U384};

use super::hash;
use crate::{Error, Result};

/// Context string seeding the DSTs of `h1..h5`
pub const XMD_CONTEXT_STRING: &str = "TSSLib-secp256k1-SHA256-v0";

/// Bytes per field element, `ceil((ceil(log2(p)) + k) / 8)` for k = 128
pub const L: usize = 48;

/// Output size of the hash in bytes
const B_IN_BYTES: usize = 32;

/// Input block size of the hash in bytes
const S_IN_BYTES: usize = 64;

/// secp256k1 base field prime
pub const FIELD_PRIME: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

/// Integer-to-octet-string: `x` as `x_len` big-endian bytes
pub fn i2osp(x: u64, x_len: usize) -> Result<Vec<u8>> {
    let bits = 64 - x.leading_zeros() as usize;
    if bits > x_len * 8 {
        return Err(Error::Parse(format!("i2osp: integer too large for {x_len} bytes")));
    }

    let mut out = vec![0u8; x_len];
    let mut value = x;
    for byte in out.iter_mut().rev() {
        *byte = (value & 0xff) as u8;
        value >>= 8;
    }
    Ok(out)
}

/// Octet-string-to-integer for inputs of up to `L` bytes, wide enough for
/// every `hash_to_field` chunk
pub fn os2ip(bytes: &[u8]) -> Result<U384> {
    if bytes.len() > L {
        return Err(Error::InvalidLength {
            expected: L,
            actual: bytes.len(),
        });
    }
    let mut wide = [0u8; L];
    wide[L - bytes.len()..].copy_from_slice(bytes);
    Ok(U384::from_be_bytes(wide))
}

/// Bytewise XOR of two equal-length strings
pub fn strxor(a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
    if a.len() != b.len() {
        return Err(Error::InvalidLength {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x ^ y).collect())
}

/// Expand `msg` into `len_in_bytes` uniform bytes under the tag `dst`
pub fn expand_message_xmd<H>(h: H, msg: &[u8], dst: &[u8], len_in_bytes: usize) -> Result<Vec<u8>>
where
    H: Fn(&[u8]) -> Vec<u8>,
{
    let ell = len_in_bytes.div_ceil(B_IN_BYTES);
    if ell > 255 || len_in_bytes > 65535 || dst.len() > 255 {
        return Err(Error::ExpandMessage("input is not within the permissible limits"));
    }

    let mut dst_prime = dst.to_vec();
    dst_prime.push(dst.len() as u8);

    let mut msg_prime = vec![0u8; S_IN_BYTES];
    msg_prime.extend_from_slice(msg);
    msg_prime.extend_from_slice(&i2osp(len_in_bytes as u64, 2)?);
    msg_prime.push(0);
    msg_prime.extend_from_slice(&dst_prime);

    let b0 = h(&msg_prime);

    let mut block = b0.clone();
    block.push(1);
    block.extend_from_slice(&dst_prime);
    let mut uniform = h(&block);

    if uniform.len() < B_IN_BYTES || b0.len() < B_IN_BYTES {
        return Err(Error::ExpandMessage("the initial len of b must be >= b_in_bytes"));
    }

    for i in 2..=ell {
        let prev = &uniform[uniform.len() - B_IN_BYTES..];
        let mut block = strxor(&b0[..B_IN_BYTES], prev)?;
        block.push(i as u8);
        block.extend_from_slice(&dst_prime);
        let bi = h(&block);
        uniform.extend_from_slice(&bi);
    }

    uniform.truncate(len_in_bytes);
    Ok(uniform)
}

/// Hash `msg` to `count` elements of the prime field given by `modulus`
/// (m = 1, L = 48), each returned as 32 big-endian bytes
pub fn hash_to_field<H>(
    h: H,
    msg: &[u8],
    dst: &[u8],
    count: usize,
    modulus: &[u8; 32],
) -> Result<Vec<[u8; 32]>>
where
    H: Fn(&[u8]) -> Vec<u8>,
{
    let uniform = expand_message_xmd(h, msg, dst, count * L)?;

    let mut wide = [0u8; L];
    wide[L - 32..].copy_from_slice(modulus);
    let modulus = Option::<NonZero<U384>>::from(NonZero::new(U384::from_be_slice(&wide)))
        .ok_or(Error::ExpandMessage("modulus must be non-zero"))?;

    uniform
        .chunks_exact(L)
        .map(|tv| {
            let e = os2ip(tv)?.rem(&modulus).to_be_bytes();
            let mut out = [0u8; 32];
            out.copy_from_slice(&e[L - 32..]);
            Ok(out)
        })
        .collect()
}

fn keccak(data: &[u8]) -> Vec<u8> {
    hash(&[data]).to_vec()
}

/// One base-field element under the suite DST `ctx || tag`, as 32
/// big-endian bytes
fn hash_to_base_field(msg: &[u8], tag: &str) -> Result<[u8; 32]> {
    let dst = format!("{XMD_CONTEXT_STRING}{tag}");
    hash_to_field(keccak, msg, dst.as_bytes(), 1, &FIELD_PRIME)?
        .first()
        .copied()
        .ok_or(Error::ExpandMessage("empty hash_to_field output"))
}

/// `hash_to_field(m, 1)` with DST `ctx || "rho"`, reduced modulo p
pub fn h1(msg: &[u8]) -> Result<[u8; 32]> {
    hash_to_base_field(msg, "rho")
}

/// `hash_to_field(m, 1)` with DST `ctx || "chal"`, reduced modulo p
pub fn h2(msg: &[u8]) -> Result<[u8; 32]> {
    hash_to_base_field(msg, "chal")
}

/// `hash_to_field(m, 1)` with DST `ctx || "nonce"`, reduced modulo p
pub fn h3(msg: &[u8]) -> Result<[u8; 32]> {
    hash_to_base_field(msg, "nonce")
}

/// `H(ctx || "msg" || m)`
pub fn h4(msg: &[u8]) -> [u8; 32] {
    hash(&[XMD_CONTEXT_STRING.as_bytes(), b"msg", msg])
}

/// `H(ctx || "com" || m)`
pub fn h5(msg: &[u8]) -> [u8; 32] {
    hash(&[XMD_CONTEXT_STRING.as_bytes(), b"com", msg])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    const EXPANDER_DST: &[u8] = b"QUUX-V01-CS02-with-expander-SHA256-128";

    fn sha256(data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    #[test]
    fn i2osp_encodes_big_endian() {
        assert_eq!(i2osp(1234, 5).unwrap(), vec![0, 0, 0, 4, 0xd2]);
        assert_eq!(i2osp(0, 0).unwrap(), Vec::<u8>::new());
        assert_eq!(i2osp(255, 1).unwrap(), vec![0xff]);
        assert!(i2osp(256, 1).is_err());
        assert!(i2osp(1, 0).is_err());
    }

    #[test]
    fn os2ip_inverts_i2osp() {
        assert_eq!(os2ip(&[0, 0, 0, 4, 0xd2]).unwrap(), U384::from_u64(1234));
        assert_eq!(os2ip(&[]).unwrap(), U384::ZERO);
        assert_eq!(os2ip(&i2osp(u64::MAX, 8).unwrap()).unwrap(), U384::from_u64(u64::MAX));
    }

    #[test]
    fn os2ip_reads_full_field_chunks() {
        let mut chunk = [0u8; L];
        chunk[0] = 1;
        assert_eq!(os2ip(&chunk).unwrap(), U384::ONE.shl_vartime(8 * (L - 1)));
        assert_eq!(os2ip(&[0xff; L]).unwrap(), U384::MAX);
        assert_eq!(
            os2ip(&[0u8; L + 1]),
            Err(Error::InvalidLength { expected: L, actual: L + 1 })
        );
    }

    #[test]
    fn strxor_requires_equal_lengths() {
        assert_eq!(strxor(&[0b1100], &[0b1010]).unwrap(), vec![0b0110]);
        assert!(strxor(&[1, 2], &[1]).is_err());
    }

    #[test]
    fn expand_sha256_vectors() {
        let cases: &[(&[u8], usize, &str)] = &[
            (b"", 32, "68a985b87eb6b46952128911f2a4412bbc302a9d759667f87f7a21d803f07235"),
            (b"abc", 32, "d8ccab23b5985ccea865c6c97b6e5b8350e794e603b4b97902f53a8a0d605615"),
            (
                b"abcdef0123456789",
                32,
                "eff31487c770a893cfb36f912fbfcbff40d5661771ca4b2cb4eafe524333f5c1",
            ),
            (
                b"",
                128,
                "af84c27ccfd45d41914fdff5df25293e221afc53d8ad2ac06d5e3e29485dadbee0d121587713a3e0dd4d5e69e93eb7cd4f5df4cd103e188cf60cb02edc3edf18eda8576c412b18ffb658e3dd6ec849469b979d444cf7b26911a08e63cf31f9dcc541708d3491184472c2c29bb749d4286b004ceb5ee6b9a7fa5b646c993f0ced",
            ),
        ];

        for (msg, len, expected) in cases {
            let out = expand_message_xmd(sha256, msg, EXPANDER_DST, *len).unwrap();
            assert_eq!(hex::encode(out), *expected);
        }
    }

    #[test]
    fn expand_rejects_out_of_range_input() {
        let limits = Error::ExpandMessage("input is not within the permissible limits");
        assert_eq!(expand_message_xmd(sha256, b"", &[0u8; 256], 32), Err(limits.clone()));
        assert_eq!(expand_message_xmd(sha256, b"", EXPANDER_DST, 65536), Err(limits.clone()));
        assert_eq!(expand_message_xmd(sha256, b"", EXPANDER_DST, 255 * 32 + 1), Err(limits));
    }

    #[test]
    fn expand_rejects_short_hash() {
        let short = |data: &[u8]| sha256(data)[..16].to_vec();
        assert_eq!(
            expand_message_xmd(short, b"", EXPANDER_DST, 32),
            Err(Error::ExpandMessage("the initial len of b must be >= b_in_bytes"))
        );
    }

    #[test]
    fn hash_to_field_secp256k1_vectors() {
        let nu = b"QUUX-V01-CS02-with-secp256k1_XMD:SHA-256_SSWU_NU_";
        let out = hash_to_field(sha256, b"", nu, 1, &FIELD_PRIME).unwrap();
        assert_eq!(
            hex::encode(out[0]),
            "0137fcd23bc3da962e8808f97474d097a6c8aa2881fceef4514173635872cf3b"
        );
        let out = hash_to_field(sha256, b"abc", nu, 1, &FIELD_PRIME).unwrap();
        assert_eq!(
            hex::encode(out[0]),
            "e03f894b4d7caf1a50d6aa45cac27412c8867a25489e32c5ddeb503229f63a2e"
        );

        let ro = b"QUUX-V01-CS02-with-secp256k1_XMD:SHA-256_SSWU_RO_";
        let out = hash_to_field(sha256, b"", ro, 2, &FIELD_PRIME).unwrap();
        assert_eq!(
            hex::encode(out[0]),
            "6b0f9910dd2ba71c78f2ee9f04d73b5f4c5f7fc773a701abea1e573cab002fb3"
        );
        assert_eq!(
            hex::encode(out[1]),
            "1ae6c212e08fe1a5937f6202f929a2cc8ef4ee5b9782db68b0d5799fd8f09e16"
        );
    }

    #[test]
    fn suite_hashes_are_domain_separated() {
        let a = h1(b"m").unwrap();
        let b = h2(b"m").unwrap();
        let c = h3(b"m").unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(h1(b"m").unwrap(), a);
        assert_ne!(h4(b"m"), h5(b"m"));
    }

    #[test]
    fn suite_hashes_land_in_base_field() {
        let p = U384::from_be_slice(&[[0u8; 16].as_slice(), FIELD_PRIME.as_slice()].concat());
        for tag in ["rho", "chal", "nonce"] {
            let e = hash_to_base_field(b"data", tag).unwrap();
            let mut wide = [0u8; L];
            wide[L - 32..].copy_from_slice(&e);
            assert!(U384::from_be_bytes(wide) < p);
        }
    }
}
