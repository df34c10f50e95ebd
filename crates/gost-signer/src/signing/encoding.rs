use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Length in bytes of a GOST R 34.10-2012 signature with a 256-bit key.
pub const GOST_2012_256_SIGNATURE_LEN: usize = 64;

/// URL-safe alphabet, unpadded output, padding optional on input.
const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reverses the raw signature produced by `csptest` and encodes it as base64url.
///
/// `csptest` emits the signature little-endian; consumers expect the
/// reversed byte order.
pub fn encode_signature(raw: &[u8]) -> String {
    let reversed: Vec<u8> = raw.iter().rev().copied().collect();
    BASE64URL.encode(reversed)
}

/// Inverse of [`encode_signature`].
pub fn decode_signature(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let mut bytes = BASE64URL.decode(encoded)?;
    bytes.reverse();
    Ok(bytes)
}
