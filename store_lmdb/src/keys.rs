//! Binary key layouts.
//!
//! Identifiers are stored big-endian so LMDB's lexicographic ordering is
//! numeric ordering. Addresses are a fixed 20 bytes, so an address prefix
//! scan never bleeds into a neighbouring address.

use proofpass_types::{Address, CertificateId, RequestId};

use crate::LmdbError;

/// `owner ++ certificate_id`
pub(crate) fn owner_certificate_key(owner: &Address, id: CertificateId) -> Vec<u8> {
    let mut key = Vec::with_capacity(Address::LEN + 8);
    key.extend_from_slice(owner.as_bytes());
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// `certificate_id ++ request_id`
pub(crate) fn certificate_request_key(certificate: CertificateId, request: RequestId) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&certificate.to_be_bytes());
    key.extend_from_slice(&request.to_be_bytes());
    key
}

/// `certificate_id ++ requester`
pub(crate) fn pending_verification_key(certificate: CertificateId, requester: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + Address::LEN);
    key.extend_from_slice(&certificate.to_be_bytes());
    key.extend_from_slice(requester.as_bytes());
    key
}

/// `address ++ seq`
pub(crate) fn address_seq_key(address: &Address, seq: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(Address::LEN + 8);
    key.extend_from_slice(address.as_bytes());
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

/// Read the trailing big-endian `u64` of a composite key.
pub(crate) fn trailing_u64(key: &[u8]) -> Result<u64, LmdbError> {
    if key.len() < 8 {
        return Err(LmdbError::Serialization(format!(
            "composite key too short: {} bytes",
            key.len()
        )));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&key[key.len() - 8..]);
    Ok(u64::from_be_bytes(buf))
}

pub(crate) fn decode_u64(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("expected 8-byte id".into()))?;
    Ok(u64::from_be_bytes(arr))
}

pub(crate) fn decode_address(bytes: &[u8]) -> Result<Address, LmdbError> {
    let arr: [u8; 20] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("expected 20-byte address".into()))?;
    Ok(Address::new(arr))
}

/// Turn `prefix` into the smallest key greater than every key it prefixes.
///
/// Returns `false` when no such key exists (the prefix is all `0xFF`), in
/// which case the scan is unbounded above.
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) -> bool {
    while let Some(last) = prefix.last_mut() {
        if *last < u8::MAX {
            *last += 1;
            return true;
        }
        prefix.pop();
    }
    false
}
