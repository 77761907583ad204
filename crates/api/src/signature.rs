// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Webhook signatures: hex-encoded HMAC-SHA256 over the raw request body.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Computes the signature of a body.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the secret cannot key the MAC.
pub fn compute_signature(secret: &str, body: &[u8]) -> Result<String, ApiError> {
    let mut mac: HmacSha256 =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| ApiError::Internal {
            message: format!("invalid webhook secret: {e}"),
        })?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a signature in constant time.
///
/// # Errors
///
/// Returns `ApiError::InvalidSignature` for a missing, malformed or
/// mismatching signature.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> Result<(), ApiError> {
    let expected: Vec<u8> =
        hex::decode(signature.trim()).map_err(|_| ApiError::InvalidSignature)?;
    let mut mac: HmacSha256 =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ApiError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| ApiError::InvalidSignature)
}
