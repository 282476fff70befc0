//! Fail-fast validators for caller-supplied wire-format input.
//!
//! These checks run before any backend dispatch so that malformed input is
//! rejected with a [`RouterError::Validation`] instead of costing a backend
//! round-trip.

use crate::error::{Result, RouterError};

/// Byte length of a ledger account address.
const ADDRESS_BYTES: usize = 20;

/// Checks that a caller-supplied raw transaction is well-formed hex.
///
/// An optional `0x` prefix is accepted. The payload must be non-empty, of even
/// length, and contain only hexadecimal digits.
pub fn transaction_hex(tx_hex: &str) -> Result<()> {
    let raw = tx_hex.strip_prefix("0x").unwrap_or(tx_hex);
    if raw.is_empty() {
        return Err(RouterError::validation("transaction hex", "empty payload"));
    }
    if raw.len() % 2 != 0 {
        return Err(RouterError::validation(
            "transaction hex",
            "odd number of digits",
        ));
    }
    if hex::decode(raw).is_err() {
        return Err(RouterError::validation(
            "transaction hex",
            "non-hexadecimal digit",
        ));
    }
    Ok(())
}

/// Checks that an operator address is `0x` followed by exactly 20 bytes of hex.
pub fn operator_address(address: &str) -> Result<()> {
    let body = address
        .strip_prefix("0x")
        .ok_or_else(|| RouterError::validation("operator address", "missing 0x prefix"))?;
    if body.len() != ADDRESS_BYTES * 2 {
        return Err(RouterError::validation(
            "operator address",
            format!("expected {} hex digits, got {}", ADDRESS_BYTES * 2, body.len()),
        ));
    }
    if hex::decode(body).is_err() {
        return Err(RouterError::validation(
            "operator address",
            "non-hexadecimal digit",
        ));
    }
    Ok(())
}
