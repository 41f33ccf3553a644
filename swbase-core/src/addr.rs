//! IPv4 address arithmetic on the 32-bit integer form.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Errors raised while converting dotted addresses and prefix lengths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Input is not four dot-separated decimal octets in `0..=255`.
    #[error("invalid IPv4 address '{0}' (expected e.g. 192.168.10.0)")]
    InvalidAddress(String),
    /// Prefix length outside `0..=32`.
    #[error("invalid prefix length {0} (expected 0-32)")]
    InvalidPrefix(u32),
}

/// Parse a dotted-quad address into its integer form.
///
/// Only plain decimal octets are accepted; signs, whitespace, empty octets
/// and leading zeros are rejected.
pub fn address_to_u32(dotted: &str) -> Result<u32, AddressError> {
    let invalid = || AddressError::InvalidAddress(dotted.to_string());

    let mut value: u32 = 0;
    let mut octets = 0;
    for part in dotted.split('.') {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if part.len() > 1 && part.starts_with('0') {
            return Err(invalid());
        }
        let octet: u32 = part.parse().map_err(|_| invalid())?;
        if octet > 255 {
            return Err(invalid());
        }
        value = (value << 8) | octet;
        octets += 1;
    }

    if octets != 4 {
        return Err(invalid());
    }
    Ok(value)
}

/// Render an integer address in dotted-quad form.
pub fn u32_to_address(value: u32) -> String {
    Ipv4Addr::from(value).to_string()
}

/// Return the dotted mask with the top `prefix` bits set.
pub fn mask_from_prefix(prefix: u32) -> Result<String, AddressError> {
    Ok(u32_to_address(mask_bits(prefix)?))
}

/// Integer mask for `prefix`; `0` yields an all-zero mask.
pub fn mask_bits(prefix: u32) -> Result<u32, AddressError> {
    match prefix {
        0 => Ok(0),
        1..=32 => Ok(u32::MAX << (32 - prefix)),
        _ => Err(AddressError::InvalidPrefix(prefix)),
    }
}

/// Number of addresses in a network of the given prefix length.
pub fn host_capacity(prefix: u32) -> Result<u64, AddressError> {
    if prefix > 32 {
        return Err(AddressError::InvalidPrefix(prefix));
    }
    Ok(1u64 << (32 - prefix))
}

/// Address at `offset` within `network`, wrapping at the top of the space.
pub fn host_address(network: u32, offset: u32) -> String {
    u32_to_address(network.wrapping_add(offset))
}
