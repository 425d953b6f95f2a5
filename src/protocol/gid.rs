//! Binary track identifiers.
//!
//! Tracks are referred to by a 22-character base62 id in text form (as found
//! in `spotify:track:<id>` URIs) and by a 16-byte big-endian integer on the
//! wire. [`Gid`] converts between the two.

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// A 128-bit track identifier in its binary wire form.
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Gid([u8; Gid::SIZE]);

impl Gid {
    /// Size of the binary form in bytes.
    pub const SIZE: usize = 16;

    /// Number of characters in the canonical base62 form.
    pub const BASE62_LENGTH: usize = 22;

    const BASE62_DIGITS: &'static [u8; 62] =
        b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Decodes a base62 track id.
    ///
    /// Digits are accumulated most significant first. Shorter ids are
    /// allowed and come out left-padded with zero bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `id` is empty, contains characters
    /// outside `0-9a-zA-Z`, or does not fit in 128 bits.
    pub fn from_base62(id: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(Error::invalid_argument("track id should not be empty"));
        }

        let mut n = 0_u128;
        for chr in id.bytes() {
            let digit = Self::BASE62_DIGITS
                .iter()
                .position(|&d| d == chr)
                .ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "track id {id} contains invalid character {:?}",
                        char::from(chr)
                    ))
                })?;

            n = n
                .checked_mul(62)
                .and_then(|n| n.checked_add(digit as u128))
                .ok_or_else(|| {
                    Error::invalid_argument(format!("track id {id} exceeds 128 bits"))
                })?;
        }

        Ok(Self(n.to_be_bytes()))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

/// Formats the id in its canonical, zero-padded base62 form.
impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut n = u128::from_be_bytes(self.0);
        let mut digits = [b'0'; Self::BASE62_LENGTH];
        for digit in digits.iter_mut().rev() {
            #[expect(clippy::cast_possible_truncation)]
            let index = (n % 62) as usize;
            *digit = Self::BASE62_DIGITS[index];
            n /= 62;
        }

        for digit in digits {
            write!(f, "{}", char::from(digit))?;
        }

        Ok(())
    }
}

impl FromStr for Gid {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_base62(s)
    }
}

impl TryFrom<&[u8]> for Gid {
    type Error = Error;

    /// Converts a binary id as received on the wire.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `bytes` is not exactly 16 bytes long.
    fn try_from(bytes: &[u8]) -> std::result::Result<Self, Self::Error> {
        let bytes = <[u8; Self::SIZE]>::try_from(bytes).map_err(|_| {
            Error::invalid_argument(format!(
                "gid should be {} bytes but is {}",
                Self::SIZE,
                bytes.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}
