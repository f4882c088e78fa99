use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidAddressError;

/// Shortest accepted wallet address, in bytes.
pub const MIN_ADDRESS_LEN: usize = 32;
/// Longest accepted wallet address, in bytes.
pub const MAX_ADDRESS_LEN: usize = 44;

/// Coarse format check shared by every fetcher: UTF-8 length in `[32, 44]`.
///
/// Neither the base58 alphabet nor the checksum is verified. Base58 is
/// ASCII, so bytes and characters agree for every real address.
pub fn is_valid_address(value: &str) -> bool {
    (MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&value.len())
}

/// A wallet address that passed [`is_valid_address`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidAddressError> {
        let value = value.into();
        if is_valid_address(&value) {
            Ok(Self(value))
        } else {
            let length = value.len();
            Err(InvalidAddressError {
                address: value,
                length,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = InvalidAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
