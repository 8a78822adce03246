//! Uncompressed secp256k1 public keys as stored by the public resolver.
//!
//! The hex form is `0x04 || X || Y`, 132 characters. The resolver keeps the
//! two coordinates separately; a key whose coordinates are all zero is
//! treated as not set.

use std::{fmt, str::FromStr};

use bincode::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{error::EnsError, types::strip_hex_prefix};

/// Length of the hex form including the `0x` prefix.
pub const PUBLIC_KEY_LENGTH: usize = 132;

const UNCOMPRESSED_PREFIX: &str = "04";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct PublicKey {
    x: [u8; 32],
    y: [u8; 32],
}

impl PublicKey {
    pub fn from_parts(x: [u8; 32], y: [u8; 32]) -> Self {
        Self { x, y }
    }

    /// Split into the X and Y coordinates.
    pub fn parts(&self) -> ([u8; 32], [u8; 32]) {
        (self.x, self.y)
    }

    pub fn x(&self) -> &[u8; 32] {
        &self.x
    }

    pub fn y(&self) -> &[u8; 32] {
        &self.y
    }

    /// A resolver returns zero coordinates for names without a key.
    pub fn is_set(&self) -> bool {
        self.x.iter().chain(self.y.iter()).any(|b| *b != 0)
    }

    pub fn to_hex(&self) -> String {
        format!(
            "0x{}{}{}",
            UNCOMPRESSED_PREFIX,
            hex::encode(self.x),
            hex::encode(self.y)
        )
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = EnsError;

    /// Parse and validate the `0x04 || X || Y` hex form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EnsError::InvalidPublicKey("Public key is not valid.".into());
        if s.len() != PUBLIC_KEY_LENGTH {
            return Err(invalid());
        }
        let coordinates = strip_hex_prefix(s)
            .and_then(|rest| rest.strip_prefix(UNCOMPRESSED_PREFIX))
            .ok_or_else(invalid)?;
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(coordinates, &mut bytes).map_err(|_| invalid())?;

        let mut key = PublicKey {
            x: [0u8; 32],
            y: [0u8; 32],
        };
        key.x.copy_from_slice(&bytes[..32]);
        key.y.copy_from_slice(&bytes[32..]);
        if !key.is_set() {
            return Err(invalid());
        }
        Ok(key)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
