//! Content identifiers (blake3, 32 bytes).

use minicbor::decode::{self, Decoder};
use minicbor::encode::{self, Encoder, Write};
use minicbor::{Decode, Encode};
use std::{borrow::Borrow, fmt, str::FromStr};

/// Content-derived identifier of a stored object.
///
/// A `Cid` is the BLAKE3 hash of the object's bytes. It is displayed and
/// parsed as 64 hex characters.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Cid(blake3::Hash);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CidParseError {
    #[error("expected 64-character hex identifier, got {0} characters")]
    InvalidLength(usize),
    #[error("invalid hex identifier: {0}")]
    InvalidHex(#[from] data_encoding::DecodeError),
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cid").field(&self.to_hex()).finish()
    }
}

impl Cid {
    /// The size of the identifier in bytes.
    pub const SIZE: usize = 32;

    /// Derive the identifier of the provided content.
    pub fn new(buf: impl AsRef<[u8]>) -> Self {
        Cid(blake3::hash(buf.as_ref()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(blake3::Hash::from_bytes(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// First 5 bytes as hex, for log lines.
    pub fn fmt_short(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.as_bytes()[..5])
    }
}

impl FromStr for Cid {
    type Err = CidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != Self::SIZE * 2 {
            return Err(CidParseError::InvalidLength(s.len()));
        }
        let bytes = data_encoding::HEXLOWER_PERMISSIVE.decode(s.as_bytes())?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Cid::from_bytes(arr))
    }
}

impl AsRef<[u8]> for Cid {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Borrow<[u8; 32]> for Cid {
    fn borrow(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl From<blake3::Hash> for Cid {
    fn from(value: blake3::Hash) -> Self {
        Cid(value)
    }
}

impl From<[u8; 32]> for Cid {
    fn from(value: [u8; 32]) -> Self {
        Cid::from_bytes(value)
    }
}

impl From<Cid> for [u8; 32] {
    fn from(value: Cid) -> Self {
        *value.as_bytes()
    }
}

impl TryFrom<&[u8]> for Cid {
    type Error = std::array::TryFromSliceError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = value.try_into()?;
        Ok(Cid::from_bytes(arr))
    }
}

impl PartialOrd for Cid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<C> Encode<C> for Cid {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        _: &mut C,
    ) -> Result<(), encode::Error<W::Error>> {
        e.bytes(self.as_bytes())?;
        Ok(())
    }
}

impl<'b, C> Decode<'b, C> for Cid {
    fn decode(d: &mut Decoder<'b>, _: &mut C) -> Result<Self, decode::Error> {
        let bytes = d.bytes()?;
        Cid::try_from(bytes).map_err(|_| decode::Error::message("cid must be 32 bytes"))
    }
}
