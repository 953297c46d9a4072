//! User metadata attached to direct and recursive pins.
//!
//! Stores persist `Option<Metadata>` as CBOR: a map of text keys to
//! primitive values, or `null` when the pin has no metadata.

use minicbor::data::Type;
use minicbor::decode::{self, Decode, Decoder};
use minicbor::encode::{self, Encode, Encoder, Write};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type Metadata = BTreeMap<String, MetaValue>;

/// A primitive metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Int(n) => write!(f, "{}", n),
            MetaValue::Float(n) => write!(f, "{}", n),
            MetaValue::String(s) => f.write_str(s),
        }
    }
}

/// Parses the most specific type: bool, then integer, then finite float, else text.
impl FromStr for MetaValue {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(b) = s.parse::<bool>() {
            return Ok(MetaValue::Bool(b));
        }
        if let Ok(n) = s.parse::<i64>() {
            return Ok(MetaValue::Int(n));
        }
        if let Ok(n) = s.parse::<f64>()
            && n.is_finite()
        {
            return Ok(MetaValue::Float(n));
        }
        Ok(MetaValue::String(s.to_owned()))
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::String(value.to_owned())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::String(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Int(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl<C> Encode<C> for MetaValue {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        _: &mut C,
    ) -> Result<(), encode::Error<W::Error>> {
        match self {
            MetaValue::Bool(b) => e.bool(*b)?,
            MetaValue::Int(n) => e.i64(*n)?,
            MetaValue::Float(n) => e.f64(*n)?,
            MetaValue::String(s) => e.str(s)?,
        };
        Ok(())
    }
}

impl<'b, C> Decode<'b, C> for MetaValue {
    fn decode(d: &mut Decoder<'b>, _: &mut C) -> Result<Self, decode::Error> {
        match d.datatype()? {
            Type::Bool => Ok(MetaValue::Bool(d.bool()?)),
            Type::U8
            | Type::U16
            | Type::U32
            | Type::U64
            | Type::I8
            | Type::I16
            | Type::I32
            | Type::I64
            | Type::Int => Ok(MetaValue::Int(d.i64()?)),
            Type::F16 => Ok(MetaValue::Float(d.f16()? as f64)),
            Type::F32 => Ok(MetaValue::Float(d.f32()? as f64)),
            Type::F64 => Ok(MetaValue::Float(d.f64()?)),
            Type::String => Ok(MetaValue::String(d.str()?.to_owned())),
            other => Err(decode::Error::type_mismatch(other)
                .with_message("metadata values must be bool, integer, float or text")),
        }
    }
}

/// Encodes the stored form of a pin's metadata.
pub fn encode(metadata: Option<&Metadata>) -> anyhow::Result<Vec<u8>> {
    Ok(minicbor::to_vec(metadata)?)
}

/// Decodes the stored form of a pin's metadata.
pub fn decode(bytes: &[u8]) -> anyhow::Result<Option<Metadata>> {
    minicbor::decode(bytes).map_err(|e| anyhow::anyhow!("CBOR decode failed: {}", e))
}

/// Parses a `key=value` argument.
pub fn parse_pair(s: &str) -> Option<(String, MetaValue)> {
    let (key, value) = s.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    let value = MetaValue::from_str(value).unwrap_or_else(|never| match never {});
    Some((key.to_owned(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_most_specific_type() {
        assert_eq!("true".parse::<MetaValue>().unwrap(), MetaValue::Bool(true));
        assert_eq!("-42".parse::<MetaValue>().unwrap(), MetaValue::Int(-42));
        assert_eq!("1.5".parse::<MetaValue>().unwrap(), MetaValue::Float(1.5));
        assert_eq!(
            "x".parse::<MetaValue>().unwrap(),
            MetaValue::String("x".into())
        );
    }

    #[test]
    fn non_finite_numbers_stay_text() {
        for word in ["nan", "NaN", "inf", "-inf", "infinity"] {
            assert_eq!(
                word.parse::<MetaValue>().unwrap(),
                MetaValue::String(word.into()),
                "{word}"
            );
        }
        assert_eq!(
            parse_pair("k=nan"),
            Some(("k".into(), MetaValue::String("nan".into())))
        );
    }

    #[test]
    fn parse_pair_splits_on_first_equals() {
        assert_eq!(
            parse_pair("tag=a=b"),
            Some(("tag".into(), MetaValue::String("a=b".into())))
        );
        assert_eq!(parse_pair("novalue"), None);
        assert_eq!(parse_pair("=x"), None);
    }

    #[test]
    fn stored_metadata_decodes_to_same_map() {
        let mut meta = Metadata::new();
        meta.insert("tag".into(), "x".into());
        meta.insert("count".into(), 3i64.into());
        meta.insert("ratio".into(), 0.25f64.into());
        meta.insert("keep".into(), true.into());

        let bytes = encode(Some(&meta)).unwrap();
        assert_eq!(decode(&bytes).unwrap(), Some(meta));
    }

    #[test]
    fn missing_metadata_is_cbor_null() {
        let bytes = encode(None).unwrap();
        assert_eq!(bytes, vec![0xf6]);
        assert_eq!(decode(&bytes).unwrap(), None);
    }

    #[test]
    fn nested_values_are_rejected() {
        // {"k": [1]}
        let bytes = [0xa1, 0x61, b'k', 0x81, 0x01];
        assert!(decode(&bytes).is_err());
    }
}
