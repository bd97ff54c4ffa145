//! Element values as handed over by an upstream data set parser.

use byteorder::{ByteOrder, LittleEndian};

use crate::Tag;

/// A primitive element value.
///
/// The upstream parser resolves value representations
/// down to three kinds:
/// integer arrays (for the binary integer VRs and integer strings),
/// string arrays (for the text VRs, decimal strings included),
/// and plain byte bags (for _OB_/_OW_ data such as _Pixel Data_).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// one or more integers
    Ints(Vec<i64>),
    /// one or more text values
    Strs(Vec<String>),
    /// an opaque bag of bytes
    Bytes(Vec<u8>),
}

impl Value {
    /// Get the first value as a signed 64-bit integer.
    ///
    /// Numeric strings are parsed,
    /// accepting both the integer and the decimal string forms.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Ints(v) => v.first().copied(),
            Value::Strs(v) => {
                let s = v.first()?.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
            }
            Value::Bytes(_) => None,
        }
    }

    /// Get the first value as an unsigned 16-bit integer.
    pub fn to_u16(&self) -> Option<u16> {
        match self.to_i64()? {
            v @ 0..=0xFFFF => Some(v as u16),
            _ => None,
        }
    }

    /// Get the first value as an unsigned 32-bit integer.
    pub fn to_u32(&self) -> Option<u32> {
        let v = self.to_i64()?;
        if (0..=i64::from(u32::MAX)).contains(&v) {
            Some(v as u32)
        } else {
            None
        }
    }

    /// Get the first value as a 64-bit float.
    ///
    /// Numeric strings are parsed.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Ints(v) => v.first().map(|&i| i as f64),
            Value::Strs(v) => v.first()?.trim().parse().ok(),
            Value::Bytes(_) => None,
        }
    }

    /// Get all values as 64-bit floats.
    pub fn to_f64s(&self) -> Option<Vec<f64>> {
        match self {
            Value::Ints(v) => Some(v.iter().map(|&i| i as f64).collect()),
            Value::Strs(v) => v.iter().map(|s| s.trim().parse().ok()).collect(),
            Value::Bytes(_) => None,
        }
    }

    /// Get the first value as a string slice.
    pub fn string(&self) -> Option<&str> {
        match self {
            Value::Strs(v) => v.first().map(String::as_str),
            _ => None,
        }
    }

    /// Get the value as a byte slice, if it is a byte bag.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Get all values as unsigned 16-bit words.
    ///
    /// Integer arrays are narrowed element-wise;
    /// byte bags of even length are read as little-endian words,
    /// which is how LUT table data commonly arrives.
    pub fn to_u16s(&self) -> Option<Vec<u16>> {
        match self {
            Value::Ints(v) => v
                .iter()
                .map(|&i| if (0..=0xFFFF).contains(&i) { Some(i as u16) } else { None })
                .collect(),
            Value::Bytes(v) if v.len() % 2 == 0 => {
                let mut words = vec![0u16; v.len() / 2];
                LittleEndian::read_u16_into(v, &mut words);
                Some(words)
            }
            _ => None,
        }
    }

    /// The number of individual values.
    pub fn multiplicity(&self) -> usize {
        match self {
            Value::Ints(v) => v.len(),
            Value::Strs(v) => v.len(),
            Value::Bytes(_) => 1,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Strs(vec![s.to_string()])
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Ints(vec![v])
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// A data set element: a tag paired with a primitive value.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: Tag,
    value: Value,
}

impl Element {
    /// Create a new element.
    pub fn new(tag: Tag, value: impl Into<Value>) -> Self {
        Element {
            tag,
            value: value.into(),
        }
    }

    /// The element's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The element's value.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Shortcut for [`Value::to_i64`].
    #[inline]
    pub fn to_i64(&self) -> Option<i64> {
        self.value.to_i64()
    }

    /// Shortcut for [`Value::to_u16`].
    #[inline]
    pub fn to_u16(&self) -> Option<u16> {
        self.value.to_u16()
    }

    /// Shortcut for [`Value::to_u32`].
    #[inline]
    pub fn to_u32(&self) -> Option<u32> {
        self.value.to_u32()
    }

    /// Shortcut for [`Value::to_f64`].
    #[inline]
    pub fn to_f64(&self) -> Option<f64> {
        self.value.to_f64()
    }

    /// Shortcut for [`Value::to_f64s`].
    #[inline]
    pub fn to_f64s(&self) -> Option<Vec<f64>> {
        self.value.to_f64s()
    }

    /// Shortcut for [`Value::string`].
    #[inline]
    pub fn string(&self) -> Option<&str> {
        self.value.string()
    }

    /// Shortcut for [`Value::bytes`].
    #[inline]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.value.bytes()
    }

    /// Shortcut for [`Value::to_u16s`].
    #[inline]
    pub fn to_u16s(&self) -> Option<Vec<u16>> {
        self.value.to_u16s()
    }
}
