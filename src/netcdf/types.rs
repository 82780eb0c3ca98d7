//! External element types of the classic data model and their big-endian encoding.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

/// External type of a variable or attribute, as stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NcType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Double,
}

impl NcType {
    pub fn code(self) -> u32 {
        match self {
            NcType::Byte => 1,
            NcType::Char => 2,
            NcType::Short => 3,
            NcType::Int => 4,
            NcType::Float => 5,
            NcType::Double => 6,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(NcType::Byte),
            2 => Some(NcType::Char),
            3 => Some(NcType::Short),
            4 => Some(NcType::Int),
            5 => Some(NcType::Float),
            6 => Some(NcType::Double),
            _ => None,
        }
    }

    /// Size in bytes of a single element.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            NcType::Byte | NcType::Char => 1,
            NcType::Short => 2,
            NcType::Int | NcType::Float => 4,
            NcType::Double => 8,
        }
    }

    /// Encoded default fill value for one element.
    pub(crate) fn fill_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        match self {
            NcType::Byte => i8::FILL.encode(&mut out),
            NcType::Char => u8::FILL.encode(&mut out),
            NcType::Short => i16::FILL.encode(&mut out),
            NcType::Int => i32::FILL.encode(&mut out),
            NcType::Float => f32::FILL.encode(&mut out),
            NcType::Double => f64::FILL.encode(&mut out),
        }
        out
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NcType::Byte => "byte",
            NcType::Char => "char",
            NcType::Short => "short",
            NcType::Int => "int",
            NcType::Float => "float",
            NcType::Double => "double",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Rust types that map one-to-one onto a classic external type.
///
/// `u8` is used for `char` data, since the classic model has no unsigned byte.
pub trait NcValue: Copy + Default + PartialEq + fmt::Debug + sealed::Sealed {
    const TYPE: NcType;
    const FILL: Self;

    /// Decodes one element from exactly `TYPE.size()` big-endian bytes.
    fn decode(bytes: &[u8]) -> Self;

    fn encode(self, out: &mut Vec<u8>);
}

impl NcValue for i8 {
    const TYPE: NcType = NcType::Byte;
    const FILL: Self = -127;

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    fn encode(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }
}

impl NcValue for u8 {
    const TYPE: NcType = NcType::Char;
    const FILL: Self = 0;

    fn decode(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn encode(self, out: &mut Vec<u8>) {
        out.push(self);
    }
}

macro_rules! impl_nc_value {
    ($ty:ty, $nc:expr, $fill:expr, $read:ident, $write:ident) => {
        impl NcValue for $ty {
            const TYPE: NcType = $nc;
            const FILL: Self = $fill;

            fn decode(bytes: &[u8]) -> Self {
                BigEndian::$read(bytes)
            }

            fn encode(self, out: &mut Vec<u8>) {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                BigEndian::$write(&mut buf, self);
                out.extend_from_slice(&buf);
            }
        }
    };
}

impl_nc_value!(i16, NcType::Short, -32767, read_i16, write_i16);
impl_nc_value!(i32, NcType::Int, -2_147_483_647, read_i32, write_i32);
impl_nc_value!(f32, NcType::Float, 9.969_21e36, read_f32, write_f32);
impl_nc_value!(f64, NcType::Double, 9.969_209_968_386_869e36, read_f64, write_f64);

/// Value of a global or per-variable attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bytes(Vec<i8>),
    Text(String),
    Shorts(Vec<i16>),
    Ints(Vec<i32>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
}

impl AttrValue {
    pub fn nc_type(&self) -> NcType {
        match self {
            AttrValue::Bytes(_) => NcType::Byte,
            AttrValue::Text(_) => NcType::Char,
            AttrValue::Shorts(_) => NcType::Short,
            AttrValue::Ints(_) => NcType::Int,
            AttrValue::Floats(_) => NcType::Float,
            AttrValue::Doubles(_) => NcType::Double,
        }
    }

    /// Number of stored elements (bytes, for text).
    pub fn len(&self) -> usize {
        match self {
            AttrValue::Bytes(v) => v.len(),
            AttrValue::Text(s) => s.len(),
            AttrValue::Shorts(v) => v.len(),
            AttrValue::Ints(v) => v.len(),
            AttrValue::Floats(v) => v.len(),
            AttrValue::Doubles(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// First element of a numeric attribute, widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Bytes(v) => v.first().map(|&x| f64::from(x)),
            AttrValue::Text(_) => None,
            AttrValue::Shorts(v) => v.first().map(|&x| f64::from(x)),
            AttrValue::Ints(v) => v.first().map(|&x| f64::from(x)),
            AttrValue::Floats(v) => v.first().map(|&x| f64::from(x)),
            AttrValue::Doubles(v) => v.first().copied(),
        }
    }

    pub(crate) fn encode_values(&self, out: &mut Vec<u8>) {
        fn encode_all<T: NcValue>(values: &[T], out: &mut Vec<u8>) {
            for &value in values {
                value.encode(out);
            }
        }

        match self {
            AttrValue::Bytes(v) => encode_all(v, out),
            AttrValue::Text(s) => out.extend_from_slice(s.as_bytes()),
            AttrValue::Shorts(v) => encode_all(v, out),
            AttrValue::Ints(v) => encode_all(v, out),
            AttrValue::Floats(v) => encode_all(v, out),
            AttrValue::Doubles(v) => encode_all(v, out),
        }
    }

    /// Decodes `bytes.len() / nc_type.size()` values of the given type.
    pub(crate) fn decode_values(nc_type: NcType, bytes: &[u8]) -> Self {
        fn decode_all<T: NcValue>(bytes: &[u8]) -> Vec<T> {
            bytes.chunks_exact(T::TYPE.size()).map(T::decode).collect()
        }

        match nc_type {
            NcType::Byte => AttrValue::Bytes(decode_all(bytes)),
            NcType::Char => {
                let text = String::from_utf8_lossy(bytes);
                AttrValue::Text(text.trim_end_matches('\0').to_string())
            }
            NcType::Short => AttrValue::Shorts(decode_all(bytes)),
            NcType::Int => AttrValue::Ints(decode_all(bytes)),
            NcType::Float => AttrValue::Floats(decode_all(bytes)),
            NcType::Double => AttrValue::Doubles(decode_all(bytes)),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        AttrValue::Floats(vec![value])
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Doubles(vec![value])
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{value}")?;
            }
            Ok(())
        }

        match self {
            AttrValue::Bytes(v) => join(f, v),
            AttrValue::Text(s) => write!(f, "\"{s}\""),
            AttrValue::Shorts(v) => join(f, v),
            AttrValue::Ints(v) => join(f, v),
            AttrValue::Floats(v) => join(f, v),
            AttrValue::Doubles(v) => join(f, v),
        }
    }
}
