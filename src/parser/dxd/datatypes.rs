// Raw sample encodings found in DXD payloads. Everything is little-endian.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DxdDataType {
    #[default]
    Int16,
    Int32,
    Float32,
    Float64,
    UInt16,
    UInt32,
}

impl DxdDataType {
    /// Lenient lookup used for metadata strings. Unrecognized names decode as `int16`.
    pub fn from_string(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Strict lookup, `None` when the name is not a known encoding.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int16" | "i16" | "short" => Some(DxdDataType::Int16),
            "int32" | "i32" | "int" | "long" => Some(DxdDataType::Int32),
            "float32" | "f32" | "float" | "single" => Some(DxdDataType::Float32),
            "float64" | "f64" | "double" => Some(DxdDataType::Float64),
            "uint16" | "u16" | "ushort" => Some(DxdDataType::UInt16),
            "uint32" | "u32" | "uint" | "ulong" => Some(DxdDataType::UInt32),
            _ => None,
        }
    }

    pub fn sample_size_bytes(&self) -> usize {
        match self {
            DxdDataType::Int16 | DxdDataType::UInt16 => 2,
            DxdDataType::Int32 | DxdDataType::UInt32 | DxdDataType::Float32 => 4,
            DxdDataType::Float64 => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DxdDataType::Int16 => "int16",
            DxdDataType::Int32 => "int32",
            DxdDataType::Float32 => "float32",
            DxdDataType::Float64 => "float64",
            DxdDataType::UInt16 => "uint16",
            DxdDataType::UInt32 => "uint32",
        }
    }
}

impl fmt::Display for DxdDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
