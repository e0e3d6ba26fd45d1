//! Compile-time constant values and conversion between their kinds.

use std::fmt;

use thiserror::Error;

/// Kind of a [`ConstantValue`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstantValueKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    ZxUsize64,
    ZxUintptr64,
    Float32,
    Float64,
    Bool,
    String,
    DocComment,
}

impl ConstantValueKind {
    pub fn is_integral(self) -> bool {
        self.integral_range().is_some()
    }

    pub fn is_float(self) -> bool {
        matches!(self, ConstantValueKind::Float32 | ConstantValueKind::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_float()
    }

    /// Inclusive bounds of an integral kind.
    fn integral_range(self) -> Option<(i128, i128)> {
        let range = match self {
            ConstantValueKind::Int8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
            ConstantValueKind::Int16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
            ConstantValueKind::Int32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            ConstantValueKind::Int64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            ConstantValueKind::Uint8 => (0, i128::from(u8::MAX)),
            ConstantValueKind::Uint16 => (0, i128::from(u16::MAX)),
            ConstantValueKind::Uint32 => (0, i128::from(u32::MAX)),
            ConstantValueKind::Uint64
            | ConstantValueKind::ZxUsize64
            | ConstantValueKind::ZxUintptr64 => (0, i128::from(u64::MAX)),
            ConstantValueKind::Float32
            | ConstantValueKind::Float64
            | ConstantValueKind::Bool
            | ConstantValueKind::String
            | ConstantValueKind::DocComment => return None,
        };
        Some(range)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstantValueKind::Int8 => "int8",
            ConstantValueKind::Int16 => "int16",
            ConstantValueKind::Int32 => "int32",
            ConstantValueKind::Int64 => "int64",
            ConstantValueKind::Uint8 => "uint8",
            ConstantValueKind::Uint16 => "uint16",
            ConstantValueKind::Uint32 => "uint32",
            ConstantValueKind::Uint64 => "uint64",
            ConstantValueKind::ZxUsize64 => "usize64",
            ConstantValueKind::ZxUintptr64 => "uintptr64",
            ConstantValueKind::Float32 => "float32",
            ConstantValueKind::Float64 => "float64",
            ConstantValueKind::Bool => "bool",
            ConstantValueKind::String => "string",
            ConstantValueKind::DocComment => "doc comment",
        }
    }
}

impl fmt::Display for ConstantValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a value could not be produced in the requested kind.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConstantError {
    #[error("value {value} overflows {target}")]
    Overflow {
        value: String,
        target: ConstantValueKind,
    },
    #[error("cannot convert {from} to {to}")]
    KindMismatch {
        from: ConstantValueKind,
        to: ConstantValueKind,
    },
    #[error("`|` requires operands of the same integral kind, found {left} and {right}")]
    OperandMismatch {
        left: ConstantValueKind,
        right: ConstantValueKind,
    },
    #[error("malformed numeric literal `{0}`")]
    MalformedLiteral(String),
}

/// A compile-time value.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    ZxUsize64(u64),
    ZxUintptr64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
    DocComment(String),
}

impl ConstantValue {
    pub fn kind(&self) -> ConstantValueKind {
        match self {
            ConstantValue::Int8(_) => ConstantValueKind::Int8,
            ConstantValue::Int16(_) => ConstantValueKind::Int16,
            ConstantValue::Int32(_) => ConstantValueKind::Int32,
            ConstantValue::Int64(_) => ConstantValueKind::Int64,
            ConstantValue::Uint8(_) => ConstantValueKind::Uint8,
            ConstantValue::Uint16(_) => ConstantValueKind::Uint16,
            ConstantValue::Uint32(_) => ConstantValueKind::Uint32,
            ConstantValue::Uint64(_) => ConstantValueKind::Uint64,
            ConstantValue::ZxUsize64(_) => ConstantValueKind::ZxUsize64,
            ConstantValue::ZxUintptr64(_) => ConstantValueKind::ZxUintptr64,
            ConstantValue::Float32(_) => ConstantValueKind::Float32,
            ConstantValue::Float64(_) => ConstantValueKind::Float64,
            ConstantValue::Bool(_) => ConstantValueKind::Bool,
            ConstantValue::String(_) => ConstantValueKind::String,
            ConstantValue::DocComment(_) => ConstantValueKind::DocComment,
        }
    }

    /// The value of an integral constant, widened.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            ConstantValue::Int8(v) => Some(i128::from(v)),
            ConstantValue::Int16(v) => Some(i128::from(v)),
            ConstantValue::Int32(v) => Some(i128::from(v)),
            ConstantValue::Int64(v) => Some(i128::from(v)),
            ConstantValue::Uint8(v) => Some(i128::from(v)),
            ConstantValue::Uint16(v) => Some(i128::from(v)),
            ConstantValue::Uint32(v) => Some(i128::from(v)),
            ConstantValue::Uint64(v)
            | ConstantValue::ZxUsize64(v)
            | ConstantValue::ZxUintptr64(v) => Some(i128::from(v)),
            _ => None,
        }
    }

    /// The value of an integral constant if it fits in `u32`.
    pub fn as_u32(&self) -> Option<u32> {
        self.as_integer().and_then(|v| u32::try_from(v).ok())
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            ConstantValue::Float32(v) => Some(f64::from(v)),
            ConstantValue::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) | ConstantValue::DocComment(s) => Some(s),
            _ => None,
        }
    }

    /// Build an integral value of `kind`, failing if `value` is out of range.
    pub fn from_integer(kind: ConstantValueKind, value: i128) -> Result<Self, ConstantError> {
        let overflow = || ConstantError::Overflow {
            value: value.to_string(),
            target: kind,
        };
        let Some((min, max)) = kind.integral_range() else {
            return Err(ConstantError::KindMismatch {
                from: ConstantValueKind::Int64,
                to: kind,
            });
        };
        if value < min || value > max {
            return Err(overflow());
        }
        // In range, so the narrowing casts below are exact.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let converted = match kind {
            ConstantValueKind::Int8 => ConstantValue::Int8(value as i8),
            ConstantValueKind::Int16 => ConstantValue::Int16(value as i16),
            ConstantValueKind::Int32 => ConstantValue::Int32(value as i32),
            ConstantValueKind::Int64 => ConstantValue::Int64(value as i64),
            ConstantValueKind::Uint8 => ConstantValue::Uint8(value as u8),
            ConstantValueKind::Uint16 => ConstantValue::Uint16(value as u16),
            ConstantValueKind::Uint32 => ConstantValue::Uint32(value as u32),
            ConstantValueKind::Uint64 => ConstantValue::Uint64(value as u64),
            ConstantValueKind::ZxUsize64 => ConstantValue::ZxUsize64(value as u64),
            ConstantValueKind::ZxUintptr64 => ConstantValue::ZxUintptr64(value as u64),
            _ => return Err(overflow()),
        };
        Ok(converted)
    }

    /// Build a floating point value of `kind`.
    pub fn from_float(kind: ConstantValueKind, value: f64) -> Result<Self, ConstantError> {
        match kind {
            ConstantValueKind::Float64 => Ok(ConstantValue::Float64(value)),
            ConstantValueKind::Float32 => {
                if value.is_finite() && value.abs() > f64::from(f32::MAX) {
                    return Err(ConstantError::Overflow {
                        value: value.to_string(),
                        target: kind,
                    });
                }
                #[allow(clippy::cast_possible_truncation)]
                Ok(ConstantValue::Float32(value as f32))
            }
            _ => Err(ConstantError::KindMismatch {
                from: ConstantValueKind::Float64,
                to: kind,
            }),
        }
    }

    /// Convert to `kind`.
    ///
    /// Integers convert to any integral kind whose range holds them and to
    /// either float kind. Floats convert between float kinds within range and
    /// never to integers. Bools, strings and doc comments only convert to
    /// their own kind.
    pub fn convert(&self, kind: ConstantValueKind) -> Result<ConstantValue, ConstantError> {
        let mismatch = || ConstantError::KindMismatch {
            from: self.kind(),
            to: kind,
        };
        if self.kind() == kind {
            return Ok(self.clone());
        }
        if let Some(value) = self.as_integer() {
            return if kind.is_integral() {
                Self::from_integer(kind, value)
            } else if kind.is_float() {
                #[allow(clippy::cast_precision_loss)]
                Self::from_float(kind, value as f64)
            } else {
                Err(mismatch())
            };
        }
        if let Some(value) = self.as_float() {
            return if kind.is_float() {
                Self::from_float(kind, value)
            } else {
                Err(mismatch())
            };
        }
        Err(mismatch())
    }

    /// `self | other`, for two integral values of the same kind.
    pub fn bitwise_or(&self, other: &ConstantValue) -> Result<ConstantValue, ConstantError> {
        let (left, right) = (self.kind(), other.kind());
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) if left == right => Self::from_integer(left, a | b),
            _ => Err(ConstantError::OperandMismatch { left, right }),
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Float32(v) => write!(f, "{v}"),
            ConstantValue::Float64(v) => write!(f, "{v}"),
            ConstantValue::Bool(v) => write!(f, "{v}"),
            ConstantValue::String(s) => write!(f, "{s:?}"),
            ConstantValue::DocComment(s) => write!(f, "///{s}"),
            integral => match integral.as_integer() {
                Some(v) => write!(f, "{v}"),
                None => Ok(()),
            },
        }
    }
}
