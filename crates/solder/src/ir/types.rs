//! Host type classification for the C stub generator.
//!
//! Every host-side type that can appear in an exposed signature or field is
//! mapped to three independent pieces of information:
//!
//! - the `PyArg_ParseTuple` format code used to receive it from Python,
//! - the C storage type a wrapper declares for it, and
//! - the `Py_BuildValue` format code used to hand it back.
//!
//! The parse and build codes are independent: an opaque struct handle is
//! never parsed directly from a Python argument (it arrives as a generic
//! object and is unwrapped after parsing) but is packed as an opaque
//! capsule on the way out.
//!
//! ## Mapping table
//!
//! | Host type | Parse | C storage            | Build |
//! |-----------|-------|----------------------|-------|
//! | `int`     | `i`   | `int`                | `i`   |
//! | `int8`    | `b`   | `signed char`        | `b`   |
//! | `int16`   | `h`   | `short`              | `h`   |
//! | `int32`   | `i`   | `int`                | `i`   |
//! | `int64`   | `L`   | `long long`          | `L`   |
//! | `uint`    | `I`   | `unsigned int`       | `I`   |
//! | `uint8`   | `B`   | `unsigned char`      | `B`   |
//! | `uint16`  | `H`   | `unsigned short`     | `H`   |
//! | `uint32`  | `I`   | `unsigned int`       | `I`   |
//! | `uint64`  | `K`   | `unsigned long long` | `K`   |
//! | `float32` | `f`   | `float`              | `f`   |
//! | `float64` | `d`   | `double`             | `d`   |
//! | `bool`    | `i`   | `int`                | `i`   |
//! | `string`  | `s`   | `const char*`        | `s`   |
//! | `*Struct` | `O`   | `Sol_<id>`           | `N`   |
//!
//! Composite field types are not representable in the ABI directly; they
//! are flagged `needs_wrap` and emitted behind a generated type alias.
//! Function types have no mapping at all and classify to an error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClassifyError;

/// A host-side type as seen by the binding generator.
///
/// `Struct` carries the generator identifier of an exposed struct in the
/// same package; it stands for a pointer to that struct's host value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    String,
    /// Pointer to a struct exposed by the same package.
    Struct(String),
    /// Non-primitive composite, representable only behind a generated
    /// field type alias.
    Composite(String),
    /// Function value; cannot cross the extension ABI.
    Function(String),
}

/// Result of classifying a [`HostType`] against the extension ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMap {
    /// `PyArg_ParseTuple` format code.
    pub parse_fmt: &'static str,
    /// C storage type for the wrapper-local holding the value.
    pub c_type: String,
    /// `Py_BuildValue` format code.
    pub build_fmt: &'static str,
    /// The type must be emitted behind a generated alias.
    pub needs_wrap: bool,
}

impl HostType {
    /// Map this type onto the extension ABI.
    pub fn classify(&self) -> Result<TypeMap, ClassifyError> {
        let (parse_fmt, c_type, build_fmt) = match self {
            HostType::Int | HostType::Int32 => ("i", "int", "i"),
            HostType::Int8 => ("b", "signed char", "b"),
            HostType::Int16 => ("h", "short", "h"),
            HostType::Int64 => ("L", "long long", "L"),
            HostType::Uint | HostType::Uint32 => ("I", "unsigned int", "I"),
            HostType::Uint8 => ("B", "unsigned char", "B"),
            HostType::Uint16 => ("H", "unsigned short", "H"),
            HostType::Uint64 => ("K", "unsigned long long", "K"),
            HostType::Float32 => ("f", "float", "f"),
            HostType::Float64 => ("d", "double", "d"),
            HostType::Bool => ("i", "int", "i"),
            HostType::String => ("s", "const char*", "s"),
            HostType::Struct(id) => {
                return Ok(TypeMap {
                    parse_fmt: "O",
                    c_type: format!("Sol_{id}"),
                    build_fmt: "N",
                    needs_wrap: false,
                });
            }
            HostType::Composite(name) => {
                return Ok(TypeMap {
                    parse_fmt: "O",
                    c_type: name.clone(),
                    build_fmt: "N",
                    needs_wrap: true,
                });
            }
            HostType::Function(desc) => {
                return Err(ClassifyError(format!(
                    "function type `{desc}` cannot cross the extension ABI"
                )));
            }
        };

        Ok(TypeMap {
            parse_fmt,
            c_type: c_type.to_string(),
            build_fmt,
            needs_wrap: false,
        })
    }

}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Int => write!(f, "int"),
            HostType::Int8 => write!(f, "int8"),
            HostType::Int16 => write!(f, "int16"),
            HostType::Int32 => write!(f, "int32"),
            HostType::Int64 => write!(f, "int64"),
            HostType::Uint => write!(f, "uint"),
            HostType::Uint8 => write!(f, "uint8"),
            HostType::Uint16 => write!(f, "uint16"),
            HostType::Uint32 => write!(f, "uint32"),
            HostType::Uint64 => write!(f, "uint64"),
            HostType::Float32 => write!(f, "float32"),
            HostType::Float64 => write!(f, "float64"),
            HostType::Bool => write!(f, "bool"),
            HostType::String => write!(f, "string"),
            HostType::Struct(id) => write!(f, "*{id}"),
            HostType::Composite(name) => write!(f, "{name}"),
            HostType::Function(desc) => write!(f, "func {desc}"),
        }
    }
}
