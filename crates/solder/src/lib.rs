//! Solder: CPython extension stub generator for host packages.
//!
//! Given a resolved description of a statically typed host package's public
//! surface (structs, fields, free functions, methods, and their type
//! signatures), solder emits the C source of a native extension module that
//! exposes that surface to Python through the CPython ABI.  Generation is
//! purely textual: no host code is executed and no Python source is parsed.
//!
//! # Architecture
//!
//! - `ir`: the immutable package model (types, symbols, packages)
//! - `codegen`: stateless emitters producing the declaration and
//!   definition streams of one extension source unit
//! - `error`: classification errors and the per-pass accumulator
//!
//! The model is produced by an external type-resolution stage; compiling
//! the emitted C and supplying the matching bridge entry points is the
//! companion build step's job.  Emitted symbol names are deterministic
//! functions of the identifiers in the model, so both sides always agree.
//!
//! # Usage
//!
//! ```
//! use solder::{Field, Func, HostType, Package, StructBind, StubGenerator, Var};
//!
//! let pkg = Package::new("shapes", "example.org/shapes")
//!     .struct_bind(
//!         StructBind::new("Circle", "shapes_Circle")
//!             .field(Field::new("Radius", HostType::Float64))
//!             .method(
//!                 Func::new("Area", "shapes_Circle_Area")
//!                     .returns(Var::unnamed(HostType::Float64)),
//!             ),
//!     )
//!     .func(
//!         Func::new("Add", "shapes_Add")
//!             .param(Var::new("a", HostType::Int))
//!             .param(Var::new("b", HostType::Int))
//!             .returns(Var::unnamed(HostType::Int)),
//!     );
//!
//! let stubs = StubGenerator::new(&pkg).generate().unwrap();
//! assert!(stubs.render().contains("PyInit_shapes"));
//! ```
//!
//! Classification failures never abort a pass: every unmappable type is
//! recorded and reported together at the end, and `generate_partial` hands
//! back the partial artifact alongside the errors for callers that want to
//! emit it anyway.

pub mod codegen;
pub mod error;
pub mod ir;

// Re-export commonly used types
pub use codegen::{GeneratedStubs, SourceWriter, StubGenerator};
pub use error::{ClassifyError, ErrorList, GenError};
pub use ir::{Field, Func, HostType, Package, Signature, StructBind, TypeMap, Var};
