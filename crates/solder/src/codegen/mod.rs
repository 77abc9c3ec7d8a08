//! C stub emission.
//!
//! Stateless generators over the package model in [`crate::ir`]:
//! - `printer`: the append-only output buffers
//! - `func`: wrapper bodies for free functions and methods
//! - `structs`: struct binding (hooks, accessors, type descriptor)
//! - `stubs`: the pass driver, preamble, and module assembly

pub mod func;
pub mod printer;
pub mod structs;
pub mod stubs;

pub use printer::SourceWriter;
pub use stubs::{GeneratedStubs, StubGenerator};
