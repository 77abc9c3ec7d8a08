//! Package model for the stub generator.
//!
//! An immutable description of a host package's public surface: exposed
//! structs with their fields and methods, free functions, and the type
//! signatures of everything.  Built once by an external resolution stage
//! and walked read-only by the emitters in [`crate::codegen`].

pub mod module;
pub mod symbol;
pub mod types;

pub use module::*;
pub use symbol::*;
pub use types::*;
