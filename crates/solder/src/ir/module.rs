//! Package metadata: the unit of generation.

use serde::{Deserialize, Serialize};

use crate::ir::{Func, StructBind};

/// A fully resolved host package, ready for stub generation.
///
/// The model is built once by the type-resolution stage and is read-only
/// for the whole pass.  Struct and function identifiers are assumed unique
/// within the package; collisions are a caller precondition and are not
/// rechecked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name (also the emitted Python module name).
    pub name: String,
    /// Host import path.
    pub import_path: String,
    /// Package documentation string.
    pub doc: Option<String>,
    /// Exposed structs, in declaration order.
    pub structs: Vec<StructBind>,
    /// Exposed free functions, in declaration order.
    pub funcs: Vec<Func>,
}

impl Package {
    /// Create an empty package.
    pub fn new(name: impl Into<String>, import_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import_path: import_path.into(),
            doc: None,
            structs: Vec::new(),
            funcs: Vec::new(),
        }
    }

    /// Append an exposed struct.
    pub fn struct_bind(mut self, s: StructBind) -> Self {
        self.structs.push(s);
        self
    }

    /// Append an exposed free function.
    pub fn func(mut self, f: Func) -> Self {
        self.funcs.push(f);
        self
    }

    /// Set the documentation string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Documentation string for the module definition.
    pub fn doc_str(&self) -> &str {
        self.doc.as_deref().unwrap_or("")
    }

    /// Module-level free-function registration table.
    pub fn methods_sym(&self) -> String {
        format!("sol_{}_methods", self.name)
    }

    /// Module definition record.
    pub fn module_def_sym(&self) -> String {
        format!("sol_{}_module", self.name)
    }

    /// Module initialization entry point invoked by the runtime loader.
    pub fn init_sym(&self) -> String {
        format!("PyInit_{}", self.name)
    }

    /// Deserialize a package model handed over by the resolution stage.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize the package model.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Field, HostType, Var};

    #[test]
    fn test_package_builder() {
        let pkg = Package::new("shapes", "example.org/shapes")
            .with_doc("Geometric shapes.")
            .struct_bind(
                StructBind::new("Circle", "shapes_Circle")
                    .field(Field::new("Radius", HostType::Float64)),
            )
            .func(
                Func::new("Add", "shapes_Add")
                    .param(Var::new("a", HostType::Int))
                    .param(Var::new("b", HostType::Int))
                    .returns(Var::unnamed(HostType::Int)),
            );

        assert_eq!(pkg.structs.len(), 1);
        assert_eq!(pkg.funcs.len(), 1);
        assert_eq!(pkg.methods_sym(), "sol_shapes_methods");
        assert_eq!(pkg.init_sym(), "PyInit_shapes");
    }

    #[test]
    fn test_json_round_trip() {
        let pkg = Package::new("shapes", "example.org/shapes").func(
            Func::new("Add", "shapes_Add")
                .param(Var::new("a", HostType::Int))
                .returns(Var::unnamed(HostType::Int)),
        );

        let json = pkg.to_json().unwrap();
        let back = Package::from_json(&json).unwrap();
        assert_eq!(pkg, back);
    }
}
