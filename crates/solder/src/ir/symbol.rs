//! Symbol metadata for exposed structs, fields, and callables.
//!
//! These types form the read-only model a generation pass walks.  Emitted
//! symbol names are pure functions of the identifiers already present here;
//! the generator invents no new identity, only new text.

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::ir::{HostType, TypeMap};

/// One parameter, result, or receiver of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    /// Host-side name; empty when the host signature left it anonymous.
    pub name: String,
    /// Host type.
    pub ty: HostType,
}

impl Var {
    /// Create a named variable.
    pub fn new(name: impl Into<String>, ty: HostType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Create an anonymous variable; a name is synthesized at bind time.
    pub fn unnamed(ty: HostType) -> Self {
        Self {
            name: String::new(),
            ty,
        }
    }

    /// Classify this variable's type and fix its emitted name.
    ///
    /// `fallback` is used when the host signature left the variable
    /// anonymous (`arg_<i>` for parameters, `ret_<i>` for results).
    pub fn bind(&self, fallback: &str) -> Result<BoundVar, ClassifyError> {
        let map = self.ty.classify()?;
        let name = if self.name.is_empty() {
            fallback.to_string()
        } else {
            self.name.clone()
        };
        Ok(BoundVar {
            name,
            ty: self.ty.clone(),
            map,
        })
    }
}

/// A [`Var`] whose type has been classified against the extension ABI.
///
/// All text fragments a wrapper body needs for this variable are produced
/// here, infallibly, from the stored [`TypeMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundVar {
    name: String,
    ty: HostType,
    map: TypeMap,
}

impl BoundVar {
    /// C storage type of the wrapper-local for this variable.
    pub fn c_type(&self) -> &str {
        &self.map.c_type
    }

    /// The variable parses as a generic Python object and is adapted after
    /// parsing, rather than parsing directly into its C storage.
    pub fn parses_as_object(&self) -> bool {
        matches!(self.ty, HostType::Struct(_) | HostType::Composite(_))
    }

    /// C local declarations for this variable as a parameter.
    ///
    /// Object-parsed types need two locals: the raw `PyObject*` the parse
    /// call fills in, and the typed value the fix-up extracts.
    pub fn param_decls(&self) -> Vec<String> {
        if self.parses_as_object() {
            vec![
                format!("PyObject *py_{} = NULL;", self.name),
                format!("{} c_{};", self.map.c_type, self.name),
            ]
        } else {
            vec![format!("{} c_{};", self.map.c_type, self.name)]
        }
    }

    /// Parse format fragment and destination address for the single
    /// `PyArg_ParseTuple` call.
    pub fn parse_fragment(&self) -> (&'static str, String) {
        if self.parses_as_object() {
            ("O", format!("&py_{}", self.name))
        } else {
            (self.map.parse_fmt, format!("&c_{}", self.name))
        }
    }

    /// Post-parse fix-up statement, if this variable needs one.
    pub fn fixup(&self) -> Option<String> {
        match &self.ty {
            HostType::Struct(id) => Some(format!(
                "c_{name} = ((_sol_{id}*)py_{name})->handle;",
                name = self.name
            )),
            _ => None,
        }
    }

    /// Receiver declaration (`self` bound as an opaque handle).
    pub fn recv_decl(&self) -> String {
        format!("{} c_{};", self.map.c_type, self.name)
    }

    /// Receiver adaptation from the wrapper's `self` argument.
    pub fn recv_fixup(&self) -> Option<String> {
        match &self.ty {
            HostType::Struct(id) => Some(format!(
                "c_{} = ((_sol_{id}*)self)->handle;",
                self.name
            )),
            _ => None,
        }
    }

    /// Expression passed to the bridge call for this variable.
    pub fn func_arg(&self) -> String {
        format!("c_{}", self.name)
    }

    /// Build format fragment and value expression packing `expr` into the
    /// returned Python value.  Struct handles leave as opaque capsules.
    pub fn pack_value(&self, expr: &str) -> (String, String) {
        match &self.ty {
            HostType::Struct(_) => (
                "N".to_string(),
                format!("PyCapsule_New((void*){expr}, \"{}\", NULL)", self.map.c_type),
            ),
            _ => (self.map.build_fmt.to_string(), expr.to_string()),
        }
    }
}

/// One member of an exposed struct's underlying composite type.
///
/// Only exported fields are bound; unexported fields are skipped without
/// an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Host field name.
    pub name: String,
    /// Field type.
    pub ty: HostType,
    /// Whether the field is exported by the host package.
    pub exported: bool,
}

impl Field {
    /// Create an exported field.
    pub fn new(name: impl Into<String>, ty: HostType) -> Self {
        Self {
            name: name.into(),
            ty,
            exported: true,
        }
    }

    /// Mark the field unexported.
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }
}

/// Ordered parameter and result lists of a callable, plus the optional
/// receiver for methods.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<Var>,
    pub results: Vec<Var>,
    pub recv: Option<Var>,
}

/// An exposed callable: a free function, or a struct method when `sig`
/// carries a receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Func {
    /// Host-side name (bound into the Python namespace under this name).
    pub host_name: String,
    /// Generator identifier used to derive emitted symbol names.
    pub id: String,
    /// Documentation string.
    pub doc: Option<String>,
    /// Type signature.
    pub sig: Signature,
}

impl Func {
    /// Create a callable with an empty signature.
    pub fn new(host_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            id: id.into(),
            doc: None,
            sig: Signature::default(),
        }
    }

    /// Append a parameter.
    pub fn param(mut self, v: Var) -> Self {
        self.sig.params.push(v);
        self
    }

    /// Append a result.
    pub fn returns(mut self, v: Var) -> Self {
        self.sig.results.push(v);
        self
    }

    /// Set the documentation string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Name of the emitted Python wrapper function.
    pub fn sym(&self) -> String {
        format!("sol_{}", self.id)
    }

    /// Name of the bridge entry point the wrapper invokes.
    pub fn bridge_sym(&self) -> String {
        format!("Sol_{}", self.id)
    }

    /// Documentation string for registration tables.
    pub fn doc_str(&self) -> &str {
        self.doc.as_deref().unwrap_or("")
    }
}

/// An exposed host struct and the methods bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructBind {
    /// Host-side type name.
    pub host_name: String,
    /// Generator identifier used to derive emitted symbol names.
    pub id: String,
    /// Documentation string.
    pub doc: Option<String>,
    /// Fields of the underlying composite type, in declaration order.
    pub fields: Vec<Field>,
    /// Bound methods, in declaration order.
    pub methods: Vec<Func>,
}

impl StructBind {
    /// Create a struct binding with no fields or methods.
    pub fn new(host_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            id: id.into(),
            doc: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Append a field.
    pub fn field(mut self, f: Field) -> Self {
        self.fields.push(f);
        self
    }

    /// Append a method.  The struct is installed as the receiver unless
    /// the callable already carries one.
    pub fn method(mut self, mut f: Func) -> Self {
        if f.sig.recv.is_none() {
            f.sig.recv = Some(Var::new("self", HostType::Struct(self.id.clone())));
        }
        self.methods.push(f);
        self
    }

    /// Set the documentation string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Documentation string for the type descriptor.
    pub fn doc_str(&self) -> &str {
        self.doc.as_deref().unwrap_or("")
    }

    // Emitted symbol names.  These, together with the bridge symbols below,
    // are the naming contract shared with the host-side shim.

    /// Opaque handle typedef.
    pub fn handle_sym(&self) -> String {
        format!("Sol_{}", self.id)
    }

    /// Extension object struct.
    pub fn obj_sym(&self) -> String {
        format!("_sol_{}", self.id)
    }

    /// Type descriptor.
    pub fn type_sym(&self) -> String {
        format!("_sol_{}Type", self.id)
    }

    /// Destructor hook.
    pub fn dealloc_sym(&self) -> String {
        format!("_sol_{}_dealloc", self.id)
    }

    /// Constructor hook.
    pub fn new_sym(&self) -> String {
        format!("_sol_{}_new", self.id)
    }

    /// Initializer hook.
    pub fn init_sym(&self) -> String {
        format!("_sol_{}_init", self.id)
    }

    /// Field accessor, 1-based by declaration position.
    pub fn getter_sym(&self, index: usize) -> String {
        format!("_sol_{}_getter_{index}", self.id)
    }

    /// Field mutator, 1-based by declaration position.
    pub fn setter_sym(&self, index: usize) -> String {
        format!("_sol_{}_setter_{index}", self.id)
    }

    /// Getter/setter registration table.
    pub fn getsets_sym(&self) -> String {
        format!("_sol_{}_getsets", self.id)
    }

    /// Method registration table.
    pub fn methods_sym(&self) -> String {
        format!("_sol_{}_methods", self.id)
    }

    /// Alias for a wrapped composite field type.
    pub fn field_alias_sym(&self, index: usize) -> String {
        format!("Sol_{}_field_{index}", self.id)
    }

    /// Bridge factory producing a fresh host value for the handle.
    pub fn bridge_new_sym(&self) -> String {
        format!("Sol_{}_new", self.id)
    }

    /// Bridge field accessor.
    pub fn bridge_getter_sym(&self, index: usize) -> String {
        format!("Sol_{}_getter_{index}", self.id)
    }

    /// Bridge field mutator.
    pub fn bridge_setter_sym(&self, index: usize) -> String {
        format!("Sol_{}_setter_{index}", self.id)
    }
}
