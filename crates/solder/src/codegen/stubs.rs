//! Generation pass driver: preamble, per-entity dispatch, and the module
//! assembly tables.
//!
//! A pass owns two append-only buffers.  Declarations (handle typedefs,
//! extension object structs, forward declarations of hooks and wrappers)
//! go to the first; definitions and the registration tables go to the
//! second.  Concatenating the two yields one self-contained C source unit
//! for the package.

use tracing::debug;

use crate::codegen::SourceWriter;
use crate::error::ErrorList;
use crate::ir::{Func, Package};

/// The two output streams of a completed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStubs {
    /// Declarations stream.
    pub decls: String,
    /// Definitions stream.
    pub defs: String,
}

impl GeneratedStubs {
    /// Concatenate the streams into the final source unit.
    pub fn render(&self) -> String {
        format!("{}{}", self.decls, self.defs)
    }
}

/// One generation pass over a resolved [`Package`].
///
/// The pass is a pure, sequential transformation: the model is never
/// mutated, and the only state that grows is the two output buffers and
/// the error accumulator.  Re-running over an identical model yields
/// byte-identical output.
pub struct StubGenerator<'a> {
    pub(crate) pkg: &'a Package,
    pub(crate) decl: SourceWriter,
    pub(crate) defs: SourceWriter,
    pub(crate) errors: ErrorList,
}

impl<'a> StubGenerator<'a> {
    /// Create a pass over `pkg`.
    pub fn new(pkg: &'a Package) -> Self {
        Self {
            pkg,
            decl: SourceWriter::new(),
            defs: SourceWriter::new(),
            errors: ErrorList::new(),
        }
    }

    /// Run the pass.  Fails with the full error list when any type could
    /// not be classified; the text emitted for the remaining entities is
    /// discarded in that case.
    pub fn generate(mut self) -> Result<GeneratedStubs, ErrorList> {
        self.run();
        if self.errors.is_empty() {
            Ok(GeneratedStubs {
                decls: self.decl.finish(),
                defs: self.defs.finish(),
            })
        } else {
            Err(self.errors)
        }
    }

    /// Run the pass and hand back both the (possibly partial) artifact and
    /// the accumulated errors, leaving the emit-anyway decision to the
    /// caller.
    pub fn generate_partial(mut self) -> (GeneratedStubs, ErrorList) {
        self.run();
        (
            GeneratedStubs {
                decls: self.decl.finish(),
                defs: self.defs.finish(),
            },
            self.errors,
        )
    }

    fn run(&mut self) {
        let pkg = self.pkg;
        debug!(
            package = %pkg.name,
            structs = pkg.structs.len(),
            funcs = pkg.funcs.len(),
            "generating C stubs"
        );

        self.gen_preamble();

        for s in &pkg.structs {
            self.gen_struct(s);
        }

        let mut bound: Vec<&Func> = Vec::new();
        for f in &pkg.funcs {
            if self.gen_func(None, f) {
                bound.push(f);
            }
        }

        self.gen_module_table(&bound);
        self.gen_module_init();
    }

    fn gen_preamble(&mut self) {
        let pkg = self.pkg;
        self.decl.raw(&format!(
            "/*
  C stubs for package {name} ({path}).

  File is generated by solder. Do not edit.
*/

#ifdef _POSIX_C_SOURCE
#undef _POSIX_C_SOURCE
#endif

#include \"Python.h\"
#include \"structmember.h\"

/* bridge entry points exported by the host-side shim */
#include \"{name}.h\"

",
            name = pkg.name,
            path = pkg.import_path,
        ));
    }

    fn gen_module_table(&mut self, bound: &[&Func]) {
        let pkg = self.pkg;
        self.defs
            .line(format!("static PyMethodDef {}[] = {{", pkg.methods_sym()));
        self.defs.indent();
        for f in bound {
            self.defs.line(format!(
                "{{\"{}\", {}, METH_VARARGS, {:?}}},",
                f.host_name,
                f.sym(),
                f.doc_str(),
            ));
        }
        self.defs.line("{NULL, NULL, 0, NULL} /* sentinel */");
        self.defs.outdent();
        self.defs.line("};");
        self.defs.blank();
    }

    fn gen_module_init(&mut self) {
        let pkg = self.pkg;

        self.defs.line(format!(
            "static struct PyModuleDef {} = {{",
            pkg.module_def_sym()
        ));
        self.defs.indent();
        self.defs.line("PyModuleDef_HEAD_INIT,");
        self.defs.line(format!("\"{}\",\t/*m_name*/", pkg.name));
        self.defs.line(format!("{:?},\t/*m_doc*/", pkg.doc_str()));
        self.defs.line("-1,\t/*m_size*/");
        self.defs
            .line(format!("{},\t/*m_methods*/", pkg.methods_sym()));
        self.defs.outdent();
        self.defs.line("};");
        self.defs.blank();

        self.defs.line("PyMODINIT_FUNC");
        self.defs.line(format!("{}(void)", pkg.init_sym()));
        self.defs.line("{");
        self.defs.indent();
        self.defs.line("PyObject *module = NULL;");
        self.defs.blank();

        for s in &pkg.structs {
            self.defs.line(format!(
                "if (PyType_Ready(&{}) < 0) {{ return NULL; }}",
                s.type_sym()
            ));
        }
        if !pkg.structs.is_empty() {
            self.defs.blank();
        }

        self.defs.line(format!(
            "module = PyModule_Create(&{});",
            pkg.module_def_sym()
        ));
        self.defs.line("if (module == NULL) { return NULL; }");
        self.defs.blank();

        for s in &pkg.structs {
            self.defs.line(format!("Py_INCREF(&{});", s.type_sym()));
            self.defs.line(format!(
                "PyModule_AddObject(module, \"{}\", (PyObject*)&{});",
                s.host_name,
                s.type_sym()
            ));
            self.defs.blank();
        }

        self.defs.line("return module;");
        self.defs.outdent();
        self.defs.line("}");
        self.defs.blank();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{HostType, Var};

    fn add_pkg() -> Package {
        Package::new("calc", "example.org/calc")
            .with_doc("Arithmetic helpers.")
            .func(
                Func::new("Add", "calc_Add")
                    .param(Var::new("a", HostType::Int))
                    .param(Var::new("b", HostType::Int))
                    .returns(Var::unnamed(HostType::Int)),
            )
    }

    #[test]
    fn test_preamble_interpolation() {
        let pkg = add_pkg();
        let stubs = StubGenerator::new(&pkg).generate().unwrap();

        assert!(stubs
            .decls
            .contains("C stubs for package calc (example.org/calc)."));
        assert!(stubs.decls.contains("#include \"Python.h\""));
        assert!(stubs.decls.contains("#include \"calc.h\""));
    }

    #[test]
    fn test_module_assembly() {
        let pkg = add_pkg();
        let out = StubGenerator::new(&pkg).generate().unwrap().render();

        assert!(out.contains("static PyMethodDef sol_calc_methods[] = {"));
        assert!(out.contains("{\"Add\", sol_calc_Add, METH_VARARGS, \"\"},"));
        assert!(out.contains("{NULL, NULL, 0, NULL} /* sentinel */"));
        assert!(out.contains("static struct PyModuleDef sol_calc_module = {"));
        assert!(out.contains("\"Arithmetic helpers.\",\t/*m_doc*/"));
        assert!(out.contains("PyInit_calc(void)"));
        assert!(out.contains("module = PyModule_Create(&sol_calc_module);"));
    }

    #[test]
    fn test_determinism() {
        let pkg = add_pkg();
        let a = StubGenerator::new(&pkg).generate().unwrap();
        let b = StubGenerator::new(&pkg).generate().unwrap();
        assert_eq!(a, b);
    }
}
