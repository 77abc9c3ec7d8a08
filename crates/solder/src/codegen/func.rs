//! Wrapper emission for free functions and struct methods.
//!
//! Each exposed callable becomes one `static PyObject*` wrapper with the
//! standard `(self, args)` calling shape: declare locals, parse incoming
//! arguments in one call, adapt what needs adapting, invoke the bridge
//! entry point, pack the results.  Exactly one Python return path is
//! produced per wrapper.

use tracing::{debug, warn};

use crate::codegen::StubGenerator;
use crate::error::{ClassifyError, GenError};
use crate::ir::{BoundVar, Func, HostType, StructBind, Var};

/// A signature with every variable classified, ready for emission.
pub(crate) struct BoundSig {
    pub recv: Option<BoundVar>,
    pub params: Vec<BoundVar>,
    pub results: Vec<BoundVar>,
}

/// Classify a parameter or result position.
///
/// Composite types are representable only behind a struct field alias, so
/// they are rejected here even though they classify cleanly for fields.
fn bind_call_var(v: &Var, fallback: &str) -> Result<BoundVar, ClassifyError> {
    if let HostType::Composite(name) = &v.ty {
        return Err(ClassifyError(format!(
            "composite type `{name}` is only representable as a struct field"
        )));
    }
    v.bind(fallback)
}

impl<'a> StubGenerator<'a> {
    /// Emit the wrapper declaration and definition for one callable.
    ///
    /// Returns `false` without emitting anything when the signature has an
    /// unmappable type; the failure is recorded in the error accumulator
    /// and the callable is left out of its registration table.
    pub(crate) fn gen_func(&mut self, owner: Option<&StructBind>, f: &Func) -> bool {
        let Some(sig) = self.bind_sig(owner, f) else {
            return false;
        };

        let qual = match owner {
            Some(s) => format!("{}.{}.{}", self.pkg.name, s.host_name, f.host_name),
            None => format!("{}.{}", self.pkg.name, f.host_name),
        };
        debug!(wrapper = %f.sym(), "emitting wrapper for {qual}");

        self.decl.line(format!("/* wrapper of {qual} */"));
        self.decl.line("static PyObject*");
        self.decl
            .line(format!("{}(PyObject *self, PyObject *args);", f.sym()));
        self.decl.blank();

        self.defs.line(format!("/* wrapper of {qual} */"));
        self.defs.line("static PyObject*");
        self.defs
            .line(format!("{}(PyObject *self, PyObject *args) {{", f.sym()));
        self.defs.indent();
        self.gen_func_body(f, &sig);
        self.defs.outdent();
        self.defs.line("}");
        self.defs.blank();

        true
    }

    /// Classify the whole signature, recording every failure.
    fn bind_sig(&mut self, owner: Option<&StructBind>, f: &Func) -> Option<BoundSig> {
        let label = match owner {
            Some(s) => format!("{}.{}", s.host_name, f.host_name),
            None => f.host_name.clone(),
        };
        let mut failed = false;

        let recv = match &f.sig.recv {
            Some(v) => match v.bind("self") {
                Ok(b) => Some(b),
                Err(source) => {
                    self.record(GenError::Param {
                        func: label.clone(),
                        name: "self".to_string(),
                        source,
                    });
                    failed = true;
                    None
                }
            },
            None => None,
        };

        let mut params = Vec::with_capacity(f.sig.params.len());
        for (i, v) in f.sig.params.iter().enumerate() {
            match bind_call_var(v, &format!("arg_{i}")) {
                Ok(b) => params.push(b),
                Err(source) => {
                    let name = if v.name.is_empty() {
                        format!("arg_{i}")
                    } else {
                        v.name.clone()
                    };
                    self.record(GenError::Param {
                        func: label.clone(),
                        name,
                        source,
                    });
                    failed = true;
                }
            }
        }

        let mut results = Vec::with_capacity(f.sig.results.len());
        for (i, v) in f.sig.results.iter().enumerate() {
            match bind_call_var(v, &format!("ret_{i}")) {
                Ok(b) => results.push(b),
                Err(source) => {
                    self.record(GenError::Result {
                        func: label.clone(),
                        index: i,
                        source,
                    });
                    failed = true;
                }
            }
        }

        if failed {
            return None;
        }
        Some(BoundSig {
            recv,
            params,
            results,
        })
    }

    pub(crate) fn record(&mut self, err: GenError) {
        warn!(error = %err, "skipping entity");
        self.errors.push(err);
    }

    /// Emit the wrapper body in the fixed five-step order.
    fn gen_func_body(&mut self, f: &Func, sig: &BoundSig) {
        let w = &mut self.defs;

        // 1. Locals: receiver, parameters, then the result storage.  More
        // than one result shares a single aggregate, mirroring the bridge
        // call's aggregate return.
        if let Some(recv) = &sig.recv {
            w.line(recv.recv_decl());
        }
        for p in &sig.params {
            for decl in p.param_decls() {
                w.line(decl);
            }
        }
        match sig.results.len() {
            0 => {}
            1 => w.line(format!("{} c_sol_ret;", sig.results[0].c_type())),
            _ => w.line(format!("struct {}_return c_sol_ret;", f.bridge_sym())),
        }
        w.blank();

        if let Some(recv) = &sig.recv {
            if let Some(fixup) = recv.recv_fixup() {
                w.line(fixup);
                w.blank();
            }
        }

        // 2. One parse call over every parameter, or none at all.
        if !sig.params.is_empty() {
            let fmt: String = sig.params.iter().map(|p| p.parse_fragment().0).collect();
            let addrs: Vec<String> =
                sig.params.iter().map(|p| p.parse_fragment().1).collect();
            w.line(format!(
                "if (!PyArg_ParseTuple(args, \"{}\", {})) {{",
                fmt,
                addrs.join(", ")
            ));
            w.indent();
            w.line("return NULL;");
            w.outdent();
            w.line("}");
            w.blank();

            // 3. Post-parse fix-ups, in declaration order.
            let mut fixed = false;
            for p in &sig.params {
                if let Some(fixup) = p.fixup() {
                    w.line(fixup);
                    fixed = true;
                }
            }
            if fixed {
                w.blank();
            }
        }

        // 4. The bridge call, receiver first.
        let mut call_args: Vec<String> = Vec::new();
        if let Some(recv) = &sig.recv {
            call_args.push(recv.func_arg());
        }
        call_args.extend(sig.params.iter().map(|p| p.func_arg()));
        let call = format!("{}({});", f.bridge_sym(), call_args.join(", "));

        // 5. Result packing.
        if sig.results.is_empty() {
            w.line(call);
            w.blank();
            w.line("Py_INCREF(Py_None);");
            w.line("return Py_None;");
            return;
        }

        w.line(format!("c_sol_ret = {call}"));
        w.blank();

        let mut fmt = String::new();
        let mut values = Vec::with_capacity(sig.results.len());
        if sig.results.len() == 1 {
            let (frag, value) = sig.results[0].pack_value("c_sol_ret");
            fmt.push_str(&frag);
            values.push(value);
        } else {
            for (i, r) in sig.results.iter().enumerate() {
                let (frag, value) = r.pack_value(&format!("c_sol_ret.r{i}"));
                fmt.push_str(&frag);
                values.push(value);
            }
        }
        w.line(format!(
            "return Py_BuildValue(\"{}\", {});",
            fmt,
            values.join(", ")
        ));
    }
}
