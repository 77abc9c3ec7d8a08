//! Struct binding: opaque handle storage, lifecycle hooks, field
//! accessors, method wrappers, and the aggregate type descriptor.
//!
//! Emission order is fixed so every symbol is declared before the type
//! descriptor references it: handle typedef and extension object first,
//! then destructor, constructor, initializer, field accessor pairs with
//! their registration table, method wrappers with theirs, and finally the
//! `PyTypeObject` wiring it all together.

use tracing::debug;

use crate::codegen::StubGenerator;
use crate::error::GenError;
use crate::ir::{Field, Func, HostType, StructBind};

impl<'a> StubGenerator<'a> {
    /// Emit everything for one exposed struct.
    pub(crate) fn gen_struct(&mut self, s: &StructBind) {
        let qual = format!("{}.{}", self.pkg.name, s.host_name);
        debug!(
            strct = %qual,
            fields = s.fields.len(),
            methods = s.methods.len(),
            "binding struct"
        );

        self.decl
            .line(format!("/* --- decls for struct {qual} --- */"));
        self.decl.line(format!("typedef void* {};", s.handle_sym()));
        self.decl.blank();
        self.decl.line(format!("/* Python object for {qual} */"));
        self.decl.line("typedef struct {");
        self.decl.indent();
        self.decl.line("PyObject_HEAD");
        self.decl.line(format!(
            "{} handle; /* opaque handle to the host value */",
            s.handle_sym()
        ));
        self.decl.outdent();
        self.decl.line(format!("}} {};", s.obj_sym()));
        self.decl.blank();

        self.defs.line(format!("/* --- impl for {qual} --- */"));
        self.defs.blank();

        self.gen_struct_dealloc(s, &qual);
        self.gen_struct_new(s, &qual);
        self.gen_struct_init(s, &qual);
        self.gen_struct_fields(s, &qual);
        self.gen_struct_methods(s, &qual);
        self.gen_type_object(s, &qual);
    }

    fn gen_struct_dealloc(&mut self, s: &StructBind, qual: &str) {
        self.decl.line(format!("/* tp_dealloc for {qual} */"));
        self.decl.line("static void");
        self.decl
            .line(format!("{}({} *self);", s.dealloc_sym(), s.obj_sym()));
        self.decl.blank();

        // Frees the extension object only; the host value behind the
        // handle is released by the bridge layer.
        self.defs.line(format!("/* tp_dealloc for {qual} */"));
        self.defs.line("static void");
        self.defs
            .line(format!("{}({} *self) {{", s.dealloc_sym(), s.obj_sym()));
        self.defs.indent();
        self.defs
            .line("Py_TYPE(self)->tp_free((PyObject*)self);");
        self.defs.outdent();
        self.defs.line("}");
        self.defs.blank();
    }

    fn gen_struct_new(&mut self, s: &StructBind, qual: &str) {
        self.decl.line(format!("/* tp_new for {qual} */"));
        self.decl.line("static PyObject*");
        self.decl.line(format!(
            "{}(PyTypeObject *type, PyObject *args, PyObject *kwds);",
            s.new_sym()
        ));
        self.decl.blank();

        // Allocation and handle construction back to back; there is no
        // fallible step in between in the minimal contract.
        self.defs.line(format!("/* tp_new for {qual} */"));
        self.defs.line("static PyObject*");
        self.defs.line(format!(
            "{}(PyTypeObject *type, PyObject *args, PyObject *kwds) {{",
            s.new_sym()
        ));
        self.defs.indent();
        self.defs.line(format!("{} *self;", s.obj_sym()));
        self.defs.line(format!(
            "self = ({} *)type->tp_alloc(type, 0);",
            s.obj_sym()
        ));
        self.defs
            .line(format!("self->handle = {}();", s.bridge_new_sym()));
        self.defs.line("return (PyObject*)self;");
        self.defs.outdent();
        self.defs.line("}");
        self.defs.blank();
    }

    fn gen_struct_init(&mut self, s: &StructBind, qual: &str) {
        self.decl.line(format!("/* tp_init for {qual} */"));
        self.decl.line("static int");
        self.decl.line(format!(
            "{}({} *self, PyObject *args, PyObject *kwds);",
            s.init_sym(),
            s.obj_sym()
        ));
        self.decl.blank();

        self.defs.line(format!("/* tp_init for {qual} */"));
        self.defs.line("static int");
        self.defs.line(format!(
            "{}({} *self, PyObject *args, PyObject *kwds) {{",
            s.init_sym(),
            s.obj_sym()
        ));
        self.defs.indent();
        self.defs.line("return 0;");
        self.defs.outdent();
        self.defs.line("}");
        self.defs.blank();
    }

    /// Accessor/mutator pair per exported field, plus the registration
    /// table.  Fields are indexed by declaration position, 1-based, over
    /// the full field list so bridge symbols stay stable when unexported
    /// fields are interleaved.
    fn gen_struct_fields(&mut self, s: &StructBind, qual: &str) {
        self.decl.line(format!("/* tp_getset for {qual} */"));

        let mut rows: Vec<(usize, &Field)> = Vec::new();
        for (i, f) in s.fields.iter().enumerate() {
            if !f.exported {
                continue;
            }
            let index = i + 1;
            let map = match f.ty.classify() {
                Ok(map) => map,
                Err(source) => {
                    self.record(GenError::Field {
                        strct: s.host_name.clone(),
                        name: f.name.clone(),
                        source,
                    });
                    continue;
                }
            };

            // A wrapped field type is only nameable through its alias.
            let local_ty = if map.needs_wrap {
                let alias = s.field_alias_sym(index);
                self.decl
                    .line(format!("typedef void* {alias}; /* {} */", f.ty));
                alias
            } else {
                map.c_type.clone()
            };

            self.decl.line("static PyObject*");
            self.decl.line(format!(
                "{}({} *self, void *closure); /* {} */",
                s.getter_sym(index),
                s.obj_sym(),
                f.name
            ));
            self.decl.line("static int");
            self.decl.line(format!(
                "{}({} *self, PyObject *value, void *closure);",
                s.setter_sym(index),
                s.obj_sym()
            ));
            self.decl.blank();

            self.defs.line("static PyObject*");
            self.defs.line(format!(
                "{}({} *self, void *closure) /* {} */ {{",
                s.getter_sym(index),
                s.obj_sym(),
                f.name
            ));
            self.defs.indent();
            self.defs.line(format!("{local_ty} c_ret;"));
            self.defs.blank();
            self.defs.line(format!(
                "c_ret = {}(self->handle);",
                s.bridge_getter_sym(index)
            ));
            if map.needs_wrap {
                // The conversion shape for composites belongs to the
                // bridge layer; the handle is fetched but not unpacked.
                self.defs.line("(void)c_ret;");
                self.defs.line("Py_RETURN_NONE;");
            } else if let HostType::Struct(_) = &f.ty {
                self.defs.line(format!(
                    "return Py_BuildValue(\"N\", PyCapsule_New((void*)c_ret, \"{}\", NULL));",
                    map.c_type
                ));
            } else {
                self.defs.line(format!(
                    "return Py_BuildValue(\"{}\", c_ret);",
                    map.build_fmt
                ));
            }
            self.defs.outdent();
            self.defs.line("}");
            self.defs.blank();

            self.defs.line("static int");
            self.defs.line(format!(
                "{}({} *self, PyObject *value, void *closure) /* {} */ {{",
                s.setter_sym(index),
                s.obj_sym(),
                f.name
            ));
            self.defs.indent();
            if map.needs_wrap {
                self.defs.line("return 0;");
            } else {
                self.defs.line(format!("{} c_val;", map.c_type));
                self.defs.blank();
                self.defs.line("if (value == NULL) {");
                self.defs.indent();
                self.defs.line(format!(
                    "PyErr_SetString(PyExc_TypeError, \"cannot delete attribute '{}'\");",
                    f.name
                ));
                self.defs.line("return -1;");
                self.defs.outdent();
                self.defs.line("}");
                if let HostType::Struct(id) = &f.ty {
                    // Struct-typed fields skip the parse mini-language and
                    // unwrap the extension object directly.
                    self.defs
                        .line(format!("c_val = ((_sol_{id}*)value)->handle;"));
                } else {
                    self.defs.line(format!(
                        "if (!PyArg_Parse(value, \"{}\", &c_val)) {{",
                        map.parse_fmt
                    ));
                    self.defs.indent();
                    self.defs.line("return -1;");
                    self.defs.outdent();
                    self.defs.line("}");
                }
                self.defs.line(format!(
                    "{}(self->handle, c_val);",
                    s.bridge_setter_sym(index)
                ));
                self.defs.line("return 0;");
            }
            self.defs.outdent();
            self.defs.line("}");
            self.defs.blank();

            rows.push((index, f));
        }

        self.defs.line(format!("/* tp_getset for {qual} */"));
        self.defs
            .line(format!("static PyGetSetDef {}[] = {{", s.getsets_sym()));
        self.defs.indent();
        for (index, f) in rows {
            self.defs.line(format!(
                "{{\"{name}\", (getter){}, (setter){}, \"{name}\", NULL}},",
                s.getter_sym(index),
                s.setter_sym(index),
                name = f.name
            ));
        }
        self.defs
            .line("{NULL, NULL, NULL, NULL, NULL} /* sentinel */");
        self.defs.outdent();
        self.defs.line("};");
        self.defs.blank();
    }

    /// Method wrappers and the method registration table.
    fn gen_struct_methods(&mut self, s: &StructBind, qual: &str) {
        self.decl.line(format!("/* methods for {qual} */"));
        self.decl.blank();

        let mut bound: Vec<&Func> = Vec::new();
        for m in &s.methods {
            if self.gen_func(Some(s), m) {
                bound.push(m);
            }
        }

        self.defs
            .line(format!("static PyMethodDef {}[] = {{", s.methods_sym()));
        self.defs.indent();
        for m in bound {
            let convention = if m.sig.params.is_empty() {
                "METH_NOARGS"
            } else {
                "METH_VARARGS"
            };
            self.defs.line(format!(
                "{{\"{}\", (PyCFunction){}, {}, {:?}}},",
                m.host_name,
                m.sym(),
                convention,
                m.doc_str(),
            ));
        }
        self.defs.line("{NULL, NULL, 0, NULL} /* sentinel */");
        self.defs.outdent();
        self.defs.line("};");
        self.defs.blank();
    }

    /// The aggregate type descriptor.  A stable, total slot listing;
    /// unused slots are zero-filled.
    fn gen_type_object(&mut self, s: &StructBind, qual: &str) {
        self.defs
            .line(format!("static PyTypeObject {} = {{", s.type_sym()));
        self.defs.indent();
        self.defs.line("PyVarObject_HEAD_INIT(NULL, 0)");
        self.defs.line(format!("\"{qual}\",\t/*tp_name*/"));
        self.defs
            .line(format!("sizeof({}),\t/*tp_basicsize*/", s.obj_sym()));
        self.defs.line("0,\t/*tp_itemsize*/");
        self.defs.line(format!(
            "(destructor){},\t/*tp_dealloc*/",
            s.dealloc_sym()
        ));
        self.defs.line("0,\t/*tp_vectorcall_offset*/");
        self.defs.line("0,\t/*tp_getattr*/");
        self.defs.line("0,\t/*tp_setattr*/");
        self.defs.line("0,\t/*tp_as_async*/");
        self.defs.line("0,\t/*tp_repr*/");
        self.defs.line("0,\t/*tp_as_number*/");
        self.defs.line("0,\t/*tp_as_sequence*/");
        self.defs.line("0,\t/*tp_as_mapping*/");
        self.defs.line("0,\t/*tp_hash*/");
        self.defs.line("0,\t/*tp_call*/");
        self.defs.line("0,\t/*tp_str*/");
        self.defs.line("0,\t/*tp_getattro*/");
        self.defs.line("0,\t/*tp_setattro*/");
        self.defs.line("0,\t/*tp_as_buffer*/");
        self.defs.line("Py_TPFLAGS_DEFAULT,\t/*tp_flags*/");
        self.defs.line(format!("{:?},\t/*tp_doc*/", s.doc_str()));
        self.defs.line("0,\t/*tp_traverse*/");
        self.defs.line("0,\t/*tp_clear*/");
        self.defs.line("0,\t/*tp_richcompare*/");
        self.defs.line("0,\t/*tp_weaklistoffset*/");
        self.defs.line("0,\t/*tp_iter*/");
        self.defs.line("0,\t/*tp_iternext*/");
        self.defs
            .line(format!("{},\t/*tp_methods*/", s.methods_sym()));
        self.defs.line("0,\t/*tp_members*/");
        self.defs
            .line(format!("{},\t/*tp_getset*/", s.getsets_sym()));
        self.defs.line("0,\t/*tp_base*/");
        self.defs.line("0,\t/*tp_dict*/");
        self.defs.line("0,\t/*tp_descr_get*/");
        self.defs.line("0,\t/*tp_descr_set*/");
        self.defs.line("0,\t/*tp_dictoffset*/");
        self.defs
            .line(format!("(initproc){},\t/*tp_init*/", s.init_sym()));
        self.defs.line("0,\t/*tp_alloc*/");
        self.defs.line(format!("{},\t/*tp_new*/", s.new_sym()));
        self.defs.outdent();
        self.defs.line("};");
        self.defs.blank();
    }
}
