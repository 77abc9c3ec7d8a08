//! Whole-artifact scenarios for the stub generator.

use solder::{Field, Func, HostType, Package, StructBind, StubGenerator, Var};

fn shapes_pkg() -> Package {
    Package::new("shapes", "example.org/shapes")
        .with_doc("Basic plane geometry.")
        .struct_bind(
            StructBind::new("Circle", "shapes_Circle")
                .with_doc("A circle in the plane.")
                .field(Field::new("Radius", HostType::Float64))
                .method(
                    Func::new("Area", "shapes_Circle_Area")
                        .with_doc("Area returns the enclosed area.")
                        .returns(Var::unnamed(HostType::Float64)),
                ),
        )
        .func(
            Func::new("Add", "shapes_Add")
                .param(Var::new("a", HostType::Int))
                .param(Var::new("b", HostType::Int))
                .returns(Var::unnamed(HostType::Int)),
        )
}

/// Text of one brace-delimited static table, starting at `header`.
fn table<'a>(out: &'a str, header: &str) -> &'a str {
    let start = out
        .find(header)
        .unwrap_or_else(|| panic!("missing table {header}"));
    let end = out[start..].find("};").expect("unterminated table") + start;
    &out[start..end]
}

fn entry_count(table: &str) -> usize {
    table.lines().filter(|l| l.trim_start().starts_with('{')).count()
}

#[test]
fn shapes_scenario() {
    let out = StubGenerator::new(&shapes_pkg())
        .generate()
        .unwrap()
        .render();

    // Getter/setter pair for Radius, registered once.
    assert!(out.contains("_sol_shapes_Circle_getter_1"));
    assert!(out.contains("_sol_shapes_Circle_setter_1"));
    let getsets = table(&out, "static PyGetSetDef _sol_shapes_Circle_getsets[] = {");
    assert_eq!(entry_count(getsets), 2); // Radius + sentinel

    // Parameterless method uses the no-argument convention and packs one
    // scalar result directly.
    let methods = table(&out, "static PyMethodDef _sol_shapes_Circle_methods[] = {");
    assert_eq!(entry_count(methods), 2); // Area + sentinel
    assert!(methods.contains("METH_NOARGS"));
    assert!(out.contains("double c_sol_ret;"));
    assert!(out.contains("return Py_BuildValue(\"d\", c_sol_ret);"));

    // Type descriptor wires both tables.
    assert!(out.contains("_sol_shapes_Circle_methods,\t/*tp_methods*/"));
    assert!(out.contains("_sol_shapes_Circle_getsets,\t/*tp_getset*/"));

    // Free function registered at module level with the variable-argument
    // convention.
    let module = table(&out, "static PyMethodDef sol_shapes_methods[] = {");
    assert_eq!(entry_count(module), 2); // Add + sentinel
    assert!(module.contains("{\"Add\", sol_shapes_Add, METH_VARARGS, \"\"},"));

    // Module init binds the struct type under its host name.
    assert!(out.contains("if (PyType_Ready(&_sol_shapes_CircleType) < 0) { return NULL; }"));
    assert!(out.contains("Py_INCREF(&_sol_shapes_CircleType);"));
    assert!(out
        .contains("PyModule_AddObject(module, \"Circle\", (PyObject*)&_sol_shapes_CircleType);"));
}

#[test]
fn add_scenario_parses_exactly_two_ints() {
    let out = StubGenerator::new(&shapes_pkg())
        .generate()
        .unwrap()
        .render();

    assert!(out.contains("if (!PyArg_ParseTuple(args, \"ii\", &c_a, &c_b)) {"));
    assert!(out.contains("int c_sol_ret;"));
    assert!(out.contains("c_sol_ret = Sol_shapes_Add(c_a, c_b);"));
    assert!(out.contains("return Py_BuildValue(\"i\", c_sol_ret);"));
}

#[test]
fn declarations_precede_definitions() {
    let stubs = StubGenerator::new(&shapes_pkg()).generate().unwrap();

    // Preamble and forward declarations live in the first stream only.
    assert!(stubs.decls.contains("#include \"Python.h\""));
    assert!(stubs.decls.contains("typedef void* Sol_shapes_Circle;"));
    assert!(!stubs.defs.contains("#include"));

    // Tables and hooks are definitions.
    assert!(stubs.defs.contains("static PyTypeObject _sol_shapes_CircleType"));
    assert!(stubs.defs.contains("PyInit_shapes"));

    let out = stubs.render();
    let typedef_at = out.find("typedef void* Sol_shapes_Circle;").unwrap();
    let descriptor_at = out.find("static PyTypeObject").unwrap();
    assert!(typedef_at < descriptor_at);
}

#[test]
fn unmappable_type_is_best_effort() {
    let pkg = shapes_pkg().func(
        Func::new("OnChange", "shapes_OnChange")
            .param(Var::new("cb", HostType::Function("func(float64)".into()))),
    );

    let gen = StubGenerator::new(&pkg);
    let (stubs, errs) = gen.generate_partial();

    // The failure is recorded once and names the offending parameter.
    assert_eq!(errs.len(), 1);
    let msg = errs.to_string();
    assert!(msg.contains("OnChange"));
    assert!(msg.contains("`cb`"));

    // Everything else was still generated.
    let out = stubs.render();
    assert!(out.contains("sol_shapes_Add"));
    assert!(out.contains("_sol_shapes_CircleType"));
    assert!(!out.contains("sol_shapes_OnChange"));

    // The skipped function is absent from the registration table.
    let module = table(&out, "static PyMethodDef sol_shapes_methods[] = {");
    assert!(!module.contains("OnChange"));

    // And generate() on the same model refuses with the same errors.
    let err = StubGenerator::new(&pkg).generate().unwrap_err();
    assert_eq!(err, errs);
}

#[test]
fn two_passes_are_byte_identical() {
    let pkg = shapes_pkg();
    let a = StubGenerator::new(&pkg).generate().unwrap().render();
    let b = StubGenerator::new(&pkg).generate().unwrap().render();
    assert_eq!(a, b);
}

#[test]
fn model_round_trips_through_json() {
    let pkg = shapes_pkg();
    let handed_over = Package::from_json(&pkg.to_json().unwrap()).unwrap();

    let a = StubGenerator::new(&pkg).generate().unwrap().render();
    let b = StubGenerator::new(&handed_over).generate().unwrap().render();
    assert_eq!(a, b);
}

#[test]
fn multi_struct_module_binds_each_type() {
    let pkg = Package::new("geo", "example.org/geo")
        .struct_bind(StructBind::new("Point", "geo_Point").field(Field::new("X", HostType::Float64)))
        .struct_bind(StructBind::new("Line", "geo_Line"));

    let out = StubGenerator::new(&pkg).generate().unwrap().render();

    for ty in ["_sol_geo_PointType", "_sol_geo_LineType"] {
        assert!(out.contains(&format!("if (PyType_Ready(&{ty}) < 0) {{ return NULL; }}")));
        assert!(out.contains(&format!("Py_INCREF(&{ty});")));
    }

    // A struct with no fields or methods still gets sentinel-only tables.
    let getsets = table(&out, "static PyGetSetDef _sol_geo_Line_getsets[] = {");
    assert_eq!(entry_count(getsets), 1);
    let methods = table(&out, "static PyMethodDef _sol_geo_Line_methods[] = {");
    assert_eq!(entry_count(methods), 1);
}
