use indoc::indoc;

use crate::codegen::EmitConfig;
use crate::diagnostics::Diagnostics;
use crate::test_utils::resolve_valid;

fn emit(source: &str) -> String {
    emit_with(source, &EmitConfig::new("ast.h"))
}

fn emit_with(source: &str, config: &EmitConfig) -> String {
    crate::generate(source, "test.tree", "CPlusPlus", config).unwrap_or_else(|err| {
        panic!(
            "generation failed:\n{}",
            err.diagnostics().printer().source(source).render()
        )
    })
}

fn emit_err(source: &str) -> Diagnostics {
    match crate::generate(source, "test.tree", "CPlusPlus", &EmitConfig::new("ast.h")) {
        Ok(_) => panic!("expected generation to fail"),
        Err(err) => err.diagnostics().clone(),
    }
}

#[test]
fn empty_spec_emits_banner_and_guard() {
    let out = emit("target CPlusPlus { header_only: true; }");
    assert!(out.starts_with(
        "// This file is auto-generated, do not edit.\n#ifndef AST_H\n#define AST_H 1\n"
    ));
    assert!(out.ends_with("#endif\n"));
}

#[test]
fn single_node_with_namespace() {
    let source = indoc! {r#"
    target CPlusPlus {
        namespace: "ast";
        use_line_directives: false;
    }
    node Expr {
        int value;
        Expr(value);
    }
    "#};

    let expected = concat!(
        "// This file is auto-generated, do not edit.\n",
        "#ifndef AST_H\n",
        "#define AST_H 1\n",
        "\n",
        "# include <string>\n",
        "\n",
        "namespace ast {\n",
        "    \n",
        "    struct Expr;\n",
        "    \n",
        "    \n",
        "    struct Expr {\n",
        "        int value;\n",
        "        Expr(int value)\n",
        "                : value(value) {}\n",
        "        virtual ~Expr();\n",
        "    };\n",
        "    \n",
        "    inline Expr::~Expr() {}\n",
        "    \n",
        "}\n",
        "\n",
        "#endif\n",
    );
    assert_eq!(emit(source), expected);
}

#[test]
fn derived_constructor_chains_up_through_the_base() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
    }
    node Base {
        int a;
        Base(a);
    }
    node Leaf : Base {
        int b;
        Leaf(b);
    }
    "#};

    let expected = concat!(
        "// This file is auto-generated, do not edit.\n",
        "#ifndef AST_H\n",
        "#define AST_H 1\n",
        "\n",
        "# include <string>\n",
        "\n",
        "struct Base;\n",
        "struct Leaf;\n",
        "\n",
        "\n",
        "struct Base {\n",
        "    int a;\n",
        "    Base(int a)\n",
        "            : a(a) {}\n",
        "    virtual ~Base();\n",
        "};\n",
        "\n",
        "struct Leaf : public Base {\n",
        "    int b;\n",
        "    Leaf(int a, int b)\n",
        "            : Base(a), \n",
        "              b(b) {}\n",
        "    virtual ~Leaf();\n",
        "};\n",
        "\n",
        "inline Base::~Base() {}\n",
        "\n",
        "inline Leaf::~Leaf() {}\n",
        "\n",
        "\n",
        "#endif\n",
    );
    assert_eq!(emit(source), expected);
}

#[test]
fn ownership_drives_the_destructor() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
    }
    node Child { }
    node Parent {
        Child c;
        weak Child back;
        list Child kids;
        Parent(c, back, kids);
    }
    "#};

    let out = emit(source);

    assert!(out.contains("    Child* c;\n"));
    assert!(out.contains("    Child* back;\n"));
    assert!(out.contains("    std::vector<Child*> kids;\n"));
    assert!(out.contains("Parent(Child* c, Child* back, std::vector<Child*> kids)"));

    assert!(out.contains(concat!(
        "inline Parent::~Parent() {\n",
        "    delete c;\n",
        "    for (auto i : kids) { delete i; };\n",
        "}\n",
    )));
    // The weak field is not released.
    assert!(!out.contains("delete back"));
    assert!(out.contains("inline Child::~Child() {}\n"));
}

#[test]
fn extern_type_with_destructor_template() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
        extern Str {
            type: "std::string";
            destruct: "/* $$ */";
        }
    }
    node S {
        Str s;
        S(s);
    }
    "#};

    let out = emit(source);
    assert!(out.contains("    std::string s;\n"));
    assert!(out.contains("S(std::string s)"));
    assert!(out.contains(concat!(
        "inline S::~S() {\n",
        "    /* s */;\n",
        "}\n",
    )));
}

#[test]
fn extern_without_destruct_template_is_not_released() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
        extern Str { type: "std::string"; }
    }
    node S { Str s; }
    "#};

    let out = emit(source);
    assert!(out.contains("inline S::~S() {}\n"));
}

#[test]
fn accessors_declare_and_define_getter_setter_pairs() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_accessors: true;
        use_line_directives: false;
    }
    node N {
        int value;
        N(value);
    }
    "#};

    let out = emit(source);

    assert!(out.contains("    int get_value() const;\n"));
    assert!(out.contains("    void set_value(int value);\n"));

    assert!(out.contains(concat!(
        "int N::get_value() const {\n",
        "    return value;\n",
        "}\n",
    )));
    // The field is itself named `value`, so the setter qualifies it.
    assert!(out.contains(concat!(
        "void N::set_value(int value) {\n",
        "    this->value = value;\n",
        "}\n",
    )));
}

#[test]
fn setter_releases_owned_node_fields_first() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_accessors: true;
        use_line_directives: false;
    }
    node Child { }
    node A {
        Child c;
        weak Child w;
    }
    "#};

    let out = emit(source);
    assert!(out.contains(concat!(
        "void A::set_c(Child* value) {\n",
        "    delete c;\n",
        "    c = value;\n",
        "}\n",
    )));
    assert!(out.contains(concat!(
        "void A::set_w(Child* value) {\n",
        "    w = value;\n",
        "}\n",
    )));
}

#[test]
fn visitors_get_one_visit_per_node_and_nodes_accept() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
    }
    visitor Visitor { }
    node A { }
    node B { }
    "#};

    let out = emit(source);

    assert!(out.contains(concat!(
        "struct Visitor {\n",
        "    void visit(A& node) {}\n",
        "    void visit(B& node) {}\n",
        "};\n",
    )));
    assert!(out.contains(concat!(
        "    void accept(Visitor& visitor) {\n",
        "        visitor.visit(*this);\n",
        "    }\n",
    )));
}

#[test]
fn includes_are_normalized() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
        includes: ["foo.h", "<vector>", """bar.h"""];
    }
    "#};

    let out = emit(source);
    assert!(out.contains("# include <string>\n"));
    assert!(out.contains("# include \"foo.h\"\n"));
    assert!(out.contains("# include <vector>\n"));
    assert!(out.contains("# include \"bar.h\"\n"));
}

#[test]
fn class_extra_statements_are_appended_to_the_body() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
        class_extra: ["friend class Pool;"];
    }
    node A { }
    "#};

    let out = emit(source);
    assert!(out.contains(concat!(
        "struct A {\n",
        "    virtual ~A();\n",
        "    friend class Pool;\n",
        "};\n",
    )));
}

#[test]
fn line_directives_bracket_spec_anchored_emissions() {
    let source = indoc! {r#"
    node Expr {
        int value;
        Expr(value);
    }
    "#};

    // No target block: the binding warns and proceeds with defaults, which
    // leave line directives on.
    let expected = concat!(
        "// This file is auto-generated, do not edit.\n",
        "#ifndef AST_H\n",
        "#define AST_H 1\n",
        "\n",
        "# include <string>\n",
        "\n",
        "struct Expr;\n",
        "\n",
        "\n",
        "# line 1 \"test.tree\"\n",
        "struct Expr {\n",
        "# line 13 \"ast.h\"\n",
        "# line 2 \"test.tree\"\n",
        "    int value;\n",
        "# line 16 \"ast.h\"\n",
        "# line 3 \"test.tree\"\n",
        "    Expr(int value)\n",
        "            : value(value) {}\n",
        "# line 20 \"ast.h\"\n",
        "    virtual ~Expr();\n",
        "};\n",
        "\n",
        "inline Expr::~Expr() {}\n",
        "\n",
        "\n",
        "#endif\n",
    );
    assert_eq!(emit(source), expected);
}

#[test]
fn line_directives_cover_includes() {
    let source = indoc! {r#"
    target CPlusPlus {
        includes: ["foo.h"];
    }
    "#};

    let out = emit(source);
    let foo = out.find("# include \"foo.h\"").expect("include present");
    let dir = out.find("# line 2 \"test.tree\"").expect("directive present");
    assert!(dir < foo);
}

#[test]
fn emission_is_idempotent() {
    let source = indoc! {r#"
    target CPlusPlus { namespace: "ast"; }
    visitor Visitor { }
    node Expr { int value; Expr(value); }
    node Unary : Expr { Expr operand; Unary(operand); }
    root Expr;
    "#};

    assert_eq!(emit(source), emit(source));
}

#[test]
fn driver_indent_override_wins_over_the_option() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
        indent: "    ";
    }
    node A { int x; }
    "#};

    let mut config = EmitConfig::new("ast.h");
    config.indent = Some("  ".to_string());
    let out = emit_with(source, &config);
    assert!(out.contains("  int x;\n"));
    assert!(!out.contains("    int x;\n"));
}

#[test]
fn indent_option_applies_when_no_override() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
        indent: "  ";
    }
    node A { int x; }
    "#};

    let out = emit(source);
    assert!(out.contains("  int x;\n"));
}

#[test]
fn guard_macro_derives_from_the_output_filename() {
    let out = emit_with(
        "target CPlusPlus { }",
        &EmitConfig::new("gen/tree-nodes.hh"),
    );
    assert!(out.contains("#ifndef TREE_NODES_HH\n"));
    assert!(out.contains("#define TREE_NODES_HH 1\n"));
}

#[test]
fn multiple_ctor_signatures_each_get_a_constructor() {
    let source = indoc! {r#"
    target CPlusPlus { use_line_directives: false; }
    node N {
        int a;
        int b;
        N(a);
        N(b);
    }
    "#};

    let out = emit(source);
    assert!(out.contains(concat!(
        "    N(int a)\n",
        "            : a(a) {}\n",
    )));
    assert!(out.contains(concat!(
        "    N(int b)\n",
        "            : b(b) {}\n",
    )));
}

#[test]
fn ctor_naming_an_inherited_field_does_not_duplicate_the_parameter() {
    let source = indoc! {r#"
    target CPlusPlus { use_line_directives: false; }
    node Base { int a; Base(a); }
    node Leaf : Base { int b; Leaf(a, b); }
    "#};

    let out = emit(source);
    // `a` arrives once via the inherited first-constructor walk; the
    // initializer list only touches own fields.
    assert!(out.contains(concat!(
        "    Leaf(int a, int b)\n",
        "            : Base(a), \n",
        "              b(b) {}\n",
    )));
}

#[test]
fn deep_chain_accumulates_ancestor_parameters() {
    let mut source = String::from("target CPlusPlus { use_line_directives: false; }\n");
    for i in 0..6 {
        if i == 0 {
            source.push_str("node N0 { int f0; N0(f0); }\n");
        } else {
            source.push_str(&format!(
                "node N{i} : N{} {{ int f{i}; N{i}(f{i}); }}\n",
                i - 1
            ));
        }
    }

    let out = emit(&source);
    assert!(out.contains("N5(int f0, int f1, int f2, int f3, int f4, int f5)"));
    assert!(out.contains(": N4(f0, f1, f2, f3, f4), \n"));
}

#[test]
fn many_independent_nodes() {
    let mut source = String::from("target CPlusPlus { use_line_directives: false; }\n");
    for i in 0..20 {
        source.push_str(&format!("node Node{i} {{ int field{i}; Node{i}(field{i}); }}\n"));
    }

    let out = emit(&source);
    for i in 0..20 {
        assert!(out.contains(&format!("struct Node{i};\n")));
        assert!(out.contains(&format!("inline Node{i}::~Node{i}() {{}}\n")));
    }
}

#[test]
fn base_without_ctors_still_gets_a_chain_up() {
    let source = indoc! {r#"
    target CPlusPlus { use_line_directives: false; }
    node Base { }
    node Leaf : Base { int b; Leaf(b); }
    "#};

    let out = emit(source);
    assert!(out.contains(concat!(
        "    Leaf(int b)\n",
        "            : Base(), \n",
        "              b(b) {}\n",
    )));
}

#[test]
fn abstract_flag_does_not_change_emission() {
    let source = indoc! {r#"
    target CPlusPlus { use_line_directives: false; }
    abstract node Expr { }
    node Lit : Expr { }
    "#};

    let out = emit(source);
    assert!(out.contains("struct Expr {\n"));
    assert!(out.contains("struct Lit : public Expr {\n"));
}

#[test]
fn unknown_target_is_an_error() {
    let err = crate::generate(
        "node A { }",
        "test.tree",
        "Bogus",
        &EmitConfig::new("ast.h"),
    )
    .expect_err("unknown target");
    let diag = err.diagnostics();
    assert!(diag.iter().any(|d| d.message() == "unknown target `Bogus`"));
}

#[test]
fn unknown_target_error_points_at_the_spec_block() {
    let source = "target Bogus { }";
    let err = crate::generate(source, "test.tree", "Bogus", &EmitConfig::new("ast.h"))
        .expect_err("unknown target");
    let diag = err.diagnostics();
    let d = diag.iter().next().expect("diagnostic");
    let range = d.range().expect("located at the target block");
    assert_eq!(&source[std::ops::Range::<usize>::from(range)], "Bogus");
}

#[test]
fn missing_target_block_warns_and_uses_defaults() {
    let spec = resolve_valid("node A { }");
    let mut diag = Diagnostics::new();
    let out = crate::codegen::generate(
        &spec,
        "node A { }",
        "CPlusPlus",
        &EmitConfig::new("ast.h"),
        &mut diag,
    );
    assert!(out.is_some());
    assert!(diag.has_warnings());
    assert!(!diag.has_errors());
}

#[test]
fn extern_bound_only_in_another_target_cannot_be_spelled() {
    let source = indoc! {r#"
    target CPlusPlus { use_line_directives: false; }
    target Other {
        extern Str { type: "GString*"; }
    }
    node S { Str s; }
    "#};

    let diag = emit_err(source);
    assert!(diag.iter().any(|d| {
        d.message()
            == "extern type `Str` does not specify a `type` option for codegen target `CPlusPlus`"
    }));
}

#[test]
fn non_string_include_entry_is_an_error() {
    let diag = emit_err("target CPlusPlus { includes: [42]; }");
    assert!(diag.iter().any(|d| d.message().contains("`includes`")));
}

#[test]
fn recognized_but_unused_options_are_accepted() {
    let source = indoc! {r#"
    target CPlusPlus {
        use_line_directives: false;
        allocator: "new $@";
        deleter: "delete $$";
        prolog: "";
        epilog: "";
        header_only: true;
        extern Str { type: "std::string"; construct: "std::string()"; }
    }
    node S { Str s; }
    "#};

    let out = emit(source);
    assert!(out.contains("std::string s;"));
}
