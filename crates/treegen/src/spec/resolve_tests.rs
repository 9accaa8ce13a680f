use indoc::indoc;

use crate::test_utils::{messages, resolve_errors, resolve_valid};

use super::{FieldTypeKind, LitValue, NodeId, Primitive, TypeRef};

#[test]
fn empty_spec_resolves() {
    let spec = resolve_valid("");
    assert!(spec.nodes.is_empty());
    assert!(spec.root.is_none());
    assert_eq!(spec.filename, "test.tree");
}

#[test]
fn nodes_enter_the_type_table_in_order() {
    let spec = resolve_valid("node A { } node B { } node C { }");
    let names: Vec<&String> = spec.types.keys().collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert_eq!(spec.lookup("B"), Some(TypeRef::Node(NodeId(1))));
}

#[test]
fn externs_are_gathered_before_nodes() {
    let spec = resolve_valid(indoc! {r#"
    node A { Str s; }
    target CPlusPlus {
        extern Str { type: "std::string"; }
    }
    "#});

    // The extern claims the first table slot even though the node block
    // appears earlier in the file.
    let first = spec.types.keys().next().expect("non-empty table");
    assert_eq!(first, "Str");

    let field = &spec.nodes[0].fields[0];
    assert!(matches!(
        field.ty.kind,
        FieldTypeKind::Scalar(TypeRef::Extern(_))
    ));
}

#[test]
fn extern_in_multiple_targets_is_one_type() {
    let spec = resolve_valid(indoc! {r#"
    target CPlusPlus {
        extern Str { type: "std::string"; }
    }
    target Other {
        extern Str { type: "GString*"; }
    }
    "#});

    assert_eq!(spec.externs.len(), 1);
    assert_eq!(spec.externs[0].name, "Str");
    assert_eq!(spec.targets.len(), 2);
    assert_eq!(spec.targets[1].externs[0].options[0].name, "type");
}

#[test]
fn duplicate_node_reports_error_with_note() {
    let diag = resolve_errors("node A { } node A { }");
    assert_eq!(messages(&diag), ["duplicate node type `A`"]);
    let d = diag.iter().next().expect("diagnostic");
    let related = format!("{d}");
    assert!(related.contains("previous definition was here"));
}

#[test]
fn node_colliding_with_extern_is_a_duplicate() {
    let diag = resolve_errors(indoc! {r#"
    target CPlusPlus {
        extern Str { type: "std::string"; }
    }
    node Str { }
    "#});
    assert_eq!(messages(&diag), ["duplicate node type `Str`"]);
}

#[test]
fn field_types_bind_to_nodes() {
    let spec = resolve_valid(indoc! {r#"
    node Child { }
    node Parent {
        Child c;
        weak Child back;
        list Child kids;
        weak list Child weak_kids;
        int n;
    }
    "#});

    let parent = &spec.nodes[1];
    let child = NodeId(0);

    assert!(!parent.fields[0].ty.weak);
    assert!(matches!(
        parent.fields[0].ty.kind,
        FieldTypeKind::Scalar(TypeRef::Node(id)) if id == child
    ));

    assert!(parent.fields[1].ty.weak);

    let FieldTypeKind::List(ref elem) = parent.fields[2].ty.kind else {
        panic!("expected list");
    };
    assert!(!elem.weak);
    assert_eq!(elem.ty, TypeRef::Node(child));

    // `weak list` marks both the field and the element.
    assert!(parent.fields[3].ty.weak);
    let FieldTypeKind::List(ref elem) = parent.fields[3].ty.kind else {
        panic!("expected list");
    };
    assert!(elem.weak);

    assert!(matches!(
        parent.fields[4].ty.kind,
        FieldTypeKind::Scalar(TypeRef::Primitive(Primitive::Int))
    ));
}

#[test]
fn multiple_declarators_share_a_type() {
    let spec = resolve_valid("node N { int a, b, c; }");
    let names: Vec<&str> = spec.nodes[0].fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn unresolved_field_type_fails() {
    let diag = resolve_errors("node A { Missing m; }");
    assert_eq!(messages(&diag), ["unresolved field type `Missing`"]);
}

#[test]
fn unresolved_list_element_type_fails() {
    let diag = resolve_errors("node A { list Missing ms; }");
    assert_eq!(messages(&diag), ["unresolved list element type `Missing`"]);
}

#[test]
fn base_binds_to_node() {
    let spec = resolve_valid("node Base { } node Leaf : Base { }");
    assert_eq!(spec.nodes[1].base, Some(NodeId(0)));
    assert_eq!(spec.ancestry(NodeId(1)), [NodeId(0)]);
}

#[test]
fn ancestry_is_root_first() {
    let spec = resolve_valid("node A { } node B : A { } node C : B { }");
    assert_eq!(spec.ancestry(NodeId(2)), [NodeId(0), NodeId(1)]);
}

#[test]
fn unresolved_base_fails() {
    let diag = resolve_errors("node Leaf : Missing { }");
    assert_eq!(messages(&diag), ["unresolved base node type `Missing`"]);
}

#[test]
fn extern_as_base_fails() {
    let diag = resolve_errors(indoc! {r#"
    target CPlusPlus {
        extern Str { type: "std::string"; }
    }
    node Leaf : Str { }
    "#});
    assert_eq!(messages(&diag), ["base type `Str` is not a node"]);
}

#[test]
fn self_cycle_is_rejected() {
    let diag = resolve_errors("node A : A { }");
    assert_eq!(messages(&diag), ["cyclic base chain involving node `A`"]);
}

#[test]
fn two_node_cycle_is_rejected() {
    let diag = resolve_errors("node A : B { } node B : A { }");
    assert!(
        messages(&diag)
            .iter()
            .all(|m| m.starts_with("cyclic base chain"))
    );
    assert!(diag.error_count() >= 1);
}

#[test]
fn root_binds_to_node() {
    let spec = resolve_valid("node Expr { } root Expr;");
    assert_eq!(spec.root.as_ref().map(|r| r.node), Some(NodeId(0)));
}

#[test]
fn last_root_declaration_wins() {
    let spec = resolve_valid("node A { } node B { } root A; root B;");
    assert_eq!(spec.root.as_ref().map(|r| r.node), Some(NodeId(1)));
}

#[test]
fn unresolved_root_fails() {
    let diag = resolve_errors("root Missing;");
    assert_eq!(messages(&diag), ["unresolved root node type `Missing`"]);
}

#[test]
fn extern_as_root_fails() {
    let diag = resolve_errors(indoc! {r#"
    target CPlusPlus {
        extern Str { type: "std::string"; }
    }
    root Str;
    "#});
    assert_eq!(messages(&diag), ["root type `Str` is not a node"]);
}

#[test]
fn ctor_args_resolve_against_own_fields() {
    let spec = resolve_valid("node N { int a; N(a); }");
    assert_eq!(spec.nodes[0].ctors[0].args[0].name, "a");
}

#[test]
fn ctor_args_resolve_against_ancestor_fields() {
    resolve_valid(indoc! {r#"
    node Base { int a; Base(a); }
    node Leaf : Base { int b; Leaf(a, b); }
    "#});
}

#[test]
fn unknown_ctor_arg_fails() {
    let diag = resolve_errors("node N { int a; N(missing); }");
    assert_eq!(
        messages(&diag),
        ["constructor argument `missing` does not name a field of `N` or its base types"]
    );
}

#[test]
fn literal_values_decode() {
    let spec = resolve_valid(indoc! {r#"
    node N {
        int dec = 1_000;
        int hex = 0x2A;
        int bin = 0b1010;
        int oct = 0o17;
        int zero = 0;
        int leading = 017;
        float f = 1.5;
        bool flag = true;
        string s = "say ""hi""";
        string c = 'x';
        string n = null;
        string call = Make();
    }
    "#});

    let values: Vec<&LitValue> = spec.nodes[0]
        .fields
        .iter()
        .map(|f| &f.default.as_ref().expect("default").value)
        .collect();

    assert_eq!(values[0], &LitValue::Int(1000));
    assert_eq!(values[1], &LitValue::Int(42));
    assert_eq!(values[2], &LitValue::Int(10));
    assert_eq!(values[3], &LitValue::Int(15));
    assert_eq!(values[4], &LitValue::Int(0));
    assert_eq!(values[5], &LitValue::Int(15));
    assert_eq!(values[6], &LitValue::Float(1.5));
    assert_eq!(values[7], &LitValue::Bool(true));
    assert_eq!(values[8], &LitValue::Str("say \"hi\"".to_string()));
    assert_eq!(values[9], &LitValue::Char("x".to_string()));
    assert_eq!(values[10], &LitValue::Null);
    assert_eq!(values[11], &LitValue::Call("Make".to_string()));
}

#[test]
fn option_values_are_unquoted() {
    let spec = resolve_valid(indoc! {r#"
    target CPlusPlus {
        namespace: "ast";
        includes: ["a.h", "<vector>"];
    }
    "#});

    let target = &spec.targets[0];
    assert_eq!(target.options[0].value.as_str(), Some("ast"));
    let list = target.options[1].value.as_list().expect("list");
    assert_eq!(list[0].as_str(), Some("a.h"));
    assert_eq!(list[1].as_str(), Some("<vector>"));
}

#[test]
fn spans_point_into_the_source() {
    let source = "node Expr { int value; }";
    let spec = resolve_valid(source);
    let node = &spec.nodes[0];
    let span = std::ops::Range::<usize>::from(node.span);
    assert_eq!(&source[span], "Expr");
    let field_span = std::ops::Range::<usize>::from(node.fields[0].span);
    assert_eq!(&source[field_span], "value");
}

#[test]
fn all_resolution_errors_accumulate() {
    let diag = resolve_errors(indoc! {r#"
    node A { Missing1 x; }
    node B : Missing2 { }
    root Missing3;
    "#});
    assert_eq!(diag.error_count(), 3);
}
