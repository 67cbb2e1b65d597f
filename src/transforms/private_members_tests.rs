//! End-to-end tests: build an input tree, lower it, print it, and compare
//! the emitted JavaScript against the expected rewrite shapes.

use crate::ast::{ClassDecl, ClassMember, Expr, Module, Param, Stmt};
use crate::printer::print_module;
use crate::transforms::helpers::HelperEmitMode;
use crate::transforms::private_members::{PrivateMemberLowering, TransformOutput};

fn transform(module: Module) -> TransformOutput {
    PrivateMemberLowering::default().transform_module(module)
}

fn emit(module: Module) -> String {
    let output = transform(module);
    assert!(
        !output.diagnostics.has_errors(),
        "unexpected diagnostics: {:?}",
        output.diagnostics
    );
    print_module(&output.module)
}

fn class(name: &str, members: Vec<ClassMember>) -> Stmt {
    Stmt::ClassDecl(ClassDecl {
        name: name.to_string(),
        members,
    })
}

#[test]
fn test_field_gets_store_and_constructor_init() {
    let js = emit(vec![class(
        "A",
        vec![ClassMember::PrivateField {
            name: "f".to_string(),
            is_static: false,
            initializer: Some(Expr::number("1")),
        }],
    )]);
    assert!(js.contains("var _A_f = new WeakMap();\n"));
    assert!(js.contains("_classPrivateFieldInit(this, _A_f, { value: 1 });"));
    // Only the init helper chain is needed for a never-referenced field.
    assert!(js.contains("function _checkPrivateRedeclaration"));
    assert!(js.contains("function _classPrivateFieldInit"));
    assert!(!js.contains("function _classPrivateFieldGet"));
}

#[test]
fn test_uninitialized_field_defaults_to_void_0() {
    let js = emit(vec![class(
        "A",
        vec![ClassMember::PrivateField {
            name: "f".to_string(),
            is_static: false,
            initializer: None,
        }],
    )]);
    assert!(js.contains("_classPrivateFieldInit(this, _A_f, { value: void 0 });"));
}

#[test]
fn test_read_and_write_rewrite() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateField {
                name: "f".to_string(),
                is_static: false,
                initializer: None,
            },
            ClassMember::Method {
                name: "m".to_string(),
                is_static: false,
                parameters: vec![Param::new("v")],
                body: vec![
                    Stmt::expr(Expr::assign(
                        Expr::private_member(Expr::this(), "f"),
                        Expr::id("v"),
                    )),
                    Stmt::ret(Some(Expr::private_member(Expr::this(), "f"))),
                ],
            },
        ],
    )]);
    assert!(js.contains("_classPrivateFieldSet(this, _A_f, v);"));
    assert!(js.contains("return _classPrivateFieldGet(this, _A_f);"));
    assert!(!js.contains("#f"));
}

#[test]
fn test_compound_assignment_expands_to_get_then_set() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateField {
                name: "f".to_string(),
                is_static: false,
                initializer: Some(Expr::number("0")),
            },
            ClassMember::Method {
                name: "bump".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::expr(Expr::binary(
                    Expr::private_member(Expr::this(), "f"),
                    "+=",
                    Expr::number("1"),
                ))],
            },
        ],
    )]);
    assert!(
        js.contains("_classPrivateFieldSet(this, _A_f, _classPrivateFieldGet(this, _A_f) + 1);")
    );
    // The read rewrite is never a valid assignment target.
    assert!(!js.contains("_classPrivateFieldGet(this, _A_f) +="));
}

#[test]
fn test_compound_assignment_evaluates_receiver_once() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateField {
                name: "f".to_string(),
                is_static: false,
                initializer: None,
            },
            ClassMember::Method {
                name: "bump".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::expr(Expr::binary(
                    Expr::private_member(
                        Expr::method_call(Expr::this(), "getInstance", vec![]),
                        "f",
                    ),
                    "*=",
                    Expr::number("2"),
                ))],
            },
        ],
    )]);
    assert!(js.contains("var _ref;"));
    assert!(js.contains(
        "_classPrivateFieldSet(_ref = this.getInstance(), _A_f, _classPrivateFieldGet(_ref, _A_f) * 2);"
    ));
    assert_eq!(js.matches("this.getInstance()").count(), 1);
}

#[test]
fn test_prefix_increment_expands_to_get_then_set() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateField {
                name: "f".to_string(),
                is_static: false,
                initializer: Some(Expr::number("0")),
            },
            ClassMember::Method {
                name: "next".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::ret(Some(Expr::PrefixUnary {
                    operator: "++".to_string(),
                    operand: Box::new(Expr::private_member(Expr::this(), "f")),
                }))],
            },
        ],
    )]);
    assert!(js.contains(
        "return _classPrivateFieldSet(this, _A_f, _classPrivateFieldGet(this, _A_f) + 1);"
    ));
    assert!(!js.contains("++_classPrivateFieldGet"));
}

#[test]
fn test_constructor_init_precedes_user_code() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateField {
                name: "f".to_string(),
                is_static: false,
                initializer: Some(Expr::number("1")),
            },
            ClassMember::Constructor {
                parameters: vec![Param::new("v")],
                body: vec![Stmt::expr(Expr::assign(
                    Expr::private_member(Expr::this(), "f"),
                    Expr::id("v"),
                ))],
            },
        ],
    )]);
    assert!(js.contains("constructor(v)"));
    let init = js.find("_classPrivateFieldInit(this, _A_f").unwrap();
    let write = js.find("_classPrivateFieldSet(this, _A_f, v)").unwrap();
    assert!(init < write);
}

#[test]
fn test_private_method_hoists_and_call_binds_receiver() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateMethod {
                name: "m".to_string(),
                is_static: false,
                parameters: vec![Param::rest("args")],
                body: vec![Stmt::ret(Some(Expr::id("args")))],
            },
            ClassMember::Method {
                name: "test".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::expr(Expr::call(
                    Expr::private_member(Expr::this(), "m"),
                    vec![
                        Expr::number("0"),
                        Expr::Spread(Box::new(Expr::id("arr"))),
                        Expr::number("3"),
                    ],
                ))],
            },
        ],
    )]);
    assert!(js.contains("_classPrivateFieldGet(this, _A_m).call(this, 0, ...arr, 3);"));
    assert!(js.contains("function _A_m_fn(...args)"));
    assert!(js.contains("_classPrivateFieldInit(this, _A_m, { value: _A_m_fn });"));
    // Hoisted callables land after the class.
    assert!(js.find("class A").unwrap() < js.find("function _A_m_fn").unwrap());
}

#[test]
fn test_construct_through_private_field() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateField {
                name: "C".to_string(),
                is_static: false,
                initializer: None,
            },
            ClassMember::Method {
                name: "make".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::ret(Some(Expr::new_expr(
                    Expr::private_member(Expr::this(), "C"),
                    vec![],
                )))],
            },
        ],
    )]);
    assert!(js.contains("return new (_classPrivateFieldGet(this, _A_C))();"));
    // The receiver is mentioned once; no temporary is synthesized.
    assert!(!js.contains("var _ref;"));
}

#[test]
fn test_complex_receiver_hoists_single_assignment_temp() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateMethod {
                name: "m".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![],
            },
            ClassMember::Method {
                name: "test".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::expr(Expr::call(
                    Expr::private_member(
                        Expr::method_call(Expr::this(), "getInstance", vec![]),
                        "m",
                    ),
                    vec![],
                ))],
            },
        ],
    )]);
    assert!(js.contains("var _ref;"));
    assert!(js.contains("_classPrivateFieldGet(_ref = this.getInstance(), _A_m).call(_ref);"));
    // The declaration precedes the use within the method body.
    assert!(js.find("var _ref;").unwrap() < js.find("_ref = this.getInstance()").unwrap());
}

#[test]
fn test_tagged_template_binds_receiver() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateMethod {
                name: "tag".to_string(),
                is_static: false,
                parameters: vec![Param::new("strings"), Param::rest("values")],
                body: vec![],
            },
            ClassMember::Method {
                name: "test".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::expr(Expr::TaggedTemplate {
                    tag: Box::new(Expr::private_member(Expr::this(), "tag")),
                    quasis: vec!["head".to_string(), "tail".to_string()],
                    expressions: vec![Expr::number("1")],
                })],
            },
        ],
    )]);
    assert!(js.contains("_classPrivateFieldGet(this, _A_tag).bind(this)`head${1}tail`;"));
}

#[test]
fn test_getter_only_accessor_emits_undefined_setter() {
    let js = emit(vec![class(
        "A",
        vec![ClassMember::PrivateGetter {
            name: "x".to_string(),
            is_static: false,
            body: vec![Stmt::ret(Some(Expr::number("1")))],
        }],
    )]);
    assert!(js.contains("function _A_x_get()"));
    assert!(js.contains("_classPrivateFieldInit(this, _A_x, { get: _A_x_get, set: void 0 });"));
}

#[test]
fn test_accessor_pair_initializes_once() {
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateGetter {
                name: "x".to_string(),
                is_static: false,
                body: vec![Stmt::ret(Some(Expr::prop(Expr::this(), "raw")))],
            },
            ClassMember::PrivateSetter {
                name: "x".to_string(),
                is_static: false,
                parameter: "value".to_string(),
                body: vec![Stmt::expr(Expr::assign(
                    Expr::prop(Expr::this(), "raw"),
                    Expr::id("value"),
                ))],
            },
        ],
    )]);
    assert!(js.contains("function _A_x_get()"));
    assert!(js.contains("function _A_x_set(value)"));
    assert!(js.contains("_classPrivateFieldInit(this, _A_x, { get: _A_x_get, set: _A_x_set });"));
    assert_eq!(js.matches("_classPrivateFieldInit(this, _A_x").count(), 1);
    assert_eq!(js.matches("var _A_x = new WeakMap();").count(), 1);
}

#[test]
fn test_static_field_initializes_eagerly_after_class() {
    let js = emit(vec![class(
        "A",
        vec![ClassMember::PrivateField {
            name: "s".to_string(),
            is_static: true,
            initializer: Some(Expr::number("1")),
        }],
    )]);
    assert!(js.contains("var _A_s = new WeakMap();\n"));
    assert!(js.contains("_classPrivateFieldInit(A, _A_s, { value: 1 });"));
    // Store before the class, static init after it.
    let store = js.find("var _A_s").unwrap();
    let class_pos = js.find("class A").unwrap();
    let init = js.find("_classPrivateFieldInit(A, _A_s").unwrap();
    assert!(store < class_pos);
    assert!(class_pos < init);
}

#[test]
fn test_duplicate_declaration_drops_class_and_continues() {
    let output = transform(vec![
        class(
            "A",
            vec![
                ClassMember::PrivateField {
                    name: "x".to_string(),
                    is_static: false,
                    initializer: None,
                },
                ClassMember::PrivateField {
                    name: "x".to_string(),
                    is_static: false,
                    initializer: None,
                },
            ],
        ),
        class(
            "B",
            vec![
                ClassMember::PrivateField {
                    name: "y".to_string(),
                    is_static: false,
                    initializer: None,
                },
                ClassMember::Method {
                    name: "m".to_string(),
                    is_static: false,
                    parameters: vec![],
                    body: vec![Stmt::ret(Some(Expr::private_member(Expr::this(), "y")))],
                },
            ],
        ),
    ]);
    assert!(output.diagnostics.has_errors());
    let diagnostic = output.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.code, 2300);
    assert_eq!(
        diagnostic.to_string(),
        "error TS2300: duplicate private name '#x' in class 'A'"
    );

    let js = print_module(&output.module);
    assert!(!js.contains("class A"));
    assert!(js.contains("class B"));
    assert!(js.contains("_classPrivateFieldGet(this, _B_y)"));
}

#[test]
fn test_unresolved_private_name_poisons_expression() {
    let output = transform(vec![Stmt::expr(Expr::private_member(
        Expr::id("a"),
        "nope",
    ))]);
    assert!(output.diagnostics.has_errors());
    let diagnostic = output.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.code, 18013);
    assert!(diagnostic.message.contains("#nope"));
    assert_eq!(print_module(&output.module), "void 0;\n");
}

#[test]
fn test_same_name_in_two_classes_uses_distinct_stores() {
    let js = emit(vec![
        class(
            "A",
            vec![ClassMember::PrivateField {
                name: "f".to_string(),
                is_static: false,
                initializer: None,
            }],
        ),
        class(
            "B",
            vec![ClassMember::PrivateField {
                name: "f".to_string(),
                is_static: false,
                initializer: None,
            }],
        ),
    ]);
    assert!(js.contains("var _A_f = new WeakMap();"));
    assert!(js.contains("var _B_f = new WeakMap();"));
    // One shared prelude for the whole unit.
    assert_eq!(js.matches("function _checkPrivateRedeclaration").count(), 1);
}

#[test]
fn test_nested_class_resolves_enclosing_private_name() {
    let js = emit(vec![class(
        "Outer",
        vec![
            ClassMember::PrivateField {
                name: "o".to_string(),
                is_static: false,
                initializer: None,
            },
            ClassMember::Method {
                name: "m".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::ClassDecl(ClassDecl {
                    name: "Inner".to_string(),
                    members: vec![ClassMember::Method {
                        name: "peek".to_string(),
                        is_static: false,
                        parameters: vec![Param::new("outer")],
                        body: vec![Stmt::ret(Some(Expr::private_member(
                            Expr::id("outer"),
                            "o",
                        )))],
                    }],
                })],
            },
        ],
    )]);
    assert!(js.contains("class Inner"));
    assert!(js.contains("return _classPrivateFieldGet(outer, _Outer_o);"));
}

#[test]
fn test_import_emit_mode() {
    let output = PrivateMemberLowering::new(HelperEmitMode::Import {
        module: "@esdown/runtime".to_string(),
    })
    .transform_module(vec![class(
        "A",
        vec![ClassMember::PrivateField {
            name: "f".to_string(),
            is_static: false,
            initializer: None,
        }],
    )]);
    let js = print_module(&output.module);
    assert!(js.starts_with(
        "import { _checkPrivateRedeclaration, _classPrivateFieldInit } from \"@esdown/runtime\";\n"
    ));
    assert!(!js.contains("function _checkPrivateRedeclaration"));
}

#[test]
fn test_class_without_private_members_passes_through() {
    let js = emit(vec![class(
        "C",
        vec![ClassMember::Method {
            name: "m".to_string(),
            is_static: false,
            parameters: vec![],
            body: vec![Stmt::ret(Some(Expr::number("1")))],
        }],
    )]);
    assert_eq!(js, "class C {\n    m() {\n        return 1;\n    }\n}\n");
}

#[test]
fn test_closure_inside_method_gets_own_temp_scope() {
    // Each function body hoists its own temporaries; the closure's `_ref`
    // declaration lands inside the closure, not the method.
    let js = emit(vec![class(
        "A",
        vec![
            ClassMember::PrivateMethod {
                name: "m".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![],
            },
            ClassMember::Method {
                name: "test".to_string(),
                is_static: false,
                parameters: vec![],
                body: vec![Stmt::ret(Some(Expr::FunctionExpr {
                    name: None,
                    parameters: vec![],
                    body: vec![Stmt::expr(Expr::call(
                        Expr::private_member(Expr::call(Expr::id("get"), vec![]), "m"),
                        vec![],
                    ))],
                }))],
            },
        ],
    )]);
    assert!(js.contains("_classPrivateFieldGet(_ref = get(), _A_m).call(_ref);"));
    let decl = js.find("var _ref;").unwrap();
    let ret = js.find("return function()").unwrap();
    assert!(ret < decl);
}
