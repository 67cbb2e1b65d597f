use crate::transforms::helpers::{HelperEmitMode, HelpersNeeded, emit_prelude};

#[test]
fn test_dependency_closure_for_get() {
    let needed = HelpersNeeded::PRIVATE_FIELD_GET.with_dependencies();
    assert!(needed.contains(HelpersNeeded::EXTRACT_DESCRIPTOR));
    assert!(needed.contains(HelpersNeeded::APPLY_GET));
    assert!(!needed.contains(HelpersNeeded::APPLY_SET));
    assert!(!needed.contains(HelpersNeeded::CHECK_REDECLARATION));
}

#[test]
fn test_dependency_closure_for_init() {
    let needed = HelpersNeeded::PRIVATE_FIELD_INIT.with_dependencies();
    assert!(needed.contains(HelpersNeeded::CHECK_REDECLARATION));
    assert!(!needed.contains(HelpersNeeded::EXTRACT_DESCRIPTOR));
}

#[test]
fn test_empty_prelude() {
    assert_eq!(
        emit_prelude(HelpersNeeded::empty(), &HelperEmitMode::Inline),
        ""
    );
    assert_eq!(
        emit_prelude(
            HelpersNeeded::empty(),
            &HelperEmitMode::Import {
                module: "@esdown/runtime".to_string()
            }
        ),
        ""
    );
}

#[test]
fn test_inline_prelude_contains_helper_and_dependencies() {
    let prelude = emit_prelude(HelpersNeeded::PRIVATE_FIELD_GET, &HelperEmitMode::Inline);
    assert!(prelude.contains("function _classPrivateFieldGet(receiver, privateMap)"));
    assert!(prelude.contains("function _classExtractFieldDescriptor(receiver, privateMap, action)"));
    assert!(prelude.contains("function _classApplyDescriptorGet(receiver, descriptor)"));
    assert!(!prelude.contains("_classPrivateFieldSet"));
    assert!(!prelude.contains("_checkPrivateRedeclaration"));
}

#[test]
fn test_inline_prelude_emits_leaves_before_composites() {
    let prelude = emit_prelude(HelpersNeeded::PRIVATE_FIELD_SET, &HelperEmitMode::Inline);
    let extract = prelude.find("function _classExtractFieldDescriptor").unwrap();
    let set = prelude.find("function _classPrivateFieldSet").unwrap();
    assert!(extract < set);
}

#[test]
fn test_inline_prelude_emits_each_helper_once() {
    // Requesting overlapping composites still yields one body per helper.
    let needed = HelpersNeeded::PRIVATE_FIELD_GET
        | HelpersNeeded::PRIVATE_FIELD_SET
        | HelpersNeeded::EXTRACT_DESCRIPTOR;
    let prelude = emit_prelude(needed, &HelperEmitMode::Inline);
    assert_eq!(
        prelude
            .matches("function _classExtractFieldDescriptor")
            .count(),
        1
    );
}

#[test]
fn test_import_mode_single_statement() {
    let prelude = emit_prelude(
        HelpersNeeded::PRIVATE_FIELD_INIT,
        &HelperEmitMode::Import {
            module: "@esdown/runtime".to_string(),
        },
    );
    assert_eq!(
        prelude,
        "import { _checkPrivateRedeclaration, _classPrivateFieldInit } from \"@esdown/runtime\";\n"
    );
}

#[test]
fn test_redeclaration_guard_message() {
    let prelude = emit_prelude(HelpersNeeded::CHECK_REDECLARATION, &HelperEmitMode::Inline);
    assert!(
        prelude.contains("Cannot initialize the same private elements twice on an object")
    );
}
