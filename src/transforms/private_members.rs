//! Class Lowering Engine and unit-level driver.
//!
//! [`lower_class`] turns one class declaration with private members into the
//! equivalent statement group:
//!
//! ```text
//! var _A_x = new WeakMap();          // one backing store per private name
//! class A {
//!     constructor() {
//!         _classPrivateFieldInit(this, _A_x, { value: void 0 });
//!         // ...user constructor code, reference sites rewritten...
//!     }
//! }
//! function _A_m_fn() { ... }         // hoisted private callables
//! _classPrivateFieldInit(A, _A_s, { value: 1 });   // static entries, eager
//! ```
//!
//! Instance entries initialize at constructor entry, in declaration order,
//! before any user constructor code. Static entries initialize once at class
//! definition time, keyed on the class identifier itself, through the same
//! store mechanics.
//!
//! [`PrivateMemberLowering`] drives a whole compilation unit: it owns the
//! unit-scoped state ([`UnitCx`]), threads the registry scope chain through
//! nested classes, and prepends the helper prelude the unit turned out to
//! need.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{ClassDecl, ClassMember, Expr, Module, Param, Stmt};
use crate::diagnostics::DiagnosticBag;
use crate::span::Span;
use crate::transforms::helpers::{
    HELPER_PRIVATE_FIELD_INIT, HelperEmitMode, HelpersNeeded, emit_prelude,
};
use crate::transforms::private_registry::{
    DeclKind, DuplicateDeclaration, PrivateNameRegistry, StoreNameAllocator,
};
use crate::transforms::private_rewriter::ExpressionRewriter;

/// Unit-scoped transform state. One per compilation unit; passed by explicit
/// reference through the lowering recursion rather than held as ambient
/// state, so concurrent transforms of separate units never interfere.
pub(crate) struct UnitCx {
    pub store_names: StoreNameAllocator,
    pub helpers: HelpersNeeded,
    pub diagnostics: DiagnosticBag,
}

impl UnitCx {
    fn new() -> Self {
        UnitCx {
            store_names: StoreNameAllocator::new(),
            helpers: HelpersNeeded::empty(),
            diagnostics: DiagnosticBag::new(),
        }
    }
}

/// Result of transforming one compilation unit.
#[derive(Debug)]
pub struct TransformOutput {
    pub module: Module,
    pub diagnostics: DiagnosticBag,
}

/// The private member downlevel pass.
///
/// Consumes itself on [`transform_module`](Self::transform_module): the pass
/// carries unit-scoped state and is not reusable across units.
pub struct PrivateMemberLowering {
    mode: HelperEmitMode,
    cx: UnitCx,
}

impl Default for PrivateMemberLowering {
    fn default() -> Self {
        PrivateMemberLowering::new(HelperEmitMode::Inline)
    }
}

impl PrivateMemberLowering {
    pub fn new(mode: HelperEmitMode) -> Self {
        PrivateMemberLowering {
            mode,
            cx: UnitCx::new(),
        }
    }

    /// Transform a compilation unit. A class that fails to lower (duplicate
    /// private declaration) is dropped with a diagnostic; the rest of the
    /// unit still transforms.
    pub fn transform_module(mut self, module: Module) -> TransformOutput {
        let span = tracing::debug_span!("transform_module", statements = module.len());
        let _enter = span.enter();

        let mut scope: Vec<PrivateNameRegistry> = Vec::new();
        let body = ExpressionRewriter::rewrite_function_body(&mut self.cx, &mut scope, module);

        let mut out: Module = Vec::with_capacity(body.len() + 1);
        let prelude = emit_prelude(self.cx.helpers, &self.mode);
        if !prelude.is_empty() {
            out.push(Stmt::Raw(prelude));
        }
        out.extend(body);

        tracing::debug!(
            helpers = ?self.cx.helpers.with_dependencies(),
            errors = self.cx.diagnostics.len(),
            "unit transform complete"
        );
        TransformOutput {
            module: out,
            diagnostics: self.cx.diagnostics,
        }
    }
}

/// Lower a class, reporting failure as a diagnostic on the unit. Returns the
/// replacement statements, or nothing when the class had to be dropped.
pub(crate) fn lower_class_or_report(
    cx: &mut UnitCx,
    scope: &mut Vec<PrivateNameRegistry>,
    class: ClassDecl,
) -> Vec<Stmt> {
    let class_name = class.name.clone();
    match lower_class(cx, scope, class) {
        Ok(stmts) => stmts,
        Err(err) => {
            tracing::debug!(class = %class_name, %err, "dropping class");
            cx.diagnostics
                .error(Span::synthesized(), err.to_string(), 2300);
            Vec::new()
        }
    }
}

/// Planned backing-store entry for one private name.
enum DescriptorPlan {
    /// `{ value: <initializer or void 0> }`
    Value(Option<Expr>),
    /// `{ value: <hoisted function> }`
    Method(String),
    /// `{ get: <fn or void 0>, set: <fn or void 0> }`
    Accessor {
        get: Option<String>,
        set: Option<String>,
    },
}

impl DescriptorPlan {
    fn into_expr(self) -> Expr {
        match self {
            DescriptorPlan::Value(init) => {
                Expr::object(vec![("value", init.unwrap_or_else(Expr::void_0))])
            }
            DescriptorPlan::Method(function) => Expr::object(vec![("value", Expr::id(function))]),
            DescriptorPlan::Accessor { get, set } => Expr::object(vec![
                ("get", get.map(Expr::id).unwrap_or_else(Expr::void_0)),
                ("set", set.map(Expr::id).unwrap_or_else(Expr::void_0)),
            ]),
        }
    }
}

/// Lower one class declaration into its replacement statement group:
/// backing-store declarations, the class with private syntax removed,
/// hoisted private callables, and eager static initialization.
pub(crate) fn lower_class(
    cx: &mut UnitCx,
    scope: &mut Vec<PrivateNameRegistry>,
    class: ClassDecl,
) -> Result<Vec<Stmt>, DuplicateDeclaration> {
    let span = tracing::debug_span!("lower_class", class = %class.name);
    let _enter = span.enter();

    let ClassDecl { name, members } = class;

    // Pass 1: declare every private name. Duplicates abort the class before
    // any output is produced.
    let mut registry = PrivateNameRegistry::new(&name);
    for member in &members {
        match member {
            ClassMember::PrivateField {
                name, is_static, ..
            } => {
                registry.declare(name, DeclKind::Field, *is_static, &mut cx.store_names)?;
            }
            ClassMember::PrivateMethod {
                name, is_static, ..
            } => {
                registry.declare(name, DeclKind::Method, *is_static, &mut cx.store_names)?;
            }
            ClassMember::PrivateGetter {
                name, is_static, ..
            } => {
                registry.declare(name, DeclKind::Getter, *is_static, &mut cx.store_names)?;
            }
            ClassMember::PrivateSetter {
                name, is_static, ..
            } => {
                registry.declare(name, DeclKind::Setter, *is_static, &mut cx.store_names)?;
            }
            _ => {}
        }
    }
    tracing::debug!(private_names = registry.len(), "declared");

    // Pass 2: reserve hoisted callable names, derived from the store id so
    // they stay unique across the unit too.
    let mut method_fns: FxHashMap<String, String> = FxHashMap::default();
    let mut getter_fns: FxHashMap<String, String> = FxHashMap::default();
    let mut setter_fns: FxHashMap<String, String> = FxHashMap::default();
    for member in &members {
        match member {
            ClassMember::PrivateMethod { name, .. } => {
                let store = &registry.resolve(name).unwrap().store_id;
                method_fns.insert(
                    name.clone(),
                    cx.store_names.allocate(&format!("{store}_fn")),
                );
            }
            ClassMember::PrivateGetter { name, .. } => {
                let store = &registry.resolve(name).unwrap().store_id;
                getter_fns.insert(
                    name.clone(),
                    cx.store_names.allocate(&format!("{store}_get")),
                );
            }
            ClassMember::PrivateSetter { name, .. } => {
                let store = &registry.resolve(name).unwrap().store_id;
                setter_fns.insert(
                    name.clone(),
                    cx.store_names.allocate(&format!("{store}_set")),
                );
            }
            _ => {}
        }
    }

    // One store declaration per private name, emitted before the class so
    // hoisted callables and the constructor can reference them.
    let store_decls: Vec<Stmt> = registry
        .store_declarations()
        .map(|p| {
            Stmt::var_decl(
                &p.store_id,
                Some(Expr::new_expr(Expr::id("WeakMap"), vec![])),
            )
        })
        .collect();

    // The registry joins the scope chain for the duration of member
    // rewriting so bodies resolve this class's names (and, through the outer
    // entries, enclosing classes' names).
    scope.push(registry);

    let mut out_members: Vec<ClassMember> = Vec::new();
    let mut hoisted_fns: Vec<Stmt> = Vec::new();
    let mut instance_inits: Vec<Stmt> = Vec::new();
    let mut static_inits: Vec<Stmt> = Vec::new();
    let mut ctor: Option<(usize, Vec<Param>, Vec<Stmt>)> = None;
    let mut initialized_accessors: FxHashSet<String> = FxHashSet::default();

    // Initialization entries accumulate in declaration order; an accessor
    // pair initializes once, at its first declared half.
    let push_init =
        |inits: &mut Vec<Stmt>, is_static: bool, store: &str, descriptor: DescriptorPlan| {
            let receiver = if is_static {
                Expr::id(&name)
            } else {
                Expr::this()
            };
            inits.push(Stmt::expr(Expr::call(
                Expr::id(HELPER_PRIVATE_FIELD_INIT),
                vec![receiver, Expr::id(store), descriptor.into_expr()],
            )));
        };

    for member in members {
        match member {
            ClassMember::Constructor { parameters, body } => {
                // Placeholder keeps the constructor at its source position;
                // the body is filled in after initialization entries are
                // known.
                ctor = Some((out_members.len(), parameters, body));
                out_members.push(ClassMember::Constructor {
                    parameters: vec![],
                    body: vec![],
                });
            }
            ClassMember::Method {
                name,
                is_static,
                parameters,
                body,
            } => out_members.push(ClassMember::Method {
                name,
                is_static,
                parameters,
                body: ExpressionRewriter::rewrite_function_body(cx, scope, body),
            }),
            ClassMember::Getter {
                name,
                is_static,
                body,
            } => out_members.push(ClassMember::Getter {
                name,
                is_static,
                body: ExpressionRewriter::rewrite_function_body(cx, scope, body),
            }),
            ClassMember::Setter {
                name,
                is_static,
                parameter,
                body,
            } => out_members.push(ClassMember::Setter {
                name,
                is_static,
                parameter,
                body: ExpressionRewriter::rewrite_function_body(cx, scope, body),
            }),
            ClassMember::Property {
                name,
                is_static,
                initializer,
            } => out_members.push(ClassMember::Property {
                name,
                is_static,
                initializer: initializer.map(|init| rewrite_initializer(cx, scope, init)),
            }),
            ClassMember::PrivateField {
                name: field_name,
                is_static,
                initializer,
            } => {
                let store = scope
                    .last()
                    .and_then(|r| r.resolve(&field_name))
                    .map(|p| p.store_id.clone())
                    .unwrap_or_default();
                let inits = if is_static {
                    &mut static_inits
                } else {
                    &mut instance_inits
                };
                push_init(inits, is_static, &store, DescriptorPlan::Value(initializer));
            }
            ClassMember::PrivateMethod {
                name: method_name,
                is_static,
                parameters,
                body,
            } => {
                let store = scope
                    .last()
                    .and_then(|r| r.resolve(&method_name))
                    .map(|p| p.store_id.clone())
                    .unwrap_or_default();
                let function = method_fns[&method_name].clone();
                hoisted_fns.push(Stmt::FunctionDecl {
                    name: function.clone(),
                    parameters,
                    body: ExpressionRewriter::rewrite_function_body(cx, scope, body),
                });
                let inits = if is_static {
                    &mut static_inits
                } else {
                    &mut instance_inits
                };
                push_init(inits, is_static, &store, DescriptorPlan::Method(function));
            }
            ClassMember::PrivateGetter {
                name: accessor_name,
                is_static,
                body,
            } => {
                let store = scope
                    .last()
                    .and_then(|r| r.resolve(&accessor_name))
                    .map(|p| p.store_id.clone())
                    .unwrap_or_default();
                hoisted_fns.push(Stmt::FunctionDecl {
                    name: getter_fns[&accessor_name].clone(),
                    parameters: vec![],
                    body: ExpressionRewriter::rewrite_function_body(cx, scope, body),
                });
                if initialized_accessors.insert(accessor_name.clone()) {
                    let inits = if is_static {
                        &mut static_inits
                    } else {
                        &mut instance_inits
                    };
                    push_init(
                        inits,
                        is_static,
                        &store,
                        DescriptorPlan::Accessor {
                            get: getter_fns.get(&accessor_name).cloned(),
                            set: setter_fns.get(&accessor_name).cloned(),
                        },
                    );
                }
            }
            ClassMember::PrivateSetter {
                name: accessor_name,
                is_static,
                parameter,
                body,
            } => {
                let store = scope
                    .last()
                    .and_then(|r| r.resolve(&accessor_name))
                    .map(|p| p.store_id.clone())
                    .unwrap_or_default();
                hoisted_fns.push(Stmt::FunctionDecl {
                    name: setter_fns[&accessor_name].clone(),
                    parameters: vec![Param::new(parameter)],
                    body: ExpressionRewriter::rewrite_function_body(cx, scope, body),
                });
                if initialized_accessors.insert(accessor_name.clone()) {
                    let inits = if is_static {
                        &mut static_inits
                    } else {
                        &mut instance_inits
                    };
                    push_init(
                        inits,
                        is_static,
                        &store,
                        DescriptorPlan::Accessor {
                            get: getter_fns.get(&accessor_name).cloned(),
                            set: setter_fns.get(&accessor_name).cloned(),
                        },
                    );
                }
            }
        }
    }

    if !instance_inits.is_empty() || !static_inits.is_empty() {
        cx.helpers |= HelpersNeeded::PRIVATE_FIELD_INIT;
    }

    // Constructor: initialization entries run at entry, before any user
    // code, then the whole body rewrites as one scope so user code and field
    // initializers share temporary hoisting.
    if let Some((index, parameters, user_body)) = ctor {
        let mut body = instance_inits;
        body.extend(user_body);
        out_members[index] = ClassMember::Constructor {
            parameters,
            body: ExpressionRewriter::rewrite_function_body(cx, scope, body),
        };
    } else if !instance_inits.is_empty() {
        out_members.push(ClassMember::Constructor {
            parameters: vec![],
            body: ExpressionRewriter::rewrite_function_body(cx, scope, instance_inits),
        });
    }

    // Static entries may reference private names in their initializers.
    let static_inits = if static_inits.is_empty() {
        static_inits
    } else {
        ExpressionRewriter::rewrite_function_body(cx, scope, static_inits)
    };

    scope.pop();

    let mut out = store_decls;
    out.push(Stmt::ClassDecl(ClassDecl {
        name,
        members: out_members,
    }));
    out.extend(hoisted_fns);
    out.extend(static_inits);
    Ok(out)
}

/// Rewrite a public field initializer. A receiver temporary cannot hoist
/// into a field initializer position, so when one is needed the initializer
/// wraps in an immediately-invoked function bound to the instance.
fn rewrite_initializer(
    cx: &mut UnitCx,
    scope: &mut Vec<PrivateNameRegistry>,
    init: Expr,
) -> Expr {
    let mut body =
        ExpressionRewriter::rewrite_function_body(cx, scope, vec![Stmt::Return(Some(init))]);
    match body.pop() {
        Some(Stmt::Return(Some(expr))) if body.is_empty() => expr,
        last => {
            body.extend(last);
            Expr::method_call(
                Expr::FunctionExpr {
                    name: None,
                    parameters: vec![],
                    body,
                }
                .paren(),
                "call",
                vec![Expr::this()],
            )
        }
    }
}
