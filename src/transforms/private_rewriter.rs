//! Expression Rewriter.
//!
//! Replaces every private-name-qualified expression with calls into the
//! emitted helper library, preserving two properties the naive rewrite
//! breaks:
//!
//! - **Evaluation order**: the receiver sub-expression is evaluated exactly
//!   once even when the rewrite mentions it twice. A receiver that is not a
//!   side-effect-free simple reference is hoisted into a synthesized
//!   single-assignment temporary (`_ref`, `_ref1`, ...) declared at the top
//!   of the enclosing function body and assigned inline:
//!   `_classPrivateFieldGet(_ref = getInstance(), _A_f).call(_ref)`.
//! - **Receiver identity**: method and tagged invocations bind the invoked
//!   callable's `this` to the original receiver value.
//!
//! Rewrite shapes:
//!
//! | source            | emitted                                                  |
//! |-------------------|----------------------------------------------------------|
//! | `a.#x`            | `_classPrivateFieldGet(a, _A_x)`                         |
//! | `a.#x = v`        | `_classPrivateFieldSet(a, _A_x, v)`                      |
//! | `a.#x += v`       | `_classPrivateFieldSet(a, _A_x, _classPrivateFieldGet(a, _A_x) + v)` |
//! | `a.#f(args)`      | `_classPrivateFieldGet(a, _A_f).call(a, args)`           |
//! | `new a.#f(args)`  | `new (_classPrivateFieldGet(a, _A_f))(args)`             |
//! | ``a.#f`t${x}` ``  | ``_classPrivateFieldGet(a, _A_f).bind(a)`t${x}` ``       |
//!
//! The rewriter recurses through nested closures; the registry scope chain
//! flows by explicit reference through the recursion, innermost class last.

use crate::ast::{Expr, ObjectProperty, Stmt};
use crate::span::Span;
use crate::transforms::helpers::{
    HELPER_PRIVATE_FIELD_GET, HELPER_PRIVATE_FIELD_SET, HelpersNeeded,
};
use crate::transforms::private_members::{UnitCx, lower_class_or_report};
use crate::transforms::private_registry::PrivateNameRegistry;

/// Rewrites one function body. Temporaries hoist to the body being
/// rewritten; nested function bodies get their own rewriter.
pub(crate) struct ExpressionRewriter<'a> {
    cx: &'a mut UnitCx,
    scope: &'a mut Vec<PrivateNameRegistry>,
    temps: Vec<String>,
    temp_counter: u32,
}

impl<'a> ExpressionRewriter<'a> {
    /// Rewrite a function (or module) body, prepending `var _ref;`
    /// declarations for any receiver temporaries the body needed.
    pub(crate) fn rewrite_function_body(
        cx: &mut UnitCx,
        scope: &mut Vec<PrivateNameRegistry>,
        body: Vec<Stmt>,
    ) -> Vec<Stmt> {
        let mut rewriter = ExpressionRewriter {
            cx,
            scope,
            temps: Vec::new(),
            temp_counter: 0,
        };
        let rewritten = rewriter.rewrite_stmts(body);
        let mut out: Vec<Stmt> = rewriter
            .temps
            .iter()
            .map(|name| Stmt::var_decl(name, None))
            .collect();
        out.extend(rewritten);
        out
    }

    /// Get next temporary variable name
    fn next_temp(&mut self) -> String {
        let name = if self.temp_counter == 0 {
            "_ref".to_string()
        } else {
            format!("_ref{}", self.temp_counter)
        };
        self.temp_counter += 1;
        self.temps.push(name.clone());
        name
    }

    /// Resolve a private name against the scope chain, innermost class
    /// first, to its backing-store identifier.
    fn resolve_store(&self, name: &str) -> Option<String> {
        self.scope
            .iter()
            .rev()
            .find_map(|registry| registry.resolve(name).map(|p| p.store_id.clone()))
    }

    fn unresolved(&mut self, name: &str) -> Expr {
        // The checker collaborator guarantees validity; an unresolved name
        // here means the input tree was not checked. Surface it and poison
        // the expression rather than letting private syntax leak through.
        self.cx.diagnostics.error(
            Span::synthesized(),
            format!("private name '#{name}' is not declared in an enclosing class"),
            18013,
        );
        Expr::Undefined
    }

    pub(crate) fn rewrite_stmts(&mut self, stmts: Vec<Stmt>) -> Vec<Stmt> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            match stmt {
                // A class in statement position expands to several
                // statements (store declarations, the class, hoisted
                // callables, static initialization).
                Stmt::ClassDecl(class) => {
                    out.extend(lower_class_or_report(self.cx, self.scope, class));
                }
                other => out.push(self.rewrite_stmt(other)),
            }
        }
        out
    }

    fn rewrite_stmt(&mut self, stmt: Stmt) -> Stmt {
        match stmt {
            Stmt::VarDecl { name, initializer } => Stmt::VarDecl {
                name,
                initializer: initializer.map(|e| self.rewrite_expr(e)),
            },
            Stmt::Expression(expr) => Stmt::Expression(self.rewrite_expr(expr)),
            Stmt::Return(expr) => Stmt::Return(expr.map(|e| self.rewrite_expr(e))),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => Stmt::If {
                condition: self.rewrite_expr(condition),
                then_branch: Box::new(self.rewrite_branch(*then_branch)),
                else_branch: else_branch.map(|b| Box::new(self.rewrite_branch(*b))),
            },
            Stmt::While { condition, body } => Stmt::While {
                condition: self.rewrite_expr(condition),
                body: Box::new(self.rewrite_branch(*body)),
            },
            Stmt::Block(stmts) => Stmt::Block(self.rewrite_stmts(stmts)),
            Stmt::Throw(expr) => Stmt::Throw(self.rewrite_expr(expr)),
            Stmt::FunctionDecl {
                name,
                parameters,
                body,
            } => Stmt::FunctionDecl {
                name,
                parameters,
                body: ExpressionRewriter::rewrite_function_body(self.cx, self.scope, body),
            },
            Stmt::ClassDecl(class) => {
                // Only reachable for a class in a non-list position; wrap
                // the expansion so it stays one statement.
                Stmt::Block(lower_class_or_report(self.cx, self.scope, class))
            }
            passthrough @ (Stmt::Raw(_) | Stmt::Empty) => passthrough,
        }
    }

    fn rewrite_branch(&mut self, stmt: Stmt) -> Stmt {
        match stmt {
            Stmt::Block(stmts) => Stmt::Block(self.rewrite_stmts(stmts)),
            other => self.rewrite_stmt(other),
        }
    }

    pub(crate) fn rewrite_expr(&mut self, expr: Expr) -> Expr {
        match expr {
            // a.#x = v
            Expr::Binary {
                left,
                operator,
                right,
            } if operator == "=" && matches!(*left, Expr::PrivateMember { .. }) => {
                let Expr::PrivateMember { object, name } = *left else {
                    unreachable!()
                };
                let object = self.rewrite_expr(*object);
                let right = self.rewrite_expr(*right);
                let Some(store) = self.resolve_store(&name) else {
                    return self.unresolved(&name);
                };
                self.cx.helpers |= HelpersNeeded::PRIVATE_FIELD_SET;
                Expr::call(
                    Expr::id(HELPER_PRIVATE_FIELD_SET),
                    vec![object, Expr::id(store), right],
                )
            }

            // a.#x op= v, expanded into the get-then-set sequence with the
            // receiver evaluated once.
            Expr::Binary {
                left,
                operator,
                right,
            } if is_compound_assignment(&operator)
                && matches!(*left, Expr::PrivateMember { .. }) =>
            {
                let Expr::PrivateMember { object, name } = *left else {
                    unreachable!()
                };
                let object = self.rewrite_expr(*object);
                let right = self.rewrite_expr(*right);
                let Some(store) = self.resolve_store(&name) else {
                    return self.unresolved(&name);
                };
                self.cx.helpers |=
                    HelpersNeeded::PRIVATE_FIELD_GET | HelpersNeeded::PRIVATE_FIELD_SET;
                let op = operator.trim_end_matches('=').to_string();
                let (set_receiver, get_receiver) = self.receiver_pair(object);
                Expr::call(
                    Expr::id(HELPER_PRIVATE_FIELD_SET),
                    vec![
                        set_receiver,
                        Expr::id(store.clone()),
                        Expr::binary(
                            Expr::call(
                                Expr::id(HELPER_PRIVATE_FIELD_GET),
                                vec![get_receiver, Expr::id(store)],
                            ),
                            op,
                            right,
                        ),
                    ],
                )
            }

            // ++a.#x / --a.#x
            Expr::PrefixUnary { operator, operand }
                if (operator == "++" || operator == "--")
                    && matches!(*operand, Expr::PrivateMember { .. }) =>
            {
                let Expr::PrivateMember { object, name } = *operand else {
                    unreachable!()
                };
                let object = self.rewrite_expr(*object);
                let Some(store) = self.resolve_store(&name) else {
                    return self.unresolved(&name);
                };
                self.cx.helpers |=
                    HelpersNeeded::PRIVATE_FIELD_GET | HelpersNeeded::PRIVATE_FIELD_SET;
                let step = if operator == "++" { "+" } else { "-" };
                let (set_receiver, get_receiver) = self.receiver_pair(object);
                Expr::call(
                    Expr::id(HELPER_PRIVATE_FIELD_SET),
                    vec![
                        set_receiver,
                        Expr::id(store.clone()),
                        Expr::binary(
                            Expr::call(
                                Expr::id(HELPER_PRIVATE_FIELD_GET),
                                vec![get_receiver, Expr::id(store)],
                            ),
                            step,
                            Expr::number("1"),
                        ),
                    ],
                )
            }

            // a.#f(args)
            Expr::Call { callee, arguments } if matches!(*callee, Expr::PrivateMember { .. }) => {
                let Expr::PrivateMember { object, name } = *callee else {
                    unreachable!()
                };
                let object = self.rewrite_expr(*object);
                let arguments = self.rewrite_args(arguments);
                let Some(store) = self.resolve_store(&name) else {
                    return self.unresolved(&name);
                };
                self.cx.helpers |= HelpersNeeded::PRIVATE_FIELD_GET;

                // The receiver appears twice in the rewrite (access check,
                // then `this` binding); evaluate it exactly once.
                let (get_receiver, call_receiver) = self.receiver_pair(object);
                let mut call_args = vec![call_receiver];
                call_args.extend(arguments);
                Expr::method_call(
                    Expr::call(
                        Expr::id(HELPER_PRIVATE_FIELD_GET),
                        vec![get_receiver, Expr::id(store)],
                    ),
                    "call",
                    call_args,
                )
            }

            // new a.#f(args)
            Expr::New { callee, arguments } if matches!(*callee, Expr::PrivateMember { .. }) => {
                let Expr::PrivateMember { object, name } = *callee else {
                    unreachable!()
                };
                // The receiver is used once (the access check); no
                // temporary, and no `this` binding for construction.
                let object = self.rewrite_expr(*object);
                let arguments = self.rewrite_args(arguments);
                let Some(store) = self.resolve_store(&name) else {
                    return self.unresolved(&name);
                };
                self.cx.helpers |= HelpersNeeded::PRIVATE_FIELD_GET;
                Expr::new_expr(
                    Expr::call(
                        Expr::id(HELPER_PRIVATE_FIELD_GET),
                        vec![object, Expr::id(store)],
                    ),
                    arguments,
                )
            }

            // a.#f`quasi${expr}`
            Expr::TaggedTemplate {
                tag,
                quasis,
                expressions,
            } if matches!(*tag, Expr::PrivateMember { .. }) => {
                let Expr::PrivateMember { object, name } = *tag else {
                    unreachable!()
                };
                let object = self.rewrite_expr(*object);
                let expressions = expressions
                    .into_iter()
                    .map(|e| self.rewrite_expr(e))
                    .collect();
                let Some(store) = self.resolve_store(&name) else {
                    return self.unresolved(&name);
                };
                self.cx.helpers |= HelpersNeeded::PRIVATE_FIELD_GET;

                let (get_receiver, bind_receiver) = self.receiver_pair(object);
                Expr::TaggedTemplate {
                    tag: Box::new(Expr::method_call(
                        Expr::call(
                            Expr::id(HELPER_PRIVATE_FIELD_GET),
                            vec![get_receiver, Expr::id(store)],
                        ),
                        "bind",
                        vec![bind_receiver],
                    )),
                    quasis,
                    expressions,
                }
            }

            // a.#x (plain read)
            Expr::PrivateMember { object, name } => {
                let object = self.rewrite_expr(*object);
                let Some(store) = self.resolve_store(&name) else {
                    return self.unresolved(&name);
                };
                self.cx.helpers |= HelpersNeeded::PRIVATE_FIELD_GET;
                Expr::call(
                    Expr::id(HELPER_PRIVATE_FIELD_GET),
                    vec![object, Expr::id(store)],
                )
            }

            // Everything else: recurse.
            Expr::Call { callee, arguments } => Expr::Call {
                callee: Box::new(self.rewrite_expr(*callee)),
                arguments: self.rewrite_args(arguments),
            },
            Expr::New { callee, arguments } => Expr::New {
                callee: Box::new(self.rewrite_expr(*callee)),
                arguments: self.rewrite_args(arguments),
            },
            Expr::PropertyAccess { object, property } => Expr::PropertyAccess {
                object: Box::new(self.rewrite_expr(*object)),
                property,
            },
            Expr::ElementAccess { object, index } => Expr::ElementAccess {
                object: Box::new(self.rewrite_expr(*object)),
                index: Box::new(self.rewrite_expr(*index)),
            },
            Expr::Binary {
                left,
                operator,
                right,
            } => Expr::Binary {
                left: Box::new(self.rewrite_expr(*left)),
                operator,
                right: Box::new(self.rewrite_expr(*right)),
            },
            Expr::PrefixUnary { operator, operand } => Expr::PrefixUnary {
                operator,
                operand: Box::new(self.rewrite_expr(*operand)),
            },
            Expr::Conditional {
                condition,
                when_true,
                when_false,
            } => Expr::Conditional {
                condition: Box::new(self.rewrite_expr(*condition)),
                when_true: Box::new(self.rewrite_expr(*when_true)),
                when_false: Box::new(self.rewrite_expr(*when_false)),
            },
            Expr::Paren(inner) => Expr::Paren(Box::new(self.rewrite_expr(*inner))),
            Expr::Array(elements) => {
                Expr::Array(elements.into_iter().map(|e| self.rewrite_expr(e)).collect())
            }
            Expr::Object(props) => Expr::Object(
                props
                    .into_iter()
                    .map(|p| ObjectProperty {
                        key: p.key,
                        value: self.rewrite_expr(p.value),
                    })
                    .collect(),
            ),
            Expr::Spread(inner) => Expr::Spread(Box::new(self.rewrite_expr(*inner))),
            Expr::FunctionExpr {
                name,
                parameters,
                body,
            } => Expr::FunctionExpr {
                name,
                parameters,
                // Nested closures rewrite against the same scope chain but
                // hoist their own temporaries.
                body: ExpressionRewriter::rewrite_function_body(self.cx, self.scope, body),
            },
            Expr::Template {
                quasis,
                expressions,
            } => Expr::Template {
                quasis,
                expressions: expressions
                    .into_iter()
                    .map(|e| self.rewrite_expr(e))
                    .collect(),
            },
            Expr::TaggedTemplate {
                tag,
                quasis,
                expressions,
            } => Expr::TaggedTemplate {
                tag: Box::new(self.rewrite_expr(*tag)),
                quasis,
                expressions: expressions
                    .into_iter()
                    .map(|e| self.rewrite_expr(e))
                    .collect(),
            },
            leaf @ (Expr::NumericLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BooleanLiteral(_)
            | Expr::NullLiteral
            | Expr::Undefined
            | Expr::Identifier(_)
            | Expr::This) => leaf,
        }
    }

    fn rewrite_args(&mut self, arguments: Vec<Expr>) -> Vec<Expr> {
        arguments
            .into_iter()
            .map(|arg| self.rewrite_expr(arg))
            .collect()
    }

    /// Produce the two receiver mentions a multi-mention rewrite needs. A simple
    /// reference is cheap to repeat; anything else is hoisted into a
    /// single-assignment temporary assigned at first mention.
    fn receiver_pair(&mut self, receiver: Expr) -> (Expr, Expr) {
        if receiver.is_simple_reference() {
            (receiver.clone(), receiver)
        } else {
            let temp = self.next_temp();
            (
                Expr::assign(Expr::id(&temp), receiver),
                Expr::id(&temp),
            )
        }
    }
}

/// `+=`, `-=`, `*=`, ... — any assignment operator that also reads its
/// target. Comparison operators end in `=` too and must not match.
fn is_compound_assignment(operator: &str) -> bool {
    operator.len() > 1
        && operator.ends_with('=')
        && !matches!(operator, "==" | "===" | "!=" | "!==" | "<=" | ">=")
}
