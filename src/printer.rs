//! JavaScript emission from the transformed tree.
//!
//! The printer walks [`crate::ast`] nodes and emits JavaScript text with a
//! fixed canonical formatting (4-space indent, one statement per line).
//! Downstream tests compare emitted text verbatim, so formatting changes here
//! are breaking changes.

use crate::ast::{ClassDecl, ClassMember, Expr, Param, Stmt};

/// Configuration for the emitter, allowing for formatting preferences.
#[derive(Clone, Copy, Debug)]
pub struct EmitConfig {
    pub indent_size: usize,
    pub newline: &'static str,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            newline: "\n",
        }
    }
}

/// Print a whole module with default formatting.
pub fn print_module(module: &[Stmt]) -> String {
    let mut printer = Printer::new(EmitConfig::default());
    for stmt in module {
        printer.stmt(stmt, 0);
    }
    printer.finish()
}

/// Print a single expression with default formatting.
pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::new(EmitConfig::default());
    printer.expr(expr);
    printer.finish()
}

struct Printer {
    config: EmitConfig,
    out: String,
}

impl Printer {
    fn new(config: EmitConfig) -> Self {
        Printer {
            config,
            out: String::new(),
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level * self.config.indent_size {
            self.out.push(' ');
        }
    }

    fn newline(&mut self) {
        self.out.push_str(self.config.newline);
    }

    fn stmt(&mut self, stmt: &Stmt, level: usize) {
        match stmt {
            Stmt::VarDecl { name, initializer } => {
                self.indent(level);
                self.out.push_str("var ");
                self.out.push_str(name);
                if let Some(init) = initializer {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push(';');
                self.newline();
            }
            Stmt::Expression(expr) => {
                self.indent(level);
                self.expr(expr);
                self.out.push(';');
                self.newline();
            }
            Stmt::Return(expr) => {
                self.indent(level);
                self.out.push_str("return");
                if let Some(expr) = expr {
                    self.out.push(' ');
                    self.expr(expr);
                }
                self.out.push(';');
                self.newline();
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.indent(level);
                self.out.push_str("if (");
                self.expr(condition);
                self.out.push_str(") ");
                self.braced(then_branch, level);
                if let Some(else_branch) = else_branch {
                    self.out.push_str(" else ");
                    self.braced(else_branch, level);
                }
                self.newline();
            }
            Stmt::While { condition, body } => {
                self.indent(level);
                self.out.push_str("while (");
                self.expr(condition);
                self.out.push_str(") ");
                self.braced(body, level);
                self.newline();
            }
            Stmt::Block(stmts) => {
                self.indent(level);
                self.out.push('{');
                self.newline();
                for stmt in stmts {
                    self.stmt(stmt, level + 1);
                }
                self.indent(level);
                self.out.push('}');
                self.newline();
            }
            Stmt::Throw(expr) => {
                self.indent(level);
                self.out.push_str("throw ");
                self.expr(expr);
                self.out.push(';');
                self.newline();
            }
            Stmt::FunctionDecl {
                name,
                parameters,
                body,
            } => {
                self.indent(level);
                self.out.push_str("function ");
                self.out.push_str(name);
                self.params(parameters);
                self.out.push_str(" ");
                self.body(body, level);
                self.newline();
            }
            Stmt::ClassDecl(class) => {
                self.class_decl(class, level);
            }
            Stmt::Raw(text) => {
                self.out.push_str(text);
                if !text.ends_with('\n') {
                    self.newline();
                }
            }
            Stmt::Empty => {
                self.indent(level);
                self.out.push(';');
                self.newline();
            }
        }
    }

    /// Print a statement as a braced body, wrapping non-blocks.
    fn braced(&mut self, stmt: &Stmt, level: usize) {
        match stmt {
            Stmt::Block(stmts) => self.body(stmts, level),
            other => {
                self.out.push('{');
                self.newline();
                self.stmt(other, level + 1);
                self.indent(level);
                self.out.push('}');
            }
        }
    }

    /// Print `{ ... }` for a statement list, without trailing newline.
    fn body(&mut self, stmts: &[Stmt], level: usize) {
        self.out.push('{');
        self.newline();
        for stmt in stmts {
            self.stmt(stmt, level + 1);
        }
        self.indent(level);
        self.out.push('}');
    }

    fn params(&mut self, params: &[Param]) {
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            if param.rest {
                self.out.push_str("...");
            }
            self.out.push_str(&param.name);
        }
        self.out.push(')');
    }

    fn class_decl(&mut self, class: &ClassDecl, level: usize) {
        self.indent(level);
        self.out.push_str("class ");
        self.out.push_str(&class.name);
        self.out.push_str(" {");
        self.newline();
        for member in &class.members {
            self.class_member(member, level + 1);
        }
        self.indent(level);
        self.out.push('}');
        self.newline();
    }

    fn class_member(&mut self, member: &ClassMember, level: usize) {
        match member {
            ClassMember::Constructor { parameters, body } => {
                self.indent(level);
                self.out.push_str("constructor");
                self.params(parameters);
                self.out.push(' ');
                self.body(body, level);
                self.newline();
            }
            ClassMember::Method {
                name,
                is_static,
                parameters,
                body,
            } => {
                self.indent(level);
                if *is_static {
                    self.out.push_str("static ");
                }
                self.out.push_str(name);
                self.params(parameters);
                self.out.push(' ');
                self.body(body, level);
                self.newline();
            }
            ClassMember::Getter {
                name,
                is_static,
                body,
            } => {
                self.indent(level);
                if *is_static {
                    self.out.push_str("static ");
                }
                self.out.push_str("get ");
                self.out.push_str(name);
                self.out.push_str("() ");
                self.body(body, level);
                self.newline();
            }
            ClassMember::Setter {
                name,
                is_static,
                parameter,
                body,
            } => {
                self.indent(level);
                if *is_static {
                    self.out.push_str("static ");
                }
                self.out.push_str("set ");
                self.out.push_str(name);
                self.out.push('(');
                self.out.push_str(parameter);
                self.out.push_str(") ");
                self.body(body, level);
                self.newline();
            }
            ClassMember::Property {
                name,
                is_static,
                initializer,
            } => {
                self.indent(level);
                if *is_static {
                    self.out.push_str("static ");
                }
                self.out.push_str(name);
                if let Some(init) = initializer {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push(';');
                self.newline();
            }
            // Private members never survive lowering; printing them supports
            // dumping input trees during debugging.
            ClassMember::PrivateField {
                name,
                is_static,
                initializer,
            } => {
                self.indent(level);
                if *is_static {
                    self.out.push_str("static ");
                }
                self.out.push('#');
                self.out.push_str(name);
                if let Some(init) = initializer {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push(';');
                self.newline();
            }
            ClassMember::PrivateMethod {
                name,
                is_static,
                parameters,
                body,
            } => {
                self.indent(level);
                if *is_static {
                    self.out.push_str("static ");
                }
                self.out.push('#');
                self.out.push_str(name);
                self.params(parameters);
                self.out.push(' ');
                self.body(body, level);
                self.newline();
            }
            ClassMember::PrivateGetter {
                name,
                is_static,
                body,
            } => {
                self.indent(level);
                if *is_static {
                    self.out.push_str("static ");
                }
                self.out.push_str("get #");
                self.out.push_str(name);
                self.out.push_str("() ");
                self.body(body, level);
                self.newline();
            }
            ClassMember::PrivateSetter {
                name,
                is_static,
                parameter,
                body,
            } => {
                self.indent(level);
                if *is_static {
                    self.out.push_str("static ");
                }
                self.out.push_str("set #");
                self.out.push_str(name);
                self.out.push('(');
                self.out.push_str(parameter);
                self.out.push_str(") ");
                self.body(body, level);
                self.newline();
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::NumericLiteral(n) => self.out.push_str(n),
            Expr::StringLiteral(s) => {
                self.out.push('"');
                self.out.push_str(s);
                self.out.push('"');
            }
            Expr::BooleanLiteral(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Expr::NullLiteral => self.out.push_str("null"),
            Expr::Undefined => self.out.push_str("void 0"),
            Expr::Identifier(name) => self.out.push_str(name),
            Expr::This => self.out.push_str("this"),
            Expr::Call { callee, arguments } => {
                self.callee(callee);
                self.arguments(arguments);
            }
            Expr::New { callee, arguments } => {
                self.out.push_str("new ");
                // Parenthesize any callee a `new` would otherwise swallow the
                // argument list of (`new f()()` vs `new (f())()`).
                if matches!(callee.as_ref(), Expr::Identifier(_) | Expr::PropertyAccess { .. }) {
                    self.expr(callee);
                } else {
                    self.out.push('(');
                    self.expr(callee);
                    self.out.push(')');
                }
                self.arguments(arguments);
            }
            Expr::PropertyAccess { object, property } => {
                self.callee(object);
                self.out.push('.');
                self.out.push_str(property);
            }
            Expr::ElementAccess { object, index } => {
                self.callee(object);
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
            Expr::PrivateMember { object, name } => {
                self.callee(object);
                self.out.push_str(".#");
                self.out.push_str(name);
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                self.expr(left);
                self.out.push(' ');
                self.out.push_str(operator);
                self.out.push(' ');
                self.expr(right);
            }
            Expr::PrefixUnary { operator, operand } => {
                self.out.push_str(operator);
                if operator.chars().all(|c| c.is_ascii_alphabetic()) {
                    self.out.push(' ');
                }
                self.expr(operand);
            }
            Expr::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                self.expr(condition);
                self.out.push_str(" ? ");
                self.expr(when_true);
                self.out.push_str(" : ");
                self.expr(when_false);
            }
            Expr::Paren(inner) => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }
            Expr::Array(elements) => {
                self.out.push('[');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(element);
                }
                self.out.push(']');
            }
            Expr::Object(props) => {
                if props.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push_str("{ ");
                for (i, prop) in props.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(&prop.key);
                    self.out.push_str(": ");
                    self.expr(&prop.value);
                }
                self.out.push_str(" }");
            }
            Expr::Spread(inner) => {
                self.out.push_str("...");
                self.expr(inner);
            }
            Expr::FunctionExpr {
                name,
                parameters,
                body,
            } => {
                self.out.push_str("function");
                if let Some(name) = name {
                    self.out.push(' ');
                    self.out.push_str(name);
                }
                self.params(parameters);
                self.out.push(' ');
                // Function expressions embedded in statements print their
                // body at the current column; callers that need precise
                // nesting wrap them in statements.
                self.body(body, 0);
            }
            Expr::Template { quasis, expressions } => {
                self.template(quasis, expressions);
            }
            Expr::TaggedTemplate {
                tag,
                quasis,
                expressions,
            } => {
                self.callee(tag);
                self.template(quasis, expressions);
            }
        }
    }

    /// Print an expression in callee/object position, parenthesizing forms
    /// that would re-parse differently.
    fn callee(&mut self, expr: &Expr) {
        match expr {
            Expr::Binary { .. }
            | Expr::Conditional { .. }
            | Expr::FunctionExpr { .. }
            | Expr::NumericLiteral(_) => {
                self.out.push('(');
                self.expr(expr);
                self.out.push(')');
            }
            other => self.expr(other),
        }
    }

    fn arguments(&mut self, arguments: &[Expr]) {
        self.out.push('(');
        for (i, arg) in arguments.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(arg);
        }
        self.out.push(')');
    }

    fn template(&mut self, quasis: &[String], expressions: &[Expr]) {
        self.out.push('`');
        for (i, quasi) in quasis.iter().enumerate() {
            self.out.push_str(quasi);
            if i < expressions.len() {
                self.out.push_str("${");
                self.expr(&expressions[i]);
                self.out.push('}');
            }
        }
        self.out.push('`');
    }
}
