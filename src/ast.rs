//! Statement/expression tree consumed and produced by the transform.
//!
//! The tree is owned and mutable-by-reconstruction: transforms take nodes and
//! produce new nodes rather than patching in place. Input trees may contain
//! private-member syntax ([`Expr::PrivateMember`], the private class member
//! variants); the output of the lowering pass contains none.
//!
//! Each variant carries a builder helper on [`Expr`] so transform code reads
//! close to the JavaScript it emits.

/// A compilation unit: a flat list of statements.
pub type Module = Vec<Stmt>;

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal: `42`, `3.14`
    NumericLiteral(String),

    /// String literal: `"hello"`
    StringLiteral(String),

    /// Boolean literal: `true`, `false`
    BooleanLiteral(bool),

    /// Null literal: `null`
    NullLiteral,

    /// Undefined: `void 0`
    Undefined,

    /// Identifier: `foo`, `_ref`
    Identifier(String),

    /// This keyword
    This,

    /// Call expression: `callee(args)`
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },

    /// New expression: `new Callee(args)`
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },

    /// Property access: `object.property`
    PropertyAccess {
        object: Box<Expr>,
        property: String,
    },

    /// Element access: `object[index]`
    ElementAccess {
        object: Box<Expr>,
        index: Box<Expr>,
    },

    /// Private member access: `object.#name` (input only; the lowering pass
    /// guarantees none survive in its output)
    PrivateMember {
        object: Box<Expr>,
        name: String,
    },

    /// Binary expression, including `=` assignment: `left op right`
    Binary {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },

    /// Unary prefix expression: `!x`, `-x`, `typeof x`
    PrefixUnary {
        operator: String,
        operand: Box<Expr>,
    },

    /// Conditional expression: `cond ? then : else`
    Conditional {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },

    /// Parenthesized expression: `(expr)`
    Paren(Box<Expr>),

    /// Array literal: `[a, b, c]`
    Array(Vec<Expr>),

    /// Object literal: `{ key: value, ... }`
    Object(Vec<ObjectProperty>),

    /// Spread element in a call or array: `...expr`
    Spread(Box<Expr>),

    /// Function expression: `function name(params) { body }`
    FunctionExpr {
        name: Option<String>,
        parameters: Vec<Param>,
        body: Vec<Stmt>,
    },

    /// Template literal: `` `head${x}tail` ``
    ///
    /// `quasis.len() == expressions.len() + 1` always.
    Template {
        quasis: Vec<String>,
        expressions: Vec<Expr>,
    },

    /// Tagged template invocation: `` tag`head${x}tail` ``
    TaggedTemplate {
        tag: Box<Expr>,
        quasis: Vec<String>,
        expressions: Vec<Expr>,
    },
}

/// Property in an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub key: String,
    pub value: Expr,
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub rest: bool,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            rest: false,
        }
    }

    pub fn rest(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            rest: true,
        }
    }
}

/// Statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Variable declaration: `var x = value;` or `var x;`
    VarDecl {
        name: String,
        initializer: Option<Expr>,
    },

    /// Expression statement: `expr;`
    Expression(Expr),

    /// Return statement: `return expr;`
    Return(Option<Expr>),

    /// If statement
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// While statement
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Block statement: `{ statements }`
    Block(Vec<Stmt>),

    /// Throw statement: `throw expr;`
    Throw(Expr),

    /// Function declaration: `function name(params) { body }`
    FunctionDecl {
        name: String,
        parameters: Vec<Param>,
        body: Vec<Stmt>,
    },

    /// Class declaration
    ClassDecl(ClassDecl),

    /// Raw JavaScript text emitted verbatim (helper prelude, imports)
    Raw(String),

    /// Empty statement: `;`
    Empty,
}

/// A class declaration.
///
/// Heritage clauses are handled by the sibling class transform; this pass
/// only concerns itself with the member list.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub members: Vec<ClassMember>,
}

/// A class member. Private variants exist only in input trees.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Constructor {
        parameters: Vec<Param>,
        body: Vec<Stmt>,
    },
    Method {
        name: String,
        is_static: bool,
        parameters: Vec<Param>,
        body: Vec<Stmt>,
    },
    Getter {
        name: String,
        is_static: bool,
        body: Vec<Stmt>,
    },
    Setter {
        name: String,
        is_static: bool,
        parameter: String,
        body: Vec<Stmt>,
    },
    Property {
        name: String,
        is_static: bool,
        initializer: Option<Expr>,
    },
    PrivateField {
        name: String,
        is_static: bool,
        initializer: Option<Expr>,
    },
    PrivateMethod {
        name: String,
        is_static: bool,
        parameters: Vec<Param>,
        body: Vec<Stmt>,
    },
    PrivateGetter {
        name: String,
        is_static: bool,
        body: Vec<Stmt>,
    },
    PrivateSetter {
        name: String,
        is_static: bool,
        parameter: String,
        body: Vec<Stmt>,
    },
}

// =========================================================================
// Builder helpers
// =========================================================================

impl Expr {
    /// Create an identifier node
    pub fn id(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    /// Create a string literal
    pub fn string(s: impl Into<String>) -> Self {
        Expr::StringLiteral(s.into())
    }

    /// Create a numeric literal
    pub fn number(n: impl Into<String>) -> Self {
        Expr::NumericLiteral(n.into())
    }

    /// Create a call expression
    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            arguments: args,
        }
    }

    /// Create a method call: `object.method(args)`
    pub fn method_call(object: Expr, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::call(Expr::prop(object, method), args)
    }

    /// Create a new expression
    pub fn new_expr(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::New {
            callee: Box::new(callee),
            arguments: args,
        }
    }

    /// Create a property access
    pub fn prop(object: Expr, property: impl Into<String>) -> Self {
        Expr::PropertyAccess {
            object: Box::new(object),
            property: property.into(),
        }
    }

    /// Create a private member access: `object.#name`
    pub fn private_member(object: Expr, name: impl Into<String>) -> Self {
        Expr::PrivateMember {
            object: Box::new(object),
            name: name.into(),
        }
    }

    /// Create an assignment expression
    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Binary {
            left: Box::new(target),
            operator: "=".to_string(),
            right: Box::new(value),
        }
    }

    /// Create a binary expression
    pub fn binary(left: Expr, op: impl Into<String>, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            operator: op.into(),
            right: Box::new(right),
        }
    }

    /// Create an object literal
    pub fn object(props: Vec<(&str, Expr)>) -> Self {
        Expr::Object(
            props
                .into_iter()
                .map(|(key, value)| ObjectProperty {
                    key: key.to_string(),
                    value,
                })
                .collect(),
        )
    }

    /// Create `void 0`
    pub fn void_0() -> Self {
        Expr::Undefined
    }

    /// Create `this`
    pub fn this() -> Self {
        Expr::This
    }

    /// Wrap in parentheses
    pub fn paren(self) -> Self {
        Expr::Paren(Box::new(self))
    }

    /// Whether re-evaluating this expression is observable. Bare identifiers
    /// and `this` are the only receiver forms that skip the evaluate-once
    /// temporary.
    pub fn is_simple_reference(&self) -> bool {
        matches!(self, Expr::Identifier(_) | Expr::This)
    }
}

impl Stmt {
    /// Create an expression statement
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expression(expr)
    }

    /// Create a var declaration
    pub fn var_decl(name: impl Into<String>, init: Option<Expr>) -> Self {
        Stmt::VarDecl {
            name: name.into(),
            initializer: init,
        }
    }

    /// Create a return statement
    pub fn ret(expr: Option<Expr>) -> Self {
        Stmt::Return(expr)
    }
}
