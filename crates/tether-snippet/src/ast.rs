//! Fragment tree for parsed snippets.
//!
//! A [`Fragment`] is a plain value: parsing, placeholder resolution, global
//! rewriting and call-site expansion each consume one and build a new one.
//! Nothing in the tree is shared or mutated in place after construction.

use std::fmt;

use serde::Serialize;
use tether_common::decl::BindingMode;
use tether_common::span::Span;

/// A placeholder inside a snippet, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Hole {
    /// `$name`
    ByName(String),
    /// `$0`, `$1`, ...
    ByIndex(u32),
    /// `$this`
    SelfImplicit,
}

impl fmt::Display for Hole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hole::ByName(name) => write!(f, "${name}"),
            Hole::ByIndex(index) => write!(f, "${index}"),
            Hole::SelfImplicit => write!(f, "$this"),
        }
    }
}

/// What a resolved hole refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ParamRef {
    /// The implicit receiver of an instance member.
    Receiver,
    /// A declared parameter, by 0-based position among declared parameters.
    Param { position: u32, name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    /// Numeric literal, verbatim.
    Number(String),
    /// String literal including quotes, verbatim.
    Str(String),
    Bool(bool),
    Null,
    This,
    Ident(String),
    Hole(Hole),
    Param(ParamRef),
    /// `$global` before rewriting.
    Global,
    /// The cached alias a `$global` marker was rewritten to.
    GlobalRef(String),
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Sequence(Vec<Expr>),
    Function {
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    Arrow {
        params: Vec<String>,
        body: ArrowBody,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub key: PropKey,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropKey {
    Ident(String),
    Str(String),
    Number(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }

    /// Keyword operators need a space before their operand.
    pub fn is_keyword(self) -> bool {
        matches!(self, UnaryOp::Typeof | UnaryOp::Void | UnaryOp::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOp {
    Inc,
    Dec,
}

impl UpdateOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOp::Inc => "++",
            UpdateOp::Dec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Nullish,
    In,
    Instanceof,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Nullish => "??",
            BinaryOp::In => "in",
            BinaryOp::Instanceof => "instanceof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StmtKind {
    Expr(Expr),
    VarDecl {
        kind: DeclKind,
        decls: Vec<Declarator>,
    },
    Return(Option<Expr>),
    If {
        test: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Throw(Expr),
    Break,
    Continue,
    Block(Vec<Stmt>),
}

/// The parsed, self-contained result of one snippet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub mode: BindingMode,
    pub body: FragmentBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FragmentBody {
    /// Inline expansion fragments are a single expression.
    Expr(Expr),
    /// Body replacement fragments are a statement list whose final
    /// expression has been turned into a `return`.
    Body(Vec<Stmt>),
}

// ── Traversal ──────────────────────────────────────────────────────────

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Rebuild the tree bottom-up, applying `f` to every expression after
    /// its children have been rebuilt. Nested function bodies are included.
    pub fn map<F: FnMut(Expr) -> Expr>(self, f: &mut F) -> Expr {
        let span = self.span;
        let kind = match self.kind {
            ExprKind::Array(items) => ExprKind::Array(map_all(items, f)),
            ExprKind::Object(props) => ExprKind::Object(
                props
                    .into_iter()
                    .map(|p| Property {
                        key: match p.key {
                            PropKey::Computed(key) => PropKey::Computed(Box::new(key.map(f))),
                            other => other,
                        },
                        value: p.value.map(f),
                    })
                    .collect(),
            ),
            ExprKind::Member {
                object,
                property,
                optional,
            } => ExprKind::Member {
                object: Box::new(object.map(f)),
                property,
                optional,
            },
            ExprKind::Index { object, index } => ExprKind::Index {
                object: Box::new(object.map(f)),
                index: Box::new(index.map(f)),
            },
            ExprKind::Call { callee, args } => ExprKind::Call {
                callee: Box::new(callee.map(f)),
                args: map_all(args, f),
            },
            ExprKind::New { callee, args } => ExprKind::New {
                callee: Box::new(callee.map(f)),
                args: map_all(args, f),
            },
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op,
                operand: Box::new(operand.map(f)),
            },
            ExprKind::Update {
                op,
                prefix,
                operand,
            } => ExprKind::Update {
                op,
                prefix,
                operand: Box::new(operand.map(f)),
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op,
                lhs: Box::new(lhs.map(f)),
                rhs: Box::new(rhs.map(f)),
            },
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => ExprKind::Conditional {
                test: Box::new(test.map(f)),
                consequent: Box::new(consequent.map(f)),
                alternate: Box::new(alternate.map(f)),
            },
            ExprKind::Assign { op, target, value } => ExprKind::Assign {
                op,
                target: Box::new(target.map(f)),
                value: Box::new(value.map(f)),
            },
            ExprKind::Sequence(items) => ExprKind::Sequence(map_all(items, f)),
            ExprKind::Function { params, body } => ExprKind::Function {
                params,
                body: body.into_iter().map(|s| s.map_exprs(f)).collect(),
            },
            ExprKind::Arrow { params, body } => ExprKind::Arrow {
                params,
                body: match body {
                    ArrowBody::Expr(e) => ArrowBody::Expr(Box::new(e.map(f))),
                    ArrowBody::Block(stmts) => {
                        ArrowBody::Block(stmts.into_iter().map(|s| s.map_exprs(f)).collect())
                    }
                },
            },
            leaf => leaf,
        };
        f(Expr { kind, span })
    }

    /// Visit every expression in pre-order, nested function bodies included.
    pub fn walk<'a, F: FnMut(&'a Expr)>(&'a self, f: &mut F) {
        f(self);
        match &self.kind {
            ExprKind::Array(items) | ExprKind::Sequence(items) => {
                items.iter().for_each(|e| e.walk(f));
            }
            ExprKind::Object(props) => {
                for p in props {
                    if let PropKey::Computed(key) = &p.key {
                        key.walk(f);
                    }
                    p.value.walk(f);
                }
            }
            ExprKind::Member { object, .. } => object.walk(f),
            ExprKind::Index { object, index } => {
                object.walk(f);
                index.walk(f);
            }
            ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
                callee.walk(f);
                args.iter().for_each(|e| e.walk(f));
            }
            ExprKind::Unary { operand, .. } | ExprKind::Update { operand, .. } => operand.walk(f),
            ExprKind::Binary { lhs, rhs, .. } => {
                lhs.walk(f);
                rhs.walk(f);
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.walk(f);
                consequent.walk(f);
                alternate.walk(f);
            }
            ExprKind::Assign { target, value, .. } => {
                target.walk(f);
                value.walk(f);
            }
            ExprKind::Function { body, .. } => body.iter().for_each(|s| s.walk_exprs(f)),
            ExprKind::Arrow { body, .. } => match body {
                ArrowBody::Expr(e) => e.walk(f),
                ArrowBody::Block(stmts) => stmts.iter().for_each(|s| s.walk_exprs(f)),
            },
            _ => {}
        }
    }
}

fn map_all<F: FnMut(Expr) -> Expr>(items: Vec<Expr>, f: &mut F) -> Vec<Expr> {
    items.into_iter().map(|e| e.map(f)).collect()
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Apply [`Expr::map`] to every expression under this statement.
    pub fn map_exprs<F: FnMut(Expr) -> Expr>(self, f: &mut F) -> Stmt {
        let span = self.span;
        let kind = match self.kind {
            StmtKind::Expr(e) => StmtKind::Expr(e.map(f)),
            StmtKind::VarDecl { kind, decls } => StmtKind::VarDecl {
                kind,
                decls: decls
                    .into_iter()
                    .map(|d| Declarator {
                        name: d.name,
                        init: d.init.map(|e| e.map(f)),
                    })
                    .collect(),
            },
            StmtKind::Return(e) => StmtKind::Return(e.map(|e| e.map(f))),
            StmtKind::If {
                test,
                then,
                otherwise,
            } => StmtKind::If {
                test: test.map(f),
                then: Box::new(then.map_exprs(f)),
                otherwise: otherwise.map(|s| Box::new(s.map_exprs(f))),
            },
            StmtKind::While { test, body } => StmtKind::While {
                test: test.map(f),
                body: Box::new(body.map_exprs(f)),
            },
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => StmtKind::For {
                init: init.map(|s| Box::new(s.map_exprs(f))),
                test: test.map(|e| e.map(f)),
                update: update.map(|e| e.map(f)),
                body: Box::new(body.map_exprs(f)),
            },
            StmtKind::Throw(e) => StmtKind::Throw(e.map(f)),
            StmtKind::Block(stmts) => {
                StmtKind::Block(stmts.into_iter().map(|s| s.map_exprs(f)).collect())
            }
            leaf @ (StmtKind::Break | StmtKind::Continue) => leaf,
        };
        Stmt { kind, span }
    }

    /// Apply [`Expr::walk`] to every expression under this statement.
    pub fn walk_exprs<'a, F: FnMut(&'a Expr)>(&'a self, f: &mut F) {
        match &self.kind {
            StmtKind::Expr(e) | StmtKind::Throw(e) => e.walk(f),
            StmtKind::VarDecl { decls, .. } => {
                decls.iter().filter_map(|d| d.init.as_ref()).for_each(|e| e.walk(f));
            }
            StmtKind::Return(e) => {
                if let Some(e) = e {
                    e.walk(f);
                }
            }
            StmtKind::If {
                test,
                then,
                otherwise,
            } => {
                test.walk(f);
                then.walk_exprs(f);
                if let Some(s) = otherwise {
                    s.walk_exprs(f);
                }
            }
            StmtKind::While { test, body } => {
                test.walk(f);
                body.walk_exprs(f);
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                if let Some(s) = init {
                    s.walk_exprs(f);
                }
                if let Some(e) = test {
                    e.walk(f);
                }
                if let Some(e) = update {
                    e.walk(f);
                }
                body.walk_exprs(f);
            }
            StmtKind::Block(stmts) => stmts.iter().for_each(|s| s.walk_exprs(f)),
            StmtKind::Break | StmtKind::Continue => {}
        }
    }
}

impl Fragment {
    /// Rebuild every expression of the fragment with [`Expr::map`].
    pub fn map_exprs<F: FnMut(Expr) -> Expr>(self, f: &mut F) -> Fragment {
        let body = match self.body {
            FragmentBody::Expr(e) => FragmentBody::Expr(e.map(f)),
            FragmentBody::Body(stmts) => {
                FragmentBody::Body(stmts.into_iter().map(|s| s.map_exprs(f)).collect())
            }
        };
        Fragment {
            mode: self.mode,
            body,
        }
    }

    /// Visit every expression of the fragment in pre-order.
    pub fn walk_exprs<'a, F: FnMut(&'a Expr)>(&'a self, f: &mut F) {
        match &self.body {
            FragmentBody::Expr(e) => e.walk(f),
            FragmentBody::Body(stmts) => stmts.iter().for_each(|s| s.walk_exprs(f)),
        }
    }

    /// Every unresolved hole in source order.
    pub fn holes(&self) -> Vec<(&Hole, Span)> {
        let mut holes = Vec::new();
        self.walk_exprs(&mut |e| {
            if let ExprKind::Hole(hole) = &e.kind {
                holes.push((hole, e.span));
            }
        });
        holes
    }

    /// Number of `$global` markers still present.
    pub fn global_markers(&self) -> usize {
        let mut count = 0;
        self.walk_exprs(&mut |e| {
            if matches!(e.kind, ExprKind::Global) {
                count += 1;
            }
        });
        count
    }
}
