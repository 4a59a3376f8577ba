//! The translatable subset: which constructs an inline-expansion snippet may
//! contain.
//!
//! Inline fragments are copied into every call site, so they must be a
//! single side-effect-free-by-construction expression. The capability of
//! each node kind is fixed and looked up here; the first disallowed node in
//! pre-order fails the whole fragment.

use tether_common::span::Span;

use crate::ast::{ArrowBody, Expr, ExprKind, Stmt, StmtKind, UnaryOp};
use crate::error::{SnippetError, SnippetErrorKind};

/// Node kinds that matter to the capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Literal,
    Identifier,
    Placeholder,
    GlobalMarker,
    This,
    Array,
    Object,
    Member,
    Index,
    Call,
    New,
    Unary,
    Delete,
    Update,
    Binary,
    Conditional,
    Assign,
    Sequence,
    Function,
    ArrowExpr,
    ArrowBlock,
}

impl NodeKind {
    pub fn of(expr: &Expr) -> NodeKind {
        match &expr.kind {
            ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Bool(_) | ExprKind::Null => {
                NodeKind::Literal
            }
            ExprKind::Ident(_) => NodeKind::Identifier,
            ExprKind::Hole(_) | ExprKind::Param(_) => NodeKind::Placeholder,
            ExprKind::Global | ExprKind::GlobalRef(_) => NodeKind::GlobalMarker,
            ExprKind::This => NodeKind::This,
            ExprKind::Array(_) => NodeKind::Array,
            ExprKind::Object(_) => NodeKind::Object,
            ExprKind::Member { .. } => NodeKind::Member,
            ExprKind::Index { .. } => NodeKind::Index,
            ExprKind::Call { .. } => NodeKind::Call,
            ExprKind::New { .. } => NodeKind::New,
            ExprKind::Unary {
                op: UnaryOp::Delete,
                ..
            } => NodeKind::Delete,
            ExprKind::Unary { .. } => NodeKind::Unary,
            ExprKind::Update { .. } => NodeKind::Update,
            ExprKind::Binary { .. } => NodeKind::Binary,
            ExprKind::Conditional { .. } => NodeKind::Conditional,
            ExprKind::Assign { .. } => NodeKind::Assign,
            ExprKind::Sequence(_) => NodeKind::Sequence,
            ExprKind::Function { .. } => NodeKind::Function,
            ExprKind::Arrow {
                body: ArrowBody::Expr(_),
                ..
            } => NodeKind::ArrowExpr,
            ExprKind::Arrow {
                body: ArrowBody::Block(_),
                ..
            } => NodeKind::ArrowBlock,
        }
    }

    /// Whether this kind may appear in an inline-expansion fragment.
    pub fn is_translatable(self) -> bool {
        !matches!(
            self,
            NodeKind::This
                | NodeKind::Delete
                | NodeKind::Update
                | NodeKind::Assign
                | NodeKind::Sequence
                | NodeKind::Function
                | NodeKind::ArrowBlock
        )
    }
}

/// Name of an offending expression, as shown in the diagnostic.
fn describe_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::This => "bare `this` (use `$this` for the receiver)".to_string(),
        ExprKind::Unary { op, .. } => format!("`{}`", op.as_str()),
        ExprKind::Update { op, .. } => format!("`{}`", op.as_str()),
        ExprKind::Assign { op, .. } => format!("assignment `{}`", op.as_str()),
        ExprKind::Sequence(_) => "comma operator `,`".to_string(),
        ExprKind::Function { .. } => "`function` expression".to_string(),
        ExprKind::Arrow { .. } => "arrow function with a block body".to_string(),
        _ => "expression".to_string(),
    }
}

fn describe_stmt(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::Expr(_) => "statement sequence".to_string(),
        StmtKind::VarDecl { kind, .. } => format!("`{}` declaration", kind.as_str()),
        StmtKind::Return(_) => "`return` statement".to_string(),
        StmtKind::If { .. } => "`if` statement".to_string(),
        StmtKind::While { .. } => "`while` loop".to_string(),
        StmtKind::For { .. } => "`for` loop".to_string(),
        StmtKind::Throw(_) => "`throw` statement".to_string(),
        StmtKind::Break => "`break` statement".to_string(),
        StmtKind::Continue => "`continue` statement".to_string(),
        StmtKind::Block(_) => "block statement".to_string(),
    }
}

fn unsupported(what: String, span: Span) -> SnippetError {
    SnippetError::new(SnippetErrorKind::UnsupportedInlineConstruct(what), span)
}

/// Check an expression tree against the capability table.
pub fn check_inline(expr: &Expr) -> Result<(), SnippetError> {
    let mut first: Option<&Expr> = None;
    expr.walk(&mut |node| {
        if first.is_none() && !NodeKind::of(node).is_translatable() {
            first = Some(node);
        }
    });
    match first {
        Some(node) => Err(unsupported(describe_expr(node), node.span)),
        None => Ok(()),
    }
}

/// Reduce a parsed statement list to the single inline expression, or
/// report the first construct outside the subset.
pub(crate) fn into_inline(stmts: Vec<Stmt>, whole: Span) -> Result<Expr, SnippetError> {
    let mut stmts = stmts.into_iter();
    let first = match stmts.next() {
        Some(stmt) => stmt,
        None => {
            return Err(SnippetError::syntax(
                "inline snippet must contain an expression",
                whole,
            ))
        }
    };

    let expr = match first.kind {
        StmtKind::Expr(expr) => expr,
        _ => return Err(unsupported(describe_stmt(&first), first.span)),
    };
    check_inline(&expr)?;

    if let Some(extra) = stmts.next() {
        return Err(unsupported(describe_stmt(&extra), extra.span));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use tether_common::decl::BindingMode;

    use super::*;
    use crate::parser::parse_snippet;

    fn inline_err(src: &str) -> String {
        parse_snippet(src, BindingMode::InlineExpansion)
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn pure_expressions_pass() {
        for src in [
            "$a + $b * 2",
            "$obj?.name ?? 'none'",
            "new $T($0, [1, 2])",
            "$list.map(x => x * 2)",
            "typeof $v === 'string' ? $v : String($v)",
            "({ key: $k, [$k]: $v })",
        ] {
            assert!(
                parse_snippet(src, BindingMode::InlineExpansion).is_ok(),
                "{src}"
            );
        }
    }

    #[test]
    fn rejects_mutation() {
        assert_eq!(
            inline_err("$a = 1"),
            "assignment `=` is not allowed in an inline snippet"
        );
        assert_eq!(inline_err("$a++"), "`++` is not allowed in an inline snippet");
        assert_eq!(
            inline_err("delete $o.k"),
            "`delete` is not allowed in an inline snippet"
        );
    }

    #[test]
    fn rejects_statements() {
        assert_eq!(
            inline_err("return $a"),
            "`return` statement is not allowed in an inline snippet"
        );
        assert_eq!(
            inline_err("$a; $b"),
            "statement sequence is not allowed in an inline snippet"
        );
        assert_eq!(
            inline_err("if ($a) $b"),
            "`if` statement is not allowed in an inline snippet"
        );
    }

    #[test]
    fn first_offender_in_pre_order_wins() {
        let err = parse_snippet("f(x => { y = 1 })", BindingMode::InlineExpansion).unwrap_err();
        assert_eq!(
            err.kind,
            SnippetErrorKind::UnsupportedInlineConstruct("arrow function with a block body".into())
        );
        assert_eq!(err.span, Span::new(2, 16));
    }

    #[test]
    fn bare_this_suggests_placeholder() {
        assert_eq!(
            inline_err("this.x"),
            "bare `this` (use `$this` for the receiver) is not allowed in an inline snippet"
        );
    }

    #[test]
    fn empty_inline_snippet_is_a_syntax_error() {
        let err = parse_snippet("  ", BindingMode::InlineExpansion).unwrap_err();
        assert!(err.kind.is_syntax());
        assert_eq!(err.span, Span::new(0, 2));
    }
}
