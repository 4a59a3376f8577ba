//! Target-language printer.
//!
//! Emits normalised source for fragments and expressions: single spaces
//! around binary operators, `, ` between list items, two-space indentation,
//! and braces around every statement body. Parentheses are derived from
//! operator precedence, so grouping from the original snippet is not
//! reproduced verbatim.

use crate::ast::{
    ArrowBody, BinaryOp, DeclKind, Declarator, Expr, ExprKind, Fragment, FragmentBody, ParamRef,
    PropKey, Stmt, StmtKind, UnaryOp,
};

// ── Precedence ─────────────────────────────────────────────────────────

const PREC_SEQUENCE: u8 = 1;
const PREC_ASSIGN: u8 = 2;
const PREC_CONDITIONAL: u8 = 3;
const PREC_UNARY: u8 = 15;
const PREC_POSTFIX: u8 = 16;
const PREC_CALL: u8 = 17;
const PREC_PRIMARY: u8 = 18;

fn binary_prec(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Nullish | BinaryOp::Or => 4,
        BinaryOp::And => 5,
        BinaryOp::BitOr => 6,
        BinaryOp::BitXor => 7,
        BinaryOp::BitAnd => 8,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 9,
        BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::LtEq
        | BinaryOp::GtEq
        | BinaryOp::In
        | BinaryOp::Instanceof => 10,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 11,
        BinaryOp::Add | BinaryOp::Sub => 12,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 13,
        BinaryOp::Pow => 14,
    }
}

fn prec(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Sequence(_) => PREC_SEQUENCE,
        ExprKind::Assign { .. } | ExprKind::Arrow { .. } => PREC_ASSIGN,
        ExprKind::Conditional { .. } => PREC_CONDITIONAL,
        ExprKind::Binary { op, .. } => binary_prec(*op),
        ExprKind::Unary { .. } => PREC_UNARY,
        ExprKind::Update { prefix: true, .. } => PREC_UNARY,
        ExprKind::Update { prefix: false, .. } => PREC_POSTFIX,
        ExprKind::Call { .. }
        | ExprKind::New { .. }
        | ExprKind::Member { .. }
        | ExprKind::Index { .. } => PREC_CALL,
        _ => PREC_PRIMARY,
    }
}

/// `??` cannot be mixed with `&&`/`||` without explicit parentheses.
fn mixes_nullish(parent: BinaryOp, child: &Expr) -> bool {
    let ExprKind::Binary { op: child, .. } = &child.kind else {
        return false;
    };
    match parent {
        BinaryOp::Nullish => matches!(child, BinaryOp::And | BinaryOp::Or),
        BinaryOp::And | BinaryOp::Or => *child == BinaryOp::Nullish,
        _ => false,
    }
}

/// A `new` callee must not contain a call, or the call would take the
/// argument list.
fn is_plain_new_callee(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Member { object, optional, .. } => !optional && is_plain_new_callee(object),
        ExprKind::Index { object, .. } => is_plain_new_callee(object),
        ExprKind::Call { .. } | ExprKind::New { .. } => false,
        _ => prec(expr) == PREC_PRIMARY,
    }
}

// ── Printer ────────────────────────────────────────────────────────────

/// Print a single expression.
pub fn print_expr(expr: &Expr) -> String {
    let mut p = Printer::default();
    p.expr(expr, PREC_SEQUENCE);
    p.out
}

/// Print a fragment: the expression for inline fragments, the statement
/// list for body fragments.
pub fn print_fragment(fragment: &Fragment) -> String {
    let mut p = Printer::default();
    match &fragment.body {
        FragmentBody::Expr(expr) => p.expr(expr, PREC_SEQUENCE),
        FragmentBody::Body(stmts) => p.stmt_lines(stmts),
    }
    p.out
}

/// Print `function (params) { body }` for a replaced member body.
pub fn print_function(params: &[String], body: &[Stmt]) -> String {
    let mut p = Printer::default();
    p.function(params, body);
    p.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn comma_list(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(item, PREC_ASSIGN);
        }
    }

    fn params(&mut self, params: &[String]) {
        self.push("(");
        self.push(&params.join(", "));
        self.push(")");
    }

    fn function(&mut self, params: &[String], body: &[Stmt]) {
        self.push("function ");
        self.params(params);
        self.push(" ");
        self.block(body);
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn expr(&mut self, expr: &Expr, min_prec: u8) {
        if prec(expr) < min_prec {
            self.push("(");
            self.expr_inner(expr);
            self.push(")");
        } else {
            self.expr_inner(expr);
        }
    }

    fn grouped(&mut self, expr: &Expr) {
        self.push("(");
        self.expr(expr, PREC_SEQUENCE);
        self.push(")");
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Number(text) | ExprKind::Str(text) | ExprKind::Ident(text) => self.push(text),
            ExprKind::Bool(b) => self.push(if *b { "true" } else { "false" }),
            ExprKind::Null => self.push("null"),
            ExprKind::This => self.push("this"),
            ExprKind::Hole(hole) => self.push(&hole.to_string()),
            ExprKind::Param(ParamRef::Receiver) => self.push("this"),
            ExprKind::Param(ParamRef::Param { name, .. }) => self.push(name),
            ExprKind::Global => self.push("$global"),
            ExprKind::GlobalRef(alias) => self.push(alias),
            ExprKind::Array(items) => {
                self.push("[");
                self.comma_list(items);
                self.push("]");
            }
            ExprKind::Object(props) => {
                if props.is_empty() {
                    self.push("{}");
                    return;
                }
                self.push("{ ");
                for (i, prop) in props.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match (&prop.key, &prop.value.kind) {
                        (PropKey::Ident(key), ExprKind::Ident(value)) if key == value => {
                            self.push(key);
                            continue;
                        }
                        (PropKey::Ident(key) | PropKey::Str(key) | PropKey::Number(key), _) => {
                            self.push(key)
                        }
                        (PropKey::Computed(key), _) => {
                            self.push("[");
                            self.expr(key, PREC_ASSIGN);
                            self.push("]");
                        }
                    }
                    self.push(": ");
                    self.expr(&prop.value, PREC_ASSIGN);
                }
                self.push(" }");
            }
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                if matches!(object.kind, ExprKind::Number(_)) {
                    self.grouped(object);
                } else {
                    self.expr(object, PREC_CALL);
                }
                self.push(if *optional { "?." } else { "." });
                self.push(property);
            }
            ExprKind::Index { object, index } => {
                self.expr(object, PREC_CALL);
                self.push("[");
                self.expr(index, PREC_SEQUENCE);
                self.push("]");
            }
            ExprKind::Call { callee, args } => {
                self.expr(callee, PREC_CALL);
                self.push("(");
                self.comma_list(args);
                self.push(")");
            }
            ExprKind::New { callee, args } => {
                self.push("new ");
                if is_plain_new_callee(callee) {
                    self.expr(callee, PREC_CALL);
                } else {
                    self.grouped(callee);
                }
                self.push("(");
                self.comma_list(args);
                self.push(")");
            }
            ExprKind::Unary { op, operand } => {
                self.push(op.as_str());
                let mut inner = Printer {
                    out: String::new(),
                    indent: self.indent,
                };
                inner.expr(operand, PREC_UNARY);
                let needs_space = op.is_keyword()
                    || (matches!(op, UnaryOp::Neg | UnaryOp::Plus)
                        && inner.out.starts_with(op.as_str()));
                if needs_space {
                    self.push(" ");
                }
                self.push(&inner.out);
            }
            ExprKind::Update {
                op,
                prefix,
                operand,
            } => {
                if *prefix {
                    self.push(op.as_str());
                    self.expr(operand, PREC_UNARY);
                } else {
                    self.expr(operand, PREC_CALL);
                    self.push(op.as_str());
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let p = binary_prec(*op);
                // `**` is right-associative and its base cannot be a unary
                // expression.
                let (lhs_min, rhs_min) = if *op == BinaryOp::Pow {
                    (PREC_POSTFIX, p)
                } else {
                    (p, p + 1)
                };
                if mixes_nullish(*op, lhs) {
                    self.grouped(lhs);
                } else {
                    self.expr(lhs, lhs_min);
                }
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                if mixes_nullish(*op, rhs) {
                    self.grouped(rhs);
                } else {
                    self.expr(rhs, rhs_min);
                }
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.expr(test, PREC_CONDITIONAL + 1);
                self.push(" ? ");
                self.expr(consequent, PREC_ASSIGN);
                self.push(" : ");
                self.expr(alternate, PREC_ASSIGN);
            }
            ExprKind::Assign { op, target, value } => {
                self.expr(target, PREC_CALL);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.expr(value, PREC_ASSIGN);
            }
            ExprKind::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(item, PREC_ASSIGN);
                }
            }
            ExprKind::Function { params, body } => self.function(params, body),
            ExprKind::Arrow { params, body } => {
                match params.as_slice() {
                    [single] => self.push(single),
                    _ => self.params(params),
                }
                self.push(" => ");
                match body {
                    ArrowBody::Expr(body) if matches!(body.kind, ExprKind::Object(_)) => {
                        self.grouped(body)
                    }
                    ArrowBody::Expr(body) => self.expr(body, PREC_ASSIGN),
                    ArrowBody::Block(stmts) => self.block(stmts),
                }
            }
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn stmt_lines(&mut self, stmts: &[Stmt]) {
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            self.stmt(stmt);
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for stmt in stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    /// Statement bodies of `if`/`while`/`for` are always braced.
    fn body(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(stmts) => self.block(stmts),
            _ => self.block(std::slice::from_ref(stmt)),
        }
    }

    fn var_decl(&mut self, kind: DeclKind, decls: &[Declarator]) {
        self.push(kind.as_str());
        self.push(" ");
        for (i, decl) in decls.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(&decl.name);
            if let Some(init) = &decl.init {
                self.push(" = ");
                self.expr(init, PREC_ASSIGN);
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                let mut inner = Printer {
                    out: String::new(),
                    indent: self.indent,
                };
                inner.expr(expr, PREC_SEQUENCE);
                // An expression statement cannot start with `{` or `function`.
                if inner.out.starts_with('{') || inner.out.starts_with("function") {
                    self.push("(");
                    self.push(&inner.out);
                    self.push(")");
                } else {
                    self.push(&inner.out);
                }
                self.push(";");
            }
            StmtKind::VarDecl { kind, decls } => {
                self.var_decl(*kind, decls);
                self.push(";");
            }
            StmtKind::Return(value) => {
                self.push("return");
                if let Some(value) = value {
                    self.push(" ");
                    self.expr(value, PREC_SEQUENCE);
                }
                self.push(";");
            }
            StmtKind::If {
                test,
                then,
                otherwise,
            } => {
                self.push("if (");
                self.expr(test, PREC_SEQUENCE);
                self.push(") ");
                self.body(then);
                if let Some(otherwise) = otherwise {
                    self.push(" else ");
                    match &otherwise.kind {
                        StmtKind::If { .. } => self.stmt(otherwise),
                        _ => self.body(otherwise),
                    }
                }
            }
            StmtKind::While { test, body } => {
                self.push("while (");
                self.expr(test, PREC_SEQUENCE);
                self.push(") ");
                self.body(body);
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                self.push("for (");
                if let Some(init) = init {
                    match &init.kind {
                        StmtKind::VarDecl { kind, decls } => self.var_decl(*kind, decls),
                        StmtKind::Expr(expr) => self.expr(expr, PREC_SEQUENCE),
                        _ => {}
                    }
                }
                self.push(";");
                if let Some(test) = test {
                    self.push(" ");
                    self.expr(test, PREC_SEQUENCE);
                }
                self.push(";");
                if let Some(update) = update {
                    self.push(" ");
                    self.expr(update, PREC_SEQUENCE);
                }
                self.push(") ");
                self.body(body);
            }
            StmtKind::Throw(value) => {
                self.push("throw ");
                self.expr(value, PREC_SEQUENCE);
                self.push(";");
            }
            StmtKind::Break => self.push("break;"),
            StmtKind::Continue => self.push("continue;"),
            StmtKind::Block(stmts) => self.block(stmts),
        }
    }
}

#[cfg(test)]
mod tests {
    use tether_common::decl::BindingMode;

    use super::*;
    use crate::parser::{parse_expression, parse_snippet};

    fn roundtrip(src: &str) -> String {
        print_expr(&parse_expression(src).unwrap())
    }

    #[test]
    fn parentheses_follow_precedence() {
        assert_eq!(roundtrip("(a + b) * c"), "(a + b) * c");
        assert_eq!(roundtrip("a + (b * c)"), "a + b * c");
        assert_eq!(roundtrip("a - (b - c)"), "a - (b - c)");
        assert_eq!(roundtrip("(-a) ** 2"), "(-a) ** 2");
        assert_eq!(roundtrip("a ?? (b || c)"), "a ?? (b || c)");
        assert_eq!(roundtrip("(a, b)"), "a, b");
        assert_eq!(roundtrip("f((a, b))"), "f((a, b))");
    }

    #[test]
    fn unary_spacing() {
        assert_eq!(roundtrip("- -a"), "- -a");
        assert_eq!(roundtrip("typeof(x)"), "typeof x");
        assert_eq!(roundtrip("!(a && b)"), "!(a && b)");
    }

    #[test]
    fn new_callee_with_call_is_grouped() {
        assert_eq!(roundtrip("new (f())()"), "new (f())()");
        assert_eq!(roundtrip("new a.B"), "new a.B()");
    }

    #[test]
    fn arrow_returning_object_is_grouped() {
        assert_eq!(roundtrip("x => ({ x })"), "x => ({ x })");
    }

    #[test]
    fn body_statements_are_braced() {
        let fragment = parse_snippet(
            "if ($a) return 1\nelse if ($b) return 2\nfor (;;) break",
            BindingMode::BodyReplacement,
        )
        .unwrap();
        insta::assert_snapshot!(
            print_fragment(&fragment).replace('\n', "|"),
            @"if ($a) {|  return 1;|} else if ($b) {|  return 2;|}|for (;;) {|  break;|}"
        );
    }

    #[test]
    fn object_literal_statement_is_wrapped() {
        let fragment = parse_snippet("({ a: 1 }).a; x", BindingMode::BodyReplacement).unwrap();
        assert_eq!(print_fragment(&fragment), "({ a: 1 }.a);\nreturn x;");
    }
}
