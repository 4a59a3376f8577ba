//! Call-site expansion rules for inline snippets.
//!
//! A rule holds the resolved expression of one member. Expanding it copies
//! the expression and replaces each parameter reference with a copy of the
//! matching call-site expression. Arguments are not hoisted into
//! temporaries, so a parameter used twice duplicates its argument; snippet
//! authors are responsible for keeping such arguments side-effect free.
//!
//! Arrow parameters of the rule that share a name with an identifier in the
//! call-site expressions are renamed first, so an argument never ends up
//! bound by the snippet's own arrow functions.

use std::collections::BTreeSet;

use tether_common::decl::MemberId;
use tether_snippet::ast::{ArrowBody, Expr, ExprKind, ParamRef};

use crate::error::ArgumentCountMismatch;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionRule {
    pub member: MemberId,
    /// Resolved, global-rewritten inline expression.
    pub expr: Expr,
    pub has_receiver: bool,
    /// Number of declared parameters.
    pub arity: usize,
}

impl ExpansionRule {
    /// Number of values a call site must supply, receiver included.
    pub fn expected_values(&self) -> usize {
        self.arity + usize::from(self.has_receiver)
    }

    /// Expand the rule for one call.
    ///
    /// The receiver and arguments are taken as one sequence, so an extension
    /// member called with receiver syntax lines its receiver up with the
    /// first declared parameter.
    pub fn expand(
        &self,
        receiver: Option<&Expr>,
        args: &[Expr],
    ) -> Result<Expr, ArgumentCountMismatch> {
        let values: Vec<&Expr> = receiver.into_iter().chain(args).collect();
        if values.len() != self.expected_values() {
            return Err(ArgumentCountMismatch {
                expected: self.expected_values(),
                found: values.len(),
            });
        }

        let mut free = BTreeSet::new();
        for value in &values {
            value.walk(&mut |expr: &Expr| {
                if let ExprKind::Ident(name) = &expr.kind {
                    free.insert(name.clone());
                }
            });
        }
        let expr = avoid_capture(self.expr.clone(), &free);

        let offset = usize::from(self.has_receiver);
        let expanded = expr.map(&mut |expr: Expr| match &expr.kind {
            ExprKind::Param(ParamRef::Receiver) => values[0].clone(),
            ExprKind::Param(ParamRef::Param { position, .. }) => {
                values[*position as usize + offset].clone()
            }
            _ => expr,
        });
        Ok(expanded)
    }
}

/// Rename every arrow parameter of `expr` that is also in `free`.
///
/// Arrows are rebuilt innermost first, so by the time an outer arrow is
/// renamed no inner arrow still binds the same name.
fn avoid_capture(expr: Expr, free: &BTreeSet<String>) -> Expr {
    if free.is_empty() {
        return expr;
    }
    let mut taken = free.clone();
    expr.walk(&mut |e: &Expr| match &e.kind {
        ExprKind::Ident(name) => {
            taken.insert(name.clone());
        }
        ExprKind::Arrow { params, .. } | ExprKind::Function { params, .. } => {
            taken.extend(params.iter().cloned());
        }
        _ => {}
    });

    expr.map(&mut |e: Expr| match e.kind {
        ExprKind::Arrow { params, mut body } => {
            let mut renamed = Vec::with_capacity(params.len());
            for param in params {
                if !free.contains(&param) {
                    renamed.push(param);
                    continue;
                }
                let fresh = fresh_name(&param, &mut taken);
                body = rename_in(body, &param, &fresh);
                renamed.push(fresh);
            }
            Expr::new(
                ExprKind::Arrow {
                    params: renamed,
                    body,
                },
                e.span,
            )
        }
        kind => Expr::new(kind, e.span),
    })
}

fn rename_in(body: ArrowBody, from: &str, to: &str) -> ArrowBody {
    let mut rename = |e: Expr| match &e.kind {
        ExprKind::Ident(name) if name == from => Expr::new(ExprKind::Ident(to.to_string()), e.span),
        _ => e,
    };
    match body {
        ArrowBody::Expr(e) => ArrowBody::Expr(Box::new(e.map(&mut rename))),
        ArrowBody::Block(stmts) => {
            ArrowBody::Block(stmts.into_iter().map(|s| s.map_exprs(&mut rename)).collect())
        }
    }
}

/// `base$1`, `base$2`, ... whichever is unused first.
fn fresh_name(base: &str, taken: &mut BTreeSet<String>) -> String {
    let mut n = 1;
    loop {
        let candidate = format!("{base}${n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use tether_common::decl::{BindingMode, Param};
    use tether_snippet::{parse_expression, parse_snippet, print_expr, resolve, BindingSite, FragmentBody};

    use super::*;

    fn rule(src: &str, has_receiver: bool, names: &[&str]) -> ExpansionRule {
        let params: Vec<Param> = names
            .iter()
            .enumerate()
            .map(|(i, n)| Param::new(*n, "Object", i as u32))
            .collect();
        let site = BindingSite {
            has_receiver,
            is_extension: false,
            params: &params,
        };
        let fragment = parse_snippet(src, BindingMode::InlineExpansion).unwrap();
        let resolved = resolve(fragment, &site).unwrap();
        let FragmentBody::Expr(expr) = resolved.fragment.body else {
            panic!("inline fragment must be an expression");
        };
        ExpansionRule {
            member: MemberId(0),
            expr,
            has_receiver,
            arity: names.len(),
        }
    }

    fn args(srcs: &[&str]) -> Vec<Expr> {
        srcs.iter().map(|s| parse_expression(s).unwrap()).collect()
    }

    #[test]
    fn substitutes_arguments_with_precedence() {
        let r = rule("$0 * $1", false, &["a", "b"]);
        let out = r.expand(None, &args(&["x + 1", "y"])).unwrap();
        assert_eq!(print_expr(&out), "(x + 1) * y");
    }

    #[test]
    fn two_call_sites_are_independent() {
        let r = rule("$this.get($key) || $key", true, &["key"]);
        let before = r.clone();
        let recv = parse_expression("cache").unwrap();
        let first = r.expand(Some(&recv), &args(&["'a'"])).unwrap();
        let second = r.expand(Some(&recv), &args(&["k2"])).unwrap();
        assert_eq!(print_expr(&first), "cache.get('a') || 'a'");
        assert_eq!(print_expr(&second), "cache.get(k2) || k2");
        assert_eq!(r, before);
    }

    #[test]
    fn wrong_argument_count() {
        let r = rule("$this.push($v)", true, &["v"]);
        let recv = parse_expression("xs").unwrap();
        let err = r.expand(Some(&recv), &[]).unwrap_err();
        assert_eq!(
            err,
            ArgumentCountMismatch {
                expected: 2,
                found: 1
            }
        );
        assert!(r.expand(None, &args(&["1"])).is_err());
    }

    #[test]
    fn arguments_are_not_captured_by_arrow_parameters() {
        let r = rule("$xs.map(x => x + $y)", false, &["xs", "y"]);
        let out = r.expand(None, &args(&["list", "x"])).unwrap();
        assert_eq!(print_expr(&out), "list.map(x$1 => x$1 + x)");

        let out = r.expand(None, &args(&["list", "z"])).unwrap();
        assert_eq!(print_expr(&out), "list.map(x => x + z)");

        let nested = rule("$f(a => b => a + b + $v)", false, &["f", "v"]);
        let out = nested.expand(None, &args(&["g", "a * b"])).unwrap();
        assert_eq!(print_expr(&out), "g(a$1 => b$1 => a$1 + b$1 + a * b)");
    }

    #[test]
    fn receiver_syntax_for_static_member() {
        let r = rule("$0.length + $1", false, &["s", "n"]);
        let recv = parse_expression("name").unwrap();
        let out = r.expand(Some(&recv), &args(&["2"])).unwrap();
        assert_eq!(print_expr(&out), "name.length + 2");
    }
}
