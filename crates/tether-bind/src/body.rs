//! Body replacement output.

use std::collections::BTreeSet;

use tether_common::decl::MemberId;
use tether_common::span::Span;
use tether_common::token::is_reserved_word;
use tether_snippet::ast::{
    DeclKind, Declarator, Expr, ExprKind, Fragment, FragmentBody, ParamRef, Stmt, StmtKind,
};
use tether_snippet::print_function;

/// Name the receiver is captured under when a nested `function` uses it.
const RECEIVER_ALIAS: &str = "$this";

/// A member whose translated body is a resolved snippet.
///
/// The member keeps its host signature; only the body changes.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyReplacement {
    pub member: MemberId,
    /// Declared parameter names, in order. The receiver is `this`.
    pub params: Vec<String>,
    pub fragment: Fragment,
}

impl BodyReplacement {
    /// Render as a target-language function expression.
    ///
    /// Parameters whose host name is reserved in the target are renamed. A
    /// receiver used inside a nested `function` is read through an alias
    /// bound at the top of the body, since `this` is rebound there.
    pub fn render(&self) -> String {
        let stmts = match &self.fragment.body {
            FragmentBody::Body(stmts) => stmts.clone(),
            // Body fragments are always statement lists; an expression is
            // rendered as its own return.
            FragmentBody::Expr(expr) => {
                vec![Stmt::new(StmtKind::Return(Some(expr.clone())), expr.span)]
            }
        };

        let mut taken = identifiers(&stmts);
        taken.extend(self.params.iter().filter(|p| !is_reserved_word(p)).cloned());
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                if is_reserved_word(p) {
                    fresh_name(&format!("{p}$"), &mut taken)
                } else {
                    p.clone()
                }
            })
            .collect();
        let alias = captures_receiver(&stmts).then(|| fresh_name(RECEIVER_ALIAS, &mut taken));

        let mut rename = |expr: Expr| match &expr.kind {
            ExprKind::Param(ParamRef::Receiver) => match &alias {
                Some(alias) => Expr::new(ExprKind::Ident(alias.clone()), expr.span),
                None => expr,
            },
            ExprKind::Param(ParamRef::Param { position, name }) => {
                match params.get(*position as usize) {
                    Some(target) if target != name => Expr::new(
                        ExprKind::Param(ParamRef::Param {
                            position: *position,
                            name: target.clone(),
                        }),
                        expr.span,
                    ),
                    _ => expr,
                }
            }
            _ => expr,
        };
        let mut body: Vec<Stmt> = stmts.into_iter().map(|s| s.map_exprs(&mut rename)).collect();

        if let Some(alias) = &alias {
            let bind = StmtKind::VarDecl {
                kind: DeclKind::Var,
                decls: vec![Declarator {
                    name: alias.clone(),
                    init: Some(Expr::new(ExprKind::This, Span::default())),
                }],
            };
            body.insert(0, Stmt::new(bind, Span::default()));
        }
        print_function(&params, &body)
    }
}

/// Whether the receiver is referenced from inside a nested `function`.
fn captures_receiver(stmts: &[Stmt]) -> bool {
    let mut found = false;
    for stmt in stmts {
        stmt.walk_exprs(&mut |expr: &Expr| {
            if let ExprKind::Function { body, .. } = &expr.kind {
                found |= body.iter().any(uses_receiver);
            }
        });
    }
    found
}

fn uses_receiver(stmt: &Stmt) -> bool {
    let mut found = false;
    stmt.walk_exprs(&mut |expr: &Expr| {
        found |= matches!(expr.kind, ExprKind::Param(ParamRef::Receiver));
    });
    found
}

/// Every identifier the body already reads.
fn identifiers(stmts: &[Stmt]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for stmt in stmts {
        stmt.walk_exprs(&mut |expr: &Expr| {
            if let ExprKind::Ident(name) = &expr.kind {
                names.insert(name.clone());
            }
        });
    }
    names
}

/// `base`, or `base` with `$` appended until it is unused.
fn fresh_name(base: &str, taken: &mut BTreeSet<String>) -> String {
    let mut name = base.to_string();
    while taken.contains(&name) {
        name.push('$');
    }
    taken.insert(name.clone());
    name
}
