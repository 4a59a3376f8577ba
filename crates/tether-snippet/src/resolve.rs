//! Placeholder resolution.
//!
//! Every hole is resolved independently against the binding site's
//! parameter list; the outcome of one hole never depends on another.
//!
//! Index rules:
//! - static members and free functions: `$k` is declared parameter `k`
//! - instance members: `$0` is the receiver, `$k` is declared parameter `k - 1`
//!
//! `$this` resolves, in order, to a parameter literally named `this` (with a
//! warning), the receiver of an instance member, the first parameter of an
//! extension member, or nothing.

use tether_common::decl::{MemberDecl, Param};
use tether_common::span::Span;

use crate::ast::{Expr, ExprKind, Fragment, Hole, ParamRef};
use crate::error::{SnippetError, SnippetErrorKind, SnippetWarning};

/// The host declaration a fragment is attached to.
#[derive(Debug, Clone)]
pub struct BindingSite<'a> {
    /// Instance members have an implicit receiver at index 0.
    pub has_receiver: bool,
    /// Extension members take their receiver as the first declared parameter.
    pub is_extension: bool,
    pub params: &'a [Param],
}

impl<'a> BindingSite<'a> {
    pub fn of_member(member: &'a MemberDecl) -> Self {
        Self {
            has_receiver: member.has_receiver(),
            is_extension: member.is_extension,
            params: &member.params,
        }
    }

    fn param(&self, position: usize) -> Option<ParamRef> {
        self.params.get(position).map(|p| ParamRef::Param {
            position: position as u32,
            name: p.name.clone(),
        })
    }

    /// Resolve one hole. The warning flag is set when `$this` was captured
    /// by a parameter named `this`.
    fn resolve_hole(&self, hole: &Hole) -> Option<(ParamRef, bool)> {
        match hole {
            Hole::ByName(name) => self
                .params
                .iter()
                .position(|p| p.name == *name)
                .and_then(|i| self.param(i))
                .map(|r| (r, false)),
            Hole::ByIndex(index) => {
                let index = *index as usize;
                let resolved = if self.has_receiver {
                    match index {
                        0 => Some(ParamRef::Receiver),
                        k => self.param(k - 1),
                    }
                } else {
                    self.param(index)
                };
                resolved.map(|r| (r, false))
            }
            Hole::SelfImplicit => {
                if let Some(i) = self.params.iter().position(|p| p.name == "this") {
                    return self.param(i).map(|r| (r, true));
                }
                if self.has_receiver {
                    Some((ParamRef::Receiver, false))
                } else if self.is_extension {
                    self.param(0).map(|r| (r, false))
                } else {
                    None
                }
            }
        }
    }
}

/// A fragment with every hole replaced by a parameter reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub fragment: Fragment,
    pub warnings: Vec<SnippetWarning>,
}

/// Resolve every hole of `fragment` against `site`.
///
/// All unbound holes are reported, in source order.
pub fn resolve(fragment: Fragment, site: &BindingSite<'_>) -> Result<Resolved, Vec<SnippetError>> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let fragment = fragment.map_exprs(&mut |expr: Expr| match &expr.kind {
        ExprKind::Hole(hole) => match site.resolve_hole(hole) {
            Some((param, shadowed)) => {
                if shadowed {
                    warnings.push(SnippetWarning::ShadowedThis { span: expr.span });
                }
                Expr::new(ExprKind::Param(param), expr.span)
            }
            None => {
                errors.push(unbound(hole.clone(), expr.span));
                expr
            }
        },
        _ => expr,
    });

    if errors.is_empty() {
        tracing::trace!(warnings = warnings.len(), "resolved placeholders");
        Ok(Resolved { fragment, warnings })
    } else {
        // Post-order rebuilding visits siblings left to right, but sort anyway
        // so nested holes come out by position.
        errors.sort_by_key(|e| (e.span.start, e.span.end));
        Err(errors)
    }
}

fn unbound(hole: Hole, span: Span) -> SnippetError {
    SnippetError::new(SnippetErrorKind::UnboundPlaceholder(hole), span)
}
