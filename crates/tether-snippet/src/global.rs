//! `$global` rewriting.
//!
//! Every `$global` marker in a compilation becomes a reference to one cached
//! alias of the ambient global object. The alias is bound once, the first
//! time any fragment needs it, and the driver emits its declaration in the
//! output prologue. Fragments without a marker are left untouched: bare
//! identifiers pass through and are assumed to exist at runtime.

use std::sync::OnceLock;

use crate::ast::{Expr, ExprKind, Fragment};

/// Identifier the alias is bound to unless configured otherwise.
pub const DEFAULT_GLOBAL_ALIAS: &str = "$global";

/// Write-once cache of the global object alias, shared by every fragment of
/// a compilation.
#[derive(Debug)]
pub struct GlobalCache {
    alias: String,
    bound: OnceLock<String>,
}

impl Default for GlobalCache {
    fn default() -> Self {
        Self::new(DEFAULT_GLOBAL_ALIAS)
    }
}

impl GlobalCache {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            bound: OnceLock::new(),
        }
    }

    /// The cached reference, binding it on first use.
    pub fn reference(&self) -> &str {
        self.bound.get_or_init(|| {
            tracing::debug!(alias = %self.alias, "binding global object alias");
            self.alias.clone()
        })
    }

    /// Whether any fragment has used the alias yet.
    pub fn is_materialized(&self) -> bool {
        self.bound.get().is_some()
    }

    /// Declaration of the alias, once it has been used.
    pub fn prologue(&self) -> Option<String> {
        self.bound
            .get()
            .map(|alias| format!("var {alias} = globalThis;"))
    }
}

/// Rewrite every `$global` marker in `fragment` to the cached alias.
///
/// Returns the rewritten fragment and the number of markers replaced. This
/// never fails; with no markers it returns the fragment unchanged and does
/// not bind the alias.
pub fn rewrite_globals(fragment: Fragment, cache: &GlobalCache) -> (Fragment, usize) {
    if fragment.global_markers() == 0 {
        return (fragment, 0);
    }

    let mut uses = 0;
    let fragment = fragment.map_exprs(&mut |expr: Expr| match expr.kind {
        ExprKind::Global => {
            uses += 1;
            Expr::new(ExprKind::GlobalRef(cache.reference().to_string()), expr.span)
        }
        _ => expr,
    });
    tracing::trace!(uses, "rewrote global markers");
    (fragment, uses)
}

#[cfg(test)]
mod tests {
    use tether_common::decl::BindingMode;

    use super::*;
    use crate::parser::parse_snippet;

    #[test]
    fn repeated_markers_share_one_reference() {
        let cache = GlobalCache::default();
        let fragment = parse_snippet(
            "$global.lib.fn(); $global.lib.fn()",
            BindingMode::BodyReplacement,
        )
        .unwrap();
        let (fragment, uses) = rewrite_globals(fragment, &cache);
        assert_eq!(uses, 2);
        assert_eq!(fragment.global_markers(), 0);

        let mut refs = Vec::new();
        fragment.walk_exprs(&mut |e| {
            if let ExprKind::GlobalRef(alias) = &e.kind {
                refs.push(alias.clone());
            }
        });
        assert_eq!(refs, vec!["$global".to_string(), "$global".to_string()]);
        assert_eq!(cache.prologue().as_deref(), Some("var $global = globalThis;"));
    }

    #[test]
    fn bare_identifiers_are_left_alone() {
        let cache = GlobalCache::new("__g");
        let fragment = parse_snippet("lib.fn()", BindingMode::InlineExpansion).unwrap();
        let (rewritten, uses) = rewrite_globals(fragment.clone(), &cache);
        assert_eq!(uses, 0);
        assert_eq!(rewritten, fragment);
        assert!(!cache.is_materialized());
        assert_eq!(cache.prologue(), None);
    }

    #[test]
    fn alias_is_bound_once_across_fragments() {
        let cache = GlobalCache::new("__g");
        for src in ["$global.a", "$global.b"] {
            let fragment = parse_snippet(src, BindingMode::InlineExpansion).unwrap();
            rewrite_globals(fragment, &cache);
        }
        assert!(cache.is_materialized());
        assert_eq!(cache.reference(), "__g");
    }
}
