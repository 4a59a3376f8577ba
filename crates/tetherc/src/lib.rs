//! The Tether driver.
//!
//! [`translate`] runs both passes over a [`CompilationUnit`]: the hierarchy
//! naming resolver and the snippet binding engine. Their findings are turned
//! into [`Diagnostic`]s; one failing member never stops the rest of the unit.

pub mod config;
pub mod diagnostics;

use serde::Serialize;
use tether_bind::BindingEngine;
use tether_common::decl::CompilationUnit;
use tether_naming::{resolve_names, NameOrigin};
use tether_snippet::GlobalCache;

pub use config::TetherConfig;
pub use diagnostics::{render_diagnostic, Diagnostic, DiagnosticOptions, Severity};

/// Final name of one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberName {
    pub member: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub origin: NameOrigin,
}

/// A replaced member body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyOutput {
    pub member: String,
    pub text: String,
}

/// A call site rewritten by its callee's expansion rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionOutput {
    /// Index into the unit's call sites.
    pub site: usize,
    pub callee: String,
    pub text: String,
}

/// Everything one translation produced.
#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    /// Declaration of the global object alias, when any snippet used it.
    pub prologue: Option<String>,
    /// Names of every member outside host-only types, in member order.
    pub names: Vec<MemberName>,
    pub bodies: Vec<BodyOutput>,
    pub expansions: Vec<ExpansionOutput>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Translation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn name_of(&self, signature: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.member == signature)
            .map(|n| n.name.as_str())
    }
}

/// Translate a whole compilation unit.
#[tracing::instrument(skip_all, fields(types = unit.types.len(), members = unit.members.len()))]
pub fn translate(unit: &CompilationUnit, config: &TetherConfig) -> Translation {
    let naming = resolve_names(unit);
    let cache = GlobalCache::new(config.translate.global_alias.clone());
    let bound = BindingEngine::new(unit).bind_unit(&cache);

    let names = naming
        .names
        .iter()
        .filter(|n| !n.host_only)
        .map(|n| MemberName {
            member: unit.member_signature(n.member),
            name: n.name.clone(),
            aliases: n.aliases.clone(),
            origin: n.origin,
        })
        .collect();

    let bodies = bound
        .bodies
        .iter()
        .map(|body| BodyOutput {
            member: unit.member_signature(body.member),
            text: body.render(),
        })
        .collect();

    let expansions = bound
        .expansions
        .iter()
        .map(|e| ExpansionOutput {
            site: e.site,
            callee: unit.member_signature(e.callee),
            text: e.text.clone(),
        })
        .collect();

    let diagnostics = diagnostics::collect(
        unit,
        &bound.errors,
        &bound.warnings,
        &naming.conflicts,
        &config.diagnostics,
    );

    tracing::debug!(diagnostics = diagnostics.len(), "translation finished");
    Translation {
        prologue: cache.prologue(),
        names,
        bodies,
        expansions,
        diagnostics,
    }
}
