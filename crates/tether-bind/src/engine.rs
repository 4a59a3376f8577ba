//! The binding strategy engine.
//!
//! Both strategies run the same pipeline (parse, resolve placeholders,
//! rewrite globals) and differ only in what they produce: a replaced body
//! plus a host stub, or an expansion rule applied at every call site.

use rustc_hash::FxHashMap;
use tether_common::decl::{BindingMode, CallSite, CompilationUnit, MemberId, SnippetSource};
use tether_snippet::ast::FragmentBody;
use tether_snippet::{
    parse_expression, parse_snippet, print_expr, resolve, rewrite_globals, BindingSite, Expr,
    GlobalCache,
};

use crate::body::BodyReplacement;
use crate::error::{BindError, BindErrorKind, BindWarning};
use crate::expand::ExpansionRule;
use crate::guard::HostStub;

/// What a snippet-carrying member binds to.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberBinding {
    Body(BodyReplacement),
    Inline(ExpansionRule),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundMember {
    pub binding: MemberBinding,
    pub warnings: Vec<BindWarning>,
}

/// One call site rewritten by an expansion rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// Index into [`CompilationUnit::call_sites`].
    pub site: usize,
    pub callee: MemberId,
    pub text: String,
}

/// Everything the binding pass produced for a unit.
#[derive(Debug, Default)]
pub struct BindOutput {
    /// Replaced bodies, by member id.
    pub bodies: Vec<BodyReplacement>,
    /// Host stand-ins for the replaced members, parallel to `bodies`.
    pub stubs: Vec<HostStub>,
    pub rules: FxHashMap<MemberId, ExpansionRule>,
    /// Expanded call sites, in call-site order.
    pub expansions: Vec<Expansion>,
    pub errors: Vec<BindError>,
    pub warnings: Vec<BindWarning>,
}

pub struct BindingEngine<'u> {
    unit: &'u CompilationUnit,
}

impl<'u> BindingEngine<'u> {
    pub fn new(unit: &'u CompilationUnit) -> Self {
        Self { unit }
    }

    /// Bind one member's snippet. `Ok(None)` for members without one.
    pub fn bind_member(
        &self,
        id: MemberId,
        cache: &GlobalCache,
    ) -> Result<Option<BoundMember>, Vec<BindError>> {
        let member = self.unit.member(id);
        let Some((mode, snippet)) = member.binding.snippet() else {
            return Ok(None);
        };

        let fail = |err| BindError::from_snippet(err, id, &snippet.location, &snippet.text);

        let fragment = parse_snippet(&snippet.text, mode).map_err(|err| vec![fail(err)])?;
        let resolved = resolve(fragment, &BindingSite::of_member(member))
            .map_err(|errs| errs.into_iter().map(fail).collect::<Vec<_>>())?;
        let (fragment, global_uses) = rewrite_globals(resolved.fragment, cache);

        let warnings = resolved
            .warnings
            .into_iter()
            .map(|warning| warning_for(warning, id, snippet))
            .collect();

        let binding = match (mode, fragment.body) {
            (BindingMode::InlineExpansion, FragmentBody::Expr(expr)) => {
                MemberBinding::Inline(ExpansionRule {
                    member: id,
                    expr,
                    has_receiver: member.has_receiver(),
                    arity: member.params.len(),
                })
            }
            (_, body) => MemberBinding::Body(BodyReplacement {
                member: id,
                params: member.params.iter().map(|p| p.name.clone()).collect(),
                fragment: tether_snippet::Fragment { mode, body },
            }),
        };

        tracing::debug!(
            member = %self.unit.member_signature(id),
            %mode,
            global_uses,
            "bound snippet"
        );
        Ok(Some(BoundMember { binding, warnings }))
    }

    /// Bind every member of the unit, then expand every call site whose
    /// callee has an expansion rule. Errors are collected; one failing
    /// member never stops the others.
    #[tracing::instrument(skip_all, fields(members = self.unit.members.len()))]
    pub fn bind_unit(&self, cache: &GlobalCache) -> BindOutput {
        let mut out = BindOutput::default();

        for (id, _) in self.unit.member_ids() {
            match self.bind_member(id, cache) {
                Ok(None) => {}
                Ok(Some(bound)) => {
                    out.warnings.extend(bound.warnings);
                    match bound.binding {
                        MemberBinding::Body(body) => {
                            out.stubs
                                .push(HostStub::new(self.unit.member_signature(id)));
                            out.bodies.push(body);
                        }
                        MemberBinding::Inline(rule) => {
                            out.rules.insert(id, rule);
                        }
                    }
                }
                Err(errors) => out.errors.extend(errors),
            }
        }

        for (index, site) in self.unit.call_sites.iter().enumerate() {
            let Some(rule) = out.rules.get(&site.callee) else {
                continue;
            };
            match self.expand_call(rule, site) {
                Ok(expr) => out.expansions.push(Expansion {
                    site: index,
                    callee: site.callee,
                    text: print_expr(&expr),
                }),
                Err(err) => out.errors.push(err),
            }
        }

        tracing::debug!(
            bodies = out.bodies.len(),
            rules = out.rules.len(),
            expansions = out.expansions.len(),
            errors = out.errors.len(),
            "binding pass finished"
        );
        out
    }

    /// Parse one call site's receiver and arguments and expand the rule.
    pub fn expand_call(&self, rule: &ExpansionRule, site: &CallSite) -> Result<Expr, BindError> {
        let parse = |text: &str| {
            parse_expression(text)
                .map_err(|err| BindError::from_snippet(err, site.callee, &site.location, text))
        };
        let receiver = site.receiver.as_deref().map(parse).transpose()?;
        let args = site
            .args
            .iter()
            .map(|arg| parse(arg))
            .collect::<Result<Vec<_>, _>>()?;

        rule.expand(receiver.as_ref(), &args)
            .map_err(|mismatch| BindError {
                kind: BindErrorKind::ArgumentCountMismatch(mismatch),
                member: site.callee,
                location: site.location.clone(),
                source: None,
                span: None,
            })
    }
}

fn warning_for(
    warning: tether_snippet::SnippetWarning,
    member: MemberId,
    snippet: &SnippetSource,
) -> BindWarning {
    BindWarning {
        warning,
        member,
        location: snippet.location.clone(),
        source: snippet.text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use tether_common::decl::{
        Binding, MemberDecl, MemberKind, Param, SourceLocation, TypeDecl, TypeKind,
    };

    use super::*;

    fn unit_with(members: Vec<MemberDecl>) -> CompilationUnit {
        let mut unit = CompilationUnit::default();
        unit.add_type(TypeDecl {
            name: "Acme.Calc".into(),
            kind: TypeKind::Class,
            bases: vec![],
            short_name: None,
            host_only: false,
            location: SourceLocation::default(),
        });
        for m in members {
            unit.add_member(m);
        }
        unit
    }

    fn member(name: &str, is_static: bool, params: &[&str], binding: Binding) -> MemberDecl {
        MemberDecl {
            declaring_type: tether_common::decl::TypeId(0),
            name: name.into(),
            kind: MemberKind::Method,
            params: params
                .iter()
                .enumerate()
                .map(|(i, p)| Param::new(*p, "Int32", i as u32))
                .collect(),
            is_static,
            is_extension: false,
            is_abstract: false,
            is_override: false,
            overrides: None,
            implements: vec![],
            fixed_name: None,
            binding,
            location: SourceLocation::new("Calc.cs", 3, 5),
        }
    }

    fn snippet(text: &str) -> SnippetSource {
        SnippetSource::new(text, SourceLocation::new("Calc.cs", 2, 6))
    }

    #[test]
    fn members_without_snippet_are_skipped() {
        let unit = unit_with(vec![member("Plain", true, &[], Binding::None)]);
        let engine = BindingEngine::new(&unit);
        assert_eq!(
            engine.bind_member(MemberId(0), &GlobalCache::default()),
            Ok(None)
        );
    }

    #[test]
    fn body_replacement_renders_function() {
        let unit = unit_with(vec![member(
            "Add",
            true,
            &["x", "y"],
            Binding::BodyReplacement(snippet("$x + $y")),
        )]);
        let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
        assert!(out.errors.is_empty());
        assert_eq!(out.bodies.len(), 1);
        assert_eq!(out.bodies[0].render(), "function (x, y) {\n  return x + y;\n}");
        assert_eq!(out.stubs[0].member, "Acme.Calc.Add(Int32, Int32)");
    }

    #[test]
    fn receiver_in_nested_function_is_captured() {
        let unit = unit_with(vec![
            member(
                "AddAll",
                false,
                &["xs"],
                Binding::BodyReplacement(snippet("$xs.forEach(function (x) { $this.add(x) })")),
            ),
            member(
                "MapAll",
                false,
                &["xs"],
                Binding::BodyReplacement(snippet("$xs.map(x => $this.f(x))")),
            ),
        ]);
        let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
        assert!(out.errors.is_empty());
        assert_eq!(
            out.bodies[0].render(),
            "function (xs) {\n  var $this = this;\n  return xs.forEach(function (x) {\n    $this.add(x);\n  });\n}"
        );
        // Arrow functions keep the enclosing `this`.
        assert_eq!(
            out.bodies[1].render(),
            "function (xs) {\n  return xs.map(x => this.f(x));\n}"
        );
    }

    #[test]
    fn reserved_parameter_names_are_renamed() {
        let unit = unit_with(vec![member(
            "Odd",
            false,
            &["this"],
            Binding::BodyReplacement(snippet("$this.x + $0.y")),
        )]);
        let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
        assert!(out.errors.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(
            out.bodies[0].render(),
            "function (this$) {\n  return this$.x + this.y;\n}"
        );
    }

    #[test]
    fn errors_carry_attribute_location_and_offset() {
        let unit = unit_with(vec![member(
            "Bad",
            true,
            &["x"],
            Binding::InlineExpansion(snippet("$x + $y")),
        )]);
        let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
        assert_eq!(out.errors.len(), 1);
        let err = &out.errors[0];
        assert_eq!(err.location, SourceLocation::new("Calc.cs", 2, 6));
        assert_eq!(err.span, Some(tether_common::span::Span::new(5, 7)));
        assert_eq!(err.to_string(), "placeholder `$y` does not match any parameter");
    }

    #[test]
    fn one_failure_does_not_stop_other_members() {
        let unit = unit_with(vec![
            member("Bad", true, &[], Binding::InlineExpansion(snippet("$a = 1"))),
            member("Good", true, &["a"], Binding::InlineExpansion(snippet("$a * 2"))),
        ]);
        let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].member, MemberId(0));
        assert!(out.rules.contains_key(&MemberId(1)));
    }

    #[test]
    fn call_sites_are_expanded() {
        let mut unit = unit_with(vec![member(
            "Twice",
            true,
            &["v"],
            Binding::InlineExpansion(snippet("$v + $v")),
        )]);
        unit.call_sites.push(CallSite {
            callee: MemberId(0),
            receiver: None,
            args: vec!["f(1)".into()],
            location: SourceLocation::new("Main.cs", 10, 1),
        });
        unit.call_sites.push(CallSite {
            callee: MemberId(0),
            receiver: None,
            args: vec!["1,".into()],
            location: SourceLocation::new("Main.cs", 11, 1),
        });
        let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
        assert_eq!(out.expansions.len(), 1);
        assert_eq!(out.expansions[0].text, "f(1) + f(1)");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].location, SourceLocation::new("Main.cs", 11, 1));
        assert!(matches!(out.errors[0].kind, BindErrorKind::Snippet(ref k) if k.is_syntax()));
    }
}
