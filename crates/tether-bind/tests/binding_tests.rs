//! End-to-end binding scenarios over small compilation units.

use insta::assert_snapshot;
use tether_bind::{BindErrorKind, BindingEngine, MemberBinding};
use tether_common::decl::{
    Binding, CallSite, CompilationUnit, MemberDecl, MemberId, MemberKind, Param, SnippetSource,
    SourceLocation, TypeDecl, TypeId, TypeKind,
};
use tether_snippet::{GlobalCache, SnippetErrorKind, SnippetWarning};

fn class(unit: &mut CompilationUnit, name: &str) -> TypeId {
    unit.add_type(TypeDecl {
        name: name.into(),
        kind: TypeKind::Class,
        bases: vec![],
        short_name: None,
        host_only: false,
        location: SourceLocation::default(),
    })
}

fn method(owner: TypeId, name: &str, is_static: bool, params: &[&str], binding: Binding) -> MemberDecl {
    MemberDecl {
        declaring_type: owner,
        name: name.into(),
        kind: MemberKind::Method,
        params: params
            .iter()
            .enumerate()
            .map(|(i, p)| Param::new(*p, "Object", i as u32))
            .collect(),
        is_static,
        is_extension: false,
        is_abstract: false,
        is_override: false,
        overrides: None,
        implements: vec![],
        fixed_name: None,
        binding,
        location: SourceLocation::default(),
    }
}

fn inline(text: &str) -> Binding {
    Binding::InlineExpansion(SnippetSource::new(text, SourceLocation::new("Dom.cs", 4, 6)))
}

fn body(text: &str) -> Binding {
    Binding::BodyReplacement(SnippetSource::new(text, SourceLocation::new("Dom.cs", 9, 6)))
}

fn call(callee: u32, receiver: Option<&str>, args: &[&str]) -> CallSite {
    CallSite {
        callee: MemberId(callee),
        receiver: receiver.map(str::to_string),
        args: args.iter().map(|a| a.to_string()).collect(),
        location: SourceLocation::new("App.cs", 20, 9),
    }
}

#[test]
fn global_marker_shares_one_alias_across_members() {
    let mut unit = CompilationUnit::default();
    let dom = class(&mut unit, "Acme.Dom");
    unit.add_member(method(dom, "Log", true, &["msg"], inline("$global.console.log($msg)")));
    unit.add_member(method(dom, "Warn", true, &["msg"], body("$global.console.warn($msg)")));
    unit.add_member(method(dom, "Now", true, &[], inline("Date.now()")));
    unit.call_sites.push(call(0, None, &["'hi'"]));
    unit.call_sites.push(call(2, None, &[]));

    let cache = GlobalCache::new("__g");
    let out = BindingEngine::new(&unit).bind_unit(&cache);
    assert!(out.errors.is_empty());
    assert_snapshot!(out.expansions[0].text.as_str(), @"__g.console.log('hi')");
    assert_snapshot!(out.expansions[1].text.as_str(), @"Date.now()");
    assert_snapshot!(
        out.bodies[0].render().replace('\n', "|"),
        @"function (msg) {|  return __g.console.warn(msg);|}"
    );
    assert_eq!(cache.prologue().as_deref(), Some("var __g = globalThis;"));
}

#[test]
fn instance_inline_uses_receiver() {
    let mut unit = CompilationUnit::default();
    let list = class(&mut unit, "Acme.List");
    unit.add_member(method(list, "Add", false, &["item"], inline("$0.push($1)")));
    unit.call_sites.push(call(0, Some("items"), &["a.b"]));
    unit.call_sites.push(call(0, Some("other"), &["x ? y : z"]));

    let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
    let texts: Vec<&str> = out.expansions.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["items.push(a.b)", "other.push(x ? y : z)"]);

    // The stored rule is untouched by expansion.
    let rule = &out.rules[&MemberId(0)];
    assert_eq!(tether_snippet::print_expr(&rule.expr), "this.push(item)");
}

#[test]
fn argument_count_mismatch_is_reported_at_call_site() {
    let mut unit = CompilationUnit::default();
    let math = class(&mut unit, "Acme.Math");
    unit.add_member(method(math, "Max", true, &["a", "b"], inline("Math.max($a, $b)")));
    unit.call_sites.push(call(0, None, &["1"]));

    let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
    assert!(out.expansions.is_empty());
    assert_eq!(out.errors.len(), 1);
    assert!(matches!(out.errors[0].kind, BindErrorKind::ArgumentCountMismatch(_)));
    assert_eq!(out.errors[0].location, SourceLocation::new("App.cs", 20, 9));
    assert_snapshot!(
        out.errors[0].to_string(),
        @"argument count mismatch: expected 2 arguments, found 1"
    );
}

#[test]
fn shadowed_this_is_a_warning_not_an_error() {
    let mut unit = CompilationUnit::default();
    let t = class(&mut unit, "Acme.T");
    unit.add_member(method(t, "Odd", false, &["this"], body("$this.x")));

    let engine = BindingEngine::new(&unit);
    let bound = engine
        .bind_member(MemberId(0), &GlobalCache::default())
        .unwrap()
        .unwrap();
    assert!(matches!(bound.binding, MemberBinding::Body(_)));
    assert_eq!(bound.warnings.len(), 1);
    assert!(matches!(bound.warnings[0].warning, SnippetWarning::ShadowedThis { .. }));
    assert_eq!(bound.warnings[0].location, SourceLocation::new("Dom.cs", 9, 6));
}

#[test]
fn inline_rejection_keeps_member_unbound() {
    let mut unit = CompilationUnit::default();
    let t = class(&mut unit, "Acme.T");
    unit.add_member(method(t, "Loop", true, &["n"], inline("while ($n) {}")));
    unit.call_sites.push(call(0, None, &["3"]));

    let out = BindingEngine::new(&unit).bind_unit(&GlobalCache::default());
    assert!(out.rules.is_empty());
    assert!(out.bodies.is_empty());
    assert!(out.expansions.is_empty());
    assert_eq!(out.errors.len(), 1);
    assert!(matches!(
        &out.errors[0].kind,
        BindErrorKind::Snippet(SnippetErrorKind::UnsupportedInlineConstruct(what)) if what == "`while` loop"
    ));
}
