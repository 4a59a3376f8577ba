//! Snippet pipeline integration tests.
//!
//! Each test runs a snippet through parse, resolve and global rewriting and
//! snapshots the printed target-language text.

use insta::assert_snapshot;
use tether_common::decl::{BindingMode, Param};
use tether_snippet::{
    parse_snippet, print_fragment, resolve, rewrite_globals, BindingSite, GlobalCache,
    SnippetErrorKind,
};

fn params(names: &[&str]) -> Vec<Param> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| Param::new(*n, "Object", i as u32))
        .collect()
}

fn translate(src: &str, mode: BindingMode, has_receiver: bool, names: &[&str]) -> String {
    let ps = params(names);
    let site = BindingSite {
        has_receiver,
        is_extension: false,
        params: &ps,
    };
    let fragment = parse_snippet(src, mode).unwrap();
    let resolved = resolve(fragment, &site).unwrap();
    let (fragment, _) = rewrite_globals(resolved.fragment, &GlobalCache::default());
    print_fragment(&fragment).replace('\n', "|")
}

// ── Inline expansion ───────────────────────────────────────────────────

#[test]
fn inline_static_method() {
    assert_snapshot!(
        translate("$0 + $1", BindingMode::InlineExpansion, false, &["x", "y"]),
        @"x + y"
    );
}

#[test]
fn inline_instance_method_by_name_and_index() {
    assert_snapshot!(
        translate("$0.push($item, $1)", BindingMode::InlineExpansion, true, &["item"]),
        @"this.push(item, item)"
    );
}

#[test]
fn inline_global_marker() {
    assert_snapshot!(
        translate("$global.console.log($msg)", BindingMode::InlineExpansion, false, &["msg"]),
        @"$global.console.log(msg)"
    );
}

#[test]
fn inline_conditional_and_optional_chain() {
    assert_snapshot!(
        translate("$o?.name ?? ($fallback ? 'a' : \"b\")", BindingMode::InlineExpansion, false, &["o", "fallback"]),
        @r#"o?.name ?? (fallback ? 'a' : "b")"#
    );
}

// ── Body replacement ───────────────────────────────────────────────────

#[test]
fn body_gets_implicit_return() {
    assert_snapshot!(
        translate("var s = $a * 2\ns + 1", BindingMode::BodyReplacement, false, &["a"]),
        @"var s = a * 2;|return s + 1;"
    );
}

#[test]
fn body_may_mutate() {
    assert_snapshot!(
        translate("$this.count += $n; $this.count", BindingMode::BodyReplacement, true, &["n"]),
        @"this.count += n;|return this.count;"
    );
}

#[test]
fn body_with_loop_and_comments() {
    assert_snapshot!(
        translate(
            "let t = 0 // running total\nfor (let i = 0; i < $xs.length; i++) { t += $xs[i] }\nt",
            BindingMode::BodyReplacement,
            false,
            &["xs"],
        ),
        @"let t = 0;|for (let i = 0; i < xs.length; i++) {|  t += xs[i];|}|return t;"
    );
}

// ── Failures ───────────────────────────────────────────────────────────

#[test]
fn inline_never_degrades_to_body() {
    let err = parse_snippet("var x = $0; x", BindingMode::InlineExpansion).unwrap_err();
    assert!(matches!(err.kind, SnippetErrorKind::UnsupportedInlineConstruct(_)));
    assert_snapshot!(err.to_string(), @"`var` declaration is not allowed in an inline snippet");
}

#[test]
fn syntax_error_points_into_snippet() {
    let err = parse_snippet("f($a,, $b)", BindingMode::InlineExpansion).unwrap_err();
    assert!(err.kind.is_syntax());
    assert_eq!((err.span.start, err.span.end), (5, 6));
    assert_snapshot!(err.to_string(), @"expected expression, found `,`");
}

#[test]
fn unterminated_string_is_lexical() {
    let err = parse_snippet("'abc", BindingMode::BodyReplacement).unwrap_err();
    assert!(matches!(err.kind, SnippetErrorKind::Lex(_)));
}

#[test]
fn deep_nesting_is_a_syntax_error() {
    let deep = format!("{}1{}", "[".repeat(200), "]".repeat(200));
    let err = parse_snippet(&deep, BindingMode::InlineExpansion).unwrap_err();
    assert!(err.kind.is_syntax());
    assert_snapshot!(err.to_string(), @"snippet nested too deeply");

    let negations = format!("{}$a", "!".repeat(1000));
    let err = parse_snippet(&negations, BindingMode::BodyReplacement).unwrap_err();
    assert!(err.kind.is_syntax());

    let blocks = format!("{}x{}", "{ ".repeat(500), " }".repeat(500));
    assert!(parse_snippet(&blocks, BindingMode::BodyReplacement).unwrap_err().kind.is_syntax());

    let shallow = format!("{}1{}", "[".repeat(20), "]".repeat(20));
    assert!(parse_snippet(&shallow, BindingMode::InlineExpansion).is_ok());
}

#[test]
fn parsing_is_deterministic() {
    let src = "$a.map(x => x + $b).filter(Boolean)";
    let first = parse_snippet(src, BindingMode::InlineExpansion).unwrap();
    let second = parse_snippet(src, BindingMode::InlineExpansion).unwrap();
    assert_eq!(first, second);
}
