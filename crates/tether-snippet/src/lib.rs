//! Embedded target-language snippets.
//!
//! A snippet is parsed into a [`Fragment`] ([`parser`]), checked against the
//! inline capability table when it will be expanded at call sites
//! ([`subset`]), has its `$` placeholders bound to host parameters
//! ([`resolve`]), has its `$global` markers rewritten to the cached alias
//! ([`global`]), and is finally printed back to source ([`printer`]).

pub mod ast;
pub mod error;
pub mod global;
pub mod parser;
pub mod printer;
pub mod resolve;
pub mod subset;

pub use ast::{Expr, ExprKind, Fragment, FragmentBody, Hole, ParamRef};
pub use error::{SnippetError, SnippetErrorKind, SnippetWarning};
pub use global::{rewrite_globals, GlobalCache, DEFAULT_GLOBAL_ALIAS};
pub use parser::{parse_expression, parse_snippet};
pub use printer::{print_expr, print_fragment, print_function};
pub use resolve::{resolve, BindingSite, Resolved};
