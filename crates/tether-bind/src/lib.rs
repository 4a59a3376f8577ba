//! Binding strategy engine.
//!
//! Attaches parsed snippets to host members either as a replacement body
//! ([`BodyReplacement`]) or as a call-site [`ExpansionRule`].

pub mod body;
pub mod engine;
pub mod error;
pub mod expand;
pub mod guard;

pub use body::BodyReplacement;
pub use engine::{BindOutput, BindingEngine, BoundMember, Expansion, MemberBinding};
pub use error::{ArgumentCountMismatch, BindError, BindErrorKind, BindWarning};
pub use expand::ExpansionRule;
pub use guard::{ClientSideOnlyInvocation, HostStub, CLIENT_SIDE_ONLY_MESSAGE};
