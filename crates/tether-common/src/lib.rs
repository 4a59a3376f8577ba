pub mod decl;
pub mod error;
pub mod span;
pub mod token;
