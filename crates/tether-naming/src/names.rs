//! Name composition rules.

use serde::Serialize;
use tether_common::decl::{CompilationUnit, MemberId};

/// Where a member's final name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NameOrigin {
    /// Generated from the declaring type and signature.
    Auto,
    /// Composed from the declaring interface's short name.
    ShortName,
    /// An explicit fixed-name annotation.
    Fixed,
}

/// Replace every character that cannot appear in a target identifier.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Deterministic long name: `Ns$Type$Member$ParamType...`.
///
/// Unique per member signature without any configuration.
pub fn auto_name(unit: &CompilationUnit, id: MemberId) -> String {
    let member = unit.member(id);
    let mut raw = unit.ty(member.declaring_type).name.replace('.', "$");
    raw.push('$');
    raw.push_str(&member.name);
    for param in &member.params {
        raw.push('$');
        raw.push_str(&param.ty);
    }
    sanitize(&raw)
}

/// `short$Member`, or the bare member name for an empty short name.
pub fn short_member_name(short: &str, member: &str) -> String {
    if short.is_empty() {
        sanitize(member)
    } else {
        sanitize(&format!("{short}${member}"))
    }
}

/// The name a member starts from before propagation.
pub fn seed_name(unit: &CompilationUnit, id: MemberId) -> (String, NameOrigin) {
    let member = unit.member(id);
    if let Some(fixed) = &member.fixed_name {
        return (fixed.clone(), NameOrigin::Fixed);
    }
    if let Some(short) = &unit.ty(member.declaring_type).short_name {
        return (short_member_name(short, &member.name), NameOrigin::ShortName);
    }
    (auto_name(unit, id), NameOrigin::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_generic_punctuation() {
        assert_eq!(sanitize("List<Int32>[]"), "List_Int32___");
        assert_eq!(sanitize("a$b_c9"), "a$b_c9");
    }

    #[test]
    fn short_names() {
        assert_eq!(short_member_name("j", "Do"), "j$Do");
        assert_eq!(short_member_name("", "Do"), "Do");
    }
}
