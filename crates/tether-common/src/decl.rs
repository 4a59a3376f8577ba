//! Declaration model handed to Tether by the surrounding compiler.
//!
//! A [`CompilationUnit`] is a fully loaded view of the host-language type
//! graph: types, their members, the override/implements links between
//! members, the binding metadata attached to each member, and the call sites
//! the host compiler found. Types and members live in flat arenas and refer to
//! each other through [`TypeId`] and [`MemberId`] indices.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Index of a type within [`CompilationUnit::types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

/// Index of a member within [`CompilationUnit::members`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u32);

/// Location of a declaration or attribute in the host source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    AbstractClass,
    Interface,
}

/// A class, abstract class or interface of the host program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Fully qualified, dot-separated name, e.g. `Acme.Shapes.IShape`.
    pub name: String,
    pub kind: TypeKind,
    /// Direct base class and implemented/extended interfaces.
    #[serde(default)]
    pub bases: Vec<TypeId>,
    /// Short-name annotation for interfaces. `Some("")` means "use member
    /// names verbatim".
    #[serde(default)]
    pub short_name: Option<String>,
    /// Member naming for this type is not tracked on the translated surface.
    #[serde(default)]
    pub host_only: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

impl TypeDecl {
    /// Whether instances of this type can exist at runtime.
    pub fn is_concrete(&self) -> bool {
        self.kind == TypeKind::Class
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MemberKind {
    #[default]
    Method,
    Property,
}

/// One formal parameter of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Declared host type, spelled as the host compiler prints it.
    pub ty: String,
    /// 0-based position among the declared parameters.
    pub position: u32,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            position,
        }
    }
}

/// How the two snippet binding strategies differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingMode {
    /// The snippet becomes the whole translated body of the member.
    BodyReplacement,
    /// The snippet is substituted at every call site of the member.
    InlineExpansion,
}

impl fmt::Display for BindingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingMode::BodyReplacement => write!(f, "body replacement"),
            BindingMode::InlineExpansion => write!(f, "inline expansion"),
        }
    }
}

/// Raw snippet text as captured from the host attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetSource {
    pub text: String,
    /// Location of the attribute that carries the snippet.
    #[serde(default)]
    pub location: SourceLocation,
}

impl SnippetSource {
    pub fn new(text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }
}

/// Binding metadata attached to a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum Binding {
    /// Ordinary translation applies.
    #[default]
    None,
    BodyReplacement(SnippetSource),
    InlineExpansion(SnippetSource),
}

impl Binding {
    /// The snippet and its mode, if this member carries one.
    pub fn snippet(&self) -> Option<(BindingMode, &SnippetSource)> {
        match self {
            Binding::None => None,
            Binding::BodyReplacement(src) => Some((BindingMode::BodyReplacement, src)),
            Binding::InlineExpansion(src) => Some((BindingMode::InlineExpansion, src)),
        }
    }
}

/// A method or property declared on a type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDecl {
    pub declaring_type: TypeId,
    pub name: String,
    #[serde(default)]
    pub kind: MemberKind,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub is_static: bool,
    /// Static method whose first parameter is the extended receiver.
    #[serde(default)]
    pub is_extension: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_override: bool,
    /// The base-class member this member overrides.
    #[serde(default)]
    pub overrides: Option<MemberId>,
    /// Interface members this member implements.
    #[serde(default)]
    pub implements: Vec<MemberId>,
    /// Explicit translated name annotation.
    #[serde(default)]
    pub fixed_name: Option<String>,
    #[serde(default)]
    pub binding: Binding,
    #[serde(default)]
    pub location: SourceLocation,
}

impl MemberDecl {
    /// Instance members receive the receiver as an implicit leading argument.
    pub fn has_receiver(&self) -> bool {
        !self.is_static
    }

    /// All direct ancestor members, override target first.
    pub fn ancestors(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.overrides.iter().copied().chain(self.implements.iter().copied())
    }
}

/// A call to a member found by the surrounding compiler.
///
/// Receiver and arguments are already-translated target-language expressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSite {
    pub callee: MemberId,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub location: SourceLocation,
}

/// Everything Tether needs to know about one compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default)]
    pub call_sites: Vec<CallSite>,
}

impl CompilationUnit {
    /// Add a type and return its assigned [`TypeId`].
    pub fn add_type(&mut self, decl: TypeDecl) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(decl);
        id
    }

    /// Add a member and return its assigned [`MemberId`].
    pub fn add_member(&mut self, decl: MemberDecl) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        self.members.push(decl);
        id
    }

    pub fn ty(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.0 as usize]
    }

    pub fn member(&self, id: MemberId) -> &MemberDecl {
        &self.members[id.0 as usize]
    }

    /// Iterate members together with their ids.
    pub fn member_ids(&self) -> impl Iterator<Item = (MemberId, &MemberDecl)> {
        self.members
            .iter()
            .enumerate()
            .map(|(i, m)| (MemberId(i as u32), m))
    }

    /// Look up a type by its fully qualified name.
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .position(|t| t.name == name)
            .map(|i| TypeId(i as u32))
    }

    /// Members grouped by declaring type, each list in declaration order.
    pub fn members_by_type(&self) -> FxHashMap<TypeId, Vec<MemberId>> {
        let mut map: FxHashMap<TypeId, Vec<MemberId>> = FxHashMap::default();
        for (id, member) in self.member_ids() {
            map.entry(member.declaring_type).or_default().push(id);
        }
        map
    }

    /// Human-readable signature, e.g. `Acme.Shapes.IShape.Scale(Number, Number)`.
    pub fn member_signature(&self, id: MemberId) -> String {
        let member = self.member(id);
        let owner = &self.ty(member.declaring_type).name;
        match member.kind {
            MemberKind::Property => format!("{}.{}", owner, member.name),
            MemberKind::Method => {
                let params: Vec<&str> = member.params.iter().map(|p| p.ty.as_str()).collect();
                format!("{}.{}({})", owner, member.name, params.join(", "))
            }
        }
    }

    /// All types reachable through `bases`, excluding `id` itself, in
    /// breadth-first order without duplicates.
    pub fn supertypes(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = vec![false; self.types.len()];
        seen[id.0 as usize] = true;
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::from(self.ty(id).bases.clone());
        while let Some(next) = queue.pop_front() {
            if std::mem::replace(&mut seen[next.0 as usize], true) {
                continue;
            }
            order.push(next);
            queue.extend(self.ty(next).bases.iter().copied());
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(name: &str, kind: TypeKind, bases: Vec<TypeId>) -> TypeDecl {
        TypeDecl {
            name: name.to_string(),
            kind,
            bases,
            short_name: None,
            host_only: false,
            location: SourceLocation::default(),
        }
    }

    #[test]
    fn supertypes_are_transitive_and_deduplicated() {
        let mut unit = CompilationUnit::default();
        let root = unit.add_type(ty("IRoot", TypeKind::Interface, vec![]));
        let left = unit.add_type(ty("ILeft", TypeKind::Interface, vec![root]));
        let right = unit.add_type(ty("IRight", TypeKind::Interface, vec![root]));
        let class = unit.add_type(ty("C", TypeKind::Class, vec![left, right]));
        assert_eq!(unit.supertypes(class), vec![left, right, root]);
        assert!(unit.supertypes(root).is_empty());
    }

    #[test]
    fn member_signature_formats_params() {
        let mut unit = CompilationUnit::default();
        let t = unit.add_type(ty("Acme.Calc", TypeKind::Class, vec![]));
        let json = r#"{
            "declaring_type": 0,
            "name": "Add",
            "params": [
                { "name": "x", "ty": "Int32", "position": 0 },
                { "name": "y", "ty": "Int32", "position": 1 }
            ],
            "is_static": true,
            "binding": { "mode": "InlineExpansion", "text": "$x + $y" }
        }"#;
        let member: MemberDecl = serde_json::from_str(json).unwrap();
        assert_eq!(member.declaring_type, t);
        let id = unit.add_member(member);
        assert_eq!(unit.member_signature(id), "Acme.Calc.Add(Int32, Int32)");
        let (mode, src) = unit.member(id).binding.snippet().unwrap();
        assert_eq!(mode, BindingMode::InlineExpansion);
        assert_eq!(src.text, "$x + $y");
        assert!(!unit.member(id).has_receiver());
    }

    #[test]
    fn binding_defaults_to_none() {
        let json = r#"{ "declaring_type": 0, "name": "M" }"#;
        let member: MemberDecl = serde_json::from_str(json).unwrap();
        assert_eq!(member.binding, Binding::None);
        assert!(member.binding.snippet().is_none());
        assert!(member.has_receiver());
    }
}
