//! Type references and type-hierarchy queries
//!
//! `TypeRef` is the reflected shape of a declared field or parameter type.
//! It is written in Java-like syntax in program models:
//!
//! ```text
//! int                                             Primitive
//! java.lang.String                                Declared
//! java.lang.String[]                              Array
//! java.util.ArrayList<? extends android.os.Parcelable>
//! ```
//!
//! Assignability needs supertype facts, which come from a [`TypeHierarchy`].
//! [`TypeTable::jdk`] knows the JDK/Android types the value kinds talk about;
//! program models layer their own declared types on top.

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{BundleError, Result};

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const CHAR_SEQUENCE: &str = "java.lang.CharSequence";
pub const INTEGER: &str = "java.lang.Integer";
pub const SERIALIZABLE: &str = "java.io.Serializable";
pub const CLONEABLE: &str = "java.lang.Cloneable";
pub const ARRAY_LIST: &str = "java.util.ArrayList";
pub const PARCELABLE: &str = "android.os.Parcelable";
pub const SPARSE_ARRAY: &str = "android.util.SparseArray";
pub const BUNDLE: &str = "android.os.Bundle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl Primitive {
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Void => "void",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "void" => Primitive::Void,
            _ => return None,
        })
    }
}

/// A reflected type: primitive, declared (optionally parameterized), array,
/// or a wildcard inside type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Primitive(Primitive),
    Declared { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    /// `?` or `? extends Bound`
    Wildcard(Option<Box<TypeRef>>),
}

impl TypeRef {
    pub fn primitive(primitive: Primitive) -> Self {
        TypeRef::Primitive(primitive)
    }

    pub fn declared(name: impl Into<String>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            args,
        }
    }

    pub fn array_of(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    /// The container type every bundle method must return.
    pub fn bundle() -> Self {
        TypeRef::declared(BUNDLE)
    }

    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = TypeParser { input, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != input.len() {
            return Err(parser.error(format!("unexpected '{}'", &input[parser.pos..])));
        }
        if matches!(ty, TypeRef::Wildcard(_)) {
            return Err(parser.error("wildcards are only allowed inside type arguments"));
        }
        Ok(ty)
    }

    /// Qualified name of a declared type (type arguments erased).
    pub fn raw_name(&self) -> Option<&str> {
        match self {
            TypeRef::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Simple (unqualified) name as used in error messages.
    pub fn simple_name(&self) -> String {
        match self {
            TypeRef::Primitive(p) => p.keyword().to_string(),
            TypeRef::Declared { name, .. } => simple_name(name).to_string(),
            TypeRef::Array(component) => format!("{}[]", component.simple_name()),
            TypeRef::Wildcard(_) => "?".to_string(),
        }
    }
}

/// Last segment of a dotted name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Package part of a dotted name (empty for the default package).
///
/// Packages end before the first capitalized segment, so nested types keep
/// their outer type out of the package: `a.Outer.Inner` is in `a`.
pub fn package_name(qualified: &str) -> &str {
    let (package, _) = split_package(qualified);
    package
}

/// Type path inside the package, e.g. `Outer.Inner` for `a.Outer.Inner`.
pub fn class_path(qualified: &str) -> &str {
    let (_, path) = split_package(qualified);
    path
}

fn split_package(qualified: &str) -> (&str, &str) {
    let mut start = 0;
    for segment in qualified.split('.') {
        if segment.starts_with(|c: char| c.is_uppercase()) {
            return match start {
                0 => ("", qualified),
                _ => (&qualified[..start - 1], &qualified[start..]),
            };
        }
        start += segment.len() + 1;
    }
    match qualified.rsplit_once('.') {
        Some((package, name)) => (package, name),
        None => ("", qualified),
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.keyword()),
            TypeRef::Declared { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Array(component) => write!(f, "{component}[]"),
            TypeRef::Wildcard(None) => f.write_str("?"),
            TypeRef::Wildcard(Some(bound)) => write!(f, "? extends {bound}"),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = BundleError;

    fn try_from(value: String) -> Result<Self> {
        TypeRef::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeParser<'_> {
    fn error(&self, reason: impl Into<String>) -> BundleError {
        BundleError::TypeParse {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> Result<String> {
        self.skip_ws();
        let len = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.error(format!("expected a type name at offset {}", self.pos)));
        }
        let name = self.rest()[..len].to_string();
        if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return Err(self.error(format!("malformed name '{name}'")));
        }
        self.pos += len;
        Ok(name)
    }

    fn parse_type(&mut self) -> Result<TypeRef> {
        if self.eat("?") {
            let rest = self.rest().trim_start();
            if rest.starts_with("super") {
                return Err(self.error("'? super' bounds are not supported"));
            }
            if rest.starts_with("extends") {
                self.skip_ws();
                self.pos += "extends".len();
                let bound = self.parse_type()?;
                return Ok(TypeRef::Wildcard(Some(Box::new(bound))));
            }
            return Ok(TypeRef::Wildcard(None));
        }

        let name = self.name()?;
        let mut ty = match Primitive::from_keyword(&name) {
            Some(primitive) => TypeRef::Primitive(primitive),
            None => {
                let mut args = Vec::new();
                if self.eat("<") {
                    loop {
                        args.push(self.parse_type()?);
                        if self.eat(",") {
                            continue;
                        }
                        if self.eat(">") {
                            break;
                        }
                        return Err(self.error("expected ',' or '>' in type arguments"));
                    }
                }
                TypeRef::Declared { name, args }
            }
        };

        while self.eat("[]") {
            ty = TypeRef::Array(Box::new(ty));
        }
        Ok(ty)
    }
}

/// Source of supertype facts for declared types.
pub trait TypeHierarchy: Send + Sync {
    /// Direct supertypes (superclass and interfaces) of a declared type.
    /// Unknown types have none.
    fn direct_supertypes(&self, name: &str) -> &[String];
}

/// Is `from` the same as, or a transitive subtype of, `to`?
pub fn is_subtype(hierarchy: &dyn TypeHierarchy, from: &str, to: &str) -> bool {
    if from == to || to == OBJECT {
        return true;
    }

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut queue: VecDeque<&str> = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        for supertype in hierarchy.direct_supertypes(current) {
            if supertype == to {
                return true;
            }
            queue.push_back(supertype);
        }
    }
    false
}

/// Java assignment compatibility: can a value of type `from` be stored in `to`?
pub fn is_assignable(hierarchy: &dyn TypeHierarchy, from: &TypeRef, to: &TypeRef) -> bool {
    match (from, to) {
        (TypeRef::Primitive(a), TypeRef::Primitive(b)) => a == b,
        (TypeRef::Primitive(_), _) | (_, TypeRef::Primitive(_)) => false,
        (TypeRef::Wildcard(bound), _) => match bound {
            Some(bound) => is_assignable(hierarchy, bound, to),
            None => matches!(to, TypeRef::Declared { name, .. } if name == OBJECT),
        },
        (_, TypeRef::Wildcard(None)) => true,
        (_, TypeRef::Wildcard(Some(bound))) => is_assignable(hierarchy, from, bound),
        (TypeRef::Array(a), TypeRef::Array(b)) => match (a.as_ref(), b.as_ref()) {
            (TypeRef::Primitive(x), TypeRef::Primitive(y)) => x == y,
            _ => is_assignable(hierarchy, a, b),
        },
        (TypeRef::Array(_), TypeRef::Declared { name, .. }) => {
            name == OBJECT || name == CLONEABLE || name == SERIALIZABLE
        }
        (TypeRef::Declared { .. }, TypeRef::Array(_)) => false,
        (
            TypeRef::Declared {
                name: from_name,
                args: from_args,
            },
            TypeRef::Declared {
                name: to_name,
                args: to_args,
            },
        ) => {
            if !is_subtype(hierarchy, from_name, to_name) {
                return false;
            }
            // Raw types and subclass-to-superclass conversions are unchecked.
            if from_args.is_empty() || to_args.is_empty() || from_name != to_name {
                return true;
            }
            from_args.len() == to_args.len()
                && from_args
                    .iter()
                    .zip(to_args)
                    .all(|(f, t)| type_argument_fits(hierarchy, f, t))
        }
    }
}

fn type_argument_fits(hierarchy: &dyn TypeHierarchy, from: &TypeRef, to: &TypeRef) -> bool {
    match to {
        TypeRef::Wildcard(_) => is_assignable(hierarchy, from, to),
        _ => from == to,
    }
}

/// Supertype facts for JDK and Android types the value kinds refer to.
const JDK_TYPES: &[(&str, &[&str])] = &[
    ("java.lang.Object", &[]),
    ("java.lang.CharSequence", &[]),
    ("java.lang.Comparable", &[]),
    ("java.lang.Cloneable", &[]),
    ("java.io.Serializable", &[]),
    (
        "java.lang.String",
        &["java.lang.CharSequence", "java.io.Serializable", "java.lang.Comparable"],
    ),
    (
        "java.lang.StringBuilder",
        &["java.lang.CharSequence", "java.io.Serializable"],
    ),
    ("java.lang.Number", &["java.io.Serializable"]),
    ("java.lang.Boolean", &["java.io.Serializable", "java.lang.Comparable"]),
    ("java.lang.Character", &["java.io.Serializable", "java.lang.Comparable"]),
    ("java.lang.Byte", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.Short", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.Integer", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.Long", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.Float", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.lang.Double", &["java.lang.Number", "java.lang.Comparable"]),
    ("java.util.Collection", &[]),
    ("java.util.List", &["java.util.Collection"]),
    ("java.util.AbstractList", &["java.util.List"]),
    (
        "java.util.ArrayList",
        &[
            "java.util.AbstractList",
            "java.util.List",
            "java.lang.Cloneable",
            "java.io.Serializable",
        ],
    ),
    ("java.util.Map", &[]),
    ("java.util.HashMap", &["java.util.Map", "java.lang.Cloneable", "java.io.Serializable"]),
    ("java.util.Date", &["java.lang.Cloneable", "java.io.Serializable"]),
    ("android.os.Parcelable", &[]),
    ("android.os.BaseBundle", &[]),
    (
        "android.os.Bundle",
        &["android.os.BaseBundle", "android.os.Parcelable", "java.lang.Cloneable"],
    ),
    ("android.util.SparseArray", &["java.lang.Cloneable"]),
    ("android.net.Uri", &["android.os.Parcelable", "java.lang.Comparable"]),
    ("android.content.Intent", &["android.os.Parcelable", "java.lang.Cloneable"]),
    ("android.graphics.Rect", &["android.os.Parcelable"]),
    ("android.graphics.Point", &["android.os.Parcelable"]),
];

/// In-memory [`TypeHierarchy`].
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    supertypes: FxHashMap<String, Vec<String>>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with the JDK/Android facts.
    pub fn jdk() -> Self {
        let mut table = Self::new();
        for (name, supertypes) in JDK_TYPES {
            table.declare(*name, supertypes.iter().copied());
        }
        table
    }

    /// Record (or replace) the direct supertypes of `name`.
    pub fn declare<I, S>(&mut self, name: impl Into<String>, supertypes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertypes
            .insert(name.into(), supertypes.into_iter().map(Into::into).collect());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.supertypes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.supertypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supertypes.is_empty()
    }
}

impl TypeHierarchy for TypeTable {
    fn direct_supertypes(&self, name: &str) -> &[String] {
        self.supertypes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_primitive_and_declared() {
        assert_eq!(TypeRef::parse("int").unwrap(), TypeRef::primitive(Primitive::Int));
        assert_eq!(
            TypeRef::parse(" java.lang.String ").unwrap(),
            TypeRef::declared(STRING)
        );
    }

    #[test]
    fn parse_arrays_and_generics() {
        let ty = TypeRef::parse("java.util.ArrayList<? extends android.os.Parcelable>[]").unwrap();
        let expected = TypeRef::array_of(TypeRef::generic(
            ARRAY_LIST,
            vec![TypeRef::Wildcard(Some(Box::new(TypeRef::declared(PARCELABLE))))],
        ));
        assert_eq!(ty, expected);
        assert_eq!(
            ty.to_string(),
            "java.util.ArrayList<? extends android.os.Parcelable>[]"
        );
    }

    #[test]
    fn parse_nested_generics() {
        let ty = TypeRef::parse("java.util.Map<java.lang.String, java.util.List<int[]>>").unwrap();
        assert_eq!(ty.to_string(), "java.util.Map<java.lang.String, java.util.List<int[]>>");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(TypeRef::parse("").is_err());
        assert!(TypeRef::parse("java..String").is_err());
        assert!(TypeRef::parse("java.util.List<").is_err());
        assert!(TypeRef::parse("?").is_err());
        assert!(TypeRef::parse("java.util.List<? super java.lang.String>").is_err());
        assert!(TypeRef::parse("int x").is_err());
    }

    #[test]
    fn simple_and_package_names() {
        assert_eq!(simple_name("com.example.Login"), "Login");
        assert_eq!(simple_name("Login"), "Login");
        assert_eq!(package_name("com.example.Login"), "com.example");
        assert_eq!(package_name("Login"), "");
        assert_eq!(package_name("a.Outer.Inner"), "a");
        assert_eq!(class_path("a.Outer.Inner"), "Outer.Inner");
        assert_eq!(class_path("com.example.Login"), "Login");
        assert_eq!(package_name("lower.case.name"), "lower.case");
        assert_eq!(TypeRef::parse("java.lang.String[]").unwrap().simple_name(), "String[]");
    }

    #[test]
    fn subtype_walks_transitively() {
        let mut table = TypeTable::jdk();
        table.declare("com.example.Base", ["java.io.Serializable"]);
        table.declare("com.example.Child", ["com.example.Base"]);
        assert!(is_subtype(&table, "com.example.Child", SERIALIZABLE));
        assert!(is_subtype(&table, "com.example.Child", OBJECT));
        assert!(!is_subtype(&table, "com.example.Child", PARCELABLE));
    }

    #[test]
    fn subtype_survives_cycles() {
        let mut table = TypeTable::new();
        table.declare("a.A", ["a.B"]);
        table.declare("a.B", ["a.A"]);
        assert!(!is_subtype(&table, "a.A", "a.C"));
    }

    #[test]
    fn assignability_rules() {
        let table = TypeTable::jdk();
        let string = TypeRef::declared(STRING);
        let char_seq = TypeRef::declared(CHAR_SEQUENCE);
        assert!(is_assignable(&table, &string, &char_seq));
        assert!(!is_assignable(&table, &char_seq, &string));

        let int = TypeRef::primitive(Primitive::Int);
        assert!(is_assignable(&table, &int, &int));
        assert!(!is_assignable(&table, &TypeRef::declared(INTEGER), &int));

        let strings = TypeRef::array_of(string.clone());
        assert!(is_assignable(&table, &strings, &TypeRef::array_of(char_seq.clone())));
        assert!(is_assignable(&table, &strings, &TypeRef::declared(SERIALIZABLE)));

        let list_of_string = TypeRef::generic(ARRAY_LIST, vec![string.clone()]);
        let list_of_char_seq = TypeRef::generic(ARRAY_LIST, vec![char_seq.clone()]);
        let list_of_sub_char_seq = TypeRef::generic(
            ARRAY_LIST,
            vec![TypeRef::Wildcard(Some(Box::new(char_seq)))],
        );
        assert!(!is_assignable(&table, &list_of_string, &list_of_char_seq));
        assert!(is_assignable(&table, &list_of_string, &list_of_sub_char_seq));
        assert!(is_assignable(&table, &TypeRef::declared(ARRAY_LIST), &list_of_char_seq));
    }

    #[test]
    fn serde_roundtrips_through_strings() {
        let ty: TypeRef = serde_yaml::from_str("\"java.util.ArrayList<java.lang.Integer>\"").unwrap();
        assert_eq!(ty, TypeRef::generic(ARRAY_LIST, vec![TypeRef::declared(INTEGER)]));
        assert!(serde_yaml::from_str::<TypeRef>("\"int<\"").is_err());
    }
}
