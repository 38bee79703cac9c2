//! Annotation catalog
//!
//! The closed set of binding annotations. Each [`ValueKind`] names one
//! annotation (`@IntValue`, `@StringArrayListValue`, ...), the container
//! accessor pair it maps to (`getInt` / `putInt`) and the declared types it
//! accepts. `@Required` is the only non-binding marker the engines look at.

use serde::{Deserialize, Serialize};

use crate::model::AnnotationUse;
use crate::types::{
    self, is_assignable, Primitive, TypeHierarchy, TypeRef, ARRAY_LIST, CHAR_SEQUENCE, INTEGER,
    PARCELABLE, SERIALIZABLE, SPARSE_ARRAY, STRING,
};

/// Marker annotation turning a missing value into a failure.
pub const REQUIRED: &str = "Required";

/// Which declared types a value kind can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRule {
    /// Exactly this primitive (boxed types do not match).
    Primitive(Primitive),
    /// Exactly an array of this primitive.
    PrimitiveArray(Primitive),
    /// Any type assignable to this declared type.
    Assignable(&'static str),
    /// Any array whose component is assignable to this declared type.
    ArrayOf(&'static str),
    /// `raw` (or a subclass); type arguments, when present, must fit `element`.
    Collection {
        raw: &'static str,
        element: &'static str,
    },
}

impl TypeRule {
    pub fn accepts(self, hierarchy: &dyn TypeHierarchy, ty: &TypeRef) -> bool {
        match self {
            TypeRule::Primitive(p) => *ty == TypeRef::Primitive(p),
            TypeRule::PrimitiveArray(p) => {
                matches!(ty, TypeRef::Array(component) if **component == TypeRef::Primitive(p))
            }
            TypeRule::Assignable(name) => is_assignable(hierarchy, ty, &TypeRef::declared(name)),
            TypeRule::ArrayOf(name) => match ty {
                TypeRef::Array(component) => {
                    is_assignable(hierarchy, component, &TypeRef::declared(name))
                }
                _ => false,
            },
            TypeRule::Collection { raw, element } => match ty {
                TypeRef::Declared { name, args } => {
                    types::is_subtype(hierarchy, name, raw)
                        && args
                            .iter()
                            .all(|arg| is_assignable(hierarchy, arg, &TypeRef::declared(element)))
                }
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for TypeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRule::Primitive(p) => f.write_str(p.keyword()),
            TypeRule::PrimitiveArray(p) => write!(f, "{}[]", p.keyword()),
            TypeRule::Assignable(name) => f.write_str(name),
            TypeRule::ArrayOf(name) => write!(f, "{name}[]"),
            TypeRule::Collection { raw, element } => write!(f, "{raw}<? extends {element}>"),
        }
    }
}

/// The semantic kind of a binding: what it stores and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueKind {
    Boolean,
    BooleanArray,
    Byte,
    ByteArray,
    Char,
    CharArray,
    CharSequence,
    CharSequenceArray,
    CharSequenceArrayList,
    Double,
    DoubleArray,
    Float,
    FloatArray,
    Int,
    IntArray,
    IntegerArrayList,
    Long,
    LongArray,
    Parcelable,
    ParcelableArray,
    ParcelableArrayList,
    Serializable,
    Short,
    ShortArray,
    SparseParcelableArray,
    String,
    StringArray,
    StringArrayList,
}

struct KindInfo {
    annotation: &'static str,
    accessor: &'static str,
    rule: TypeRule,
}

impl ValueKind {
    /// Catalog order: the order annotations are scanned in, alphabetical by
    /// annotation name ignoring case. It decides which of two clashing bindings is the
    /// duplicate and the field order of each specification.
    pub const ALL: [ValueKind; 28] = [
        ValueKind::BooleanArray,
        ValueKind::Boolean,
        ValueKind::ByteArray,
        ValueKind::Byte,
        ValueKind::CharArray,
        ValueKind::CharSequenceArrayList,
        ValueKind::CharSequenceArray,
        ValueKind::CharSequence,
        ValueKind::Char,
        ValueKind::DoubleArray,
        ValueKind::Double,
        ValueKind::FloatArray,
        ValueKind::Float,
        ValueKind::IntArray,
        ValueKind::IntegerArrayList,
        ValueKind::Int,
        ValueKind::LongArray,
        ValueKind::Long,
        ValueKind::ParcelableArrayList,
        ValueKind::ParcelableArray,
        ValueKind::Parcelable,
        ValueKind::Serializable,
        ValueKind::ShortArray,
        ValueKind::Short,
        ValueKind::SparseParcelableArray,
        ValueKind::StringArrayList,
        ValueKind::StringArray,
        ValueKind::String,
    ];

    fn info(self) -> KindInfo {
        use Primitive as P;
        use TypeRule as R;

        let (annotation, accessor, rule) = match self {
            ValueKind::Boolean => ("BooleanValue", "Boolean", R::Primitive(P::Boolean)),
            ValueKind::BooleanArray => {
                ("BooleanArrayValue", "BooleanArray", R::PrimitiveArray(P::Boolean))
            }
            ValueKind::Byte => ("ByteValue", "Byte", R::Primitive(P::Byte)),
            ValueKind::ByteArray => ("ByteArrayValue", "ByteArray", R::PrimitiveArray(P::Byte)),
            ValueKind::Char => ("CharValue", "Char", R::Primitive(P::Char)),
            ValueKind::CharArray => ("CharArrayValue", "CharArray", R::PrimitiveArray(P::Char)),
            ValueKind::CharSequence => {
                ("CharSequenceValue", "CharSequence", R::Assignable(CHAR_SEQUENCE))
            }
            ValueKind::CharSequenceArray => (
                "CharSequenceArrayValue",
                "CharSequenceArray",
                R::ArrayOf(CHAR_SEQUENCE),
            ),
            ValueKind::CharSequenceArrayList => (
                "CharSequenceArrayListValue",
                "CharSequenceArrayList",
                R::Collection {
                    raw: ARRAY_LIST,
                    element: CHAR_SEQUENCE,
                },
            ),
            ValueKind::Double => ("DoubleValue", "Double", R::Primitive(P::Double)),
            ValueKind::DoubleArray => {
                ("DoubleArrayValue", "DoubleArray", R::PrimitiveArray(P::Double))
            }
            ValueKind::Float => ("FloatValue", "Float", R::Primitive(P::Float)),
            ValueKind::FloatArray => ("FloatArrayValue", "FloatArray", R::PrimitiveArray(P::Float)),
            ValueKind::Int => ("IntValue", "Int", R::Primitive(P::Int)),
            ValueKind::IntArray => ("IntArrayValue", "IntArray", R::PrimitiveArray(P::Int)),
            ValueKind::IntegerArrayList => (
                "IntegerArrayListValue",
                "IntegerArrayList",
                R::Collection {
                    raw: ARRAY_LIST,
                    element: INTEGER,
                },
            ),
            ValueKind::Long => ("LongValue", "Long", R::Primitive(P::Long)),
            ValueKind::LongArray => ("LongArrayValue", "LongArray", R::PrimitiveArray(P::Long)),
            ValueKind::Parcelable => ("ParcelableValue", "Parcelable", R::Assignable(PARCELABLE)),
            ValueKind::ParcelableArray => {
                ("ParcelableArrayValue", "ParcelableArray", R::ArrayOf(PARCELABLE))
            }
            ValueKind::ParcelableArrayList => (
                "ParcelableArrayListValue",
                "ParcelableArrayList",
                R::Collection {
                    raw: ARRAY_LIST,
                    element: PARCELABLE,
                },
            ),
            ValueKind::Serializable => {
                ("SerializableValue", "Serializable", R::Assignable(SERIALIZABLE))
            }
            ValueKind::Short => ("ShortValue", "Short", R::Primitive(P::Short)),
            ValueKind::ShortArray => ("ShortArrayValue", "ShortArray", R::PrimitiveArray(P::Short)),
            ValueKind::SparseParcelableArray => (
                "SparseParcelableArrayValue",
                "SparseParcelableArray",
                R::Collection {
                    raw: SPARSE_ARRAY,
                    element: PARCELABLE,
                },
            ),
            ValueKind::String => ("StringValue", "String", R::Assignable(STRING)),
            ValueKind::StringArray => ("StringArrayValue", "StringArray", R::ArrayOf(STRING)),
            ValueKind::StringArrayList => (
                "StringArrayListValue",
                "StringArrayList",
                R::Collection {
                    raw: ARRAY_LIST,
                    element: STRING,
                },
            ),
        };
        KindInfo {
            annotation,
            accessor,
            rule,
        }
    }

    /// Simple name of the annotation declaring this kind, e.g. `IntValue`.
    pub fn annotation_name(self) -> &'static str {
        self.info().annotation
    }

    /// Container getter, e.g. `getInt`.
    pub fn getter(self) -> String {
        format!("get{}", self.info().accessor)
    }

    /// Container setter, e.g. `putInt`.
    pub fn setter(self) -> String {
        format!("put{}", self.info().accessor)
    }

    pub fn type_rule(self) -> TypeRule {
        self.info().rule
    }

    /// Does a declared field/parameter type fit this kind?
    pub fn accepts_type(self, hierarchy: &dyn TypeHierarchy, ty: &TypeRef) -> bool {
        self.type_rule().accepts(hierarchy, ty)
    }

    /// Look a kind up by annotation name; qualified names are matched on
    /// their simple name.
    pub fn from_annotation(name: &str) -> Option<Self> {
        let simple = types::simple_name(name);
        Self::ALL
            .into_iter()
            .find(|kind| kind.annotation_name() == simple)
    }

    /// Kinds whose container getter returns a supertype of the declared type
    /// and therefore needs a cast in generated code.
    pub fn needs_cast(self) -> bool {
        matches!(
            self,
            ValueKind::CharSequence
                | ValueKind::CharSequenceArray
                | ValueKind::Parcelable
                | ValueKind::ParcelableArray
                | ValueKind::ParcelableArrayList
                | ValueKind::Serializable
                | ValueKind::SparseParcelableArray
        )
    }
}

/// A binding annotation found on an element, resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingAnnotation<'a> {
    pub kind: ValueKind,
    /// Container key; `None` when the annotation carries no value.
    pub key: Option<&'a str>,
    pub desc: &'a str,
}

/// Every catalog annotation present in `annotations`, in declaration order.
pub fn binding_annotations(annotations: &[AnnotationUse]) -> Vec<BindingAnnotation<'_>> {
    annotations
        .iter()
        .filter_map(|annotation| {
            ValueKind::from_annotation(&annotation.name).map(|kind| BindingAnnotation {
                kind,
                key: annotation.value.as_deref(),
                desc: annotation.desc.as_deref().unwrap_or(""),
            })
        })
        .collect()
}

/// Is `@Required` among `annotations`?
pub fn is_required(annotations: &[AnnotationUse]) -> bool {
    annotations
        .iter()
        .any(|annotation| types::simple_name(&annotation.name) == REQUIRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeTable;

    fn ty(s: &str) -> TypeRef {
        TypeRef::parse(s).unwrap()
    }

    #[test]
    fn annotation_names_are_unique_and_resolvable() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::from_annotation(kind.annotation_name()), Some(kind));
        }
        assert_eq!(
            ValueKind::from_annotation("autobundle.annotation.IntValue"),
            Some(ValueKind::Int)
        );
        assert_eq!(ValueKind::from_annotation("Nullable"), None);
        assert_eq!(ValueKind::from_annotation(REQUIRED), None);
    }

    #[test]
    fn catalog_is_alphabetical_by_annotation() {
        let names: Vec<String> = ValueKind::ALL
            .iter()
            .map(|kind| kind.annotation_name().to_lowercase())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(ValueKind::ALL[0], ValueKind::BooleanArray);
        assert_eq!(ValueKind::ALL[27], ValueKind::String);
    }

    #[test]
    fn accessors_follow_bundle_naming() {
        assert_eq!(ValueKind::Int.setter(), "putInt");
        assert_eq!(ValueKind::IntegerArrayList.getter(), "getIntegerArrayList");
        assert_eq!(ValueKind::SparseParcelableArray.setter(), "putSparseParcelableArray");
    }

    #[test]
    fn primitive_kinds_match_exactly() {
        let table = TypeTable::jdk();
        assert!(ValueKind::Int.accepts_type(&table, &ty("int")));
        assert!(!ValueKind::Int.accepts_type(&table, &ty("java.lang.Integer")));
        assert!(!ValueKind::Int.accepts_type(&table, &ty("long")));
        assert!(ValueKind::IntArray.accepts_type(&table, &ty("int[]")));
        assert!(!ValueKind::IntArray.accepts_type(&table, &ty("int[][]")));
    }

    #[test]
    fn object_kinds_use_assignability() {
        let mut table = TypeTable::jdk();
        table.declare("com.example.User", ["android.os.Parcelable"]);
        assert!(ValueKind::CharSequence.accepts_type(&table, &ty("java.lang.String")));
        assert!(!ValueKind::String.accepts_type(&table, &ty("java.lang.CharSequence")));
        assert!(!ValueKind::String.accepts_type(&table, &ty("boolean")));
        assert!(ValueKind::Parcelable.accepts_type(&table, &ty("com.example.User")));
        assert!(ValueKind::ParcelableArray.accepts_type(&table, &ty("com.example.User[]")));
        assert!(ValueKind::Serializable.accepts_type(&table, &ty("java.util.ArrayList")));
    }

    #[test]
    fn collection_kinds_check_elements() {
        let table = TypeTable::jdk();
        let kind = ValueKind::StringArrayList;
        assert!(kind.accepts_type(&table, &ty("java.util.ArrayList<java.lang.String>")));
        assert!(kind.accepts_type(&table, &ty("java.util.ArrayList")));
        assert!(!kind.accepts_type(&table, &ty("java.util.ArrayList<java.lang.Integer>")));
        assert!(!kind.accepts_type(&table, &ty("java.util.List<java.lang.String>")));
        assert!(ValueKind::ParcelableArrayList.accepts_type(
            &table,
            &ty("java.util.ArrayList<? extends android.os.Parcelable>")
        ));
        assert!(ValueKind::SparseParcelableArray
            .accepts_type(&table, &ty("android.util.SparseArray<android.net.Uri>")));
    }

    #[test]
    fn binding_annotations_skip_foreign_markers() {
        let annotations = vec![
            AnnotationUse::marker("Nullable"),
            AnnotationUse::keyed("IntValue", "count").with_desc("item count"),
            AnnotationUse::marker(REQUIRED),
        ];
        let found = binding_annotations(&annotations);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ValueKind::Int);
        assert_eq!(found[0].key, Some("count"));
        assert_eq!(found[0].desc, "item count");
        assert!(is_required(&annotations));
        assert!(!is_required(&annotations[..2]));
    }
}
