//! Canonical, host-language-neutral representation of a GraphQL type
//! position: [`TypeSpec`]. Produced once by the annotation analyzer at
//! class-decoration time and shared by value for the remainder of the
//! process.

use std::fmt;

use indexmap::IndexSet;

/// The five GraphQL built-in scalar names. Fixed per spec.md §3.
pub const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

/// A canonical type position.
///
/// The `nullable` flag on every variant is the *outer* nullability of that
/// position: `List { element: Named { name: "T", nullable: false }, nullable:
/// true }` is `[T!]`, a nullable outer list of non-null items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// A named scalar, object, input, interface, enum, or union type.
    Named { name: String, nullable: bool },
    /// A list of `element`.
    List {
        element: Box<TypeSpec>,
        nullable: bool,
    },
    /// An inline union of `members`, discovered from a host-level union
    /// annotation rather than a declared GraphQL type.
    Union {
        name: String,
        members: IndexSet<String>,
        description: Option<String>,
        nullable: bool,
    },
}

impl TypeSpec {
    /// The outer nullability of this position.
    pub fn nullable(&self) -> bool {
        match self {
            TypeSpec::Named { nullable, .. } => *nullable,
            TypeSpec::List { nullable, .. } => *nullable,
            TypeSpec::Union { nullable, .. } => *nullable,
        }
    }

    /// Returns a copy of this `TypeSpec` with the given outer nullability.
    pub fn with_nullable(&self, nullable: bool) -> TypeSpec {
        match self {
            TypeSpec::Named { name, .. } => TypeSpec::Named {
                name: name.clone(),
                nullable,
            },
            TypeSpec::List { element, .. } => TypeSpec::List {
                element: element.clone(),
                nullable,
            },
            TypeSpec::Union {
                name,
                members,
                description,
                ..
            } => TypeSpec::Union {
                name: name.clone(),
                members: members.clone(),
                description: description.clone(),
                nullable,
            },
        }
    }

    /// The GraphQL type name at this position, ignoring list/nullable
    /// wrappers (i.e. the innermost named type).
    pub fn inner_name(&self) -> &str {
        match self {
            TypeSpec::Named { name, .. } => name,
            TypeSpec::List { element, .. } => element.inner_name(),
            TypeSpec::Union { name, .. } => name,
        }
    }

    /// Whether this position's innermost type is one of the five built-in
    /// scalars.
    pub fn is_builtin_scalar(&self) -> bool {
        matches!(self, TypeSpec::Named { name, .. } if BUILTIN_SCALARS.contains(&name.as_str()))
    }

    /// Whether a `Union` variant appears anywhere within this spec
    /// (including nested inside a list). Used by the type compiler to
    /// reject unions in input position (spec.md §3, §4.1 rule 6).
    pub fn contains_union(&self) -> bool {
        match self {
            TypeSpec::Union { .. } => true,
            TypeSpec::List { element, .. } => element.contains_union(),
            TypeSpec::Named { .. } => false,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Named { name, nullable } => {
                write!(f, "{name}")?;
                if !nullable {
                    write!(f, "!")?;
                }
                Ok(())
            }
            TypeSpec::List { element, nullable } => {
                write!(f, "[{element}]")?;
                if !nullable {
                    write!(f, "!")?;
                }
                Ok(())
            }
            TypeSpec::Union { name, nullable, .. } => {
                write!(f, "{name}")?;
                if !nullable {
                    write!(f, "!")?;
                }
                Ok(())
            }
        }
    }
}

/// Builds the ordered, deduplicated member set for a `#[derive(Union)]`
/// type's [`TypeSpec::Union`] (spec.md §4.1 rule 6).
pub fn union_members(names: Vec<String>) -> IndexSet<String> {
    names.into_iter().collect()
}

/// A single resolver or input-object argument.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: String,
    pub type_spec: TypeSpec,
    pub has_default: bool,
    pub default_value: Option<serde_json::Value>,
}

impl ArgSpec {
    pub fn required(name: impl Into<String>, type_spec: TypeSpec) -> Self {
        ArgSpec {
            name: name.into(),
            type_spec,
            has_default: false,
            default_value: None,
        }
    }

    pub fn with_default(
        name: impl Into<String>,
        type_spec: TypeSpec,
        default_value: serde_json::Value,
    ) -> Self {
        ArgSpec {
            name: name.into(),
            type_spec,
            has_default: true,
            default_value: Some(default_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, nullable: bool) -> TypeSpec {
        TypeSpec::Named {
            name: name.to_string(),
            nullable,
        }
    }

    #[test]
    fn displays_non_null_list_of_non_null() {
        let spec = TypeSpec::List {
            element: Box::new(named("T", false)),
            nullable: true,
        };
        assert_eq!(spec.to_string(), "[T!]");
    }

    #[test]
    fn displays_non_null_list_of_nullable() {
        let spec = TypeSpec::List {
            element: Box::new(named("T", true)),
            nullable: false,
        };
        assert_eq!(spec.to_string(), "[T]!");
    }

    #[test]
    fn detects_nested_union_in_list() {
        let union = TypeSpec::Union {
            name: "AB".into(),
            members: IndexSet::from(["A".to_string(), "B".to_string()]),
            description: None,
            nullable: false,
        };
        let list = TypeSpec::List {
            element: Box::new(union),
            nullable: true,
        };
        assert!(list.contains_union());
        assert!(!named("String", false).contains_union());
    }

    #[test]
    fn builtin_scalar_detection() {
        assert!(named("Int", false).is_builtin_scalar());
        assert!(!named("User", false).is_builtin_scalar());
    }
}
