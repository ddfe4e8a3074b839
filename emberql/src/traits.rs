//! Marker traits implemented by `emberql_codegen`'s generated code, the way
//! `juniper::types::marker` marks `GraphQLObject`/`GraphQLInterface`/
//! `GraphQLUnion` on the teacher's own generated `impl`s.
//!
//! Every decorated class gets exactly one `Compiled` impl (whichever of
//! `ObjectType`/`InputType`/`InterfaceType`/`SubscriptionType` the decorator
//! chose extends it), backing the "compiled metadata is stored on the class"
//! design note (spec.md §9).

use crate::compiled::{CompiledResolverField, CompiledType};
use crate::spec::TypeSpec;

/// Implemented once per decorated class. `compiled()` returns a `&'static
/// CompiledType` from a process-lifetime `OnceLock`, making repeated access
/// idempotent by construction (spec.md §8: "`compile(C)` is idempotent").
pub trait Compiled {
    fn compiled() -> &'static CompiledType;
}

/// Implemented by `#[derive(Object)]`-annotated classes (spec.md §4.3 kind
/// `object`).
pub trait ObjectType: Compiled {}

/// Implemented by `#[derive(InputObject)]`-annotated classes (spec.md §4.3
/// kind `input`).
pub trait InputType: Compiled {}

/// Implemented by `#[derive(Interface)]`-annotated classes (spec.md §4.3
/// kind `interface`).
pub trait InterfaceType: Compiled {
    /// Every subclass of this interface that itself carries a compiled
    /// type, for the schema-graph builder's automatic implementer discovery
    /// (spec.md §4.4 step 3). Populated by the `#[derive(Interface)]`-side
    /// registration, since Rust has no runtime subclass enumeration.
    fn implementers() -> Vec<&'static CompiledType>;
}

/// Implemented by `#[derive(Subscription)]`-annotated classes (spec.md §4.3
/// kind `subscription`).
pub trait SubscriptionType: Compiled {}

/// Supplies the resolver-method-derived fields of an `object`/`interface`
/// type, generated by the companion `#[resolvers]` attribute macro on the
/// type's `impl` block (spec.md §4.3 step 3). Types with no resolver methods
/// get the default empty implementation, letting `#[derive(Object)]` and
/// `#[resolvers]` be applied independently and still merge into one
/// [`CompiledType`] (SPEC_FULL.md §3's `complex` carry-over of the teacher's
/// `SimpleObject`/`ComplexObject` split).
pub trait ResolverFields {
    fn resolver_fields() -> Vec<CompiledResolverField> {
        Vec::new()
    }
}

/// Supplies the subscription-method-derived fields of a
/// `#[derive(Subscription)]` type, generated by the companion
/// `#[subscription_resolvers]` attribute macro on the type's `impl` block
/// (spec.md §4.3 step 3, subscription form) -- the subscription analogue of
/// [`ResolverFields`].
pub trait SubscriptionFields {
    fn subscription_fields() -> Vec<CompiledResolverField> {
        Vec::new()
    }
}

/// Gives the annotation analyzer a single, uniform way to turn a Rust type
/// occupying a field/argument/return position into a [`TypeSpec`] at
/// runtime (spec.md §4.1), without the generated code for one class having
/// to know whether another class compiled as an object, input, interface,
/// or union — every eligible type implements this directly, concrete impl
/// by concrete impl, rather than through a blanket impl (coherence forbids
/// a blanket `impl<T: ObjectType> GqlTypeSpec for T` alongside the scalar
/// impls below, since nothing rules out some future type satisfying both).
///
/// `#[derive(Object)]`/`#[derive(InputObject)]`/`#[derive(Interface)]`/
/// `#[derive(Union)]` each generate their own impl of this trait; the five
/// built-in scalars get theirs here.
pub trait GqlTypeSpec {
    fn gql_type_spec(nullable: bool) -> TypeSpec;
}

macro_rules! scalar_type_spec {
    ($ty:ty => $name:literal) => {
        impl GqlTypeSpec for $ty {
            fn gql_type_spec(nullable: bool) -> TypeSpec {
                TypeSpec::Named {
                    name: $name.to_string(),
                    nullable,
                }
            }
        }
    };
}

scalar_type_spec!(String => "String");
scalar_type_spec!(str => "String");
scalar_type_spec!(i64 => "Int");
scalar_type_spec!(i32 => "Int");
scalar_type_spec!(f64 => "Float");
scalar_type_spec!(f32 => "Float");
scalar_type_spec!(bool => "Boolean");

/// Marks a `String`-backed field as the `ID` scalar rather than `String`
/// (spec.md §3: built-in scalars include `ID`). Analyzed the same way
/// `Context<T>` is: by structural recognition of this wrapper type, never
/// by field name.
pub struct Id(pub String);

impl GqlTypeSpec for Id {
    fn gql_type_spec(nullable: bool) -> TypeSpec {
        TypeSpec::Named {
            name: "ID".to_string(),
            nullable,
        }
    }
}
