//! The three-tier error taxonomy of spec.md §7.
//!
//! Tier 1 ([`SchemaBuildError`]) is raised during decoration / schema
//! construction and is fatal. Tier 2 is owned entirely by the engine
//! (`async-graphql`'s own parse/validation errors) and never constructed
//! here. Tier 3 ([`ResolverError`]) is raised from or around a resolver call
//! and is caught at the field boundary by [`crate::dispatch`], which
//! attaches path/location information before handing it to the engine.

use thiserror::Error;

/// Compile-time (decoration / schema-build) errors (spec.md §7 tier 1).
#[derive(Debug, Error)]
pub enum SchemaBuildError {
    #[error("{class}.{field}: unknown host type in annotation: {detail}")]
    UnknownType {
        class: String,
        field: String,
        detail: String,
    },

    #[error("{class}.{field}: union annotation has no analyzable members")]
    UnanalyzableUnion { class: String, field: String },

    #[error("{class}.{field}: a union type cannot appear in input position")]
    UnionInInputPosition { class: String, field: String },

    #[error(
        "union \"{name}\" is already registered with a different member set or description"
    )]
    UnionConflict { name: String },

    #[error("{class}: input types may not declare method-resolvers")]
    InputWithResolvers { class: String },

    #[error("{class}: subscription types may declare only subscription fields")]
    SubscriptionKindMismatch { class: String },

    #[error("{class}: object types may not declare subscription fields")]
    ObjectWithSubscriptionFields { class: String },

    #[error("{class}.{method}: a subscription resolver must be an async generator")]
    SubscriptionResolverNotAsyncGen { class: String, method: String },

    #[error("{class}.{method}: resolver is missing a return type annotation")]
    MissingReturnType { class: String, method: String },

    #[error(
        "{class}.{method}: `Context` annotation attached to a parameter that does not exist"
    )]
    InvalidContextPosition { class: String, method: String },

    #[error("{class}.{arg_type}: could not build a coercer for unregistered input type")]
    UnregisteredInputType { class: String, arg_type: String },

    #[error("root type \"{name}\" has no compiled type")]
    UnregisteredRoot { name: String },

    #[error("{class}.{field}: query-root data fields must declare a default value")]
    QueryRootFieldMissingDefault { class: String, field: String },

    #[error("{class} is not a frozen record-of-fields")]
    NotARecordClass { class: String },
}

/// Runtime resolver errors (spec.md §7 tier 3). Caught at the field
/// boundary and converted into a GraphQL error on the current path.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("{message}")]
    Resolver {
        message: String,
        extensions: Vec<(String, serde_json::Value)>,
    },

    #[error("argument coercion failed for \"{name}\": {detail}")]
    ArgumentCoercion { name: String, detail: String },

    #[error("expected {expected}, found a value that does not fit")]
    TypeMismatch { expected: String },

    #[error("could not resolve the concrete type of an interface/union value")]
    AbstractTypeResolution,

    #[error("subscription stream terminated: {reason}")]
    StreamTerminated { reason: String },
}

impl ResolverError {
    pub fn message(msg: impl Into<String>) -> Self {
        ResolverError::Resolver {
            message: msg.into(),
            extensions: Vec::new(),
        }
    }

    /// Stable machine-readable error-kind tag (spec.md §7: "The error
    /// taxonomy is stable and documented").
    pub fn kind(&self) -> &'static str {
        match self {
            ResolverError::Resolver { .. } => "resolver_exception",
            ResolverError::ArgumentCoercion { .. } => "argument_coercion",
            ResolverError::TypeMismatch { .. } => "type_mismatch",
            ResolverError::AbstractTypeResolution => "abstract_type_resolution",
            ResolverError::StreamTerminated { .. } => "stream_terminated",
        }
    }
}

impl SchemaBuildError {
    pub fn kind(&self) -> &'static str {
        "schema_build"
    }
}

/// Converts a resolver-tier error into the engine's own error type at the
/// field boundary (spec.md §7 tier 3). Debug tracebacks are never attached
/// (spec.md §7: "an operational concern handled outside the core").
impl From<ResolverError> for async_graphql::Error {
    fn from(err: ResolverError) -> Self {
        async_graphql::Error::new(err.to_string()).extend_with(|_, e| {
            e.set("code", err.kind());
        })
    }
}
