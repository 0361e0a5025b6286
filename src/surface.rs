//! Plain-data view of a module's declared types.
//!
//! The catalogue pipeline never touches the introspection machinery directly;
//! it consumes these structures through [`TypeSurfaceProvider`], so any source
//! of type information (DWARF, a pre-parsed metadata dump, an in-memory fake
//! in tests) can feed it.

use crate::error::Error;

/// One discovered type and its publicly declared, own-declared members.
#[derive(Debug, Clone, Default)]
pub struct TypeSurface {
    pub name: String,
    /// Static fields only.
    pub static_fields: Vec<ValueMember>,
    pub properties: Vec<ValueMember>,
    pub methods: Vec<MethodMember>,
    /// All fields, static and instance.
    pub fields: Vec<ValueMember>,
}

/// A member with a value type: a field, static field or property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMember {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMember {
    pub name: String,
    pub return_type: String,
    pub params: Vec<Param>,
}

/// A formal parameter, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub type_name: String,
    pub name: String,
}

/// A type (or whole unit) that could not be inspected.
///
/// Scans tolerate these: the failure is recorded and the remaining types are
/// still catalogued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub message: String,
    /// Dependency-resolution trace, when the underlying cause was a missing
    /// debug companion. Empty otherwise.
    pub resolution_log: Vec<String>,
}

impl ScanFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), resolution_log: Vec::new() }
    }
}

impl From<Error> for ScanFailure {
    fn from(err: Error) -> Self {
        let resolution_log = match &err {
            Error::NoDebugInfo { resolution_log } => resolution_log.clone(),
            _ => Vec::new(),
        };
        Self { message: err.to_string(), resolution_log }
    }
}

/// Everything one pass over a module produced: the types that resolved and
/// the failures for those that did not.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub types: Vec<TypeSurface>,
    pub failures: Vec<ScanFailure>,
}

/// Source of declared types for the catalogue pipeline.
pub trait TypeSurfaceProvider {
    /// Enumerate the module's class-like types and their public members.
    /// Individual load failures are reported in the outcome, not as an error.
    fn scan(&self) -> ScanOutcome;
}

impl TypeSurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}
