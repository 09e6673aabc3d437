use thiserror::Error;

/// Errors raised while building a machine definition.
///
/// Definitions are constructed once at startup from compile-time-constant
/// tables, so these surface as wiring bugs rather than runtime conditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// Two transitions share the same `(source state, event type)` key.
    /// The table must be a deterministic partial function.
    #[error("Duplicate transition from state '{source_state}' on event '{event}'")]
    DuplicateTransition { source_state: String, event: String },
}
