//! Gate error types.

use thiserror::Error;

/// Gate errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
///
/// Note that an unknown ability name or a subject without a policy is
/// never an error: both resolve to a deny or a fall-through.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An ability definition is malformed.
    ///
    /// Raised by `define` when a string reference is not of the
    /// `Type@method` shape or the ability name is empty.
    #[error("invalid ability definition: {0}")]
    InvalidDefinition(String),

    /// A `Type@method` definition names a type the resolver does not know.
    #[error("cannot resolve '{0}' for ability definition")]
    Unresolvable(String),

    /// The resolver failed to produce an instance during a check.
    #[error("failed to resolve '{name}': {reason}")]
    Resolution { name: String, reason: String },

    /// A resolved handler does not expose the referenced method.
    #[error("'{handler}' has no method '{method}'")]
    UndefinedMethod { handler: String, method: String },

    /// The ability was denied by `authorize`.
    #[error("this action is unauthorized: {ability}")]
    Unauthorized { ability: String },

    /// Failed to parse a gate configuration file.
    #[error("failed to parse gate config: {0}")]
    Parse(String),

    /// An I/O error occurred while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
