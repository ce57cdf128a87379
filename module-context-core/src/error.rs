use thiserror::Error;

/// Error returned when invoking or constructing a wrapped target.
///
/// The cache layer raises no errors of its own beyond a slot type mismatch
/// and a target re-entering the slot it is populating;
/// a failing target surfaces unchanged as [`InvokeError::Target`] and nothing
/// is stored for that call.
///
/// # Examples
///
/// ```
/// use module_context_core::InvokeError;
///
/// let err: InvokeError<&str> = InvokeError::Target("boom");
/// assert_eq!(err.target_error(), Some(&"boom"));
/// assert_eq!(err.to_string(), "target failed: boom");
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvokeError<E> {
    /// The underlying target failed.
    #[error("target failed: {0}")]
    Target(E),

    /// The slot was populated by a target producing a different type.
    #[error("cache slot `{cache_name}` does not hold a value of type `{expected}`")]
    SlotType {
        cache_name: String,
        expected: &'static str,
    },

    /// The target tried to read the slot it is itself populating.
    #[error("cache slot `{cache_name}` was requested while it is being populated")]
    Reentrant { cache_name: String },
}

impl<E> InvokeError<E> {
    /// Returns the target's own error, if this is one.
    pub fn target_error(&self) -> Option<&E> {
        match self {
            InvokeError::Target(err) => Some(err),
            _ => None,
        }
    }

    /// Consumes the error and returns the target's own error, if this is one.
    pub fn into_target_error(self) -> Option<E> {
        match self {
            InvokeError::Target(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_slot_type(&self) -> bool {
        matches!(self, InvokeError::SlotType { .. })
    }

    pub fn is_reentrant(&self) -> bool {
        matches!(self, InvokeError::Reentrant { .. })
    }
}
