use thiserror::Error;

/// Failures decomposing a binding expression. These are programmer errors
/// and surface where the expression is first bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("malformed binding `{member}` on {type_name}: {reason}")]
    MalformedBinding {
        member: String,
        type_name: &'static str,
        reason: &'static str,
    },
    #[error("binding `{member}` has no receiver object to observe")]
    MissingReceiver { member: String },
}
