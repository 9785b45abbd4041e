//! Generic error handling utilities
//!
//! Lets the startup layer report any error kind the same way: user-actionable
//! errors (bad flags, bad credentials) print their own message, system errors
//! print the operation context and keep the detail at debug level.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True when the message tells the user what to fix
    fn is_user_actionable(&self) -> bool;

    /// The message to display when the error is user-actionable
    fn user_message(&self) -> Option<String>;
}

/// Log a terminating error with the detail level its kind deserves
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message().filter(|_| error.is_user_actionable()) {
        Some(user_msg) => log::error!("FATAL: {}: {}", operation_context, user_msg),
        None => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
