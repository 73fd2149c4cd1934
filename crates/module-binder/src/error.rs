//! # Binder Errors
//!
//! All failures the binder reports, from setup contract violations (duplicate install, use after
//! freeze, unknown key) through dependency cycles to module configure/run failures.
//!
//! Setup violations are programmer errors. They are returned rather than panicked so the caller
//! decides whether to abort; they should never be silently ignored.

use std::any::Any;

use crate::key::Key;
use crate::module::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum BinderError {
    #[error("module already installed: {0}")]
    AlreadyInstalled(Key),

    #[error("cannot install module {0}: binder is frozen")]
    InstallAfterFreeze(Key),

    /// A module asked for a sibling after the run phase started, e.g. from inside `run`.
    #[error("cannot resolve module {0}: binder is frozen, modules may only be resolved while configuring")]
    ResolveAfterFreeze(Key),

    #[error("binder has already been run")]
    AlreadyRunning,

    #[error("module not found: {0}")]
    NotFound(Key),

    #[error("module not found: {dependency} (required by {dependent})")]
    MissingDependency { dependency: Key, dependent: Key },

    /// `chain` is the resolution stack at the point the cycle was re-entered, ending in `key`.
    #[error("circular dependency detected for module {key}: {}", display_chain(.chain))]
    CircularDependency { key: Key, chain: Vec<Key> },

    #[error("module {key} is not of type {expected}")]
    TypeMismatch { key: Key, expected: &'static str },

    #[error("failed to configure module {key}: {source}")]
    Configure { key: Key, source: BoxError },

    #[error("module {key} panicked while configuring: {message}")]
    ConfigurePanic { key: Key, message: String },

    #[error("module {key} failed: {source}")]
    Run { key: Key, source: BoxError },

    #[error("module {key} panicked: {message}")]
    RunPanic { key: Key, message: String },

    #[error("module task did not complete: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl BinderError {
    /// True for both a missing top-level key and a missing declared dependency.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MissingDependency { .. })
    }

    /// The module the error is attributed to, if any.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::AlreadyInstalled(key)
            | Self::InstallAfterFreeze(key)
            | Self::ResolveAfterFreeze(key)
            | Self::NotFound(key)
            | Self::CircularDependency { key, .. }
            | Self::TypeMismatch { key, .. }
            | Self::Configure { key, .. }
            | Self::ConfigurePanic { key, .. }
            | Self::Run { key, .. }
            | Self::RunPanic { key, .. } => Some(key),
            Self::MissingDependency { dependency, .. } => Some(dependency),
            Self::AlreadyRunning | Self::TaskJoin(_) => None,
        }
    }
}

fn display_chain(chain: &[Key]) -> String {
    chain
        .iter()
        .map(Key::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Renders a panic payload the way the default hook does.
///
/// Exposed for modules that contain panics of their own, e.g. around user callbacks.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_chain_rendering() {
        let err = BinderError::CircularDependency {
            key: Key::from("module-d"),
            chain: vec!["module-d".into(), "module-e".into(), "module-d".into()],
        };
        assert_eq!(
            err.to_string(),
            "circular dependency detected for module module-d: module-d -> module-e -> module-d"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(BinderError::NotFound("a".into()).is_not_found());
        let missing = BinderError::MissingDependency {
            dependency: "module-b".into(),
            dependent: "module-a".into(),
        };
        assert!(missing.is_not_found());
        assert_eq!(missing.key(), Some(&Key::from("module-b")));
        assert!(!BinderError::AlreadyRunning.is_not_found());
    }

    #[test]
    fn test_panic_message_payloads() {
        let static_str: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(static_str.as_ref()), "boom");

        let owned: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(owned.as_ref()), "kaboom");

        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_configure_error_keeps_source() {
        let err = BinderError::Configure {
            key: "module-h".into(),
            source: "bad config".into(),
        };
        assert_eq!(err.to_string(), "failed to configure module module-h: bad config");
        assert!(std::error::Error::source(&err).is_some());
    }
}
