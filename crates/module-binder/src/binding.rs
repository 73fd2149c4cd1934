//! Per-module bookkeeping.
//!
//! A binding's state and its module instance are one value: while a module is being configured
//! the binder has moved the instance out to call `configure(&mut self, ..)`, so the `Configuring`
//! variant carries nothing. Transitions only go forward, except that a failed configure puts the
//! instance back as `Unconfigured`.

use std::fmt;
use std::sync::Arc;

use crate::module::Module;

pub(crate) enum Binding {
    Unconfigured(Box<dyn Module>),
    /// On the current resolution stack; seeing this again means a cycle.
    Configuring,
    Configured(Arc<dyn Module>),
}

impl Binding {
    pub(crate) fn state(&self) -> BindingState {
        match self {
            Self::Unconfigured(_) => BindingState::Unconfigured,
            Self::Configuring => BindingState::Configuring,
            Self::Configured(_) => BindingState::Configured,
        }
    }
}

/// Lifecycle state of one installed module, as reported by [`Binder::state`](crate::Binder::state).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingState {
    Unconfigured,
    Configuring,
    Configured,
}

impl fmt::Display for BindingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unconfigured => "unconfigured",
            Self::Configuring => "configuring",
            Self::Configured => "configured",
        };
        f.write_str(label)
    }
}
