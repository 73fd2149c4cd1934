//! # Binder
//!
//! The `Binder` owns every installed module and drives them through their lifecycle:
//!
//! 1. **Install** - modules are registered under their [`Key`], in any order.
//! 2. **Resolve** - on demand, a module and all its transitive dependencies are configured,
//!    dependencies strictly first, each exactly once.
//! 3. **Run** - every module is resolved, the binder is frozen, and all `run` methods execute
//!    concurrently until they finish or the first failure cancels the rest.
//!
//! # Architecture Note
//! Resolution is a depth-first walk with a tri-state marker per binding. A key found in the
//! `Configuring` state is already on the current resolution stack, so reaching it again is a
//! cycle; no separate graph pass is needed and the recursion depth is bounded by the number of
//! installed modules.
//!
//! The registry sits behind a `Mutex` only so that `Binder` can be a cheap, cloneable handle that
//! `configure` implementations receive by reference. The lock is never held while module code
//! runs, which is what makes re-entrant resolution from inside `configure` possible.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::binding::{Binding, BindingState};
use crate::error::{panic_message, BinderError};
use crate::key::{Handle, Key};
use crate::module::{AsAnyArc, Module};
use crate::runner;

/// Registry, resolver and runner for one lifecycle scope.
///
/// Cloning a `Binder` yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct Binder {
    inner: Arc<Mutex<Registry>>,
}

#[derive(Default)]
struct Registry {
    /// Set once by the first `run`, before any module is resolved for it.
    running: bool,
    frozen: bool,
    bindings: HashMap<Key, Binding>,
    /// Install order; the run phase walks this list.
    installed: Vec<Key>,
    /// Keys currently being configured, outermost first.
    stack: Vec<Key>,
    /// Keys in the order their `configure` completed.
    configured: Vec<Key>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // Module code never runs under the lock, so a poisoned registry is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a module under `module.name()`.
    pub fn install<M: Module>(&self, module: M) -> Result<(), BinderError> {
        self.install_boxed(Box::new(module))
    }

    pub fn install_boxed(&self, module: Box<dyn Module>) -> Result<(), BinderError> {
        let key = module.name();
        let mut registry = self.lock();
        if registry.frozen {
            return Err(BinderError::InstallAfterFreeze(key));
        }
        if registry.bindings.contains_key(&key) {
            return Err(BinderError::AlreadyInstalled(key));
        }

        registry
            .bindings
            .insert(key.clone(), Binding::Unconfigured(module));
        registry.installed.push(key.clone());
        info!(module = %key, "Installed module");
        Ok(())
    }

    /// Returns the configured module for `key`, configuring it and its dependencies first if this
    /// is the first request for it.
    ///
    /// Only legal before the run phase starts, which includes calls made from inside another
    /// module's `configure`.
    pub fn resolve(&self, key: impl Into<Key>) -> Result<Arc<dyn Module>, BinderError> {
        let key = key.into();
        if self.is_frozen() {
            return Err(BinderError::ResolveAfterFreeze(key));
        }
        self.resolve_key(&key, None)
    }

    /// Typed variant of [`Binder::resolve`].
    pub fn resolve_as<T: Module>(&self, handle: &Handle<T>) -> Result<Arc<T>, BinderError> {
        let key = handle.key();
        let module = self.resolve(key.clone())?;
        AsAnyArc::into_any_arc(module)
            .downcast::<T>()
            .map_err(|_| BinderError::TypeMismatch {
                key,
                expected: std::any::type_name::<T>(),
            })
    }

    fn resolve_key(
        &self,
        key: &Key,
        dependent: Option<&Key>,
    ) -> Result<Arc<dyn Module>, BinderError> {
        let mut module = {
            let mut guard = self.lock();
            let registry = &mut *guard;
            let Some(binding) = registry.bindings.get_mut(key) else {
                return Err(match dependent {
                    Some(dependent) => BinderError::MissingDependency {
                        dependency: key.clone(),
                        dependent: dependent.clone(),
                    },
                    None => BinderError::NotFound(key.clone()),
                });
            };

            match std::mem::replace(binding, Binding::Configuring) {
                Binding::Configured(module) => {
                    *binding = Binding::Configured(Arc::clone(&module));
                    return Ok(module);
                }
                Binding::Configuring => {
                    let mut chain = registry.stack.clone();
                    chain.push(key.clone());
                    return Err(BinderError::CircularDependency {
                        key: key.clone(),
                        chain,
                    });
                }
                Binding::Unconfigured(module) => {
                    registry.stack.push(key.clone());
                    module
                }
            }
        };

        let outcome = self.configure_module(key, &mut *module);

        let mut guard = self.lock();
        let registry = &mut *guard;
        registry.stack.pop();
        match outcome {
            Ok(()) => {
                let module: Arc<dyn Module> = Arc::from(module);
                registry
                    .bindings
                    .insert(key.clone(), Binding::Configured(Arc::clone(&module)));
                registry.configured.push(key.clone());
                debug!(module = %key, "Configured module");
                Ok(module)
            }
            Err(err) => {
                registry
                    .bindings
                    .insert(key.clone(), Binding::Unconfigured(module));
                Err(err)
            }
        }
    }

    /// Configures every dependency of `module`, then `module` itself. Runs without the lock held.
    fn configure_module(&self, key: &Key, module: &mut dyn Module) -> Result<(), BinderError> {
        let configure_panic = |payload: Box<dyn Any + Send>| BinderError::ConfigurePanic {
            key: key.clone(),
            message: panic_message(&*payload),
        };

        let dependencies =
            panic::catch_unwind(AssertUnwindSafe(|| module.depends())).map_err(configure_panic)?;
        for dependency in dependencies {
            self.resolve_key(&dependency, Some(key))?;
        }

        info!(module = %key, "Configuring module");
        match panic::catch_unwind(AssertUnwindSafe(|| module.configure(self))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(BinderError::Configure {
                key: key.clone(),
                source,
            }),
            Err(payload) => Err(configure_panic(payload)),
        }
    }

    /// Configures every installed module, freezes the binder, then runs all modules concurrently.
    ///
    /// The shared token handed to modules is a child of `ctx`: cancelling `ctx` stops every
    /// module, and the first module failure cancels the rest without touching `ctx`. Returns the
    /// first failure, or `Ok(())` once every module has returned cleanly.
    ///
    /// Only the first call on any clone proceeds; later calls fail with
    /// [`BinderError::AlreadyRunning`], even while the first is still configuring. If configuring
    /// fails, nothing runs and the binder is left unfrozen with its bindings in place.
    pub async fn run(self, ctx: CancellationToken) -> Result<(), BinderError> {
        {
            let mut registry = self.lock();
            if registry.running {
                return Err(BinderError::AlreadyRunning);
            }
            registry.running = true;
        }

        // Walk by index: a configure step may install further modules.
        let mut modules = Vec::new();
        let mut index = 0;
        loop {
            let next = self.lock().installed.get(index).cloned();
            let Some(key) = next else { break };
            let module = self.resolve_key(&key, None)?;
            modules.push((key, module));
            index += 1;
        }

        {
            let mut registry = self.lock();
            registry.frozen = true;
            // The run phase owns the modules from here on
            registry.bindings.clear();
        }
        info!(modules = modules.len(), "Binder frozen, starting modules");

        runner::run_modules(modules, ctx).await
    }

    pub fn is_frozen(&self) -> bool {
        self.lock().frozen
    }

    pub fn len(&self) -> usize {
        self.lock().installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().installed.is_empty()
    }

    /// Installed keys, in install order.
    pub fn keys(&self) -> Vec<Key> {
        self.lock().installed.clone()
    }

    /// State of the binding for `key`, or `None` if no such module was installed.
    ///
    /// Once frozen every installed module is reported as configured.
    pub fn state(&self, key: impl Into<Key>) -> Option<BindingState> {
        let key = key.into();
        let registry = self.lock();
        if registry.frozen {
            return registry
                .installed
                .contains(&key)
                .then_some(BindingState::Configured);
        }
        registry.bindings.get(&key).map(Binding::state)
    }

    /// Keys in the order their `configure` step completed.
    pub fn configuration_order(&self) -> Vec<Key> {
        self.lock().configured.clone()
    }
}
