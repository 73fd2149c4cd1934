//! # Module Keys
//!
//! Every module is identified by a [`Key`]: a cheap-to-clone, comparable name that is unique
//! within one [`Binder`](crate::Binder).
//!
//! A [`Handle<T>`] is a `Key` that also remembers the concrete module type registered under it.
//! Collaborator crates export one as a constant so that dependents can retrieve the module already
//! downcast to its real type:
//!
//! ```rust
//! use module_binder::{Binder, BoxError, Handle, Key, Module};
//!
//! struct Clock;
//!
//! impl Module for Clock {
//!     fn name(&self) -> Key {
//!         CLOCK.key()
//!     }
//! }
//!
//! pub const CLOCK: Handle<Clock> = Handle::new("clock");
//!
//! # fn main() -> Result<(), BoxError> {
//! let binder = Binder::new();
//! binder.install(Clock)?;
//! let clock = CLOCK.get(&binder)?; // Arc<Clock>
//! # let _ = clock;
//! # Ok(())
//! # }
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::binder::Binder;
use crate::error::BinderError;
use crate::module::Module;

/// Opaque identifier of a module within one binder.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Arc<str>);

impl Key {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", &*self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// A typed key: the name a module of type `T` is installed under.
///
/// Resolving through a handle returns `Arc<T>` instead of `Arc<dyn Module>`, so the
/// downcast happens once, inside the binder, and a mismatch surfaces as
/// [`BinderError::TypeMismatch`] rather than a fault at the call site.
pub struct Handle<T> {
    name: &'static str,
    _module: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _module: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> Key {
        Key::from(self.name)
    }
}

impl<T: Module> Handle<T> {
    /// Resolves the module through `binder`, configuring it (and its dependencies) first if needed.
    pub fn get(&self, binder: &Binder) -> Result<Arc<T>, BinderError> {
        binder.resolve_as(self)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> From<Handle<T>> for Key {
    fn from(handle: Handle<T>) -> Self {
        handle.key()
    }
}

impl<T> From<&Handle<T>> for Key {
    fn from(handle: &Handle<T>) -> Self {
        handle.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Dummy;

    const DUMMY: Handle<Dummy> = Handle::new("dummy");

    #[test]
    fn test_key_equality_and_lookup_by_str() {
        let a = Key::from("module-a");
        let b = Key::new(String::from("module-a"));
        assert_eq!(a, b);
        assert_eq!(a, "module-a");

        let mut map = HashMap::new();
        map.insert(a, 1);
        // Borrow<str> lets us look keys up without allocating
        assert_eq!(map.get("module-a"), Some(&1));
    }

    #[test]
    fn test_key_formatting() {
        let key = Key::from("timer");
        assert_eq!(key.to_string(), "timer");
        assert_eq!(format!("{key:?}"), "Key(\"timer\")");
    }

    #[test]
    fn test_handle_converts_to_key() {
        let copy = DUMMY;
        assert_eq!(copy.name(), "dummy");
        assert_eq!(Key::from(DUMMY), Key::from("dummy"));
        assert_eq!(Key::from(&copy), DUMMY.key());
    }
}
