//! The shared context threaded through all stages of one run.
//!
//! The context is the only state-sharing surface between stages: each stage
//! reads the keys its documentation requires and writes the keys it
//! produces. Keys are typed tokens ([`ContextKey`]) rather than bare
//! strings, so a stage asking for the wrong type gets a diagnosable error
//! instead of a silent mismatch.

use dyn_clone::DynClone;
use indexmap::IndexMap;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::config::Config;
use crate::data::{Frame, InstrumentDataSet, SelectedData};
use crate::errors::MarketflowError;

/// A value that can live in a [`WorkflowContext`].
///
/// Implemented automatically for every cloneable `'static` type.
pub trait ContextValue: Send + Sync + DynClone {
    /// Upcast for typed retrieval.
    fn as_any(&self) -> &dyn Any;
    /// Upcast for typed in-place mutation.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

dyn_clone::clone_trait_object!(ContextValue);

impl<T> ContextValue for T
where
    T: Any + Send + Sync + Clone,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A typed context key: a name bound to the type of the value stored under it.
///
/// Well-known keys are declared as constants in [`keys`]; stages whose
/// output key is configurable build one at construction time with
/// [`ContextKey::named`].
pub struct ContextKey<T> {
    name: Cow<'static, str>,
    _value: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Creates a key with a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _value: PhantomData,
        }
    }

    /// Creates a key with a runtime-configured name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _value: PhantomData,
        }
    }

    /// Returns the key name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

/// Well-known context keys shared by the built-in stages.
pub mod keys {
    use super::{Config, ContextKey, Frame, InstrumentDataSet, SelectedData};

    /// The loaded research configuration, seeded by the processor.
    pub const CONFIG: ContextKey<Config> = ContextKey::new("config");
    /// Loaded per-ticker quote data, produced by the data loading stage.
    pub const DATA: ContextKey<InstrumentDataSet> = ContextKey::new("data");
    /// Per-ticker frames restricted to the research time range.
    pub const SELECTED_DATA: ContextKey<SelectedData> = ContextKey::new("selected-data");
    /// The joined, ticker-prefixed dataset.
    pub const DATASET: ContextKey<Frame> = ContextKey::new("dataset");
}

/// The mutable key-value state of one workflow run.
///
/// Keys preserve insertion order for diagnostics. Absence of a key is
/// distinguishable from every stored value: `get` returning `None` means
/// "not yet computed", never "computed as empty".
///
/// Cloning copies every entry, so a seed context can be reused across runs
/// without any sharing of mutable state between them.
#[derive(Default, Clone)]
pub struct WorkflowContext {
    entries: IndexMap<String, Box<dyn ContextValue>>,
}

impl WorkflowContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under the key, overwriting any previous entry.
    pub fn set<T>(&mut self, key: &ContextKey<T>, value: T)
    where
        T: Any + Send + Sync + Clone,
    {
        self.entries.insert(key.name().to_string(), Box::new(value));
    }

    /// Returns the value stored under the key, if present with the key's type.
    #[must_use]
    pub fn get<T>(&self, key: &ContextKey<T>) -> Option<&T>
    where
        T: Any,
    {
        self.entries
            .get(key.name())
            .and_then(|entry| entry.as_any().downcast_ref::<T>())
    }

    /// Mutable access to the value stored under the key.
    #[must_use]
    pub fn get_mut<T>(&mut self, key: &ContextKey<T>) -> Option<&mut T>
    where
        T: Any,
    {
        self.entries
            .get_mut(key.name())
            .and_then(|entry| entry.as_any_mut().downcast_mut::<T>())
    }

    /// Returns the value stored under the key, or an error naming the key.
    ///
    /// Distinguishes a missing key from a present key of the wrong type.
    pub fn require<T>(&self, key: &ContextKey<T>) -> Result<&T, MarketflowError>
    where
        T: Any,
    {
        let entry = self
            .entries
            .get(key.name())
            .ok_or_else(|| MarketflowError::MissingContextKey {
                key: key.name().to_string(),
            })?;
        entry
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| MarketflowError::ContextType {
                key: key.name().to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Mutable variant of [`WorkflowContext::require`].
    pub fn require_mut<T>(&mut self, key: &ContextKey<T>) -> Result<&mut T, MarketflowError>
    where
        T: Any,
    {
        let entry = self
            .entries
            .get_mut(key.name())
            .ok_or_else(|| MarketflowError::MissingContextKey {
                key: key.name().to_string(),
            })?;
        entry
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| MarketflowError::ContextType {
                key: key.name().to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Returns true if any value is stored under the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The stored key names, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
