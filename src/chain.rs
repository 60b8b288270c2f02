//! Backend capability registry
//!
//! Fetching, searching, and document rendering are each served by an ordered
//! list of interchangeable backends. A [`Registry`] is built once, when a
//! chain is constructed, and records for every backend whether it can run in
//! this build/environment. Chains iterate the available entries in order and
//! never attempt an unavailable one.

use std::fmt;

/// Whether a registered backend can be attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable(String),
}

/// One registry entry
struct Entry<B: ?Sized> {
    name: String,
    backend: Option<Box<B>>,
    capability: Capability,
}

/// Ordered list of backends tagged available/unavailable
pub struct Registry<B: ?Sized> {
    entries: Vec<Entry<B>>,
}

impl<B: ?Sized> Registry<B> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an available backend
    pub fn register(mut self, name: impl Into<String>, backend: Box<B>) -> Self {
        self.entries.push(Entry {
            name: name.into(),
            backend: Some(backend),
            capability: Capability::Available,
        });
        self
    }

    /// Appends a backend that cannot run here, e.g. a compiled-out feature
    pub fn register_unavailable(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.entries.push(Entry {
            name: name.into(),
            backend: None,
            capability: Capability::Unavailable(reason.into()),
        });
        self
    }

    /// Appends the outcome of constructing a backend
    ///
    /// A construction error registers the backend as unavailable.
    pub fn register_result<E: fmt::Display>(
        self,
        name: impl Into<String>,
        backend: Result<Box<B>, E>,
    ) -> Self {
        match backend {
            Ok(backend) => self.register(name, backend),
            Err(e) => self.register_unavailable(name, e.to_string()),
        }
    }

    /// Iterates the available backends in registration order
    ///
    /// Unavailable entries are skipped with a debug log line.
    pub fn available(&self) -> impl Iterator<Item = (&str, &B)> {
        self.entries.iter().filter_map(|entry| match &entry.backend {
            Some(backend) => Some((entry.name.as_str(), backend.as_ref())),
            None => {
                if let Capability::Unavailable(reason) = &entry.capability {
                    tracing::debug!("Skipping unavailable backend {}: {}", entry.name, reason);
                }
                None
            }
        })
    }

    /// Names and capabilities of every entry, in order
    pub fn capabilities(&self) -> Vec<(&str, &Capability)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.capability))
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.entries.iter().filter(|e| e.backend.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<B: ?Sized> Default for Registry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized> fmt::Debug for Registry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.capabilities()).finish()
    }
}
