//! Filter catalog: binds script instructions to filter instances.
//!
//! Each catalog entry owns the grammar of one filter name: how many
//! parameters it takes, how they are parsed and which values are allowed.
//! Binding either yields an immutable [`Filter`] or a [`BindError`] naming
//! the filter, the parameter and the reason.

use crate::core::codec::{ImageCodec, StandardCodec};
use crate::core::error::BindError;
use crate::filters::filter::Filter;
use indexmap::IndexMap;
use std::sync::Arc;

/// Function turning parsed arguments into a filter.
pub type Binder = fn(&BindArgs<'_>) -> Result<Filter, BindError>;

/// Catalog entry describing one filter name.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Name used in scripts.
    pub name: &'static str,
    /// Usage line quoted in arity errors.
    pub usage: &'static str,
    binder: Binder,
}

impl CatalogEntry {
    /// Create an entry for `name`.
    pub fn new(name: &'static str, usage: &'static str, binder: Binder) -> Self {
        Self {
            name,
            usage,
            binder,
        }
    }
}

/// Arguments handed to a [`Binder`].
pub struct BindArgs<'a> {
    entry: &'a CatalogEntry,
    params: &'a [String],
    codec: &'a dyn ImageCodec,
}

impl<'a> BindArgs<'a> {
    /// Filter name being bound.
    pub fn name(&self) -> &'static str {
        self.entry.name
    }

    /// Raw parameter at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the parameters checked by [`expect_arity`](Self::expect_arity).
    pub fn param(&self, index: usize) -> &'a str {
        &self.params[index]
    }

    /// Codec for filters that load images while binding.
    pub fn codec(&self) -> &'a dyn ImageCodec {
        self.codec
    }

    /// Fail unless exactly `count` parameters were given.
    pub fn expect_arity(&self, count: usize) -> Result<(), BindError> {
        if self.params.len() == count {
            Ok(())
        } else {
            Err(BindError::WrongArity {
                filter: self.entry.name.to_string(),
                usage: self.entry.usage.to_string(),
            })
        }
    }

    /// Parse parameter `index` as a strictly positive integer.
    pub fn positive_int(&self, index: usize, parameter: &str) -> Result<u32, BindError> {
        let raw = self.param(index);
        let invalid = |reason: String| BindError::InvalidParameter {
            filter: self.entry.name.to_string(),
            parameter: parameter.to_string(),
            value: raw.to_string(),
            reason,
        };

        let value: i64 = raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
        if value <= 0 {
            return Err(BindError::NotPositive {
                filter: self.entry.name.to_string(),
                parameter: parameter.to_string(),
            });
        }
        u32::try_from(value).map_err(|_| invalid(format!("exceeds {}", u32::MAX)))
    }
}

/// Catalog of every filter a script may name.
pub struct FilterCatalog {
    /// Entries indexed by script name, in registration order.
    entries: IndexMap<&'static str, CatalogEntry>,
    /// Codec used by filters that read images while binding.
    codec: Arc<dyn ImageCodec>,
}

impl FilterCatalog {
    /// Create an empty catalog using `codec`.
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            entries: IndexMap::new(),
            codec,
        }
    }

    /// Create a catalog of the built-in filters using the standard codec.
    pub fn with_builtins() -> Self {
        Self::with_codec(Arc::new(StandardCodec::new()))
    }

    /// Create a catalog of the built-in filters using `codec`.
    pub fn with_codec(codec: Arc<dyn ImageCodec>) -> Self {
        let mut catalog = Self::new(codec);
        crate::filters::builtin::register_all(&mut catalog);
        catalog
    }

    /// Register an entry, replacing any entry with the same name.
    pub fn register(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.name, entry);
    }

    /// Bind `[name, params...]` to a filter.
    pub fn bind(&self, tokens: &[String]) -> Result<Filter, BindError> {
        let (name, params) = tokens
            .split_first()
            .ok_or_else(|| BindError::UnknownOperation(String::new()))?;
        let entry = self
            .entries
            .get(name.as_str())
            .ok_or_else(|| BindError::UnknownOperation(name.clone()))?;

        let args = BindArgs {
            entry,
            params,
            codec: self.codec.as_ref(),
        };
        (entry.binder)(&args)
    }

    /// Check if a filter name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// The codec shared with binders.
    pub fn codec(&self) -> Arc<dyn ImageCodec> {
        Arc::clone(&self.codec)
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}
