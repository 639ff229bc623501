use crate::{
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    projection::{Projection, ProjectionFingerprint, compile_keyed},
    property::PropertyType,
    schema::Schema,
};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

///
/// ProjectionCache
///
/// Shared map from tree fingerprint to compiled projection. Entries are
/// immutable once inserted; a race between two compilers keeps the first.
///

#[derive(Clone, Debug, Default)]
pub struct ProjectionCache {
    entries: Arc<RwLock<HashMap<ProjectionFingerprint, Arc<Projection>>>>,
}

impl ProjectionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(
        &self,
        schema: &Schema,
        root: &str,
        properties: &[PropertyType],
    ) -> Result<Arc<Projection>, InternalError> {
        let key = ProjectionFingerprint::of(root, properties);

        let hit = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        sink::record(MetricsEvent::CacheLookup { hit: hit.is_some() });
        if let Some(hit) = hit {
            return Ok(hit);
        }

        let compiled = Arc::new(compile_keyed(schema, root, properties, key)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        Ok(Arc::clone(entries.entry(key).or_insert(compiled)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
