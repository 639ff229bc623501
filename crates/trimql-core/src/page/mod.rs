//! Pagination container.
//!
//! A page wraps an inner source plus cursor metadata. Projection rewraps the
//! page with its inner source replaced, leaving the metadata untouched.

use crate::{
    error::InternalError,
    projection::Projection,
    source::DeferredQuery,
    traits::{Entity, Projectable},
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

///
/// PageInfo
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
    pub total_count: Option<u64>,
}

///
/// PageSource
///

pub enum PageSource<E> {
    Deferred(DeferredQuery<E>),
    Sequence(Vec<E>),
}

impl<E: fmt::Debug> fmt::Debug for PageSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deferred(query) => f.debug_tuple("Deferred").field(query).finish(),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
        }
    }
}

///
/// Page
///

#[derive(Debug)]
pub struct Page<E> {
    pub source: PageSource<E>,
    pub info: PageInfo,
}

impl<E> Page<E> {
    #[must_use]
    pub const fn new(source: PageSource<E>, info: PageInfo) -> Self {
        Self { source, info }
    }

    /// Replace the inner source, keeping page metadata.
    pub fn map_source(
        self,
        f: impl FnOnce(PageSource<E>) -> Result<PageSource<E>, InternalError>,
    ) -> Result<Self, InternalError> {
        Ok(Self {
            source: f(self.source)?,
            info: self.info,
        })
    }
}

impl<E: Entity> Projectable for Page<E> {
    fn project(self, projection: &Arc<Projection>) -> Result<Self, InternalError> {
        self.map_source(|source| {
            Ok(match source {
                PageSource::Deferred(query) => PageSource::Deferred(query.project(projection)?),
                PageSource::Sequence(items) => PageSource::Sequence(items.project(projection)?),
            })
        })
    }
}
