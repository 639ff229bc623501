//! Result adaptation: attach a projection to whatever a resolver returned.


use crate::{
    config::ProjectionConfig,
    error::InternalError,
    filter::{ConventionFilterCompiler, FilterCompiler, FilterExtractor},
    obs::{
        ShapeKind,
        sink::{self, MetricsEvent},
    },
    projection::{self, Projection, ProjectionCache},
    property::PropertyType,
    schema::{FieldDef, Schema, TypeDef},
    selection::{DefaultFieldCollector, FieldCollector, FieldNode, SelectionSet},
    source::Resolved,
    traits::{Entity, Projectable},
    walker::SelectionWalker,
};
use std::sync::Arc;

///
/// Projector
///
/// Shared, immutable projection environment: the schema, configuration,
/// and the pluggable collector and filter compiler. One per schema.
///

pub struct Projector {
    schema: Arc<Schema>,
    config: ProjectionConfig,
    collector: Arc<dyn FieldCollector>,
    filters: Arc<dyn FilterCompiler>,
    cache: Option<ProjectionCache>,
}

impl Projector {
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            config: ProjectionConfig::default(),
            collector: Arc::new(DefaultFieldCollector),
            filters: Arc::new(ConventionFilterCompiler),
            cache: None,
        }
    }

    /// Apply `config`; enabling `cache` installs a fresh projection cache.
    pub fn with_config(mut self, config: ProjectionConfig) -> Result<Self, InternalError> {
        config.validate()?;
        self.cache = config.cache.then(ProjectionCache::new);
        self.config = config;

        Ok(self)
    }

    #[must_use]
    pub fn with_collector(mut self, collector: Arc<dyn FieldCollector>) -> Self {
        self.collector = collector;
        self
    }

    #[must_use]
    pub fn with_filter_compiler(mut self, filters: Arc<dyn FilterCompiler>) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    #[must_use]
    pub const fn cache(&self) -> Option<&ProjectionCache> {
        self.cache.as_ref()
    }

    #[must_use]
    pub fn walker(&self) -> SelectionWalker<'_> {
        let filters = FilterExtractor::new(
            &self.schema,
            self.filters.as_ref(),
            &self.config.filter_argument,
        );

        SelectionWalker::new(
            &self.schema,
            self.collector.as_ref(),
            filters,
            self.config.max_depth,
        )
    }

    /// Compile a tree, going through the cache when one is configured.
    pub fn compile(
        &self,
        root: &str,
        properties: &[PropertyType],
    ) -> Result<Arc<Projection>, InternalError> {
        match &self.cache {
            Some(cache) => cache.get_or_compile(&self.schema, root, properties),
            None => projection::compile(&self.schema, root, properties).map(Arc::new),
        }
    }
}

///
/// Adapted
/// A resolver result after adaptation, plus the projection that was built.
///

pub struct Adapted<E> {
    pub result: Resolved<E>,
    pub projection: Option<Arc<Projection>>,
}

///
/// ResultAdapter
///
/// Builds the property tree for one field and attaches the compiled
/// projection to deferred and paged results. Sequence and stream results are
/// returned unchanged together with the projection, for the caller to apply.
///

pub struct ResultAdapter {
    projector: Arc<Projector>,
    root: String,
}

impl ResultAdapter {
    #[must_use]
    pub fn new(projector: Arc<Projector>, root: impl Into<String>) -> Self {
        Self {
            projector,
            root: root.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Property tree for `field` as requested by `node`.
    ///
    /// `None` when the field's type is neither the root type nor a connection
    /// over it, or when no usable sub-selection exists.
    pub fn properties(
        &self,
        field: &FieldDef,
        node: &FieldNode,
    ) -> Result<Option<Vec<PropertyType>>, InternalError> {
        let schema = self.projector.schema();

        let selection = match schema.classify(&field.ty)? {
            TypeDef::Connection(connection) if connection.node_type == self.root => {
                self.nodes_selection(node)
            }
            TypeDef::Object(object) if object.name == self.root => node.selection_set.as_ref(),
            _ => None,
        };
        let Some(selection) = selection else {
            return Ok(None);
        };

        let root = schema.object(&self.root)?;
        self.projector.walker().walk(root, selection).map(Some)
    }

    /// Sub-selection of the connection's nodes field.
    ///
    /// Zero or several direct `nodes` selections count as absent.
    fn nodes_selection<'n>(&self, node: &'n FieldNode) -> Option<&'n SelectionSet> {
        let nodes_field = self.projector.config().nodes_field.as_str();
        let mut matches = node
            .selection_set
            .as_ref()?
            .fields()
            .filter(|child| child.name == nodes_field);

        let only = matches.next()?;
        if matches.next().is_some() {
            tracing::debug!(
                root = %self.root,
                nodes_field,
                "connection selects its nodes field more than once; not projected"
            );
            return None;
        }

        only.selection_set.as_ref()
    }

    /// Adapt one resolver result.
    pub fn adapt<E: Entity>(
        &self,
        field: &FieldDef,
        node: &FieldNode,
        result: Resolved<E>,
    ) -> Result<Adapted<E>, InternalError> {
        let Some(properties) = self.properties(field, node)? else {
            return Ok(Adapted {
                result,
                projection: None,
            });
        };
        let projection = self.projector.compile(&self.root, &properties)?;

        let result = match result {
            Resolved::Page(page) => {
                self.attached(ShapeKind::Page);
                Resolved::Page(page.project(&projection)?)
            }
            Resolved::Deferred(query) => {
                self.attached(ShapeKind::Deferred);
                Resolved::Deferred(query.project(&projection)?)
            }
            other => other,
        };

        Ok(Adapted {
            result,
            projection: Some(projection),
        })
    }

    fn attached(&self, shape: ShapeKind) {
        tracing::debug!(root = %self.root, ?shape, "projection attached");
        sink::record(MetricsEvent::ProjectionAttached {
            root: &self.root,
            shape,
        });
    }
}
