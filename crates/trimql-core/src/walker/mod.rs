//! Selection walking: requested selection → property tree.


use crate::{
    error::InternalError,
    filter::FilterExtractor,
    obs::sink::{self, MetricsEvent},
    property::{self, PropertyType},
    schema::{ObjectType, Schema, TypeDef},
    selection::{CollectedField, FieldCollector, SelectionSet},
};

///
/// SelectionWalker
///
/// Turns the fields requested on one object type into property nodes:
///
/// - scalar fields become scalar nodes; enum fields are not projected
/// - list-of-object fields with a sub-selection become list nodes, carrying
///   the compiled filter argument and the recursively walked element tree
/// - everything else (enums, single nested objects, lists of leaves, lists
///   selected without a sub-selection) contributes nothing
///

pub struct SelectionWalker<'a> {
    schema: &'a Schema,
    collector: &'a dyn FieldCollector,
    filters: FilterExtractor<'a>,
    max_depth: Option<usize>,
}

impl<'a> SelectionWalker<'a> {
    #[must_use]
    pub const fn new(
        schema: &'a Schema,
        collector: &'a dyn FieldCollector,
        filters: FilterExtractor<'a>,
        max_depth: Option<usize>,
    ) -> Self {
        Self {
            schema,
            collector,
            filters,
            max_depth,
        }
    }

    /// Build the property tree for `selection` on `object`.
    pub fn walk(
        &self,
        object: &ObjectType,
        selection: &SelectionSet,
    ) -> Result<Vec<PropertyType>, InternalError> {
        let mut dropped = 0;
        let properties = self.walk_at(object, selection, 0, &mut dropped)?;

        let nodes = property::node_count(&properties);
        tracing::debug!(
            root = %object.name,
            nodes,
            dropped,
            "property tree built"
        );
        sink::record(MetricsEvent::TreeBuilt {
            root: &object.name,
            nodes: nodes as u64,
            dropped,
        });

        Ok(properties)
    }

    fn walk_at(
        &self,
        object: &ObjectType,
        selection: &SelectionSet,
        depth: usize,
        dropped: &mut u64,
    ) -> Result<Vec<PropertyType>, InternalError> {
        let fields = self.collector.collect(self.schema, object, selection)?;

        let mut properties = Vec::with_capacity(fields.len());
        for collected in fields {
            if let Some(property) = self.property_for(object, collected, depth, dropped)? {
                properties.push(property);
            }
        }

        Ok(properties)
    }

    fn property_for(
        &self,
        object: &ObjectType,
        collected: CollectedField,
        depth: usize,
        dropped: &mut u64,
    ) -> Result<Option<PropertyType>, InternalError> {
        let CollectedField { field, node } = collected;
        let def = self.schema.classify(&field.ty)?;

        let Some(element) = field.ty.list_element() else {
            let scalar = matches!(def, TypeDef::Scalar { .. });
            return Ok(scalar.then(|| PropertyType::scalar(field.member)));
        };
        // Lists of lists and lists of leaves are not narrowed.
        if element.is_list() {
            return Ok(None);
        }
        let TypeDef::Object(element_type) = def else {
            return Ok(None);
        };

        let Some(sub_selection) = node.selection_set.as_ref() else {
            tracing::warn!(
                owner = %object.name,
                field = %field.name,
                element = %element_type.name,
                "list field selected without a sub-selection; left out of projection"
            );
            *dropped += 1;
            return Ok(None);
        };

        let nested_depth = depth + 1;
        if let Some(max) = self.max_depth
            && nested_depth > max
        {
            return Err(InternalError::selection_unsupported(format!(
                "list field '{}.{}' nests deeper than the configured maximum of {max}",
                object.name, field.name
            )));
        }

        let filter = self
            .filters
            .extract(&field, &node.arguments, element_type)?;
        let properties = self.walk_at(element_type, sub_selection, nested_depth, dropped)?;

        Ok(Some(PropertyType::list(
            field.member,
            element_type.name.clone(),
            properties,
            filter,
        )))
    }
}
