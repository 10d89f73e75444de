// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Where each property of a query's results comes from.
//!
//! The metadata is read off a generated [`SqlSpec`]: a field or expression of the table, a
//! referenced parent or child collection with its own properties, each possibly inlined from an
//! ancestor table through a chain of inline parents.

use serde::Serialize;
use sqljson_dbmd::RelId;

use crate::{FromEntry, SelectEntry, SpecError, SpecErrorKind, SpecLocation, SqlSpec};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPropertiesMetadata {
    pub query_name: String,
    pub table: RelId,
    pub properties: Vec<PropertyMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetadata {
    pub property_name: String,
    pub source: PropertySource,
    /// Inline parent steps from the query's table to the table providing the property; empty
    /// for a property of the table itself
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inlined_from_ancestor_via: Vec<ParentStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PropertySource {
    Field {
        field: String,
    },
    Expression {
        expression: String,
    },
    ParentReference {
        table: RelId,
        properties: Vec<PropertyMetadata>,
    },
    ChildCollection {
        table: RelId,
        properties: Vec<PropertyMetadata>,
        unwrapped: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentStep {
    pub parent: RelId,
    pub via_fk_fields: Vec<String>,
}

pub fn query_properties_metadata(
    query_name: &str,
    sql_spec: &SqlSpec,
) -> Result<QueryPropertiesMetadata, SpecError> {
    let inconsistent = |message: String| {
        SpecError::new(
            SpecLocation::new(query_name),
            SpecErrorKind::InconsistentSqlSpec(message),
        )
    };

    Ok(QueryPropertiesMetadata {
        query_name: query_name.to_string(),
        table: base_table(sql_spec).map_err(inconsistent)?,
        properties: property_metadatas(sql_spec).map_err(inconsistent)?,
    })
}

fn base_table(sql_spec: &SqlSpec) -> Result<RelId, String> {
    sql_spec
        .base_table()
        .cloned()
        .ok_or_else(|| "no base table in FROM entries".to_string())
}

fn property_metadatas(sql_spec: &SqlSpec) -> Result<Vec<PropertyMetadata>, String> {
    sql_spec
        .select_entries
        .iter()
        .map(|select_entry| property_metadata(select_entry, sql_spec))
        .collect()
}

fn property_metadata(
    select_entry: &SelectEntry,
    sql_spec: &SqlSpec,
) -> Result<PropertyMetadata, String> {
    let source = match select_entry {
        SelectEntry::Field { field, .. } => PropertySource::Field {
            field: field.name.clone(),
        },
        SelectEntry::Expression { expression, .. } => PropertySource::Expression {
            expression: expression.clone(),
        },
        SelectEntry::ParentReference {
            parent_row_object_sql,
            ..
        } => PropertySource::ParentReference {
            table: base_table(parent_row_object_sql)?,
            properties: property_metadatas(parent_row_object_sql)?,
        },
        SelectEntry::ChildCollection { collection_sql, .. } => PropertySource::ChildCollection {
            table: base_table(collection_sql)?,
            properties: property_metadatas(collection_sql)?,
            unwrapped: !collection_sql.object_wrap_properties,
        },
        SelectEntry::InlineParentProperty {
            projected_name,
            parent_alias,
            ..
        } => return inline_parent_property(sql_spec, projected_name, parent_alias),
    };

    Ok(PropertyMetadata {
        property_name: select_entry.projected_name().to_string(),
        source,
        inlined_from_ancestor_via: vec![],
    })
}

/// Follow inline parent sub-queries until the table actually providing the property is reached.
fn inline_parent_property(
    sql_spec: &SqlSpec,
    property_name: &str,
    parent_alias: &str,
) -> Result<PropertyMetadata, String> {
    let (parent_sql, join_condition) = sql_spec
        .from_entries
        .iter()
        .find_map(|from_entry| match from_entry {
            FromEntry::Query {
                query,
                alias,
                join_condition,
                ..
            } if alias == parent_alias => Some((query, join_condition)),
            _ => None,
        })
        .ok_or_else(|| format!("no inline parent sub-query with alias '{parent_alias}'"))?;

    let parent_entry = parent_sql
        .select_entries
        .iter()
        .find(|se| se.projected_name() == property_name)
        .ok_or_else(|| {
            format!("property '{property_name}' not found in inline parent '{parent_alias}'")
        })?;

    let step = ParentStep {
        parent: base_table(parent_sql)?,
        via_fk_fields: join_condition
            .matched_fields
            .iter()
            .map(|matched| matched.child_field.clone())
            .collect(),
    };

    let mut resolved = property_metadata(parent_entry, parent_sql)?;
    resolved.inlined_from_ancestor_via.insert(0, step);

    Ok(resolved)
}
