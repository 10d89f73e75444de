// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Dialect-neutral description of a generated SQL query.

use sqljson_dbmd::{Field, RelId};

use crate::{AdditionalObjectPropertyColumn, GeneratedFieldType, MatchedField};

#[derive(Debug, Clone, PartialEq)]
pub struct SqlSpec {
    /// Property entries, in display order
    pub select_entries: Vec<SelectEntry>,
    /// Primary key columns exported for the join condition of an enclosing query; never properties
    pub hidden_primary_keys: Vec<HiddenPrimaryKey>,
    /// The base table first, followed by any joined inline parent sub-queries
    pub from_entries: Vec<FromEntry>,
    pub where_entries: Vec<WhereEntry>,
    pub order_by: Option<OrderBy>,
    pub for_update: bool,
    /// Whether rows are represented as JSON objects
    pub object_wrap_properties: bool,
    /// Whether all rows are aggregated into a single JSON array
    pub aggregate_to_array: bool,
    pub additional_object_property_columns: Vec<AdditionalObjectPropertyColumn>,
    pub result_type_name: Option<String>,
    pub from_entries_leading_comment: Option<String>,
}

impl SqlSpec {
    pub fn base_table(&self) -> Option<&RelId> {
        self.from_entries.iter().find_map(|from_entry| match from_entry {
            FromEntry::Table { table, .. } => Some(table),
            FromEntry::Query { .. } => None,
        })
    }

    pub fn projected_names(&self) -> impl Iterator<Item = &str> {
        self.select_entries.iter().map(|se| se.projected_name())
    }

    pub fn hidden_export_name(&self, field_name: &str) -> Option<&str> {
        self.hidden_primary_keys
            .iter()
            .find(|hidden| hidden.field_name == field_name)
            .map(|hidden| hidden.export_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectEntry {
    Field {
        field: Field,
        projected_name: String,
        table_alias: String,
        display_order: Option<u32>,
        generated_type: Option<GeneratedFieldType>,
    },
    Expression {
        expression: String,
        alias_placeholder: String,
        projected_name: String,
        table_alias: String,
        display_order: Option<u32>,
        generated_type: Option<GeneratedFieldType>,
    },
    /// A property of an inline parent, selected from the parent's joined sub-query
    InlineParentProperty {
        projected_name: String,
        parent_alias: String,
        parent_table: RelId,
        comment: Option<String>,
        display_order: Option<u32>,
    },
    /// A JSON object for the parent row, as a correlated sub-query
    ParentReference {
        projected_name: String,
        parent_row_object_sql: Box<SqlSpec>,
        comment: Option<String>,
        display_order: Option<u32>,
    },
    /// A JSON array of the child rows, as a correlated sub-query
    ChildCollection {
        projected_name: String,
        collection_sql: Box<SqlSpec>,
        comment: Option<String>,
        display_order: Option<u32>,
    },
}

impl SelectEntry {
    pub fn projected_name(&self) -> &str {
        match self {
            SelectEntry::Field { projected_name, .. }
            | SelectEntry::Expression { projected_name, .. }
            | SelectEntry::InlineParentProperty { projected_name, .. }
            | SelectEntry::ParentReference { projected_name, .. }
            | SelectEntry::ChildCollection { projected_name, .. } => projected_name,
        }
    }

    pub fn display_order(&self) -> Option<u32> {
        match self {
            SelectEntry::Field { display_order, .. }
            | SelectEntry::Expression { display_order, .. }
            | SelectEntry::InlineParentProperty { display_order, .. }
            | SelectEntry::ParentReference { display_order, .. }
            | SelectEntry::ChildCollection { display_order, .. } => *display_order,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            SelectEntry::Field { .. } | SelectEntry::Expression { .. } => None,
            SelectEntry::InlineParentProperty { comment, .. }
            | SelectEntry::ParentReference { comment, .. }
            | SelectEntry::ChildCollection { comment, .. } => comment.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenPrimaryKey {
    pub field_name: String,
    pub table_alias: String,
    pub export_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromEntry {
    Table {
        table: RelId,
        alias: String,
    },
    /// A sub-query left-joined to the entries before it
    Query {
        query: Box<SqlSpec>,
        alias: String,
        join_condition: ParentChildCondition,
        comment: Option<String>,
    },
}

impl FromEntry {
    pub fn alias(&self) -> &str {
        match self {
            FromEntry::Table { alias, .. } | FromEntry::Query { alias, .. } => alias,
        }
    }
}

/// Equality of the matched fields of a child row and a parent row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentChildCondition {
    pub parent_alias: String,
    pub child_alias: String,
    pub matched_fields: Vec<MatchedField>,
    pub match_must_exist: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereEntry {
    /// A literal condition in which `alias_placeholder` stands for `table_alias`
    Condition {
        sql: String,
        alias_placeholder: String,
        table_alias: String,
    },
    ParentChild(ParentChildCondition),
}

/// A literal ordering in which the alias placeholder stands for the table's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub order_by: String,
    pub table_alias: String,
}
