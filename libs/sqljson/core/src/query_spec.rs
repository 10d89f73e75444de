// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! User-authored query specifications.
//!
//! These types mirror the JSON format in which query specifications are written. They are
//! deserialized as-is; validation against database metadata happens during generation.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ALIAS_PLACEHOLDER: &str = "$$";

/// A group of queries sharing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryGroupSpec {
    #[serde(default)]
    pub default_schema: Option<String>,
    #[serde(default)]
    pub property_name_default: Option<PropertyNameDefault>,
    /// Tables in these schemas are written without schema qualification in generated SQL
    #[serde(default)]
    pub generate_unqualified_names_for_schemas: Vec<String>,
    pub query_specs: Vec<QuerySpec>,
}

impl QueryGroupSpec {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    pub query_name: String,
    pub table_json: TableJsonSpec,
    #[serde(default)]
    pub result_representations: Option<Vec<ResultRepr>>,
    #[serde(default)]
    pub generate_result_types: Option<bool>,
    #[serde(default)]
    pub property_name_default: Option<PropertyNameDefault>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub for_update: Option<bool>,
    #[serde(default)]
    pub additional_object_property_columns: Vec<AdditionalObjectPropertyColumn>,
    #[serde(default)]
    pub types_file_header: Option<String>,
}

impl QuerySpec {
    /// The requested result representations, defaulting to JSON object rows.
    pub fn result_representations(&self) -> Vec<ResultRepr> {
        self.result_representations
            .clone()
            .unwrap_or_else(|| vec![ResultRepr::JsonObjectRows])
    }

    pub fn generate_result_types(&self) -> bool {
        self.generate_result_types.unwrap_or(true)
    }

    pub fn for_update(&self) -> bool {
        self.for_update.unwrap_or(false)
    }

    /// Names of the parameters used by record conditions anywhere in the query.
    pub fn param_names(&self) -> Vec<String> {
        let mut names = vec![];
        self.table_json.collect_param_names(&mut names);
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultRepr {
    /// One row per record with one column per property, no JSON wrapping
    MultiColumnRows,
    /// One JSON object per record
    JsonObjectRows,
    /// A single row holding a JSON array of all records
    JsonArrayRow,
}

impl Display for ResultRepr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResultRepr::MultiColumnRows => "MULTI_COLUMN_ROWS",
            ResultRepr::JsonObjectRows => "JSON_OBJECT_ROWS",
            ResultRepr::JsonArrayRow => "JSON_ARRAY_ROW",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyNameDefault {
    AsInDb,
    Camelcase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalObjectPropertyColumn {
    Property(String),
    Aliased {
        property: String,
        #[serde(rename = "as")]
        alias: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableJsonSpec {
    pub table: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub field_expressions: Vec<FieldExpr>,
    #[serde(default)]
    pub parent_tables: Vec<ParentSpec>,
    #[serde(default)]
    pub child_tables: Vec<ChildSpec>,
    #[serde(default)]
    pub record_condition: Option<RecordCondition>,
    #[serde(default)]
    pub result_type_name: Option<String>,
}

impl TableJsonSpec {
    /// Parents whose properties are flattened into this table's rows.
    pub fn inline_parents(&self) -> impl Iterator<Item = &ParentSpec> {
        self.parent_tables.iter().filter(|p| p.reference_name.is_none())
    }

    /// Parents represented as nested objects.
    pub fn referenced_parents(&self) -> impl Iterator<Item = &ParentSpec> {
        self.parent_tables.iter().filter(|p| p.reference_name.is_some())
    }

    fn collect_param_names(&self, names: &mut Vec<String>) {
        for child in &self.child_tables {
            child.table_json.collect_param_names(names);
        }
        for parent in &self.parent_tables {
            parent.table_json.collect_param_names(names);
        }
        if let Some(cond) = &self.record_condition {
            names.extend(cond.param_names.iter().cloned());
        }
    }
}

/// An entry of `fieldExpressions`: either a bare field name or a detailed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldExpr {
    Name(String),
    Detailed(TableFieldExpr),
}

impl From<&str> for FieldExpr {
    fn from(name: &str) -> Self {
        FieldExpr::Name(name.to_string())
    }
}

impl FieldExpr {
    pub fn display_order(&self) -> Option<u32> {
        match self {
            FieldExpr::Name(_) => None,
            FieldExpr::Detailed(tfe) => tfe.display_order,
        }
    }
}

/// Exactly one of `field` or `expression` must be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFieldExpr {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub json_property: Option<String>,
    #[serde(default)]
    pub field_type_in_generated_source: Option<GeneratedFieldType>,
    /// Placeholder in `expression` to be replaced by the table alias (`$$` by default)
    #[serde(default)]
    pub with_table_alias_as: Option<String>,
    #[serde(default)]
    pub display_order: Option<u32>,
}

/// A declared source-code type, either for all target languages or per language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedFieldType {
    Uniform(String),
    PerLanguage(BTreeMap<SourceLanguage, String>),
}

impl GeneratedFieldType {
    pub fn for_language(&self, language: SourceLanguage) -> Option<&str> {
        match self {
            GeneratedFieldType::Uniform(type_name) => Some(type_name),
            GeneratedFieldType::PerLanguage(types) => types.get(&language).map(|t| t.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceLanguage {
    #[serde(rename = "TS")]
    TypeScript,
    Java,
}

impl Display for SourceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLanguage::TypeScript => write!(f, "TS"),
            SourceLanguage::Java => write!(f, "Java"),
        }
    }
}

/// A literal SQL condition on the records of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCondition {
    pub sql: String,
    #[serde(default)]
    pub param_names: Vec<String>,
    #[serde(default)]
    pub with_table_alias_as: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSpec {
    #[serde(flatten)]
    pub table_json: TableJsonSpec,
    /// Present for a referenced parent (nested object), absent for an inline parent
    #[serde(default)]
    pub reference_name: Option<String>,
    #[serde(default)]
    pub via_foreign_key_fields: Option<Vec<String>>,
    #[serde(default)]
    pub custom_match_condition: Option<CustomMatchCondition>,
    /// Alias of the sub-query joined for an inline parent
    #[serde(default)]
    pub subquery_alias: Option<String>,
    #[serde(default)]
    pub display_order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSpec {
    #[serde(flatten)]
    pub table_json: TableJsonSpec,
    pub collection_name: String,
    #[serde(default)]
    pub foreign_key_fields: Option<Vec<String>>,
    #[serde(default)]
    pub custom_match_condition: Option<CustomMatchCondition>,
    /// Condition on the child records (`$$` stands for the child table alias)
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub unwrap: Option<bool>,
    /// Ordering of the collection elements (`$$` stands for the child rows)
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub display_order: Option<u32>,
}

impl ChildSpec {
    pub fn unwrap(&self) -> bool {
        self.unwrap.unwrap_or(false)
    }
}

/// A match condition between child and parent given explicitly instead of via a foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMatchCondition {
    pub equated_fields: Vec<EquatedFields>,
    /// Whether every child row is known to have a matching parent row
    #[serde(default)]
    pub match_always_exists: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquatedFields {
    pub child_field: String,
    pub parent_primary_key_field: String,
}
