// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identity of a relation (table or view).
///
/// Names are held in their exact stored form (without quotes), so two ids are equal exactly when
/// they denote the same relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl RelId {
    pub fn new(name: impl Into<String>, schema: Option<&str>) -> Self {
        Self {
            schema: schema.map(|s| s.to_string()),
            name: name.into(),
        }
    }
}

impl Display for RelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelType {
    Table,
    View,
    Unknown,
}

/// A column of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub database_type: String,
    /// `None` when the database did not report nullability
    #[serde(default)]
    pub nullable: Option<bool>,
    /// 1-based position within the primary key, if the field is part of it
    #[serde(default)]
    pub primary_key_part_number: Option<u32>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub precision_radix: Option<u32>,
    #[serde(default)]
    pub fractional_digits: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelMetadata {
    #[serde(rename = "relationId")]
    pub rel_id: RelId,
    #[serde(rename = "relationType")]
    pub rel_type: RelType,
    pub fields: Vec<Field>,
}

impl RelMetadata {
    /// Look up a field by its exact stored name.
    pub fn field(&self, exact_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == exact_name)
    }

    /// Primary key fields in key order.
    pub fn primary_key_fields(&self) -> Vec<&Field> {
        let mut pk_fields: Vec<&Field> = self
            .fields
            .iter()
            .filter(|f| f.primary_key_part_number.is_some())
            .collect();
        pk_fields.sort_by_key(|f| f.primary_key_part_number);
        pk_fields
    }
}
