// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::RelId;

/// A foreign key constraint from a child relation to a parent relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    #[serde(default)]
    pub constraint_name: Option<String>,
    /// The child (referencing) relation
    #[serde(rename = "foreignKeyRelationId")]
    pub child_rel_id: RelId,
    /// The parent (referenced) relation
    #[serde(rename = "primaryKeyRelationId")]
    pub parent_rel_id: RelId,
    /// Column pairs in constraint order
    #[serde(rename = "foreignKeyComponents")]
    pub components: Vec<ForeignKeyComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyComponent {
    pub foreign_key_field_name: String,
    pub primary_key_field_name: String,
}

impl ForeignKey {
    pub fn child_field_names(&self) -> impl Iterator<Item = &str> {
        self.components
            .iter()
            .map(|c| c.foreign_key_field_name.as_str())
    }

    /// Whether the set of child field names of this key is exactly the given set.
    pub fn has_child_field_names(&self, exact_field_names: &BTreeSet<String>) -> bool {
        self.components.len() == exact_field_names.len()
            && self
                .child_field_names()
                .all(|name| exact_field_names.contains(name))
    }
}
