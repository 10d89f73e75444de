// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    CaseSensitivity, DatabaseMetadataError, Field, ForeignKey, RelId, RelMetadata,
    exact_unquoted_name, split_schema_and_relation_names,
};

/// Metadata in the form it is stored (as JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDatabaseMetadata {
    pub dbms_name: String,
    pub dbms_version: String,
    pub case_sensitivity: CaseSensitivity,
    pub relation_metadatas: Vec<RelMetadata>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// An immutable, indexed snapshot of database metadata.
#[derive(Debug, Clone)]
pub struct DatabaseMetadata {
    stored: StoredDatabaseMetadata,
    relations_by_id: HashMap<RelId, usize>,
    fks_by_child: HashMap<RelId, Vec<usize>>,
}

impl DatabaseMetadata {
    pub fn new(stored: StoredDatabaseMetadata) -> Self {
        let relations_by_id = stored
            .relation_metadatas
            .iter()
            .enumerate()
            .map(|(ix, rel)| (rel.rel_id.clone(), ix))
            .collect();

        let mut fks_by_child: HashMap<RelId, Vec<usize>> = HashMap::new();
        for (ix, fk) in stored.foreign_keys.iter().enumerate() {
            fks_by_child
                .entry(fk.child_rel_id.clone())
                .or_default()
                .push(ix);
        }

        Self {
            stored,
            relations_by_id,
            fks_by_child,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DatabaseMetadataError> {
        let stored: StoredDatabaseMetadata = serde_json::from_str(json)?;

        debug!(
            dbms = %stored.dbms_name,
            relations = stored.relation_metadatas.len(),
            foreign_keys = stored.foreign_keys.len(),
            "Loaded database metadata"
        );

        Ok(Self::new(stored))
    }

    pub fn dbms_name(&self) -> &str {
        &self.stored.dbms_name
    }

    pub fn dbms_version(&self) -> &str {
        &self.stored.dbms_version
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.stored.case_sensitivity
    }

    pub fn relation_metadatas(&self) -> &[RelMetadata] {
        &self.stored.relation_metadatas
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.stored.foreign_keys
    }

    /// Convert a user-supplied name to its exact stored form under this database's case policy.
    pub fn exact_name(&self, name: &str) -> String {
        exact_unquoted_name(name, self.stored.case_sensitivity)
    }

    /// Make a relation id from a possibly qualified (and possibly quoted) table name. An
    /// unqualified name takes the default schema when one is given.
    pub fn make_rel_id(
        &self,
        table: &str,
        default_schema: Option<&str>,
    ) -> Result<RelId, DatabaseMetadataError> {
        let (schema, name) = split_schema_and_relation_names(table)
            .ok_or_else(|| DatabaseMetadataError::InvalidTableName(table.to_string()))?;

        let schema = schema.or(default_schema).map(|s| self.exact_name(s));

        Ok(RelId {
            schema,
            name: self.exact_name(name),
        })
    }

    pub fn relation_metadata(&self, rel_id: &RelId) -> Option<&RelMetadata> {
        self.relations_by_id
            .get(rel_id)
            .map(|ix| &self.stored.relation_metadatas[*ix])
    }

    /// Look up a field by a user-supplied name, applying case normalization (or quote removal).
    pub fn field<'a>(&self, rel: &'a RelMetadata, field_name: &str) -> Option<&'a Field> {
        rel.field(&self.exact_name(field_name))
    }

    /// Primary key field names of the relation, in key order.
    pub fn primary_key_field_names(
        &self,
        rel_id: &RelId,
    ) -> Result<Vec<&str>, DatabaseMetadataError> {
        let rel = self
            .relation_metadata(rel_id)
            .ok_or_else(|| DatabaseMetadataError::RelationNotFound(rel_id.clone()))?;

        Ok(rel
            .primary_key_fields()
            .into_iter()
            .map(|f| f.name.as_str())
            .collect())
    }

    /// All foreign keys from the child relation to the parent relation.
    pub fn foreign_keys_from_to<'s>(
        &'s self,
        child: &RelId,
        parent: &RelId,
    ) -> impl Iterator<Item = &'s ForeignKey> {
        self.fks_by_child
            .get(child)
            .into_iter()
            .flatten()
            .map(|ix| &self.stored.foreign_keys[*ix])
            .filter(move |fk| &fk.parent_rel_id == parent)
    }

    /// The single foreign key from child to parent, optionally restricted to the key whose child
    /// field names are exactly `field_names` (compared after case normalization).
    ///
    /// Returns `Ok(None)` when no key qualifies and an error when more than one does.
    pub fn foreign_key_from_to(
        &self,
        child: &RelId,
        parent: &RelId,
        field_names: Option<&[String]>,
    ) -> Result<Option<&ForeignKey>, DatabaseMetadataError> {
        let exact_field_names: Option<BTreeSet<String>> =
            field_names.map(|names| names.iter().map(|n| self.exact_name(n)).collect());

        let mut matching = self.foreign_keys_from_to(child, parent).filter(|fk| {
            exact_field_names
                .as_ref()
                .is_none_or(|names| fk.has_child_field_names(names))
        });

        let found = matching.next();

        if matching.next().is_some() {
            return Err(DatabaseMetadataError::AmbiguousForeignKey {
                child: child.clone(),
                parent: parent.clone(),
                fields_specified: field_names.is_some(),
            });
        }

        Ok(found)
    }
}
