// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeSet, HashMap};

use sqljson_dbmd::RelId;
use tracing::debug;

use crate::{
    ResultTypeSpec, SpecError, SpecErrorKind, SpecLocation,
    naming::{make_name_not_in_set, upper_camel_case},
};

/// Declared result types with their assigned names.
///
/// Structurally equal result types are one declaration and share one name. Each distinct type
/// is named by its explicit `resultTypeName`, else by its table name in upper camel case, made
/// unique with a numeric suffix in discovery order (`Drug`, `Drug_1`, ...). An explicit name
/// may not be given to two structurally different types.
#[derive(Debug, Clone, Default)]
pub struct NamedResultTypes {
    /// One representative per distinct type, in discovery order
    types: Vec<(String, ResultTypeSpec)>,
    buckets: HashMap<BucketKey, Vec<usize>>,
}

/// A cheap first-pass key: equal types always share a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BucketKey {
    table: RelId,
    field_count: usize,
    expression_count: usize,
    parent_reference_count: usize,
    child_collection_count: usize,
}

impl BucketKey {
    fn of(result_type: &ResultTypeSpec) -> Self {
        Self {
            table: result_type.table.clone(),
            field_count: result_type.table_field_properties().count(),
            expression_count: result_type.table_expression_properties().count(),
            parent_reference_count: result_type.parent_reference_properties().count(),
            child_collection_count: result_type.child_collection_properties().count(),
        }
    }
}

impl NamedResultTypes {
    pub fn assign(result_types: &[ResultTypeSpec], query_name: &str) -> Result<Self, SpecError> {
        let mut taken_names: BTreeSet<String> = result_types
            .iter()
            .filter_map(|rt| rt.result_type_name.clone())
            .collect();

        let mut named = Self::default();

        for result_type in result_types {
            if let Some(existing) = named.name_of(result_type) {
                debug!(name = existing, "Deduplicated result type");
                continue;
            }

            let name = match &result_type.result_type_name {
                Some(name) if named.types.iter().any(|(existing, _)| existing == name) => {
                    debug!(name, table = %result_type.table, "Result type name already declared");
                    return Err(SpecError::new(
                        SpecLocation::new(query_name),
                        SpecErrorKind::ConflictingResultTypeName { name: name.clone() },
                    ));
                }
                Some(name) => name.clone(),
                None => make_name_not_in_set(
                    &upper_camel_case(&result_type.table.name),
                    &taken_names,
                    "_",
                ),
            };
            taken_names.insert(name.clone());

            named
                .buckets
                .entry(BucketKey::of(result_type))
                .or_default()
                .push(named.types.len());
            named.types.push((name, result_type.clone()));
        }

        Ok(named)
    }

    /// The name of the declaration structurally equal to `result_type`, if there is one.
    pub fn name_of(&self, result_type: &ResultTypeSpec) -> Option<&str> {
        self.buckets
            .get(&BucketKey::of(result_type))?
            .iter()
            .map(|ix| &self.types[*ix])
            .find(|(_, representative)| representative == result_type)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultTypeSpec)> {
        self.types
            .iter()
            .map(|(name, result_type)| (name.as_str(), result_type))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
