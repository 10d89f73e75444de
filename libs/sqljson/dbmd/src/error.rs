// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use crate::RelId;

#[derive(Error, Debug)]
pub enum DatabaseMetadataError {
    #[error("Invalid database metadata: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    #[error("Relation metadata not found for relation '{0}'")]
    RelationNotFound(RelId),

    #[error(
        "Multiple foreign key constraints exist from table {child} to table {parent} {}",
        disambiguation_note(.fields_specified)
    )]
    AmbiguousForeignKey {
        child: RelId,
        parent: RelId,
        fields_specified: bool,
    },
}

fn disambiguation_note(fields_specified: &bool) -> &'static str {
    if *fields_specified {
        "with the same specified foreign key fields"
    } else {
        "and no foreign key fields were specified to disambiguate"
    }
}
