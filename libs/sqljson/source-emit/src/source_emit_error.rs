// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sqljson_core::SourceLanguage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceEmitError {
    #[error("Unsupported database type '{database_type}' for field '{field}'")]
    UnsupportedDatabaseType { field: String, database_type: String },

    #[error("No {language} type is specified for property '{property}'")]
    MissingTypeForLanguage {
        property: String,
        language: SourceLanguage,
    },

    #[error("A generated source type is required for expression property '{property}'")]
    MissingGeneratedType { property: String },

    #[error("No declared result type for a property referring to table '{table}'")]
    UnnamedResultType { table: String },

    #[error(
        "An unwrapped result type of table '{table}' must have exactly one property, found {property_count}"
    )]
    InvalidUnwrappedType {
        table: String,
        property_count: usize,
    },
}
