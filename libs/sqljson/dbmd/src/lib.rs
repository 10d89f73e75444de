// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Database metadata snapshot consumed by the query generators.
//!
//! The metadata is produced elsewhere (typically by introspecting a live database) and stored as
//! JSON. It is loaded once with [`DatabaseMetadata::from_json`] and never mutated afterwards, so a
//! single instance may be shared by any number of concurrent compilations.

mod database_metadata;
mod error;
mod foreign_key;
mod names;
mod relation;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use database_metadata::{DatabaseMetadata, StoredDatabaseMetadata};
pub use error::DatabaseMetadataError;
pub use foreign_key::{ForeignKey, ForeignKeyComponent};
pub use names::{
    CaseSensitivity, case_normalize_name, exact_unquoted_name, is_quoted, split_schema_and_relation_names,
};
pub use relation::{Field, RelId, RelMetadata, RelType};
