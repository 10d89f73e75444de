// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Classification of database field types for the built-in source type mapping.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseTypeCategory {
    /// Integers of at most 32 bits
    Integer,
    /// 64-bit integers
    BigInteger,
    /// Numerics with declared precision and scale
    ArbitraryPrecision,
    FloatingPoint,
    /// Character data, and temporal values carried as text
    Text,
    Boolean,
    Json,
}

const DATABASE_TYPE_CATEGORIES: &[(&str, DatabaseTypeCategory)] = &[
    ("int", DatabaseTypeCategory::Integer),
    ("int2", DatabaseTypeCategory::Integer),
    ("int4", DatabaseTypeCategory::Integer),
    ("integer", DatabaseTypeCategory::Integer),
    ("smallint", DatabaseTypeCategory::Integer),
    ("int8", DatabaseTypeCategory::BigInteger),
    ("bigint", DatabaseTypeCategory::BigInteger),
    ("numeric", DatabaseTypeCategory::ArbitraryPrecision),
    ("decimal", DatabaseTypeCategory::ArbitraryPrecision),
    ("number", DatabaseTypeCategory::ArbitraryPrecision),
    ("float", DatabaseTypeCategory::FloatingPoint),
    ("float4", DatabaseTypeCategory::FloatingPoint),
    ("float8", DatabaseTypeCategory::FloatingPoint),
    ("real", DatabaseTypeCategory::FloatingPoint),
    ("double", DatabaseTypeCategory::FloatingPoint),
    ("double precision", DatabaseTypeCategory::FloatingPoint),
    ("varchar", DatabaseTypeCategory::Text),
    ("varchar2", DatabaseTypeCategory::Text),
    ("text", DatabaseTypeCategory::Text),
    ("char", DatabaseTypeCategory::Text),
    ("bpchar", DatabaseTypeCategory::Text),
    ("clob", DatabaseTypeCategory::Text),
    ("longvarchar", DatabaseTypeCategory::Text),
    ("date", DatabaseTypeCategory::Text),
    ("time", DatabaseTypeCategory::Text),
    ("bit", DatabaseTypeCategory::Boolean),
    ("bool", DatabaseTypeCategory::Boolean),
    ("boolean", DatabaseTypeCategory::Boolean),
    ("json", DatabaseTypeCategory::Json),
    ("jsonb", DatabaseTypeCategory::Json),
];

/// The category of a database type name, compared case-insensitively. All `timestamp` variants
/// are text.
pub fn database_type_category(database_type: &str) -> Option<DatabaseTypeCategory> {
    let lower_type = database_type.to_lowercase();

    DATABASE_TYPE_CATEGORIES
        .iter()
        .find(|(type_name, _)| *type_name == lower_type)
        .map(|(_, category)| *category)
        .or_else(|| {
            lower_type
                .starts_with("timestamp")
                .then_some(DatabaseTypeCategory::Text)
        })
}
