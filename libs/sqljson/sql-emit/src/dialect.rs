// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! JSON construction and identifier quoting rules of the supported databases.

mod mysql;
mod oracle;
mod postgres;

use std::sync::LazyLock;

use regex::Regex;

use crate::{SqlBuilder, SqlEmitError};

pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;

pub trait SqlDialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// A JSON object with one entry per property, each valued by the like-named column of
    /// `source_alias`.
    fn build_row_object(
        &self,
        property_names: &[&str],
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError>;

    /// A JSON array of row objects of all rows of `source_alias`, empty when there are no rows.
    fn build_aggregated_row_objects(
        &self,
        property_names: &[&str],
        order_by: Option<&str>,
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError>;

    /// A JSON array of the values of a single column of all rows of `source_alias`, empty when
    /// there are no rows.
    fn build_aggregated_column_values(
        &self,
        property_name: &str,
        order_by: Option<&str>,
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError>;

    /// Quote a schema or table name when the database would not resolve it as written.
    fn quote_object_name_if_needed(&self, name: &str) -> String;

    /// Quote a column name or column alias when the database would not resolve it as written.
    fn quote_column_name_if_needed(&self, name: &str) -> String;

    fn is_quoted(&self, name: &str) -> bool;
}

/// The dialect for a database product name as reported in database metadata.
pub fn dialect_for_dbms(dbms_name: &str) -> Result<Box<dyn SqlDialect>, SqlEmitError> {
    let lower_name = dbms_name.to_lowercase();

    if lower_name.starts_with("postgres") {
        Ok(Box::new(PostgresDialect))
    } else if lower_name.starts_with("oracle") {
        Ok(Box::new(OracleDialect))
    } else if lower_name.starts_with("mysql") {
        Ok(Box::new(MySqlDialect))
    } else {
        Err(SqlEmitError::UnsupportedDbms(dbms_name.to_string()))
    }
}

static SIMPLE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap());

const KEYWORDS: [&str; 9] = [
    "select", "from", "where", "user", "order", "group", "by", "over", "is",
];

fn is_simple_identifier(name: &str) -> bool {
    SIMPLE_IDENTIFIER.is_match(name)
}

fn is_keyword(name: &str) -> bool {
    let lower_name = name.to_lowercase();
    KEYWORDS.contains(&lower_name.as_str())
}

/// A string literal holding `text`.
fn string_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
