// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::LazyLock;

use regex::Regex;

use super::{SqlDialect, is_keyword, is_simple_identifier, string_literal};
use crate::{SqlBuilder, SqlEmitError};

static UPPER_CASE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").unwrap());

pub struct OracleDialect;

impl OracleDialect {
    fn quote_if_needed(&self, name: &str) -> String {
        if self.is_quoted(name)
            || (is_simple_identifier(name)
                && UPPER_CASE_IDENTIFIER.is_match(name)
                && !is_keyword(name))
        {
            name.to_string()
        } else {
            format!("\"{name}\"")
        }
    }

    fn push_order_by(order_by: Option<&str>, builder: &mut SqlBuilder) {
        if let Some(order_by) = order_by {
            builder.push_str(" order by ");
            builder.push_str(order_by);
        }
    }
}

impl SqlDialect for OracleDialect {
    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn build_row_object(
        &self,
        property_names: &[&str],
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        builder.push_str("json_object(\n");
        builder.push_indented(|builder| {
            builder.push_iter(property_names.iter(), ",\n", |builder, property_name| {
                builder.push_str(string_literal(property_name));
                builder.push_str(" value ");
                builder.push_str(source_alias);
                builder.push('.');
                builder.push_str(self.quote_column_name_if_needed(property_name));
                Ok::<_, SqlEmitError>(())
            })?;
            builder.push_str("\nreturning clob");
            Ok::<_, SqlEmitError>(())
        })?;
        builder.push_str("\n)");
        Ok(())
    }

    fn build_aggregated_row_objects(
        &self,
        property_names: &[&str],
        order_by: Option<&str>,
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        builder.push_str("treat(coalesce(json_arrayagg(");
        self.build_row_object(property_names, source_alias, builder)?;
        Self::push_order_by(order_by, builder);
        builder.push_str(" returning clob), to_clob('[]')) as json)");
        Ok(())
    }

    fn build_aggregated_column_values(
        &self,
        property_name: &str,
        order_by: Option<&str>,
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        builder.push_str("treat(coalesce(json_arrayagg(");
        builder.push_str(source_alias);
        builder.push('.');
        builder.push_str(self.quote_column_name_if_needed(property_name));
        Self::push_order_by(order_by, builder);
        builder.push_str(" returning clob), to_clob('[]')) as json)");
        Ok(())
    }

    fn quote_object_name_if_needed(&self, name: &str) -> String {
        self.quote_if_needed(name)
    }

    fn quote_column_name_if_needed(&self, name: &str) -> String {
        self.quote_if_needed(name)
    }

    fn is_quoted(&self, name: &str) -> bool {
        sqljson_dbmd::is_quoted(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        let dialect = OracleDialect;
        assert_eq!(dialect.quote_column_name_if_needed("DRUG_NAME"), "DRUG_NAME");
        assert_eq!(dialect.quote_column_name_if_needed("drugName"), "\"drugName\"");
        assert_eq!(dialect.quote_object_name_if_needed("USER"), "\"USER\"");
    }

    #[test]
    fn row_object() {
        let mut builder = SqlBuilder::new(2);
        OracleDialect
            .build_row_object(&["ID", "drugName"], "q", &mut builder)
            .unwrap();
        assert_eq!(
            builder.into_sql(),
            "json_object(\n  'ID' value q.ID,\n  'drugName' value q.\"drugName\"\n  returning clob\n)"
        );
    }
}
