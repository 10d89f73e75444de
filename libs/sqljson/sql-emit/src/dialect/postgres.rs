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

use super::{SqlDialect, is_keyword, string_literal};
use crate::{SqlBuilder, SqlEmitError};

static LOWER_CASE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

pub struct PostgresDialect;

impl PostgresDialect {
    fn needs_quotes(name: &str) -> bool {
        !LOWER_CASE_IDENTIFIER.is_match(name) || is_keyword(name)
    }

    fn quote_if_needed(&self, name: &str) -> String {
        if self.is_quoted(name) || !Self::needs_quotes(name) {
            name.to_string()
        } else {
            format!("\"{name}\"")
        }
    }
}

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn build_row_object(
        &self,
        property_names: &[&str],
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        builder.push_str("jsonb_build_object(\n");
        builder.push_indented(|builder| {
            builder.push_iter(property_names.iter(), ",\n", |builder, property_name| {
                builder.push_str(string_literal(property_name));
                builder.push_str(", ");
                builder.push_str(source_alias);
                builder.push('.');
                builder.push_str(self.quote_column_name_if_needed(property_name));
                Ok::<_, SqlEmitError>(())
            })
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
        builder.push_str("coalesce(jsonb_agg(");
        self.build_row_object(property_names, source_alias, builder)?;
        if let Some(order_by) = order_by {
            builder.push_str(" order by ");
            builder.push_str(order_by);
        }
        builder.push_str("),'[]'::jsonb)");
        Ok(())
    }

    fn build_aggregated_column_values(
        &self,
        property_name: &str,
        order_by: Option<&str>,
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        builder.push_str("coalesce(jsonb_agg(");
        builder.push_str(source_alias);
        builder.push('.');
        builder.push_str(self.quote_column_name_if_needed(property_name));
        if let Some(order_by) = order_by {
            builder.push_str(" order by ");
            builder.push_str(order_by);
        }
        builder.push_str("),'[]'::jsonb)");
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
        let dialect = PostgresDialect;
        assert_eq!(dialect.quote_column_name_if_needed("drug_name"), "drug_name");
        assert_eq!(dialect.quote_column_name_if_needed("drugName"), "\"drugName\"");
        assert_eq!(dialect.quote_column_name_if_needed("\"drugName\""), "\"drugName\"");
        assert_eq!(dialect.quote_column_name_if_needed("2x"), "\"2x\"");
        assert_eq!(dialect.quote_column_name_if_needed("_id"), "_id");
        assert_eq!(dialect.quote_object_name_if_needed("user"), "\"user\"");
        assert_eq!(dialect.quote_object_name_if_needed("drugs"), "drugs");
    }

    #[test]
    fn aggregates() {
        let dialect = PostgresDialect;

        let mut builder = SqlBuilder::new(2);
        dialect
            .build_aggregated_row_objects(&["id", "drugName"], Some("q.id"), "q", &mut builder)
            .unwrap();
        assert_eq!(
            builder.into_sql(),
            "coalesce(jsonb_agg(jsonb_build_object(\n  'id', q.id,\n  'drugName', q.\"drugName\"\n) order by q.id),'[]'::jsonb)"
        );

        let mut builder = SqlBuilder::new(2);
        dialect
            .build_aggregated_column_values("name", None, "q", &mut builder)
            .unwrap();
        assert_eq!(builder.into_sql(), "coalesce(jsonb_agg(q.name),'[]'::jsonb)");
    }
}
