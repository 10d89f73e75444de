// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{SqlDialect, is_keyword, is_simple_identifier, string_literal};
use crate::{SqlBuilder, SqlEmitError};

pub struct MySqlDialect;

impl MySqlDialect {
    fn quote_if_needed(&self, name: &str) -> String {
        if self.is_quoted(name) {
            name.to_string()
        } else if sqljson_dbmd::is_quoted(name) {
            // Standard double quotes become backticks
            format!("`{}`", &name[1..name.len() - 1])
        } else if !is_simple_identifier(name) || is_keyword(name) {
            format!("`{name}`")
        } else {
            name.to_string()
        }
    }

    fn reject_ordering(&self, order_by: Option<&str>) -> Result<(), SqlEmitError> {
        match order_by {
            Some(_) => Err(SqlEmitError::AggregateOrderingUnsupported {
                dialect: self.name(),
            }),
            None => Ok(()),
        }
    }
}

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "MySQL"
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
        self.reject_ordering(order_by)?;

        builder.push_str("cast(coalesce(json_arrayagg(");
        self.build_row_object(property_names, source_alias, builder)?;
        builder.push_str("), json_array()) as json)");
        Ok(())
    }

    fn build_aggregated_column_values(
        &self,
        property_name: &str,
        order_by: Option<&str>,
        source_alias: &str,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        self.reject_ordering(order_by)?;

        builder.push_str("cast(coalesce(json_arrayagg(");
        builder.push_str(source_alias);
        builder.push('.');
        builder.push_str(self.quote_column_name_if_needed(property_name));
        builder.push_str("), json_array()) as json)");
        Ok(())
    }

    fn quote_object_name_if_needed(&self, name: &str) -> String {
        self.quote_if_needed(name)
    }

    fn quote_column_name_if_needed(&self, name: &str) -> String {
        self.quote_if_needed(name)
    }

    fn is_quoted(&self, name: &str) -> bool {
        name.len() >= 2 && name.starts_with('`') && name.ends_with('`')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        let dialect = MySqlDialect;
        assert_eq!(dialect.quote_column_name_if_needed("drugName"), "drugName");
        assert_eq!(dialect.quote_column_name_if_needed("\"drug name\""), "`drug name`");
        assert_eq!(dialect.quote_column_name_if_needed("`x`"), "`x`");
        assert_eq!(dialect.quote_object_name_if_needed("order"), "`order`");
    }

    #[test]
    fn aggregate_ordering_is_rejected() {
        let mut builder = SqlBuilder::new(2);
        assert_eq!(
            MySqlDialect.build_aggregated_column_values("name", Some("q.name"), "q", &mut builder),
            Err(SqlEmitError::AggregateOrderingUnsupported { dialect: "MySQL" })
        );
    }

    #[test]
    fn aggregated_column_values() {
        let mut builder = SqlBuilder::new(2);
        MySqlDialect
            .build_aggregated_column_values("name", None, "q", &mut builder)
            .unwrap();
        assert_eq!(
            builder.into_sql(),
            "cast(coalesce(json_arrayagg(q.name), json_array()) as json)"
        );
    }
}
