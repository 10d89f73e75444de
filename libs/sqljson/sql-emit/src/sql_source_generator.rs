// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;

use sqljson_core::{
    AdditionalObjectPropertyColumn, FromEntry, HiddenPrimaryKey, ParentChildCondition,
    SelectEntry, SqlSpec, WhereEntry,
};
use sqljson_dbmd::{CaseSensitivity, DatabaseMetadata, RelId, exact_unquoted_name};
use tracing::{debug, instrument};

use crate::{ExpressionBuilder, SqlBuilder, SqlDialect, SqlEmitError, dialect_for_dbms};

const DEFAULT_INDENT_SPACES: usize = 2;
const WRAPPED_QUERY_ALIAS: &str = "q";
const ORDER_BY_ALIAS_PLACEHOLDER: &str = "$$";

/// Renders [`SqlSpec`]s as SQL text in one database dialect.
pub struct SqlSourceGenerator {
    dialect: Box<dyn SqlDialect>,
    /// Exact names of schemas whose tables are referenced without a schema qualifier
    unqualified_schemas: BTreeSet<String>,
    include_comments: bool,
    indent_spaces: usize,
}

impl SqlSourceGenerator {
    pub fn new(
        dialect: Box<dyn SqlDialect>,
        case_sensitivity: CaseSensitivity,
        unqualified_schemas: &[String],
    ) -> Self {
        Self {
            dialect,
            unqualified_schemas: unqualified_schemas
                .iter()
                .map(|schema| exact_unquoted_name(schema, case_sensitivity))
                .collect(),
            include_comments: true,
            indent_spaces: DEFAULT_INDENT_SPACES,
        }
    }

    /// A generator for the dialect of the database described by `dbmd`.
    pub fn for_database(
        dbmd: &DatabaseMetadata,
        unqualified_schemas: &[String],
    ) -> Result<Self, SqlEmitError> {
        Ok(Self::new(
            dialect_for_dbms(dbmd.dbms_name())?,
            dbmd.case_sensitivity(),
            unqualified_schemas,
        ))
    }

    pub fn with_comments(self, include_comments: bool) -> Self {
        Self {
            include_comments,
            ..self
        }
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    pub fn indent_spaces(&self) -> usize {
        self.indent_spaces
    }

    #[instrument(skip_all, fields(dialect = self.dialect.name()))]
    pub fn make_sql(&self, sql_spec: &SqlSpec) -> Result<String, SqlEmitError> {
        let sql = sql_spec.to_sql(self)?;
        debug!(length = sql.len(), "Generated SQL");
        Ok(sql)
    }

    fn push_comment(&self, comment: Option<&str>, builder: &mut SqlBuilder) {
        if let Some(comment) = comment.filter(|_| self.include_comments) {
            builder.push_str("-- ");
            builder.push_str(comment);
            builder.push('\n');
        }
    }

    /// The table's name, schema-qualified unless its schema is one of the unqualified schemas.
    fn minimal_relation_identifier(&self, rel_id: &RelId) -> String {
        let name = self.dialect.quote_object_name_if_needed(&rel_id.name);

        match &rel_id.schema {
            Some(schema) if !self.unqualified_schemas.contains(schema) => format!(
                "{}.{name}",
                self.dialect.quote_object_name_if_needed(schema)
            ),
            _ => name,
        }
    }

    fn table_description(sql_spec: &SqlSpec) -> &str {
        sql_spec
            .base_table()
            .map(|rel_id| rel_id.name.as_str())
            .unwrap_or_default()
    }

    /// `name`, preceded by `as` unless the quoting already delimits it.
    fn push_projected_name(&self, projected_name: &str, builder: &mut SqlBuilder) {
        let quoted_name = self.dialect.quote_column_name_if_needed(projected_name);
        builder.push_str(if self.dialect.is_quoted(&quoted_name) {
            " "
        } else {
            " as "
        });
        builder.push_str(quoted_name);
    }

    /// The spec's rows and columns, without any JSON wrapping.
    fn build_base_query(
        &self,
        sql_spec: &SqlSpec,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        let select_entries: Vec<&dyn ExpressionBuilder> = sql_spec
            .select_entries
            .iter()
            .map(|entry| entry as &dyn ExpressionBuilder)
            .chain(
                sql_spec
                    .hidden_primary_keys
                    .iter()
                    .map(|hidden| hidden as &dyn ExpressionBuilder),
            )
            .collect();

        builder.push_str("select\n");
        builder.push_indented(|builder| {
            builder.push_iter(select_entries.into_iter(), ",\n", |builder, entry| {
                entry.build(self, builder)
            })
        })?;
        builder.push('\n');

        builder.push_str("from\n");
        builder.push_indented(|builder| {
            self.push_comment(sql_spec.from_entries_leading_comment.as_deref(), builder);
            builder.push_iter(sql_spec.from_entries.iter(), "\n", |builder, from_entry| {
                from_entry.build(self, builder)
            })
        })?;
        builder.push('\n');

        if !sql_spec.where_entries.is_empty() {
            builder.push_str("where (\n");
            builder.push_indented(|builder| {
                builder.push_iter(
                    sql_spec.where_entries.iter(),
                    " and\n",
                    |builder, where_entry| where_entry.build(self, builder),
                )
            })?;
            builder.push_str("\n)\n");
        }

        if let Some(order_by) = &sql_spec.order_by {
            builder.push_str("order by ");
            builder.push_str(
                order_by
                    .order_by
                    .replace(ORDER_BY_ALIAS_PLACEHOLDER, &order_by.table_alias),
            );
            builder.push('\n');
        }

        if sql_spec.for_update {
            builder.push_str("for update\n");
        }

        Ok(())
    }

    /// `from (<base query>) q`, the source of the JSON wrapping queries.
    fn build_wrapped_base_query(
        &self,
        sql_spec: &SqlSpec,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        builder.push_str("from (\n");
        builder.push_indented(|builder| {
            if sql_spec.from_entries_leading_comment.is_none() {
                let comment = format!(
                    "base query for table '{}'",
                    Self::table_description(sql_spec)
                );
                self.push_comment(Some(comment.as_str()), builder);
            }
            self.build_base_query(sql_spec, builder)
        })?;
        builder.end_line();
        builder.push_str(") ");
        builder.push_str(WRAPPED_QUERY_ALIAS);
        Ok(())
    }

    /// One JSON object per row, followed by any additional plain columns.
    fn build_json_object_rows(
        &self,
        sql_spec: &SqlSpec,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        let property_names: Vec<&str> = sql_spec.projected_names().collect();

        builder.push_str("select\n");
        builder.push_indented(|builder| {
            let comment = format!(
                "row object for table '{}'",
                Self::table_description(sql_spec)
            );
            self.push_comment(Some(comment.as_str()), builder);
            self.dialect
                .build_row_object(&property_names, WRAPPED_QUERY_ALIAS, builder)?;
            builder.push_str(" json");

            for column in &sql_spec.additional_object_property_columns {
                builder.push_str(",\n");
                self.push_additional_column(column, builder);
            }
            Ok::<_, SqlEmitError>(())
        })?;
        builder.push('\n');

        self.build_wrapped_base_query(sql_spec, builder)?;

        if let Some(order_by) = &sql_spec.order_by {
            builder.push_str("\norder by ");
            builder.push_str(
                order_by
                    .order_by
                    .replace(ORDER_BY_ALIAS_PLACEHOLDER, WRAPPED_QUERY_ALIAS),
            );
        }

        Ok(())
    }

    fn push_additional_column(
        &self,
        column: &AdditionalObjectPropertyColumn,
        builder: &mut SqlBuilder,
    ) {
        match column {
            AdditionalObjectPropertyColumn::Property(property) => {
                builder.push_str(self.dialect.quote_column_name_if_needed(property));
            }
            AdditionalObjectPropertyColumn::Aliased { property, alias } => {
                builder.push_str(self.dialect.quote_column_name_if_needed(property));
                builder.push_str(" as ");
                builder.push_str(self.dialect.quote_column_name_if_needed(alias));
            }
        }
    }

    /// A single row holding a JSON array of all rows: objects when wrapped, otherwise the values
    /// of the single property.
    fn build_aggregate(
        &self,
        sql_spec: &SqlSpec,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        let property_names: Vec<&str> = sql_spec.projected_names().collect();
        let table = Self::table_description(sql_spec);
        let order_by = sql_spec.order_by.as_ref().map(|order_by| {
            order_by
                .order_by
                .replace(ORDER_BY_ALIAS_PLACEHOLDER, WRAPPED_QUERY_ALIAS)
        });

        builder.push_str("select\n");
        builder.push_indented(|builder| {
            if sql_spec.object_wrap_properties {
                let comment = format!("aggregated rows from table '{table}'");
                self.push_comment(Some(comment.as_str()), builder);
                self.dialect.build_aggregated_row_objects(
                    &property_names,
                    order_by.as_deref(),
                    WRAPPED_QUERY_ALIAS,
                    builder,
                )?;
            } else {
                let [property_name] = property_names.as_slice() else {
                    return Err(SqlEmitError::UnwrappedCollectionProperties {
                        table: table.to_string(),
                        property_count: property_names.len(),
                    });
                };
                let comment = format!("aggregated values from table '{table}'");
                self.push_comment(Some(comment.as_str()), builder);
                self.dialect.build_aggregated_column_values(
                    property_name,
                    order_by.as_deref(),
                    WRAPPED_QUERY_ALIAS,
                    builder,
                )?;
            }
            builder.push_str(" json");
            Ok(())
        })?;
        builder.push('\n');

        self.build_wrapped_base_query(sql_spec, builder)
    }

    /// `(<query>)`, with the query indented on the lines between the parentheses.
    fn build_subquery(
        &self,
        sql_spec: &SqlSpec,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        builder.push_str("(\n");
        builder.push_indented(|builder| sql_spec.build(self, builder))?;
        builder.end_line();
        builder.push(')');
        Ok(())
    }
}

impl ExpressionBuilder for SqlSpec {
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        if self.aggregate_to_array {
            generator.build_aggregate(self, builder)
        } else if self.object_wrap_properties {
            generator.build_json_object_rows(self, builder)
        } else {
            generator.build_base_query(self, builder)
        }
    }
}

impl ExpressionBuilder for SelectEntry {
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        generator.push_comment(self.comment(), builder);

        match self {
            SelectEntry::Field {
                field,
                projected_name,
                table_alias,
                ..
            } => {
                builder.push_str(table_alias);
                builder.push('.');
                builder.push_str(generator.dialect.quote_column_name_if_needed(&field.name));
                generator.push_projected_name(projected_name, builder);
            }
            SelectEntry::Expression {
                expression,
                alias_placeholder,
                projected_name,
                table_alias,
                ..
            } => {
                builder.push_str(expression.replace(alias_placeholder.as_str(), table_alias));
                generator.push_projected_name(projected_name, builder);
            }
            SelectEntry::InlineParentProperty {
                projected_name,
                parent_alias,
                ..
            } => {
                builder.push_str(parent_alias);
                builder.push('.');
                builder.push_str(generator.dialect.quote_column_name_if_needed(projected_name));
            }
            SelectEntry::ParentReference {
                projected_name,
                parent_row_object_sql: sub_query,
                ..
            }
            | SelectEntry::ChildCollection {
                projected_name,
                collection_sql: sub_query,
                ..
            } => {
                generator.build_subquery(sub_query, builder)?;
                builder.push(' ');
                builder.push_str(generator.dialect.quote_column_name_if_needed(projected_name));
            }
        }

        Ok(())
    }
}

impl ExpressionBuilder for HiddenPrimaryKey {
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        builder.push_str(&self.table_alias);
        builder.push('.');
        builder.push_str(generator.dialect.quote_column_name_if_needed(&self.field_name));
        generator.push_projected_name(&self.export_name, builder);
        Ok(())
    }
}

impl ExpressionBuilder for FromEntry {
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        match self {
            FromEntry::Table { table, alias } => {
                builder.push_str(generator.minimal_relation_identifier(table));
                builder.push(' ');
                builder.push_str(alias);
            }
            FromEntry::Query {
                query,
                alias,
                join_condition,
                comment,
            } => {
                generator.push_comment(comment.as_deref(), builder);
                builder.push_str("left join ");
                generator.build_subquery(query, builder)?;
                builder.push(' ');
                builder.push_str(alias);
                builder.push_str(" on ");
                join_condition.build(generator, builder)?;
            }
        }
        Ok(())
    }
}

impl ExpressionBuilder for ParentChildCondition {
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        let dialect = generator.dialect();

        builder.push_iter(self.matched_fields.iter(), " and ", |builder, matched| {
            builder.push_str(&self.child_alias);
            builder.push('.');
            builder.push_str(dialect.quote_column_name_if_needed(&matched.child_field));
            builder.push_str(" = ");
            builder.push_str(&self.parent_alias);
            builder.push('.');
            builder.push_str(dialect.quote_column_name_if_needed(&matched.parent_field));
            Ok(())
        })
    }
}

impl ExpressionBuilder for WhereEntry {
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        match self {
            WhereEntry::Condition {
                sql,
                alias_placeholder,
                table_alias,
            } => {
                builder.push('(');
                builder.push_str(sql.replace(alias_placeholder.as_str(), table_alias));
                builder.push(')');
                Ok(())
            }
            WhereEntry::ParentChild(condition) => condition.build(generator, builder),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqljson_core::{PropertyNameDefault, QuerySpec, Resolver, SqlSpecGenerator};
    use sqljson_dbmd::test_support::{
        DRUGS_SCHEMA, drugs_metadata, drugs_metadata_stored_upper, drugs_stored_metadata,
    };
    use test_log::test;

    use super::*;
    use crate::{MySqlDialect, PostgresDialect};

    fn only_sql_spec(dbmd: &DatabaseMetadata, query: serde_json::Value) -> SqlSpec {
        let query: QuerySpec = serde_json::from_value(query).unwrap();
        let resolver = Resolver::new(dbmd, Some(DRUGS_SCHEMA), PropertyNameDefault::Camelcase);

        SqlSpecGenerator::new(resolver)
            .generate_sql_specs(&query)
            .unwrap()
            .into_values()
            .next()
            .unwrap()
    }

    fn postgres_generator(unqualified_schemas: &[&str]) -> SqlSourceGenerator {
        let unqualified_schemas: Vec<String> =
            unqualified_schemas.iter().map(|s| s.to_string()).collect();
        SqlSourceGenerator::new(
            Box::new(PostgresDialect),
            CaseSensitivity::InsensitiveStoredLower,
            &unqualified_schemas,
        )
    }

    fn lines(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn multi_column_rows() {
        let dbmd = drugs_metadata();
        let sql_spec = only_sql_spec(
            &dbmd,
            json!({
                "queryName": "drugs query",
                "resultRepresentations": ["MULTI_COLUMN_ROWS"],
                "tableJson": {
                    "table": "drug",
                    "fieldExpressions": [
                        "id",
                        { "field": "name", "jsonProperty": "drugName" },
                        {
                            "expression": "$$.cid + 1000",
                            "jsonProperty": "cidPlus1000",
                            "fieldTypeInGeneratedSource": "number"
                        }
                    ],
                    "recordCondition": { "sql": "$$.id = :drugId", "paramNames": ["drugId"] }
                },
                "orderBy": "$$.name"
            }),
        );

        assert_eq!(
            postgres_generator(&[]).make_sql(&sql_spec).unwrap(),
            lines(&[
                "select",
                "  d_.id as id,",
                "  d_.name \"drugName\",",
                "  d_.cid + 1000 \"cidPlus1000\"",
                "from",
                "  drugs.drug d_",
                "where (",
                "  (d_.id = :drugId)",
                ")",
                "order by d_.name",
                "",
            ])
        );
    }

    #[test]
    fn for_update() {
        let dbmd = drugs_metadata();
        let sql_spec = only_sql_spec(
            &dbmd,
            json!({
                "queryName": "drug for update",
                "resultRepresentations": ["MULTI_COLUMN_ROWS"],
                "forUpdate": true,
                "tableJson": { "table": "drug", "fieldExpressions": ["id"] }
            }),
        );

        assert_eq!(
            postgres_generator(&["drugs"]).make_sql(&sql_spec).unwrap(),
            lines(&[
                "select",
                "  d_.id as id",
                "from",
                "  drug d_",
                "for update",
                "",
            ])
        );
    }

    #[test]
    fn json_object_rows() {
        let dbmd = drugs_metadata();
        let sql_spec = only_sql_spec(
            &dbmd,
            json!({
                "queryName": "drugs query",
                "additionalObjectPropertyColumns": ["id"],
                "tableJson": {
                    "table": "drug",
                    "fieldExpressions": ["id", { "field": "name", "jsonProperty": "drugName" }]
                },
                "orderBy": "$$.id"
            }),
        );

        assert_eq!(
            postgres_generator(&["drugs"]).make_sql(&sql_spec).unwrap(),
            lines(&[
                "select",
                "  -- row object for table 'drug'",
                "  jsonb_build_object(",
                "    'id', q.id,",
                "    'drugName', q.\"drugName\"",
                "  ) json,",
                "  id",
                "from (",
                "  -- base query for table 'drug'",
                "  select",
                "    d_.id as id,",
                "    d_.name \"drugName\"",
                "  from",
                "    drug d_",
                "  order by d_.id",
                ") q",
                "order by q.id",
            ])
        );
    }

    #[test]
    fn inline_parents_are_left_joined() {
        let dbmd = drugs_metadata();
        let sql_spec = only_sql_spec(
            &dbmd,
            json!({
                "queryName": "drugs with compounds",
                "resultRepresentations": ["MULTI_COLUMN_ROWS"],
                "tableJson": {
                    "table": "drug",
                    "fieldExpressions": ["id"],
                    "parentTables": [
                        { "table": "compound", "fieldExpressions": ["display_name"] }
                    ]
                }
            }),
        );

        assert_eq!(
            postgres_generator(&["drugs"]).make_sql(&sql_spec).unwrap(),
            lines(&[
                "select",
                "  d_.id as id,",
                "  -- field(s) inlined from parent table 'compound'",
                "  q.\"displayName\"",
                "from",
                "  drug d_",
                "  -- parent table 'compound', joined for inlined fields",
                "  left join (",
                "    select",
                "      c_.display_name \"displayName\",",
                "      c_.id as _id",
                "    from",
                "      compound c_",
                "  ) q on d_.compound_id = q._id",
                "",
            ])
        );
    }

    #[test]
    fn json_array_row_with_parent_reference_and_unwrapped_collection() {
        let dbmd = drugs_metadata();
        let sql_spec = only_sql_spec(
            &dbmd,
            json!({
                "queryName": "compounds",
                "resultRepresentations": ["JSON_ARRAY_ROW"],
                "tableJson": {
                    "table": "compound",
                    "fieldExpressions": ["id"],
                    "parentTables": [
                        {
                            "referenceName": "enteredBy",
                            "table": "analyst",
                            "fieldExpressions": ["short_name"],
                            "viaForeignKeyFields": ["entered_by"]
                        }
                    ],
                    "childTables": [
                        {
                            "collectionName": "drugNames",
                            "table": "drug",
                            "fieldExpressions": ["name"],
                            "unwrap": true
                        }
                    ]
                }
            }),
        );

        let generator = postgres_generator(&["drugs"]).with_comments(false);

        assert_eq!(
            generator.make_sql(&sql_spec).unwrap(),
            lines(&[
                "select",
                "  coalesce(jsonb_agg(jsonb_build_object(",
                "    'id', q.id,",
                "    'enteredBy', q.\"enteredBy\",",
                "    'drugNames', q.\"drugNames\"",
                "  )),'[]'::jsonb) json",
                "from (",
                "  select",
                "    c_.id as id,",
                "    (",
                "      select",
                "        jsonb_build_object(",
                "          'shortName', q.\"shortName\"",
                "        ) json",
                "      from (",
                "        select",
                "          a_.short_name \"shortName\"",
                "        from",
                "          analyst a_",
                "        where (",
                "          c_.entered_by = a_.id",
                "        )",
                "      ) q",
                "    ) \"enteredBy\",",
                "    (",
                "      select",
                "        coalesce(jsonb_agg(q.name),'[]'::jsonb) json",
                "      from (",
                "        select",
                "          d_.name as name",
                "        from",
                "          drug d_",
                "        where (",
                "          d_.compound_id = c_.id",
                "        )",
                "      ) q",
                "    ) \"drugNames\"",
                "  from",
                "    compound c_",
                ") q",
            ])
        );
    }

    #[test]
    fn aggregate_comments() {
        let dbmd = drugs_metadata();
        let sql_spec = only_sql_spec(
            &dbmd,
            json!({
                "queryName": "analysts",
                "resultRepresentations": ["JSON_ARRAY_ROW"],
                "tableJson": { "table": "analyst", "fieldExpressions": ["id"] }
            }),
        );

        assert_eq!(
            postgres_generator(&["drugs"]).make_sql(&sql_spec).unwrap(),
            lines(&[
                "select",
                "  -- aggregated rows from table 'analyst'",
                "  coalesce(jsonb_agg(jsonb_build_object(",
                "    'id', q.id",
                "  )),'[]'::jsonb) json",
                "from (",
                "  select",
                "    a_.id as id",
                "  from",
                "    -- base query for table 'analyst'",
                "    analyst a_",
                ") q",
            ])
        );
    }

    #[test]
    fn mysql_rejects_aggregate_ordering() {
        let dbmd = drugs_metadata();
        let sql_spec = only_sql_spec(
            &dbmd,
            json!({
                "queryName": "analysts",
                "resultRepresentations": ["JSON_ARRAY_ROW"],
                "tableJson": { "table": "analyst", "fieldExpressions": ["id"] },
                "orderBy": "$$.id"
            }),
        );

        let generator = SqlSourceGenerator::new(
            Box::new(MySqlDialect),
            CaseSensitivity::InsensitiveStoredMixed,
            &[],
        );

        assert_eq!(
            generator.make_sql(&sql_spec),
            Err(SqlEmitError::AggregateOrderingUnsupported { dialect: "MySQL" })
        );
    }

    #[test]
    fn oracle_names() {
        let dbmd = drugs_metadata_stored_upper();
        let sql_spec = only_sql_spec(
            &dbmd,
            json!({
                "queryName": "drugs",
                "resultRepresentations": ["MULTI_COLUMN_ROWS"],
                "tableJson": { "table": "drug", "fieldExpressions": ["id", "name"] }
            }),
        );

        let generator = SqlSourceGenerator::for_database(&dbmd, &["drugs".to_string()]).unwrap();

        assert_eq!(
            generator.make_sql(&sql_spec).unwrap(),
            lines(&[
                "select",
                "  d_.ID \"id\",",
                "  d_.NAME \"name\"",
                "from",
                "  DRUG d_",
                "",
            ])
        );
    }

    #[test]
    fn unsupported_database() {
        let mut stored = drugs_stored_metadata();
        stored.dbms_name = "SQLite".to_string();

        assert!(matches!(
            SqlSourceGenerator::for_database(&DatabaseMetadata::new(stored), &[]),
            Err(SqlEmitError::UnsupportedDbms(name)) if name == "SQLite"
        ));
    }

    #[test]
    fn unwrapped_collection_needs_a_single_property() {
        let dbmd = drugs_metadata();
        let sql_spec = SqlSpec {
            object_wrap_properties: false,
            ..only_sql_spec(
                &dbmd,
                json!({
                    "queryName": "analysts",
                    "resultRepresentations": ["JSON_ARRAY_ROW"],
                    "tableJson": { "table": "analyst", "fieldExpressions": ["id", "short_name"] }
                }),
            )
        };

        assert_eq!(
            postgres_generator(&[]).make_sql(&sql_spec),
            Err(SqlEmitError::UnwrappedCollectionProperties {
                table: "analyst".to_string(),
                property_count: 2
            })
        );
    }
}
