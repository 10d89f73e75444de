// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Compiles a query specification into [`SqlSpec`]s, one per requested result representation.
//!
//! Inline parents become left-joined sub-queries in the FROM clause whose properties are lifted
//! into the enclosing select list. Referenced parents and child collections become correlated
//! sub-queries in the select list, producing a JSON object and a JSON array respectively.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::{
    AliasScope, ChildLink, DEFAULT_ALIAS_PLACEHOLDER, FieldSource, FromEntry, HiddenPrimaryKey,
    MatchedField, OrderBy, ParentChildCondition, ParentLink, QuerySpec, ResolvedFieldExpr,
    ResolvedTable, Resolver, ResultRepr, SelectEntry, SpecError, SpecErrorKind, SpecLocation,
    SqlSpec, TableJsonFold, WhereEntry, fold_table_json,
    naming::{lower_case_initials, make_name_not_in_set},
};

pub struct SqlSpecGenerator<'a> {
    resolver: Resolver<'a>,
}

impl<'a> SqlSpecGenerator<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }

    #[instrument(skip_all, fields(query = %query.query_name))]
    pub fn generate_sql_specs(
        &self,
        query: &'a QuerySpec,
    ) -> Result<IndexMap<ResultRepr, SqlSpec>, SpecError> {
        let location = SpecLocation::new(&query.query_name);
        let result_reprs = query.result_representations();

        if result_reprs.is_empty() {
            return Err(SpecError::new(
                location.with_part("resultRepresentations"),
                SpecErrorKind::NoResultRepresentations,
            ));
        }

        result_reprs
            .into_iter()
            .map(|result_repr| {
                self.make_sql_spec(query, result_repr, &location)
                    .map(|sql_spec| (result_repr, sql_spec))
            })
            .collect()
    }

    fn make_sql_spec(
        &self,
        query: &'a QuerySpec,
        result_repr: ResultRepr,
        location: &SpecLocation,
    ) -> Result<SqlSpec, SpecError> {
        if query.for_update() && result_repr != ResultRepr::MultiColumnRows {
            return Err(SpecError::new(
                location.with_part("for update clause"),
                SpecErrorKind::ForUpdateRequiresMultiColumnRows,
            ));
        }

        let site = SqlSite {
            order_by: query.order_by.as_deref(),
            ..SqlSite::default()
        };

        let base_sql = fold_table_json(
            self,
            &self.resolver,
            &query.table_json,
            site,
            location.clone(),
        )?
        .output;

        debug!(%result_repr, "Generated SQL spec");

        Ok(match result_repr {
            ResultRepr::MultiColumnRows => SqlSpec {
                for_update: query.for_update(),
                ..base_sql
            },
            ResultRepr::JsonObjectRows => SqlSpec {
                object_wrap_properties: true,
                additional_object_property_columns: query
                    .additional_object_property_columns
                    .clone(),
                ..base_sql
            },
            ResultRepr::JsonArrayRow => SqlSpec {
                aggregate_to_array: true,
                object_wrap_properties: true,
                from_entries_leading_comment: Some(format!(
                    "base query for table '{}'",
                    query.table_json.table
                )),
                ..base_sql
            },
        })
    }
}

/// What a table's query learns from the query enclosing it.
#[derive(Default)]
pub struct SqlSite<'a> {
    scope: AliasScope,
    correlation: Option<Correlation>,
    /// Fields to export as hidden columns for the join condition of an enclosing query
    hidden_exports: Vec<String>,
    order_by: Option<&'a str>,
    filter: Option<&'a str>,
}

enum Correlation {
    /// The table is a parent whose row is matched to the enclosing (child) row
    ToChildRow {
        child_alias: String,
        matched_fields: Vec<MatchedField>,
        match_must_exist: bool,
    },
    /// The table is a child whose rows are matched to the enclosing (parent) row
    ToParentRow {
        parent_alias: String,
        matched_fields: Vec<MatchedField>,
    },
}

impl Correlation {
    fn condition(self, table_alias: &str) -> ParentChildCondition {
        match self {
            Correlation::ToChildRow {
                child_alias,
                matched_fields,
                match_must_exist,
            } => ParentChildCondition {
                parent_alias: table_alias.to_string(),
                child_alias,
                matched_fields,
                match_must_exist,
            },
            Correlation::ToParentRow {
                parent_alias,
                matched_fields,
            } => ParentChildCondition {
                parent_alias,
                child_alias: table_alias.to_string(),
                matched_fields,
                match_must_exist: false,
            },
        }
    }
}

pub struct SqlFrame<'a> {
    alias: String,
    scope: AliasScope,
    joined_from_entries: Vec<FromEntry>,
    where_entries: Vec<WhereEntry>,
    hidden_exports: Vec<String>,
    order_by: Option<&'a str>,
    pending_subquery_alias: Option<String>,
}

impl<'a> TableJsonFold<'a> for SqlSpecGenerator<'a> {
    type Site = SqlSite<'a>;
    type Frame = SqlFrame<'a>;
    type Entry = SelectEntry;
    type Output = SqlSpec;

    fn begin(&self, table: &ResolvedTable<'a>, site: SqlSite<'a>) -> SqlFrame<'a> {
        let alias = match &table.spec.alias {
            Some(alias) => alias.clone(),
            None => site
                .scope
                .fresh_alias(&format!("{}_", lower_case_initials(&table.rel.rel_id.name))),
        };

        debug!(table = %table.rel.rel_id, alias = %alias, "Allocated table alias");

        let mut where_entries = vec![];

        if let Some(correlation) = site.correlation {
            where_entries.push(WhereEntry::ParentChild(correlation.condition(&alias)));
        }

        if let Some(record_condition) = &table.spec.record_condition {
            where_entries.push(WhereEntry::Condition {
                sql: record_condition.sql.clone(),
                alias_placeholder: record_condition
                    .with_table_alias_as
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ALIAS_PLACEHOLDER.to_string()),
                table_alias: alias.clone(),
            });
        }

        if let Some(filter) = site.filter {
            where_entries.push(WhereEntry::Condition {
                sql: filter.to_string(),
                alias_placeholder: DEFAULT_ALIAS_PLACEHOLDER.to_string(),
                table_alias: alias.clone(),
            });
        }

        SqlFrame {
            scope: site.scope.with(&alias),
            alias,
            joined_from_entries: vec![],
            where_entries,
            hidden_exports: site.hidden_exports,
            order_by: site.order_by,
            pending_subquery_alias: None,
        }
    }

    fn field_entry(&self, frame: &mut SqlFrame<'a>, field: &ResolvedFieldExpr<'a>) -> SelectEntry {
        match &field.source {
            FieldSource::Field(db_field) => SelectEntry::Field {
                field: (*db_field).clone(),
                projected_name: field.property_name.clone(),
                table_alias: frame.alias.clone(),
                display_order: field.display_order,
                generated_type: field.generated_type.cloned(),
            },
            FieldSource::Expression {
                sql,
                alias_placeholder,
            } => SelectEntry::Expression {
                expression: sql.to_string(),
                alias_placeholder: alias_placeholder.to_string(),
                projected_name: field.property_name.clone(),
                table_alias: frame.alias.clone(),
                display_order: field.display_order,
                generated_type: field.generated_type.cloned(),
            },
        }
    }

    fn inline_parent_site(&self, frame: &mut SqlFrame<'a>, link: &ParentLink<'a>) -> SqlSite<'a> {
        let subquery_alias = link
            .spec
            .subquery_alias
            .clone()
            .unwrap_or_else(|| frame.scope.fresh_alias("q"));

        frame.scope = frame.scope.with(&subquery_alias);
        frame.pending_subquery_alias = Some(subquery_alias);

        // Primary key fields, plus any other parent fields a custom match condition equates
        let mut hidden_exports: Vec<String> = link
            .parent
            .primary_key_fields()
            .iter()
            .map(|f| f.name.clone())
            .collect();
        for matched in &link.matched_fields {
            if !hidden_exports.contains(&matched.parent_field) {
                hidden_exports.push(matched.parent_field.clone());
            }
        }

        SqlSite {
            scope: frame.scope.clone(),
            hidden_exports,
            ..SqlSite::default()
        }
    }

    fn inline_parent_entries(
        &self,
        frame: &mut SqlFrame<'a>,
        link: &ParentLink<'a>,
        parent: SqlSpec,
    ) -> Vec<SelectEntry> {
        let subquery_alias = frame
            .pending_subquery_alias
            .take()
            .unwrap_or_else(|| frame.scope.fresh_alias("q"));
        let parent_table_name = &link.spec.table_json.table;

        let join_condition = ParentChildCondition {
            parent_alias: subquery_alias.clone(),
            child_alias: frame.alias.clone(),
            matched_fields: link
                .matched_fields
                .iter()
                .map(|matched| MatchedField {
                    child_field: matched.child_field.clone(),
                    parent_field: parent
                        .hidden_export_name(&matched.parent_field)
                        .unwrap_or(&matched.parent_field)
                        .to_string(),
                })
                .collect(),
            match_must_exist: link.match_must_exist,
        };

        let lifted = parent
            .select_entries
            .iter()
            .enumerate()
            .map(|(ix, parent_entry)| SelectEntry::InlineParentProperty {
                projected_name: parent_entry.projected_name().to_string(),
                parent_alias: subquery_alias.clone(),
                parent_table: link.parent.rel_id.clone(),
                comment: (ix == 0)
                    .then(|| format!("field(s) inlined from parent table '{parent_table_name}'")),
                display_order: parent_entry.display_order(),
            })
            .collect();

        frame.joined_from_entries.push(FromEntry::Query {
            query: Box::new(parent),
            alias: subquery_alias,
            join_condition,
            comment: Some(format!(
                "parent table '{parent_table_name}', joined for inlined fields"
            )),
        });

        lifted
    }

    fn referenced_parent_site(
        &self,
        frame: &mut SqlFrame<'a>,
        link: &ParentLink<'a>,
    ) -> SqlSite<'a> {
        SqlSite {
            scope: frame.scope.clone(),
            correlation: Some(Correlation::ToChildRow {
                child_alias: frame.alias.clone(),
                matched_fields: link.matched_fields.clone(),
                match_must_exist: link.match_must_exist,
            }),
            ..SqlSite::default()
        }
    }

    fn referenced_parent_entry(
        &self,
        _frame: &mut SqlFrame<'a>,
        link: &ParentLink<'a>,
        parent: SqlSpec,
    ) -> SelectEntry {
        let reference_name = link.spec.reference_name.clone().unwrap_or_default();

        SelectEntry::ParentReference {
            comment: Some(format!(
                "reference '{reference_name}' to parent table '{}'",
                link.spec.table_json.table
            )),
            projected_name: reference_name,
            parent_row_object_sql: Box::new(SqlSpec {
                object_wrap_properties: true,
                ..parent
            }),
            display_order: link.spec.display_order,
        }
    }

    fn child_collection_site(&self, frame: &mut SqlFrame<'a>, link: &ChildLink<'a>) -> SqlSite<'a> {
        SqlSite {
            scope: frame.scope.clone(),
            correlation: Some(Correlation::ToParentRow {
                parent_alias: frame.alias.clone(),
                matched_fields: link.matched_fields.clone(),
            }),
            order_by: link.spec.order_by.as_deref(),
            filter: link.spec.filter.as_deref(),
            ..SqlSite::default()
        }
    }

    fn child_collection_entry(
        &self,
        _frame: &mut SqlFrame<'a>,
        link: &ChildLink<'a>,
        child: SqlSpec,
    ) -> SelectEntry {
        let child_table_name = &link.spec.table_json.table;

        SelectEntry::ChildCollection {
            projected_name: link.spec.collection_name.clone(),
            collection_sql: Box::new(SqlSpec {
                aggregate_to_array: true,
                object_wrap_properties: !link.spec.unwrap(),
                from_entries_leading_comment: Some(format!(
                    "base query for table '{child_table_name}'"
                )),
                ..child
            }),
            comment: Some(format!(
                "collection '{}' of records from child table '{child_table_name}'",
                link.spec.collection_name
            )),
            display_order: link.spec.display_order,
        }
    }

    fn finish(
        &self,
        table: &ResolvedTable<'a>,
        frame: SqlFrame<'a>,
        entries: Vec<SelectEntry>,
    ) -> SqlSpec {
        let SqlFrame {
            alias,
            joined_from_entries,
            where_entries,
            hidden_exports,
            order_by,
            ..
        } = frame;

        let mut taken_names: BTreeSet<String> = entries
            .iter()
            .map(|entry| entry.projected_name().to_string())
            .collect();

        let hidden_primary_keys = hidden_exports
            .into_iter()
            .map(|field_name| {
                let export_name = make_name_not_in_set(&format!("_{field_name}"), &taken_names, "_");
                taken_names.insert(export_name.clone());
                HiddenPrimaryKey {
                    field_name,
                    table_alias: alias.clone(),
                    export_name,
                }
            })
            .collect();

        let from_entries = std::iter::once(FromEntry::Table {
            table: table.rel.rel_id.clone(),
            alias: alias.clone(),
        })
        .chain(joined_from_entries)
        .collect();

        SqlSpec {
            select_entries: entries,
            hidden_primary_keys,
            from_entries,
            where_entries,
            order_by: order_by.map(|order_by| OrderBy {
                order_by: order_by.to_string(),
                table_alias: alias.clone(),
            }),
            for_update: false,
            object_wrap_properties: false,
            aggregate_to_array: false,
            additional_object_property_columns: vec![],
            result_type_name: table.spec.result_type_name.clone(),
            from_entries_leading_comment: None,
        }
    }
}
