// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolution of the names used in a table/JSON specification against database metadata.
//!
//! Both generators resolve tables, fields and parent/child links only through [`Resolver`], so
//! they cannot disagree about which relation, foreign key or nullability a specification means.

use sqljson_dbmd::{DatabaseMetadata, Field, RelMetadata};
use tracing::debug;

use crate::{
    ChildSpec, CustomMatchCondition, DEFAULT_ALIAS_PLACEHOLDER, FieldExpr, GeneratedFieldType,
    ParentSpec, PropertyNameDefault, SpecError, SpecErrorKind, SpecLocation, TableJsonSpec,
};

/// A table/JSON specification together with the relation it names.
#[derive(Debug, Clone)]
pub struct ResolvedTable<'a> {
    pub spec: &'a TableJsonSpec,
    pub rel: &'a RelMetadata,
    pub location: SpecLocation,
}

/// A validated `fieldExpressions` entry.
#[derive(Debug, Clone)]
pub struct ResolvedFieldExpr<'a> {
    pub property_name: String,
    pub source: FieldSource<'a>,
    pub generated_type: Option<&'a GeneratedFieldType>,
    pub display_order: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum FieldSource<'a> {
    Field(&'a Field),
    Expression {
        sql: &'a str,
        alias_placeholder: &'a str,
    },
}

/// A pair of fields equated when matching child rows with parent rows (exact stored names).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchedField {
    pub child_field: String,
    pub parent_field: String,
}

/// How rows of the table being walked are matched to rows of one of its parents.
#[derive(Debug, Clone)]
pub struct ParentLink<'a> {
    pub spec: &'a ParentSpec,
    pub parent: &'a RelMetadata,
    pub matched_fields: Vec<MatchedField>,
    /// Whether every row of the child is guaranteed a matching parent row
    pub match_must_exist: bool,
}

/// How rows of one of the children are matched to rows of the table being walked.
#[derive(Debug, Clone)]
pub struct ChildLink<'a> {
    pub spec: &'a ChildSpec,
    pub child: &'a RelMetadata,
    pub matched_fields: Vec<MatchedField>,
}

pub struct Resolver<'a> {
    dbmd: &'a DatabaseMetadata,
    default_schema: Option<&'a str>,
    property_name_default: PropertyNameDefault,
}

impl<'a> Resolver<'a> {
    pub fn new(
        dbmd: &'a DatabaseMetadata,
        default_schema: Option<&'a str>,
        property_name_default: PropertyNameDefault,
    ) -> Self {
        Self {
            dbmd,
            default_schema,
            property_name_default,
        }
    }

    pub fn dbmd(&self) -> &'a DatabaseMetadata {
        self.dbmd
    }

    /// Resolve a possibly schema-qualified table name. An unqualified name is looked up in the
    /// default schema, and is not found when no default schema is configured.
    pub fn resolve_table(
        &self,
        table: &str,
        location: &SpecLocation,
    ) -> Result<&'a RelMetadata, SpecError> {
        let not_found = || {
            SpecError::new(
                location.clone(),
                SpecErrorKind::TableNotFound {
                    table: table.to_string(),
                },
            )
        };

        let rel_id = self
            .dbmd
            .make_rel_id(table, self.default_schema)
            .map_err(|_| not_found())?;

        if rel_id.schema.is_none() {
            return Err(not_found());
        }

        let rel = self.dbmd.relation_metadata(&rel_id).ok_or_else(not_found)?;

        debug!(table, rel_id = %rel.rel_id, "Resolved table");

        Ok(rel)
    }

    pub fn resolve_field(
        &self,
        rel: &'a RelMetadata,
        field_name: &str,
        location: &SpecLocation,
    ) -> Result<&'a Field, SpecError> {
        self.dbmd.field(rel, field_name).ok_or_else(|| {
            SpecError::new(
                location.clone(),
                SpecErrorKind::FieldNotFound {
                    table: rel.rel_id.clone(),
                    field: field_name.to_string(),
                },
            )
        })
    }

    /// Validate the `fieldExpressions` of a table and determine their property names.
    pub fn resolve_field_exprs(
        &self,
        table: &ResolvedTable<'a>,
    ) -> Result<Vec<ResolvedFieldExpr<'a>>, SpecError> {
        table
            .spec
            .field_expressions
            .iter()
            .enumerate()
            .map(|(ix, field_expr)| {
                let location = table.location.with_part(format!(
                    "fieldExpressions entry #{} of table '{}'",
                    ix + 1,
                    table.spec.table
                ));
                self.resolve_field_expr(table.rel, field_expr, &location)
            })
            .collect()
    }

    fn resolve_field_expr(
        &self,
        rel: &'a RelMetadata,
        field_expr: &'a FieldExpr,
        location: &SpecLocation,
    ) -> Result<ResolvedFieldExpr<'a>, SpecError> {
        let error = |kind| SpecError::new(location.clone(), kind);

        match field_expr {
            FieldExpr::Name(name) => Ok(ResolvedFieldExpr {
                property_name: self.property_name(name),
                source: FieldSource::Field(self.resolve_field(rel, name, location)?),
                generated_type: None,
                display_order: None,
            }),
            FieldExpr::Detailed(tfe) => match (&tfe.field, &tfe.expression) {
                (Some(field_name), None) => Ok(ResolvedFieldExpr {
                    property_name: tfe
                        .json_property
                        .clone()
                        .unwrap_or_else(|| self.property_name(field_name)),
                    source: FieldSource::Field(self.resolve_field(rel, field_name, location)?),
                    generated_type: tfe.field_type_in_generated_source.as_ref(),
                    display_order: tfe.display_order,
                }),
                (None, Some(expression)) => {
                    let property_name = tfe.json_property.clone().ok_or_else(|| {
                        error(SpecErrorKind::MissingJsonPropertyForExpression {
                            expression: expression.clone(),
                        })
                    })?;
                    let generated_type =
                        tfe.field_type_in_generated_source.as_ref().ok_or_else(|| {
                            error(SpecErrorKind::MissingGeneratedTypeForExpression {
                                expression: expression.clone(),
                            })
                        })?;

                    Ok(ResolvedFieldExpr {
                        property_name,
                        source: FieldSource::Expression {
                            sql: expression,
                            alias_placeholder: tfe
                                .with_table_alias_as
                                .as_deref()
                                .unwrap_or(DEFAULT_ALIAS_PLACEHOLDER),
                        },
                        generated_type: Some(generated_type),
                        display_order: tfe.display_order,
                    })
                }
                _ => Err(error(SpecErrorKind::ConflictingFieldAndExpression)),
            },
        }
    }

    fn property_name(&self, field_name: &str) -> String {
        self.property_name_default
            .property_name(field_name, self.dbmd.case_sensitivity())
    }

    /// Resolve the parent table of `parent_spec` and how `child_rel` rows match its rows.
    pub fn parent_link(
        &self,
        child_rel: &'a RelMetadata,
        parent_spec: &'a ParentSpec,
        location: &SpecLocation,
    ) -> Result<ParentLink<'a>, SpecError> {
        let parent = self.resolve_table(&parent_spec.table_json.table, location)?;

        let matched_fields = match &parent_spec.custom_match_condition {
            Some(custom_match) => {
                if parent_spec.via_foreign_key_fields.is_some() {
                    return Err(SpecError::new(
                        location.clone(),
                        SpecErrorKind::ForeignKeyFieldsWithCustomMatch,
                    ));
                }
                self.custom_matched_fields(custom_match, child_rel, parent, location)?
            }
            None => self.foreign_key_matched_fields(
                child_rel,
                parent,
                parent_spec.via_foreign_key_fields.as_deref(),
                location,
            )?,
        };

        let match_must_exist = match_must_exist(
            child_rel,
            &matched_fields,
            parent_spec.custom_match_condition.as_ref(),
            parent_spec.table_json.record_condition.is_some(),
        );

        debug!(
            child = %child_rel.rel_id,
            parent = %parent.rel_id,
            match_must_exist,
            "Resolved parent link"
        );

        Ok(ParentLink {
            spec: parent_spec,
            parent,
            matched_fields,
            match_must_exist,
        })
    }

    /// Resolve the child table of `child_spec` and how its rows match `parent_rel` rows.
    pub fn child_link(
        &self,
        parent_rel: &'a RelMetadata,
        child_spec: &'a ChildSpec,
        location: &SpecLocation,
    ) -> Result<ChildLink<'a>, SpecError> {
        let child = self.resolve_table(&child_spec.table_json.table, location)?;

        let matched_fields = match &child_spec.custom_match_condition {
            Some(custom_match) => {
                if child_spec.foreign_key_fields.is_some() {
                    return Err(SpecError::new(
                        location.clone(),
                        SpecErrorKind::ForeignKeyFieldsWithCustomMatch,
                    ));
                }
                self.custom_matched_fields(custom_match, child, parent_rel, location)?
            }
            None => self.foreign_key_matched_fields(
                child,
                parent_rel,
                child_spec.foreign_key_fields.as_deref(),
                location,
            )?,
        };

        debug!(
            child = %child.rel_id,
            parent = %parent_rel.rel_id,
            "Resolved child link"
        );

        Ok(ChildLink {
            spec: child_spec,
            child,
            matched_fields,
        })
    }

    fn foreign_key_matched_fields(
        &self,
        child_rel: &RelMetadata,
        parent_rel: &RelMetadata,
        field_names: Option<&[String]>,
        location: &SpecLocation,
    ) -> Result<Vec<MatchedField>, SpecError> {
        let child = &child_rel.rel_id;
        let parent = &parent_rel.rel_id;

        // The only failure of a foreign key lookup is ambiguity
        let fk = self
            .dbmd
            .foreign_key_from_to(child, parent, field_names)
            .map_err(|_| {
                SpecError::new(
                    location.clone(),
                    SpecErrorKind::AmbiguousForeignKey {
                        child: child.clone(),
                        parent: parent.clone(),
                    },
                )
            })?
            .ok_or_else(|| {
                SpecError::new(
                    location.clone(),
                    SpecErrorKind::ForeignKeyNotFound {
                        child: child.clone(),
                        parent: parent.clone(),
                        field_names: field_names.map(|names| names.to_vec()),
                    },
                )
            })?;

        debug!(constraint = ?fk.constraint_name, "Using foreign key");

        Ok(fk
            .components
            .iter()
            .map(|component| MatchedField {
                child_field: component.foreign_key_field_name.clone(),
                parent_field: component.primary_key_field_name.clone(),
            })
            .collect())
    }

    fn custom_matched_fields(
        &self,
        custom_match: &CustomMatchCondition,
        child_rel: &RelMetadata,
        parent_rel: &RelMetadata,
        location: &SpecLocation,
    ) -> Result<Vec<MatchedField>, SpecError> {
        let invalid = |message: String| {
            SpecError::new(
                location.with_part("custom match condition"),
                SpecErrorKind::InvalidCustomMatchCondition(message),
            )
        };

        if custom_match.equated_fields.is_empty() {
            return Err(invalid("no equated fields given".to_string()));
        }

        custom_match
            .equated_fields
            .iter()
            .map(|equated| {
                let child_field = self
                    .dbmd
                    .field(child_rel, &equated.child_field)
                    .ok_or_else(|| {
                        invalid(format!(
                            "child field '{}' not found in table {}",
                            equated.child_field, child_rel.rel_id
                        ))
                    })?;
                let parent_field = self
                    .dbmd
                    .field(parent_rel, &equated.parent_primary_key_field)
                    .ok_or_else(|| {
                        invalid(format!(
                            "parent field '{}' not found in table {}",
                            equated.parent_primary_key_field, parent_rel.rel_id
                        ))
                    })?;

                Ok(MatchedField {
                    child_field: child_field.name.clone(),
                    parent_field: parent_field.name.clone(),
                })
            })
            .collect()
    }
}

/// Whether a parent row always exists for a child row. Never so under a record condition on the
/// parent. With a custom match condition, only when declared. With a foreign key, when any of its
/// child fields is known to be non-nullable.
fn match_must_exist(
    child_rel: &RelMetadata,
    matched_fields: &[MatchedField],
    custom_match: Option<&CustomMatchCondition>,
    has_record_condition: bool,
) -> bool {
    if has_record_condition {
        return false;
    }

    match custom_match {
        Some(custom_match) => custom_match.match_always_exists.unwrap_or(false),
        None => matched_fields.iter().any(|matched| {
            child_rel
                .field(&matched.child_field)
                .and_then(|f| f.nullable)
                == Some(false)
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqljson_dbmd::test_support::{drugs_metadata, drugs_stored_metadata, pk_field};
    use sqljson_dbmd::{RelId, RelType};
    use test_log::test;

    use super::*;

    fn location() -> SpecLocation {
        SpecLocation::new("test query")
    }

    fn parent_spec(json: serde_json::Value) -> ParentSpec {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn resolves_tables_with_default_schema() {
        let dbmd = drugs_metadata();
        let resolver = Resolver::new(&dbmd, Some("drugs"), PropertyNameDefault::Camelcase);

        assert_eq!(
            resolver.resolve_table("DRUG", &location()).unwrap().rel_id,
            RelId::new("drug", Some("drugs"))
        );
        assert_eq!(
            resolver
                .resolve_table("drugs.advisory", &location())
                .unwrap()
                .rel_id,
            RelId::new("advisory", Some("drugs"))
        );
        assert_eq!(
            resolver.resolve_table("nope", &location()).unwrap_err().kind,
            SpecErrorKind::TableNotFound {
                table: "nope".to_string()
            }
        );
    }

    #[test]
    fn unqualified_names_without_default_schema() {
        let dbmd = drugs_metadata();
        let resolver = Resolver::new(&dbmd, None, PropertyNameDefault::Camelcase);

        assert!(matches!(
            resolver.resolve_table("drug", &location()).unwrap_err().kind,
            SpecErrorKind::TableNotFound { .. }
        ));
        assert!(resolver.resolve_table("drugs.drug", &location()).is_ok());
    }

    #[test]
    fn unqualified_names_need_a_default_schema_even_for_schemaless_relations() {
        let mut stored = drugs_stored_metadata();
        stored.relation_metadatas = vec![RelMetadata {
            rel_id: RelId::new("drug", None),
            rel_type: RelType::Table,
            fields: vec![pk_field("id", 1)],
        }];
        stored.foreign_keys = vec![];
        let dbmd = DatabaseMetadata::new(stored);
        let resolver = Resolver::new(&dbmd, None, PropertyNameDefault::Camelcase);

        assert_eq!(
            resolver.resolve_table("drug", &location()).unwrap_err().kind,
            SpecErrorKind::TableNotFound {
                table: "drug".to_string()
            }
        );
    }

    #[test]
    fn field_expressions() {
        let dbmd = drugs_metadata();
        let resolver = Resolver::new(&dbmd, Some("drugs"), PropertyNameDefault::Camelcase);
        let spec: TableJsonSpec = serde_json::from_value(json!({
            "table": "drug",
            "fieldExpressions": [
                "mesh_id",
                { "field": "name", "jsonProperty": "drugName", "displayOrder": 1 },
                { "expression": "$$.cid + 1", "jsonProperty": "cidPlus1", "fieldTypeInGeneratedSource": "number" }
            ]
        }))
        .unwrap();
        let table = ResolvedTable {
            spec: &spec,
            rel: resolver.resolve_table("drug", &location()).unwrap(),
            location: location(),
        };

        let resolved = resolver.resolve_field_exprs(&table).unwrap();
        let names: Vec<_> = resolved.iter().map(|r| r.property_name.as_str()).collect();
        assert_eq!(names, vec!["meshId", "drugName", "cidPlus1"]);
        assert_eq!(resolved[1].display_order, Some(1));
        assert!(matches!(
            resolved[2].source,
            FieldSource::Expression {
                sql: "$$.cid + 1",
                alias_placeholder: "$$"
            }
        ));
    }

    #[test]
    fn invalid_field_expressions() {
        let dbmd = drugs_metadata();
        let resolver = Resolver::new(&dbmd, Some("drugs"), PropertyNameDefault::Camelcase);

        let check = |field_expression: serde_json::Value| {
            let spec: TableJsonSpec = serde_json::from_value(json!({
                "table": "drug",
                "fieldExpressions": ["id", field_expression]
            }))
            .unwrap();
            let table = ResolvedTable {
                spec: &spec,
                rel: resolver.resolve_table("drug", &location()).unwrap(),
                location: location(),
            };
            let error = resolver.resolve_field_exprs(&table).unwrap_err();
            assert_eq!(
                error.location.query_part.as_deref(),
                Some("fieldExpressions entry #2 of table 'drug'")
            );
            error.kind
        };

        assert!(matches!(
            check(json!("no_such_field")),
            SpecErrorKind::FieldNotFound { .. }
        ));
        assert_eq!(
            check(json!({ "field": "id", "expression": "1" })),
            SpecErrorKind::ConflictingFieldAndExpression
        );
        assert_eq!(
            check(json!({ "jsonProperty": "x" })),
            SpecErrorKind::ConflictingFieldAndExpression
        );
        assert!(matches!(
            check(json!({ "expression": "1", "fieldTypeInGeneratedSource": "number" })),
            SpecErrorKind::MissingJsonPropertyForExpression { .. }
        ));
        assert!(matches!(
            check(json!({ "expression": "1", "jsonProperty": "one" })),
            SpecErrorKind::MissingGeneratedTypeForExpression { .. }
        ));
    }

    #[test]
    fn parent_link_nullability() {
        let dbmd = drugs_metadata();
        let resolver = Resolver::new(&dbmd, Some("drugs"), PropertyNameDefault::Camelcase);
        let compound = resolver.resolve_table("compound", &location()).unwrap();
        let drug = resolver.resolve_table("drug", &location()).unwrap();

        let entered_by = parent_spec(json!({
            "table": "analyst", "referenceName": "enteredBy", "viaForeignKeyFields": ["entered_by"]
        }));
        let link = resolver
            .parent_link(compound, &entered_by, &location())
            .unwrap();
        assert!(link.match_must_exist);
        assert_eq!(
            link.matched_fields,
            vec![MatchedField {
                child_field: "entered_by".to_string(),
                parent_field: "id".to_string()
            }]
        );

        let approved_by = parent_spec(json!({
            "table": "analyst", "referenceName": "approvedBy", "viaForeignKeyFields": ["approved_by"]
        }));
        assert!(
            !resolver
                .parent_link(compound, &approved_by, &location())
                .unwrap()
                .match_must_exist
        );

        let conditioned = parent_spec(json!({
            "table": "compound",
            "recordCondition": { "sql": "$$.cas is not null" }
        }));
        assert!(
            !resolver
                .parent_link(drug, &conditioned, &location())
                .unwrap()
                .match_must_exist
        );

        let custom = parent_spec(json!({
            "table": "compound",
            "customMatchCondition": {
                "equatedFields": [{ "childField": "COMPOUND_ID", "parentPrimaryKeyField": "ID" }]
            }
        }));
        let custom_link = resolver.parent_link(drug, &custom, &location()).unwrap();
        assert!(!custom_link.match_must_exist);
        assert_eq!(custom_link.matched_fields[0].child_field, "compound_id");

        let custom_always = parent_spec(json!({
            "table": "compound",
            "customMatchCondition": {
                "equatedFields": [{ "childField": "compound_id", "parentPrimaryKeyField": "id" }],
                "matchAlwaysExists": true
            }
        }));
        assert!(
            resolver
                .parent_link(drug, &custom_always, &location())
                .unwrap()
                .match_must_exist
        );
    }

    #[test]
    fn parent_link_errors() {
        let dbmd = drugs_metadata();
        let resolver = Resolver::new(&dbmd, Some("drugs"), PropertyNameDefault::Camelcase);
        let compound = resolver.resolve_table("compound", &location()).unwrap();

        let ambiguous = parent_spec(json!({ "table": "analyst", "referenceName": "analyst" }));
        assert!(matches!(
            resolver
                .parent_link(compound, &ambiguous, &location())
                .unwrap_err()
                .kind,
            SpecErrorKind::AmbiguousForeignKey { .. }
        ));

        let wrong_fields = parent_spec(json!({
            "table": "analyst", "referenceName": "analyst", "viaForeignKeyFields": ["cas"]
        }));
        assert!(matches!(
            resolver
                .parent_link(compound, &wrong_fields, &location())
                .unwrap_err()
                .kind,
            SpecErrorKind::ForeignKeyNotFound { .. }
        ));

        let both = parent_spec(json!({
            "table": "analyst",
            "viaForeignKeyFields": ["entered_by"],
            "customMatchCondition": {
                "equatedFields": [{ "childField": "entered_by", "parentPrimaryKeyField": "id" }]
            }
        }));
        assert_eq!(
            resolver
                .parent_link(compound, &both, &location())
                .unwrap_err()
                .kind,
            SpecErrorKind::ForeignKeyFieldsWithCustomMatch
        );

        let bad_custom = parent_spec(json!({
            "table": "analyst",
            "customMatchCondition": {
                "equatedFields": [{ "childField": "entered_by", "parentPrimaryKeyField": "no_such" }]
            }
        }));
        let error = resolver
            .parent_link(compound, &bad_custom, &location())
            .unwrap_err();
        assert!(matches!(
            error.kind,
            SpecErrorKind::InvalidCustomMatchCondition(_)
        ));
        assert_eq!(
            error.location.query_part.as_deref(),
            Some("custom match condition")
        );
    }

    #[test]
    fn child_links() {
        let dbmd = drugs_metadata();
        let resolver = Resolver::new(&dbmd, Some("drugs"), PropertyNameDefault::Camelcase);
        let analyst = resolver.resolve_table("analyst", &location()).unwrap();

        let child: ChildSpec = serde_json::from_value(json!({
            "collectionName": "enteredCompounds",
            "table": "compound",
            "foreignKeyFields": ["entered_by"]
        }))
        .unwrap();
        let link = resolver.child_link(analyst, &child, &location()).unwrap();
        assert_eq!(link.child.rel_id, RelId::new("compound", Some("drugs")));
        assert_eq!(link.matched_fields[0].child_field, "entered_by");

        let ambiguous: ChildSpec = serde_json::from_value(json!({
            "collectionName": "compounds",
            "table": "compound"
        }))
        .unwrap();
        assert!(matches!(
            resolver
                .child_link(analyst, &ambiguous, &location())
                .unwrap_err()
                .kind,
            SpecErrorKind::AmbiguousForeignKey { .. }
        ));
    }
}
