// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::{debug, instrument};

use crate::{
    ChildCollectionProperty, ChildLink, FieldSource, ParentLink, ParentReferenceProperty,
    ResolvedFieldExpr, ResolvedTable, Resolver, ResultTypeProperty, ResultTypeSpec, SpecError,
    SpecLocation, TableExpressionProperty, TableFieldProperty, TableJsonFold, TableJsonSpec,
    fold_table_json,
};

pub struct ResultTypeSpecGenerator<'a> {
    resolver: Resolver<'a>,
}

impl<'a> ResultTypeSpecGenerator<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }

    /// The result type for the top-level table, followed by every type it references that gets
    /// its own declaration (referenced parents and child collection elements that are not
    /// unwrapped), in discovery order. Inline parents contribute properties, never types.
    #[instrument(skip_all, fields(query = query_name))]
    pub fn generate_result_type_specs(
        &self,
        tjs: &'a TableJsonSpec,
        query_name: &str,
    ) -> Result<Vec<ResultTypeSpec>, SpecError> {
        let fold = ResultTypeFold { query_name };

        let top = fold_table_json(
            &fold,
            &self.resolver,
            tjs,
            (),
            SpecLocation::new(query_name),
        )?
        .output;

        let mut result_types = vec![];
        collect_declared_types(&top, &mut result_types);
        result_types.insert(0, top);

        debug!(count = result_types.len(), "Generated result types");

        Ok(result_types)
    }
}

fn collect_declared_types(result_type: &ResultTypeSpec, declared: &mut Vec<ResultTypeSpec>) {
    for property in &result_type.properties {
        match property {
            ResultTypeProperty::ParentReference(parent_ref) => {
                declared.push(parent_ref.ref_result_type.as_ref().clone());
                collect_declared_types(&parent_ref.ref_result_type, declared);
            }
            ResultTypeProperty::ChildCollection(child_coll) => {
                if !child_coll.el_result_type.unwrapped {
                    declared.push(child_coll.el_result_type.as_ref().clone());
                }
                collect_declared_types(&child_coll.el_result_type, declared);
            }
            ResultTypeProperty::TableField(_) | ResultTypeProperty::TableExpression(_) => {}
        }
    }
}

struct ResultTypeFold<'q> {
    query_name: &'q str,
}

impl<'a> TableJsonFold<'a> for ResultTypeFold<'_> {
    type Site = ();
    type Frame = ();
    type Entry = ResultTypeProperty;
    type Output = ResultTypeSpec;

    fn begin(&self, _table: &ResolvedTable<'a>, _site: ()) {}

    fn field_entry(&self, _frame: &mut (), field: &ResolvedFieldExpr<'a>) -> ResultTypeProperty {
        match &field.source {
            FieldSource::Field(db_field) => ResultTypeProperty::TableField(TableFieldProperty {
                name: field.property_name.clone(),
                database_field_name: db_field.name.clone(),
                database_type: db_field.database_type.clone(),
                length: db_field.length,
                precision: db_field.precision,
                fractional_digits: db_field.fractional_digits,
                nullable: db_field.nullable,
                specified_source_type: field.generated_type.cloned(),
            }),
            FieldSource::Expression { sql, .. } => {
                ResultTypeProperty::TableExpression(TableExpressionProperty {
                    name: field.property_name.clone(),
                    expression: sql.to_string(),
                    specified_source_type: field.generated_type.cloned(),
                })
            }
        }
    }

    fn inline_parent_site(&self, _frame: &mut (), _link: &ParentLink<'a>) {}

    fn inline_parent_entries(
        &self,
        _frame: &mut (),
        link: &ParentLink<'a>,
        parent: ResultTypeSpec,
    ) -> Vec<ResultTypeProperty> {
        if link.match_must_exist {
            parent.properties
        } else {
            parent
                .properties
                .into_iter()
                .map(ResultTypeProperty::to_nullable)
                .collect()
        }
    }

    fn referenced_parent_site(&self, _frame: &mut (), _link: &ParentLink<'a>) {}

    fn referenced_parent_entry(
        &self,
        _frame: &mut (),
        link: &ParentLink<'a>,
        parent: ResultTypeSpec,
    ) -> ResultTypeProperty {
        ResultTypeProperty::ParentReference(ParentReferenceProperty {
            name: link.spec.reference_name.clone().unwrap_or_default(),
            ref_result_type: Box::new(parent),
            nullable: !link.match_must_exist,
        })
    }

    fn child_collection_site(&self, _frame: &mut (), _link: &ChildLink<'a>) {}

    fn child_collection_entry(
        &self,
        _frame: &mut (),
        link: &ChildLink<'a>,
        child: ResultTypeSpec,
    ) -> ResultTypeProperty {
        ResultTypeProperty::ChildCollection(ChildCollectionProperty {
            name: link.spec.collection_name.clone(),
            el_result_type: Box::new(ResultTypeSpec {
                unwrapped: link.spec.unwrap(),
                ..child
            }),
            nullable: false,
        })
    }

    fn finish(
        &self,
        table: &ResolvedTable<'a>,
        _frame: (),
        entries: Vec<ResultTypeProperty>,
    ) -> ResultTypeSpec {
        ResultTypeSpec {
            query_name: self.query_name.to_string(),
            table: table.rel.rel_id.clone(),
            result_type_name: table.spec.result_type_name.clone(),
            unwrapped: false,
            properties: entries,
        }
    }
}
