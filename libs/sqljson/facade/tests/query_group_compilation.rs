// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::json;
use sqljson::{
    GeneratedQuery, ParentStep, PropertySource, QueryGroupCompiler, QueryGroupSpec, ResultRepr,
    SourceGenerationOptions, SourceLanguage,
};
use sqljson_core::{
    PropertyNameDefault, Resolver, ResultTypeProperty, ResultTypeSpecGenerator, SqlSpecGenerator,
};
use sqljson_dbmd::RelId;
use sqljson_dbmd::test_support::{DRUGS_SCHEMA, drugs_metadata};
use test_log::test;

fn drugs_group() -> QueryGroupSpec {
    serde_json::from_value(json!({
        "defaultSchema": DRUGS_SCHEMA,
        "generateUnqualifiedNamesForSchemas": [DRUGS_SCHEMA],
        "querySpecs": [
            {
                "queryName": "drugs query",
                "resultRepresentations": ["JSON_OBJECT_ROWS", "JSON_ARRAY_ROW", "MULTI_COLUMN_ROWS"],
                "tableJson": {
                    "table": "drug",
                    "fieldExpressions": [
                        "id",
                        { "field": "name", "jsonProperty": "drugName", "displayOrder": 0 },
                        "mesh_id",
                        {
                            "expression": "$$.cid + 1000",
                            "jsonProperty": "cidPlus1000",
                            "fieldTypeInGeneratedSource": { "TS": "number", "Java": "@Nullable Integer" }
                        }
                    ],
                    "parentTables": [
                        {
                            "referenceName": "registeredBy",
                            "table": "analyst",
                            "fieldExpressions": ["short_name"]
                        },
                        {
                            "table": "compound",
                            "fieldExpressions": [
                                { "field": "display_name", "jsonProperty": "compoundName" }
                            ],
                            "parentTables": [
                                {
                                    "referenceName": "approvedBy",
                                    "table": "analyst",
                                    "fieldExpressions": ["short_name"],
                                    "viaForeignKeyFields": ["approved_by"]
                                }
                            ]
                        }
                    ],
                    "childTables": [
                        {
                            "collectionName": "brandNames",
                            "table": "brand",
                            "fieldExpressions": ["brand_name"],
                            "unwrap": true,
                            "orderBy": "$$.brand_name"
                        },
                        {
                            "collectionName": "advisories",
                            "table": "advisory",
                            "fieldExpressions": ["id", "text"],
                            "filter": "$$.text is not null"
                        }
                    ],
                    "recordCondition": {
                        "sql": "$$.id = :drugId or $$.name = :drugName",
                        "paramNames": ["drugId", "drugName"]
                    }
                }
            },
            {
                "queryName": "analysts",
                "resultRepresentations": ["JSON_ARRAY_ROW"],
                "orderBy": "$$.short_name",
                "tableJson": { "table": "analyst", "fieldExpressions": ["id", "short_name"] }
            }
        ]
    }))
    .unwrap()
}

fn resolver(dbmd: &sqljson_dbmd::DatabaseMetadata) -> Resolver<'_> {
    Resolver::new(dbmd, Some(DRUGS_SCHEMA), PropertyNameDefault::Camelcase)
}

#[test]
fn top_level_sql_columns_match_result_type_properties() {
    let dbmd = drugs_metadata();
    let group = drugs_group();
    let query = &group.query_specs[0];

    let sql_specs = SqlSpecGenerator::new(resolver(&dbmd))
        .generate_sql_specs(query)
        .unwrap();
    let result_types = ResultTypeSpecGenerator::new(resolver(&dbmd))
        .generate_result_type_specs(&query.table_json, &query.query_name)
        .unwrap();

    let property_names: Vec<&str> = result_types[0]
        .properties
        .iter()
        .map(|p| p.name())
        .collect();

    assert_eq!(
        property_names,
        vec![
            "drugName",
            "id",
            "meshId",
            "cidPlus1000",
            "compoundName",
            "approvedBy",
            "registeredBy",
            "brandNames",
            "advisories"
        ]
    );

    for sql_spec in sql_specs.values() {
        let projected: Vec<&str> = sql_spec.projected_names().collect();
        assert_eq!(projected, property_names);
    }
}

#[test]
fn nullability_follows_the_join_path() {
    let dbmd = drugs_metadata();
    let group = drugs_group();
    let query = &group.query_specs[0];

    let result_types = ResultTypeSpecGenerator::new(resolver(&dbmd))
        .generate_result_type_specs(&query.table_json, &query.query_name)
        .unwrap();
    let top = &result_types[0];

    let nullability = |name: &str| {
        top.properties
            .iter()
            .find(|p| p.name() == name)
            .map(|p| match p {
                ResultTypeProperty::TableField(f) => f.nullable,
                ResultTypeProperty::ParentReference(r) => Some(r.nullable),
                ResultTypeProperty::ChildCollection(c) => Some(c.nullable),
                ResultTypeProperty::TableExpression(_) => None,
            })
            .unwrap()
    };

    assert_eq!(nullability("drugName"), Some(false));
    assert_eq!(nullability("meshId"), Some(true));
    assert_eq!(nullability("compoundName"), Some(true));
    // through compound.approved_by, which is nullable
    assert_eq!(nullability("approvedBy"), Some(true));
    assert_eq!(nullability("registeredBy"), Some(false));
    assert_eq!(nullability("advisories"), Some(false));
}

#[test]
fn compiling_twice_gives_identical_output() {
    let dbmd = drugs_metadata();
    let group = drugs_group();
    let options = SourceGenerationOptions::new(SourceLanguage::Java);
    let compiler = QueryGroupCompiler::new(&dbmd, &group, Some(&options)).unwrap();

    let first = compile_ok(&compiler);
    let second = compile_ok(&compiler);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.sqls, b.sqls);
        assert_eq!(a.param_names, b.param_names);
        assert_eq!(a.result_types_source, b.result_types_source);
    }
}

#[test]
fn declarations_are_deduplicated_and_unwrapped_types_skipped() {
    let dbmd = drugs_metadata();
    let group = drugs_group();
    let options = SourceGenerationOptions::new(SourceLanguage::TypeScript);
    let compiler = QueryGroupCompiler::new(&dbmd, &group, Some(&options)).unwrap();

    let generated = compile_ok(&compiler);
    let drugs = &generated[0];

    let names: Vec<&str> = drugs
        .result_types
        .as_ref()
        .unwrap()
        .iter()
        .filter(|(_, rt)| !rt.unwrapped)
        .map(|(name, _)| name)
        .collect();
    // registeredBy and approvedBy share one analyst type
    assert_eq!(names, vec!["Drug", "Analyst", "Advisory"]);

    let source = drugs.result_types_source.as_ref().unwrap();
    assert_eq!(source.compilation_unit_name, "drugs-query");
    assert_eq!(source.source_code.matches("export interface Analyst\n").count(), 1);
    assert!(!source.source_code.contains("export interface Brand"));
    assert!(source.source_code.contains("  brandNames: string[];\n"));
    assert!(source.source_code.contains("  approvedBy: Analyst | null;\n"));
    assert!(source.source_code.contains("  cidPlus1000: number;\n"));
    assert!(source.source_code.contains("export const drugIdParam = 'drugId';\n"));
    for resource_name in [
        "drugs-query(json object rows).sql",
        "drugs-query(json array row).sql",
        "drugs-query(multi column rows).sql",
    ] {
        assert!(source.source_code.contains(&format!("\"{resource_name}\"")));
    }
}

#[test]
fn sql_representations() {
    let dbmd = drugs_metadata();
    let group = drugs_group();
    let compiler = QueryGroupCompiler::new(&dbmd, &group, None).unwrap();

    let generated = compile_ok(&compiler);
    let reprs: Vec<ResultRepr> = generated[0].sqls.iter().map(|s| s.result_repr).collect();
    assert_eq!(
        reprs,
        vec![
            ResultRepr::JsonObjectRows,
            ResultRepr::JsonArrayRow,
            ResultRepr::MultiColumnRows
        ]
    );

    let array_sql = &generated[0].sqls[1].sql;
    assert!(array_sql.contains("jsonb_agg("));
    assert!(array_sql.contains("order by q.brand_name"));
    assert!(array_sql.contains(".text is not null)"));
    assert!(array_sql.ends_with("\n"));

    let analysts = &generated[1];
    assert_eq!(analysts.sqls.len(), 1);
    assert_eq!(analysts.sqls[0].resource_name, "analysts.sql");
    assert!(
        analysts.sqls[0]
            .sql
            .contains("coalesce(jsonb_agg(jsonb_build_object(")
    );
    assert!(analysts.sqls[0].sql.contains("order by q.short_name"));
}

#[test]
fn property_metadata_follows_inline_parents() {
    let dbmd = drugs_metadata();
    let group = drugs_group();
    let compiler = QueryGroupCompiler::new(&dbmd, &group, None).unwrap();

    let generated = compile_ok(&compiler);
    let metadata = &generated[0].query_properties_metadata;

    assert_eq!(metadata.table, RelId::new("drug", Some(DRUGS_SCHEMA)));
    assert_eq!(metadata.properties.len(), 9);

    let approved_by = metadata
        .properties
        .iter()
        .find(|p| p.property_name == "approvedBy")
        .unwrap();
    assert_eq!(
        approved_by.inlined_from_ancestor_via,
        vec![ParentStep {
            parent: RelId::new("compound", Some(DRUGS_SCHEMA)),
            via_fk_fields: vec!["compound_id".to_string()],
        }]
    );
    assert!(matches!(
        &approved_by.source,
        PropertySource::ParentReference { table, .. } if table.name == "analyst"
    ));

    let brand_names = metadata
        .properties
        .iter()
        .find(|p| p.property_name == "brandNames")
        .unwrap();
    assert!(matches!(
        brand_names.source,
        PropertySource::ChildCollection { unwrapped: true, .. }
    ));
}

#[test]
fn queries_compile_concurrently() {
    let dbmd = drugs_metadata();
    let group = drugs_group();
    let options = SourceGenerationOptions::new(SourceLanguage::TypeScript);
    let compiler = QueryGroupCompiler::new(&dbmd, &group, Some(&options)).unwrap();

    let expected = compile_ok(&compiler);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| compile_ok(&compiler)))
            .collect();

        for handle in handles {
            let generated = handle.join().unwrap();
            for (a, b) in generated.iter().zip(expected.iter()) {
                assert_eq!(a.sqls, b.sqls);
                assert_eq!(a.result_types_source, b.result_types_source);
            }
        }
    });
}

fn compile_ok(compiler: &QueryGroupCompiler<'_>) -> Vec<GeneratedQuery> {
    compiler
        .compile_all()
        .into_iter()
        .map(|result| result.unwrap())
        .collect()
}
