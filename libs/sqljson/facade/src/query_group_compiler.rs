// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sqljson_core::{
    NamedResultTypes, PropertyNameDefault, QueryGroupSpec, QueryPropertiesMetadata, QuerySpec,
    Resolver, ResultRepr, ResultTypeSpecGenerator, SpecError, SpecErrorKind, SpecLocation,
    SqlSpecGenerator, query_properties_metadata,
};
use sqljson_dbmd::DatabaseMetadata;
use sqljson_source_emit::{
    GeneratedSource, QuerySourceContext, ResultTypesSourceGenerator, SourceGenerationOptions,
};
use sqljson_sql_emit::SqlSourceGenerator;
use tracing::{debug, instrument};

use crate::{CompileError, WithContext};

/// The outputs for one query of a group.
#[derive(Debug, Clone)]
pub struct GeneratedQuery {
    pub query_name: String,
    /// One entry per requested result representation, in request order
    pub sqls: Vec<GeneratedSql>,
    /// Names of the parameters of the query's record conditions, without duplicates
    pub param_names: Vec<String>,
    /// Sources of the result properties, read from the first representation's SQL structure
    pub query_properties_metadata: QueryPropertiesMetadata,
    /// `None` when the query does not generate result types
    pub result_types: Option<NamedResultTypes>,
    /// `None` unless result types are generated and source generation options were given
    pub result_types_source: Option<GeneratedSource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql {
    pub result_repr: ResultRepr,
    /// Suggested file name for the SQL resource
    pub resource_name: String,
    /// The SQL text, preceded by a generated header comment
    pub sql: String,
}

/// Compiles the queries of a query group against one database metadata snapshot.
///
/// The compiler holds no mutable state: a single instance may compile queries from several
/// threads at once.
pub struct QueryGroupCompiler<'a> {
    dbmd: &'a DatabaseMetadata,
    query_group: &'a QueryGroupSpec,
    sql_source_generator: SqlSourceGenerator,
    source_options: Option<&'a SourceGenerationOptions>,
}

impl<'a> QueryGroupCompiler<'a> {
    pub fn new(
        dbmd: &'a DatabaseMetadata,
        query_group: &'a QueryGroupSpec,
        source_options: Option<&'a SourceGenerationOptions>,
    ) -> Result<Self, CompileError> {
        let sql_source_generator = SqlSourceGenerator::for_database(
            dbmd,
            &query_group.generate_unqualified_names_for_schemas,
        )?;

        Ok(Self {
            dbmd,
            query_group,
            sql_source_generator,
            source_options,
        })
    }

    /// Compile every query of the group. A failing query does not affect the others.
    pub fn compile_all(&self) -> Vec<Result<GeneratedQuery, CompileError>> {
        self.query_group
            .query_specs
            .iter()
            .map(|query| self.compile(query))
            .collect()
    }

    #[instrument(skip_all, fields(query = %query.query_name))]
    pub fn compile(&self, query: &QuerySpec) -> Result<GeneratedQuery, CompileError> {
        self.compile_query(query)
            .with_context(format!("While compiling query '{}':", query.query_name))
    }

    fn compile_query(&self, query: &QuerySpec) -> Result<GeneratedQuery, CompileError> {
        let sql_specs = SqlSpecGenerator::new(self.resolver(query)).generate_sql_specs(query)?;
        let multiple_reprs = sql_specs.len() > 1;

        let first_sql_spec = sql_specs
            .values()
            .next()
            .ok_or_else(|| no_result_representations(query))?;
        let query_properties_metadata =
            query_properties_metadata(&query.query_name, first_sql_spec)?;

        let sqls = sql_specs
            .iter()
            .map(|(result_repr, sql_spec)| {
                let sql = self.sql_source_generator.make_sql(sql_spec)?;
                Ok::<_, CompileError>(GeneratedSql {
                    result_repr: *result_repr,
                    resource_name: sql_resource_name(&query.query_name, *result_repr, multiple_reprs),
                    sql: with_sql_header(&query.query_name, *result_repr, &sql),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let param_names = unique_param_names(query);

        let result_types = if query.generate_result_types() {
            let result_type_specs = ResultTypeSpecGenerator::new(self.resolver(query))
                .generate_result_type_specs(&query.table_json, &query.query_name)?;
            Some(NamedResultTypes::assign(&result_type_specs, &query.query_name)?)
        } else {
            None
        };

        let result_types_source = match (&result_types, self.source_options) {
            (Some(result_types), Some(options)) => {
                let sql_resources: Vec<(ResultRepr, String)> = sqls
                    .iter()
                    .map(|sql| (sql.result_repr, sql.resource_name.clone()))
                    .collect();

                let context = QuerySourceContext {
                    query_name: &query.query_name,
                    sql_resources: &sql_resources,
                    param_names: &param_names,
                    types_file_header: query.types_file_header.as_deref(),
                };

                Some(ResultTypesSourceGenerator::new(options).generate(context, result_types)?)
            }
            _ => None,
        };

        debug!(
            representations = sqls.len(),
            result_types = result_types.as_ref().map(|rt| rt.len()).unwrap_or_default(),
            "Compiled query"
        );

        Ok(GeneratedQuery {
            query_name: query.query_name.clone(),
            sqls,
            param_names,
            query_properties_metadata,
            result_types,
            result_types_source,
        })
    }

    fn resolver(&self, query: &QuerySpec) -> Resolver<'a> {
        let property_name_default = query
            .property_name_default
            .or(self.query_group.property_name_default)
            .unwrap_or(PropertyNameDefault::Camelcase);

        Resolver::new(
            self.dbmd,
            self.query_group.default_schema.as_deref(),
            property_name_default,
        )
    }
}

/// Compile a query group given as JSON against database metadata given as JSON.
///
/// Fails as a whole only when an input cannot be parsed or the database is unsupported.
pub fn compile_query_group_json(
    dbmd_json: &str,
    query_group_json: &str,
    source_options_json: Option<&str>,
) -> Result<Vec<Result<GeneratedQuery, CompileError>>, CompileError> {
    let dbmd = DatabaseMetadata::from_json(dbmd_json)?;
    let query_group = QueryGroupSpec::from_json(query_group_json)?;
    let source_options = source_options_json
        .map(SourceGenerationOptions::from_json)
        .transpose()?;

    let compiler = QueryGroupCompiler::new(&dbmd, &query_group, source_options.as_ref())?;
    Ok(compiler.compile_all())
}

fn no_result_representations(query: &QuerySpec) -> CompileError {
    SpecError::new(
        SpecLocation::new(&query.query_name).with_part("resultRepresentations"),
        SpecErrorKind::NoResultRepresentations,
    )
    .into()
}

/// `drugs-query.sql` for a single representation, else `drugs-query(json array row).sql`.
fn sql_resource_name(query_name: &str, result_repr: ResultRepr, multiple_reprs: bool) -> String {
    let base_name = query_name.replace(' ', "-").to_lowercase();

    if multiple_reprs {
        let repr_description = result_repr.to_string().to_lowercase().replace('_', " ");
        format!("{base_name}({repr_description}).sql")
    } else {
        format!("{base_name}.sql")
    }
}

fn with_sql_header(query_name: &str, result_repr: ResultRepr, sql: &str) -> String {
    format!(
        "-- [ THIS QUERY WAS AUTO-GENERATED, ANY CHANGES MADE HERE MAY BE LOST. ]\n-- {result_repr} results representation for {query_name}\n{sql}\n"
    )
}

fn unique_param_names(query: &QuerySpec) -> Vec<String> {
    let mut unique_names: Vec<String> = vec![];
    for name in query.param_names() {
        if !unique_names.contains(&name) {
            unique_names.push(name);
        }
    }
    unique_names
}
