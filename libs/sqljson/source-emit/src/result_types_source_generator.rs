// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sqljson_core::{
    GeneratedFieldType, NamedResultTypes, ResultRepr, ResultTypeProperty, ResultTypeSpec,
    naming::upper_camel_case,
};
use tracing::{debug, instrument};

use crate::{
    CompilationUnit, SourceEmitError, SourceEmitter, SourceGenerationOptions, TypeDeclaration,
    database_type_category, emitter::emitter_for,
};

/// Query-level inputs of a generated source file beyond its result types.
#[derive(Debug, Clone, Copy)]
pub struct QuerySourceContext<'a> {
    pub query_name: &'a str,
    /// The SQL resource (file) name generated for each result representation
    pub sql_resources: &'a [(ResultRepr, String)],
    pub param_names: &'a [String],
    pub types_file_header: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub compilation_unit_name: String,
    pub source_code: String,
}

pub struct ResultTypesSourceGenerator<'o> {
    options: &'o SourceGenerationOptions,
    emitter: Box<dyn SourceEmitter>,
}

impl<'o> ResultTypesSourceGenerator<'o> {
    pub fn new(options: &'o SourceGenerationOptions) -> Self {
        Self {
            options,
            emitter: emitter_for(options),
        }
    }

    #[instrument(skip_all, fields(query = context.query_name, language = %self.emitter.language()))]
    pub fn generate(
        &self,
        context: QuerySourceContext<'_>,
        result_types: &NamedResultTypes,
    ) -> Result<GeneratedSource, SourceEmitError> {
        let declarations = result_types
            .iter()
            .filter(|(_, result_type)| !result_type.unwrapped)
            .map(|(name, result_type)| {
                Ok::<_, SourceEmitError>(TypeDeclaration {
                    name: name.to_string(),
                    properties: result_type
                        .properties
                        .iter()
                        .map(|property| {
                            Ok::<_, SourceEmitError>((
                                property.name().to_string(),
                                self.property_type(property, result_types)?,
                            ))
                        })
                        .collect::<Result<_, SourceEmitError>>()?,
                })
            })
            .collect::<Result<Vec<_>, SourceEmitError>>()?;

        let header = match (
            self.options.types_file_header.as_deref(),
            context.types_file_header,
        ) {
            (Some(general), Some(query)) => Some(format!("{general}\n{query}")),
            (general, query) => general.or(query).map(|h| h.to_string()),
        };

        let unit = CompilationUnit {
            name: self.emitter.compilation_unit_name(context.query_name),
            header,
            sql_resources: self.sql_resource_members(context.sql_resources),
            param_names: context.param_names.to_vec(),
            declarations,
        };

        debug!(
            unit = %unit.name,
            declarations = unit.declarations.len(),
            "Generated result types source"
        );

        Ok(GeneratedSource {
            source_code: self.emitter.render(&unit),
            compilation_unit_name: unit.name,
        })
    }

    /// Constant names for the SQL resources, ordered by representation name. A single resource is
    /// `sqlResource`, several are distinguished by their representation.
    fn sql_resource_members(&self, sql_resources: &[(ResultRepr, String)]) -> Vec<(String, String)> {
        let mut sorted: Vec<(String, &str)> = sql_resources
            .iter()
            .map(|(result_repr, resource_name)| (result_repr.to_string(), resource_name.as_str()))
            .collect();
        sorted.sort();

        let prefix = self
            .options
            .sql_resource_path_prefix
            .as_deref()
            .unwrap_or_default();

        sorted
            .iter()
            .map(|(result_repr, resource_name)| {
                let member_name = if sorted.len() == 1 {
                    "sqlResource".to_string()
                } else {
                    format!("sqlResource{}", upper_camel_case(result_repr))
                };
                (member_name, format!("{prefix}{resource_name}"))
            })
            .collect()
    }

    fn property_type(
        &self,
        property: &ResultTypeProperty,
        result_types: &NamedResultTypes,
    ) -> Result<String, SourceEmitError> {
        match property {
            ResultTypeProperty::TableField(field) => {
                if let Some(specified) = &field.specified_source_type {
                    return self.specified_type(specified, &field.name);
                }

                // Unknown nullability is treated as nullable
                let nullable = field.nullable.unwrap_or(true);

                if let Some(type_name) = self.options.database_type_override(&field.database_type)
                {
                    return Ok(self.emitter.with_nullability(nullable, type_name));
                }

                let category = database_type_category(&field.database_type).ok_or_else(|| {
                    SourceEmitError::UnsupportedDatabaseType {
                        field: field.database_field_name.clone(),
                        database_type: field.database_type.clone(),
                    }
                })?;

                Ok(self.emitter.with_nullability(
                    nullable,
                    self.emitter.database_field_type(category, field),
                ))
            }
            ResultTypeProperty::TableExpression(expression) => {
                let specified = expression.specified_source_type.as_ref().ok_or_else(|| {
                    SourceEmitError::MissingGeneratedType {
                        property: expression.name.clone(),
                    }
                })?;
                self.specified_type(specified, &expression.name)
            }
            ResultTypeProperty::ParentReference(parent_ref) => {
                let type_name = Self::declared_name(&parent_ref.ref_result_type, result_types)?;
                Ok(self.emitter.with_nullability(parent_ref.nullable, type_name))
            }
            ResultTypeProperty::ChildCollection(child_coll) => {
                let element_type = if child_coll.el_result_type.unwrapped {
                    self.sole_property_type(&child_coll.el_result_type, result_types)?
                } else {
                    Self::declared_name(&child_coll.el_result_type, result_types)?.to_string()
                };
                Ok(self.emitter.with_nullability(
                    child_coll.nullable,
                    &self.emitter.collection_type(&element_type),
                ))
            }
        }
    }

    fn specified_type(
        &self,
        specified: &GeneratedFieldType,
        property_name: &str,
    ) -> Result<String, SourceEmitError> {
        let language = self.emitter.language();

        specified
            .for_language(language)
            .map(|type_name| type_name.to_string())
            .ok_or_else(|| SourceEmitError::MissingTypeForLanguage {
                property: property_name.to_string(),
                language,
            })
    }

    /// The type an unwrapped result type stands for: the type of its only property.
    fn sole_property_type(
        &self,
        result_type: &ResultTypeSpec,
        result_types: &NamedResultTypes,
    ) -> Result<String, SourceEmitError> {
        match result_type.properties.as_slice() {
            [property] => self.property_type(property, result_types),
            properties => Err(SourceEmitError::InvalidUnwrappedType {
                table: result_type.table.to_string(),
                property_count: properties.len(),
            }),
        }
    }

    fn declared_name<'r>(
        result_type: &ResultTypeSpec,
        result_types: &'r NamedResultTypes,
    ) -> Result<&'r str, SourceEmitError> {
        result_types
            .name_of(result_type)
            .ok_or_else(|| SourceEmitError::UnnamedResultType {
                table: result_type.table.to_string(),
            })
    }
}
