// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sqljson_core::{SourceLanguage, TableFieldProperty};

use super::{CompilationUnit, SourceEmitter, TypeDeclaration};
use crate::DatabaseTypeCategory;

pub struct TypeScriptEmitter;

impl TypeScriptEmitter {
    fn declaration(declaration: &TypeDeclaration) -> String {
        let mut source = format!("export interface {}\n{{\n", declaration.name);
        for (property_name, type_name) in &declaration.properties {
            source.push_str(&format!("  {property_name}: {type_name};\n"));
        }
        source.push('}');
        source
    }
}

impl SourceEmitter for TypeScriptEmitter {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::TypeScript
    }

    fn database_field_type(
        &self,
        category: DatabaseTypeCategory,
        _field: &TableFieldProperty,
    ) -> &'static str {
        match category {
            DatabaseTypeCategory::Integer
            | DatabaseTypeCategory::BigInteger
            | DatabaseTypeCategory::ArbitraryPrecision
            | DatabaseTypeCategory::FloatingPoint => "number",
            DatabaseTypeCategory::Text => "string",
            DatabaseTypeCategory::Boolean => "boolean",
            DatabaseTypeCategory::Json => "any",
        }
    }

    fn nullable_type(&self, type_name: &str) -> String {
        format!("{type_name} | null")
    }

    fn collection_type(&self, element_type: &str) -> String {
        if element_type.contains(' ') {
            format!("({element_type})[]")
        } else {
            format!("{element_type}[]")
        }
    }

    fn compilation_unit_name(&self, query_name: &str) -> String {
        query_name.replace(' ', "-").to_lowercase()
    }

    fn render(&self, unit: &CompilationUnit) -> String {
        let mut source = String::new();

        if let Some(header) = &unit.header {
            source.push_str(header);
            source.push_str("\n\n");
        }

        source.push_str(
            "// The types defined in this file correspond to results of the following generated SQL queries.\n",
        );
        for (member_name, resource_name) in &unit.sql_resources {
            source.push_str(&format!(
                "export const {member_name} = \"{resource_name}\";\n"
            ));
        }
        source.push('\n');

        if !unit.param_names.is_empty() {
            source.push_str("// query parameters\n");
            for param_name in &unit.param_names {
                source.push_str(&format!(
                    "export const {param_name}Param = '{param_name}';\n"
                ));
            }
            source.push('\n');
        }

        source.push_str(
            "// Below are types representing the result data for the generated query, with top-level type first.\n",
        );
        source.push_str(
            &unit
                .declarations
                .iter()
                .map(|declaration| Self::declaration(declaration) + "\n")
                .collect::<Vec<_>>()
                .join("\n"),
        );

        source
    }
}
