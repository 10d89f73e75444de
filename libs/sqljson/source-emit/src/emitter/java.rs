// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sqljson_core::{SourceLanguage, TableFieldProperty, naming::upper_camel_case};

use super::{CompilationUnit, SourceEmitter, TypeDeclaration, indent_lines};
use crate::{DatabaseTypeCategory, JavaOptions};

const STANDARD_IMPORTS: &str = "\
import java.util.*;
import java.math.*;
import java.time.*;
import org.checkerframework.checker.nullness.qual.Nullable;
import com.fasterxml.jackson.databind.JsonNode;
";

/// Largest decimal precision that always fits a Java `int`
const MAX_INT_DECIMAL_PRECISION: u32 = 9;

pub struct JavaEmitter {
    options: JavaOptions,
}

impl JavaEmitter {
    pub fn new(options: JavaOptions) -> Self {
        Self { options }
    }

    fn reference_type(type_name: &str) -> &str {
        match type_name {
            "int" => "Integer",
            "long" => "Long",
            "double" => "Double",
            "float" => "Float",
            "boolean" => "Boolean",
            "char" => "Character",
            "short" => "Short",
            "byte" => "Byte",
            _ => type_name,
        }
    }

    fn declaration(&self, declaration: &TypeDeclaration) -> String {
        if self.options.emit_records() {
            let components = declaration
                .properties
                .iter()
                .map(|(property_name, type_name)| format!("{type_name} {property_name}"))
                .collect::<Vec<_>>()
                .join(",\n");

            format!(
                "public record {}(\n{}\n){{}}",
                declaration.name,
                indent_lines(&components, 2)
            )
        } else {
            let fields = declaration
                .properties
                .iter()
                .map(|(property_name, type_name)| {
                    format!("  public {type_name} {property_name};\n")
                })
                .collect::<String>();

            format!(
                "@SuppressWarnings(\"nullness\") // fields are assigned by the deserializer\npublic static class {}\n{{\n{fields}}}",
                declaration.name
            )
        }
    }
}

impl SourceEmitter for JavaEmitter {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Java
    }

    fn database_field_type(
        &self,
        category: DatabaseTypeCategory,
        field: &TableFieldProperty,
    ) -> &'static str {
        match category {
            DatabaseTypeCategory::Integer => "int",
            DatabaseTypeCategory::BigInteger => "long",
            DatabaseTypeCategory::ArbitraryPrecision => match field.fractional_digits {
                Some(0) => match field.precision {
                    Some(precision) if precision <= MAX_INT_DECIMAL_PRECISION => "int",
                    _ => "long",
                },
                _ => "BigDecimal",
            },
            DatabaseTypeCategory::FloatingPoint => "double",
            DatabaseTypeCategory::Text => "String",
            DatabaseTypeCategory::Boolean => "boolean",
            DatabaseTypeCategory::Json => "JsonNode",
        }
    }

    fn nullable_type(&self, type_name: &str) -> String {
        format!("@Nullable {}", Self::reference_type(type_name))
    }

    fn collection_type(&self, element_type: &str) -> String {
        format!("List<{}>", Self::reference_type(element_type))
    }

    fn compilation_unit_name(&self, query_name: &str) -> String {
        upper_camel_case(query_name)
    }

    fn render(&self, unit: &CompilationUnit) -> String {
        let mut source = String::new();

        if let Some(java_package) = &self.options.java_package {
            source.push_str(&format!("package {java_package};\n\n"));
        }
        if let Some(header) = &unit.header {
            source.push_str(header);
            source.push_str("\n\n");
        }
        source.push_str(STANDARD_IMPORTS);
        source.push('\n');

        source.push_str(&format!("public class {}\n{{\n", unit.name));

        if !unit.sql_resources.is_empty() {
            source.push_str(
                "  // The types defined in this file correspond to results of the following generated SQL queries.\n",
            );
            for (member_name, resource_name) in &unit.sql_resources {
                source.push_str(&format!(
                    "  public static final String {member_name} = \"{resource_name}\";\n"
                ));
            }
            source.push('\n');
        }

        if !unit.param_names.is_empty() {
            source.push_str("  // query parameters\n");
            for param_name in &unit.param_names {
                source.push_str(&format!(
                    "  public static final String {param_name}Param = \"{param_name}\";\n"
                ));
            }
            source.push('\n');
        }

        source.push_str(
            "  // Below are types representing the result data for the generated query, with top-level result type first.\n\n",
        );
        let declarations = unit
            .declarations
            .iter()
            .map(|declaration| self.declaration(declaration) + "\n")
            .collect::<Vec<_>>()
            .join("\n");
        source.push_str(&indent_lines(&declarations, 2));
        source.push_str("}\n");

        source
    }
}
