// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod java;
mod typescript;

use sqljson_core::{SourceLanguage, TableFieldProperty};

use crate::{DatabaseTypeCategory, SourceGenerationOptions};

pub use java::JavaEmitter;
pub use typescript::TypeScriptEmitter;

/// Everything a generated source file declares, with all property types already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub name: String,
    pub header: Option<String>,
    /// Constant member names and the SQL resource names they hold
    pub sql_resources: Vec<(String, String)>,
    pub param_names: Vec<String>,
    /// The top-level result type first
    pub declarations: Vec<TypeDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub name: String,
    /// Property names with their declared types
    pub properties: Vec<(String, String)>,
}

/// The target-language specifics of result type source generation.
pub trait SourceEmitter {
    fn language(&self) -> SourceLanguage;

    /// The non-nullable type for values of a database field.
    fn database_field_type(
        &self,
        category: DatabaseTypeCategory,
        field: &TableFieldProperty,
    ) -> &'static str;

    fn nullable_type(&self, type_name: &str) -> String;

    fn collection_type(&self, element_type: &str) -> String;

    fn compilation_unit_name(&self, query_name: &str) -> String;

    fn render(&self, unit: &CompilationUnit) -> String;

    fn with_nullability(&self, nullable: bool, type_name: &str) -> String {
        if nullable {
            self.nullable_type(type_name)
        } else {
            type_name.to_string()
        }
    }
}

pub(crate) fn emitter_for(options: &SourceGenerationOptions) -> Box<dyn SourceEmitter> {
    match options.source_language {
        SourceLanguage::TypeScript => Box::new(TypeScriptEmitter),
        SourceLanguage::Java => Box::new(JavaEmitter::new(options.java_options.clone())),
    }
}

pub(crate) fn indent_lines(text: &str, spaces: usize) -> String {
    let indentation = " ".repeat(spaces);

    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indentation}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
