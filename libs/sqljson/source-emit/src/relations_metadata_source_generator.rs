// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

use indexmap::IndexMap;
use sqljson_core::SourceLanguage;
use sqljson_dbmd::{CaseSensitivity, DatabaseMetadata, Field, RelMetadata, is_quoted};
use tracing::{debug, instrument};

use crate::{GeneratedSource, SourceGenerationOptions, emitter::indent_lines};

const AUTO_GENERATED_WARNING: &str = "\
// ---------------------------------------------------------------------------
//   THIS SOURCE CODE WAS AUTO-GENERATED, ANY CHANGES MADE HERE MAY BE LOST.
// ---------------------------------------------------------------------------
";

const DEFAULT_SCHEMA_NAME: &str = "DEFAULT";

/// Renders a database metadata snapshot as source code constants: per schema, per relation,
/// the name, database type, nullability, primary key part and size of each field.
///
/// TypeScript gets a single `relations-metadata` module. Java gets a `RelationsMetadata` class
/// of nested schema and relation classes, plus the `Field` class their constants use.
pub struct RelationsMetadataSourceGenerator<'o> {
    options: &'o SourceGenerationOptions,
}

impl<'o> RelationsMetadataSourceGenerator<'o> {
    pub fn new(options: &'o SourceGenerationOptions) -> Self {
        Self { options }
    }

    #[instrument(skip_all, fields(language = %self.options.source_language))]
    pub fn generate(&self, dbmd: &DatabaseMetadata) -> Vec<GeneratedSource> {
        let names = NameStyle {
            case_sensitivity: dbmd.case_sensitivity(),
            prefer_lowercase: self.options.prefer_lowercase_names(),
        };
        let schemas = relations_by_schema(dbmd);

        debug!(schemas = schemas.len(), "Generating relations metadata source");

        match self.options.source_language {
            SourceLanguage::TypeScript => vec![GeneratedSource {
                compilation_unit_name: "relations-metadata".to_string(),
                source_code: self.with_header(typescript_module(&schemas, names)),
            }],
            SourceLanguage::Java => {
                let package_line = self.java_package_line();
                vec![
                    GeneratedSource {
                        compilation_unit_name: "Field".to_string(),
                        source_code: format!("{package_line}{JAVA_FIELD_CLASS}"),
                    },
                    GeneratedSource {
                        compilation_unit_name: "RelationsMetadata".to_string(),
                        source_code: self.with_header(format!(
                            "{package_line}{}",
                            java_class(&schemas, names)
                        )),
                    },
                ]
            }
        }
    }

    fn with_header(&self, source: String) -> String {
        let mut header = AUTO_GENERATED_WARNING.to_string();
        if let Some(types_file_header) = &self.options.types_file_header {
            header.push_str(types_file_header);
            header.push('\n');
        }
        format!("{header}\n{source}")
    }

    fn java_package_line(&self) -> String {
        match &self.options.java_options.java_package {
            Some(package) => format!("package {package};\n\n"),
            None => String::new(),
        }
    }
}

/// Relations grouped by schema, both in metadata order.
fn relations_by_schema(dbmd: &DatabaseMetadata) -> IndexMap<&str, Vec<&RelMetadata>> {
    let mut schemas: IndexMap<&str, Vec<&RelMetadata>> = IndexMap::new();
    for rel in dbmd.relation_metadatas() {
        let schema = rel.rel_id.schema.as_deref().unwrap_or(DEFAULT_SCHEMA_NAME);
        schemas.entry(schema).or_default().push(rel);
    }
    schemas
}

#[derive(Debug, Clone, Copy)]
struct NameStyle {
    case_sensitivity: CaseSensitivity,
    prefer_lowercase: bool,
}

impl NameStyle {
    fn ident(&self, name: &str) -> String {
        let stored_upper = self.case_sensitivity == CaseSensitivity::InsensitiveStoredUpper;

        if self.prefer_lowercase
            && stored_upper
            && !is_quoted(name)
            && name == name.to_uppercase()
        {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }
}

fn typescript_module(schemas: &IndexMap<&str, Vec<&RelMetadata>>, names: NameStyle) -> String {
    schemas
        .iter()
        .map(|(schema, rels)| {
            let relations = rels
                .iter()
                .map(|rel| indent_lines(&typescript_relation(rel, names), 2))
                .collect::<Vec<_>>()
                .join("\n");

            format!(
                "export const Schema_{} = {{\n{relations}\n}};\n",
                names.ident(schema)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn typescript_relation(rel: &RelMetadata, names: NameStyle) -> String {
    let rel_name = names.ident(&rel.rel_id.name);

    let mut lines = vec![format!("\"{rel_name}\": {{ // relation {rel_name}")];
    for field in &rel.fields {
        lines.push(format!(
            "  {}: {{ type: {}, nullable: {}, pkPart: {}, len: {}, prec: {}, precRadix: {}, scale: {} }},",
            string_literal(&names.ident(&field.name)),
            string_literal(&field.database_type),
            or_null(field.nullable),
            or_null(field.primary_key_part_number),
            or_null(field.length),
            or_null(field.precision),
            or_null(field.precision_radix),
            or_null(field.fractional_digits),
        ));
    }
    lines.push("},".to_string());

    lines.join("\n")
}

fn java_class(schemas: &IndexMap<&str, Vec<&RelMetadata>>, names: NameStyle) -> String {
    let schema_classes = schemas
        .iter()
        .map(|(schema, rels)| {
            let relations = rels
                .iter()
                .map(|rel| indent_lines(&java_relation(rel, names), 2))
                .collect::<Vec<_>>()
                .join("\n\n");

            indent_lines(
                &format!(
                    "public static class Schema_{}\n{{\n{relations}\n}}",
                    names.ident(schema)
                ),
                2,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("public class RelationsMetadata\n{{\n{schema_classes}\n}}\n")
}

fn java_relation(rel: &RelMetadata, names: NameStyle) -> String {
    let rel_name = names.ident(&rel.rel_id.name);
    let table_id = match &rel.rel_id.schema {
        Some(schema) => format!("{}.{rel_name}", names.ident(schema)),
        None => rel_name.clone(),
    };

    let mut lines = vec![
        format!("public static class {rel_name} // relation"),
        "{".to_string(),
        format!("  public static String tableId() {{ return {}; }}", string_literal(&table_id)),
        format!("  public static String tableName() {{ return {}; }}", string_literal(&rel_name)),
    ];
    lines.extend(rel.fields.iter().map(|field| java_field_constant(field, names)));
    lines.push("}".to_string());

    lines.join("\n")
}

fn java_field_constant(field: &Field, names: NameStyle) -> String {
    let field_name = names.ident(&field.name);
    format!(
        "  public static final Field {field_name} = new Field({}, {}, {}, {}, {}, {}, {}, {});",
        string_literal(&field_name),
        string_literal(&field.database_type),
        or_null(field.nullable),
        or_null(field.primary_key_part_number),
        or_null(field.length),
        or_null(field.precision),
        or_null(field.precision_radix),
        or_null(field.fractional_digits),
    )
}

fn string_literal(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

fn or_null<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

const JAVA_FIELD_CLASS: &str = "\
import org.checkerframework.checker.nullness.qual.Nullable;

public class Field
{
  public final String name;
  public final String databaseType;
  public final @Nullable Boolean nullable;
  public final @Nullable Integer primaryKeyPartNumber;
  public final @Nullable Integer length;
  public final @Nullable Integer precision;
  public final @Nullable Integer precisionRadix;
  public final @Nullable Integer fractionalDigits;

  public Field(
    String name,
    String databaseType,
    @Nullable Boolean nullable,
    @Nullable Integer primaryKeyPartNumber,
    @Nullable Integer length,
    @Nullable Integer precision,
    @Nullable Integer precisionRadix,
    @Nullable Integer fractionalDigits
  )
  {
    this.name = name;
    this.databaseType = databaseType;
    this.nullable = nullable;
    this.primaryKeyPartNumber = primaryKeyPartNumber;
    this.length = length;
    this.precision = precision;
    this.precisionRadix = precisionRadix;
    this.fractionalDigits = fractionalDigits;
  }

  public String toString() { return this.name; }
}
";

#[cfg(test)]
mod tests {
    use sqljson_dbmd::test_support::{drugs_metadata, drugs_metadata_stored_upper, drugs_stored_metadata};
    use test_log::test;

    use super::*;
    use crate::JavaOptions;

    fn analyst_only_metadata() -> DatabaseMetadata {
        let mut stored = drugs_stored_metadata();
        stored.relation_metadatas.retain(|rel| rel.rel_id.name == "analyst");
        stored.foreign_keys.clear();
        DatabaseMetadata::new(stored)
    }

    #[test]
    fn typescript() {
        let options = SourceGenerationOptions::new(SourceLanguage::TypeScript);

        let generated = RelationsMetadataSourceGenerator::new(&options).generate(&analyst_only_metadata());

        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].compilation_unit_name, "relations-metadata");
        assert_eq!(
            generated[0].source_code,
            [
                "// ---------------------------------------------------------------------------",
                "//   THIS SOURCE CODE WAS AUTO-GENERATED, ANY CHANGES MADE HERE MAY BE LOST.",
                "// ---------------------------------------------------------------------------",
                "",
                "export const Schema_drugs = {",
                "  \"analyst\": { // relation analyst",
                "    \"id\": { type: \"int4\", nullable: false, pkPart: 1, len: null, prec: 32, precRadix: 2, scale: 0 },",
                "    \"short_name\": { type: \"varchar\", nullable: false, pkPart: null, len: 50, prec: null, precRadix: null, scale: null },",
                "  },",
                "};",
                "",
            ]
            .join("\n")
        );
    }

    #[test]
    fn typescript_covers_every_relation() {
        let options = SourceGenerationOptions::new(SourceLanguage::TypeScript);

        let generated = RelationsMetadataSourceGenerator::new(&options).generate(&drugs_metadata());
        let source = &generated[0].source_code;

        assert_eq!(source.matches("export const Schema_").count(), 1);
        assert_eq!(source.matches("// relation ").count(), 8);
        assert!(source.contains(
            "    \"therapeutic_indications\": { type: \"text\", nullable: null, pkPart: null,"
        ));
        assert!(source.contains("    \"manufacturer_id\": { type: \"int4\", nullable: false, pkPart: 2,"));
    }

    #[test]
    fn java() {
        let options = SourceGenerationOptions {
            java_options: JavaOptions {
                java_package: Some("org.example.drugs".to_string()),
                emit_records: None,
            },
            ..SourceGenerationOptions::new(SourceLanguage::Java)
        };

        let generated = RelationsMetadataSourceGenerator::new(&options).generate(&analyst_only_metadata());

        assert_eq!(generated.len(), 2);
        assert_eq!(generated[0].compilation_unit_name, "Field");
        assert!(generated[0].source_code.starts_with(
            "package org.example.drugs;\n\nimport org.checkerframework.checker.nullness.qual.Nullable;\n\npublic class Field\n{\n"
        ));
        assert_eq!(generated[1].compilation_unit_name, "RelationsMetadata");
        assert_eq!(
            generated[1].source_code,
            [
                "// ---------------------------------------------------------------------------",
                "//   THIS SOURCE CODE WAS AUTO-GENERATED, ANY CHANGES MADE HERE MAY BE LOST.",
                "// ---------------------------------------------------------------------------",
                "",
                "package org.example.drugs;",
                "",
                "public class RelationsMetadata",
                "{",
                "  public static class Schema_drugs",
                "  {",
                "    public static class analyst // relation",
                "    {",
                "      public static String tableId() { return \"drugs.analyst\"; }",
                "      public static String tableName() { return \"analyst\"; }",
                "      public static final Field id = new Field(\"id\", \"int4\", false, 1, null, 32, 2, 0);",
                "      public static final Field short_name = new Field(\"short_name\", \"varchar\", false, null, 50, null, null, null);",
                "    }",
                "  }",
                "}",
                "",
            ]
            .join("\n")
        );
    }

    #[test]
    fn upper_case_names() {
        let dbmd = drugs_metadata_stored_upper();

        let lowercase = SourceGenerationOptions::new(SourceLanguage::Java);
        let generated = RelationsMetadataSourceGenerator::new(&lowercase).generate(&dbmd);
        let source = &generated[1].source_code;
        assert!(source.contains("  public static class Schema_drugs\n"));
        assert!(source.contains("      public static String tableId() { return \"drugs.analyst\"; }\n"));
        assert!(source.contains("      public static final Field short_name = new Field(\"short_name\", \"varchar\","));

        let as_stored = SourceGenerationOptions {
            prefer_lowercase_names: Some(false),
            ..SourceGenerationOptions::new(SourceLanguage::Java)
        };
        let generated = RelationsMetadataSourceGenerator::new(&as_stored).generate(&dbmd);
        let source = &generated[1].source_code;
        assert!(source.contains("  public static class Schema_DRUGS\n"));
        assert!(source.contains("      public static String tableId() { return \"DRUGS.ANALYST\"; }\n"));
        assert!(source.contains("      public static final Field SHORT_NAME = new Field(\"SHORT_NAME\", \"varchar\","));
    }

    #[test]
    fn relations_without_schema_and_header() {
        let mut stored = drugs_stored_metadata();
        stored.relation_metadatas.retain(|rel| rel.rel_id.name == "manufacturer");
        stored.relation_metadatas[0].rel_id.schema = None;
        stored.foreign_keys.clear();
        let options = SourceGenerationOptions {
            types_file_header: Some("/* eslint-disable */".to_string()),
            ..SourceGenerationOptions::new(SourceLanguage::TypeScript)
        };

        let generated = RelationsMetadataSourceGenerator::new(&options).generate(&DatabaseMetadata::new(stored));
        let source = &generated[0].source_code;

        assert!(source.contains("---\n/* eslint-disable */\n\nexport const Schema_DEFAULT = {\n"));
        assert!(source.contains("  \"manufacturer\": { // relation manufacturer\n"));
    }
}
