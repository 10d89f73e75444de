// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Metadata fixtures shared by the tests of this and the dependent crates.

use crate::{
    CaseSensitivity, DatabaseMetadata, Field, ForeignKey, ForeignKeyComponent, RelId, RelMetadata,
    RelType, StoredDatabaseMetadata,
};

pub const DRUGS_SCHEMA: &str = "drugs";

pub fn pk_field(name: impl Into<String>, part_number: u32) -> Field {
    Field {
        primary_key_part_number: Some(part_number),
        precision: Some(32),
        precision_radix: Some(2),
        fractional_digits: Some(0),
        ..field(name, "int4", false)
    }
}

pub fn field(name: impl Into<String>, database_type: impl Into<String>, nullable: bool) -> Field {
    Field {
        name: name.into(),
        database_type: database_type.into(),
        nullable: Some(nullable),
        primary_key_part_number: None,
        length: None,
        precision: None,
        precision_radix: None,
        fractional_digits: None,
    }
}

pub fn int_field(name: impl Into<String>, nullable: bool) -> Field {
    Field {
        precision: Some(32),
        precision_radix: Some(2),
        fractional_digits: Some(0),
        ..field(name, "int4", nullable)
    }
}

pub fn varchar_field(name: impl Into<String>, length: u32, nullable: bool) -> Field {
    Field {
        length: Some(length),
        ..field(name, "varchar", nullable)
    }
}

pub fn relation(name: &str, fields: Vec<Field>) -> RelMetadata {
    RelMetadata {
        rel_id: RelId::new(name, Some(DRUGS_SCHEMA)),
        rel_type: RelType::Table,
        fields,
    }
}

pub fn foreign_key(child: &str, parent: &str, components: &[(&str, &str)]) -> ForeignKey {
    ForeignKey {
        constraint_name: Some(format!(
            "{}_{}_fk",
            child,
            components
                .iter()
                .map(|(fk_field, _)| *fk_field)
                .collect::<Vec<_>>()
                .join("_")
        )),
        child_rel_id: RelId::new(child, Some(DRUGS_SCHEMA)),
        parent_rel_id: RelId::new(parent, Some(DRUGS_SCHEMA)),
        components: components
            .iter()
            .map(|(fk_field, pk_field)| ForeignKeyComponent {
                foreign_key_field_name: fk_field.to_string(),
                primary_key_field_name: pk_field.to_string(),
            })
            .collect(),
    }
}

/// A small pharmaceutical schema. Notable features:
///   - `compound` has two foreign keys to `analyst`: `entered_by` (not null) and `approved_by`
///     (nullable)
///   - `brand` has a composite primary key
///   - `drug.therapeutic_indications` has unknown nullability
pub fn drugs_stored_metadata() -> StoredDatabaseMetadata {
    StoredDatabaseMetadata {
        dbms_name: "PostgreSQL".to_string(),
        dbms_version: "16.2".to_string(),
        case_sensitivity: CaseSensitivity::InsensitiveStoredLower,
        relation_metadatas: vec![
            relation(
                "analyst",
                vec![pk_field("id", 1), varchar_field("short_name", 50, false)],
            ),
            relation(
                "compound",
                vec![
                    pk_field("id", 1),
                    varchar_field("display_name", 50, true),
                    varchar_field("nctr_isis_id", 100, true),
                    varchar_field("cas", 50, true),
                    int_field("entered_by", false),
                    int_field("approved_by", true),
                ],
            ),
            relation(
                "drug",
                vec![
                    pk_field("id", 1),
                    varchar_field("name", 500, false),
                    varchar_field("description", 2000, true),
                    varchar_field("category_code", 1, false),
                    varchar_field("descr", 500, true),
                    int_field("compound_id", false),
                    varchar_field("mesh_id", 7, true),
                    Field {
                        nullable: None,
                        ..field("therapeutic_indications", "text", true)
                    },
                    field("cid", "int4", true),
                    field("market_entry_date", "date", true),
                    int_field("registered_by", false),
                    field("is_controlled", "bool", false),
                    Field {
                        precision: Some(10),
                        precision_radix: Some(10),
                        fractional_digits: Some(2),
                        ..field("unit_price", "numeric", true)
                    },
                    field("descr_json", "jsonb", true),
                ],
            ),
            relation(
                "advisory",
                vec![
                    pk_field("id", 1),
                    int_field("drug_id", false),
                    int_field("advisory_type_id", false),
                    varchar_field("text", 2000, false),
                ],
            ),
            relation(
                "advisory_type",
                vec![
                    pk_field("id", 1),
                    varchar_field("name", 50, false),
                    int_field("authority_id", false),
                ],
            ),
            relation(
                "authority",
                vec![
                    pk_field("id", 1),
                    varchar_field("name", 200, false),
                    varchar_field("url", 500, true),
                    varchar_field("description", 2000, true),
                ],
            ),
            relation(
                "manufacturer",
                vec![pk_field("id", 1), varchar_field("name", 200, false)],
            ),
            relation(
                "brand",
                vec![
                    pk_field("drug_id", 1),
                    pk_field("manufacturer_id", 2),
                    varchar_field("brand_name", 200, false),
                ],
            ),
        ],
        foreign_keys: vec![
            foreign_key("compound", "analyst", &[("entered_by", "id")]),
            foreign_key("compound", "analyst", &[("approved_by", "id")]),
            foreign_key("drug", "compound", &[("compound_id", "id")]),
            foreign_key("drug", "analyst", &[("registered_by", "id")]),
            foreign_key("advisory", "drug", &[("drug_id", "id")]),
            foreign_key("advisory", "advisory_type", &[("advisory_type_id", "id")]),
            foreign_key("advisory_type", "authority", &[("authority_id", "id")]),
            foreign_key("brand", "drug", &[("drug_id", "id")]),
            foreign_key("brand", "manufacturer", &[("manufacturer_id", "id")]),
        ],
    }
}

pub fn drugs_metadata() -> DatabaseMetadata {
    DatabaseMetadata::new(drugs_stored_metadata())
}

/// The drugs schema as an upper-case storing database (Oracle-like) would report it.
pub fn drugs_metadata_stored_upper() -> DatabaseMetadata {
    let mut stored = drugs_stored_metadata();
    stored.dbms_name = "Oracle".to_string();
    stored.case_sensitivity = CaseSensitivity::InsensitiveStoredUpper;

    let upper_rel_id = |rel_id: &RelId| RelId {
        schema: rel_id.schema.as_ref().map(|s| s.to_uppercase()),
        name: rel_id.name.to_uppercase(),
    };

    for rel in stored.relation_metadatas.iter_mut() {
        rel.rel_id = upper_rel_id(&rel.rel_id);
        for f in rel.fields.iter_mut() {
            f.name = f.name.to_uppercase();
        }
    }
    for fk in stored.foreign_keys.iter_mut() {
        fk.child_rel_id = upper_rel_id(&fk.child_rel_id);
        fk.parent_rel_id = upper_rel_id(&fk.parent_rel_id);
        for comp in fk.components.iter_mut() {
            comp.foreign_key_field_name = comp.foreign_key_field_name.to_uppercase();
            comp.primary_key_field_name = comp.primary_key_field_name.to_uppercase();
        }
    }

    DatabaseMetadata::new(stored)
}
