// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sqljson_dbmd::RelId;

use crate::GeneratedFieldType;

/// The shape of the values produced for a table: a top-level result row, a referenced parent, or
/// an element of a child collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultTypeSpec {
    pub query_name: String,
    pub table: RelId,
    pub result_type_name: Option<String>,
    /// An unwrapped type stands for its single property's value and is never declared itself
    pub unwrapped: bool,
    /// Properties in display order
    pub properties: Vec<ResultTypeProperty>,
}

impl ResultTypeSpec {
    pub fn table_field_properties(&self) -> impl Iterator<Item = &TableFieldProperty> {
        self.properties.iter().filter_map(|p| match p {
            ResultTypeProperty::TableField(field) => Some(field),
            _ => None,
        })
    }

    pub fn table_expression_properties(&self) -> impl Iterator<Item = &TableExpressionProperty> {
        self.properties.iter().filter_map(|p| match p {
            ResultTypeProperty::TableExpression(expr) => Some(expr),
            _ => None,
        })
    }

    pub fn parent_reference_properties(&self) -> impl Iterator<Item = &ParentReferenceProperty> {
        self.properties.iter().filter_map(|p| match p {
            ResultTypeProperty::ParentReference(parent_ref) => Some(parent_ref),
            _ => None,
        })
    }

    pub fn child_collection_properties(&self) -> impl Iterator<Item = &ChildCollectionProperty> {
        self.properties.iter().filter_map(|p| match p {
            ResultTypeProperty::ChildCollection(child_coll) => Some(child_coll),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultTypeProperty {
    TableField(TableFieldProperty),
    TableExpression(TableExpressionProperty),
    ParentReference(ParentReferenceProperty),
    ChildCollection(ChildCollectionProperty),
}

impl ResultTypeProperty {
    pub fn name(&self) -> &str {
        match self {
            ResultTypeProperty::TableField(p) => &p.name,
            ResultTypeProperty::TableExpression(p) => &p.name,
            ResultTypeProperty::ParentReference(p) => &p.name,
            ResultTypeProperty::ChildCollection(p) => &p.name,
        }
    }

    /// The property as contributed through a parent row which may be absent. Expression
    /// properties carry no nullability and are returned unchanged.
    pub fn to_nullable(self) -> Self {
        match self {
            ResultTypeProperty::TableField(p) => ResultTypeProperty::TableField(TableFieldProperty {
                nullable: Some(true),
                ..p
            }),
            ResultTypeProperty::TableExpression(_) => self,
            ResultTypeProperty::ParentReference(p) => {
                ResultTypeProperty::ParentReference(ParentReferenceProperty {
                    nullable: true,
                    ..p
                })
            }
            ResultTypeProperty::ChildCollection(p) => {
                ResultTypeProperty::ChildCollection(ChildCollectionProperty {
                    nullable: true,
                    ..p
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableFieldProperty {
    pub name: String,
    pub database_field_name: String,
    pub database_type: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub fractional_digits: Option<i32>,
    /// `None` when the database did not report nullability
    pub nullable: Option<bool>,
    pub specified_source_type: Option<GeneratedFieldType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableExpressionProperty {
    pub name: String,
    pub expression: String,
    pub specified_source_type: Option<GeneratedFieldType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentReferenceProperty {
    pub name: String,
    pub ref_result_type: Box<ResultTypeSpec>,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildCollectionProperty {
    pub name: String,
    /// The element type, not the collection type
    pub el_result_type: Box<ResultTypeSpec>,
    /// Whether the collection itself may be absent (when contributed through an absent parent)
    pub nullable: bool,
}
