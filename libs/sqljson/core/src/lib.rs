// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Compilation of nested table/JSON query specifications.
//!
//! A [`QuerySpec`] describes which fields of a table to project, which parent rows to inline or
//! reference and which child rows to collect. From it, [`SqlSpecGenerator`] derives the SQL
//! structure of the query and [`ResultTypeSpecGenerator`] the shape of its results. Both walk the
//! specification with the same [`fold_table_json`] traversal and resolve names through the same
//! [`Resolver`], so a query and its result types always agree.

mod alias_scope;
pub mod naming;
mod query_properties_metadata;
mod query_spec;
mod resolution;
mod result_type_naming;
mod result_type_spec;
mod result_type_spec_generator;
mod spec_error;
mod sql_spec;
mod sql_spec_generator;
mod traversal;

#[cfg(test)]
mod test_util;

pub use alias_scope::AliasScope;
pub use query_properties_metadata::{
    ParentStep, PropertyMetadata, PropertySource, QueryPropertiesMetadata, query_properties_metadata,
};
pub use query_spec::{
    AdditionalObjectPropertyColumn, ChildSpec, CustomMatchCondition, DEFAULT_ALIAS_PLACEHOLDER,
    EquatedFields, FieldExpr, GeneratedFieldType, ParentSpec, PropertyNameDefault, QueryGroupSpec,
    QuerySpec, RecordCondition, ResultRepr, SourceLanguage, TableFieldExpr, TableJsonSpec,
};
pub use resolution::{
    ChildLink, FieldSource, MatchedField, ParentLink, ResolvedFieldExpr, ResolvedTable, Resolver,
};
pub use result_type_naming::NamedResultTypes;
pub use result_type_spec::{
    ChildCollectionProperty, ParentReferenceProperty, ResultTypeProperty, ResultTypeSpec,
    TableExpressionProperty, TableFieldProperty,
};
pub use result_type_spec_generator::ResultTypeSpecGenerator;
pub use spec_error::{SpecError, SpecErrorKind, SpecLocation};
pub use sql_spec::{
    FromEntry, HiddenPrimaryKey, OrderBy, ParentChildCondition, SelectEntry, SqlSpec, WhereEntry,
};
pub use sql_spec_generator::{SqlFrame, SqlSite, SqlSpecGenerator};
pub use traversal::{Folded, TableJsonFold, fold_table_json};
