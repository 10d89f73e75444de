// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Compiles query group specifications into SQL text and result type source code.
//!
//! A [`QueryGroupCompiler`] is created once per query group and database metadata snapshot, and
//! compiles each query of the group independently:
//!
//! - the SQL for each requested result representation, rendered in the database's dialect
//! - the result types of the query and, when source generation options are given, their
//!   TypeScript or Java declarations

mod compile_error;
pub mod logging_tracing;
mod query_group_compiler;

pub use compile_error::{CompileError, WithContext};
pub use query_group_compiler::{
    GeneratedQuery, GeneratedSql, QueryGroupCompiler, compile_query_group_json,
};

pub use sqljson_core::{
    NamedResultTypes, ParentStep, PropertyMetadata, PropertyNameDefault, PropertySource,
    QueryGroupSpec, QueryPropertiesMetadata, QuerySpec, ResultRepr, ResultTypeSpec, SourceLanguage,
    SpecError, SpecErrorKind, SqlSpec,
};
pub use sqljson_dbmd::{DatabaseMetadata, DatabaseMetadataError};
pub use sqljson_sql_emit::SqlEmitError;
pub use sqljson_source_emit::{
    GeneratedSource, JavaOptions, RelationsMetadataSourceGenerator, SourceEmitError, SourceGenerationOptions,
};
