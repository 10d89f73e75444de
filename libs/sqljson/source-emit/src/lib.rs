// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Result type declarations in TypeScript or Java for the named result types of a query, and
//! relations metadata constants for a database metadata snapshot.

mod database_type;
mod emitter;
mod relations_metadata_source_generator;
mod result_types_source_generator;
mod source_emit_error;
mod source_generation_options;

pub use database_type::{DatabaseTypeCategory, database_type_category};
pub use emitter::{CompilationUnit, JavaEmitter, SourceEmitter, TypeDeclaration, TypeScriptEmitter};
pub use relations_metadata_source_generator::RelationsMetadataSourceGenerator;
pub use result_types_source_generator::{GeneratedSource, QuerySourceContext, ResultTypesSourceGenerator};
pub use source_emit_error::SourceEmitError;
pub use source_generation_options::{JavaOptions, SourceGenerationOptions};
