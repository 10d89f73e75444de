// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{SqlBuilder, SqlEmitError, SqlSourceGenerator};

/// Build SQL text for a part of a [`sqljson_core::SqlSpec`].
pub trait ExpressionBuilder {
    /// Build the SQL text for the element, pushing it into the builder.
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError>;

    /// Standalone SQL text for the element.
    fn to_sql(&self, generator: &SqlSourceGenerator) -> Result<String, SqlEmitError> {
        let mut builder = SqlBuilder::new(generator.indent_spaces());
        self.build(generator, &mut builder)?;
        Ok(builder.into_sql())
    }
}

impl<T> ExpressionBuilder for Box<T>
where
    T: ExpressionBuilder,
{
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        self.as_ref().build(generator, builder)
    }
}

impl<T> ExpressionBuilder for &T
where
    T: ExpressionBuilder + ?Sized,
{
    fn build(
        &self,
        generator: &SqlSourceGenerator,
        builder: &mut SqlBuilder,
    ) -> Result<(), SqlEmitError> {
        (**self).build(generator, builder)
    }
}
