// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The walk over a table/JSON specification shared by the SQL and result type generators.
//!
//! The walk resolves the table, its field expressions, its inline parents, its referenced parents
//! and its child collections (in that order), validating each against the metadata. What is built
//! at each step is left to a [`TableJsonFold`]. Property ordering, unwrap validation and the
//! empty-property check are done here, so every fold sees the same properties in the same order.

use crate::{
    ChildLink, ParentLink, ResolvedFieldExpr, ResolvedTable, Resolver, SpecError, SpecErrorKind,
    SpecLocation, TableJsonSpec,
};

/// The steps of building some value from a table/JSON specification.
///
/// A `Site` is what a table learns from the table enclosing it, a `Frame` is the state kept
/// while a table's properties are produced, an `Entry` is one property of a table, and an
/// `Output` is the finished value for a table.
pub trait TableJsonFold<'a> {
    type Site;
    type Frame;
    type Entry;
    type Output;

    fn begin(&self, table: &ResolvedTable<'a>, site: Self::Site) -> Self::Frame;

    fn field_entry(&self, frame: &mut Self::Frame, field: &ResolvedFieldExpr<'a>) -> Self::Entry;

    fn inline_parent_site(&self, frame: &mut Self::Frame, link: &ParentLink<'a>) -> Self::Site;

    /// The entries contributed by an inline parent, one per property of the parent, in the
    /// parent's property order.
    fn inline_parent_entries(
        &self,
        frame: &mut Self::Frame,
        link: &ParentLink<'a>,
        parent: Self::Output,
    ) -> Vec<Self::Entry>;

    fn referenced_parent_site(&self, frame: &mut Self::Frame, link: &ParentLink<'a>)
    -> Self::Site;

    fn referenced_parent_entry(
        &self,
        frame: &mut Self::Frame,
        link: &ParentLink<'a>,
        parent: Self::Output,
    ) -> Self::Entry;

    fn child_collection_site(&self, frame: &mut Self::Frame, link: &ChildLink<'a>) -> Self::Site;

    fn child_collection_entry(
        &self,
        frame: &mut Self::Frame,
        link: &ChildLink<'a>,
        child: Self::Output,
    ) -> Self::Entry;

    /// Build the table's value from its entries, already in display order.
    fn finish(
        &self,
        table: &ResolvedTable<'a>,
        frame: Self::Frame,
        entries: Vec<Self::Entry>,
    ) -> Self::Output;
}

/// The value built for a table along with the explicit display orders of its properties.
#[derive(Debug, Clone)]
pub struct Folded<O> {
    pub output: O,
    pub display_orders: Vec<Option<u32>>,
}

impl<O> Folded<O> {
    pub fn property_count(&self) -> usize {
        self.display_orders.len()
    }
}

pub fn fold_table_json<'a, F: TableJsonFold<'a>>(
    fold: &F,
    resolver: &Resolver<'a>,
    tjs: &'a TableJsonSpec,
    site: F::Site,
    location: SpecLocation,
) -> Result<Folded<F::Output>, SpecError> {
    let rel = resolver.resolve_table(&tjs.table, &location)?;

    fold_resolved(
        fold,
        resolver,
        ResolvedTable {
            spec: tjs,
            rel,
            location,
        },
        site,
    )
}

fn fold_resolved<'a, F: TableJsonFold<'a>>(
    fold: &F,
    resolver: &Resolver<'a>,
    table: ResolvedTable<'a>,
    site: F::Site,
) -> Result<Folded<F::Output>, SpecError> {
    let field_exprs = resolver.resolve_field_exprs(&table)?;

    let mut frame = fold.begin(&table, site);
    let mut entries: Vec<(Option<u32>, F::Entry)> = vec![];

    for field_expr in &field_exprs {
        entries.push((
            field_expr.display_order,
            fold.field_entry(&mut frame, field_expr),
        ));
    }

    for parent_spec in table.spec.inline_parents() {
        let location = table
            .location
            .with_part(format!("parent table '{}'", parent_spec.table_json.table));
        let link = resolver.parent_link(table.rel, parent_spec, &location)?;

        let site = fold.inline_parent_site(&mut frame, &link);
        let parent = fold_resolved(
            fold,
            resolver,
            ResolvedTable {
                spec: &parent_spec.table_json,
                rel: link.parent,
                location,
            },
            site,
        )?;

        let lifted = fold.inline_parent_entries(&mut frame, &link, parent.output);
        entries.extend(parent.display_orders.into_iter().zip(lifted));
    }

    for parent_spec in table.spec.referenced_parents() {
        let location = table.location.with_part(format!(
            "parent table '{}' via {}",
            parent_spec.table_json.table,
            parent_spec.reference_name.as_deref().unwrap_or_default()
        ));
        let link = resolver.parent_link(table.rel, parent_spec, &location)?;

        let site = fold.referenced_parent_site(&mut frame, &link);
        let parent = fold_resolved(
            fold,
            resolver,
            ResolvedTable {
                spec: &parent_spec.table_json,
                rel: link.parent,
                location,
            },
            site,
        )?;

        entries.push((
            parent_spec.display_order,
            fold.referenced_parent_entry(&mut frame, &link, parent.output),
        ));
    }

    for child_spec in &table.spec.child_tables {
        let location = table.location.with_part(format!(
            "collection '{}' of '{}' records",
            child_spec.collection_name, child_spec.table_json.table
        ));
        let link = resolver.child_link(table.rel, child_spec, &location)?;

        let site = fold.child_collection_site(&mut frame, &link);
        let child = fold_resolved(
            fold,
            resolver,
            ResolvedTable {
                spec: &child_spec.table_json,
                rel: link.child,
                location: location.clone(),
            },
            site,
        )?;

        if child_spec.unwrap() && child.property_count() != 1 {
            return Err(SpecError::new(
                location,
                SpecErrorKind::InvalidUnwrap {
                    property_count: child.property_count(),
                },
            ));
        }

        entries.push((
            child_spec.display_order,
            fold.child_collection_entry(&mut frame, &link, child.output),
        ));
    }

    if entries.is_empty() {
        return Err(SpecError::new(
            table.location.clone(),
            SpecErrorKind::EmptySelectList,
        ));
    }

    let entries = in_display_order(entries);
    let display_orders = entries.iter().map(|(order, _)| *order).collect();
    let output = fold.finish(
        &table,
        frame,
        entries.into_iter().map(|(_, entry)| entry).collect(),
    );

    Ok(Folded {
        output,
        display_orders,
    })
}

/// Stable sort by explicit display order, an entry without one taking its 1-based position.
fn in_display_order<E>(entries: Vec<(Option<u32>, E)>) -> Vec<(Option<u32>, E)> {
    let mut keyed: Vec<(u32, (Option<u32>, E))> = entries
        .into_iter()
        .enumerate()
        .map(|(ix, entry)| {
            let position = u32::try_from(ix + 1).unwrap_or(u32::MAX);
            (entry.0.unwrap_or(position), entry)
        })
        .collect();

    keyed.sort_by_key(|(key, _)| *key);

    keyed.into_iter().map(|(_, entry)| entry).collect()
}
