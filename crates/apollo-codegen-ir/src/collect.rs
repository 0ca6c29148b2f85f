//! Field collection, adapted from
//! [CollectFields()](https://spec.graphql.org/October2021/#CollectFields())
//! for static analysis.
//!
//! At execution time fields are collected for one concrete object type.
//! Here the parent type may be abstract, so every collected field remembers
//! the type it was collected at, and resolution later decides which branches it belongs to.

use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::type_system::TypeKind;
use crate::type_system::TypeSystem;
use apollo_compiler::ast;
use apollo_compiler::ast::NamedType;
use apollo_compiler::ast::Type;
use apollo_compiler::Name;
use apollo_compiler::Node;
use indexmap::IndexMap;
use indexmap::IndexSet;
use log::trace;

/// A field selection as it appears at one place in the document
#[derive(Debug, Clone)]
pub(crate) struct FieldSelection<'doc> {
    pub(crate) field_name: &'doc Name,
    pub(crate) ty: Type,
    pub(crate) arguments: &'doc [Node<ast::Argument>],
    pub(crate) directives: &'doc ast::DirectiveList,
    pub(crate) selection_set: &'doc [ast::Selection],
}

/// Response name → every selection of that name, with the type it was collected at.
///
/// Keys are in order of first occurrence.
pub(crate) type GroupedFieldSet<'doc> =
    IndexMap<&'doc Name, Vec<(NamedType, FieldSelection<'doc>)>>;

/// Effective type → fragments already expanded at that type
pub(crate) type VisitedFragments<'doc> = IndexMap<NamedType, IndexSet<&'doc Name>>;

impl<'doc, S: TypeSystem + ?Sized> Compiler<'doc, S> {
    pub(crate) fn collect_fields(
        &self,
        parent_type: &NamedType,
        selection_set: &'doc [ast::Selection],
        grouped_field_set: &mut GroupedFieldSet<'doc>,
        visited_fragments: &mut VisitedFragments<'doc>,
    ) -> Result<(), CompileError> {
        let parent_kind = self.type_kind(parent_type, None)?;
        if !parent_kind.is_composite() {
            return Err(CompileError::NotCompositeType {
                type_name: parent_type.clone(),
                location: None,
            });
        }

        for selection in selection_set {
            match selection {
                ast::Selection::Field(field) => {
                    let definition = self
                        .schema
                        .field_definition(parent_type, &field.name)
                        .ok_or_else(|| CompileError::UnknownField {
                            type_name: parent_type.clone(),
                            field_name: field.name.clone(),
                            location: field.location(),
                        })?;
                    let response_name = field.alias.as_ref().unwrap_or(&field.name);
                    grouped_field_set.entry(response_name).or_default().push((
                        parent_type.clone(),
                        FieldSelection {
                            field_name: &field.name,
                            ty: definition.ty,
                            arguments: &field.arguments,
                            directives: &field.directives,
                            selection_set: &field.selection_set,
                        },
                    ))
                }
                ast::Selection::InlineFragment(inline) => {
                    let type_condition = inline.type_condition.as_ref().unwrap_or(parent_type);
                    self.type_kind(type_condition, inline.location())?;
                    let effective_type =
                        self.effective_type(parent_type, parent_kind, type_condition);
                    if *type_condition != effective_type
                        && !self
                            .schema
                            .is_proper_supertype(type_condition, &effective_type)
                    {
                        trace!(
                            "inline fragment on `{type_condition}` does not apply to `{effective_type}`"
                        );
                        continue;
                    }
                    self.collect_fields(
                        &effective_type,
                        &inline.selection_set,
                        grouped_field_set,
                        visited_fragments,
                    )?
                }
                ast::Selection::FragmentSpread(spread) => {
                    let fragment = self.fragment(&spread.fragment_name, spread.location())?;
                    self.type_kind(&fragment.type_condition, fragment.location())?;
                    let effective_type =
                        self.effective_type(parent_type, parent_kind, &fragment.type_condition);
                    let newly_visited = visited_fragments
                        .entry(effective_type.clone())
                        .or_default()
                        .insert(&fragment.name);
                    if !newly_visited {
                        trace!(
                            "fragment `{}` already expanded at `{effective_type}`",
                            fragment.name
                        );
                        continue;
                    }
                    // Without merging only the spread itself is recorded
                    if self.options.merge_in_fields_from_fragment_spreads {
                        self.collect_fields(
                            &effective_type,
                            &fragment.selection_set,
                            grouped_field_set,
                            visited_fragments,
                        )?
                    }
                }
            }
        }
        Ok(())
    }

    /// Collect the sub-selections of every occurrence of one response name
    /// into a single fresh grouped field set.
    ///
    /// <https://spec.graphql.org/October2021/#MergeSelectionSets()>
    pub(crate) fn merge_selection_sets(
        &self,
        parent_type: &NamedType,
        field_set: &[&(NamedType, FieldSelection<'doc>)],
        visited_fragments: &mut VisitedFragments<'doc>,
    ) -> Result<GroupedFieldSet<'doc>, CompileError> {
        let mut grouped_field_set = GroupedFieldSet::default();
        for (_, field) in field_set.iter().copied() {
            if !field.selection_set.is_empty() {
                self.collect_fields(
                    parent_type,
                    field.selection_set,
                    &mut grouped_field_set,
                    visited_fragments,
                )?
            }
        }
        Ok(grouped_field_set)
    }

    /// Fragments only narrow interfaces and unions:
    /// within an object type, selections are always collected at that object type.
    fn effective_type(
        &self,
        parent_type: &NamedType,
        parent_kind: TypeKind,
        type_condition: &NamedType,
    ) -> NamedType {
        if parent_kind == TypeKind::Object {
            parent_type.clone()
        } else {
            type_condition.clone()
        }
    }
}

/// Whether the selection carries `@skip` or `@include`
pub(crate) fn is_conditional(directives: &ast::DirectiveList) -> bool {
    directives
        .iter()
        .any(|directive| matches!(directive.name.as_str(), "skip" | "include"))
}

/// Names of every fragment spread anywhere in a selection set, including nested fields
pub(crate) fn fragment_spreads_in<'doc>(
    selection_set: &'doc [ast::Selection],
    spreads: &mut IndexSet<&'doc Name>,
) {
    for selection in selection_set {
        match selection {
            ast::Selection::Field(field) => fragment_spreads_in(&field.selection_set, spreads),
            ast::Selection::InlineFragment(inline) => {
                fragment_spreads_in(&inline.selection_set, spreads)
            }
            ast::Selection::FragmentSpread(spread) => {
                spreads.insert(&spread.fragment_name);
            }
        }
    }
}
