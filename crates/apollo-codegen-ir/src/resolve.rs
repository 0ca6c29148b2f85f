//! Turning grouped field sets into IR.
//!
//! A grouped field set collected at an abstract type holds selections made at that type
//! as well as selections narrowed to some of its possible types.
//! Resolving at the abstract type keeps the former;
//! each narrower type that was selected gets its own inline fragment branch,
//! resolved from the same grouped field set at that narrower type.

use crate::collect::is_conditional;
use crate::collect::GroupedFieldSet;
use crate::collect::VisitedFragments;
use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::ir;
use crate::type_system::TypeKind;
use crate::type_system::TypeSystem;
use apollo_compiler::ast::NamedType;
use apollo_compiler::Name;
use indexmap::IndexSet;

impl<'doc, S: TypeSystem + ?Sized> Compiler<'doc, S> {
    pub(crate) fn resolve_fields(
        &mut self,
        parent_type: &NamedType,
        grouped_field_set: &GroupedFieldSet<'doc>,
        visited_fragments: &VisitedFragments<'doc>,
        fragments_referenced: &mut IndexSet<Name>,
    ) -> Result<ir::SelectionSet, CompileError> {
        let schema = self.schema;
        fragments_referenced.extend(
            visited_fragments
                .values()
                .flatten()
                .map(|&fragment_name| fragment_name.clone()),
        );

        let mut fields = Vec::with_capacity(grouped_field_set.len());
        for (&response_name, field_set) in grouped_field_set {
            // Selections made at `parent_type` or at a type containing it
            let field_set: Vec<_> = field_set
                .iter()
                .filter(|(collected_at, _)| schema.is_subtype_of(parent_type, collected_at))
                .collect();
            let Some(&(_, first)) = field_set.first() else {
                continue;
            };

            let bare_type = first.ty.inner_named_type();
            self.types_used.add(schema, bare_type);

            let selection_set = if schema
                .type_kind(bare_type)
                .is_some_and(TypeKind::is_composite)
            {
                let mut sub_visited_fragments = VisitedFragments::default();
                let sub_grouped_field_set =
                    self.merge_selection_sets(bare_type, &field_set, &mut sub_visited_fragments)?;
                Some(self.resolve_fields(
                    bare_type,
                    &sub_grouped_field_set,
                    &sub_visited_fragments,
                    fragments_referenced,
                )?)
            } else {
                None
            };

            fields.push(ir::Field {
                response_name: response_name.clone(),
                field_name: first.field_name.clone(),
                ty: first.ty.clone(),
                args: first.arguments.iter().map(ir::Argument::from_ast).collect(),
                is_conditional: field_set
                    .iter()
                    .any(|(_, field)| is_conditional(field.directives)),
                description: schema
                    .field_definition(parent_type, first.field_name)
                    .and_then(|definition| definition.description),
                selection_set,
            });
        }

        let fragment_spreads =
            self.fragment_spreads_for_parent_type(parent_type, visited_fragments);
        let inline_fragments = self.resolve_inline_fragments(
            parent_type,
            grouped_field_set,
            visited_fragments,
            fragments_referenced,
        )?;
        for fragment_name in &fragment_spreads {
            let references = self.fragment_references(fragment_name)?;
            fragments_referenced.extend(references);
        }

        Ok(ir::SelectionSet {
            fields,
            fragment_spreads,
            inline_fragments,
        })
    }

    fn resolve_inline_fragments(
        &mut self,
        parent_type: &NamedType,
        grouped_field_set: &GroupedFieldSet<'doc>,
        visited_fragments: &VisitedFragments<'doc>,
        fragments_referenced: &mut IndexSet<Name>,
    ) -> Result<Vec<ir::InlineFragment>, CompileError> {
        let possible_types =
            self.collect_possible_types(parent_type, grouped_field_set, visited_fragments);
        let mut inline_fragments = Vec::with_capacity(possible_types.len());
        for type_condition in possible_types {
            // `type_condition` is concrete, so this produces no nested inline fragments
            let ir::SelectionSet {
                fields,
                fragment_spreads,
                ..
            } = self.resolve_fields(
                &type_condition,
                grouped_field_set,
                visited_fragments,
                fragments_referenced,
            )?;
            inline_fragments.push(ir::InlineFragment {
                possible_types: self.possible_types_for(&type_condition),
                type_condition,
                fields,
                fragment_spreads,
            });
        }
        Ok(inline_fragments)
    }

    /// Concrete types that the selections of an abstract type were narrowed to,
    /// either through inline fragments or through fragment spreads.
    ///
    /// Empty for object types, which are never narrowed.
    fn collect_possible_types(
        &self,
        parent_type: &NamedType,
        grouped_field_set: &GroupedFieldSet<'doc>,
        visited_fragments: &VisitedFragments<'doc>,
    ) -> IndexSet<NamedType> {
        let mut possible_types = IndexSet::new();
        if !self
            .schema
            .type_kind(parent_type)
            .is_some_and(TypeKind::is_abstract)
        {
            return possible_types;
        }
        let collected_at = grouped_field_set
            .values()
            .flatten()
            .map(|(collected_at, _)| collected_at);
        let spread_at = visited_fragments.keys();
        for ty in collected_at.chain(spread_at) {
            // Selections at the parent or a type containing it already apply to the parent
            if self.schema.is_subtype_of(parent_type, ty) {
                continue;
            }
            if self.schema.is_possible_type(parent_type, ty) {
                possible_types.insert(ty.clone());
            } else if self.schema.type_kind(ty).is_some_and(TypeKind::is_abstract) {
                // Another abstract type only narrows to the object types both have in common
                for object_type in self.schema.possible_types(ty) {
                    if self.schema.is_possible_type(parent_type, &object_type) {
                        possible_types.insert(object_type);
                    }
                }
            }
        }
        possible_types
    }

    /// Fragments expanded at `parent_type` itself, or at an interface or union containing it
    fn fragment_spreads_for_parent_type(
        &self,
        parent_type: &NamedType,
        visited_fragments: &VisitedFragments<'doc>,
    ) -> Vec<Name> {
        let mut fragment_spreads = IndexSet::new();
        for (effective_type, fragment_names) in visited_fragments {
            if self.schema.is_subtype_of(parent_type, effective_type) {
                fragment_spreads.extend(fragment_names.iter().map(|&name| name.clone()));
            }
        }
        fragment_spreads.into_iter().collect()
    }
}
