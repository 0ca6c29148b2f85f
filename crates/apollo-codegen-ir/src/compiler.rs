use crate::collect::fragment_spreads_in;
use crate::collect::GroupedFieldSet;
use crate::collect::VisitedFragments;
use crate::error::CompileError;
use crate::ir;
use crate::type_system::TypeKind;
use crate::type_system::TypeSystem;
use crate::typename::with_typename_added;
use crate::types_used::TypesUsed;
use apollo_compiler::ast;
use apollo_compiler::ast::NamedType;
use apollo_compiler::parser::SourceMap;
use apollo_compiler::parser::SourceSpan;
use apollo_compiler::Name;
use apollo_compiler::Node;
use indexmap::IndexMap;
use indexmap::IndexSet;
use log::debug;
use log::trace;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;

/// Configuration for [`Compiler`]
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub(crate) add_typename: bool,
    pub(crate) merge_in_fields_from_fragment_spreads: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            add_typename: true,
            merge_in_fields_from_fragment_spreads: true,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `__typename` in every selection set of the printed `source`,
    /// except at the root of operations. Enabled by default.
    pub fn add_typename(mut self, add_typename: bool) -> Self {
        self.add_typename = add_typename;
        self
    }

    /// Include the fields of spread fragments in the fields of the selection they are spread into.
    /// Enabled by default.
    ///
    /// When disabled, spread fragments are still reported in `fragment_spreads`
    /// and `fragments_referenced`, and code generators are expected to
    /// compose the fragment's own compiled fields.
    pub fn merge_in_fields_from_fragment_spreads(mut self, merge: bool) -> Self {
        self.merge_in_fields_from_fragment_spreads = merge;
        self
    }
}

/// Compiles the operations and fragments of one document against a schema.
///
/// Definitions are compiled eagerly, and the first error aborts compilation.
/// The set of [used types][TypesUsed] accumulates across every definition compiled
/// by the same `Compiler`.
pub struct Compiler<'doc, S: TypeSystem + ?Sized> {
    pub(crate) schema: &'doc S,
    pub(crate) options: CompilerOptions,
    sources: &'doc SourceMap,
    operations: Vec<&'doc Node<ast::OperationDefinition>>,
    fragments: IndexMap<Name, &'doc Node<ast::FragmentDefinition>>,
    pub(crate) types_used: TypesUsed,
    /// Transitive fragment references, computed at most once per fragment
    references_by_fragment: HashMap<Name, Vec<Name>>,
    fragment_cycles_checked: bool,
}

/// Compile every operation and fragment of `document` with default options
pub fn compile_to_ir<S: TypeSystem + ?Sized>(
    schema: &S,
    document: &ast::Document,
) -> Result<ir::CompiledDocument, CompileError> {
    Compiler::new(schema, document, CompilerOptions::default()).compile()
}

impl<'doc, S: TypeSystem + ?Sized> Compiler<'doc, S> {
    pub fn new(schema: &'doc S, document: &'doc ast::Document, options: CompilerOptions) -> Self {
        let mut operations = Vec::new();
        let mut fragments = IndexMap::new();
        for definition in &document.definitions {
            match definition {
                ast::Definition::OperationDefinition(operation) => operations.push(operation),
                ast::Definition::FragmentDefinition(fragment) => {
                    fragments.insert(fragment.name.clone(), fragment);
                }
                _ => {}
            }
        }
        Self {
            schema,
            options,
            sources: &document.sources,
            operations,
            fragments,
            types_used: TypesUsed::new(),
            references_by_fragment: HashMap::new(),
            fragment_cycles_checked: false,
        }
    }

    pub fn operations(&self) -> impl Iterator<Item = &'doc Node<ast::OperationDefinition>> + '_ {
        self.operations.iter().copied()
    }

    pub fn fragments(&self) -> impl Iterator<Item = &'doc Node<ast::FragmentDefinition>> + '_ {
        self.fragments.values().copied()
    }

    pub fn types_used(&self) -> &TypesUsed {
        &self.types_used
    }

    /// Compile every operation, then every fragment, in document order
    pub fn compile(mut self) -> Result<ir::CompiledDocument, CompileError> {
        let mut operations = IndexMap::with_capacity(self.operations.len());
        for operation in self.operations.clone() {
            let compiled = self.compile_operation(operation)?;
            operations.insert(compiled.operation_name.clone(), compiled);
        }
        let mut fragments = IndexMap::with_capacity(self.fragments.len());
        for fragment in self.fragments.values().copied().collect::<Vec<_>>() {
            let compiled = self.compile_fragment(fragment)?;
            fragments.insert(compiled.fragment_name.clone(), compiled);
        }
        Ok(ir::CompiledDocument {
            operations,
            fragments,
            types_used: self.types_used.into_vec(),
        })
    }

    pub fn compile_operation(
        &mut self,
        operation: &'doc Node<ast::OperationDefinition>,
    ) -> Result<ir::CompiledOperation, CompileError> {
        self.check_fragment_cycles()?;
        let operation_name = operation
            .name
            .clone()
            .ok_or_else(|| CompileError::AnonymousOperation {
                location: operation.location(),
            })?;
        debug!("compiling operation `{operation_name}`");

        let mut variables = Vec::with_capacity(operation.variables.len());
        for variable in &operation.variables {
            let bare_type = variable.ty.inner_named_type();
            self.type_kind(bare_type, variable.location())?;
            self.types_used.add(self.schema, bare_type);
            variables.push(ir::Variable {
                name: variable.name.clone(),
                ty: (*variable.ty).clone(),
            });
        }

        let root_type = self
            .schema
            .root_operation_type(operation.operation_type)
            .ok_or_else(|| CompileError::MissingRootOperationType {
                operation_type: operation.operation_type,
                location: operation.location(),
            })?;

        let mut grouped_field_set = GroupedFieldSet::default();
        let mut visited_fragments = VisitedFragments::default();
        self.collect_fields(
            &root_type,
            &operation.selection_set,
            &mut grouped_field_set,
            &mut visited_fragments,
        )?;
        let mut fragments_referenced = IndexSet::new();
        let ir::SelectionSet { fields, .. } = self.resolve_fields(
            &root_type,
            &grouped_field_set,
            &visited_fragments,
            &mut fragments_referenced,
        )?;

        let source = self.print(&ast::Definition::OperationDefinition(operation.clone()));
        let mut source_with_fragments = source.clone();
        for fragment_name in &fragments_referenced {
            let fragment = self.fragment(fragment_name, None)?;
            source_with_fragments.push_str("\n\n");
            source_with_fragments
                .push_str(&self.print(&ast::Definition::FragmentDefinition(fragment.clone())));
        }

        debug!(
            "compiled operation `{operation_name}`: {} fields, {} fragments referenced",
            fields.len(),
            fragments_referenced.len()
        );
        Ok(ir::CompiledOperation {
            file_path: self.file_path(operation.location()),
            operation_name,
            operation_type: operation.operation_type,
            root_type,
            variables,
            source,
            source_with_fragments,
            fields,
            fragments_referenced: fragments_referenced.into_iter().collect(),
        })
    }

    pub fn compile_fragment(
        &mut self,
        fragment: &'doc Node<ast::FragmentDefinition>,
    ) -> Result<ir::CompiledFragment, CompileError> {
        self.check_fragment_cycles()?;
        debug!("compiling fragment `{}`", fragment.name);
        let (selection_set, fragments_referenced) = self.resolve_fragment(fragment)?;
        let type_condition = fragment.type_condition.clone();
        let possible_types = self.possible_types_for(&type_condition);
        let source = self.print(&ast::Definition::FragmentDefinition(fragment.clone()));
        let ir::SelectionSet {
            fields,
            fragment_spreads,
            inline_fragments,
        } = selection_set;
        Ok(ir::CompiledFragment {
            file_path: self.file_path(fragment.location()),
            fragment_name: fragment.name.clone(),
            source,
            type_condition,
            possible_types,
            fields,
            fragment_spreads,
            inline_fragments,
            fragments_referenced,
        })
    }

    /// Collect and resolve the selection set of a fragment at its own type condition,
    /// recording its transitive fragment references for later lookups.
    fn resolve_fragment(
        &mut self,
        fragment: &'doc Node<ast::FragmentDefinition>,
    ) -> Result<(ir::SelectionSet, Vec<Name>), CompileError> {
        let type_condition = &fragment.type_condition;
        self.type_kind(type_condition, fragment.location())?;
        let mut grouped_field_set = GroupedFieldSet::default();
        let mut visited_fragments = VisitedFragments::default();
        self.collect_fields(
            type_condition,
            &fragment.selection_set,
            &mut grouped_field_set,
            &mut visited_fragments,
        )?;
        let mut fragments_referenced = IndexSet::new();
        let selection_set = self.resolve_fields(
            type_condition,
            &grouped_field_set,
            &visited_fragments,
            &mut fragments_referenced,
        )?;
        let fragments_referenced: Vec<Name> = fragments_referenced.into_iter().collect();
        self.references_by_fragment
            .insert(fragment.name.clone(), fragments_referenced.clone());
        Ok((selection_set, fragments_referenced))
    }

    /// Every fragment reachable from the named fragment, transitively
    pub(crate) fn fragment_references(
        &mut self,
        fragment_name: &Name,
    ) -> Result<Vec<Name>, CompileError> {
        if let Some(references) = self.references_by_fragment.get(fragment_name) {
            trace!("reusing references of fragment `{fragment_name}`");
            return Ok(references.clone());
        }
        let fragment = self.fragment(fragment_name, None)?;
        let (_, references) = self.resolve_fragment(fragment)?;
        Ok(references)
    }

    /// Possible types of an abstract type, or the type itself
    pub(crate) fn possible_types_for(&self, ty: &NamedType) -> Vec<NamedType> {
        if self
            .schema
            .type_kind(ty)
            .is_some_and(TypeKind::is_abstract)
        {
            self.schema.possible_types(ty)
        } else {
            vec![ty.clone()]
        }
    }

    pub(crate) fn type_kind(
        &self,
        name: &NamedType,
        location: Option<SourceSpan>,
    ) -> Result<TypeKind, CompileError> {
        self.schema
            .type_kind(name)
            .ok_or_else(|| CompileError::UnknownType {
                type_name: name.clone(),
                location,
            })
    }

    pub(crate) fn fragment(
        &self,
        name: &Name,
        location: Option<SourceSpan>,
    ) -> Result<&'doc Node<ast::FragmentDefinition>, CompileError> {
        self.fragments
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::UnknownFragment {
                fragment_name: name.clone(),
                location,
            })
    }

    fn print(&self, definition: &ast::Definition) -> String {
        if self.options.add_typename {
            with_typename_added(self.schema, definition).to_string()
        } else {
            definition.to_string()
        }
    }

    fn file_path(&self, location: Option<SourceSpan>) -> Option<PathBuf> {
        let file = self.sources.get(&location?.file_id())?;
        Some(file.path().to_owned())
    }

    /// Reject fragments that spread themselves, directly or through other fragments.
    ///
    /// Collection only guards against re-expanding a fragment within one selection set,
    /// so a fragment reachable from its own sub-selections would recurse forever.
    fn check_fragment_cycles(&mut self) -> Result<(), CompileError> {
        if self.fragment_cycles_checked {
            return Ok(());
        }
        let mut done = HashSet::new();
        for fragment in self.fragments.values().copied() {
            let mut in_progress = IndexSet::new();
            self.visit_fragment_for_cycles(fragment, &mut in_progress, &mut done)?;
        }
        self.fragment_cycles_checked = true;
        Ok(())
    }

    fn visit_fragment_for_cycles(
        &self,
        fragment: &'doc Node<ast::FragmentDefinition>,
        in_progress: &mut IndexSet<&'doc Name>,
        done: &mut HashSet<&'doc Name>,
    ) -> Result<(), CompileError> {
        if done.contains(&fragment.name) {
            return Ok(());
        }
        if !in_progress.insert(&fragment.name) {
            return Err(CompileError::FragmentCycle {
                fragment_name: fragment.name.clone(),
                location: fragment.location(),
            });
        }
        let mut spreads = IndexSet::new();
        fragment_spreads_in(&fragment.selection_set, &mut spreads);
        for spread in spreads {
            // Undefined fragments are reported when they are collected
            if let Some(next) = self.fragments.get(spread).copied() {
                self.visit_fragment_for_cycles(next, in_progress, done)?;
            }
        }
        in_progress.pop();
        done.insert(&fragment.name);
        Ok(())
    }
}
