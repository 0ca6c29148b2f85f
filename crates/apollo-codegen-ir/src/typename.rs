use crate::type_system::TypeSystem;
use apollo_compiler::ast;
use apollo_compiler::ast::NamedType;
use apollo_compiler::name;
use apollo_compiler::Node;

/// Returns a copy of an operation or fragment definition
/// that selects `__typename` first in every non-empty selection set.
///
/// Selection sets on a root operation type are left alone,
/// as are selection sets that already start with an unaliased `__typename`.
/// Other kinds of definitions are returned unchanged.
pub fn with_typename_added<S: TypeSystem + ?Sized>(
    schema: &S,
    definition: &ast::Definition,
) -> ast::Definition {
    let mut definition = definition.clone();
    match &mut definition {
        ast::Definition::OperationDefinition(operation) => {
            let operation = operation.make_mut();
            // An operation on a missing root type is reported by the compiler, print it as is
            if let Some(root_type) = schema.root_operation_type(operation.operation_type) {
                add_typename(schema, &root_type, &mut operation.selection_set)
            }
        }
        ast::Definition::FragmentDefinition(fragment) => {
            let fragment = fragment.make_mut();
            add_typename(schema, &fragment.type_condition, &mut fragment.selection_set)
        }
        _ => {}
    }
    definition
}

fn add_typename<S: TypeSystem + ?Sized>(
    schema: &S,
    parent_type: &NamedType,
    selection_set: &mut Vec<ast::Selection>,
) {
    if selection_set.is_empty() {
        return;
    }
    for selection in selection_set.iter_mut() {
        match selection {
            ast::Selection::Field(field) => {
                if field.selection_set.is_empty() {
                    continue;
                }
                let Some(definition) = schema.field_definition(parent_type, &field.name) else {
                    continue;
                };
                let field = field.make_mut();
                add_typename(
                    schema,
                    definition.ty.inner_named_type(),
                    &mut field.selection_set,
                )
            }
            ast::Selection::InlineFragment(inline) => {
                let inline = inline.make_mut();
                let type_condition = inline
                    .type_condition
                    .clone()
                    .unwrap_or_else(|| parent_type.clone());
                add_typename(schema, &type_condition, &mut inline.selection_set)
            }
            ast::Selection::FragmentSpread(_) => {}
        }
    }

    if schema.is_root_operation_type(parent_type) || starts_with_typename(selection_set) {
        return;
    }
    let typename = ast::Field {
        alias: None,
        name: name!("__typename"),
        arguments: Vec::new(),
        directives: ast::DirectiveList::default(),
        selection_set: Vec::new(),
    };
    selection_set.insert(0, ast::Selection::Field(Node::new(typename)));
}

fn starts_with_typename(selection_set: &[ast::Selection]) -> bool {
    matches!(
        selection_set.first(),
        Some(ast::Selection::Field(field))
            if field.alias.is_none() && field.name.as_str() == "__typename"
    )
}
