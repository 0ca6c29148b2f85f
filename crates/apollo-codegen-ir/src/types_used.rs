use crate::type_system::TypeKind;
use crate::type_system::TypeSystem;
use apollo_compiler::ast::NamedType;
use indexmap::IndexSet;

/// User-defined types that generated code needs declarations for:
/// enums, input objects, and custom scalars.
///
/// Input objects pull in the types of their fields, transitively.
/// Iteration order is the order in which types were first referenced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypesUsed {
    types: IndexSet<NamedType>,
}

impl TypesUsed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bare named type, ignoring composite and built-in scalar types.
    ///
    /// An input object already recorded is not walked again,
    /// which keeps self-referencing input objects from recursing forever.
    pub fn add<S: TypeSystem + ?Sized>(&mut self, schema: &S, name: &NamedType) {
        let Some(kind) = schema.type_kind(name) else {
            return;
        };
        let used = match kind {
            TypeKind::Enum | TypeKind::InputObject => true,
            TypeKind::Scalar => !schema.is_built_in_scalar(name),
            TypeKind::Object | TypeKind::Interface | TypeKind::Union => false,
        };
        if !used || !self.types.insert(name.clone()) {
            return;
        }
        if kind == TypeKind::InputObject {
            for field_type in schema.input_field_types(name) {
                self.add(schema, &field_type)
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn into_vec(self) -> Vec<NamedType> {
        self.types.into_iter().collect()
    }
}
