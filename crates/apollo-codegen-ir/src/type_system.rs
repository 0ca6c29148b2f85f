//! The read-only view of a schema that the compiler works against.
//!
//! Collection and resolution only ever ask a handful of questions about types:
//! what kind a type is, which fields it has, which object types satisfy an abstract type,
//! and which types are roots of operations.
//! [`TypeSystem`] captures exactly those questions,
//! and is implemented for [`apollo_compiler::Schema`].

use apollo_compiler::ast::NamedType;
use apollo_compiler::ast::OperationType;
use apollo_compiler::ast::Type;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::Schema;

/// The kind of a named type
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    /// Object, interface, and union types: the types that take a selection set
    pub fn is_composite(self) -> bool {
        matches!(self, Self::Object | Self::Interface | Self::Union)
    }

    /// Interface and union types
    pub fn is_abstract(self) -> bool {
        matches!(self, Self::Interface | Self::Union)
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Scalar | Self::Enum)
    }
}

/// What the compiler needs to know about a field definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub ty: Type,
    pub description: Option<String>,
}

pub trait TypeSystem {
    /// Returns `None` if no type with this name is defined
    fn type_kind(&self, name: &str) -> Option<TypeKind>;

    /// Returns the definition of an explicit field or meta-field of an object or interface type.
    ///
    /// `__typename` is defined on every composite type,
    /// `__schema` and `__type` on the root query type.
    fn field_definition(&self, type_name: &str, field_name: &str) -> Option<FieldDefinition>;

    /// Returns the bare named type of every field of an input object type,
    /// or an empty list for any other type.
    fn input_field_types(&self, input_object: &str) -> Vec<NamedType>;

    /// Returns the object types that satisfy an abstract type:
    /// union members in declaration order, or interface implementers in schema order.
    ///
    /// Empty for non-abstract types.
    fn possible_types(&self, abstract_type: &str) -> Vec<NamedType>;

    /// Returns whether the object type `ty` is one of the possible types of `abstract_type`
    fn is_possible_type(&self, abstract_type: &str, ty: &str) -> bool;

    /// Returns whether `maybe_subtype` is `super_type` itself,
    /// a member of the union `super_type`,
    /// or an object or interface type implementing the interface `super_type`.
    fn is_subtype_of(&self, maybe_subtype: &str, super_type: &str) -> bool;

    fn root_operation_type(&self, operation_type: OperationType) -> Option<NamedType>;

    fn is_root_operation_type(&self, name: &str) -> bool {
        [
            OperationType::Query,
            OperationType::Mutation,
            OperationType::Subscription,
        ]
        .into_iter()
        .any(|operation_type| {
            self.root_operation_type(operation_type)
                .is_some_and(|root| root.as_str() == name)
        })
    }

    fn is_built_in_scalar(&self, name: &str) -> bool {
        matches!(name, "Int" | "Float" | "String" | "Boolean" | "ID")
    }

    /// Returns whether `maybe_supertype` is `subtype` itself,
    /// or an abstract type that has `subtype` among its possible types.
    fn is_proper_supertype(&self, maybe_supertype: &str, subtype: &str) -> bool {
        maybe_supertype == subtype
            || (self
                .type_kind(maybe_supertype)
                .is_some_and(TypeKind::is_abstract)
                && self.is_possible_type(maybe_supertype, subtype))
    }
}

impl TypeSystem for Schema {
    fn type_kind(&self, name: &str) -> Option<TypeKind> {
        self.types.get(name).map(|ty| match ty {
            ExtendedType::Scalar(_) => TypeKind::Scalar,
            ExtendedType::Object(_) => TypeKind::Object,
            ExtendedType::Interface(_) => TypeKind::Interface,
            ExtendedType::Union(_) => TypeKind::Union,
            ExtendedType::Enum(_) => TypeKind::Enum,
            ExtendedType::InputObject(_) => TypeKind::InputObject,
        })
    }

    fn field_definition(&self, type_name: &str, field_name: &str) -> Option<FieldDefinition> {
        let definition = self.type_field(type_name, field_name).ok()?;
        Some(FieldDefinition {
            ty: definition.ty.clone(),
            description: definition
                .description
                .as_ref()
                .map(|description| description.to_string()),
        })
    }

    fn input_field_types(&self, input_object: &str) -> Vec<NamedType> {
        let Some(definition) = self.get_input_object(input_object) else {
            return Vec::new();
        };
        definition
            .fields
            .values()
            .map(|field| field.ty.inner_named_type().clone())
            .collect()
    }

    fn possible_types(&self, abstract_type: &str) -> Vec<NamedType> {
        match self.types.get(abstract_type) {
            Some(ExtendedType::Union(def)) => def
                .members
                .iter()
                .map(|member| member.name.clone())
                .collect(),
            Some(ExtendedType::Interface(_)) => self
                .types
                .iter()
                .filter_map(|(name, ty)| match ty {
                    ExtendedType::Object(def)
                        if def.implements_interfaces.contains(abstract_type) =>
                    {
                        Some(name.clone())
                    }
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn is_possible_type(&self, abstract_type: &str, ty: &str) -> bool {
        self.get_object(ty).is_some() && Schema::is_subtype(self, abstract_type, ty)
    }

    fn is_subtype_of(&self, maybe_subtype: &str, super_type: &str) -> bool {
        maybe_subtype == super_type || Schema::is_subtype(self, super_type, maybe_subtype)
    }

    fn root_operation_type(&self, operation_type: OperationType) -> Option<NamedType> {
        self.root_operation(operation_type).cloned()
    }
}
