#![doc = include_str!("../README.md")]

mod collect;
mod compiler;
mod error;
pub mod ir;
mod resolve;
pub mod type_system;
mod types_used;
mod typename;

pub use self::compiler::compile_to_ir;
pub use self::compiler::Compiler;
pub use self::compiler::CompilerOptions;
pub use self::error::CompileError;
pub use self::type_system::FieldDefinition;
pub use self::type_system::TypeKind;
pub use self::type_system::TypeSystem;
pub use self::typename::with_typename_added;
pub use self::types_used::TypesUsed;
