use apollo_compiler::ast::NamedType;
use apollo_compiler::ast::OperationType;
use apollo_compiler::diagnostic::CliReport;
use apollo_compiler::diagnostic::ToCliReport;
use apollo_compiler::parser::SourceSpan;
use apollo_compiler::Name;

/// Errors that abort compilation of a document.
///
/// These indicate a mismatch between the document and the schema,
/// which validating the document against the schema beforehand rules out.
#[derive(thiserror::Error, Debug, Clone)]
pub enum CompileError {
    #[error("cannot query field `{field_name}` on type `{type_name}`")]
    UnknownField {
        type_name: NamedType,
        field_name: Name,
        location: Option<SourceSpan>,
    },

    #[error("cannot find fragment `{fragment_name}`")]
    UnknownFragment {
        fragment_name: Name,
        location: Option<SourceSpan>,
    },

    #[error("type `{type_name}` is not defined in the schema")]
    UnknownType {
        type_name: NamedType,
        location: Option<SourceSpan>,
    },

    #[error("selections require a composite type, but `{type_name}` is not an object, interface, or union type")]
    NotCompositeType {
        type_name: NamedType,
        location: Option<SourceSpan>,
    },

    #[error("`{operation_type}` root operation type is not defined")]
    MissingRootOperationType {
        operation_type: OperationType,
        location: Option<SourceSpan>,
    },

    #[error("anonymous operations cannot be compiled")]
    AnonymousOperation { location: Option<SourceSpan> },

    #[error("fragment `{fragment_name}` spreads itself")]
    FragmentCycle {
        fragment_name: Name,
        location: Option<SourceSpan>,
    },
}

impl CompileError {
    pub fn location(&self) -> Option<SourceSpan> {
        match self {
            Self::UnknownField { location, .. }
            | Self::UnknownFragment { location, .. }
            | Self::UnknownType { location, .. }
            | Self::NotCompositeType { location, .. }
            | Self::MissingRootOperationType { location, .. }
            | Self::AnonymousOperation { location }
            | Self::FragmentCycle { location, .. } => *location,
        }
    }
}

impl ToCliReport for CompileError {
    fn location(&self) -> Option<SourceSpan> {
        CompileError::location(self)
    }

    fn report(&self, report: &mut CliReport) {
        match self {
            Self::UnknownField { type_name, .. } => {
                report.with_label_opt(self.location(), format!("not a field of `{type_name}`"));
            }
            Self::UnknownFragment { .. } => {
                report.with_label_opt(self.location(), "fragment not defined in this document");
            }
            Self::UnknownType { .. } => {
                report.with_label_opt(self.location(), "type not defined in the schema");
            }
            Self::NotCompositeType { type_name, .. } => {
                report.with_label_opt(
                    self.location(),
                    format!("`{type_name}` cannot have a selection set"),
                );
            }
            Self::MissingRootOperationType { operation_type, .. } => {
                report.with_label_opt(
                    self.location(),
                    format!("the schema does not support `{operation_type}` operations"),
                );
            }
            Self::AnonymousOperation { .. } => {
                report.with_label_opt(self.location(), "this operation has no name");
                report.with_help("give the operation a name");
            }
            Self::FragmentCycle { fragment_name, .. } => {
                report.with_label_opt(
                    self.location(),
                    format!("`{fragment_name}` is reachable from its own selection set"),
                );
            }
        }
    }
}
