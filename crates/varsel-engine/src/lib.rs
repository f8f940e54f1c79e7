//! Variant-aware selection for varsel: attribute matching, disambiguation,
//! the selection state machine, diagnostics, reporting and batch resolution.

pub mod diagnostics;
pub mod disambiguate;
pub mod error;
pub mod init;
pub mod matching;
pub mod report;
pub mod select;
pub mod session;

pub use diagnostics::DiagnosticReport;
pub use disambiguate::disambiguate;
pub use error::{EngineError, SelectionError, TiedCandidate};
pub use init::init_project;
pub use matching::{evaluate, AttributeMatch, MatchReport, ProvidedAttribute};
pub use report::{describe_schema, outgoing_variants, resolvable_configurations};
pub use select::{
    select_artifacts, select_variant, ArtifactSelection, Selection, SelectionOutcome,
    SelectionRequest,
};
pub use session::{
    build_registry, ResolutionKind, ResolutionReport, ResolutionSession, ResolvedDependency,
    ResolvedVariant,
};
