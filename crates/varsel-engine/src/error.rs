//! Error types for varsel-engine.

use varsel_attributes::AttributeSet;

use crate::matching::MatchReport;

/// A candidate left tied after disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiedCandidate {
    pub report: MatchReport,
    /// Capability identifiers, sorted.
    pub capabilities: Vec<String>,
}

/// Failures of a single selection. Selection is pure, so none of these are
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// No candidate variant is compatible with the request.
    #[error("no matching variant of {component} was found for consumer '{consumer}' ({count} candidate(s) considered)", count = .reports.len())]
    Incompatible {
        component: String,
        consumer: String,
        requested: AttributeSet,
        /// Requested capabilities. Variants lacking one are not considered.
        capabilities: Vec<String>,
        /// One report per considered candidate, in catalog order.
        reports: Vec<MatchReport>,
    },

    /// More than one candidate survived disambiguation.
    #[error("cannot choose between {count} variants of {component} for consumer '{consumer}'", count = .candidates.len())]
    Ambiguous {
        component: String,
        consumer: String,
        requested: AttributeSet,
        candidates: Vec<TiedCandidate>,
        /// Disambiguation eliminated every candidate, so the full compatible
        /// set is reported instead.
        unreduced: bool,
        /// Groups of tied candidates that provide identical capability sets.
        conflicts: Vec<Vec<String>>,
    },

    /// The consumer named a variant that the component does not publish.
    #[error("variant '{variant}' of {component} does not exist — available variants: {available}")]
    VariantNotFound {
        component: String,
        variant: String,
        available: String,
    },

    /// The component is not in the catalog.
    #[error("component {component} is not in the variant catalog — add its .module or .pom file to the catalog directory")]
    ComponentNotFound { component: String },
}

/// Errors produced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A filesystem operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] varsel_util::UtilError),

    /// A manifest operation failed.
    #[error("{0}")]
    Config(#[from] varsel_config::ConfigError),

    /// Attribute registration or coercion failed.
    #[error("{0}")]
    Attribute(#[from] varsel_attributes::AttributeError),

    /// Catalog loading failed.
    #[error("{0}")]
    Catalog(#[from] varsel_catalog::CatalogError),

    /// A selection failed.
    #[error("{0}")]
    Selection(#[from] SelectionError),

    /// A project already exists at the target path.
    #[error("varsel.toml already exists at {path} — cannot initialize over an existing project")]
    ProjectExists { path: String },

    /// The requested configuration is not declared.
    #[error("unknown configuration '{name}' — declared configurations: {available}")]
    UnknownConfiguration { name: String, available: String },
}
