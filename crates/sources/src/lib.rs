//! Store integrations: one adapter per external product source behind a
//! shared search shape, the luxury query boost, the bounded concurrency
//! limiter, and the enrichment orchestrator that fans recommendations out to
//! the adapters and merges products back per entry.

pub mod adapter;
pub mod boost;
pub mod enrichment;
pub mod floward;
pub mod jarir;
pub mod limiter;
pub mod niceone;

pub use adapter::{build_registry, AdapterRegistry, SearchConstraints, SourceAdapter};
pub use boost::boost_luxury_keywords;
pub use enrichment::EnrichmentOrchestrator;
pub use floward::{FacetFilters, FlowardAdapter};
pub use jarir::JarirAdapter;
pub use limiter::Limiter;
pub use niceone::NiceOneAdapter;
