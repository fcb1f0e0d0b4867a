//! Record construction and cross-version comparison.
//!
//! - `symbols`: classify single disassembly lines and pull out external references.
//! - `record`: turn a signature listing plus disassembly into a
//!   [`BytecodeRecord`](crate::model::BytecodeRecord).
//! - `diff`: the incremental, rolling-baseline comparison between versions.
//! - `sanity`: the redundant whole-run equality check.

pub mod diff;
pub mod record;
pub mod sanity;
pub mod symbols;

pub use diff::{
    locate_divergence, Accumulated, ConsistencyAccumulator, DivergenceError, DivergenceKind,
    ImplementationSnapshot,
};
pub use record::{build_legacy_record, build_record, RecordError};
pub use sanity::{sanity_check, InconsistencyError, FATAL_INCONSISTENCY_MESSAGE};
pub use symbols::{LineReference, SymbolExtractor, SymbolKind, DEFAULT_NAMESPACE_PREFIX};
