//! Incremental cross-version comparison of bytecode records.
//!
//! The accumulator keeps one baseline per class. The first record seen for a class becomes its
//! baseline; every later record is compared against the baseline and then replaces it, so each
//! version is checked against the version processed immediately before it (a rolling baseline).
//! The replacement happens even when a divergence is reported, which keeps one triaged divergence
//! from resurfacing on every following version.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{BytecodeRecord, MethodSignature, ReferencedSymbol};

/// Classification of a detected divergence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DivergenceKind {
    /// The divergence is attributable to a single method.
    Known { method: MethodSignature },
    /// Something differs, but no method could be named. Needs manual bisection.
    Unknown,
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { method } => write!(f, "method `{method}` differs"),
            Self::Unknown => f.write_str("unattributed mismatch"),
        }
    }
}

/// One version's view of the diverging method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationSnapshot {
    pub version: String,
    /// `None` when the version does not declare the method at all.
    pub implementation: Option<Vec<ReferencedSymbol>>,
}

impl ImplementationSnapshot {
    fn of(record: &BytecodeRecord, method: &str) -> Self {
        Self {
            version: record.version().to_string(),
            implementation: record.implementation(method).map(<[_]>::to_vec),
        }
    }
}

/// A classified mismatch between two consecutive records of the same class.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error(
    "Bytecode of {} diverged between {baseline_version} and {version}: {kind}",
    display_class(.class_name)
)]
pub struct DivergenceError {
    pub class_name: Option<String>,
    pub baseline_version: String,
    pub version: String,
    #[serde(flatten)]
    pub kind: DivergenceKind,
    /// Implementation of the named method per version, oldest first. Empty for unknown divergences.
    pub snapshots: Vec<ImplementationSnapshot>,
}

fn display_class(class_name: &Option<String>) -> &str {
    class_name.as_deref().unwrap_or("<unnamed class>")
}

impl DivergenceError {
    fn between(baseline: &BytecodeRecord, record: &BytecodeRecord, kind: DivergenceKind) -> Self {
        let snapshots = match &kind {
            DivergenceKind::Known { method } => {
                vec![
                    ImplementationSnapshot::of(baseline, method),
                    ImplementationSnapshot::of(record, method),
                ]
            }
            DivergenceKind::Unknown => Vec::new(),
        };
        Self {
            class_name: record.class_name().map(str::to_string),
            baseline_version: baseline.version().to_string(),
            version: record.version().to_string(),
            kind,
            snapshots,
        }
    }

    /// The offending method, when the divergence could be attributed.
    pub fn method(&self) -> Option<&str> {
        match &self.kind {
            DivergenceKind::Known { method } => Some(method),
            DivergenceKind::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self.kind, DivergenceKind::Known { .. })
    }

    /// Replace the snapshots with the named method's implementation in every given record.
    pub fn with_history<'a>(
        mut self,
        records: impl IntoIterator<Item = &'a BytecodeRecord>,
    ) -> Self {
        if let DivergenceKind::Known { method } = &self.kind {
            self.snapshots = records
                .into_iter()
                .map(|record| ImplementationSnapshot::of(record, method))
                .collect();
        }
        self
    }
}

/// Outcome of a successful [`ConsistencyAccumulator::accumulate`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accumulated {
    /// First record for its class; stored as the baseline without comparison.
    Baseline,
    /// Compared equal to the previous baseline, which was recorded for `previous_version`.
    Compared { previous_version: String },
}

/// Per-class rolling baselines. Owned by one verification run; nothing is global.
#[derive(Debug, Default)]
pub struct ConsistencyAccumulator {
    baselines: HashMap<Option<String>, BytecodeRecord>,
}

impl ConsistencyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `record` with its class baseline and make it the new baseline.
    pub fn accumulate(&mut self, record: &BytecodeRecord) -> Result<Accumulated, DivergenceError> {
        let key = record.class_name().map(str::to_string);
        match self.baselines.entry(key) {
            Entry::Vacant(slot) => {
                tracing::debug!(
                    class = display_class(slot.key()),
                    version = record.version(),
                    "recorded baseline"
                );
                slot.insert(record.clone());
                Ok(Accumulated::Baseline)
            }
            Entry::Occupied(mut slot) => {
                let baseline = slot.get();
                let previous_version = baseline.version().to_string();
                let divergence = locate_divergence(baseline, record)
                    .map(|kind| DivergenceError::between(baseline, record, kind));
                slot.insert(record.clone());
                match divergence {
                    Some(divergence) => Err(divergence),
                    None => Ok(Accumulated::Compared { previous_version }),
                }
            }
        }
    }

    /// Current baseline of a class (`None` for legacy unnamed records).
    pub fn baseline(&self, class_name: Option<&str>) -> Option<&BytecodeRecord> {
        self.baselines.get(&class_name.map(str::to_string))
    }

    /// Number of classes holding a baseline.
    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}

/// Find and classify the first difference between `baseline` and `record`.
///
/// Positions are walked in baseline order: first the signature at each position, then that
/// method's implementation list.
pub fn locate_divergence(
    baseline: &BytecodeRecord,
    record: &BytecodeRecord,
) -> Option<DivergenceKind> {
    let positions = baseline.methods().len().max(record.methods().len());
    for position in 0..positions {
        let expected = baseline.methods().get(position);
        let actual = record.methods().get(position);
        let signature = match (expected, actual) {
            (Some(expected), Some(actual)) if expected == actual => expected,
            _ => return Some(classify_signature_mismatch(baseline, record, expected, actual)),
        };
        let before = baseline.implementation(signature).unwrap_or_default();
        let after = record.implementation(signature).unwrap_or_default();
        if before != after {
            // The first differing symbol sits in this method's own list.
            return Some(DivergenceKind::Known { method: signature.clone() });
        }
    }
    None
}

fn classify_signature_mismatch(
    baseline: &BytecodeRecord,
    record: &BytecodeRecord,
    expected: Option<&MethodSignature>,
    actual: Option<&MethodSignature>,
) -> DivergenceKind {
    if let Some(expected) = expected {
        if !record.contains_method(expected) {
            return DivergenceKind::Known { method: expected.clone() };
        }
    }
    let Some(actual) = actual else {
        return DivergenceKind::Unknown;
    };
    if baseline.contains_method(actual) {
        return DivergenceKind::Known { method: actual.clone() };
    }
    match record.owner_of(actual).or_else(|| baseline.owner_of(actual)) {
        Some(owner) => DivergenceKind::Known { method: owner.clone() },
        None => DivergenceKind::Unknown,
    }
}
