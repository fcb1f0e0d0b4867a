//! Redundant whole-run check that every record of a class is structurally identical.
//!
//! The diff engine compares incrementally; this pass re-derives the answer from the full record set
//! so a bug in the incremental path cannot silently pass a run.

use thiserror::Error;

use crate::model::BytecodeRecord;

/// Fixed message reported when the sanity check disagrees with the incremental comparison.
pub const FATAL_INCONSISTENCY_MESSAGE: &str =
    "Bytecodes differ somewhere! The built-in checks did not catch that. Mappings issue will arise.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InconsistencyError {
    #[error("{}", FATAL_INCONSISTENCY_MESSAGE)]
    FatalInconsistency,
}

/// Group records by class name, keeping first-seen class order and per-class record order.
pub fn group_by_class(records: &[BytecodeRecord]) -> Vec<(Option<&str>, Vec<&BytecodeRecord>)> {
    let mut groups: Vec<(Option<&str>, Vec<&BytecodeRecord>)> = Vec::new();
    for record in records {
        let class_name = record.class_name();
        match groups.iter_mut().find(|(name, _)| *name == class_name) {
            Some((_, members)) => members.push(record),
            None => groups.push((class_name, vec![record])),
        }
    }
    groups
}

/// Check every record against its predecessor within the same class.
///
/// The result is a single AND across all groups; it is evaluated once, after every group.
pub fn sanity_check(records: &[BytecodeRecord]) -> Result<(), InconsistencyError> {
    let mut all_equal = true;
    for (class_name, members) in group_by_class(records) {
        let group_equal = members.windows(2).all(|pair| pair[0].structurally_eq(pair[1]));
        if !group_equal {
            tracing::error!(
                class = class_name.unwrap_or("<unnamed class>"),
                versions = members.len(),
                "sanity check found differing records"
            );
        }
        all_equal &= group_equal;
    }
    if all_equal {
        Ok(())
    } else {
        Err(InconsistencyError::FatalInconsistency)
    }
}
