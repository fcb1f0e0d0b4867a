//! Core data model for per-version bytecode records.
//!
//! A [`BytecodeRecord`] is built once per (version, class) pair from the disassembler's output and
//! is never mutated afterwards. Method signatures and referenced symbols are kept as the exact text
//! the disassembler emitted; they are never parsed into structured parts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declaration line of one method, exactly as emitted by the signature listing.
pub type MethodSignature = String;

/// External (version-specific) method, field, or class reference taken from a disassembly comment.
pub type ReferencedSymbol = String;

/// Structured view of one class compiled for one target-platform version.
///
/// Invariant: every signature in `methods` has exactly one entry in `method_impls` and
/// `method_impls` holds no other keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BytecodeRecord {
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    methods: Vec<MethodSignature>,
    method_impls: BTreeMap<MethodSignature, Vec<ReferencedSymbol>>,
}

impl BytecodeRecord {
    /// Create an empty record. Legacy single-class records carry no class name.
    pub fn new(version: impl Into<String>, class_name: Option<String>) -> Self {
        Self {
            version: version.into(),
            class_name,
            methods: Vec::new(),
            method_impls: BTreeMap::new(),
        }
    }

    /// Build a record from `(signature, implementation)` pairs in method order.
    ///
    /// A repeated signature keeps its first position and its last implementation list.
    pub fn from_parts<S, I>(
        version: impl Into<String>,
        class_name: Option<String>,
        methods: impl IntoIterator<Item = (S, I)>,
    ) -> Self
    where
        S: Into<MethodSignature>,
        I: IntoIterator,
        I::Item: Into<ReferencedSymbol>,
    {
        let mut record = Self::new(version, class_name);
        for (signature, implementation) in methods {
            let implementation = implementation.into_iter().map(Into::into).collect();
            record.insert_method(signature.into(), implementation);
        }
        record
    }

    pub(crate) fn insert_method(
        &mut self,
        signature: MethodSignature,
        implementation: Vec<ReferencedSymbol>,
    ) {
        if !self.method_impls.contains_key(&signature) {
            self.methods.push(signature.clone());
        }
        self.method_impls.insert(signature, implementation);
    }

    pub(crate) fn sort_methods(&mut self) {
        self.methods.sort();
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Method signatures in record order.
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    pub fn method_impls(&self) -> &BTreeMap<MethodSignature, Vec<ReferencedSymbol>> {
        &self.method_impls
    }

    /// Implementation list of `signature`, or `None` when the record does not declare it.
    pub fn implementation(&self, signature: &str) -> Option<&[ReferencedSymbol]> {
        self.method_impls.get(signature).map(Vec::as_slice)
    }

    pub fn contains_method(&self, signature: &str) -> bool {
        self.method_impls.contains_key(signature)
    }

    /// First method (in record order) whose implementation references `symbol`.
    pub fn owner_of(&self, symbol: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|signature| {
            self.method_impls.get(*signature).is_some_and(|imp| imp.iter().any(|s| s == symbol))
        })
    }

    /// Structural equality: same method sequence and the same implementation for every method.
    ///
    /// Version and class name are not part of the comparison.
    pub fn structurally_eq(&self, other: &BytecodeRecord) -> bool {
        self.methods == other.methods && self.method_impls == other.method_impls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_keeps_order_and_one_entry_per_method() {
        let record = BytecodeRecord::from_parts(
            "1.20.1",
            Some("Widget".into()),
            vec![("b()", vec!["net/x"]), ("a()", vec![]), ("b()", vec!["net/y"])],
        );
        assert_eq!(record.methods(), ["b()".to_string(), "a()".to_string()]);
        assert_eq!(record.method_impls().len(), 2);
        assert_eq!(record.implementation("b()"), Some(&["net/y".to_string()][..]));
        assert_eq!(record.implementation("a()"), Some(&[][..]));
    }

    #[test]
    fn structural_equality_ignores_version() {
        let a = BytecodeRecord::from_parts("1", None, vec![("m()", vec!["s"])]);
        let b = BytecodeRecord::from_parts("2", None, vec![("m()", vec!["s"])]);
        let c = BytecodeRecord::from_parts("3", None, vec![("m()", vec!["t"])]);
        assert!(a.structurally_eq(&b));
        assert!(!a.structurally_eq(&c));
    }

    #[test]
    fn owner_of_follows_method_order() {
        let record = BytecodeRecord::from_parts(
            "1",
            None,
            vec![("first()", vec!["shared"]), ("second()", vec!["shared", "own"])],
        );
        assert_eq!(record.owner_of("shared").map(String::as_str), Some("first()"));
        assert_eq!(record.owner_of("own").map(String::as_str), Some("second()"));
        assert!(record.owner_of("missing").is_none());
    }
}
