//! Symbol extraction from single lines of `javap -c` output.
//!
//! The disassembler annotates resolved constant-pool references with a trailing comment such as
//! `// Method net/minecraft/world/Level.getBlockState:(...)...`. Only references into the
//! version-specific namespace matter for divergence detection; everything else is a stable API.

use std::fmt;

use crate::model::ReferencedSymbol;

/// Package root of the version-specific platform implementation, in internal (slash) form.
pub const DEFAULT_NAMESPACE_PREFIX: &str = "net/minecraft/";

const COMMENT_MARKER: &str = "//";

/// Annotation kinds the disassembler emits in front of a resolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Method,
    InterfaceMethod,
    Field,
    Class,
}

impl SymbolKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "Method" => Some(Self::Method),
            "InterfaceMethod" => Some(Self::InterfaceMethod),
            "Field" => Some(Self::Field),
            "class" => Some(Self::Class),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Method => "Method",
            Self::InterfaceMethod => "InterfaceMethod",
            Self::Field => "Field",
            Self::Class => "class",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// What a single disassembly line says about external references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineReference<'a> {
    /// The line never mentions the external namespace.
    Unrelated,
    /// A recognized annotation whose target lies outside the external namespace.
    Stable { kind: SymbolKind },
    /// A recognized annotation referencing the external namespace.
    Symbol { kind: SymbolKind, symbol: &'a str },
    /// The line mentions the external namespace but carries no annotation kind we understand.
    Unprocessed { keyword: Option<&'a str> },
}

/// Pure line classifier parameterized by the external-namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolExtractor {
    prefix: String,
}

impl Default for SymbolExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE_PREFIX)
    }
}

impl SymbolExtractor {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Classify a line without logging.
    ///
    /// Never fails; malformed input is `Unrelated` or `Unprocessed`.
    pub fn classify<'a>(&self, line: &'a str) -> LineReference<'a> {
        if self.prefix.is_empty() || !line.contains(self.prefix.as_str()) {
            return LineReference::Unrelated;
        }
        let Some(marker) = line.find(COMMENT_MARKER) else {
            return LineReference::Unprocessed { keyword: None };
        };
        let comment = line[marker + COMMENT_MARKER.len()..].trim_start();
        let (keyword, rest) = match comment.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest),
            None => (comment, ""),
        };
        let Some(kind) = SymbolKind::from_keyword(keyword) else {
            let keyword = (!keyword.is_empty()).then_some(keyword);
            return LineReference::Unprocessed { keyword };
        };
        let candidate = rest.trim();
        if candidate.contains(self.prefix.as_str()) {
            LineReference::Symbol { kind, symbol: candidate }
        } else {
            LineReference::Stable { kind }
        }
    }

    /// Extract the external symbol a line references, if any.
    ///
    /// Lines that mention the namespace under an unknown annotation are logged and skipped.
    pub fn extract(&self, line: &str) -> Option<ReferencedSymbol> {
        match self.classify(line) {
            LineReference::Symbol { symbol, .. } => Some(symbol.to_string()),
            LineReference::Unprocessed { keyword } => {
                tracing::warn!(
                    keyword = keyword.unwrap_or("<none>"),
                    line = line.trim(),
                    "line references the external namespace but was not processed"
                );
                None
            }
            LineReference::Unrelated | LineReference::Stable { .. } => None,
        }
    }
}
