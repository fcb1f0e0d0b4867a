//! Bytecode record construction from disassembler output.
//!
//! Two input styles are supported:
//! - the signature listing (`javap <class>`) paired with the full disassembly (`javap -c <class>`),
//!   keeping methods in declaration order;
//! - the legacy single-file style, where method declarations are picked out of the full disassembly
//!   by modifier keywords and sorted lexicographically.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::analysis::symbols::SymbolExtractor;
use crate::model::{BytecodeRecord, MethodSignature};

/// Member indentation used by the signature listing.
const MEMBER_INDENT: &str = "  ";

/// Modifier prefixes recognized as method declarations in the legacy style.
pub const LEGACY_DECLARATION_PREFIXES: [&str; 2] = ["public final", "protected abstract"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A declared method never appears verbatim in the disassembly.
    #[error(
        "Method `{signature}` declared for {} in {version} was not found in the disassembly",
        display_class(.class_name)
    )]
    MissingMethodBody { version: String, class_name: Option<String>, signature: MethodSignature },
}

fn display_class(class_name: &Option<String>) -> &str {
    class_name.as_deref().unwrap_or("<unnamed class>")
}

/// Whether a signature-listing line declares a member (two-space indent, then text).
pub fn is_method_declaration(line: &str) -> bool {
    line.strip_prefix(MEMBER_INDENT)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_whitespace())
}

/// Whether a preprocessed legacy line declares a method.
pub fn is_legacy_declaration(line: &str) -> bool {
    LEGACY_DECLARATION_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Whether a preprocessed legacy line starts a new member: text at column zero.
///
/// Instruction, `Code:` and table lines keep some indent after the legacy strip.
fn is_legacy_member_line(line: &str) -> bool {
    line.chars().next().is_some_and(|c| !c.is_whitespace())
}

/// Build a record from a signature listing and the matching full disassembly.
pub fn build_record<L: AsRef<str>, D: AsRef<str>>(
    version: &str,
    class_name: &str,
    signature_lines: &[L],
    disassembly_lines: &[D],
    extractor: &SymbolExtractor,
) -> Result<BytecodeRecord, RecordError> {
    let _span = tracing::info_span!("build_record", version, class = class_name).entered();

    let signatures: Vec<MethodSignature> = signature_lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| is_method_declaration(line))
        .map(|line| line.trim().to_string())
        .collect();
    let disassembly: Vec<&str> = disassembly_lines.iter().map(AsRef::as_ref).collect();

    let mut record = BytecodeRecord::new(version, Some(class_name.to_string()));
    collect_bodies(&mut record, signatures, &disassembly, is_method_declaration, extractor)?;
    tracing::debug!(methods = record.methods().len(), "built bytecode record");
    Ok(record)
}

/// Build a record from a single legacy-style disassembly file.
///
/// Lines of three or more characters lose their first two characters before matching; methods are
/// sorted lexicographically once their bodies have been collected.
pub fn build_legacy_record<S: AsRef<str>>(
    version: &str,
    disassembly_lines: &[S],
    extractor: &SymbolExtractor,
) -> Result<BytecodeRecord, RecordError> {
    let _span = tracing::info_span!("build_legacy_record", version).entered();

    let lines: Vec<&str> =
        disassembly_lines.iter().map(|line| strip_legacy_indent(line.as_ref())).collect();
    let signatures: Vec<MethodSignature> = lines
        .iter()
        .filter(|line| is_legacy_declaration(line))
        .map(|line| line.trim().to_string())
        .collect();

    let mut record = BytecodeRecord::new(version, None);
    collect_bodies(&mut record, signatures, &lines, is_legacy_member_line, extractor)?;
    record.sort_methods();
    Ok(record)
}

fn strip_legacy_indent(line: &str) -> &str {
    if line.chars().count() < 3 {
        return line;
    }
    let mut chars = line.char_indices().skip(2);
    chars.next().map_or(line, |(offset, _)| &line[offset..])
}

/// Scan the body of every signature and attach its external symbols to `record`.
///
/// A body ends at the next line `starts_member` accepts, whether or not that member is tracked.
fn collect_bodies(
    record: &mut BytecodeRecord,
    signatures: Vec<MethodSignature>,
    disassembly: &[&str],
    starts_member: fn(&str) -> bool,
    extractor: &SymbolExtractor,
) -> Result<(), RecordError> {
    let known: HashSet<&str> = signatures.iter().map(String::as_str).collect();

    // First occurrence of each declaration inside the disassembly.
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (index, line) in disassembly.iter().enumerate() {
        let trimmed = line.trim();
        if known.contains(trimmed) {
            positions.entry(trimmed).or_insert(index);
        }
    }

    let mut bodies = Vec::with_capacity(signatures.len());
    for signature in &signatures {
        let Some(&start) = positions.get(signature.as_str()) else {
            return Err(RecordError::MissingMethodBody {
                version: record.version().to_string(),
                class_name: record.class_name().map(str::to_string),
                signature: signature.clone(),
            });
        };

        let mut implementation = Vec::new();
        for line in &disassembly[start + 1..] {
            if starts_member(line) || known.contains(line.trim()) {
                break;
            }
            if let Some(symbol) = extractor.extract(line) {
                implementation.push(symbol);
            }
        }
        bodies.push(implementation);
    }

    for (signature, implementation) in signatures.into_iter().zip(bodies) {
        record.insert_method(signature, implementation);
    }
    Ok(())
}
