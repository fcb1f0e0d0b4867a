use std::fmt::Write as _;

use bytecode_diff_core::analysis::{DivergenceError, DivergenceKind};
use bytecode_diff_core::services::{ClassReport, VerificationReport};

pub const SUCCESS_MESSAGE: &str = "All bytecodes are identical! No mapping issues will arise!";

/// Render a run report as human-readable text.
pub fn render_report(report: &VerificationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Versions ({}): {}", report.versions.len(), report.versions.join(", "));
    for class in &report.classes {
        render_class(&mut out, class);
    }
    if report.success() {
        let _ = writeln!(out, "{SUCCESS_MESSAGE}");
    } else {
        let divergences = report.divergences().count();
        let failures: usize = report.classes.iter().map(|c| c.build_failures.len()).sum();
        let _ = writeln!(
            out,
            "Found {divergences} divergence(s) and {failures} build failure(s)."
        );
    }
    out
}

fn class_label(class_name: Option<&str>) -> &str {
    class_name.unwrap_or("(single class)")
}

fn render_class(out: &mut String, class: &ClassReport) {
    let label = class_label(class.class_name.as_deref());
    if class.is_consistent() {
        let _ = writeln!(out, "- {label}: consistent across {} version(s)", class.versions.len());
        return;
    }
    for failure in &class.build_failures {
        let _ = writeln!(
            out,
            "- {label}: could not build record for {}: {}",
            failure.version, failure.message
        );
    }
    for divergence in &class.divergences {
        out.push_str(&render_divergence(divergence));
    }
    if class.halted {
        let _ = writeln!(out, "  (later versions of {label} were not compared)");
    }
}

/// Render one divergence the way operators triage it: the offending method, then its
/// implementation in every version seen so far.
pub fn render_divergence(divergence: &DivergenceError) -> String {
    let mut out = String::new();
    let label = class_label(divergence.class_name.as_deref());
    match &divergence.kind {
        DivergenceKind::Known { method } => {
            let _ = writeln!(out, "- {label}: There is a mappings issue with {method}");
            for snapshot in &divergence.snapshots {
                let _ = writeln!(out, "  Bytecode {}:", snapshot.version);
                let _ = writeln!(out, "  {method}");
                match &snapshot.implementation {
                    Some(symbols) if symbols.is_empty() => {
                        let _ = writeln!(out, "  \t(no external references)");
                    }
                    Some(symbols) => {
                        for symbol in symbols {
                            let _ = writeln!(out, "  \t{symbol}");
                        }
                    }
                    None => {
                        let _ = writeln!(out, "  \t(method absent)");
                    }
                }
            }
        }
        DivergenceKind::Unknown => {
            let _ = writeln!(
                out,
                "- {label}: bytecode differs between {} and {}, but no method could be named; \
                 inspect both disassemblies manually",
                divergence.baseline_version, divergence.version
            );
        }
    }
    out
}
