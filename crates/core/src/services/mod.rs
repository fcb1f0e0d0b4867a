//! Orchestration services: discovery, external tool adapters, and the verification runner.

pub mod discovery;
pub mod runner;
pub mod tools;

pub use runner::{
    run_legacy, BuildFailure, ClassReport, LegacyInput, RunMode, RunOptions, VerificationReport,
    VerificationRunner, VerifyError,
};
pub use tools::{
    ArchiveExtractor, Disassembler, DisassemblyArtifacts, JavapDisassembler, TarExtractor,
    ToolError,
};
