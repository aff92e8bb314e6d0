//src/types.rs

use std::path::PathBuf;

/// Component values in the read→component file that mean "no component".
pub const UNASSIGNED_MARKERS: &[&str] = &["unassigned", "NULL"];

/// Label written for components that have no entry in the lca table.
pub const UNRESOLVED_LCA: &str = "NULL";

/// A minimal representation of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNASequence {
    pub id: String,
    pub seq: String,
    pub quals: String,
}

/// One entry of an assembled sequence collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub header: String,
    pub seq: String,
}

/// Reads of a single component in input order, and where they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFile {
    pub component_id: String,
    pub path: PathBuf,
}

/// Everything one assembler invocation needs; all paths are owned by this task alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyTask {
    pub component_id: String,
    pub input_path: PathBuf,
    pub workdir: PathBuf,
    pub output_path: PathBuf,
    pub log_path: PathBuf,
    pub tmp_dir: PathBuf,
}

/// A merged contig, numbered globally across all components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub index: u64,
    pub seq: String,
    pub component_id: String,
    pub lca: String,
}

impl Contig {
    /// Header line without the leading `>`.
    pub fn header(&self) -> String {
        format!("{} component={} lca={}", self.index, self.component_id, self.lca)
    }
}

/// How the assembler's own read correction is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReadCorrection {
    Yes,
    No,
    #[default]
    Auto,
}

impl ReadCorrection {
    /// `no` and `auto` both switch off the assembler's correction and filtering steps.
    pub fn disables_assembler_correction(self) -> bool {
        matches!(self, ReadCorrection::No | ReadCorrection::Auto)
    }
}

/// How a contig's lca label is picked from the component→lca table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LcaResolution {
    /// Each component is looked up on its own; missing entries get [`UNRESOLVED_LCA`].
    #[default]
    PerComponent,
    /// Missing entries reuse the label of the last component that had one.
    /// Only useful to reproduce output of older runs.
    CarryOver,
}
