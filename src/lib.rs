// src/lib.rs
pub mod assembler;
pub mod assignments;
pub mod error;
pub mod executor;
pub mod fasta;
pub mod fastq;
pub mod materialize;
pub mod merge;
pub mod partition;
pub mod progress;
pub mod types;

use std::path::PathBuf;

pub use crate::assembler::{AssemblyOptions, ComponentAssembler, SgaAssembler};
pub use crate::error::{PipelineError, Result};
pub use crate::types::{LcaResolution, ReadCorrection, UNASSIGNED_MARKERS, UNRESOLVED_LCA};

use crate::assignments::{parse_component_lca, parse_read_components};
use crate::executor::assemble_all;
use crate::materialize::save_components;
use crate::merge::concat_components_fasta_with_lca;
use crate::partition::extract_reads_by_component;
use crate::progress::phase_spinner;

/// Inputs and knobs of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Reads to split (FASTQ, optionally gzipped).
    pub fastq: PathBuf,
    /// `<read> <metanode> <component>` rows.
    pub read_component: PathBuf,
    /// `<component> <lca>` rows.
    pub component_lca: PathBuf,
    /// Merged, annotated contigs.
    pub out_contigs_fasta: PathBuf,
    /// Where component read files and assembly working directories go.
    pub workdir: PathBuf,
    /// Number of assemblies run at once.
    pub cpu: usize,
    pub read_correction: ReadCorrection,
    /// Component values meaning "no component"; defaults to [`UNASSIGNED_MARKERS`].
    pub unassigned_markers: Vec<String>,
    pub lca_resolution: LcaResolution,
    /// Spinner per phase and a bar over assembly tasks.
    pub show_progress: bool,
}

impl PipelineConfig {
    pub fn new(
        fastq: impl Into<PathBuf>,
        read_component: impl Into<PathBuf>,
        component_lca: impl Into<PathBuf>,
        out_contigs_fasta: impl Into<PathBuf>,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fastq: fastq.into(),
            read_component: read_component.into(),
            component_lca: component_lca.into(),
            out_contigs_fasta: out_contigs_fasta.into(),
            workdir: workdir.into(),
            cpu: 1,
            read_correction: ReadCorrection::default(),
            unassigned_markers: UNASSIGNED_MARKERS.iter().map(|m| m.to_string()).collect(),
            lca_resolution: LcaResolution::default(),
            show_progress: false,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub reads_kept: usize,
    pub components: usize,
    pub contigs: u64,
}

/// Splits the reads by component, assembles every component with `assembler`
/// and writes the lca-annotated contigs to `config.out_contigs_fasta`.
///
/// Any error stops the run before the merged output is written, so an existing output
/// file is only ever replaced by a complete one.
pub fn assemble_all_components(
    config: &PipelineConfig,
    assembler: &dyn ComponentAssembler,
) -> Result<PipelineSummary> {
    let show = config.show_progress;

    // 1. Load both lookup tables up front so a bad table never wastes an assembly run
    let spinner = phase_spinner("blue", "Loading component tables...", show);
    let read_components =
        parse_read_components(&config.read_component, config.unassigned_markers.as_slice())?;
    let component_lca = parse_component_lca(&config.component_lca)?;
    spinner.finish_with_message(format!("{} reads assigned to a component.", read_components.len()));

    // 2. Split reads and save each component
    log::info!("Save components to fastq files");
    let spinner = phase_spinner("green", "Splitting reads by component...", show);
    let partition = extract_reads_by_component(&config.fastq, &read_components)?;
    let component_files = save_components(&partition, &config.workdir)?;
    spinner.finish_with_message(format!(
        "{} reads kept in {} components.",
        partition.total_reads(),
        component_files.len()
    ));
    log::info!(
        "{} reads kept in {} components",
        partition.total_reads(),
        component_files.len()
    );

    // 3. Assemble
    log::info!("Assemble components");
    let options = AssemblyOptions {
        read_correction: config.read_correction,
        cpu: 1,
    };
    let assembled = assemble_all(
        &component_files,
        assembler,
        &options,
        config.cpu,
        show,
    )?;

    // 4. Merge
    log::info!("Pool components contigs into: {}", config.out_contigs_fasta.display());
    let spinner = phase_spinner("yellow", "Writing contigs...", show);
    let merged = concat_components_fasta_with_lca(
        &assembled,
        &config.out_contigs_fasta,
        &component_lca,
        config.lca_resolution,
    )?;
    spinner.finish_with_message(format!("{} contigs written.", merged.contigs));

    Ok(PipelineSummary {
        reads_kept: partition.total_reads(),
        components: merged.components,
        contigs: merged.contigs,
    })
}
