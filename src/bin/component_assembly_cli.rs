use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use component_assembly::{
    assemble_all_components, LcaResolution, PipelineConfig, ReadCorrection, SgaAssembler,
};

/// Assemble reads component by component and pool the contigs with their lca.
#[derive(Parser, Debug)]
#[command(name = "component-assembly")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Reads to assemble (FASTQ, optionally .gz)
    #[arg(short = 'f', long)]
    fastq: PathBuf,

    /// read -> metanode -> component table
    #[arg(short = 'r', long)]
    read_component: PathBuf,

    /// component -> lca table
    #[arg(short = 'l', long)]
    component_lca: PathBuf,

    /// Output contigs FASTA
    #[arg(short = 'o', long)]
    out_contigs: PathBuf,

    /// Working directory for component reads and assemblies
    #[arg(short = 'w', long)]
    workdir: PathBuf,

    /// Number of components assembled at once
    #[arg(short = 'c', long, default_value_t = 1)]
    cpu: usize,

    /// Assembler read correction policy
    #[arg(long, value_enum, default_value_t = ReadCorrection::Auto)]
    read_correction: ReadCorrection,

    /// SGA assembly wrapper script
    #[arg(long)]
    sga_wrapper: PathBuf,

    /// SGA binary handed to the wrapper
    #[arg(long, default_value = "sga")]
    sga_bin: PathBuf,

    /// Program used to run the wrapper, e.g. python3
    #[arg(long)]
    interpreter: Option<PathBuf>,

    /// Component value marking reads with no component (repeatable)
    #[arg(long = "unassigned-marker", default_values_t = ["unassigned".to_string(), "NULL".to_string()])]
    unassigned_markers: Vec<String>,

    /// Reuse the previous component's lca when a component has none (matches old outputs)
    #[arg(long)]
    legacy_lca_carry_over: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut assembler = SgaAssembler::new(&cli.sga_wrapper, &cli.sga_bin);
    if let Some(interp) = &cli.interpreter {
        assembler = assembler.with_interpreter(interp);
    }

    let mut config = PipelineConfig::new(
        cli.fastq,
        cli.read_component,
        cli.component_lca,
        cli.out_contigs,
        cli.workdir,
    );
    config.cpu = cli.cpu.max(1);
    config.read_correction = cli.read_correction;
    config.unassigned_markers = cli.unassigned_markers;
    config.show_progress = true;
    if cli.legacy_lca_carry_over {
        config.lca_resolution = LcaResolution::CarryOver;
    }

    match assemble_all_components(&config, &assembler) {
        Ok(summary) => {
            log::info!(
                "{} contigs from {} components ({} reads) written to {}",
                summary.contigs,
                summary.components,
                summary.reads_kept,
                config.out_contigs_fasta.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
