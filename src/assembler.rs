//src/assembler.rs

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{IoContext, PipelineError, Result};
use crate::types::{AssemblyTask, ReadCorrection};

/// Options shared by every assembly task of a run.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyOptions {
    pub read_correction: ReadCorrection,
    /// Threads the assembler may use inside one task. Parallelism comes from running
    /// several tasks at once, so the pipeline always passes 1.
    pub cpu: usize,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            read_correction: ReadCorrection::default(),
            cpu: 1,
        }
    }
}

/// Something that turns one component's reads into an assembled FASTA file.
///
/// Implementors read `task.input_path` and write `task.output_path`; the working
/// directory already exists and is empty when `assemble` is called. The returned
/// path is what the merge step will read.
pub trait ComponentAssembler: Sync {
    fn assemble(&self, task: &AssemblyTask, options: &AssemblyOptions) -> Result<PathBuf>;
}

/// Runs the SGA assembly wrapper as an external process.
///
/// Command line:
/// ```text
/// [interpreter] <wrapper> -i <reads.fq> -o <assembly.fasta> --sga_bin <sga>
///     [--no_correction] --cpu <n> --tmp_dir <workdir/tmp>
/// ```
/// stdout and stderr are appended to the task's log file.
#[derive(Debug, Clone)]
pub struct SgaAssembler {
    pub wrapper: PathBuf,
    pub sga_bin: PathBuf,
    /// Program used to launch `wrapper` when it is not directly executable (e.g. `python3`).
    pub interpreter: Option<PathBuf>,
}

impl SgaAssembler {
    pub fn new(wrapper: impl Into<PathBuf>, sga_bin: impl Into<PathBuf>) -> Self {
        Self {
            wrapper: wrapper.into(),
            sga_bin: sga_bin.into(),
            interpreter: None,
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    /// Arguments passed to the wrapper, without the program itself.
    pub fn wrapper_args(&self, task: &AssemblyTask, options: &AssemblyOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            task.input_path.clone().into(),
            "-o".into(),
            task.output_path.clone().into(),
            "--sga_bin".into(),
            self.sga_bin.clone().into(),
        ];
        if options.read_correction.disables_assembler_correction() {
            args.push("--no_correction".into());
        }
        args.push("--cpu".into());
        args.push(options.cpu.to_string().into());
        args.push("--tmp_dir".into());
        args.push(task.tmp_dir.clone().into());
        args
    }

    fn command(&self, task: &AssemblyTask, options: &AssemblyOptions) -> Command {
        let mut cmd = match &self.interpreter {
            Some(interp) => {
                let mut c = Command::new(interp);
                c.arg(&self.wrapper);
                c
            }
            None => Command::new(&self.wrapper),
        };
        cmd.args(self.wrapper_args(task, options));
        cmd
    }
}

fn open_log(log_path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_path(log_path)
}

impl ComponentAssembler for SgaAssembler {
    fn assemble(&self, task: &AssemblyTask, options: &AssemblyOptions) -> Result<PathBuf> {
        let mut log_file = open_log(&task.log_path)?;
        writeln!(log_file, "component #{}", task.input_path.display()).with_path(&task.log_path)?;
        let stderr_log = log_file.try_clone().with_path(&task.log_path)?;

        let mut cmd = self.command(task, options);
        log::debug!("CMD: {:?}", cmd);

        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(stderr_log))
            .status()
            .map_err(|source| PipelineError::AssemblerLaunch {
                component: task.component_id.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PipelineError::AssemblyFailed {
                component: task.component_id.clone(),
                status,
                log: task.log_path.clone(),
            });
        }
        Ok(task.output_path.clone())
    }
}
