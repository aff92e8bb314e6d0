use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assembler::{AssemblyOptions, ComponentAssembler};
use crate::error::{IoContext, PipelineError, Result};
use crate::progress::task_bar;
use crate::types::{AssemblyTask, ComponentFile};

pub const ASSEMBLY_LOG: &str = "assembly.log";
pub const ASSEMBLY_FASTA: &str = "assembly.fasta";
pub const ASSEMBLY_TMP: &str = "tmp";

/// Working directory of a component: `<reads file without extension>_assembly_wkdir`.
pub fn workdir_for(fastq: &Path) -> PathBuf {
    let stem = fastq
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    fastq.with_file_name(format!("{}_assembly_wkdir", stem))
}

impl AssemblyTask {
    /// Lays out the task's paths next to the component's reads file.
    pub fn for_component(file: &ComponentFile) -> Self {
        let workdir = workdir_for(&file.path);
        Self {
            component_id: file.component_id.clone(),
            input_path: file.path.clone(),
            output_path: workdir.join(ASSEMBLY_FASTA),
            log_path: workdir.join(ASSEMBLY_LOG),
            tmp_dir: workdir.join(ASSEMBLY_TMP),
            workdir,
        }
    }
}

/// Assembled FASTA of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledComponent {
    pub component_id: String,
    pub fasta: PathBuf,
}

/// Removes whatever a previous run left in the task's working directory and recreates it empty.
fn prepare_workdir(task: &AssemblyTask) -> Result<()> {
    if task.workdir.is_dir() {
        log::debug!("Remove previous working dir before assembling: {}", task.workdir.display());
        fs::remove_dir_all(&task.workdir).with_path(&task.workdir)?;
    }
    fs::create_dir_all(&task.workdir).with_path(&task.workdir)
}

/// Runs a single task: input check, fresh working directory, then the assembler.
pub fn assemble_component(
    task: &AssemblyTask,
    assembler: &dyn ComponentAssembler,
    options: &AssemblyOptions,
) -> Result<AssembledComponent> {
    if !task.input_path.is_file() {
        log::error!("The input reads file does not exist: {}", task.input_path.display());
        return Err(PipelineError::MissingComponentReads {
            component: task.component_id.clone(),
            path: task.input_path.clone(),
        });
    }
    prepare_workdir(task)?;

    match assembler.assemble(task, options) {
        Ok(fasta) => Ok(AssembledComponent {
            component_id: task.component_id.clone(),
            fasta,
        }),
        Err(e) => {
            log::error!("Failed to assemble the component: {}", task.component_id);
            log::error!("See {} for more info", task.log_path.display());
            Err(e)
        }
    }
}

/// Assembles every component on a pool of `cpu` worker threads, each driving one
/// single-threaded assembler process.
///
/// Returns once all tasks are done. Results come back in the order of `files`, whatever
/// order the tasks finish in. On the first failure no new tasks are started and the
/// error is returned; assemblies already running are left to finish.
pub fn assemble_all(
    files: &[ComponentFile],
    assembler: &dyn ComponentAssembler,
    options: &AssemblyOptions,
    cpu: usize,
    show_progress: bool,
) -> Result<Vec<AssembledComponent>> {
    let tasks: Vec<AssemblyTask> = files.iter().map(AssemblyTask::for_component).collect();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cpu.max(1))
        .build()?;

    let pb = task_bar(tasks.len(), show_progress);
    let results = pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                let done = assemble_component(task, assembler, options);
                pb.inc(1);
                done
            })
            .collect::<Result<Vec<_>>>()
    });
    pb.finish_and_clear();
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Writes one contig per task; components listed in `fail` report an assembly failure.
    struct StubAssembler {
        fail: Vec<String>,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubAssembler {
        fn new(fail: &[&str]) -> Self {
            Self {
                fail: fail.iter().map(|s| s.to_string()).collect(),
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl ComponentAssembler for StubAssembler {
        fn assemble(&self, task: &AssemblyTask, _options: &AssemblyOptions) -> Result<PathBuf> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            // The working directory must be fresh and empty.
            assert_eq!(fs::read_dir(&task.workdir).unwrap().count(), 0);
            thread::sleep(Duration::from_millis(20));
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.fail.contains(&task.component_id) {
                return Err(PipelineError::AssemblerLaunch {
                    component: task.component_id.clone(),
                    source: io::Error::new(io::ErrorKind::Other, "stub failure"),
                });
            }
            fs::write(&task.output_path, format!(">x\n{}\n", task.component_id)).unwrap();
            Ok(task.output_path.clone())
        }
    }

    fn component_files(dir: &Path, ids: &[&str]) -> Vec<ComponentFile> {
        ids.iter()
            .map(|id| {
                let path = dir.join(format!("component{id}_reads.fq"));
                fs::write(&path, "@r\nA\n+\nI\n").unwrap();
                ComponentFile {
                    component_id: id.to_string(),
                    path,
                }
            })
            .collect()
    }

    #[test]
    fn task_layout_follows_reads_file() {
        let file = ComponentFile {
            component_id: "5".into(),
            path: PathBuf::from("/w/component5_reads.fq"),
        };
        let task = AssemblyTask::for_component(&file);
        assert_eq!(task.workdir, PathBuf::from("/w/component5_reads_assembly_wkdir"));
        assert_eq!(task.output_path, task.workdir.join("assembly.fasta"));
        assert_eq!(task.log_path, task.workdir.join("assembly.log"));
        assert_eq!(task.tmp_dir, task.workdir.join("tmp"));
    }

    #[test]
    fn results_follow_submission_order() {
        let dir = TempDir::new().unwrap();
        let ids = ["9", "1", "5", "3", "7", "2"];
        let files = component_files(dir.path(), &ids);
        let stub = StubAssembler::new(&[]);

        let done = assemble_all(&files, &stub, &AssemblyOptions::default(), 3, false).unwrap();
        let got: Vec<_> = done.iter().map(|a| a.component_id.as_str()).collect();
        assert_eq!(got, ids);
        for a in &done {
            assert_eq!(fs::read_to_string(&a.fasta).unwrap(), format!(">x\n{}\n", a.component_id));
        }
        assert!(stub.peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn single_worker_never_overlaps() {
        let dir = TempDir::new().unwrap();
        let files = component_files(dir.path(), &["a", "b", "c"]);
        let stub = StubAssembler::new(&[]);
        assemble_all(&files, &stub, &AssemblyOptions::default(), 1, false).unwrap();
        assert_eq!(stub.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stale_workdir_is_wiped() {
        let dir = TempDir::new().unwrap();
        let files = component_files(dir.path(), &["1"]);
        let task = AssemblyTask::for_component(&files[0]);
        fs::create_dir_all(task.tmp_dir.join("nested")).unwrap();
        fs::write(task.workdir.join("leftover.txt"), "old").unwrap();

        // StubAssembler asserts the directory is empty when it runs
        let stub = StubAssembler::new(&[]);
        assemble_component(&task, &stub, &AssemblyOptions::default()).unwrap();
        assert!(!task.workdir.join("leftover.txt").exists());
    }

    #[test]
    fn missing_reads_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let files = vec![ComponentFile {
            component_id: "1".into(),
            path: dir.path().join("component1_reads.fq"),
        }];
        let stub = StubAssembler::new(&[]);
        let err = assemble_all(&files, &stub, &AssemblyOptions::default(), 2, false).unwrap_err();
        assert!(matches!(err, PipelineError::MissingComponentReads { .. }));
        assert_eq!(stub.peak.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn one_failure_fails_the_batch() {
        let dir = TempDir::new().unwrap();
        let files = component_files(dir.path(), &["1", "2", "3"]);
        let stub = StubAssembler::new(&["2"]);
        let err = assemble_all(&files, &stub, &AssemblyOptions::default(), 2, false).unwrap_err();
        match err {
            PipelineError::AssemblerLaunch { component, .. } => assert_eq!(component, "2"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn zero_cpu_is_treated_as_one() {
        let dir = TempDir::new().unwrap();
        let files = component_files(dir.path(), &["1"]);
        let stub = StubAssembler::new(&[]);
        let done = assemble_all(&files, &stub, &AssemblyOptions::default(), 0, false).unwrap();
        assert_eq!(done.len(), 1);
    }
}
