use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{IoContext, PipelineError, Result};
use crate::fastq::write_fastq_record;
use crate::partition::ComponentReads;
use crate::types::ComponentFile;

/// File name of a component's reads inside the working directory.
pub fn component_fastq_name(component_id: &str) -> String {
    format!("component{}_reads.fq", component_id)
}

/// Component ids end up in file names, so they must stay inside `directory`.
fn check_component_id(component_id: &str) -> Result<()> {
    let bad = component_id.is_empty()
        || component_id == "."
        || component_id == ".."
        || component_id.contains(['/', '\\']);
    if bad {
        return Err(PipelineError::InvalidComponentId(component_id.to_string()));
    }
    Ok(())
}

/// Writes each component's reads to `directory/component<id>_reads.fq`.
///
/// `directory` is created when missing. Only the files of the components being saved
/// are touched; they are truncated and rewritten. Returns the files in discovery order.
pub fn save_components<P: AsRef<Path>>(
    partition: &ComponentReads,
    directory: P,
) -> Result<Vec<ComponentFile>> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory).with_path(directory)?;

    let mut files = Vec::with_capacity(partition.len());
    for (component_id, reads) in partition.iter() {
        check_component_id(component_id)?;
        let fq_path: PathBuf = directory.join(component_fastq_name(component_id));
        log::debug!(
            "Save component {} ({} reads) into {}",
            component_id,
            reads.len(),
            fq_path.display()
        );

        let file = File::create(&fq_path).with_path(&fq_path)?;
        let mut out = BufWriter::new(file);
        for read in reads {
            write_fastq_record(&mut out, read).with_path(&fq_path)?;
        }
        out.flush().with_path(&fq_path)?;

        files.push(ComponentFile {
            component_id: component_id.to_string(),
            path: fq_path,
        });
    }
    Ok(files)
}
