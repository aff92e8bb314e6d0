use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::assignments::ComponentLcaMap;
use crate::error::{IoContext, Result};
use crate::executor::AssembledComponent;
use crate::fasta::{read_fasta_records, write_fasta_record};
use crate::types::{Contig, LcaResolution, UNRESOLVED_LCA};

/// Counts reported after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub components: usize,
    pub contigs: u64,
}

/// Picks the lca label of each component in turn.
struct LcaLookup<'a> {
    table: &'a ComponentLcaMap,
    mode: LcaResolution,
    last: &'a str,
}

impl<'a> LcaLookup<'a> {
    fn new(table: &'a ComponentLcaMap, mode: LcaResolution) -> Self {
        Self {
            table,
            mode,
            last: UNRESOLVED_LCA,
        }
    }

    fn resolve(&mut self, component_id: &str) -> &'a str {
        let table: &'a ComponentLcaMap = self.table;
        let found = table.get(component_id).map(String::as_str);
        match self.mode {
            LcaResolution::PerComponent => found.unwrap_or(UNRESOLVED_LCA),
            LcaResolution::CarryOver => {
                if let Some(lca) = found {
                    self.last = lca;
                }
                self.last
            }
        }
    }
}

/// Sibling path the merged output is staged in before being renamed into place.
fn staging_path(out: &Path) -> PathBuf {
    let mut name = out
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    out.with_file_name(name)
}

fn write_contigs(
    assembled: &[AssembledComponent],
    component_lca: &ComponentLcaMap,
    mode: LcaResolution,
    out: &mut impl Write,
    out_path: &Path,
) -> Result<MergeSummary> {
    let mut lookup = LcaLookup::new(component_lca, mode);
    let mut summary = MergeSummary::default();

    for component in assembled {
        let lca = lookup.resolve(&component.component_id);
        let records = read_fasta_records(&component.fasta)?;
        summary.components += 1;

        for record in records.into_iter().filter(|r| !r.seq.is_empty()) {
            summary.contigs += 1;
            let contig = Contig {
                index: summary.contigs,
                seq: record.seq,
                component_id: component.component_id.clone(),
                lca: lca.to_string(),
            };
            write_fasta_record(out, &contig.header(), &contig.seq).with_path(out_path)?;
        }
    }
    Ok(summary)
}

/// Concatenates the assembled contigs of every component into `contigs_fasta`.
///
/// Components are visited in the given order and their non-empty contigs are numbered
/// from 1 across the whole output. Each header reads
/// `>index component=<id> lca=<label>`. Any existing file at `contigs_fasta` is replaced,
/// and only once the merge has completed.
pub fn concat_components_fasta_with_lca<P: AsRef<Path>>(
    assembled: &[AssembledComponent],
    contigs_fasta: P,
    component_lca: &ComponentLcaMap,
    mode: LcaResolution,
) -> Result<MergeSummary> {
    let out_path = contigs_fasta.as_ref();
    let staging = staging_path(out_path);

    let written = File::create(&staging)
        .with_path(&staging)
        .and_then(|file| {
            let mut out = BufWriter::new(file);
            let summary = write_contigs(assembled, component_lca, mode, &mut out, out_path)?;
            out.flush().with_path(out_path)?;
            Ok(summary)
        });

    match written {
        Ok(summary) => {
            fs::rename(&staging, out_path).with_path(out_path)?;
            log::debug!(
                "Wrote {} contigs from {} components to {}",
                summary.contigs,
                summary.components,
                out_path.display()
            );
            Ok(summary)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&staging) {
                log::debug!("Could not remove {}: {}", staging.display(), rm);
            }
            Err(e)
        }
    }
}
