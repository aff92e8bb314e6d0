use ahash::AHashMap;
use std::path::Path;

use crate::assignments::ReadComponentMap;
use crate::error::{IoContext, Result};
use crate::fastq::{open_maybe_gz, FastqReader};
use crate::types::DNASequence;

/// Reads bucketed by component. Components are kept in the order they were first
/// seen in the read stream, and reads keep their stream order inside each component.
#[derive(Debug, Default)]
pub struct ComponentReads {
    order: Vec<String>,
    reads: AHashMap<String, Vec<DNASequence>>,
}

impl ComponentReads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, component_id: &str, read: DNASequence) {
        match self.reads.get_mut(component_id) {
            Some(bucket) => bucket.push(read),
            None => {
                self.order.push(component_id.to_string());
                self.reads.insert(component_id.to_string(), vec![read]);
            }
        }
    }

    /// Number of components holding at least one read.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, component_id: &str) -> Option<&[DNASequence]> {
        self.reads.get(component_id).map(Vec::as_slice)
    }

    /// Components in discovery order with their reads.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DNASequence])> {
        self.order.iter().map(move |id| {
            let reads = self.reads.get(id).map(Vec::as_slice).unwrap_or_default();
            (id.as_str(), reads)
        })
    }

    pub fn total_reads(&self) -> usize {
        self.reads.values().map(Vec::len).sum()
    }
}

/// Buckets `reads` by their assigned component. Reads with no assignment are dropped.
/// The first read error stops the partition and is returned.
pub fn partition_reads<I, E>(
    reads: I,
    read_components: &ReadComponentMap,
) -> std::result::Result<ComponentReads, E>
where
    I: IntoIterator<Item = std::result::Result<DNASequence, E>>,
{
    let mut partition = ComponentReads::new();
    for read in reads {
        let read = read?;
        if let Some(component_id) = read_components.get(&read.id) {
            partition.push(component_id, read);
        }
    }
    Ok(partition)
}

/// Streams a FASTQ file (plain or `.gz`) through [`partition_reads`].
pub fn extract_reads_by_component<P: AsRef<Path>>(
    fastq: P,
    read_components: &ReadComponentMap,
) -> Result<ComponentReads> {
    let path = fastq.as_ref();
    log::debug!("Storing reads by component from {}", path.display());

    let reads = FastqReader::new(open_maybe_gz(path)?).map(|read| read.with_path(path));
    partition_reads(reads, read_components)
}
