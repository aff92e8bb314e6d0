use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::{IoContext, Result};
use crate::fastq::open_maybe_gz;
use crate::types::FastaRecord;

/// Parses FASTA records from `reader`. Multi-line sequences are joined and a header
/// directly followed by another header yields an empty sequence.
pub fn parse_fasta<R: BufRead>(reader: R) -> io::Result<Vec<FastaRecord>> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if let Some(header) = line.strip_prefix('>') {
            if let Some(rec) = current.take() {
                records.push(rec);
            }
            current = Some(FastaRecord {
                header: header.to_string(),
                seq: String::new(),
            });
        } else if let Some(rec) = current.as_mut() {
            rec.seq.push_str(line.trim());
        }
    }
    if let Some(rec) = current {
        records.push(rec);
    }
    Ok(records)
}

pub fn read_fasta_records<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>> {
    let path = path.as_ref();
    let reader = open_maybe_gz(path)?;
    parse_fasta(reader).with_path(path)
}

/// Two-line record: header then the whole sequence on one line.
pub fn write_fasta_record<W: Write>(out: &mut W, header: &str, seq: &str) -> io::Result<()> {
    write!(out, ">{}\n{}\n", header, seq)
}
