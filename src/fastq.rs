use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{IoContext, Result};
use crate::types::DNASequence;

/// Opens a text file for buffered reading, going through a `MultiGzDecoder`
/// when the file name ends with `.gz`.
pub fn open_maybe_gz<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path).with_path(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Streaming FASTQ reader yielding one `DNASequence` per 4-line record.
///
/// Lines before a `@` header are skipped; a truncated trailing record ends the stream.
pub struct FastqReader<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim_end().to_string()))
    }

    fn next_record(&mut self) -> io::Result<Option<DNASequence>> {
        // 1) header
        let header_line = loop {
            match self.next_line()? {
                None => return Ok(None),
                Some(l) if l.starts_with('@') => break l,
                Some(_) => continue,
            }
        };

        // 2) sequence, 3) plus line, 4) quality
        let Some(seq) = self.next_line()? else {
            return Ok(None);
        };
        if self.next_line()?.is_none() {
            return Ok(None);
        }
        let Some(quals) = self.next_line()? else {
            return Ok(None);
        };

        Ok(Some(DNASequence {
            id: header_line[1..]
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            seq,
            quals,
        }))
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = io::Result<DNASequence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Reads every record of a FASTQ file (plain or `.gz`) into memory.
pub fn read_fastq_records<P: AsRef<Path>>(path: P) -> Result<Vec<DNASequence>> {
    let path = path.as_ref();
    let reader = open_maybe_gz(path)?;
    FastqReader::new(reader)
        .map(|r| r.with_path(path))
        .collect()
}

/// Writes one read in the 4-line layout, keyed by its id.
pub fn write_fastq_record<W: Write>(out: &mut W, read: &DNASequence) -> io::Result<()> {
    write!(out, "@{}\n{}\n+\n{}\n", read.id, read.seq, read.quals)
}
