//! Loader for assembly FASTA files using noodles.
//!
//! Reads every record into memory as an upper-case [`Genome`].
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::core::genome::Genome;
use crate::parsing::ParseError;
use crate::utils::validation::check_contig_limit;

/// FASTA file extensions tried when resolving a genome id, in priority order
pub const FASTA_EXTENSIONS: [&str; 6] = ["fasta", "fa", "fna", "fasta.gz", "fa.gz", "fna.gz"];

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    // Check for uncompressed FASTA
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Genome id implied by a FASTA file name, e.g. `L1` for `genomes/L1.fa.gz`
#[must_use]
pub fn genome_id_from_path(path: &Path) -> Option<String> {
    if !is_fasta_file(path) {
        return None;
    }
    let name = path.file_name()?.to_str()?;
    let lower = name.to_lowercase();
    FASTA_EXTENSIONS
        .iter()
        .chain(&["fa.bgz", "fasta.bgz", "fna.bgz"])
        .filter(|ext| lower.ends_with(&format!(".{ext}")))
        .map(|ext| &name[..name.len() - ext.len() - 1])
        .max_by_key(|stem| std::cmp::Reverse(stem.len()))
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// Load a FASTA file as the genome `id`.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, or `ParseError::InvalidFormat` if no sequences are found,
/// a contig name repeats, or the contig limit is exceeded.
pub fn load_genome(path: &Path, id: &str) -> Result<Genome, ParseError> {
    let file = std::fs::File::open(path)?;

    if is_gzipped(path) {
        let reader = BufReader::new(MultiGzDecoder::new(file));
        read_genome(&mut fasta::io::Reader::new(reader), id)
    } else {
        let reader = BufReader::new(file);
        read_genome(&mut fasta::io::Reader::new(reader), id)
    }
}

/// Load a genome from in-memory FASTA text
///
/// # Errors
///
/// Same as [`load_genome`], without I/O errors.
pub fn parse_genome_text(text: &str, id: &str) -> Result<Genome, ParseError> {
    let mut reader = fasta::io::Reader::new(text.as_bytes());
    read_genome(&mut reader, id)
}

fn read_genome<R: BufRead>(reader: &mut fasta::io::Reader<R>, id: &str) -> Result<Genome, ParseError> {
    let mut genome = Genome::new(id);

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if let Some(msg) = check_contig_limit(genome.contig_names.len()) {
            return Err(ParseError::InvalidFormat(msg));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        if !genome.add_contig(name.clone(), record.sequence().as_ref()) {
            return Err(ParseError::InvalidFormat(format!(
                "Duplicate contig '{name}' in genome '{id}'"
            )));
        }
    }

    if genome.contig_names.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "No sequences found in FASTA for genome '{id}'"
        )));
    }

    Ok(genome)
}
