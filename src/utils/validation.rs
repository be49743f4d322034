//! Centralized validation and helper functions.

/// Maximum number of contigs accepted in a single assembly (DOS protection)
pub const MAX_CONTIGS: usize = 100_000;

/// Genome ids end up in file names, so they share the file name length limit
pub const MAX_GENOME_ID_LENGTH: usize = 200;

/// Check if adding another contig would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new contig.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if let Some(msg) = check_contig_limit(genome.contig_names.len()) {
///     return Err(ParseError::InvalidFormat(msg));
/// }
/// ```
#[must_use]
pub fn check_contig_limit(count: usize) -> Option<String> {
    if count >= MAX_CONTIGS {
        Some(format!(
            "Too many contigs: adding another would exceed maximum of {MAX_CONTIGS}"
        ))
    } else {
        None
    }
}

/// Genome id validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty genome id")]
    EmptyId,
    #[error("Genome id too long: exceeds {MAX_GENOME_ID_LENGTH} characters")]
    IdTooLong,
    #[error("Invalid genome id: only letters, digits, '.', '-' and '_' are allowed")]
    InvalidCharacters,
    #[error("Invalid genome id: contains path traversal")]
    PathTraversal,
}

/// Validate a genome id before it is used to build file names.
///
/// Ids resolve to `<id>.fasta` and `<id>.bed`, and pairs are written as
/// `<reference>+<query>.*`, so an id must be a plain file name stem.
///
/// # Examples
///
/// ```
/// use varscen::utils::validation::validate_genome_id;
///
/// assert!(validate_genome_id("H37Rv").is_ok());
/// assert!(validate_genome_id("GCF_000195955.2").is_ok());
/// assert!(validate_genome_id("../etc/passwd").is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError::EmptyId`, `ValidationError::IdTooLong`,
/// `ValidationError::PathTraversal` or `ValidationError::InvalidCharacters`.
pub fn validate_genome_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyId);
    }

    if id.len() > MAX_GENOME_ID_LENGTH {
        return Err(ValidationError::IdTooLong);
    }

    if id.contains("..") || id.starts_with('.') {
        return Err(ValidationError::PathTraversal);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(ValidationError::InvalidCharacters);
    }

    Ok(())
}
