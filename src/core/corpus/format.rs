//! Line-oriented corpus text format.
//!
//! One entry per line: `<identifier> <bit-string>`. The bit string is
//! everything after the last space, so identifiers may contain spaces.

use super::CorpusEntry;
use crate::core::hasher::Fingerprint;
use crate::error::CorpusError;
use std::io::Write;

/// Parse corpus text into entries, in file order.
///
/// Blank lines are skipped and a trailing `\r` is ignored. Errors carry the
/// 1-based line number.
pub fn parse_entries(text: &str) -> Result<Vec<CorpusEntry>, CorpusError> {
    let mut entries = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }
        entries.push(parse_line(line, index + 1)?);
    }

    Ok(entries)
}

fn parse_line(line: &str, number: usize) -> Result<CorpusEntry, CorpusError> {
    let (identifier, bits) = line.rsplit_once(' ').ok_or_else(|| CorpusError::Parse {
        line: number,
        reason: "expected `<identifier> <bits>`".to_string(),
    })?;

    if identifier.is_empty() {
        return Err(CorpusError::Parse {
            line: number,
            reason: "identifier is empty".to_string(),
        });
    }

    let fingerprint: Fingerprint = bits.parse().map_err(|e| CorpusError::Parse {
        line: number,
        reason: format!("{e}"),
    })?;

    Ok(CorpusEntry::new(identifier, fingerprint))
}

/// Write entries in corpus text form, one per line
pub fn write_entries<W: Write>(entries: &[CorpusEntry], mut writer: W) -> std::io::Result<()> {
    for entry in entries {
        writeln!(writer, "{} {}", entry.identifier, entry.fingerprint)?;
    }
    writer.flush()
}
