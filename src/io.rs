//! Parsing for the two external input formats (SPEC_FULL §6). Grounded on
//! the teacher's `src/as_graph_generators/caida.rs` line-parsing style (the
//! local-file half only — the live CAIDA downloader is out of scope and was
//! trimmed, see DESIGN.md) and the original `bgpsecsim/as_graph.py`'s
//! `parse_as_rel_file` / attack-file reader for the exact grammar.

use std::fs;
use std::path::Path;

use crate::as_graph::RelEdge;
use crate::shared::{InvalidRelFile, ASN};

/// Parse a CAIDA "as-rel serial-1" relationship file: one edge per line,
/// `A|B|rel` where `rel` is `-1` (A is provider of B) or `0` (peers).
/// `#`-prefixed lines and blank lines are ignored. Any other malformed
/// line is fatal.
pub fn parse_as_rel_file(path: &Path) -> Result<Vec<RelEdge>, InvalidRelFile> {
    let contents = fs::read_to_string(path).map_err(|e| InvalidRelFile {
        line_number: 0,
        line: path.display().to_string(),
        reason: format!("could not read file: {e}"),
    })?;
    parse_as_rel_str(&contents)
}

pub fn parse_as_rel_str(contents: &str) -> Result<Vec<RelEdge>, InvalidRelFile> {
    let mut edges = Vec::new();
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < 3 {
            return Err(InvalidRelFile {
                line_number: idx + 1,
                line: raw_line.to_string(),
                reason: "expected `A|B|rel`".to_string(),
            });
        }
        let a: ASN = parts[0].parse().map_err(|_| InvalidRelFile {
            line_number: idx + 1,
            line: raw_line.to_string(),
            reason: format!("invalid AS id {:?}", parts[0]),
        })?;
        let b: ASN = parts[1].parse().map_err(|_| InvalidRelFile {
            line_number: idx + 1,
            line: raw_line.to_string(),
            reason: format!("invalid AS id {:?}", parts[1]),
        })?;
        let rel: i8 = parts[2].trim().parse().map_err(|_| InvalidRelFile {
            line_number: idx + 1,
            line: raw_line.to_string(),
            reason: format!("invalid relationship code {:?}", parts[2]),
        })?;
        if rel != -1 && rel != 0 {
            return Err(InvalidRelFile {
                line_number: idx + 1,
                line: raw_line.to_string(),
                reason: format!("relationship code must be -1 or 0, got {rel}"),
            });
        }
        edges.push(RelEdge { a, b, rel });
    }
    Ok(edges)
}

/// Parse an attack-scenario file: the first non-comment line is the
/// attacker AS-ID, every subsequent non-comment line is a victim AS-ID.
pub fn parse_attack_file(path: &Path) -> Result<(ASN, Vec<ASN>), InvalidRelFile> {
    let contents = fs::read_to_string(path).map_err(|e| InvalidRelFile {
        line_number: 0,
        line: path.display().to_string(),
        reason: format!("could not read file: {e}"),
    })?;
    parse_attack_str(&contents)
}

pub fn parse_attack_str(contents: &str) -> Result<(ASN, Vec<ASN>), InvalidRelFile> {
    let mut attacker: Option<ASN> = None;
    let mut victims = Vec::new();
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let asn: ASN = line.parse().map_err(|_| InvalidRelFile {
            line_number: idx + 1,
            line: raw_line.to_string(),
            reason: format!("invalid AS id {:?}", line),
        })?;
        match attacker {
            None => attacker = Some(asn),
            Some(_) => victims.push(asn),
        }
    }
    let attacker = attacker.ok_or_else(|| InvalidRelFile {
        line_number: 0,
        line: String::new(),
        reason: "attack file has no attacker AS-ID".to_string(),
    })?;
    Ok((attacker, victims))
}
