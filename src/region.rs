//! Region lists in ungapped reference coordinates.
//!
//! Regions are read from tab-separated, BED-like text with at least six
//! fields per line: `chrom, start, end, name, score, strand`. Coordinates are
//! 0-based and half-open, so `length = end - start`.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::alignment::UngappedOffset;
use crate::error::{ExtractError, Result};

/// Strand column of a region record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    /// `+`
    Forward,
    /// `-`
    Reverse,
    /// `.`
    Unknown,
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            other => Err(format!("invalid strand '{}'", other)),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        };
        f.write_str(symbol)
    }
}

/// Named interval designating a subsequence to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Chromosome or contig name (informational).
    pub chrom: String,
    /// Start in ungapped reference coordinates (inclusive).
    pub start: UngappedOffset,
    /// End in ungapped reference coordinates (exclusive).
    pub end: UngappedOffset,
    /// Region name; determines the output file name.
    pub name: String,
    /// Score column, carried through unparsed.
    pub score: String,
    /// Strand column.
    pub strand: Strand,
}

impl Region {
    /// Construct a region, requiring `end > start` and a non-empty name.
    pub fn new(
        chrom: impl Into<String>,
        start: UngappedOffset,
        end: UngappedOffset,
        name: impl Into<String>,
    ) -> std::result::Result<Self, String> {
        let region = Self {
            chrom: chrom.into(),
            start,
            end,
            name: name.into(),
            score: ".".to_string(),
            strand: Strand::Unknown,
        };
        region.validate()?;
        Ok(region)
    }

    /// Check `end > start` and that the name is usable as a file name.
    ///
    /// Fields are public, so regions assembled by hand are re-checked by the
    /// batch driver through this method.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.end <= self.start {
            return Err(format!(
                "end {} must be greater than start {}",
                self.end, self.start
            ));
        }
        let name = self.name.as_str();
        if name.is_empty() {
            return Err("region name must not be empty".to_string());
        }
        if name.contains(&['/', '\\'][..]) || name == "." || name == ".." {
            return Err(format!("region name '{}' cannot be used as a file name", name));
        }
        Ok(())
    }

    /// Ungapped length of the region; 0 for an inverted interval.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` when the interval covers no positions.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Parse a single tab-separated record; `line_no` is used for errors.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(&['\r', '\n'][..]).split('\t').collect();
        if fields.len() < 6 {
            return Err(ExtractError::format(
                line_no,
                format!("expected at least 6 tab-separated fields, found {}", fields.len()),
            ));
        }

        let parse_coord = |field: &str, what: &str| {
            field.trim().parse::<u64>().map_err(|_| {
                ExtractError::format(line_no, format!("invalid {} '{}'", what, field))
            })
        };
        let start = parse_coord(fields[1], "start")?;
        let end = parse_coord(fields[2], "end")?;
        let strand = fields[5]
            .trim()
            .parse::<Strand>()
            .map_err(|msg| ExtractError::format(line_no, msg))?;

        let mut region = Region::new(fields[0], start, end, fields[3].trim())
            .map_err(|msg| ExtractError::format(line_no, msg))?;
        region.score = fields[4].to_string();
        region.strand = strand;
        Ok(region)
    }
}

/// Returns `true` for lines that carry no region record.
fn is_header_or_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}

/// Streaming reader over a region list.
#[derive(Debug)]
pub struct RegionReader<R> {
    reader: R,
    line_no: usize,
    line: String,
}

impl<R: BufRead> RegionReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            line: String::new(),
        }
    }

    /// Read and validate every record.
    ///
    /// Validation completes before any region is processed, so a malformed
    /// list never leaves partial output behind.
    pub fn read_all(self) -> Result<Vec<Region>> {
        self.collect()
    }
}

impl<R: BufRead> Iterator for RegionReader<R> {
    type Item = Result<Region>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    if is_header_or_blank(&self.line) {
                        continue;
                    }
                    return Some(Region::parse_line(&self.line, self.line_no));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
