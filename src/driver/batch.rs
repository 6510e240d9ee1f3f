use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use crate::alignment::{GapPolicy, OffsetResolver, RawOffset, SubsequenceExtractor};
use crate::config::ScanConfig;
use crate::error::{ExtractError, Result};
use crate::region::Region;
use crate::stream::ByteStream;

/// What to do when a region cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the batch on the first failing region.
    #[default]
    FailFast,
    /// Record the failure in the [`BatchReport`] and continue.
    SkipAndReport,
}

/// A co-aligned sequence file and the identifier written to its headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Identifier written after `>` in each record header.
    pub label: String,
    /// Location of the aligned stream.
    pub path: PathBuf,
}

impl Source {
    /// Source labelled with its path as given.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            label: path.display().to_string(),
            path,
        }
    }

    /// Source with an explicit label.
    pub fn with_label(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Batch extraction settings.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Gap byte and block size.
    pub scan: ScanConfig,
    /// Directory receiving one `<name>.fa` file per region.
    pub output_dir: PathBuf,
    /// Behaviour on per-region failures.
    pub failure_policy: FailurePolicy,
    /// Emit a record for the reference itself before the sources.
    pub include_reference: bool,
    /// Require every source to have the reference's byte length.
    pub check_alignment_length: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            output_dir: PathBuf::from("."),
            failure_policy: FailurePolicy::default(),
            include_reference: false,
            check_alignment_length: true,
        }
    }
}

impl BatchConfig {
    /// Set the scan configuration.
    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Include the reference as the first source.
    pub fn with_reference_record(mut self, enabled: bool) -> Self {
        self.include_reference = enabled;
        self
    }

    /// Enable or disable the alignment length cross-check.
    pub fn with_length_check(mut self, enabled: bool) -> Self {
        self.check_alignment_length = enabled;
        self
    }
}

/// A region that was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRegion {
    /// Region name.
    pub name: String,
    /// Rendered error.
    pub reason: String,
}

/// A record whose source ran out before the region length was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortRecord {
    /// Region name.
    pub region: String,
    /// Source label.
    pub source: String,
    /// Characters requested.
    pub requested: u64,
    /// Characters written.
    pub emitted: u64,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Output files written, in region order.
    pub written: Vec<PathBuf>,
    /// Regions skipped under [`FailurePolicy::SkipAndReport`].
    pub skipped: Vec<SkippedRegion>,
    /// Records truncated by a short read.
    pub short_records: Vec<ShortRecord>,
    /// Whether the run stopped early on cancellation.
    pub cancelled: bool,
}

impl BatchReport {
    /// Returns `true` when every region was written in full.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.skipped.is_empty() && self.short_records.is_empty()
    }
}

enum RegionStatus {
    Written {
        path: PathBuf,
        short: Vec<ShortRecord>,
    },
    Cancelled,
}

/// Extracts every region from the reference and each co-aligned source.
///
/// Each region is resolved once against the reference; every source is then
/// reopened and read at the resolved raw offset.
#[derive(Debug)]
pub struct RegionBatchDriver {
    reference: PathBuf,
    sources: Vec<Source>,
    config: BatchConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl RegionBatchDriver {
    /// Create a driver for `reference` and its co-aligned `sources`.
    pub fn new(reference: impl Into<PathBuf>, sources: Vec<Source>, config: BatchConfig) -> Self {
        Self {
            reference: reference.into(),
            sources,
            config,
            cancel: None,
        }
    }

    /// Stop before the next region or source once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Sources in output order, with the reference first when requested.
    pub fn sources(&self) -> Vec<Source> {
        let mut sources = Vec::with_capacity(self.sources.len() + 1);
        if self.config.include_reference {
            sources.push(Source::from_path(&self.reference));
        }
        sources.extend(self.sources.iter().cloned());
        sources
    }

    /// Path of the output file for `region`.
    pub fn output_path(&self, region: &Region) -> PathBuf {
        self.config.output_dir.join(format!("{}.fa", region.name))
    }

    /// Process `regions` in order.
    ///
    /// Every region is validated before any file is opened or created.
    pub fn run(&self, regions: &[Region]) -> Result<BatchReport> {
        for (idx, region) in regions.iter().enumerate() {
            region
                .validate()
                .map_err(|msg| ExtractError::format(idx + 1, msg))?;
        }
        let sources = self.sources();
        if self.config.check_alignment_length {
            self.check_alignment_lengths(&sources)?;
        }

        let mut reference =
            ByteStream::<File>::open_with_capacity(&self.reference, self.config.scan.buffer_size)?;
        let resolver = OffsetResolver::new(self.config.scan);
        let mut report = BatchReport::default();

        for region in regions {
            if self.is_cancelled() {
                warn!(region = %region.name, "cancelled before region");
                report.cancelled = true;
                break;
            }
            info!(region = %region.name, start = region.start, end = region.end, "handling sequence");

            match self.process_region(&mut reference, &resolver, region, &sources) {
                Ok(RegionStatus::Written { path, short }) => {
                    report.written.push(path);
                    report.short_records.extend(short);
                }
                Ok(RegionStatus::Cancelled) => {
                    report.cancelled = true;
                    break;
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::SkipAndReport => {
                        warn!(region = %region.name, error = %e, "skipping region");
                        report.skipped.push(SkippedRegion {
                            name: region.name.clone(),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            short = report.short_records.len(),
            "batch finished"
        );
        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn check_alignment_lengths(&self, sources: &[Source]) -> Result<()> {
        let Some(expected) = aligned_length(&self.reference)? else {
            debug!(reference = %self.reference.display(), "reference is not a regular file, skipping length check");
            return Ok(());
        };
        for source in sources {
            let Some(actual) = aligned_length(&source.path)? else {
                debug!(source = %source.path.display(), "not a regular file, skipping length check");
                continue;
            };
            if actual != expected {
                return Err(ExtractError::AlignmentMismatch {
                    path: source.path.clone(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn process_region<R: Read + Seek>(
        &self,
        reference: &mut ByteStream<R>,
        resolver: &OffsetResolver,
        region: &Region,
        sources: &[Source],
    ) -> Result<RegionStatus> {
        let raw_offset = resolver.resolve_from_start(reference, region.start)?;
        info!(region = %region.name, raw_offset, "found the requested substring at file offset");

        let path = self.output_path(region);
        let mut writer = BufWriter::new(create_exclusive(&path)?);

        let written = self
            .write_records(&mut writer, region, raw_offset, sources)
            .and_then(|short| {
                writer.flush()?;
                Ok(short)
            });
        drop(writer);

        match written {
            Ok(Some(short)) => Ok(RegionStatus::Written { path, short }),
            Ok(None) => {
                discard_partial(&path);
                Ok(RegionStatus::Cancelled)
            }
            Err(e) => {
                discard_partial(&path);
                Err(e)
            }
        }
    }

    /// Write one record per source; `None` when cancelled part-way.
    fn write_records<W: Write>(
        &self,
        writer: &mut W,
        region: &Region,
        raw_offset: RawOffset,
        sources: &[Source],
    ) -> Result<Option<Vec<ShortRecord>>> {
        let extractor = SubsequenceExtractor::new(self.config.scan);
        let mut short = Vec::new();

        for source in sources {
            if self.is_cancelled() {
                warn!(region = %region.name, source = %source.label, "cancelled before source");
                return Ok(None);
            }
            let _span = info_span!("source", region = %region.name, source = %source.label).entered();
            info!("handling source file");

            let mut stream =
                ByteStream::<File>::open_with_capacity(&source.path, self.config.scan.buffer_size)?;
            stream.seek(raw_offset)?;

            writeln!(writer, ">{}", source.label)?;
            let extraction =
                extractor.extract(&mut stream, region.len(), GapPolicy::Strip, writer)?;
            writeln!(writer)?;

            if extraction.is_short() {
                short.push(ShortRecord {
                    region: region.name.clone(),
                    source: source.label.clone(),
                    requested: extraction.requested,
                    emitted: extraction.emitted,
                });
            }
        }
        Ok(Some(short))
    }
}

/// Byte length of `path`, or `None` for FIFOs and other non-regular files
/// whose metadata carries no meaningful length.
fn aligned_length(path: &Path) -> Result<Option<u64>> {
    let metadata = fs::metadata(path)?;
    Ok(metadata.is_file().then(|| metadata.len()))
}

/// Create `path`, failing if it exists already.
fn create_exclusive(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ExtractError::AlreadyExists(path.to_path_buf()),
            _ => ExtractError::Io(e),
        })
}

fn discard_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed partial output"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove partial output"),
    }
}
