//! Template-driven icon export.
//!
//! One source image in, one file per template item out:
//!
//! ```text
//! <root>/<template.output_directory>/<resolved name>.<source extension>
//! ```
//!
//! The source is decoded once. Items are then resampled and written in
//! parallel with [rayon](https://docs.rs/rayon); the decoded buffer is shared
//! read-only and every item gets its own result buffer.
//!
//! Output paths are resolved before any work starts. Items that resolve to
//! the same file run one after another on a single worker in template order,
//! so the file left on disk is always the later item's.
//!
//! ## Failure policy
//!
//! A source that cannot be decoded aborts the export with
//! [`ExportError::SourceLoad`] before anything is written. Everything that can
//! go wrong with a single item (no resolvable name, zero size, a directory or
//! file that cannot be written) is recorded in that item's [`ItemReport`] and
//! the remaining items still run. The caller decides what a partial export
//! means; the CLI exits non-zero.
//!
//! Per item the steps are: resolve the name, resample, create the parent
//! directory, encode. An item that fails early leaves nothing on disk.

use crate::imaging::operations::with_source_extension;
use crate::imaging::{CodecError, ImageCodec, PixelBuffer, PixelError, RustBackend, resize};
use crate::template::{ExportTemplate, Item};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to load source image {}: {source}", path.display())]
    SourceLoad { path: PathBuf, source: CodecError },
}

/// Why a single item produced no file.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("No naming pattern and the template has no fallback")]
    UnresolvedPattern,
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Resample failed: {0}")]
    Resample(PixelError),
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    OutputWrite { path: PathBuf, source: CodecError },
}

impl ItemError {
    /// Stable identifier for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::UnresolvedPattern => "unresolved_pattern",
            ItemError::InvalidDimensions { .. } => "invalid_dimensions",
            ItemError::Resample(_) => "resample",
            ItemError::DirectoryCreate { .. } => "directory_create",
            ItemError::OutputWrite { .. } => "output_write",
        }
    }
}

impl From<PixelError> for ItemError {
    fn from(e: PixelError) -> Self {
        match e {
            PixelError::InvalidDimensions { width, height } => {
                ItemError::InvalidDimensions { width, height }
            }
            other => ItemError::Resample(other),
        }
    }
}

/// Outcome of one template item.
#[derive(Debug)]
pub struct ItemReport {
    /// Zero-based position in the template.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Resolved base name, if resolution got that far.
    pub name: Option<String>,
    /// The file written, or why not.
    pub result: Result<PathBuf, ItemError>,
}

impl ItemReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a whole export, items in template order.
#[derive(Debug)]
pub struct ExportReport {
    pub template: String,
    pub source: PathBuf,
    /// `<root>/<template.output_directory>`
    pub output_dir: PathBuf,
    pub items: Vec<ItemReport>,
}

impl ExportReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|i| !i.is_ok())
    }

    pub fn is_complete(&self) -> bool {
        self.items.iter().all(ItemReport::is_ok)
    }
}

/// Progress events sent while an export runs.
///
/// Item events arrive in completion order, which under parallel export is not
/// template order. The final [`ExportReport`] is always in template order.
#[derive(Debug, Clone)]
pub enum ExportEvent {
    Started {
        template: String,
        source: PathBuf,
        width: u32,
        height: u32,
        item_count: usize,
    },
    ItemWritten {
        index: usize,
        width: u32,
        height: u32,
        path: PathBuf,
    },
    ItemFailed {
        index: usize,
        width: u32,
        height: u32,
        message: String,
    },
}

/// Runs one [`ExportTemplate`] against source images.
pub struct IconExporter<'t> {
    template: &'t ExportTemplate,
}

impl<'t> IconExporter<'t> {
    pub fn new(template: &'t ExportTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &ExportTemplate {
        self.template
    }

    /// Export with the built-in `image`-crate codec and no progress events.
    pub fn export_icons(&self, source: &Path, root: &Path) -> Result<ExportReport, ExportError> {
        self.export_with_codec(&RustBackend::new(), source, root, None)
    }

    /// Export using a specific codec (allows testing with a mock).
    pub fn export_with_codec(
        &self,
        codec: &impl ImageCodec,
        source: &Path,
        root: &Path,
        events: Option<&Sender<ExportEvent>>,
    ) -> Result<ExportReport, ExportError> {
        let buffer = codec.decode(source).map_err(|e| ExportError::SourceLoad {
            path: source.to_path_buf(),
            source: e,
        })?;

        let output_dir = root.join(&self.template.output_directory);
        let items = self.template.items();
        log::info!(
            "exporting {} ({}x{}) with template '{}': {} items into {}",
            source.display(),
            buffer.width(),
            buffer.height(),
            self.template.name,
            items.len(),
            output_dir.display()
        );
        send(
            events,
            ExportEvent::Started {
                template: self.template.name.clone(),
                source: source.to_path_buf(),
                width: buffer.width(),
                height: buffer.height(),
                item_count: items.len(),
            },
        );

        let planned: Vec<PlannedItem<'_>> = items
            .iter()
            .enumerate()
            .map(|(index, item)| self.plan_item(index, item, source, &output_dir))
            .collect();

        let buffer = &buffer;
        let mut reports: Vec<ItemReport> = group_by_path(planned)
            .into_par_iter()
            .flat_map_iter(|group| {
                group.into_iter().map(move |plan| {
                    let report = self.export_item(codec, buffer, plan);
                    send(events, item_event(&report));
                    report
                })
            })
            .collect();
        reports.sort_by_key(|r| r.index);

        let report = ExportReport {
            template: self.template.name.clone(),
            source: source.to_path_buf(),
            output_dir,
            items: reports,
        };
        log::info!(
            "template '{}': {}/{} items written",
            report.template,
            report.succeeded(),
            report.items.len()
        );
        Ok(report)
    }

    fn plan_item<'a>(
        &self,
        index: usize,
        item: &'a Item,
        source: &Path,
        output_dir: &Path,
    ) -> PlannedItem<'a> {
        let target = self.template.resolve_name(item).ok().map(|name| {
            let path = with_source_extension(&output_dir.join(&name), source);
            (name, path)
        });
        PlannedItem {
            index,
            item,
            target,
        }
    }

    fn export_item(
        &self,
        codec: &impl ImageCodec,
        buffer: &PixelBuffer,
        plan: PlannedItem<'_>,
    ) -> ItemReport {
        let PlannedItem {
            index,
            item,
            target,
        } = plan;
        let (name, result) = match target {
            Some((name, path)) => {
                let result = write_item(codec, buffer, item, &path).map(|()| path);
                (Some(name), result)
            }
            None => (None, Err(ItemError::UnresolvedPattern)),
        };

        match &result {
            Ok(path) => log::debug!(
                "item {} ({}x{}) -> {}",
                index + 1,
                item.width,
                item.height,
                path.display()
            ),
            Err(e) => log::warn!(
                "item {} ({}x{}) of '{}' failed: {e}",
                index + 1,
                item.width,
                item.height,
                self.template.name
            ),
        }

        ItemReport {
            index,
            width: item.width,
            height: item.height,
            name,
            result,
        }
    }
}

/// A template item with its output file worked out. `target` is `None` when
/// no naming pattern resolves.
struct PlannedItem<'a> {
    index: usize,
    item: &'a Item,
    target: Option<(String, PathBuf)>,
}

/// Split items into groups that can run in parallel. Items that write the same
/// file share a group, kept in template order, so the later item is the one
/// left on disk.
fn group_by_path(planned: Vec<PlannedItem<'_>>) -> Vec<Vec<PlannedItem<'_>>> {
    let mut groups: Vec<Vec<PlannedItem<'_>>> = Vec::new();
    let mut by_path: HashMap<PathBuf, usize> = HashMap::new();
    for plan in planned {
        let Some(path) = plan.target.as_ref().map(|(_, path)| path.clone()) else {
            groups.push(vec![plan]);
            continue;
        };
        match by_path.get(&path) {
            Some(&group) => {
                log::debug!(
                    "item {} writes {} again, after item {}",
                    plan.index + 1,
                    path.display(),
                    groups[group][0].index + 1
                );
                groups[group].push(plan);
            }
            None => {
                by_path.insert(path, groups.len());
                groups.push(vec![plan]);
            }
        }
    }
    groups
}

fn write_item(
    codec: &impl ImageCodec,
    buffer: &PixelBuffer,
    item: &Item,
    path: &Path,
) -> Result<(), ItemError> {
    let resized = resize(buffer, item.width, item.height, false)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ItemError::DirectoryCreate {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    codec
        .encode(&resized, path)
        .map_err(|e| ItemError::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        })
}

fn item_event(report: &ItemReport) -> ExportEvent {
    match &report.result {
        Ok(path) => ExportEvent::ItemWritten {
            index: report.index,
            width: report.width,
            height: report.height,
            path: path.clone(),
        },
        Err(e) => ExportEvent::ItemFailed {
            index: report.index,
            width: report.width,
            height: report.height,
            message: e.to_string(),
        },
    }
}

fn send(events: Option<&Sender<ExportEvent>>, event: ExportEvent) {
    if let Some(tx) = events {
        // A dropped receiver only loses progress output.
        tx.send(event).ok();
    }
}
