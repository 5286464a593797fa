//! End-to-end dump: attach, walk, extract, render, write.

use std::io;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use thiserror::Error;

use crate::api::{ApiError, ModuleLocator, RuntimeApi};
use crate::config::DumpConfig;
use crate::members::extract_type;
use crate::output::DumpDocument;
use crate::render::render_type;
use crate::runtime::{attach, AttachedContext};
use crate::walker::{walk, WalkItem};

/// Reasons a dump aborts. Anything not listed here is recovered in place.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Runtime module not found: {0}")]
    RuntimeUnavailable(String),
    #[error("Failed to attach to the runtime domain: {0}")]
    AttachFailed(ApiError),
    #[error("Reflection fallback unavailable: missing {0}")]
    ReflectionUnavailable(&'static str),
    #[error("Failed to enumerate assemblies: {0}")]
    Enumeration(#[from] ApiError),
    #[error("Failed to write dump to {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
    #[error("Invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

pub type DumpResult<T> = Result<T, DumpError>;

/// Counts reported after a successful dump.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DumpSummary {
    pub assemblies: usize,
    pub types: usize,
    /// Types (or whole assemblies) left out because the runtime refused them.
    pub skipped: usize,
    pub bytes: usize,
}

/// Build the whole document for an attached runtime.
pub fn build_document<A: RuntimeApi + ?Sized>(
    api: &A,
    ctx: &AttachedContext,
    config: &DumpConfig,
) -> DumpResult<(DumpDocument, DumpSummary)> {
    let items = walk(api, ctx)?;
    let mut document = DumpDocument::new();
    let mut summary = DumpSummary::default();

    if config.include_image_index {
        for image in items.images() {
            document.push_image(image.index, &image.name);
        }
    }

    for item in items {
        match item {
            Ok(WalkItem::Assembly(entry)) => {
                document.begin_assembly(&entry.name);
                summary.assemblies += 1;
            }
            Ok(WalkItem::Type(class)) => match extract_type(api, class, &ctx.module) {
                Ok(info) => {
                    document.push_type(&render_type(&info));
                    summary.types += 1;
                }
                Err(err) => {
                    warn!("skipping class {:#x}: {}", class.addr(), err);
                    summary.skipped += 1;
                }
            },
            Err(err) => {
                warn!("enumeration error: {}", err);
                summary.skipped += 1;
            }
        }
    }

    summary.bytes = document.len();
    Ok((document, summary))
}

/// Attach to the runtime and write its declarations to `output`.
///
/// Nothing is written unless the whole document was built.
pub fn dump<A, L>(
    api: &A,
    locator: &L,
    config: &DumpConfig,
    output: &Path,
) -> DumpResult<DumpSummary>
where
    A: RuntimeApi + ?Sized,
    L: ModuleLocator + ?Sized,
{
    let result = run(api, locator, config, output);
    if let Err(err) = &result {
        error!("dump aborted: {}", err);
    }
    result
}

fn run<A, L>(api: &A, locator: &L, config: &DumpConfig, output: &Path) -> DumpResult<DumpSummary>
where
    A: RuntimeApi + ?Sized,
    L: ModuleLocator + ?Sized,
{
    let ctx = attach(api, locator, &config.attach_options())?;
    info!("dumping...");
    let (document, summary) = build_document(api, &ctx, config)?;

    info!("write dump file");
    document
        .write_to(output)
        .map_err(|source| DumpError::Output { path: output.to_path_buf(), source })?;
    info!(
        "dump done -> {} ({} assemblies, {} types, {} skipped)",
        output.display(),
        summary.assemblies,
        summary.types,
        summary.skipped
    );
    Ok(summary)
}
