use std::path::Path;

use anyhow::{Context, Result};
use il2dump_core::config::load_config;
use il2dump_core::DumpConfig;
use log::info;

use crate::absolute_path;

/// Flag values that override the config file.
#[derive(Debug, Default, Clone)]
pub struct DumpOverrides {
    pub library: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub no_image_index: bool,
}

/// Load the config file (or defaults) and apply command-line overrides.
pub fn resolve_dump_config(config: Option<&str>, overrides: &DumpOverrides) -> Result<DumpConfig> {
    let mut resolved = match config {
        Some(path) => load_config(Path::new(path))
            .with_context(|| format!("Failed to load dump config: {path}"))?,
        None => DumpConfig::default(),
    };

    if let Some(library) = &overrides.library {
        resolved.library = library.clone();
    }
    if let Some(ms) = overrides.poll_interval_ms {
        resolved.poll_interval_ms = ms;
    }
    if overrides.no_image_index {
        resolved.include_image_index = false;
    }
    Ok(resolved)
}

/// Bind the runtime library in this process, attach and write the dump.
pub fn dump_command(output: &str, config: Option<&str>, overrides: &DumpOverrides) -> Result<()> {
    let config = resolve_dump_config(config, overrides)?;
    let output = absolute_path(output)?;
    info!("il2dump v{}", il2dump_core::version());
    run_dump(&config, &output)
}

#[cfg(unix)]
fn run_dump(config: &DumpConfig, output: &Path) -> Result<()> {
    use il2dump_core::api::{DlResolver, NativeApi, ProcessModules};

    let resolver = DlResolver::open(&config.library)
        .with_context(|| format!("Failed to open runtime library {}", config.library))?;
    let api = NativeApi::bind(&resolver);
    info!("bound {} ({} entry points missing)", resolver.library(), api.missing().len());

    let summary = il2dump_core::dump(&api, &ProcessModules, config, output)
        .with_context(|| format!("Dump to {} failed", output.display()))?;

    println!("Dump written: {}", output.display());
    println!("  Assemblies: {}", summary.assemblies);
    println!("  Types: {}", summary.types);
    println!("  Skipped types: {}", summary.skipped);
    println!("  Bytes: {}", summary.bytes);
    Ok(())
}

#[cfg(not(unix))]
fn run_dump(_config: &DumpConfig, _output: &Path) -> Result<()> {
    anyhow::bail!("Dumping requires a unix dynamic loader")
}
