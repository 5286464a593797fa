use std::path::Path;

use anyhow::{Context, Result};
use il2dump_core::api::{EntryPoint, RuntimeApi};
use il2dump_core::walker::preferred_strategy;
use serde::Serialize;

use crate::sha256_file;

/// What binding a runtime library produced, without attaching to it.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub library: String,
    /// SHA-256 of the library file, when `library` names a file on disk.
    pub sha256: Option<String>,
    pub resolved: Vec<String>,
    pub missing: Vec<String>,
    pub strategy: String,
}

impl ProbeReport {
    /// Summarize which catalogue entries `api` supports.
    pub fn from_api<A: RuntimeApi + ?Sized>(library: &str, api: &A) -> Result<Self> {
        let (resolved, missing): (Vec<EntryPoint>, Vec<EntryPoint>) =
            EntryPoint::ALL.iter().copied().partition(|e| api.supports(*e));

        let path = Path::new(library);
        let sha256 = if path.is_file() { Some(sha256_file(path)?) } else { None };

        Ok(Self {
            library: library.to_string(),
            sha256,
            resolved: resolved.iter().map(|e| e.name().to_string()).collect(),
            missing: missing.iter().map(|e| e.name().to_string()).collect(),
            strategy: preferred_strategy(api).as_str().to_string(),
        })
    }

    pub fn print_text(&self) {
        println!("Runtime library: {}", self.library);
        if let Some(hash) = &self.sha256 {
            println!("SHA-256: {hash}");
        }
        println!("Walk strategy: {}", self.strategy);
        println!(
            "Entry points: {} resolved, {} missing",
            self.resolved.len(),
            self.missing.len()
        );
        for name in &self.missing {
            println!("  - missing: {name}");
        }
    }
}

/// Bind `library` and report what resolved. Never attaches to the runtime.
pub fn probe_command(library: &str, json: bool) -> Result<()> {
    let report = probe_library(library)?;
    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize probe")?;
        println!("{out}");
    } else {
        report.print_text();
    }
    Ok(())
}

#[cfg(unix)]
fn probe_library(library: &str) -> Result<ProbeReport> {
    use il2dump_core::api::{DlResolver, NativeApi};

    let resolver = DlResolver::open(library)
        .with_context(|| format!("Failed to open runtime library {library}"))?;
    let api = NativeApi::bind(&resolver);
    ProbeReport::from_api(library, &api)
}

#[cfg(not(unix))]
fn probe_library(_library: &str) -> Result<ProbeReport> {
    anyhow::bail!("Probing requires a unix dynamic loader")
}
