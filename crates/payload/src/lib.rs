//! Injectable entry points for dumping the runtime of the host process.
//!
//! A loader maps this library into the game and calls `il2dump_start` (or
//! `il2dump_run` when it can block). Everything after that happens through
//! `il2dump-core` against the runtime library already loaded in the process.

use std::ffi::{c_char, c_int, CStr};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use il2dump_core::{DumpConfig, DumpSummary};
use log::{error, info};

/// Dump location under the application's data directory.
pub fn dump_output_path(data_dir: &Path) -> PathBuf {
    data_dir.join("files").join("dump.cs")
}

/// Install the process-wide logger unless the host already has one.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_module_path(false)
        .try_init();
}

/// Bind the runtime library, attach and write the dump to `output`.
#[cfg(unix)]
pub fn run(output: &Path, config: &DumpConfig) -> Result<DumpSummary> {
    use il2dump_core::api::{DlResolver, NativeApi, ProcessModules};

    let resolver = DlResolver::open(&config.library)
        .with_context(|| format!("Failed to open runtime library {}", config.library))?;
    let api = NativeApi::bind(&resolver);
    il2dump_core::dump(&api, &ProcessModules, config, output)
        .with_context(|| format!("Dump to {} failed", output.display()))
}

#[cfg(not(unix))]
pub fn run(_output: &Path, _config: &DumpConfig) -> Result<DumpSummary> {
    Err(anyhow!("Dumping requires a unix dynamic loader"))
}

fn path_arg(ptr: *const c_char) -> Result<PathBuf> {
    if ptr.is_null() {
        return Err(anyhow!("null path argument"));
    }
    // SAFETY: non-null pointers come from the loader as NUL-terminated strings.
    let raw = unsafe { CStr::from_ptr(ptr) };
    let path = raw.to_str().context("path argument is not UTF-8")?;
    Ok(PathBuf::from(path))
}

fn run_logged(output: &Path) -> c_int {
    match run(output, &DumpConfig::default()) {
        Ok(summary) => {
            info!("dumped {} types from {} assemblies", summary.types, summary.assemblies);
            0
        }
        Err(err) => {
            error!("{:#}", err);
            -1
        }
    }
}

/// Start a background dump into `<data_dir>/files/dump.cs` and return immediately.
///
/// # Safety
/// `data_dir` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn il2dump_start(data_dir: *const c_char) {
    init_logging();
    let output = match path_arg(data_dir) {
        Ok(dir) => dump_output_path(&dir),
        Err(err) => {
            error!("il2dump_start: {:#}", err);
            return;
        }
    };

    let spawned = thread::Builder::new().name("il2dump".into()).spawn(move || {
        run_logged(&output);
    });
    if let Err(err) = spawned {
        error!("failed to spawn dump thread: {}", err);
    }
}

/// Dump into `output_path` on the calling thread. Returns 0 on success, -1 on failure.
///
/// # Safety
/// `output_path` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn il2dump_run(output_path: *const c_char) -> c_int {
    init_logging();
    match path_arg(output_path) {
        Ok(output) => run_logged(&output),
        Err(err) => {
            error!("il2dump_run: {:#}", err);
            -1
        }
    }
}
