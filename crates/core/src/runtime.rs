//! Attaching to a live runtime.
//!
//! The runtime may still be initializing when we get control, so attachment
//! locates the runtime module, waits for the engine to report readiness and
//! only then attaches the calling thread to the root domain.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::api::{ApiError, DomainRef, EntryPoint, ModuleLocator, RuntimeApi};
use crate::dump::{DumpError, DumpResult};
use crate::model::Module;

pub const DEFAULT_LIBRARY: &str = "libil2cpp.so";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How to find the runtime and how long to sleep between readiness checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOptions {
    pub library: String,
    pub poll_interval: Duration,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self { library: DEFAULT_LIBRARY.to_string(), poll_interval: DEFAULT_POLL_INTERVAL }
    }
}

/// Result of a successful attach. Every later runtime call happens on the
/// thread that produced this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedContext {
    pub module: Module,
    pub domain: DomainRef,
}

/// Find where the runtime library is mapped.
///
/// Asking the loader which module owns one of the runtime's own exports is
/// preferred over matching the library name against the mapping list.
pub fn locate_module<A, L>(api: &A, locator: &L, library: &str) -> Option<Module>
where
    A: RuntimeApi + ?Sized,
    L: ModuleLocator + ?Sized,
{
    if let Some(address) = api.address_of(EntryPoint::DomainGetAssemblies) {
        if let Some(module) = locator.find_module_owning(address) {
            return Some(module);
        }
        debug!("no module owns {:#x}, falling back to {}", address, library);
    }
    locator.find_module_base(library).map(|base| Module::new(library, base))
}

/// Whether the engine reports it has finished initializing.
pub fn runtime_ready<A: RuntimeApi + ?Sized>(api: &A) -> bool {
    if api.supports(EntryPoint::IsVmThread) {
        api.is_vm_thread().unwrap_or(false)
    } else {
        api.domain_get().is_ok()
    }
}

/// Block until the runtime is ready. Returns how many times it slept.
///
/// There is no timeout while the runtime is initializing. When neither
/// readiness entry point resolved the runtime can never report ready, so
/// this fails straight away instead.
pub fn wait_until_ready<A>(api: &A, interval: Duration) -> DumpResult<u64>
where
    A: RuntimeApi + ?Sized,
{
    if !api.supports(EntryPoint::IsVmThread) {
        if !api.supports(EntryPoint::DomainGet) {
            return Err(DumpError::AttachFailed(ApiError::Unsupported(EntryPoint::DomainGet)));
        }
        warn!("{} is missing, waiting for a root domain instead", EntryPoint::IsVmThread);
    }
    let mut waited = 0;
    while !runtime_ready(api) {
        info!("Waiting for il2cpp_init...");
        thread::sleep(interval);
        waited += 1;
    }
    Ok(waited)
}

/// Locate the runtime, wait for it and attach the current thread.
pub fn attach<A, L>(api: &A, locator: &L, options: &AttachOptions) -> DumpResult<AttachedContext>
where
    A: RuntimeApi + ?Sized,
    L: ModuleLocator + ?Sized,
{
    let module = locate_module(api, locator, &options.library)
        .ok_or_else(|| DumpError::RuntimeUnavailable(options.library.clone()))?;
    info!("il2cpp_base: {:#x}", module.base);

    wait_until_ready(api, options.poll_interval)?;

    let domain = api.domain_get().map_err(DumpError::AttachFailed)?;
    api.thread_attach(domain).map_err(DumpError::AttachFailed)?;
    debug!("attached to domain {:#x}", domain.addr());

    Ok(AttachedContext { module, domain })
}
