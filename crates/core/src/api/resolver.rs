//! Symbol resolution and module discovery.
//!
//! Both are collaborators supplied to the core. The defaults here use the
//! dynamic loader of the current process: `dlopen`/`dlsym` for symbols and
//! `/proc/self/maps` or `dladdr` for module bases.

use crate::model::Module;

/// Binds exported names to callable addresses.
pub trait SymbolResolver {
    fn resolve(&self, name: &str) -> Option<usize>;
}

/// Finds where native libraries are mapped.
pub trait ModuleLocator {
    /// Base address of the first mapping whose path contains `name`.
    fn find_module_base(&self, name: &str) -> Option<usize>;
    /// Module that owns `address`.
    fn find_module_owning(&self, address: usize) -> Option<Module>;
}

/// Base address of the first `/proc/<pid>/maps` line mentioning `name`.
pub fn parse_maps_base(maps: &str, name: &str) -> Option<usize> {
    maps.lines()
        .filter(|line| line.contains(name))
        .find_map(|line| {
            let start = line.split('-').next()?;
            usize::from_str_radix(start.trim(), 16).ok()
        })
}

#[cfg(unix)]
pub use self::unix::{DlResolver, ProcessModules};

#[cfg(unix)]
mod unix {
    use std::ffi::{c_void, CStr, CString};

    use log::debug;
    use thiserror::Error;

    use super::{parse_maps_base, ModuleLocator, SymbolResolver};
    use crate::model::Module;

    /// Errors that can occur while opening the runtime library.
    #[derive(Debug, Error)]
    pub enum LoadError {
        /// The loader refused the library
        #[error("Library not found: {path}: {reason}")]
        NotFound { path: String, reason: String },

        /// Path contained an interior NUL
        #[error("Invalid library name: {0}")]
        InvalidName(String),
    }

    /// `dlopen` handle of the runtime library.
    pub struct DlResolver {
        handle: *mut c_void,
        library: String,
    }

    impl DlResolver {
        /// Open `library`, reusing the mapping when the process already has it loaded.
        pub fn open(library: &str) -> Result<Self, LoadError> {
            let c_name =
                CString::new(library).map_err(|_| LoadError::InvalidName(library.to_string()))?;

            let mut handle =
                unsafe { libc::dlopen(c_name.as_ptr(), libc::RTLD_NOW | libc::RTLD_NOLOAD) };
            if handle.is_null() {
                debug!("{library} is not loaded yet, loading it");
                handle = unsafe { libc::dlopen(c_name.as_ptr(), libc::RTLD_NOW) };
            }

            if handle.is_null() {
                let reason = unsafe {
                    let err_ptr = libc::dlerror();
                    if err_ptr.is_null() {
                        "Unknown error".to_string()
                    } else {
                        CStr::from_ptr(err_ptr).to_string_lossy().into_owned()
                    }
                };
                return Err(LoadError::NotFound { path: library.to_string(), reason });
            }

            Ok(Self { handle, library: library.to_string() })
        }

        pub fn library(&self) -> &str {
            &self.library
        }
    }

    impl SymbolResolver for DlResolver {
        fn resolve(&self, name: &str) -> Option<usize> {
            let c_name = CString::new(name).ok()?;
            let symbol = unsafe {
                libc::dlerror();
                libc::dlsym(self.handle, c_name.as_ptr())
            };
            if symbol.is_null() {
                None
            } else {
                Some(symbol as usize)
            }
        }
    }

    impl Drop for DlResolver {
        fn drop(&mut self) {
            unsafe {
                libc::dlclose(self.handle);
            }
        }
    }

    /// Module locator for the current process.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct ProcessModules;

    impl ModuleLocator for ProcessModules {
        fn find_module_base(&self, name: &str) -> Option<usize> {
            let maps = std::fs::read_to_string("/proc/self/maps").ok()?;
            parse_maps_base(&maps, name)
        }

        fn find_module_owning(&self, address: usize) -> Option<Module> {
            let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
            let found = unsafe { libc::dladdr(address as *const c_void, &mut info) };
            if found == 0 || info.dli_fbase.is_null() {
                return None;
            }
            let name = if info.dli_fname.is_null() {
                String::new()
            } else {
                unsafe { CStr::from_ptr(info.dli_fname) }.to_string_lossy().into_owned()
            };
            Some(Module::new(name, info.dli_fbase as usize))
        }
    }
}

#[cfg(unix)]
pub use self::unix::LoadError;
