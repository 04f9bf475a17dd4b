use std::{
    ffi::OsString,
    path::Path,
    sync::{Mutex, MutexGuard, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Sets environment variables for the lifetime of the guard and restores
/// the previous values on drop.
pub struct ToptagEnvGuard {
    previous: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ToptagEnvGuard {
    pub fn set(vars: &[(&'static str, &Path)]) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let mut previous = Vec::with_capacity(vars.len());
        for (key, value) in vars {
            previous.push((*key, std::env::var_os(key)));
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                std::env::set_var(key, value);
            }
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for ToptagEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..).rev() {
            match value {
                // SAFETY: tests run under a global lock to prevent concurrent env mutations.
                Some(value) => unsafe { std::env::set_var(key, value) },
                // SAFETY: tests run under a global lock to prevent concurrent env mutations.
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}
