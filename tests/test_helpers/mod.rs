//! Scoped environment overrides for configuration tests.
//!
//! Configuration loading reads the API key fallback from the process
//! environment, which every test thread shares. [`EnvVarGuard`] holds a
//! process-wide lock for its lifetime so overlapping tests cannot observe
//! each other's values.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Sets or clears one environment variable and restores it on drop.
pub struct EnvVarGuard {
    key: &'static str,
    saved: Option<OsString>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets `key` to `value`, or removes it when `value` is `None`.
    pub fn set(key: &'static str, value: Option<&str>) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let saved = env::var_os(key);
        write_var(key, value.map(OsString::from));
        Self {
            key,
            saved,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        write_var(self.key, self.saved.take());
    }
}

fn write_var(key: &str, value: Option<OsString>) {
    // SAFETY: callers hold `ENV_LOCK`, and no other code in the test
    // binary touches the environment concurrently.
    unsafe {
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}
