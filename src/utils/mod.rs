pub mod logging;

use std::sync::{Mutex, MutexGuard};

/// Lock a std mutex, recovering the guard if a panicking writer poisoned it.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
