/*!
 * Versioned Configuration
 * Atomically swappable immutable snapshots (read-copy-update)
 */

use crate::core::errors::{ConfigError, ConfigResult};
use arc_swap::ArcSwapOption;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// Immutable published value plus the version it was published under
///
/// Versions start at 1 and grow by one with every successful publication.
#[derive(Debug, Serialize)]
pub struct Snapshot<T> {
    version: u64,
    value: Arc<T>,
}

impl<T> Snapshot<T> {
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

/// Hot-swappable configuration with lock-free reads
///
/// Readers get an `Arc` to a fully constructed [`Snapshot`]; writers publish a
/// new snapshot with a single atomic pointer swap and never mutate one in
/// place, so a half-built value is never observable.
///
/// # Load before store
///
/// A config built with [`empty`](Self::empty) returns [`ConfigError::Unset`]
/// from [`load`](Self::load) until the first [`store`](Self::store). Build with
/// [`new`](Self::new) to make that state unreachable.
///
/// # Example
///
/// ```
/// use atomic_toolkit::VersionedConfig;
///
/// let config = VersionedConfig::new(100);
/// config.store(200);
///
/// let current = config.load().unwrap();
/// assert_eq!(**current, 200);
/// assert_eq!(current.version(), 2);
/// ```
pub struct VersionedConfig<T> {
    slot: ArcSwapOption<Snapshot<T>>,
}

impl<T> VersionedConfig<T> {
    /// Create a config holding `initial` as version 1
    pub fn new(initial: T) -> Self {
        Self {
            slot: ArcSwapOption::from_pointee(Snapshot {
                version: 1,
                value: Arc::new(initial),
            }),
        }
    }

    /// Create a config with no snapshot; `load` fails until the first `store`
    pub fn empty() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Current snapshot
    #[inline]
    pub fn load(&self) -> ConfigResult<Arc<Snapshot<T>>> {
        self.slot.load_full().ok_or(ConfigError::Unset)
    }

    /// Whether any snapshot has been published
    #[inline]
    pub fn is_set(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Version of the current snapshot, 0 while empty
    #[inline]
    pub fn version(&self) -> u64 {
        match &*self.slot.load() {
            Some(snapshot) => snapshot.version,
            None => 0,
        }
    }

    /// Publish `value`, replacing whatever is current
    ///
    /// Returns the snapshot that was published.
    pub fn store(&self, value: T) -> Arc<Snapshot<T>> {
        let value = Arc::new(value);
        let mut current = self.slot.load_full();

        // Retries only to keep versions monotonic under racing writers; each
        // attempt is still one pointer swap.
        loop {
            let next = Arc::new(Snapshot {
                version: current.as_ref().map_or(1, |s| s.version + 1),
                value: Arc::clone(&value),
            });
            let previous = self.slot.compare_and_swap(&current, Some(Arc::clone(&next)));
            if same_snapshot(&previous, &current) {
                debug!(version = next.version, "configuration published");
                return next;
            }
            current = Option::clone(&previous);
        }
    }

    /// Publish `new` iff `current` is still the live snapshot
    pub fn compare_and_swap(&self, current: &Arc<Snapshot<T>>, new: T) -> bool {
        let next = Arc::new(Snapshot {
            version: current.version + 1,
            value: Arc::new(new),
        });
        let previous = self.slot.compare_and_swap(current, Some(next));
        let swapped = matches!(&*previous, Some(p) if Arc::ptr_eq(p, current));
        if swapped {
            debug!(version = current.version + 1, "configuration swapped");
        }
        swapped
    }

    /// Read-copy-update: derive the next value from the current one
    ///
    /// `f` may run more than once if other writers publish concurrently.
    pub fn update<F>(&self, mut f: F) -> ConfigResult<Arc<Snapshot<T>>>
    where
        F: FnMut(&T) -> T,
    {
        let mut current = self.load()?;
        loop {
            let next = Arc::new(Snapshot {
                version: current.version + 1,
                value: Arc::new(f(current.value())),
            });
            let previous = self.slot.compare_and_swap(&current, Some(Arc::clone(&next)));
            match &*previous {
                Some(p) if Arc::ptr_eq(p, &current) => {
                    debug!(version = next.version, "configuration updated");
                    return Ok(next);
                }
                Some(p) => current = Arc::clone(p),
                None => return Err(ConfigError::Unset),
            }
        }
    }
}

impl<T> Default for VersionedConfig<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for VersionedConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedConfig")
            .field("current", &self.slot.load_full())
            .finish()
    }
}

fn same_snapshot<T>(a: &Option<Arc<Snapshot<T>>>, b: &Option<Arc<Snapshot<T>>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
