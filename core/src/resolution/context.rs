//! Per-resolution bookkeeping shared across a call tree.
//!
//! A [`ResolutionContext`] is a cheap handle: cloning it shares every field.
//! The two sub-context builders share some fields and replace others:
//!
//! | builder                        | in-flight | path   | history | depth  |
//! |--------------------------------|-----------|--------|---------|--------|
//! | `create_sub_history_context`   | shared    | shared | fresh   | shared |
//! | `create_sub_context`           | fresh     | fresh  | shared  | shared |
//!
//! The depth counter spans the whole call tree, including resolutions started
//! by invocations made during resolution, so it bounds re-entry into the
//! engine even when cycle detection starts over in a sub-context.
//!
//! Locks are never held across an `.await`.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::resolution::UriResolutionStep;
use crate::uri::Uri;

type Shared<T> = Arc<Mutex<T>>;

// The guarded data stays consistent even if a holder panicked mid-operation
// (every critical section is a single insert/remove/clone).
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Default)]
pub struct ResolutionContext {
    in_flight: Shared<HashSet<Uri>>,
    resolution_path: Shared<Vec<Uri>>,
    history: Shared<Vec<UriResolutionStep>>,
    depth: Arc<AtomicUsize>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `uri` is currently being resolved somewhere up the call tree.
    pub fn is_resolving(&self, uri: &Uri) -> bool {
        lock(&self.in_flight).contains(uri)
    }

    /// Mark `uri` in flight, record it on the resolution path and enter one
    /// nesting level.
    ///
    /// The marker and the level are released when the returned guard is
    /// dropped.
    #[must_use = "dropping the guard immediately releases the in-flight marker"]
    pub fn start_resolving(&self, uri: &Uri) -> InFlightGuard {
        lock(&self.in_flight).insert(uri.clone());
        {
            let mut path = lock(&self.resolution_path);
            if !path.contains(uri) {
                path.push(uri.clone());
            }
        }
        self.depth.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            depth: Arc::clone(&self.depth),
            uri: uri.clone(),
        }
    }

    /// Number of resolutions currently in progress anywhere in the call tree,
    /// sub-contexts included.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn track_step(&self, step: UriResolutionStep) {
        lock(&self.history).push(step);
    }

    /// Snapshot of the steps recorded so far.
    pub fn history(&self) -> Vec<UriResolutionStep> {
        lock(&self.history).clone()
    }

    /// Every uri visited so far, in first-visit order.
    pub fn resolution_path(&self) -> Vec<Uri> {
        lock(&self.resolution_path).clone()
    }

    /// Isolated step tracking for children of a composite resolver; cycle
    /// detection and alias bookkeeping stay shared.
    pub fn create_sub_history_context(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
            resolution_path: Arc::clone(&self.resolution_path),
            history: Shared::default(),
            depth: Arc::clone(&self.depth),
        }
    }

    /// Context for an independent invocation: its own cycle detection and
    /// path, but its steps land in this context's history.
    pub fn create_sub_context(&self) -> Self {
        Self {
            in_flight: Shared::default(),
            resolution_path: Shared::default(),
            history: Arc::clone(&self.history),
            depth: Arc::clone(&self.depth),
        }
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("in_flight", &lock(&self.in_flight).len())
            .field("resolution_path", &lock(&self.resolution_path))
            .field("history", &lock(&self.history).len())
            .field("depth", &self.depth())
            .finish()
    }
}

/// Releases an in-flight marker and its nesting level on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Shared<HashSet<Uri>>,
    depth: Arc<AtomicUsize>,
    uri: Uri,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.uri);
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
