//! Flat, diffable renderings of resolution histories.
//!
//! The textual shape of each rendered step is relied on by tooling and
//! integration tests:
//!
//! ```text
//! {source} => {description} => {kind}({value})
//! ```

use serde::Serialize;

use crate::resolution::UriPackageOrWrapper;
use crate::resolution::UriResolutionStep;

/// A rendered step, or the rendered sub-history of the step before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CleanHistoryEntry {
    Step(String),
    Nested(CleanHistory),
}

pub type CleanHistory = Vec<CleanHistoryEntry>;

/// Render `history` as nested lists of strings.
///
/// A step with a non-empty sub-history is followed by a nested entry holding
/// the rendered sub-history. `depth` limits how many levels are expanded:
/// `Some(0)` renders only the top level, `None` renders everything.
pub fn build_clean_history(history: &[UriResolutionStep], depth: Option<usize>) -> CleanHistory {
    let mut clean = CleanHistory::with_capacity(history.len());
    for step in history {
        clean.push(CleanHistoryEntry::Step(render_step(step)));

        if step.sub_history.is_empty() {
            continue;
        }
        match depth {
            Some(0) => {}
            Some(depth) => clean.push(CleanHistoryEntry::Nested(build_clean_history(
                &step.sub_history,
                Some(depth - 1),
            ))),
            None => clean.push(CleanHistoryEntry::Nested(build_clean_history(
                &step.sub_history,
                None,
            ))),
        }
    }
    clean
}

/// Render a single step without its sub-history.
pub fn render_step(step: &UriResolutionStep) -> String {
    let (kind, value) = match &step.result {
        Ok(UriPackageOrWrapper::Uri(uri)) => ("uri", uri.to_string()),
        Ok(UriPackageOrWrapper::Package { uri, .. }) => ("package", uri.to_string()),
        Ok(UriPackageOrWrapper::Wrapper { uri, .. }) => ("wrapper", uri.to_string()),
        Err(err) => ("error", err.to_string()),
    };
    match &step.description {
        Some(description) => format!("{} => {description} => {kind}({value})", step.source_uri),
        None => format!("{} => {kind}({value})", step.source_uri),
    }
}

/// The steps that actually moved resolution forward: misses are dropped at
/// every level.
pub fn get_uri_resolution_path(history: &[UriResolutionStep]) -> Vec<UriResolutionStep> {
    history
        .iter()
        .filter(|step| !step.is_miss())
        .map(|step| {
            let mut step = step.clone();
            step.sub_history = get_uri_resolution_path(&step.sub_history);
            step
        })
        .collect()
}
