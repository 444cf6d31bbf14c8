//! Resolution data model: results, steps, context and history rendering.

mod context;
mod history;
mod result;
mod step;

pub use context::InFlightGuard;
pub use context::ResolutionContext;
pub use history::CleanHistory;
pub use history::CleanHistoryEntry;
pub use history::build_clean_history;
pub use history::get_uri_resolution_path;
pub use history::render_step;
pub use result::UriPackageOrWrapper;
pub use step::UriResolutionStep;
