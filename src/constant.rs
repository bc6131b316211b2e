/// Application name and metadata constants
pub const APP_NAME: &str = "Page History";

/// Distance (in layout units) from the end of the content at which the next
/// batch is requested.
pub const DEFAULT_LOOKAHEAD_THRESHOLD: f64 = 200.0;

/// Revisions requested per page.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// A comparison always takes exactly this many revisions.
pub const MAX_SELECTION: usize = 2;
