//! API constants

/// Versioned prefix for the named routes, e.g. `/api/v0/submissions`.
///
/// The bare `/` routes stay unversioned for form clients that post to the
/// deployment root.
pub const API_PREFIX: &str = "/api/v0";
