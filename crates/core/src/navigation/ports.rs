//! Port interface for the navigation surface
//!
//! A browser history, a desktop shell or a test double all implement this.

/// Current location and navigation actions
pub trait Navigator: Send + Sync {
    /// Path of the current location, including any query string
    fn current_path(&self) -> String;

    /// Push a new location
    fn navigate(&self, path: &str);

    /// Replace the current location (no new history entry)
    fn replace(&self, path: &str);
}
