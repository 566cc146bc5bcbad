//! Lookups over a marker list, as an editor needs them per input.

use quire_core::{Marker, Path};

pub trait MarkerQuery {
    /// Markers reported exactly at `path`.
    fn at_path(&self, path: &Path) -> Vec<&Marker>;

    /// Markers at `prefix` or anywhere beneath it.
    fn within(&self, prefix: &Path) -> Vec<&Marker>;

    fn errors(&self) -> Vec<&Marker>;

    fn has_errors(&self) -> bool;

    /// Message of the first error-level marker.
    fn first_error_message(&self) -> Option<&str>;

    /// Message of the first error-level marker at `path`.
    fn first_error_at(&self, path: &Path) -> Option<&str>;
}

impl MarkerQuery for [Marker] {
    fn at_path(&self, path: &Path) -> Vec<&Marker> {
        self.iter().filter(|m| &m.path == path).collect()
    }

    fn within(&self, prefix: &Path) -> Vec<&Marker> {
        self.iter().filter(|m| m.path.starts_with(prefix)).collect()
    }

    fn errors(&self) -> Vec<&Marker> {
        self.iter().filter(|m| m.is_error()).collect()
    }

    fn has_errors(&self) -> bool {
        self.iter().any(Marker::is_error)
    }

    fn first_error_message(&self) -> Option<&str> {
        self.iter().find(|m| m.is_error()).map(Marker::message)
    }

    fn first_error_at(&self, path: &Path) -> Option<&str> {
        self.iter()
            .find(|m| m.is_error() && &m.path == path)
            .map(Marker::message)
    }
}
