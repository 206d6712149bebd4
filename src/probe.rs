//! Tool availability probing against the search path.

/// Answers whether a named executable resolves on the current PATH.
///
/// Pure query with no caching — repeated calls may observe tools installed
/// mid-run, and that is accepted.
pub trait ToolProbe {
    /// Whether `name` resolves to an executable.
    fn exists(&self, name: &str) -> bool;
}

/// Production probe backed by PATH resolution.
pub struct PathProbe;

impl ToolProbe for PathProbe {
    fn exists(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{PathProbe, ToolProbe};

    #[cfg(unix)]
    #[test]
    fn test_path_probe_finds_sh() {
        assert!(PathProbe.exists("sh"));
    }

    #[test]
    fn test_path_probe_rejects_nonexistent_tool() {
        assert!(!PathProbe.exists("definitely-not-a-real-program-xyz"));
    }
}
