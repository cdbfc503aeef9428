/// Culling configuration and backend selection

use std::fmt;

/// Available visibility backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullingMode {
    /// Software plane test, one object at a time
    Cpu,
    /// Data-parallel clip-space evaluation on a worker pool
    Parallel,
}

impl CullingMode {
    /// Parse a mode name (case-insensitive).
    ///
    /// Returns `None` for unrecognized names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cpu" | "software" => Some(CullingMode::Cpu),
            "parallel" | "compute" | "accelerated" => Some(CullingMode::Parallel),
            _ => None,
        }
    }

    /// Canonical name, accepted by `parse`
    pub fn name(&self) -> &'static str {
        match self {
            CullingMode::Cpu => "cpu",
            CullingMode::Parallel => "parallel",
        }
    }
}

impl fmt::Display for CullingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Culling engine configuration
#[derive(Debug, Clone)]
pub struct CullingConfig {
    /// Requested backend name (see `CullingMode::parse`)
    pub mode: String,
    /// Minimum number of objects per parallel work item
    pub batch_size: usize,
}

impl CullingConfig {
    pub fn with_mode(mode: CullingMode) -> Self {
        Self {
            mode: mode.name().to_string(),
            ..Self::default()
        }
    }
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            mode: CullingMode::Cpu.name().to_string(),
            batch_size: 64,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
