//! CLI configuration

/// Resolved CLI configuration shared by all command handlers.
pub struct Config {
    pub control_plane_url: String,
}
