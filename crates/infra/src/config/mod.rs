//! Configuration loading
//!
//! Layers, lowest first: built-in defaults, a JSON or TOML file, then
//! `CALRELAY_*` environment variables.

pub mod loader;

pub use loader::{apply_env_overrides, load, load_from_file, probe_config_paths, validate};
