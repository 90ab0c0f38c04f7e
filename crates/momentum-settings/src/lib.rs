//! # momentum-settings
//!
//! Configuration management with layered sources for the Momentum server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`MomentumSettings::default()`]
//! 2. **User file**: `~/.momentum/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `MOMENTUM_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_overrides, deep_merge, load_settings_from_path, load_settings_with, settings_path};
pub use types::*;
