//! Configuration sources, lowest precedence first: global file, workspace files,
//! environment.

pub mod global_file;
pub mod workspace_file;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

/// Prefix for environment overrides, e.g. `SCOPESTACK__STORAGE__BACKEND=local`.
pub const ENV_PREFIX: &str = "SCOPESTACK";

pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__"),
    )
}
