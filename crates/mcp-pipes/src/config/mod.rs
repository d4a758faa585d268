//! Configuration loading and resolution.

pub mod loader;

pub use loader::{
    load_config, resolve_provider_exe, AssetConfig, PipesConfig, ProviderSpec, PROVIDER_EXE_ENV,
};
