//! TOML configuration: provider launch specs and asset locations.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{McpError, McpResult};

/// Environment variable naming the executable that serves built-in providers.
pub const PROVIDER_EXE_ENV: &str = "MCP_PIPES_PROVIDER";

/// Executable that serves the built-in providers.
const PROVIDER_BIN: &str = "mcp-pipes";

/// How to launch one provider process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Name used in logs and orchestrator keys; taken from the table key.
    #[serde(skip)]
    pub name: String,

    /// Command to run the provider.
    pub command: String,

    /// Command arguments.
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// `<exe> serve <provider>`.
    pub fn builtin(exe: &Path, provider: &str) -> Self {
        Self::new(provider, exe.to_string_lossy()).with_args(["serve", provider])
    }
}

/// Where demo inputs are read from and outputs written to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Logo served by the report provider; defaults to `<data_dir>/logo.png`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    /// Certificate template; defaults to `<data_dir>/certificate.png`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            logo: None,
            template: None,
        }
    }
}

impl AssetConfig {
    pub fn logo_path(&self) -> PathBuf {
        self.logo
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logo.png"))
    }

    pub fn template_path(&self) -> PathBuf {
        self.template
            .clone()
            .unwrap_or_else(|| self.data_dir.join("certificate.png"))
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipesConfig {
    /// `[providers.<name>]` tables.
    pub providers: BTreeMap<String, ProviderSpec>,
    pub assets: AssetConfig,
}

impl PipesConfig {
    /// Spec for `provider`: the configured table if present, else the
    /// built-in provider served by `exe`.
    pub fn provider_spec(&self, provider: &str, exe: &Path) -> ProviderSpec {
        match self.providers.get(provider) {
            Some(spec) => spec.clone(),
            None => ProviderSpec::builtin(exe, provider),
        }
    }
}

/// Load configuration from `path`, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> McpResult<PipesConfig> {
    let Some(path) = path else {
        return Ok(PipesConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| McpError::Config(format!("cannot read {}: {e}", path.display())))?;
    let mut config: PipesConfig = toml::from_str(&content)
        .map_err(|e| McpError::Config(format!("invalid {}: {e}", path.display())))?;

    for (name, spec) in config.providers.iter_mut() {
        spec.name = name.clone();
    }

    tracing::debug!(
        "Loaded config from {} ({} providers)",
        path.display(),
        config.providers.len()
    );
    Ok(config)
}

/// Resolve the executable serving built-in providers.
///
/// Order: explicit path, then `MCP_PIPES_PROVIDER`, then the current
/// executable if it is `mcp-pipes`, then `mcp-pipes` beside it.
pub fn resolve_provider_exe(explicit: Option<&Path>) -> McpResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(PROVIDER_EXE_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let current = std::env::current_exe()?;
    let is_provider_bin = current
        .file_stem()
        .is_some_and(|stem| stem == PROVIDER_BIN);
    if is_provider_bin {
        return Ok(current);
    }
    Ok(current.with_file_name(format!("{PROVIDER_BIN}{}", std::env::consts::EXE_SUFFIX)))
}
