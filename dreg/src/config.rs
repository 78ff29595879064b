use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::commands::GlobalArgs;
use crate::error::Result;

pub const DEFAULT_URL: &str = "http://localhost:5000";
pub const DEFAULT_DOCKER_CONFIG: &str = "~/.docker/config.json";

/// Settings resolved once at startup, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Registry base URL
    pub url: String,
    /// Docker config file holding registry credentials
    pub docker_config: PathBuf,
}

impl AppConfig {
    /// Load configuration from the process environment and the default
    /// configuration file.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let file = args.config.clone().or_else(default_config_file);
        Self::load_from(file.as_deref(), args, std::env::vars().collect())
    }

    /// Layer, lowest first: defaults, config file, `DREG_*` variables,
    /// `REGISTRY`, command-line flags.
    pub fn load_from(
        file: Option<&Path>,
        args: &GlobalArgs,
        env: HashMap<String, String>,
    ) -> Result<Self> {
        let registry_env = env.get("REGISTRY").filter(|v| !v.is_empty()).cloned();

        let mut builder = Config::builder()
            .set_default("url", DEFAULT_URL)?
            .set_default("docker_config", DEFAULT_DOCKER_CONFIG)?;

        if let Some(file) = file {
            // An explicitly requested file has to exist
            builder = builder.add_source(File::from(file).required(args.config.is_some()));
        }

        let config = builder
            .add_source(Environment::with_prefix("DREG").source(Some(env)))
            .set_override_option("url", registry_env)?
            .set_override_option("url", args.url.clone())?
            .set_override_option(
                "docker_config",
                args.docker_config
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()?;

        let mut app: AppConfig = config.try_deserialize()?;
        app.docker_config = expand_home(&app.docker_config);
        Ok(app)
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dreg").join("config.toml"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
