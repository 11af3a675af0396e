use backend::{BackendConfig, DatabaseConfig};
use clap::Parser;
use shared::models::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, GenerationSettings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Character manager and story generator")]
pub struct Cli {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    /// Prebuilt UI to serve at `/`
    #[arg(long, default_value = "dist")]
    pub dist_dir: PathBuf,
    /// Directory for the local JSON character store
    #[arg(long, env = "STORYTELLER_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,
    /// Keep characters in a PostgreSQL table instead of local files
    #[arg(long, conflicts_with = "in_memory")]
    pub database_url: Option<String>,
    /// Keep characters in memory only
    #[arg(long)]
    pub in_memory: bool,
    #[arg(long, env = "STORYTELLER_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,
    #[arg(long, env = "STORYTELLER_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Give up on a story after this many seconds
    #[arg(
        long,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn backend_config(&self) -> BackendConfig {
        let database = if self.in_memory {
            DatabaseConfig::Memory
        } else if let Some(url) = &self.database_url {
            DatabaseConfig::Postgres { url: url.clone() }
        } else {
            DatabaseConfig::Local {
                dir: self.data_dir.clone(),
            }
        };

        let defaults = GenerationSettings::default();
        let generation = GenerationSettings {
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
            model: self.model.clone().unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            timeout_secs: self.timeout_secs,
        };

        BackendConfig {
            database,
            generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_store() {
        let cli = Cli::try_parse_from(["storyteller", "--data-dir", "/tmp/stories"]).unwrap();
        let config = cli.backend_config();
        assert!(matches!(
            config.database,
            DatabaseConfig::Local { ref dir } if dir == &PathBuf::from("/tmp/stories")
        ));
        assert_eq!(config.generation.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.generation.model, GenerationSettings::default().model);
    }

    #[test]
    fn database_url_selects_postgres() {
        let cli = Cli::try_parse_from([
            "storyteller",
            "--database-url",
            "postgres://localhost/stories",
            "--model",
            "gpt-4o-mini",
            "--timeout-secs",
            "10",
        ])
        .unwrap();
        let config = cli.backend_config();
        assert!(matches!(config.database, DatabaseConfig::Postgres { .. }));
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.generation.timeout_secs, 10);
    }

    #[test]
    fn in_memory_conflicts_with_database_url() {
        let parsed = Cli::try_parse_from([
            "storyteller",
            "--in-memory",
            "--database-url",
            "postgres://localhost/stories",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn timeout_must_be_at_least_one_second() {
        let parsed = Cli::try_parse_from(["storyteller", "--timeout-secs", "0"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from(["storyteller", "--timeout-secs", "1"]).unwrap();
        assert_eq!(cli.backend_config().generation.timeout_secs, 1);
    }
}
