use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use binbuddy_core::model::EntryConfig;
use binbuddy_provider_blacktown::Endpoints;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "BINBUDDY_CONFIG";
const SEARCH_URL_ENV: &str = "BINBUDDY_SEARCH_URL";
const DATES_URL_ENV: &str = "BINBUDDY_DATES_URL";
const LOG_FILE: &str = "binbuddy.log";

/// Persists the selected address between runs.
pub(crate) struct EntryStore {
    path: PathBuf,
}

impl EntryStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `$BINBUDDY_CONFIG`, or `<config dir>/binbuddy/entry.json`.
    pub(crate) fn from_env() -> Result<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Ok(Self::new(PathBuf::from(path)));
        }
        let dir = dirs::config_dir().context("No config directory for this platform")?;
        Ok(Self::new(dir.join("binbuddy").join("entry.json")))
    }

    pub(crate) fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub(crate) fn load(&self) -> Result<Option<EntryConfig>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Reading {}", self.path.display()));
            }
        };
        let entry = serde_json::from_str(&raw)
            .with_context(|| format!("Parsing {}", self.path.display()))?;
        Ok(Some(entry))
    }

    pub(crate) fn save(&self, entry: &EntryConfig) -> Result<()> {
        fs::create_dir_all(self.dir())
            .with_context(|| format!("Creating {}", self.dir().display()))?;
        let raw = serde_json::to_string_pretty(entry)?;
        fs::write(&self.path, raw).with_context(|| format!("Writing {}", self.path.display()))
    }

    pub(crate) fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => {
                Err(err).with_context(|| format!("Removing {}", self.path.display()))
            }
            _ => Ok(()),
        }
    }
}

/// Council endpoints, overridable through the environment.
pub(crate) fn endpoints_from_env() -> Endpoints {
    let defaults = Endpoints::default();
    Endpoints {
        search_url: env::var(SEARCH_URL_ENV).unwrap_or(defaults.search_url),
        dates_url: env::var(DATES_URL_ENV).unwrap_or(defaults.dates_url),
    }
}

/// Log to a file next to the entry; the terminal belongs to the UI.
pub(crate) fn init_logging(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Creating {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Opening {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}
