//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use grocer_commerce::cart::CartStore;
use grocer_commerce::UserId;
use grocer_store::{DirKv, MemoryStore};

use crate::config::{GrocerConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: GrocerConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Config file in use, if any.
    pub config_path: Option<PathBuf>,
    /// Signed-in customer, from `--user`.
    pub user: Option<UserId>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, user: Option<String>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = resolve(&cwd, Path::new(path));
                (GrocerConfig::load(&path)?, Some(path))
            }
            // Try to find config in current directory or parent directories
            None => match Self::find_config(&cwd) {
                Some(path) => (GrocerConfig::load(&path)?, Some(path)),
                None => (GrocerConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            output,
            cwd,
            config_path,
            user: user.map(UserId::new),
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Directory that relative storage paths are resolved against: the one
    /// holding the config file, or the working directory.
    pub fn project_dir(&self) -> &Path {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(self.cwd.as_path())
    }

    /// Get the data directory.
    pub fn data_dir(&self) -> PathBuf {
        resolve(self.project_dir(), &self.config.store.data_dir)
    }

    /// Open the document database snapshot.
    pub async fn open_store(&self) -> Result<Arc<MemoryStore>> {
        let path = self.data_dir().join(&self.config.store.database_file);
        self.output.debug(&format!("Database: {}", path.display()));
        let store = MemoryStore::open(&path)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Ok(Arc::new(store))
    }

    /// Open this device's cart.
    pub fn open_cart(&self) -> Result<CartStore<DirKv>> {
        let dir = self.data_dir().join("local");
        let storage = DirKv::open(&dir)
            .with_context(|| format!("Failed to open local storage: {}", dir.display()))?;
        Ok(CartStore::open(
            storage,
            self.config.currency()?,
            self.config.cart.max_quantity_per_item,
        ))
    }

    /// The signed-in customer, required by customer-facing commands.
    pub fn require_user(&self) -> Result<&UserId> {
        match &self.user {
            Some(user) => Ok(user),
            None => bail!("Not signed in. Pass --user <id>."),
        }
    }
}

/// Resolve a path relative to `base`.
fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
