//! TestWorld pattern for declarative CLI integration test setup.

use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use turnforge_store::StateStore;

/// Isolated environment for driving the `turnforge` binary: a temp
/// directory holding the store file, with helpers to seed and inspect it.
///
/// # Example
/// ```no_run
/// use turnforge_testing::TestWorld;
///
/// let world = TestWorld::new();
/// world.command().args(["init-db"]).assert().success();
/// ```
pub struct TestWorld {
    _temp: TempDir,
    db_path: PathBuf,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir for TestWorld");
        let db_path = temp.path().join("turnforge.db");
        Self {
            _temp: temp,
            db_path,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open the world's store directly for seeding or assertions.
    pub fn store(&self) -> Result<StateStore> {
        Ok(StateStore::open(&self.db_path)?)
    }

    /// A `turnforge` command pre-wired to this world's store file, with
    /// config lookups redirected into the sandbox.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("turnforge").expect("turnforge binary built");
        cmd.arg("--db").arg(&self.db_path);
        cmd.env("XDG_CONFIG_HOME", self._temp.path());
        cmd.env_remove("ANTHROPIC_API_KEY");
        cmd
    }

    /// Seed the minimal game state for a campaign.
    pub fn seed_minimal(&self, campaign_id: &str) -> Result<()> {
        let store = self.store()?;
        crate::setup_minimal_game_state(&store, campaign_id)
    }

    pub fn assert_database_exists(&self) -> bool {
        self.db_path.exists()
    }
}
