use crate::api::DeskApi;
use crate::config::DeskConfig;
use crate::store::FsBackend;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // Keeps the directory alive until the test is done
    pub _temp_dir: TempDir,
    pub backend: FsBackend,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let backend = FsBackend::new(root.clone());
        Self {
            _temp_dir: temp_dir,
            backend,
            root,
        }
    }

    /// Config pinned to UTC so calendar days do not depend on the machine.
    pub fn config(&self) -> DeskConfig {
        DeskConfig {
            data_dir: Some(self.root.clone()),
            utc_offset_minutes: Some(0),
            ..Default::default()
        }
    }

    pub fn api(&self) -> DeskApi<FsBackend> {
        DeskApi::open(self.backend.clone(), self.config()).expect("failed to open api")
    }
}
