//! On-disk persistence of the game collection
//!
//! The whole collection lives in one pretty-printed JSON array
//! (`games.json`). Every save rewrites the full document through a
//! temporary sibling file that is renamed over the original.

use std::fs::{self, DirBuilder, File};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::game::Game;
use crate::logging::log_info;

const GAMES_FILE: &str = "games.json";
const IMAGES_DIR: &str = "images";

pub struct GameStore {
    root: PathBuf,
}

impl GameStore {
    /// Open the store rooted at `root`, creating it and its images directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { root: root.into() };
        create_private_dir(&store.root)?;
        create_private_dir(&store.images_dir())?;
        Ok(store)
    }

    /// Open the store in the per-user data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(crate::front_path!())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self) -> PathBuf {
        self.root.join(GAMES_FILE)
    }

    /// Directory holding downloaded and resized cover art.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Load the collection in display order.
    ///
    /// A missing document is a fresh library, not an error. A document that
    /// fails to decode is reported as `StoreError::Corrupt`.
    pub fn load(&self) -> Result<Vec<Game>, StoreError> {
        let path = self.document_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let games: Option<Vec<Game>> = serde_json::from_slice(&data)
            .map_err(|source| StoreError::Corrupt { path: path.clone(), source })?;
        let games = games.unwrap_or_default();

        log_info(&format!("Loaded {} games from {}", games.len(), path.display()));
        Ok(games)
    }

    /// Replace the stored collection with `games`.
    pub fn save(&self, games: &[Game]) -> Result<(), StoreError> {
        let path = self.document_path();
        let json = serde_json::to_string_pretty(games).map_err(StoreError::Encode)?;

        let tmp_path = self.root.join(format!("{}.tmp", GAMES_FILE));
        write_synced(&tmp_path, json.as_bytes())
            .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;

        if let Err(source) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io { path, source });
        }
        Ok(())
    }
}

fn create_private_dir(path: &Path) -> Result<(), StoreError> {
    DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> Game {
        Game {
            name: name.to_string(),
            exec_path: format!("/games/{}/game.exe", name.to_lowercase()),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("umu-front");
        let store = GameStore::open(&root).unwrap();

        assert!(root.is_dir());
        assert!(store.images_dir().is_dir());
    }

    #[test]
    fn test_missing_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = GameStore::open(dir.path()).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = GameStore::open(dir.path()).unwrap();
        let games = vec![sample("Zeta"), sample("Alpha"), sample("Alpha")];

        store.save(&games).unwrap();
        assert_eq!(store.load().unwrap(), games);
        assert!(!dir.path().join("games.json.tmp").exists());
    }

    #[test]
    fn test_resave_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = GameStore::open(dir.path()).unwrap();
        let mut tf2 = sample("TF2");
        tf2.id = "440".to_string();
        tf2.dll_overrides = "d3d11=n,b".to_string();
        store.save(&[tf2, sample("Portal")]).unwrap();

        let first = fs::read(store.document_path()).unwrap();
        store.save(&store.load().unwrap()).unwrap();
        let second = fs::read(store.document_path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = GameStore::open(dir.path()).unwrap();
        fs::write(store.document_path(), r#"[{"name": "Half"#).unwrap();

        match store.load() {
            Err(StoreError::Corrupt { path, .. }) => assert_eq!(path, store.document_path()),
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = GameStore::open(dir.path()).unwrap();
        fs::write(store.document_path(), r#"{"name": "not a list"}"#).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_null_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = GameStore::open(dir.path()).unwrap();
        fs::write(store.document_path(), "null").unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
