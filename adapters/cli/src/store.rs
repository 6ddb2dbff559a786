use std::{fs, path::PathBuf};

use grid_invaders_system_high_score::HighScoreStore;

/// High-score store backed by a plain-text file holding a single integer.
///
/// Storage failures never interrupt play: an unreadable file loads as zero
/// and a failed write is logged and dropped.
#[derive(Debug)]
pub(crate) struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HighScoreStore for FileStore {
    fn load(&mut self) -> u32 {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) => {
                log::debug!(
                    "high-score file {} not read, starting from zero: {error}",
                    self.path.display()
                );
                return 0;
            }
        };
        match contents.trim().parse::<u32>() {
            Ok(value) => value,
            Err(error) => {
                log::warn!(
                    "high-score file {} holds unparsable contents, starting from zero: {error}",
                    self.path.display()
                );
                0
            }
        }
    }

    fn save(&mut self, value: u32) {
        if let Err(error) = fs::write(&self.path, value.to_string()) {
            log::warn!(
                "failed to persist high score {value} to {}: {error}",
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_zero() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileStore::new(dir.path().join("high_score.txt"));

        assert_eq!(store.load(), 0);
    }

    #[test]
    fn saved_value_survives_a_reload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("high_score.txt");

        let mut store = FileStore::new(path.clone());
        store.save(12_500);
        assert_eq!(store.load(), 12_500);

        let mut reopened = FileStore::new(path);
        assert_eq!(reopened.load(), 12_500);
    }

    #[test]
    fn corrupt_contents_load_as_zero() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("high_score.txt");
        fs::write(&path, "not a number").expect("seed file");

        let mut store = FileStore::new(path);
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("high_score.txt");
        fs::write(&path, "  4800\n").expect("seed file");

        let mut store = FileStore::new(path);
        assert_eq!(store.load(), 4800);
    }
}
