//! Score storage backends.
//!
//! Entries are append-only. Both backends keep a score-descending index so
//! top-N and rank queries do not sort the whole collection.

use super::types::ScoreEntry;
use crate::error::ScoreError;
use directories::ProjectDirs;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// "MRSCORE1" in ASCII.
pub const SCORE_FILE_MAGIC: u64 = 0x4D52_5343_4F52_4531;

/// Magic + length prefix + SHA-256 trailer.
const SCORE_FILE_OVERHEAD: u64 = 8 + 4 + 32;

/// Persistence seam for the score service.
pub trait ScoreStore: Send {
    /// Append an entry. On error nothing is stored.
    fn insert(&mut self, entry: ScoreEntry) -> Result<(), ScoreError>;

    /// Number of entries with a strictly greater score.
    fn count_above(&self, score: u32) -> Result<u64, ScoreError>;

    /// Highest scores first; equal scores in insertion order.
    fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, ScoreError>;

    /// Highest-scoring entry whose name matches exactly.
    fn best_for(&self, name: &str) -> Result<Option<ScoreEntry>, ScoreError>;

    fn clear(&mut self) -> Result<(), ScoreError>;

    fn len(&self) -> Result<usize, ScoreError>;

    fn is_empty(&self) -> Result<bool, ScoreError> {
        Ok(self.len()? == 0)
    }
}

/// Volatile store, also the in-memory half of [`FileStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<ScoreEntry>,
    /// (score descending, insertion index)
    by_score: BTreeSet<(Reverse<u32>, usize)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ScoreEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.push(entry);
        }
        store
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    fn push(&mut self, entry: ScoreEntry) {
        self.by_score.insert((Reverse(entry.score), self.entries.len()));
        self.entries.push(entry);
    }

    fn ranked(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.by_score.iter().map(move |&(_, idx)| &self.entries[idx])
    }
}

impl ScoreStore for MemoryStore {
    fn insert(&mut self, entry: ScoreEntry) -> Result<(), ScoreError> {
        self.push(entry);
        Ok(())
    }

    fn count_above(&self, score: u32) -> Result<u64, ScoreError> {
        Ok(self.by_score.range(..(Reverse(score), 0)).count() as u64)
    }

    fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, ScoreError> {
        Ok(self.ranked().take(limit).cloned().collect())
    }

    fn best_for(&self, name: &str) -> Result<Option<ScoreEntry>, ScoreError> {
        Ok(self.ranked().find(|e| e.name == name).cloned())
    }

    fn clear(&mut self) -> Result<(), ScoreError> {
        self.entries.clear();
        self.by_score.clear();
        Ok(())
    }

    fn len(&self) -> Result<usize, ScoreError> {
        Ok(self.entries.len())
    }
}

/// Store persisted to a single checksummed file, rewritten after every change.
///
/// File format:
/// - Magic (8 bytes)
/// - Payload length (4 bytes)
/// - bincode-encoded `Vec<ScoreEntry>` (variable length)
/// - SHA256 over magic + length + payload (32 bytes)
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ScoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let memory = if path.exists() {
            MemoryStore::from_entries(read_score_file(&path)?)
        } else {
            MemoryStore::new()
        };

        log::info!(
            "Opened score file {} ({} entries)",
            path.display(),
            memory.entries().len()
        );
        Ok(Self { path, memory })
    }

    /// Platform data directory location, e.g. `~/.local/share/music-runner/scores.dat`.
    pub fn default_path() -> io::Result<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "music-runner").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
        })?;
        Ok(project_dirs.data_dir().join("scores.dat"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

}

impl ScoreStore for FileStore {
    /// The file is replaced first; memory only changes once the rename landed.
    fn insert(&mut self, entry: ScoreEntry) -> Result<(), ScoreError> {
        let next: Vec<&ScoreEntry> = self
            .memory
            .entries()
            .iter()
            .chain(std::iter::once(&entry))
            .collect();
        write_entries(&self.path, &next)?;
        self.memory.push(entry);
        Ok(())
    }

    fn count_above(&self, score: u32) -> Result<u64, ScoreError> {
        self.memory.count_above(score)
    }

    fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, ScoreError> {
        self.memory.top(limit)
    }

    fn best_for(&self, name: &str) -> Result<Option<ScoreEntry>, ScoreError> {
        self.memory.best_for(name)
    }

    fn clear(&mut self) -> Result<(), ScoreError> {
        write_score_file(&self.path, &[])?;
        self.memory.clear()
    }

    fn len(&self) -> Result<usize, ScoreError> {
        self.memory.len()
    }
}

/// Serialize entries and replace the file via a temp file + rename.
pub fn write_score_file(path: &Path, entries: &[ScoreEntry]) -> Result<(), ScoreError> {
    write_entries(path, entries)
}

/// `Vec<&ScoreEntry>` encodes exactly like `Vec<ScoreEntry>`.
fn write_entries<T: Serialize + ?Sized>(path: &Path, entries: &T) -> Result<(), ScoreError> {
    let data = bincode::serialize(entries)?;
    let data_len = u32::try_from(data.len())
        .map_err(|_| ScoreError::Storage("score file too large".to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(SCORE_FILE_MAGIC.to_le_bytes());
    hasher.update(data_len.to_le_bytes());
    hasher.update(&data);
    let checksum = hasher.finalize();

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&SCORE_FILE_MAGIC.to_le_bytes())?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&data)?;
        file.write_all(&checksum)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read and verify a score file.
///
/// Fails if the magic is wrong, the checksum does not match or the payload
/// cannot be decoded.
pub fn read_score_file(path: &Path) -> Result<Vec<ScoreEntry>, ScoreError> {
    let mut file = fs::File::open(path)?;
    let file_len = file.metadata()?.len();

    let mut magic_bytes = [0u8; 8];
    file.read_exact(&mut magic_bytes)?;
    let magic = u64::from_le_bytes(magic_bytes);
    if magic != SCORE_FILE_MAGIC {
        return Err(ScoreError::Storage(format!(
            "Invalid score file: expected magic 0x{:016X}, got 0x{:016X}",
            SCORE_FILE_MAGIC, magic
        )));
    }

    let mut length_bytes = [0u8; 4];
    file.read_exact(&mut length_bytes)?;
    let data_len = u32::from_le_bytes(length_bytes);
    if u64::from(data_len) + SCORE_FILE_OVERHEAD != file_len {
        return Err(ScoreError::Storage(format!(
            "Invalid score file: header claims {} payload bytes in a {} byte file",
            data_len, file_len
        )));
    }

    let mut data = vec![0u8; data_len as usize];
    file.read_exact(&mut data)?;

    let mut stored_checksum = [0u8; 32];
    file.read_exact(&mut stored_checksum)?;

    let mut hasher = Sha256::new();
    hasher.update(magic_bytes);
    hasher.update(length_bytes);
    hasher.update(&data);
    if stored_checksum != hasher.finalize().as_slice() {
        return Err(ScoreError::Storage(
            "Score file checksum verification failed".to_string(),
        ));
    }

    Ok(bincode::deserialize(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("music-runner-{}-{}.dat", tag, uuid::Uuid::new_v4()))
    }

    fn entry(name: &str, score: u32) -> ScoreEntry {
        ScoreEntry::new(name.to_string(), score)
    }

    #[test]
    fn test_count_above_is_strict() {
        let mut store = MemoryStore::new();
        for s in [1000, 2000, 2000, 3000] {
            store.insert(entry("p", s)).unwrap();
        }
        assert_eq!(store.count_above(2000).unwrap(), 1);
        assert_eq!(store.count_above(1500).unwrap(), 3);
        assert_eq!(store.count_above(3000).unwrap(), 0);
        assert_eq!(store.count_above(0).unwrap(), 4);
    }

    #[test]
    fn test_top_orders_ties_by_insertion() {
        let mut store = MemoryStore::new();
        store.insert(entry("first", 500)).unwrap();
        store.insert(entry("high", 900)).unwrap();
        store.insert(entry("second", 500)).unwrap();

        let top = store.top(10).unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["high", "first", "second"]);
        assert_eq!(store.top(1).unwrap().len(), 1);
    }

    #[test]
    fn test_best_for_exact_name() {
        let mut store = MemoryStore::new();
        store.insert(entry("Ada", 100)).unwrap();
        store.insert(entry("Ada", 300)).unwrap();
        store.insert(entry("ada", 900)).unwrap();

        assert_eq!(store.best_for("Ada").unwrap().unwrap().score, 300);
        assert!(store.best_for("Grace").unwrap().is_none());
    }

    #[test]
    fn test_clear() {
        let mut store = MemoryStore::new();
        store.insert(entry("Ada", 100)).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
        assert!(store.top(10).unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let path = temp_file("reopen");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.insert(entry("Ada", 100)).unwrap();
            store.insert(entry("Grace", 200)).unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.top(1).unwrap()[0].name, "Grace");

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_store_clear_persists() {
        let path = temp_file("clear");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.insert(entry("Ada", 100)).unwrap();
            store.clear().unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert!(store.is_empty().unwrap());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupted_file_rejected() {
        let path = temp_file("corrupt");
        write_score_file(&path, &[entry("Ada", 100)]).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        assert!(matches!(read_score_file(&path), Err(ScoreError::Storage(_))));
        assert!(FileStore::open(&path).is_err());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_failed_write_leaves_store_untouched() {
        let path = temp_file("failed-write");
        let mut store = FileStore::open(&path).unwrap();
        store.insert(entry("Ada", 100)).unwrap();
        let before = fs::read(&path).unwrap();

        // A directory where the temp file goes makes File::create fail
        let tmp_path = path.with_extension("tmp");
        fs::create_dir(&tmp_path).unwrap();
        assert!(matches!(
            store.insert(entry("Grace", 900)),
            Err(ScoreError::Storage(_))
        ));
        assert!(store.clear().is_err());

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.top(10).unwrap()[0].name, "Ada");
        assert_eq!(store.count_above(0).unwrap(), 1);
        assert_eq!(fs::read(&path).unwrap(), before);

        fs::remove_dir(&tmp_path).unwrap();
        store.insert(entry("Grace", 900)).unwrap();
        assert_eq!(store.top(1).unwrap()[0].name, "Grace");
        assert_eq!(FileStore::open(&path).unwrap().len().unwrap(), 2);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_oversized_length_header_rejected() {
        let path = temp_file("length");
        write_score_file(&path, &[entry("Ada", 100)]).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        fs::write(&path, bytes).unwrap();

        assert!(matches!(read_score_file(&path), Err(ScoreError::Storage(_))));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_wrong_magic_rejected() {
        let path = temp_file("magic");
        fs::write(&path, [0u8; 64]).unwrap();
        assert!(matches!(read_score_file(&path), Err(ScoreError::Storage(_))));
        fs::remove_file(&path).ok();
    }
}
