//! Generated file set management
//!
//! Materializes the files one experiment point reads: a uniquely named
//! directory holding `file_count` files of `file_size` random bytes,
//! sharded into numbered subdirectories so no single directory grows
//! past the shard size. Every created path is tracked in creation order,
//! so cleanup can remove them in reverse even after a partial failure.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::{BenchError, Result, TEMP_DIR_PREFIX};

/// A generated, sharded set of random-content files
pub struct FileSet {
    root: PathBuf,
    /// Every path created, in creation order (dirs interleaved with files)
    created: Vec<PathBuf>,
    /// The data files only, in read order
    files: Vec<PathBuf>,
}

impl FileSet {
    /// Generate `file_count` files of `file_size` random bytes under a
    /// fresh directory inside `parent`.
    ///
    /// On any failure, whatever was created so far is deleted best-effort
    /// before the error is returned; a failed generation leaves no stray
    /// paths behind.
    pub fn generate(
        parent: &Path,
        file_count: usize,
        file_size: u64,
        shard_size: usize,
    ) -> Result<Self> {
        if file_count == 0 || shard_size == 0 {
            return Err(BenchError::Generation(
                "File count and shard size must be greater than 0".to_string(),
            ));
        }

        let mut rng = SmallRng::from_entropy();
        let root = create_unique_root(parent, &mut rng)?;
        let mut set = Self {
            created: vec![root.clone()],
            files: Vec::with_capacity(file_count),
            root,
        };

        if let Err(e) = set.populate(file_count, file_size, shard_size, &mut rng) {
            set.cleanup();
            return Err(e);
        }

        Ok(set)
    }

    fn populate(
        &mut self,
        file_count: usize,
        file_size: u64,
        shard_size: usize,
        rng: &mut SmallRng,
    ) -> Result<()> {
        let mut content = vec![0u8; file_size as usize];
        let mut shard = self.root.clone();

        for i in 0..file_count {
            if i % shard_size == 0 {
                shard = self.root.join((i / shard_size).to_string());
                fs::create_dir(&shard).map_err(|e| {
                    BenchError::Generation(format!(
                        "Could not create dir {}: {}",
                        shard.display(),
                        e
                    ))
                })?;
                self.created.push(shard.clone());
            }

            rng.fill_bytes(&mut content);
            let path = shard.join(i.to_string());
            let mut file = File::create(&path).map_err(|e| {
                BenchError::Generation(format!("Could not create file {}: {}", path.display(), e))
            })?;
            // Track before writing so a failed write is still cleaned up
            self.created.push(path.clone());
            file.write_all(&content).map_err(|e| {
                BenchError::Generation(format!("Could not write file {}: {}", path.display(), e))
            })?;
            self.files.push(path);
        }

        Ok(())
    }

    /// The data files in read order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// The set's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of data files in the set
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the set holds no data files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Delete every created path in reverse creation order, best-effort.
    ///
    /// Returns the number of paths that could not be deleted; each miss is
    /// reported on stderr but never aborts the caller. Safe to call again
    /// on an already-cleaned set (every path then counts as a miss).
    pub fn cleanup(&self) -> usize {
        let mut failures = 0;
        for path in self.created.iter().rev() {
            if let Err(e) = remove_path(path) {
                eprintln!("Could not delete {}: {}", path.display(), e);
                failures += 1;
            }
        }
        failures
    }
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

fn create_unique_root(parent: &Path, rng: &mut SmallRng) -> Result<PathBuf> {
    // A few tries absorb collisions with leftovers from earlier runs
    for _ in 0..16 {
        let root = parent.join(format!("{}{:08x}", TEMP_DIR_PREFIX, rng.next_u32()));
        match fs::create_dir(&root) {
            Ok(()) => return Ok(root),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(BenchError::Generation(format!(
                    "Could not create dir {}: {}",
                    root.display(),
                    e
                )))
            }
        }
    }
    Err(BenchError::Generation(format!(
        "Could not find a free benchmark directory name under {}",
        parent.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generates_exact_count_and_sizes() {
        let dir = tempdir().unwrap();
        let set = FileSet::generate(dir.path(), 10, 1234, 1000).unwrap();

        assert_eq!(set.len(), 10);
        for path in set.files() {
            assert_eq!(fs::metadata(path).unwrap().len(), 1234);
        }

        set.cleanup();
    }

    #[test]
    fn test_shards_at_boundary() {
        let dir = tempdir().unwrap();
        let set = FileSet::generate(dir.path(), 10, 8, 4).unwrap();

        // 10 files at 4 per shard: subdirectories 0, 1, 2
        let shards: Vec<String> = fs::read_dir(set.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(shards.len(), 3);
        for name in ["0", "1", "2"] {
            assert!(shards.iter().any(|s| s == name), "missing shard {}", name);
        }

        // The last shard holds the remainder
        assert_eq!(fs::read_dir(set.root().join("2")).unwrap().count(), 2);

        set.cleanup();
    }

    #[test]
    fn test_cleanup_removes_everything() {
        let dir = tempdir().unwrap();
        let set = FileSet::generate(dir.path(), 25, 100, 10).unwrap();
        let root = set.root().to_path_buf();
        assert!(root.exists());

        assert_eq!(set.cleanup(), 0);
        assert!(!root.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_double_cleanup_reports_but_does_not_panic() {
        let dir = tempdir().unwrap();
        let set = FileSet::generate(dir.path(), 3, 10, 1000).unwrap();

        assert_eq!(set.cleanup(), 0);
        // Second pass finds nothing to delete; every path is a reported miss
        assert!(set.cleanup() > 0);
    }

    #[test]
    fn test_sets_get_distinct_roots() {
        let dir = tempdir().unwrap();
        let a = FileSet::generate(dir.path(), 1, 10, 1000).unwrap();
        let b = FileSet::generate(dir.path(), 1, 10, 1000).unwrap();

        assert_ne!(a.root(), b.root());

        a.cleanup();
        b.cleanup();
    }

    #[test]
    fn test_zero_length_files_allowed() {
        let dir = tempdir().unwrap();
        let set = FileSet::generate(dir.path(), 5, 0, 1000).unwrap();
        for path in set.files() {
            assert_eq!(fs::metadata(path).unwrap().len(), 0);
        }
        set.cleanup();
    }

    #[test]
    fn test_rejects_zero_count() {
        let dir = tempdir().unwrap();
        assert!(FileSet::generate(dir.path(), 0, 10, 1000).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
