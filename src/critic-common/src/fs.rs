//! Filesystem helpers.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Write `content` to `path` atomically.
///
/// The data goes to a uniquely named temp file in the same directory first
/// and is then renamed over the target, so readers see either the old or the
/// new file and concurrent writers never share a temp file. Missing parent
/// directories are created.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let prefix = format!(
        ".{}.tmp.",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("file")
    );
    let mut temp_file = tempfile::Builder::new()
        .prefix(&prefix)
        .tempfile_in(parent)?;
    temp_file.write_all(content)?;
    temp_file.as_file().sync_all()?;

    // A failed persist hands the temp file back; dropping it removes it.
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_creates_and_replaces() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("sub").join("data.json");

        atomic_write(&target, b"first").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "first");

        atomic_write(&target, b"second").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");

        let leftovers: Vec<_> = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_concurrent_writers_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("shared.json");
        let barrier = std::sync::Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let target = target.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    (0..20)
                        .map(|round| {
                            let content = format!("writer {i} round {round}");
                            atomic_write(&target, content.as_bytes())
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for result in handle.join().unwrap() {
                result.unwrap();
            }
        }

        let content = fs::read_to_string(&target).unwrap();
        assert!(content.starts_with("writer "));
        let leftovers = fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
