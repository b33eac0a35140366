use std::{
    ffi::OsString,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::{Error, Result};

/// `<key_dir>/<hostname with dots replaced by underscores>`
pub fn key_path<P: AsRef<Path>>(key_dir: P, hostname: &str) -> PathBuf {
    key_dir.as_ref().join(hostname.replace('.', "_"))
}

pub fn public_key_path<P: AsRef<Path>>(key_file: P) -> PathBuf {
    let mut path = OsString::from(key_file.as_ref().as_os_str());
    path.push(".pub");
    PathBuf::from(path)
}

pub fn ensure_key_dir<P: AsRef<Path>>(key_dir: P) -> Result<()> {
    let key_dir = key_dir.as_ref();
    fs::create_dir_all(key_dir).map_err(|e| Error::io(key_dir, e))
}

/// Deletes both halves of a key pair. Missing files are ignored since
/// ssh-keygen refuses to overwrite without asking.
pub fn remove_key_pair<P: AsRef<Path>>(key_file: P) -> Result<()> {
    let key_file = key_file.as_ref();
    for path in [key_file.to_path_buf(), public_key_path(key_file)] {
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale key"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(path, e)),
        }
    }
    Ok(())
}

pub fn read_public_key<P: AsRef<Path>>(key_file: P) -> Result<String> {
    let path = public_key_path(key_file);
    let key = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    Ok(key.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_key_path() {
        assert_eq!(
            key_path("/home/me/.ssh/keys", "web.example.com"),
            PathBuf::from("/home/me/.ssh/keys/web_example_com")
        );
        assert_eq!(
            public_key_path("/k/web_example_com"),
            PathBuf::from("/k/web_example_com.pub")
        );
    }

    #[test]
    fn test_remove_key_pair() {
        let dir = tempdir().unwrap();
        let key = dir.path().join("a_com");
        fs::write(&key, "private").unwrap();
        fs::write(public_key_path(&key), "public").unwrap();

        remove_key_pair(&key).unwrap();
        assert!(!key.exists());
        assert!(!public_key_path(&key).exists());

        // nothing left to remove
        remove_key_pair(&key).unwrap();
    }

    #[test]
    fn test_read_public_key_trims() {
        let dir = tempdir().unwrap();
        let key = dir.path().join("a_com");
        fs::write(public_key_path(&key), "ssh-ed25519 AAAA key for a.com\n").unwrap();
        assert_eq!(
            read_public_key(&key).unwrap(),
            "ssh-ed25519 AAAA key for a.com"
        );
    }

    #[test]
    fn test_ensure_key_dir_is_recursive() {
        let dir = tempdir().unwrap();
        let keys = dir.path().join(".ssh").join("keys");
        ensure_key_dir(&keys).unwrap();
        ensure_key_dir(&keys).unwrap();
        assert!(keys.is_dir());
    }
}
