//! Filesystem key directory.

use crate::ports::KeyDirectory;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// A key directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsKeyDirectory {
    root: PathBuf,
}

impl FsKeyDirectory {
    /// Opens `root`, creating it if missing.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        debug!(path = %root.display(), "Opened keystore directory");
        Ok(Self { root })
    }

    /// Directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, name: &str) -> io::Result<PathBuf> {
        // Names are produced by the vault; anything with a separator is foreign.
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid key file name {name:?}"),
            ));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl KeyDirectory for FsKeyDirectory {
    async fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.entry(name)?).await
    }

    async fn write_temp(&self, contents: &[u8]) -> io::Result<String> {
        let name = format!(".tmp-{}", Uuid::new_v4().simple());
        let path = self.entry(&name)?;
        tokio::fs::write(&path, contents).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).await?;
        }
        Ok(name)
    }

    async fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        let target = self.entry(to)?;
        if tokio::fs::try_exists(&target).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{to} already exists"),
            ));
        }
        tokio::fs::rename(self.entry(from)?, target).await
    }

    async fn remove(&self, name: &str) -> io::Result<()> {
        tokio::fs::remove_file(self.entry(name)?).await
    }
}
