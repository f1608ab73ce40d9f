use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

/// A per-request copy of the uploaded audio.
///
/// The backing file is unique and is removed when this value drops,
/// on success and error paths alike.
pub struct StagedAudio {
    file: NamedTempFile,
    bytes: u64,
}

impl StagedAudio {
    /// Stage a copy of an audio file, keeping its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::File::open(path)
            .with_context(|| format!("Failed to open audio file: {:?}", path))?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("wav");
        Self::from_reader(source, extension)
    }

    /// Stage audio read from any source (e.g. stdin)
    pub fn from_reader(mut reader: impl Read, extension: &str) -> Result<Self> {
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let mut file = tempfile::Builder::new()
            .prefix("minutemind-")
            .suffix(&suffix)
            .tempfile()
            .context("Failed to create temporary audio file")?;

        let bytes = std::io::copy(&mut reader, &mut file).context("Failed to stage audio")?;
        if bytes == 0 {
            anyhow::bail!("Audio input is empty");
        }
        file.flush().context("Failed to flush staged audio")?;

        debug!("Staged {} bytes of audio at {:?}", bytes, file.path());
        Ok(Self { file, bytes })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> u64 {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }
}
