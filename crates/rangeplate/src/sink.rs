//! Output destinations.
//!
//! Rendered text is flushed per unit to an [`OutputSink`], one append per
//! target. Appending matters: a target that appears in several sheets
//! collects every sheet's output in sheet order.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;

/// Where per-target text ends up.
pub trait OutputSink {
    /// Appends text to a target's output.
    fn append(&mut self, target: &str, text: &str) -> Result<()>;

    /// Directory the output lands in, for sinks that write files.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Writes each target to `<dir>/<target>.<ext>` in append mode.
#[derive(Debug, Clone)]
pub struct FolderSink {
    dir: PathBuf,
    extension: String,
}

impl FolderSink {
    /// Uses an existing or new directory as is.
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            extension: extension.into(),
        })
    }

    /// Creates `<parent>/<prefix>_<YYYYmmdd-HHMMSS>` from the local clock.
    pub fn timestamped(parent: &Path, prefix: &str, extension: impl Into<String>) -> Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let sink = Self::new(parent.join(format!("{}_{}", prefix, stamp)), extension)?;
        info!("output folder created: {}", sink.dir.display());
        Ok(sink)
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a target is written to.
    pub fn path_for(&self, target: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", target, self.extension))
    }
}

impl OutputSink for FolderSink {
    fn append(&mut self, target: &str, text: &str) -> Result<()> {
        let path = self.path_for(target);
        debug!("appending {} bytes to {}", text.len(), path.display());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}

/// Keeps every target's text in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    outputs: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written to a target so far.
    pub fn get(&self, target: &str) -> Option<&str> {
        self.outputs.get(target).map(String::as_str)
    }

    /// Targets written so far.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.outputs
    }
}

impl OutputSink for MemorySink {
    fn append(&mut self, target: &str, text: &str) -> Result<()> {
        self.outputs.entry(target.to_string()).or_default().push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_sink_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = FolderSink::new(tmp.path().join("out"), "cfg").unwrap();
        sink.append("leaf1", "a\n").unwrap();
        sink.append("leaf1", "b\n").unwrap();
        sink.append("leaf2", "c\n").unwrap();

        let text = fs::read_to_string(sink.path_for("leaf1")).unwrap();
        assert_eq!(text, "a\nb\n");
        assert!(tmp.path().join("out/leaf2.cfg").is_file());
    }

    #[test]
    fn test_timestamped_folder_name() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FolderSink::timestamped(tmp.path(), "OUTPUTS_lab", "txt").unwrap();
        let name = sink.dir().file_name().unwrap().to_string_lossy().into_owned();
        let stamp = name.strip_prefix("OUTPUTS_lab_").unwrap();
        assert_eq!(stamp.len(), "20240101-120000".len());
        assert_eq!(stamp.as_bytes()[8], b'-');
        assert!(sink.dir().is_dir());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.append("b", "1").unwrap();
        sink.append("a", "2").unwrap();
        sink.append("b", "3").unwrap();
        assert_eq!(sink.get("b"), Some("13"));
        assert_eq!(sink.targets().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
