use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;

/// Write-then-rename wrapper so readers never see a half-written file.
pub(crate) struct PendingWrite {
    target: PathBuf,
    tmp: Option<NamedTempFile>,
}

impl PendingWrite {
    /// Open a temp file next to `target`. Refuses to clobber an existing
    /// file unless `force` is set.
    pub(crate) fn open(target: &Path, force: bool) -> Result<Self> {
        if target == Path::new("-") { bail!("stdout is not supported; provide a real file path.") }
        let parent = target.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("[io::write] create dir {}", parent.display()))?;
        if !force && target.exists() {
            bail!("Refusing to overwrite existing file: {} (use --force)", target.display());
        }
        let tmp = NamedTempFile::new_in(parent).context("[io::write] create temp file")?;
        Ok(Self { target: target.to_path_buf(), tmp: Some(tmp) })
    }

    fn file(&mut self) -> io::Result<&mut NamedTempFile> {
        self.tmp.as_mut().ok_or_else(|| io::Error::other("write already finalized"))
    }

    /// Flush, fsync and move the temp file into place.
    pub(crate) fn finalize(mut self) -> Result<()> {
        let Some(mut tmp) = self.tmp.take() else { bail!("write already finalized") };
        tmp.flush().context("[io::write] flush")?;
        tmp.as_file().sync_all().ok(); // best-effort fsync
        tmp.persist(&self.target)
            .with_context(|| format!("[io::write] rename to {}", self.target.display()))?;
        if let Some(dir) = self.target.parent() {
            let _ = File::open(dir).and_then(|f| f.sync_all());
        }
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.file()?.write(buf) }

    fn flush(&mut self) -> io::Result<()> { self.file()?.flush() }
}

/// Atomically write `contents` to `target`.
pub fn write_atomic(target: &Path, contents: &[u8], force: bool) -> Result<()> {
    let mut sink = PendingWrite::open(target, force)?;
    sink.write_all(contents)
        .with_context(|| format!("[io::write] write {}", target.display()))?;
    sink.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_refuses_to_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out/map.svg");
        write_atomic(&target, b"<svg/>", false).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "<svg/>");

        assert!(write_atomic(&target, b"<svg></svg>", false).is_err());
        write_atomic(&target, b"<svg></svg>", true).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "<svg></svg>");
    }

    #[test]
    fn rejects_stdout() {
        assert!(PendingWrite::open(Path::new("-"), true).is_err());
    }

    #[test]
    fn dropped_writes_leave_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("partial.svg");
        let mut sink = PendingWrite::open(&target, false).unwrap();
        sink.write_all(b"<svg").unwrap();
        drop(sink);
        assert!(!target.exists());
    }
}
