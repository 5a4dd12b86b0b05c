//! Run-scoped temporary files.

mod chart;

pub use chart::SpiderChart;

use std::path::{Path, PathBuf};

/// Owns the temporary files of one run and deletes them when dropped.
///
/// File names carry the run id, so concurrent runs sharing a directory never
/// collide.
#[derive(Debug)]
pub struct TempArtifacts {
    dir: PathBuf,
    run_id: String,
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn new(dir: impl Into<PathBuf>, run_id: &str) -> Self {
        Self {
            dir: dir.into(),
            run_id: run_id.to_string(),
            paths: Vec::new(),
        }
    }

    /// `<dir>/<name>_<run_id>.<ext>`
    pub fn path_for(&self, name: &str, ext: &str) -> PathBuf {
        let name: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}_{}.{ext}", self.run_id))
    }

    pub fn write(&mut self, name: &str, ext: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name, ext);
        self.paths.push(path.clone());
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Delete every file now.
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(target: "dossier.artifacts", path = %path.display(), "removed")
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    target: "dossier.artifacts",
                    path = %path.display(),
                    error = %e,
                    "failed to remove temporary file"
                ),
            }
        }
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let mut artifacts = TempArtifacts::new(dir.path(), "run-1");
            let path = artifacts.write("swot chart", "svg", b"<svg/>").unwrap();
            assert!(path.exists());
            assert!(path.ends_with("swot_chart_run-1.svg"));
            path
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_release_and_distinct_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = TempArtifacts::new(dir.path(), "a");
        let mut b = TempArtifacts::new(dir.path(), "b");
        let pa = a.write("swot", "svg", b"a").unwrap();
        let pb = b.write("swot", "svg", b"b").unwrap();
        assert_ne!(pa, pb);

        a.release();
        assert!(!pa.exists());
        assert_eq!(std::fs::read(&pb).unwrap(), b"b");
    }
}
