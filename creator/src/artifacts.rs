use agent::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DOCUMENT_FILE: &str = "agent.yaml";
pub const RESULT_FILE: &str = "result.md";

/// Writes the submitted document, and the output when there is one, into
/// `dir` for download.
pub fn save(dir: &Path, document: &str, output: Option<&str>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = vec![dir.join(DOCUMENT_FILE)];
    fs::write(&written[0], document)?;

    if let Some(output) = output {
        let path = dir.join(RESULT_FILE);
        fs::write(&path, output)?;
        written.push(path);
    }

    for path in &written {
        info!(path = %path.display(), "artifact written");
    }

    Ok(written)
}
