use crate::error::ExecError;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Writes `lines` to `path`, each terminated by a newline.
///
/// The file is created if missing. Parent directories are not.
pub async fn write_lines<S: AsRef<str>>(
    path: &Path,
    lines: &[S],
    mode: WriteMode,
) -> Result<(), ExecError> {
    let map_err = |e| ExecError::Write {
        path: path.to_path_buf(),
        source: e,
    };

    let mut opts = OpenOptions::new();
    opts.create(true);
    match mode {
        WriteMode::Truncate => opts.write(true).truncate(true),
        WriteMode::Append => opts.append(true),
    };

    let mut file = opts.open(path).await.map_err(map_err)?;

    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }

    file.write_all(content.as_bytes()).await.map_err(map_err)?;
    file.flush().await.map_err(map_err)?;

    tracing::debug!(path = ?path, lines = lines.len(), ?mode, "Wrote config lines");
    Ok(())
}
