use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub path: PathBuf,
    pub bytes: u64
}

/// Fetches `download_url` in one request and saves the whole body as
/// `file_name` inside `target_dir`. Not resumable, not retried.
pub async fn execute(
    client: &reqwest::Client,
    download_url: &str,
    file_name: &str,
    target_dir: &Path
) -> Result<TransferOutcome, CoreError> {
    let local_path = target_dir.join(safe_file_name(file_name)?);

    let response = client
        .get(download_url)
        .send()
        .await
        .map_err(|e| transfer_failed(None, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(transfer_failed(Some(status.as_u16()), format!("HTTP {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transfer_failed(Some(status.as_u16()), e.to_string()))?;

    fs::create_dir_all(target_dir)
        .await
        .map_err(|e| transfer_failed(None, format!("cannot create {}: {e}", target_dir.display())))?;

    write_file(&local_path, &body).await?;

    tracing::info!("Saved {} bytes to {}", body.len(), local_path.display());

    Ok(TransferOutcome {
        path: local_path,
        bytes: body.len() as u64
    })
}

/// Writes to a `.part` sibling and renames it into place, so a failed write
/// never leaves a truncated file under the final name.
async fn write_file(path: &Path, body: &[u8]) -> Result<(), CoreError> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let written = async {
        let mut file = fs::File::create(&part).await?;
        file.write_all(body).await?;
        file.flush().await?;
        drop(file);
        fs::rename(&part, path).await
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&part).await {
            tracing::debug!("Could not remove {}: {}", part.display(), cleanup);
        }
        return Err(transfer_failed(None, format!("cannot write {}: {e}", path.display())));
    }

    Ok(())
}

/// Final path component only, so a name cannot escape the target directory.
fn safe_file_name(file_name: &str) -> Result<&str, CoreError> {
    Path::new(file_name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| transfer_failed(None, format!("invalid file name: {file_name:?}")))
}

fn transfer_failed(status: Option<u16>, reason: String) -> CoreError {
    CoreError::TransferFailed { status, reason }
}
