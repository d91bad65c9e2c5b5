//! Plain file helpers over `tokio::fs`

use std::io::ErrorKind;
use std::path::Path;

use covid_fhir_core::CovidRecord;

use super::StorageError;

/// Whether `directory/filename` resolves to an existing regular file
pub async fn file_exists(directory: &Path, filename: &str) -> bool {
    tokio::fs::metadata(directory.join(filename))
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Delete the file at `path`; a missing file is not an error
pub async fn remove_if_exists(path: &Path) -> Result<(), StorageError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Serialize `records` as a JSON array to `destination`, replacing its content
pub async fn save_records(records: &[CovidRecord], destination: &Path) -> Result<(), StorageError> {
    let body = serde_json::to_vec(records)?;
    tokio::fs::write(destination, body).await?;
    Ok(())
}
