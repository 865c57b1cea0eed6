//! Raw data ingestion command

use std::path::Path;

use anyhow::{Context, Result};
use monitor_lib::{ObjectStore, StorageConfig, TokenProvider};

use crate::output::{print_info, print_success, OutputFormat};

/// Upload one local file into the configured bucket.
pub async fn upload_file(file: &Path, object_name: &str, format: OutputFormat) -> Result<()> {
    let config = StorageConfig::load()?;
    let store = ObjectStore::new(&config)?;
    let tokens = TokenProvider::new()?;

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if matches!(format, OutputFormat::Table) {
        print_info(&format!(
            "Uploading {} ({} bytes) to bucket '{}'",
            file.display(),
            bytes.len(),
            config.bucket
        ));
    }

    let token = tokens.token(&config.api_key_id).await?;
    store.put_object(object_name, bytes, &token).await?;

    match format {
        OutputFormat::Json => {
            let document = serde_json::json!({
                "bucket": config.bucket,
                "object": object_name,
                "status": "uploaded",
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Table => {
            print_success(&format!(
                "Uploaded '{}' as '{}'",
                file.display(),
                object_name
            ));
        }
    }

    Ok(())
}
