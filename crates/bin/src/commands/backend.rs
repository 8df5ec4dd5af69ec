//! Backend command - shows which storage backend would be selected.

use crate::backend::{open_storage, storage_config};
use crate::cli::StorageArgs;
use crate::output::OutputFormat;

/// Run the backend command
pub async fn run(
    storage: &StorageArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = storage_config(storage);
    let platform = config.platform();
    let adapter = open_storage(storage).await;
    let data_dir = config
        .data_dir
        .as_ref()
        .map(|d| d.display().to_string());

    match format {
        OutputFormat::Human => {
            println!("Platform:    {platform}");
            println!("Backend:     {}", adapter.name());
            println!("Data dir:    {}", data_dir.as_deref().unwrap_or("-"));
            println!("Service:     {}", config.service_name);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "platform": platform.to_string(),
                "backend": adapter.name(),
                "data_dir": data_dir,
                "service": config.service_name,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
