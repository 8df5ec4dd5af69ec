//! Account commands: list, active, remove and clear.

use biosession::session::AccountSummary;

use crate::backend::open_lifecycle;
use crate::cli::{ClearArgs, RemoveArgs, StorageArgs};
use crate::output::{OutputFormat, format_time, print_table};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn account_json(account: &AccountSummary) -> serde_json::Value {
    serde_json::json!({
        "user_id": account.user_id,
        "email": account.email,
        "last_used": format_time(account.last_used_utc()),
        "expires_at": format_time(account.expires_at_utc()),
    })
}

/// Run the `list` command
pub async fn list(storage: &StorageArgs, format: OutputFormat) -> CmdResult {
    let lifecycle = open_lifecycle(storage).await;
    let accounts = lifecycle.list_accounts().await;

    match format {
        OutputFormat::Human => {
            if accounts.is_empty() {
                println!("No cached accounts.");
                return Ok(());
            }
            let active = lifecycle.records().active_user().await.ok().flatten();
            let rows: Vec<Vec<String>> = accounts
                .iter()
                .map(|a| {
                    let marker = if active.as_deref() == Some(a.user_id.as_str()) {
                        "*"
                    } else {
                        ""
                    };
                    vec![
                        marker.to_string(),
                        a.user_id.clone(),
                        a.email.clone(),
                        format_time(a.last_used_utc()),
                        format_time(a.expires_at_utc()),
                    ]
                })
                .collect();
            print_table(&["", "USER ID", "EMAIL", "LAST USED", "EXPIRES"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = accounts.iter().map(account_json).collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}

/// Run the `active` command
///
/// Reading the active session applies the usual rules, so an expired record
/// is deleted and a legacy record is migrated.
pub async fn active(storage: &StorageArgs, format: OutputFormat) -> CmdResult {
    let lifecycle = open_lifecycle(storage).await;
    let record = lifecycle.get_active().await;

    match (format, record) {
        (OutputFormat::Human, None) => println!("No active session."),
        (OutputFormat::Human, Some(record)) => {
            println!("User ID:     {}", record.user_id);
            println!("Email:       {}", record.email);
            let last_used = biosession::clock::millis_to_utc(record.last_used);
            println!("Last used:   {}", format_time(last_used));
            println!("Expires:     {}", format_time(record.expires_at_utc()));
            if let Some(snapshot) = &record.profile {
                let profile = &snapshot.profile;
                println!("Role:        {}", profile.role.as_deref().unwrap_or("-"));
                println!("Org:         {}", profile.organization_id.as_deref().unwrap_or("-"));
                println!("Seat:        {}", profile.seat_status.as_deref().unwrap_or("-"));
            }
        }
        (OutputFormat::Json, record) => {
            let value = record.map(|r| account_json(&r.summary()));
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}

/// Run the `remove` command
pub async fn remove(storage: &StorageArgs, args: &RemoveArgs, format: OutputFormat) -> CmdResult {
    let lifecycle = open_lifecycle(storage).await;
    lifecycle.remove(&args.user_id).await;

    match format {
        OutputFormat::Human => println!("Removed {}", args.user_id),
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "removed": args.user_id }));
        }
    }
    Ok(())
}

/// Run the `clear` command
pub async fn clear(storage: &StorageArgs, args: &ClearArgs, format: OutputFormat) -> CmdResult {
    if !args.yes {
        return Err("refusing to clear every session without --yes".into());
    }

    let lifecycle = open_lifecycle(storage).await;
    let count = lifecycle.list_accounts().await.len();
    lifecycle.clear_all().await;

    match format {
        OutputFormat::Human => println!("Cleared {count} account(s)"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "cleared": count })),
    }
    Ok(())
}
