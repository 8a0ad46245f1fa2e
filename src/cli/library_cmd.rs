//! Recordings library commands: list, rename, delete, export

use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::warn;

use crate::application::ports::{ConfigStore, RecordingStore, StoreError};
use crate::domain::config::AppConfig;
use crate::domain::library::{filter_entries, sort_entries, RecordingEntry};

use super::args::ListArgs;
use super::presenter::Presenter;

/// JSON view of one recording
#[derive(Debug, Serialize)]
struct EntryView<'a> {
    name: &'a str,
    path: String,
    mime: &'static str,
    size_bytes: u64,
    duration_ms: Option<u64>,
    modified: String,
}

impl<'a> From<&'a RecordingEntry> for EntryView<'a> {
    fn from(entry: &'a RecordingEntry) -> Self {
        Self {
            name: &entry.name,
            path: entry.path.display().to_string(),
            mime: entry.mime.as_str(),
            size_bytes: entry.size_bytes,
            duration_ms: entry.duration.map(|d| d.as_millis()),
            modified: DateTime::<Local>::from(entry.modified).to_rfc3339(),
        }
    }
}

/// List recordings, sorted and filtered. An explicit sort or reverse flag
/// becomes the remembered order.
pub async fn handle_list<C: ConfigStore>(
    args: ListArgs,
    store: &dyn RecordingStore,
    config_store: &C,
    config: &AppConfig,
    presenter: &Presenter,
) -> Result<(), StoreError> {
    let key = args.sort.unwrap_or_else(|| config.sort_mode_or_default());
    let reverse = if args.sort.is_some() || args.reverse {
        args.reverse
    } else {
        config.sort_reverse_or_default()
    };

    if args.sort.is_some() || args.reverse {
        if let Err(e) = config_store
            .update(Box::new(move |c: &mut AppConfig| {
                c.sort_mode = Some(key.to_string());
                c.sort_reverse = Some(reverse);
            }))
            .await
        {
            warn!(error = %e, "could not save sort preference");
        }
    }

    let mut entries = store.list().await?;
    if let Some(ref text) = args.filter {
        entries = filter_entries(entries, text);
    }
    sort_entries(&mut entries, key, reverse);

    if args.json {
        let views: Vec<EntryView<'_>> = entries.iter().map(EntryView::from).collect();
        match serde_json::to_string_pretty(&views) {
            Ok(json) => presenter.output(&json),
            Err(e) => presenter.error(&format!("Failed to encode listing: {}", e)),
        }
        return Ok(());
    }

    if entries.is_empty() {
        presenter.info(&format!("No recordings in {}", store.dir().display()));
        return Ok(());
    }

    for entry in &entries {
        presenter.output(&format_row(entry));
    }
    Ok(())
}

/// Rename a recording, keeping its extension
pub async fn handle_rename(
    store: &dyn RecordingStore,
    presenter: &Presenter,
    name: &str,
    new_name: &str,
) -> Result<(), StoreError> {
    let entry = store.rename(name, new_name).await?;
    presenter.success(&format!("Renamed {} → {}", name, entry.name));
    Ok(())
}

/// Delete recordings one by one, stopping at the first failure
pub async fn handle_delete(
    store: &dyn RecordingStore,
    presenter: &Presenter,
    names: &[String],
) -> Result<(), StoreError> {
    for name in names {
        store.delete(name).await?;
        presenter.success(&format!("Deleted {}", name));
    }
    Ok(())
}

/// Copy a recording out of the library and print the new path
pub async fn handle_export(
    store: &dyn RecordingStore,
    presenter: &Presenter,
    name: &str,
    destination: &Path,
) -> Result<(), StoreError> {
    let path = store.export(name, destination).await?;
    presenter.success(&format!("Exported {}", name));
    presenter.output(&path.display().to_string());
    Ok(())
}

/// One listing line: name, duration, size, date, type
fn format_row(entry: &RecordingEntry) -> String {
    let modified: DateTime<Local> = entry.modified.into();
    format!(
        "{:<40} {:>8} {:>9}  {}  {}",
        entry.name,
        entry.formatted_duration(),
        entry.human_readable_size(),
        modified.format("%Y-%m-%d %H:%M"),
        entry.mime
    )
}
