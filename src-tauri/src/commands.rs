use crate::state::AppState;
use arcview_archive::{ArchiveFormat, Command, OpenArchive, Response, Row, View};
use std::path::PathBuf;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

/// The view to show when the window first loads
#[tauri::command]
pub async fn launch_state(state: State<'_, AppState>) -> Result<View, String> {
    Ok(state.ctx.lock().view().clone())
}

/// Let the user choose an archive, then open it
///
/// Returns `None` when the dialog was cancelled.
#[tauri::command]
pub async fn pick_archive(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<Option<View>, String> {
    let mut dialog = app
        .dialog()
        .file()
        .set_title("Open archive...")
        .add_filter("Archives", ArchiveFormat::all_extensions());
    if let Some(home) = dirs::home_dir() {
        dialog = dialog.set_directory(home);
    }

    let Some(picked) = dialog.blocking_pick_file() else {
        return Ok(None);
    };
    let path = picked.into_path().map_err(|e| e.to_string())?;

    open_archive(state, path.to_string_lossy().into_owned())
        .await
        .map(Some)
}

/// Index an archive and switch to its tree
///
/// A read failure is not an error here: the returned view carries the
/// message and the open view stays in place.
#[tauri::command]
pub async fn open_archive(state: State<'_, AppState>, path: String) -> Result<View, String> {
    let ctx = state.ctx.clone();
    let archive_path = PathBuf::from(path);

    // Indexing reads the whole archive, keep it off the async workers
    tokio::task::spawn_blocking(move || {
        let mut ctx = ctx.lock();
        ctx.dispatch(Command::OpenArchive(OpenArchive { archive_path }));
        ctx.view().clone()
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))
}

/// Rows for the children of a tree node; `""` is the archive root
#[tauri::command]
pub async fn children_of(state: State<'_, AppState>, node: String) -> Result<Vec<Row>, String> {
    let ctx = state.ctx.lock();
    let presenter = ctx.presenter().ok_or("No archive is open")?;
    Ok(presenter.rows_of(&node))
}

/// Ask for a destination and extract one node there
///
/// A cancelled prompt does nothing. Otherwise the extraction runs on a
/// blocking thread and its outcome ends the application.
#[tauri::command]
pub async fn extract_entry(
    app: AppHandle,
    state: State<'_, AppState>,
    node: String,
) -> Result<(), String> {
    let request = {
        let ctx = state.ctx.lock();
        let presenter = ctx.presenter().ok_or("No archive is open")?;
        presenter
            .render_row(&node)
            .ok_or_else(|| format!("Unknown entry: {}", node))?
            .extract
    };

    let destination = app
        .dialog()
        .file()
        .set_title("Select destination...")
        .set_directory(request.picker_location())
        .blocking_pick_folder()
        .map(|folder| folder.into_path())
        .transpose()
        .map_err(|e| e.to_string())?;

    let response = state
        .ctx
        .lock()
        .dispatch(Command::ExtractEntry(request.with_destination(destination)));

    let job = match response {
        Response::Extract(job) => job,
        _ => return Ok(()),
    };

    tracing::info!(
        member = %job.entry().path,
        destination = %job.destination().display(),
        "starting extraction"
    );
    let outcome = tokio::task::spawn_blocking(move || job.run())
        .await
        .map_err(|e| format!("Task join error: {}", e))?;

    crate::finish_session(&app, outcome);
    Ok(())
}
