mod commands;
mod state;

use arcview_archive::{AppContext, LaunchMode, Outcome};
use state::AppState;
use tauri::{AppHandle, Manager, RunEvent};

pub fn run(mode: LaunchMode) {
    let ctx = AppContext::init(&mode);

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(AppState::new(ctx))
        .setup(|app| {
            let view = app.state::<AppState>().ctx.lock().run();
            tracing::info!(?view, "arcview started");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::launch_state,
            commands::pick_archive,
            commands::open_archive,
            commands::children_of,
            commands::extract_entry,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|handle, event| {
        if let RunEvent::Exit = event {
            // Closing the window without extracting still goes through shutdown
            let state = handle.state::<AppState>();
            let mut ctx = state.ctx.lock();
            if ctx.outcome().is_none() {
                ctx.shutdown();
            }
        }
    });
}

/// End the session after an extraction: record the outcome and exit with its code.
pub(crate) fn finish_session(app: &AppHandle, outcome: Outcome) {
    let code = {
        let state = app.state::<AppState>();
        let mut ctx = state.ctx.lock();
        ctx.finish(outcome);
        ctx.shutdown()
    };
    app.exit(code);
}
