use arcview_archive::AppContext;
use parking_lot::Mutex;
use std::sync::Arc;

/// Application state shared by every command.
pub struct AppState {
    /// The browsing session; commands lock it only for short, non-blocking steps
    pub ctx: Arc<Mutex<AppContext>>,
}

impl AppState {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx: Arc::new(Mutex::new(ctx)),
        }
    }
}
