// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use arcview_archive::{banner, LaunchMode};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mode = LaunchMode::from_args(std::env::args_os().skip(1));
    if mode == LaunchMode::Version {
        println!("{}", banner());
        return;
    }

    arcview_lib::run(mode);
}
