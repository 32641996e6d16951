#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use pgconnect_lib::commands;
use pgconnect_lib::AppState;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tauri::Builder::default()
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            commands::get_form,
            commands::update_field,
            commands::test_connection,
            commands::connect,
            commands::disconnect,
            commands::is_connected,
            commands::session_info,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
