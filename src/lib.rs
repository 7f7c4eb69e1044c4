pub mod core;

#[cfg(feature = "desktop")]
mod commands;

use tracing_subscriber::EnvFilter;

/// Structured logging for every entry point. `RUST_LOG` wins over the default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orbital_lib=debug")),
        )
        .try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;
    use tauri::Manager;

    use crate::core::state::{default_data_dir, AppContext, ContextSlot, RuntimePaths, Settings};

    init_tracing();
    tracing::info!("Orbital starting...");

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(Arc::new(ContextSlot::new()))
        .setup(|app| {
            let data_dir = default_data_dir();
            let settings = Settings::load(&data_dir);
            let bundled = app.path().resource_dir()?.join("resources");
            let paths = RuntimePaths::resolve(data_dir, bundled, &settings);

            let ctx = tauri::async_runtime::block_on(AppContext::start(paths, settings))?;
            let slot = Arc::clone(app.state::<Arc<ContextSlot>>().inner());
            tauri::async_runtime::block_on(slot.install(ctx));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::app_version,
            commands::list_asset_versions,
            commands::current_asset_version,
            commands::set_asset_version,
            commands::resolve_asset_path,
            commands::read_asset_text,
            commands::read_asset_json,
            commands::create_project,
            commands::open_project,
            commands::list_projects,
            commands::delete_project,
            commands::active_project,
        ])
        .build(tauri::generate_context!());

    let app = match result {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Failed to build application: {}", e);
            return;
        }
    };

    app.run(|handle, event| {
        if let tauri::RunEvent::Exit = event {
            let slot = Arc::clone(handle.state::<Arc<ContextSlot>>().inner());
            tauri::async_runtime::block_on(slot.teardown());
        }
    });
}
