use std::fs;
use std::path::Path;

fn ensure_asset_resources_placeholder() {
    let assets_dir = Path::new("resources/assets");
    let placeholder = assets_dir.join(".keep");

    if let Err(error) = fs::create_dir_all(assets_dir) {
        panic!("failed to create asset resources directory: {error}");
    }

    if !placeholder.exists() {
        if let Err(error) = fs::write(&placeholder, b"asset versions are extracted here\n") {
            panic!("failed to create asset resources placeholder file: {error}");
        }
    }
}

fn main() {
    ensure_asset_resources_placeholder();
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(feature = "desktop")]
    tauri_build::build();
}
