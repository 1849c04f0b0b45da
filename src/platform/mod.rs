//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (files on native, LocalStorage on web)
//! - Logger setup

pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageStore;
pub use storage::{BlobStore, FileStore, MemoryStore, StorageError};

/// Browser entry: route `log` to the console and panics to `console.error`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Tapquest core loaded");
}
