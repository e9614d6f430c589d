pub mod constants;
pub mod paths;
pub mod string_utils;

pub use constants::*;
pub use paths::{default_config_dir, default_cookie_export_path, default_storage_state_path};
pub use string_utils::{excerpt, looks_like_json, safe_truncate_chars};
