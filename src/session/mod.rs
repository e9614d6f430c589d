//! Session state shared by every fetch strategy, and its persistence

pub mod state;
pub mod store;

pub use state::{
    CookieExport, OriginStorage, SessionState, StorageEntry, StorageStateFile, StoredCookie,
};
pub use store::{SessionStore, has_auth_signal, load, save};
