pub mod profile_service;
pub mod write_lock;

pub use profile_service::{AssetSettings, ProfileError, ProfileService};
pub use write_lock::KeyedLocks;
