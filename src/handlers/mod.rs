// handlers/mod.rs - HTTP handlers
//
// system/  - service info and health (public)
// profile/ - profile aggregate and block endpoints (GET public, writes owner-only)

pub mod profile;
pub mod system;
