// handlers/profile/mod.rs - Profile and block endpoints
//
// GET is public; every other route requires a bearer token whose username
// claim equals the :username path segment (see `ProfileOwner`).

pub mod add_block;       // POST   /profile/:username/block
pub mod avatar;          // POST   /profile/:username/avatar
pub mod bio;             // PATCH  /profile/:username/bio
pub mod delete_block;    // DELETE /profile/:username/block/:object_id
pub mod display_name;    // PATCH  /profile/:username/displayname
pub mod get_profile;     // GET    /profile/:username
pub mod replace_blocks;  // PUT    /profile/:username
pub mod update_block;    // PUT    /profile/:username/block

pub use add_block::add_block;
pub use avatar::upload_avatar;
pub use bio::update_bio;
pub use delete_block::delete_block;
pub use display_name::update_display_name;
pub use get_profile::get_profile;
pub use replace_blocks::replace_blocks;
pub use update_block::update_block;
