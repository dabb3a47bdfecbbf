pub mod init;
pub mod profile;
