pub mod init;
pub mod play;
pub mod tags;
pub mod validate;
