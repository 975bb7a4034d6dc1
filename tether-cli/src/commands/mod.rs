pub mod daemon;
pub mod init;
pub mod sync;
