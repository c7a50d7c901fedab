pub mod grade;
pub mod init;
pub mod progress;
pub mod validate;
