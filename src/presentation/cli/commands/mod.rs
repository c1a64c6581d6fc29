pub mod init;
pub mod watch;

pub use init::*;
pub use watch::*;
