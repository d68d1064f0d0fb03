pub mod add;
pub mod balance;
pub mod init;
pub mod net;
pub mod reverse;
pub mod settlements;
pub mod split;
