pub mod authenticate;
pub mod challenge;
pub mod config;
pub mod directory;
pub mod foundation;
pub mod fs;
pub mod key;
pub mod reqwest;
pub mod transport;
pub mod verify;
