pub mod list;
pub mod ping;
pub mod verify;
