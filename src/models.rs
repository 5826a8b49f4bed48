pub mod account;
pub mod blueprint;
pub mod character;
pub mod instance;
pub mod inventory;
pub mod room;
pub mod types;
