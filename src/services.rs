mod account;
mod character;
pub mod navigator;

pub use account::{AccountService, LoginResult};
pub use character::CharacterService;
pub use navigator::MoveError;
