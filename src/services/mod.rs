pub mod identity;
pub mod passwords;
pub mod tokens;
