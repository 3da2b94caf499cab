pub mod crypto;
pub mod hero;
pub mod quote;
