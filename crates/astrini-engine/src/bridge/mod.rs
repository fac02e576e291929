pub mod instance;
pub mod protocol;
