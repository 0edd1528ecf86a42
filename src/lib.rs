pub mod authenticator;
pub mod cli;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod keystore;
pub mod lock;
pub mod store;
pub mod vault;
