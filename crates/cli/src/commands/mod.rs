//! `shop-cli` subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Read the database URL the same way the server does.
pub(crate) fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
