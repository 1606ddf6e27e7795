pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Database URL from `DATABASE_URL`, falling back to `STOREFRONT_DATABASE_URL`.
///
/// Loads `.env` first when present.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("STOREFRONT_DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
