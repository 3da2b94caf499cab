pub mod crypto_refresh;
