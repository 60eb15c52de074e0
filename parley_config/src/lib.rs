mod schema;

pub use schema::{API_KEY_ENV, ChatDefaults, Config, ProviderConfig, ProvidersConfig};
