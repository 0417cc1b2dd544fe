//! Configuration loaded from `<base>/config.toml`.

pub mod settings;

pub use settings::Settings;
