use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {name} has invalid value '{value}': expected {expected}")]
    InvalidEnvValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}
