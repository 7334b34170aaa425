use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set.
    ///
    /// The application requires this environment variable to be defined. Check the
    /// documentation or `.env.example` file for required configuration variables.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Settings file could not be read from disk.
    #[error("Failed to read settings file {path}: {source}")]
    ReadSettings {
        /// Path that was attempted
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid YAML or does not match the expected shape.
    #[error("Failed to parse settings file {path}: {source}")]
    ParseSettings {
        /// Path that was attempted
        path: String,
        /// The underlying deserialization error
        #[source]
        source: serde_yaml::Error,
    },

    /// The configured default priority is not one of the configured levels.
    #[error("Default priority '{0}' is not a configured priority level")]
    UnknownDefaultPriority(String),

    /// A working-hours range is not in `HH:MM-HH:MM` form.
    #[error("Invalid working hours range '{0}': expected HH:MM-HH:MM")]
    InvalidWorkingHours(String),
}
