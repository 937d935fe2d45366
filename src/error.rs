use thiserror::Error;

/// Errors raised by the adapters around the carbon core.
/// The classification and aggregation core itself never fails.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid emission factor for {bucket} stage {stage}: {value}")]
    InvalidFactor {
        bucket: &'static str,
        stage: &'static str,
        value: f64,
    },
    #[error("uploader launch failed for {program}: {source}")]
    UploaderLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
