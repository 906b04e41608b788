use memory_connector::DatamodelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JoinEngineError {
    #[error("{}", _0)]
    DatamodelError(#[from] DatamodelError),

    #[error("{}", _0)]
    SerializationError(String),

    #[error("{}", _0)]
    JsonDecodeError(anyhow::Error),

    #[error("{}", _0)]
    IOError(anyhow::Error),

    #[error("{}", _0)]
    InvocationError(String),

    #[error("Failed to install the logger: {}", _0)]
    LoggerError(String),
}

impl JoinEngineError {
    pub fn render_as_json(self) -> Result<(), anyhow::Error> {
        use std::io::Write as _;

        let error: user_facing_errors::Error = match self {
            JoinEngineError::DatamodelError(err) => err.into(),
            other => user_facing_errors::Error::new_non_panic_with_current_backtrace(other.to_string()),
        };

        // One JSON message on a single line, written at once.
        let stderr = std::io::stderr();
        let locked_stderr = stderr.lock();
        let mut writer = std::io::LineWriter::new(locked_stderr);
        serde_json::to_writer(&mut writer, &error)?;
        writeln!(&mut writer)?;
        writer.flush()?;

        Ok(())
    }
}

impl From<serde_json::Error> for JoinEngineError {
    fn from(e: serde_json::Error) -> Self {
        JoinEngineError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for JoinEngineError {
    fn from(e: std::io::Error) -> Self {
        JoinEngineError::IOError(e.into())
    }
}
