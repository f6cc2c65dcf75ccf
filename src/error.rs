pub type OptiplayResult<T> = Result<T, OptiplayError>;

#[derive(thiserror::Error, Debug)]
pub enum OptiplayError {
    #[error("load error: {0}")]
    Load(String),

    #[error("malformed log: {0}")]
    MalformedLog(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OptiplayError {
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedLog(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
