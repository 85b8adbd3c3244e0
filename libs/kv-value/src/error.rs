use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unable to convert from {} to {}", from, to)]
pub struct ConversionFailure {
    pub from: String,
    pub to: String,
}

impl ConversionFailure {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> ConversionFailure {
        ConversionFailure {
            from: from.into(),
            to: to.into(),
        }
    }
}
