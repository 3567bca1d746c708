use std::fmt;

#[derive(Debug)]
pub enum CanonTextError {
    InvalidConfiguration(String),
    Io(std::io::Error),
}

impl fmt::Display for CanonTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonTextError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            CanonTextError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for CanonTextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CanonTextError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CanonTextError {
    fn from(value: std::io::Error) -> Self {
        CanonTextError::Io(value)
    }
}
