use std::error::Error;
use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Database error")]
    Database(#[from] postgres::Error),
    #[error("Kafka error")]
    Kafka(#[from] rdkafka::error::KafkaError),
    #[error("JSON Error")]
    Json(#[from] serde_json::Error),
    #[error("CSV Error")]
    Csv(#[from] csv::Error),
    #[error("I/O Error")]
    Io(#[from] io::Error),
    #[error("Insert into {0} did not return an id")]
    MissingId(&'static str),
    #[error("Unknown entity {0:?}, expected \"users\" or \"orders\"")]
    UnknownEntity(String),
}

impl ProbeError {
    /// The error's message followed by every underlying cause, separated by `: `.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            let text = err.to_string();
            if !message.ends_with(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            cause = err.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_includes_causes() {
        let err = ProbeError::from(io::Error::new(io::ErrorKind::Other, "disk is gone"));
        assert_eq!(err.describe(), "I/O Error: disk is gone");

        let err = ProbeError::from(serde_json::from_str::<u8>("nope").unwrap_err());
        assert!(err.describe().starts_with("JSON Error: expected"));
    }

    #[test]
    fn test_describe_without_cause() {
        assert_eq!(
            ProbeError::MissingId("users").describe(),
            "Insert into users did not return an id"
        );
    }
}
