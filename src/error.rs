use thiserror::Error;

/// Rejections of a schedule request before any solving happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("at least one subject is required")]
    NoSubjects,

    #[error("{subjects} subjects cannot be covered by only {teachers} teachers")]
    TooFewTeachers { subjects: usize, teachers: u32 },

    #[error("the number of {field} must be greater than 0")]
    NotPositive { field: &'static str },

    #[error("unknown lab subjects: {}; expected one of: {}", .unknown.join(", "), .known.join(", "))]
    UnknownLabSubjects {
        unknown: Vec<String>,
        known: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
