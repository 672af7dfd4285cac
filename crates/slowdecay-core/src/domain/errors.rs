use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProfileResult<T> = Result<T, ProfileError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileErrorCategory {
    Success,
    InputValidationError,
    InsufficientData,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl ProfileErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::InsufficientData => 3,
            Self::IoSystemError => 4,
            Self::ComputationError => 5,
            Self::InternalError => 6,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::InsufficientData => "InsufficientData",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Error raised anywhere in the profile pipeline.
///
/// `code` is a stable dotted identifier (`INPUT.AZIMUTH_RANGE`,
/// `DATA.INSUFFICIENT`, ...) that scripts can match on without parsing the
/// free-form message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileError {
    category: ProfileErrorCategory,
    code: &'static str,
    message: String,
}

impl ProfileError {
    pub fn new(
        category: ProfileErrorCategory,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn input_validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ProfileErrorCategory::InputValidationError, code, message)
    }

    pub fn insufficient_data(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ProfileErrorCategory::InsufficientData, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ProfileErrorCategory::IoSystemError, code, message)
    }

    pub fn computation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ProfileErrorCategory::ComputationError, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ProfileErrorCategory::InternalError, code, message)
    }

    pub const fn category(&self) -> ProfileErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for ProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.code,
            self.message
        )
    }
}

impl Error for ProfileError {}
