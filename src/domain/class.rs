//! # Class Record
//!
//! The academic class being provisioned and the names derived from it.
//! Normalization happens in the setters; the derived names are pure functions of the record.

use std::fmt;
use thiserror::Error;

/// Descriptions must stay below this many characters (channel topic limit).
pub const MAX_DESCRIPTION_CHARS: usize = 256;

/// Reply that leaves an optional field unset.
pub const SKIP_TOKEN: &str = "None";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassRecord {
    pub abbreviation: Option<String>,
    pub number: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
}

impl ClassRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record pre-filled from an "abbrev-number" token.
    pub fn from_token(token: &ClassToken) -> Self {
        let mut record = Self::new();
        record.apply_token(token);
        record
    }

    pub fn apply_token(&mut self, token: &ClassToken) {
        self.set_abbreviation(&token.abbreviation);
        self.number = token.number;
    }

    pub fn set_abbreviation(&mut self, value: &str) {
        self.abbreviation = Some(value.to_lowercase());
    }

    pub fn set_instructor(&mut self, value: &str) {
        self.instructor = Some(value.to_lowercase());
    }

    pub fn set_name(&mut self, value: &str) {
        self.name = Some(value.to_string());
    }

    /// Rejects descriptions that would not fit a channel topic.
    pub fn set_description(&mut self, value: &str) -> Result<(), DescriptionTooLong> {
        let len = value.chars().count();
        if len >= MAX_DESCRIPTION_CHARS {
            return Err(DescriptionTooLong(len));
        }
        self.description = Some(value.to_string());
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("description is {0} characters, must be less than 256")]
pub struct DescriptionTooLong(pub usize);

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or(SKIP_TOKEN)
}

/// "Current values" block shown in every wizard prompt.
impl fmt::Display for ClassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Class Major: **{}**", or_none(self.abbreviation.as_deref()))?;
        writeln!(f, "Class Number: **{}**", self.number)?;
        writeln!(f, "Class Name: **{}**", or_none(self.name.as_deref()))?;
        writeln!(f, "Class Description: **{}**", or_none(self.description.as_deref()))?;
        write!(f, "Class Professor: **{}**", or_none(self.instructor.as_deref()))
    }
}

pub fn round_down(num: u32, divisor: u32) -> u32 {
    num - (num % divisor)
}

/// `{abbreviation}-{number}[-{instructor}]`
pub fn channel_name(record: &ClassRecord) -> String {
    match &record.instructor {
        Some(instructor) => format!("{}-{instructor}", role_name(record)),
        None => role_name(record),
    }
}

/// `{abbreviation} {number rounded down to the thousand} levels`
pub fn category_name(record: &ClassRecord) -> String {
    format!(
        "{} {} levels",
        or_none(record.abbreviation.as_deref()),
        round_down(record.number, 1000)
    )
}

/// `{abbreviation}-{number}`
pub fn role_name(record: &ClassRecord) -> String {
    format!("{}-{}", or_none(record.abbreviation.as_deref()), record.number)
}

/// A parsed "abbrev-number" token such as `cpsc-1010`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassToken {
    pub abbreviation: String,
    pub number: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassTokenError {
    #[error("expected exactly one dash between abbreviation and number, e.g. cpsc-1010")]
    WrongShape,
    #[error("the class abbreviation is empty")]
    EmptyAbbreviation,
    #[error("'{0}' is not a class number")]
    BadNumber(String),
}

impl ClassToken {
    pub fn parse(input: &str) -> Result<Self, ClassTokenError> {
        let parts: Vec<&str> = input.trim().split('-').collect();
        let [abbreviation, number] = parts.as_slice() else {
            return Err(ClassTokenError::WrongShape);
        };

        let abbreviation = abbreviation.trim();
        if abbreviation.is_empty() {
            return Err(ClassTokenError::EmptyAbbreviation);
        }

        let number = number.trim();
        let number = number
            .parse::<u32>()
            .map_err(|_| ClassTokenError::BadNumber(number.to_string()))?;

        Ok(Self {
            abbreviation: abbreviation.to_lowercase(),
            number,
        })
    }
}
