//! Student input submitted through the form or the request subject

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sex as chosen in the form selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[serde(alias = "Laki-laki", alias = "M")]
    Male,
    #[serde(alias = "Perempuan", alias = "F")]
    Female,
}

impl Sex {
    /// Value of the `sex_M` one-hot column.
    pub fn male_indicator(self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }

    /// Label shown in the selector.
    pub fn display_label(self) -> &'static str {
        match self {
            Sex::Male => "Laki-laki",
            Sex::Female => "Perempuan",
        }
    }

    /// Form value submitted by the selector.
    pub fn form_value(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "male" | "Male" | "M" | "Laki-laki" => Ok(Sex::Male),
            "female" | "Female" | "F" | "Perempuan" => Ok(Sex::Female),
            other => Err(format!("unknown sex choice `{}`", other)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

/// The user-supplied record. Only `absences` and `sex` reach the model;
/// name and class are echoed back in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentInput {
    /// Student name (free text)
    #[serde(default)]
    pub name: String,

    /// Class, e.g. "XI IPA 1" (free text)
    #[serde(default, rename = "class")]
    pub class_name: String,

    /// Number of absences
    pub absences: u32,

    /// Sex selector choice
    pub sex: Sex,
}

impl StudentInput {
    /// Create a new input
    pub fn new(name: impl Into<String>, class_name: impl Into<String>, absences: u32, sex: Sex) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            absences,
            sex,
        }
    }

    /// Whether both identity fields carry non-blank text.
    pub fn has_identity(&self) -> bool {
        !self.name.trim().is_empty() && !self.class_name.trim().is_empty()
    }
}
