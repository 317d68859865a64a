//! Common domain type definitions
//!
//! Normalized categories parsed from the free-text columns of the intake and
//! outcome exports. Every enum has a catch-all arm so parsing never fails.

use serde::Serialize;
use std::fmt;

/// Species group of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AnimalType {
    Dog,
    Cat,
    Bird,
    Livestock,
    Other,
}

impl From<&str> for AnimalType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "dog" => Self::Dog,
            "cat" => Self::Cat,
            "bird" => Self::Bird,
            "livestock" => Self::Livestock,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for AnimalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
            Self::Bird => "Bird",
            Self::Livestock => "Livestock",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Condition of an animal when it entered the shelter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IntakeCondition {
    Normal,
    Injured,
    Sick,
    Nursing,
    Neonatal,
    Aged,
    Pregnant,
    Medical,
    Behavior,
    Feral,
    Other,
}

impl From<&str> for IntakeCondition {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "normal" => Self::Normal,
            "injured" => Self::Injured,
            "sick" => Self::Sick,
            "nursing" => Self::Nursing,
            "neonatal" => Self::Neonatal,
            "aged" => Self::Aged,
            "pregnant" => Self::Pregnant,
            "medical" | "med attn" | "med urgent" => Self::Medical,
            "behavior" => Self::Behavior,
            "feral" => Self::Feral,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for IntakeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How an animal came to the shelter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IntakeType {
    Stray,
    OwnerSurrender,
    PublicAssist,
    Wildlife,
    EuthanasiaRequest,
    Abandoned,
    Other,
}

impl From<&str> for IntakeType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "stray" => Self::Stray,
            "owner surrender" => Self::OwnerSurrender,
            "public assist" => Self::PublicAssist,
            "wildlife" => Self::Wildlife,
            "euthanasia request" => Self::EuthanasiaRequest,
            "abandoned" => Self::Abandoned,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for IntakeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How an animal left the shelter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum OutcomeType {
    Adoption,
    Transfer,
    ReturnToOwner,
    /// Returned to owner via the adoption process
    RtoAdopt,
    Euthanasia,
    Died,
    Disposal,
    Missing,
    Relocate,
    Stolen,
    Lost,
    Other,
}

impl OutcomeType {
    /// Whether the animal left the shelter alive
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(
            self,
            Self::Adoption | Self::Transfer | Self::ReturnToOwner | Self::RtoAdopt
        )
    }

    #[must_use]
    pub const fn is_adoption(self) -> bool {
        matches!(self, Self::Adoption)
    }
}

impl From<&str> for OutcomeType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "adoption" => Self::Adoption,
            "transfer" => Self::Transfer,
            "return to owner" => Self::ReturnToOwner,
            "rto-adopt" | "rto adopt" => Self::RtoAdopt,
            "euthanasia" => Self::Euthanasia,
            "died" => Self::Died,
            "disposal" => Self::Disposal,
            "missing" => Self::Missing,
            "relocate" => Self::Relocate,
            "stolen" => Self::Stolen,
            "lost" => Self::Lost,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Spay/neuter status parsed from the "Sex upon ..." column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SexStatus {
    Intact,
    /// Spayed or neutered
    Altered,
    Unknown,
}

impl SexStatus {
    #[must_use]
    pub const fn is_altered(self) -> bool {
        matches!(self, Self::Altered)
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl From<&str> for SexStatus {
    fn from(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        match lower.split_whitespace().next() {
            Some("intact") => Self::Intact,
            Some("spayed" | "neutered") => Self::Altered,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for SexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Intact => "Intact",
            Self::Altered => "Spayed/Neutered",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Biological sex parsed from the "Sex upon ..." column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl From<&str> for Sex {
    fn from(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        match lower.split_whitespace().last() {
            Some("male") => Self::Male,
            Some("female") => Self::Female,
            _ => Self::Unknown,
        }
    }
}

/// Ordinal age category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AgeBucket {
    UnderOneYear,
    OneToThreeYears,
    ThreeToSevenYears,
    SevenYearsPlus,
    Unknown,
}

impl AgeBucket {
    /// Bucket an age expressed in years
    #[must_use]
    pub fn from_years(years: Option<f64>) -> Self {
        match years {
            Some(y) if !y.is_finite() || y < 0.0 => Self::Unknown,
            Some(y) if y < 1.0 => Self::UnderOneYear,
            Some(y) if y < 3.0 => Self::OneToThreeYears,
            Some(y) if y < 7.0 => Self::ThreeToSevenYears,
            Some(_) => Self::SevenYearsPlus,
            None => Self::Unknown,
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::UnderOneYear => "<1y",
            Self::OneToThreeYears => "1-3y",
            Self::ThreeToSevenYears => "3-7y",
            Self::SevenYearsPlus => "7y+",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}
