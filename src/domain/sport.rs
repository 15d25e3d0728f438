use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportGender {
    Male,
    Female,
}

impl SportGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            SportGender::Male => "male",
            SportGender::Female => "female",
        }
    }
}

impl FromStr for SportGender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(SportGender::Male),
            "female" => Ok(SportGender::Female),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown sport gender '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Sport {
    pub id: Uuid,
    pub name: String,
    pub gender: SportGender,
}

#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub name: String,
}
