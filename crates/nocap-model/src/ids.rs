// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ID_MAX_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

macro_rules! id_newtype {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(input: &str) -> Result<Self, ParseError> {
                if input.is_empty() {
                    return Err(ParseError::Empty($label));
                }
                if input.trim() != input {
                    return Err(ParseError::Trimmed($label));
                }
                if input.len() > ID_MAX_LEN {
                    return Err(ParseError::TooLong($label, ID_MAX_LEN));
                }
                Ok(Self(input.to_string()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(CompanyId, "company_id");
id_newtype!(StakeholderId, "stakeholder_id");
id_newtype!(SecurityId, "security_id");
id_newtype!(GrantId, "grant_id");
id_newtype!(ScheduleId, "schedule_id");
id_newtype!(TransactionId, "transaction_id");
id_newtype!(CapTableId, "cap_table_id");
id_newtype!(ActivityId, "activity_id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_parse_accepts_plain_slug() {
        let id = StakeholderId::parse("emp-001").expect("parse");
        assert_eq!(id.as_str(), "emp-001");
    }

    #[test]
    fn id_parse_rejects_empty_and_padded() {
        assert!(matches!(
            CompanyId::parse(""),
            Err(ParseError::Empty("company_id"))
        ));
        assert!(matches!(
            CompanyId::parse(" acme "),
            Err(ParseError::Trimmed("company_id"))
        ));
    }

    #[test]
    fn id_parse_rejects_oversized() {
        let long = "x".repeat(ID_MAX_LEN + 1);
        assert!(matches!(
            GrantId::parse(&long),
            Err(ParseError::TooLong("grant_id", ID_MAX_LEN))
        ));
    }
}
