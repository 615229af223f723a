// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Collection APIs hand out ids as strings, but some fixtures send bare
/// numbers. Both decode to the same textual id.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(text) => text,
            RawId::Unsigned(number) => number.to_string(),
            RawId::Signed(number) => number.to_string(),
        }
    }
}

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

entity_id!(RecordId);
entity_id!(CountryId);

#[cfg(test)]
mod tests {
    use super::{CountryId, RecordId};

    #[test]
    fn ids_decode_from_strings_and_numbers() -> anyhow::Result<()> {
        let from_text: RecordId = serde_json::from_str("\"17\"")?;
        let from_number: RecordId = serde_json::from_str("17")?;
        assert_eq!(from_text, from_number);
        assert_eq!(from_text.as_str(), "17");
        Ok(())
    }

    #[test]
    fn ids_serialize_as_plain_strings() -> anyhow::Result<()> {
        let encoded = serde_json::to_string(&CountryId::new("3"))?;
        assert_eq!(encoded, "\"3\"");
        Ok(())
    }
}
