// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Kinds of records an autocomplete field can search for

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::error::DomainError;

/// Record type an autocompleter searches; selects the remote endpoint,
/// the hidden field name and the default matching options.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "clap", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Clade,
    Herbarium,
    Location,
    /// Locations containing a given point; behaves like a select box
    LocationContaining,
    /// Places proposed by the geocoding collaborator
    LocationGoogle,
    Name,
    Project,
    Region,
    SpeciesList,
    User,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Clade => "clade",
            RecordType::Herbarium => "herbarium",
            RecordType::Location => "location",
            RecordType::LocationContaining => "location_containing",
            RecordType::LocationGoogle => "location_google",
            RecordType::Name => "name",
            RecordType::Project => "project",
            RecordType::Region => "region",
            RecordType::SpeciesList => "species_list",
            RecordType::User => "user",
        }
    }

    /// Model whose identifier the field binds
    pub fn model(self) -> &'static str {
        match self {
            RecordType::Clade | RecordType::Name => "name",
            RecordType::Herbarium => "herbarium",
            RecordType::Location
            | RecordType::LocationContaining
            | RecordType::LocationGoogle
            | RecordType::Region => "location",
            RecordType::Project => "project",
            RecordType::SpeciesList => "species_list",
            RecordType::User => "user",
        }
    }

    /// Name of the hidden field carrying the bound identifier(s)
    pub fn hidden_field_name(self) -> String {
        format!("{}_id", self.model())
    }

    /// Whether candidates come from the geocoder instead of the search service
    pub fn is_geocode_fallback(self) -> bool {
        self == RecordType::LocationGoogle
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "clade" => Ok(RecordType::Clade),
            "herbarium" => Ok(RecordType::Herbarium),
            "location" => Ok(RecordType::Location),
            "location_containing" => Ok(RecordType::LocationContaining),
            "location_google" => Ok(RecordType::LocationGoogle),
            "name" => Ok(RecordType::Name),
            "project" => Ok(RecordType::Project),
            "region" => Ok(RecordType::Region),
            "species_list" => Ok(RecordType::SpeciesList),
            "user" => Ok(RecordType::User),
            _ => Err(DomainError::UnknownRecordType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_every_display_name() {
        for record_type in RecordType::iter() {
            assert_eq!(record_type.to_string().parse::<RecordType>(), Ok(record_type));
        }
        assert_eq!("species-list".parse::<RecordType>(), Ok(RecordType::SpeciesList));
    }

    #[test]
    fn rejects_unknown_types() {
        assert_eq!(
            "bogus".parse::<RecordType>(),
            Err(DomainError::UnknownRecordType("bogus".to_string()))
        );
    }

    #[test]
    fn hidden_field_follows_model() {
        assert_eq!(RecordType::Region.hidden_field_name(), "location_id");
        assert_eq!(RecordType::Clade.hidden_field_name(), "name_id");
        assert_eq!(RecordType::SpeciesList.hidden_field_name(), "species_list_id");
    }
}
