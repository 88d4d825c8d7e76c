use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(PersonId);
id_newtype!(CoordinatesId);
id_newtype!(LocationId);

/// Generates a wire enum (SCREAMING_SNAKE_CASE) with `as_str`, `ALL`, `Display` and `FromStr`.
macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == normalized)
                    .ok_or_else(|| UnknownVariant::new(stringify!($name), s))
            }
        }
    };
}

wire_enum!(Country {
    Russia => "RUSSIA",
    China => "CHINA",
    India => "INDIA",
    Italy => "ITALY",
    SouthKorea => "SOUTH_KOREA",
});

wire_enum!(HairColor {
    Blonde => "BLONDE",
    Brunette => "BRUNETTE",
    Brown => "BROWN",
    Red => "RED",
    Black => "BLACK",
    Gray => "GRAY",
    White => "WHITE",
});

wire_enum!(EyeColor {
    Brown => "BROWN",
    Blue => "BLUE",
    Green => "GREEN",
    Gray => "GRAY",
    Black => "BLACK",
    Amber => "AMBER",
    Hazel => "HAZEL",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CoordinatesId>,
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}; {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LocationId>,
    pub x: f64,
    pub y: i32,
    pub name: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}; {})", self.name, self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub coordinates: Coordinates,
    pub creation_date: DateTime<Utc>,
    pub height: f64,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub weight: Option<i64>,
    pub nationality: Country,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hair_color: Option<HairColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<EyeColor>,
}

/// Body of `POST /persons` and `PUT /persons/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDraft {
    pub name: String,
    pub coordinates: Coordinates,
    pub height: f64,
    pub birthday: NaiveDate,
    pub weight: Option<i64>,
    pub nationality: Country,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hair_color: Option<HairColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<EyeColor>,
}

impl PersonDraft {
    pub fn blank(coordinates: Coordinates, today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            coordinates: Coordinates {
                id: None,
                ..coordinates
            },
            height: 0.0,
            birthday: today,
            weight: None,
            nationality: Country::Russia,
            location: Location {
                id: None,
                x: 0.0,
                y: 0,
                name: String::new(),
            },
            hair_color: None,
            eye_color: None,
        }
    }
}

impl From<&Person> for PersonDraft {
    fn from(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            coordinates: Coordinates {
                id: None,
                ..person.coordinates.clone()
            },
            height: person.height,
            birthday: person.birthday,
            weight: person.weight,
            nationality: person.nationality,
            location: Location {
                id: None,
                ..person.location.clone()
            },
            hair_color: person.hair_color,
            eye_color: person.eye_color,
        }
    }
}
