//! Locale context for user-facing strings.
//!
//! A [`Translator`] is a plain value built from a [`Locale`] and handed to
//! whoever formats output; there is no process-wide language setting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    He,
}

impl Locale {
    /// Parse a language tag, falling back to English for anything unknown.
    ///
    /// Region subtags are ignored (`he-IL` -> `He`). `iw` is the legacy
    /// Hebrew code still emitted by some devices.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "he" | "iw" => Locale::He,
            _ => Locale::En,
        }
    }

    /// Language code sent to the places and geocoding services.
    #[must_use]
    pub fn language_code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::He => "he",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.language_code())
    }
}

/// Fixed user-facing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Generic title given to every normalized shelter.
    BombShelter,
    /// Placeholder for a missing address or location name.
    UnknownLocation,
    ClosestShelterFound,
    Navigate,
    NoSheltersFound,
    LoadFailedRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    #[must_use]
    pub const fn new(locale: Locale) -> Self {
        Self { locale }
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn text(&self, message: Message) -> &'static str {
        match (self.locale, message) {
            (Locale::En, Message::BombShelter) => "Bomb shelter",
            (Locale::He, Message::BombShelter) => "מקלט",
            (Locale::En, Message::UnknownLocation) => "Unknown location",
            (Locale::He, Message::UnknownLocation) => "מיקום לא ידוע",
            (Locale::En, Message::ClosestShelterFound) => "Closest shelter found",
            (Locale::He, Message::ClosestShelterFound) => "נמצא המקלט הקרוב ביותר",
            (Locale::En, Message::Navigate) => "Navigate",
            (Locale::He, Message::Navigate) => "נווט",
            (Locale::En, Message::NoSheltersFound) => "No shelters found nearby",
            (Locale::He, Message::NoSheltersFound) => "לא נמצאו מקלטים בקרבת מקום",
            (Locale::En, Message::LoadFailedRetry) => {
                "Could not load shelters. Check your connection and retry."
            }
            (Locale::He, Message::LoadFailedRetry) => "טעינת המקלטים נכשלה. בדקו את החיבור ונסו שוב.",
        }
    }

    /// Body of the navigation prompt for the closest shelter.
    #[must_use]
    pub fn closest_shelter_at(&self, description: &str) -> String {
        match self.locale {
            Locale::En => format!("The closest shelter is at: {description}"),
            Locale::He => format!("המקלט הקרוב ביותר נמצא ב: {description}"),
        }
    }
}
