//! Conversion from collaborator wire records into [`Shelter`].
//!
//! Records without an id or with coordinates outside WGS84 bounds are dropped
//! with a warning rather than failing the whole batch.

use saferoute_core::{Coordinate, Message, Shelter, ShelterSource, Translator};

use crate::types::{PlaceResult, StoredShelterRecord};

/// Normalizes one moderated-store record.
///
/// Returns `None` when the record lacks an id or a valid coordinate.
#[must_use]
pub fn normalize_stored_shelter(
    record: StoredShelterRecord,
    translator: &Translator,
) -> Option<Shelter> {
    let id = non_blank(record.id)?;
    let coordinate = Coordinate::try_new(record.latitude?, record.longitude?).ok()?;
    let description = non_blank(record.description)
        .unwrap_or_else(|| translator.text(Message::UnknownLocation).to_string());

    Some(build_shelter(
        id,
        coordinate,
        description,
        ShelterSource::Moderated,
        translator,
    ))
}

/// Normalizes one places-search result.
///
/// Returns `None` when the result lacks a `place_id` or a valid location.
#[must_use]
pub fn normalize_place(place: PlaceResult, translator: &Translator) -> Option<Shelter> {
    let id = non_blank(place.place_id)?;
    let location = place.geometry?.location?;
    let coordinate = Coordinate::try_new(location.lat, location.lng).ok()?;
    let description = non_blank(place.vicinity)
        .unwrap_or_else(|| translator.text(Message::UnknownLocation).to_string());

    Some(build_shelter(
        id,
        coordinate,
        description,
        ShelterSource::Places,
        translator,
    ))
}

/// Normalizes a batch of moderated records, preserving order.
#[must_use]
pub fn normalize_stored_shelters(
    records: Vec<StoredShelterRecord>,
    translator: &Translator,
) -> Vec<Shelter> {
    let total = records.len();
    let shelters: Vec<Shelter> = records
        .into_iter()
        .filter_map(|record| normalize_stored_shelter(record, translator))
        .collect();
    warn_dropped(ShelterSource::Moderated, total, shelters.len());
    shelters
}

/// Normalizes a batch of place results, preserving order.
#[must_use]
pub fn normalize_places(places: Vec<PlaceResult>, translator: &Translator) -> Vec<Shelter> {
    let total = places.len();
    let shelters: Vec<Shelter> = places
        .into_iter()
        .filter_map(|place| normalize_place(place, translator))
        .collect();
    warn_dropped(ShelterSource::Places, total, shelters.len());
    shelters
}

fn build_shelter(
    id: String,
    coordinate: Coordinate,
    description: String,
    source: ShelterSource,
    translator: &Translator,
) -> Shelter {
    Shelter {
        id,
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        title: Some(translator.text(Message::BombShelter).to_string()),
        description,
        source,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn warn_dropped(source: ShelterSource, total: usize, kept: usize) {
    if kept < total {
        tracing::warn!(
            source = %source,
            dropped = total - kept,
            total,
            "dropped shelter records with missing id or invalid coordinates"
        );
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
