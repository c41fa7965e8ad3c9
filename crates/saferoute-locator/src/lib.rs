//! Nearby-shelter lookup: HTTP clients for the moderated shelter store, the
//! places search, and reverse geocoding, plus the aggregation pipeline that
//! merges, deduplicates, and ranks their results.

pub mod aggregate;
pub mod error;
pub mod geocode;
mod http;
pub mod normalize;
pub mod places;
pub mod store;
pub mod types;
pub mod view;

pub use aggregate::{
    AggregatorSettings, NearbyQuery, NearbyShelters, ShelterAggregator, SourceReport, SourceStatus,
};
pub use error::{AggregateError, LocatorError};
pub use geocode::GeocodeClient;
pub use places::PlacesClient;
pub use store::{ShelterStoreClient, ShelterSubmission};
pub use types::{PlaceResult, StoredShelterRecord, SubmissionReceipt};
pub use view::{ApplyOutcome, Generation, LoadError, NearbySheltersView};
