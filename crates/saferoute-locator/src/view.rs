//! Presentation-side state for nearby-shelter lookups.
//!
//! Lookups may overlap: every lookup is stamped with a [`Generation`] from
//! [`NearbySheltersView::begin`], and only the newest generation may replace
//! the state. Older results arriving late are reported as stale and dropped.

use saferoute_core::Shelter;

use crate::aggregate::{NearbyShelters, SourceReport};
use crate::error::AggregateError;

/// Monotonic stamp for one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale,
}

/// Failure of the latest lookup, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
    pub retryable: bool,
}

impl From<&AggregateError> for LoadError {
    fn from(error: &AggregateError) -> Self {
        Self {
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

#[derive(Debug, Default)]
pub struct NearbySheltersView {
    issued: u64,
    shelters: Vec<Shelter>,
    closest: Option<Shelter>,
    sources: Option<SourceReport>,
    loading: bool,
    error: Option<LoadError>,
    navigation_prompt: Option<Shelter>,
}

impl NearbySheltersView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a lookup and returns its generation. Marks the view as loading.
    pub fn begin(&mut self) -> Generation {
        self.issued += 1;
        self.loading = true;
        Generation(self.issued)
    }

    /// Applies the result of the lookup stamped `generation`.
    ///
    /// Anything but the latest generation is [`ApplyOutcome::Stale`] and leaves
    /// the state untouched. A success replaces shelters, closest, and source
    /// report wholesale and queues a navigation prompt for the closest shelter.
    /// A failure keeps the previous shelters and records the error.
    pub fn apply(
        &mut self,
        generation: Generation,
        result: Result<NearbyShelters, AggregateError>,
    ) -> ApplyOutcome {
        if generation.0 != self.issued {
            tracing::debug!(
                generation = generation.0,
                latest = self.issued,
                "discarding stale shelter lookup"
            );
            return ApplyOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(nearby) => {
                self.navigation_prompt.clone_from(&nearby.closest);
                self.shelters = nearby.shelters;
                self.closest = nearby.closest;
                self.sources = Some(nearby.sources);
                self.error = None;
            }
            Err(error) => {
                self.error = Some(LoadError::from(&error));
                self.navigation_prompt = None;
            }
        }
        ApplyOutcome::Applied
    }

    /// The closest shelter of the last applied result, at most once.
    pub fn take_navigation_prompt(&mut self) -> Option<Shelter> {
        self.navigation_prompt.take()
    }

    #[must_use]
    pub fn shelters(&self) -> &[Shelter] {
        &self.shelters
    }

    #[must_use]
    pub fn closest(&self) -> Option<&Shelter> {
        self.closest.as_ref()
    }

    #[must_use]
    pub fn sources(&self) -> Option<&SourceReport> {
        self.sources.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }
}
