//! Request ordering for view-models.
//!
//! A view takes a [`RequestTicket`] before each fetch and hands it back with
//! the result. Only the most recently issued ticket may update the view, so a
//! slow response to an older request never overwrites a newer one.

use tracing::{debug, warn};

use common::errors::{AppError, AppResult};

/// Identifies one fetch issued by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Monotonic per-view request counter.
#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket, superseding every earlier one.
    pub fn next(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    /// Whether `ticket` is the latest one issued.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }
}

/// Remote value held by a view: the last good snapshot and the last error.
#[derive(Debug)]
pub struct Loadable<T> {
    value: Option<T>,
    error: Option<AppError>,
    loading: bool,
    sequence: RequestSequence,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            loading: false,
            sequence: RequestSequence::new(),
        }
    }
}

impl<T> Loadable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a fetch as started and returns its ticket.
    pub fn begin(&mut self) -> RequestTicket {
        self.loading = true;
        self.sequence.next()
    }

    /// Applies a fetch result.
    ///
    /// Stale results are dropped and `false` is returned. A failure keeps the
    /// previous value and records the error.
    pub fn apply(&mut self, ticket: RequestTicket, result: AppResult<T>) -> bool {
        if !self.sequence.is_current(ticket) {
            debug!(?ticket, "discarding stale response");
            return false;
        }

        self.loading = false;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "fetch failed, keeping previous snapshot");
                self.error = Some(e);
            }
        }
        true
    }

    /// Drops the value and error; pending requests are superseded.
    pub fn clear(&mut self) {
        self.value = None;
        self.error = None;
        self.loading = false;
        self.sequence.next();
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    /// Message to display for the last error.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(AppError::display_message)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl Loadable<()> {
    /// Like [`Loadable::apply`] for views that keep the payload elsewhere:
    /// a current successful result is handed back instead of stored.
    pub fn accept<U>(&mut self, ticket: RequestTicket, result: AppResult<U>) -> Option<U> {
        match result {
            Ok(payload) => self.apply(ticket, Ok(())).then_some(payload),
            Err(e) => {
                self.apply(ticket, Err(e));
                None
            }
        }
    }
}
