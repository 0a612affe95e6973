//! Reconciliation gate shared by the poll timer and the change bus.
//!
//! Both refresh sources funnel through one pending flag, so triggers that
//! arrive while a reload is running coalesce into at most one follow-up
//! reload instead of overlapping.

#[derive(Debug, Default)]
pub struct Reconciler {
    pending: bool,
    in_flight: bool,
}

impl Reconciler {
    pub fn request(&mut self) {
        self.pending = true;
    }

    /// Claim the next reload. Returns false while a reload is in flight or
    /// nothing was requested.
    pub fn begin(&mut self) -> bool {
        if self.in_flight || !self.pending {
            return false;
        }
        self.pending = false;
        self.in_flight = true;
        true
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
