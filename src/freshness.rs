//! Confirmation flow for element sets too old to propagate reliably.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
pub enum StaleCheck {
    /// Waiting on the user to accept a stale TLE
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

impl StaleCheck {
    pub fn assess(days_since_epoch: f64, max_days: f64) -> Self {
        if days_since_epoch > max_days {
            Self::Pending
        } else {
            Self::Confirmed
        }
    }

    pub fn apply(self, decision: Decision) -> Self {
        match (self, decision) {
            (Self::Pending, Decision::Confirm) => Self::Confirmed,
            (Self::Pending, Decision::Cancel) => Self::Cancelled,
            (settled, _) => settled,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
