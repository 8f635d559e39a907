//! Bounded re-authentication.
//!
//! A Helix call may refresh its credential once. The bound is carried by the
//! state itself: there is no transition out of [`AuthAttempt::RetriedOnce`].

/// Where a request stands with respect to credential refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthAttempt {
    /// First attempt with the current credential.
    #[default]
    Fresh,
    /// The credential was refreshed and the request re-issued.
    RetriedOnce,
}

impl AuthAttempt {
    /// Transition on a 401.
    ///
    /// Returns the next state if a refresh and retry is allowed, `None` if
    /// the 401 must propagate.
    pub fn after_unauthorized(self) -> Option<Self> {
        match self {
            Self::Fresh => Some(Self::RetriedOnce),
            Self::RetriedOnce => None,
        }
    }

    /// Returns true once the request has been re-issued.
    pub fn is_retry(self) -> bool {
        self == Self::RetriedOnce
    }
}
