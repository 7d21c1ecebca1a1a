//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific
//! I/O implementations. Each frontend implements the trait to provide
//! platform-specific input, rendering, notification playback and backend
//! dispatch, while the generic [`crate::Runtime`] handles orchestration.
//!
//! Rendering strategy, DOM/widget structure and sound mechanics live
//! entirely behind this seam; the state machines never see them.

use std::{future::Future, ops::Sub, time::Duration};

use parlor_client::{BackendRequest, BackendResponse};

use crate::{App, AppAction};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production and in simulation.
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for user input, translated into App actions.
    ///
    /// Returns an empty vector when no input is ready; the runtime keeps
    /// cycling. Implementations should not block longer than their input
    /// poll granularity.
    fn poll_event(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Dispatch a backend request.
    ///
    /// # Errors
    ///
    /// Returns an error only for driver-level failures (a closed dispatch
    /// channel). Backend failures travel inside the eventual
    /// [`BackendResponse`].
    fn submit_request(
        &mut self,
        request: BackendRequest,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Take the next completed backend response, if any. Non-blocking.
    fn poll_response(&mut self) -> Option<BackendResponse>;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Play the new-message notification.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails; the runtime logs and carries
    /// on, since a missed sound must never take the session down.
    fn notify(&mut self) -> Result<(), Self::Error>;

    /// Stop the driver and clean up resources.
    fn stop(&mut self);
}
