//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: view-model state machine
//! - [`Bridge`]: session bridge to the controller
//! - [`Driver`]: platform-specific I/O
//!
//! Everything runs on one logical task: input, backend completions and
//! ticks interleave cooperatively, so no session state ever needs a lock.

use std::{ops::Sub, time::Duration};

use parlor_core::Environment;

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Pause between idle cycles, keeping the tick cadence well under the
/// controller's poll intervals without spinning.
const IDLE_PACING: Duration = Duration::from_millis(50);

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time and pacing
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
    env: E,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
    E::Instant: Sub<Output = Duration>,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(driver: D, env: E) -> Self {
        let app = App::new();
        let bridge = Bridge::new(env.clone());
        Self { driver, app, bridge, env }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Polls for input from the driver
    /// 2. Drains completed backend responses
    /// 3. Ticks the controller for due polls
    /// 4. Flushes outgoing backend requests through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        let events = self.bridge.start();
        let quit = self.process_events(events).await?;
        self.flush_backend().await?;

        if !quit {
            loop {
                if self.process_cycle().await? {
                    break;
                }
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_event(&mut self.app).await?;
        if !actions.is_empty() && self.process_actions(actions).await? {
            return Ok(true);
        }

        while let Some(response) = self.driver.poll_response() {
            let events = self.bridge.handle_response(response);
            if self.process_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        if self.process_events(events).await? {
            return Ok(true);
        }

        self.flush_backend().await?;
        self.env.sleep(IDLE_PACING).await;
        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Notify => {
                        if let Err(e) = self.driver.notify() {
                            tracing::warn!("notification playback failed: {:?}", e);
                        }
                    },

                    // Session operations go through the bridge
                    action @ (AppAction::CreateRoom { .. }
                    | AppAction::JoinRoom { .. }
                    | AppAction::SubmitRoomPassword { .. }
                    | AppAction::CancelJoin
                    | AppAction::SendMessage { .. }
                    | AppAction::SubmitWritePassword { .. }
                    | AppAction::SetUsername { .. }) => {
                        let events = self.bridge.process_app_action(action);
                        for event in events {
                            let new_actions = self.app.handle(event);
                            pending_actions.extend(new_actions);
                        }
                        self.flush_backend().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Send all pending backend requests through the driver.
    async fn flush_backend(&mut self) -> Result<(), D::Error> {
        for request in self.bridge.take_outgoing() {
            self.driver.submit_request(request).await?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
