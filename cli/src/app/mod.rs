//! Application core module.
//!
//! The main App struct ties the poller to the rendering loop: it holds
//! the latest published snapshot and forwards user actions to the
//! poller as commands. All poll-state mutation happens on the poller
//! thread; the App only reads snapshots.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use tracing::info;

use crate::config::UserConfig;
use crate::data::{spawn_poller, DashboardSnapshot, HttpMeterClient, MeterSource, PollerHandle};

pub use types::{Action, AppView};

pub struct App {
    pub config: UserConfig,
    pub view: AppView,
    pub snapshot: DashboardSnapshot,
    poller: PollerHandle,
}

impl App {
    /// Spawns the poller against the configured endpoint and waits for
    /// snapshots. The first fetch is issued immediately on startup.
    pub fn new(config: UserConfig) -> Result<Self> {
        info!(
            endpoint = %config.endpoint,
            granularity = %config.granularity,
            interval_secs = config.poll_interval_secs,
            "Initializing app"
        );

        let source: Arc<dyn MeterSource> = Arc::new(HttpMeterClient::new(&config.endpoint));
        let poller = spawn_poller(
            source,
            config.granularity,
            Duration::from_secs(config.poll_interval_secs),
        )?;
        let snapshot = poller.snapshot();

        Ok(Self {
            config,
            view: AppView::Main,
            snapshot,
            poller,
        })
    }

    /// Pulls the latest snapshot if the poller published a new one.
    /// Returns `true` when the UI should be redrawn.
    pub fn tick(&mut self) -> bool {
        if let Some(snapshot) = self.poller.try_update() {
            self.snapshot = snapshot;
            return true;
        }
        false
    }

    /// Applies a user action. Returns `false` when the app should quit.
    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::ToggleHelp => {
                self.view = match self.view {
                    AppView::Help => AppView::Main,
                    AppView::Main => AppView::Help,
                };
            }
            Action::NextGranularity => self.poller.select(self.snapshot.granularity.next()),
            Action::PrevGranularity => self.poller.select(self.snapshot.granularity.prev()),
            Action::SetGranularity(g) => self.poller.select(g),
            Action::Refresh => self.poller.refresh(),
            Action::None => {}
        }
        true
    }
}
