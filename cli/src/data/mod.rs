pub mod client;
pub mod labeler;
pub mod poll;
pub mod poller;
pub mod projection;

pub use client::{FetchError, HttpMeterClient, MeterSource};
pub use poll::{DashboardSnapshot, Phase, PollEngine};
pub use poller::{spawn_poller, PollCommand, PollerHandle};
pub use projection::{project, ChartMode, ChartSeries, DisplayRow, Projection};
