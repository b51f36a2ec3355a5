pub mod actions;
pub mod analyzer;
pub mod calculator;
pub mod clock;
pub mod fetcher;
pub mod gate;
pub mod matcher;
pub mod processor;
pub mod random;
pub mod registry;
pub mod scheduler;
pub mod simulator;
pub mod sink;
pub mod synchronizer;

pub use actions::{Action, ActionReport, ActionRunner, Mutator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use fetcher::{Fetcher, FetcherSet};
pub use sink::NotificationSink;
pub use synchronizer::{
    Dispatch, FetchHandle, FetchOutcome, ResourceStatus, SyncOptions, Synchronizer, TickReport,
};
