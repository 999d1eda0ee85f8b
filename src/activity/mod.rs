//! Activity log, project events and the public project feed.
//!
//! Services publish [`ProjectEvent`]s on an [`EventBus`]. Listeners are
//! registered explicitly at startup; the [`ActivityRecorder`] turns events
//! into append-only [`Action`] rows.

pub mod adapters;
pub mod domain;
pub mod events;
pub mod feed;
pub mod ports;
pub mod recorder;

pub use domain::{
    Action, ActionId, ActionTarget, ActionVerb, ParseActionError, PersistedActionData,
    TargetKind,
};
pub use events::{EventBus, EventListener, ListenerError, ProjectEvent};
pub use feed::{FeedChannel, FeedError, render_project_feed};
pub use ports::{ActionRepository, ActionRepositoryError, ActionRepositoryResult};
pub use recorder::ActivityRecorder;
