use std::sync::Arc;

use kfp::SubmitPipeline;
use slack::SlackClient;

use crate::logic::notify::Notify;
use crate::logic::routing::RoutingTable;

/// Immutable per-process state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RoutingTable>,
    pub slack: Arc<SlackClient>,
    pub submitter: Arc<dyn SubmitPipeline>,
    pub notifier: Arc<dyn Notify>,
}
