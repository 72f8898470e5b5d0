//! Helpers shared by actor tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix::prelude::*;

use crate::server::events::ServerEvent;

pub type Events = Arc<Mutex<Vec<ServerEvent>>>;

/// Stands in for a websocket: records every event it receives.
struct Collector {
    events: Events,
}

impl Actor for Collector {
    type Context = Context<Self>;
}

impl Handler<ServerEvent> for Collector {
    type Result = ();

    fn handle(&mut self, msg: ServerEvent, _ctx: &mut Self::Context) -> Self::Result {
        if let Ok(mut events) = self.events.lock() {
            events.push(msg);
        }
    }
}

pub fn collector() -> (Recipient<ServerEvent>, Events) {
    let events = Events::default();
    let addr = Collector { events: events.clone() }.start();
    (addr.recipient(), events)
}

/// Let in-flight `do_send`s reach their actors.
pub async fn settle() {
    sleep_ms(50).await;
}

pub async fn sleep_ms(ms: u64) {
    actix::clock::sleep(Duration::from_millis(ms)).await;
}

/// Snapshot of the recorded events.
pub fn drain(events: &Events) -> Vec<ServerEvent> {
    events.lock().map(|mut e| std::mem::take(&mut *e)).unwrap_or_default()
}
