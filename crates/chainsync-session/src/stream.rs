//! The chain-sync event stream.

use chainsync_core::Point;

use crate::messages::NextResponse;
use crate::session::{Session, StopHandle};
use crate::transport::Connector;

/// Pull-based stream of decoded chain-sync events.
///
/// Borrows the session for its lifetime. Transport failures never surface
/// as items: they are absorbed by the reconnect protocol, or end the stream
/// when it is disabled or exhausted. Dropping the stream leaves the session
/// `Stopped`; the connection stays open for another `start_stream`.
pub struct ChainSyncStream<'a, C: Connector> {
    session: &'a mut Session<C>,
    finished: bool,
}

impl<'a, C: Connector> ChainSyncStream<'a, C> {
    pub(crate) fn new(session: &'a mut Session<C>) -> Self {
        Self {
            session,
            finished: false,
        }
    }

    /// The next event, or `None` once the stream has ended.
    ///
    /// After a successful reconnect the first item is the event following
    /// the last one returned here.
    pub async fn next(&mut self) -> Option<NextResponse> {
        loop {
            if self.finished {
                return None;
            }
            if self.session.stop_requested() {
                self.session.finish_stream();
                self.finished = true;
                return None;
            }

            match self.session.pull().await {
                Ok(response) => return Some(response),
                Err(e) => {
                    if !self.session.recover(e).await {
                        self.finished = true;
                    }
                }
            }
        }
    }

    /// End the stream after the current pull.
    pub fn stop(&self) {
        self.session.stop_handle().stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.session.stop_handle()
    }

    /// The point a reconnect would resume from.
    pub fn last_point(&self) -> Option<Point> {
        self.session.last_point()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<C: Connector> Drop for ChainSyncStream<'_, C> {
    fn drop(&mut self) {
        if !self.finished {
            self.session.finish_stream();
        }
    }
}
