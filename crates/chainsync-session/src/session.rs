//! Chain-sync session state machine.
//!
//! A [`Session`] owns at most one transport handle, remembers the last
//! point it handed to the consumer, and re-establishes the handle at that
//! point when the transport fails mid-stream.
//!
//! ```text
//! Disconnected --connect--> Connected --intersect--> Intersecting --> Connected
//!                               |
//!                          start_stream
//!                               v
//!                           Streaming <--------------------+
//!                               |  transport error          | resumed
//!                               v                           |
//!                          Reconnecting --------------------+
//!                               |  disabled / exhausted
//!                               v
//!                            Stopped --disconnect--> Disconnected
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use chainsync_core::{
    decode_block, decode_header, decode_point, decode_utxo, Block, BlockRecord, HeaderRecord,
    NetworkMagic, Point, PointRecord, UtxoRecord, Utxo, WireRecord,
};

use crate::config::{Backoff, SessionConfig};
use crate::error::{Result, SessionError, TransportError};
use crate::messages::{Endpoint, NextResponse, RawEvent, Role, SessionEvent, Target};
use crate::stream::ChainSyncStream;
use crate::transport::{Connector, Transport};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Intersecting,
    Streaming,
    Reconnecting,
    Stopped,
}

/// Cooperative cancellation flag for a running stream.
///
/// Checked between pulls. A pull already waiting on the transport runs to
/// completion first.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request the stream to end. Idempotent.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A chain-sync session over one node connection.
pub struct Session<C: Connector> {
    connector: C,
    config: SessionConfig,
    /// Stored on connect; reused verbatim for every reconnect.
    endpoint: Option<Endpoint>,
    handle: Option<C::Handle>,
    state: SessionState,
    /// Last point yielded to the consumer (or recorded by intersect).
    last_point: Option<Point>,
    /// Tip reported when the current lifecycle connected.
    connect_tip: Option<Point>,
    /// Recoveries since a pull last succeeded.
    stalled_recoveries: u32,
    reconnect_enabled: bool,
    stop: StopHandle,
    notifications: broadcast::Sender<SessionEvent>,
}

impl<C: Connector> Session<C> {
    /// Create a disconnected session.
    pub fn new(connector: C, config: SessionConfig) -> Self {
        let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
        Self {
            connector,
            reconnect_enabled: config.reconnect.enabled,
            config,
            endpoint: None,
            handle: None,
            state: SessionState::Disconnected,
            last_point: None,
            connect_tip: None,
            stalled_recoveries: 0,
            stop: StopHandle::default(),
            notifications,
        }
    }

    /// Receive [`SessionEvent`] notifications from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.notifications.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_syncing(&self) -> bool {
        matches!(
            self.state,
            SessionState::Streaming | SessionState::Reconnecting
        )
    }

    /// The point a reconnect would resume from.
    pub fn last_point(&self) -> Option<Point> {
        self.last_point
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn reconnect_enabled(&self) -> bool {
        self.reconnect_enabled
    }

    /// Turn the reconnect protocol on or off. Takes effect at the next
    /// transport failure.
    pub fn set_reconnect(&mut self, enabled: bool) {
        self.reconnect_enabled = enabled;
    }

    /// A handle that can stop a running stream from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Connect to a node and return its current tip.
    ///
    /// Starts a fresh lifecycle: any previous handle is released and the
    /// resume position is forgotten.
    pub async fn connect(&mut self, target: Target, magic: NetworkMagic, role: Role) -> Result<Point> {
        self.release_handle().await;
        self.state = SessionState::Disconnected;

        let endpoint = Endpoint { target, magic, role };
        let (handle, tip) = self.open_handle(&endpoint).await?;
        info!(node = %endpoint.target, %magic, ?role, tip = %tip, "connected to node");

        self.handle = Some(handle);
        self.endpoint = Some(endpoint);
        self.state = SessionState::Connected;
        self.last_point = None;
        self.connect_tip = Some(tip);
        self.stalled_recoveries = 0;
        self.stop.reset();
        Ok(tip)
    }

    /// The node's current tip.
    pub async fn tip(&mut self) -> Result<Point> {
        let handle = self.handle.as_mut().ok_or(SessionError::NotConnected)?;
        Ok(handle.tip().await?)
    }

    /// Find the first candidate the node has on its chain and resume from it.
    ///
    /// Returns `Ok(None)` without asking the node when `candidates` is empty.
    pub async fn intersect(&mut self, candidates: &[Point]) -> Result<Option<Point>> {
        if self.handle.is_none() {
            return Err(SessionError::NotConnected);
        }
        if candidates.is_empty() {
            return Ok(None);
        }

        let previous = self.state;
        self.state = SessionState::Intersecting;
        let result = match self.handle.as_mut() {
            Some(handle) => handle.find_intersection(candidates).await,
            None => Err(TransportError::Closed),
        };
        self.state = previous;

        match result? {
            Some(point) => {
                info!(point = %point, "intersection found");
                self.last_point = Some(point);
                Ok(Some(point))
            }
            None => Err(SessionError::NotFound(format!(
                "no intersection among {} candidate(s)",
                candidates.len()
            ))),
        }
    }

    /// Start streaming chain-sync events.
    ///
    /// Intersects first when `candidates` is non-empty. With no candidates
    /// and no earlier position, the stream starts at the tip reported by
    /// [`Session::connect`].
    pub async fn start_stream(&mut self, candidates: &[Point]) -> Result<ChainSyncStream<'_, C>> {
        if self.handle.is_none() {
            return Err(SessionError::NotConnected);
        }
        if !candidates.is_empty() {
            self.intersect(candidates).await?;
        } else if self.last_point.is_none() {
            self.last_point = self.connect_tip;
        }

        self.stop.reset();
        self.stalled_recoveries = 0;
        self.state = SessionState::Streaming;
        debug!(from = ?self.last_point, "chain sync started");
        Ok(ChainSyncStream::new(self))
    }

    /// Ask a running stream to end after its current pull. Idempotent.
    pub fn stop_sync(&mut self) {
        self.stop.stop();
        if self.state == SessionState::Streaming {
            self.state = SessionState::Stopped;
        }
    }

    /// Release the transport handle.
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.handle.is_none() {
            return Err(SessionError::NotConnected);
        }
        self.stop.stop();
        self.release_handle().await;
        self.state = SessionState::Disconnected;
        info!("disconnected from node");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // One-shot queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch and decode the block at `point`.
    pub async fn fetch_block_at(&mut self, point: &Point) -> Result<Block> {
        let handle = self.handle.as_mut().ok_or(SessionError::NotConnected)?;
        let bytes = handle
            .fetch_block(point)
            .await?
            .ok_or_else(|| SessionError::NotFound(format!("block at {}", point)))?;
        let record = BlockRecord::from_cbor(&bytes)?;
        Ok(decode_block(&record))
    }

    /// Fetch and decode the UTXO set held by `address`.
    pub async fn fetch_utxos_for(&mut self, address: &str) -> Result<Vec<Utxo>> {
        let handle = self.handle.as_mut().ok_or(SessionError::NotConnected)?;
        let entries = handle.fetch_utxos(address).await?;
        if entries.is_empty() {
            return Err(SessionError::NotFound(format!("utxos for {}", address)));
        }
        entries
            .iter()
            .map(|bytes| Ok(decode_utxo(&UtxoRecord::from_cbor(bytes)?)))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Streaming internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Pull and decode one event. Any `Err` is a transport fault.
    ///
    /// The resume position moves only after the event fully decoded, and
    /// before it is handed to the consumer.
    pub(crate) async fn pull(&mut self) -> Result<NextResponse> {
        let role = self
            .endpoint
            .as_ref()
            .map(|e| e.role)
            .ok_or(SessionError::NotConnected)?;
        let handle = self.handle.as_mut().ok_or(SessionError::NotConnected)?;

        let response = match handle.next_event().await {
            RawEvent::Await => {
                debug!("awaiting new blocks");
                self.stalled_recoveries = 0;
                return Ok(NextResponse::Await);
            }
            RawEvent::Error(e) => return Err(e.into()),
            RawEvent::RollForward { tip, payload } => {
                let (block_cbor, announced) = match role {
                    Role::ClientLocal => (payload.to_vec(), None),
                    Role::PeerToPeer => {
                        let point = decode_header(&HeaderRecord::from_cbor(&payload)?);
                        let body = handle.fetch_block(&point).await?.ok_or_else(|| {
                            TransportError::Protocol(format!(
                                "announced block {} could not be fetched",
                                point
                            ))
                        })?;
                        (body.to_vec(), Some(point))
                    }
                };
                let block = decode_block(&BlockRecord::from_cbor(&block_cbor)?);
                if let Some(point) = announced.filter(|p| *p != block.point()) {
                    return Err(TransportError::Protocol(format!(
                        "fetched block {} does not match header {}",
                        block.point(),
                        point
                    ))
                    .into());
                }
                debug!(slot = block.slot, number = block.number, "roll forward");
                NextResponse::RollForward {
                    tip,
                    block,
                    block_cbor,
                }
            }
            RawEvent::RollBack { tip, payload } => {
                let point = decode_point(&PointRecord::from_cbor(&payload)?);
                debug!(point = %point, "roll back");
                NextResponse::RollBack { tip, point }
            }
        };

        self.last_point = response.point();
        self.stalled_recoveries = 0;
        Ok(response)
    }

    /// Run the reconnect protocol after a transport fault.
    ///
    /// Returns `true` when streaming can resume on a fresh handle. On
    /// `false` the session is stopped and a disconnect was announced.
    ///
    /// `max_attempts` also caps back-to-back recoveries with no successful
    /// pull between them.
    pub(crate) async fn recover(&mut self, cause: SessionError) -> bool {
        warn!(error = %cause, last_point = ?self.last_point, "transport failure during chain sync");
        self.release_handle().await;

        if !self.reconnect_enabled {
            return self.give_up(format!("transport failed: {}", cause));
        }
        let endpoint = match self.endpoint.clone() {
            Some(endpoint) => endpoint,
            None => return self.give_up("no endpoint to reconnect to".into()),
        };

        let policy = self.config.reconnect.clone();
        self.stalled_recoveries = self.stalled_recoveries.saturating_add(1);
        if let Some(max) = policy.max_attempts.filter(|max| self.stalled_recoveries > *max) {
            return self.give_up(format!(
                "no event delivered after {} consecutive reconnects",
                max
            ));
        }

        self.state = SessionState::Reconnecting;
        let mut backoff = Backoff::new(&policy);
        let mut attempts = 0u32;
        let resume = self.last_point;

        loop {
            if self.stop.is_stopped() {
                return self.give_up("stopped while reconnecting".into());
            }
            if policy.max_attempts.is_some_and(|max| attempts >= max) {
                return self.give_up(format!("gave up after {} reconnect attempts", attempts));
            }
            attempts += 1;

            let delay = backoff.next_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let (mut handle, _tip) = match self.open_handle(&endpoint).await {
                Ok(opened) => opened,
                Err(e) => {
                    warn!(attempt = attempts, error = %e, "reconnect attempt failed");
                    continue;
                }
            };

            if let Some(point) = resume {
                match handle.find_intersection(&[point]).await {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        release(&mut handle).await;
                        return self.give_up(format!("resume point {} is no longer on chain", point));
                    }
                    Err(e) => {
                        warn!(attempt = attempts, error = %e, "re-intersection failed");
                        release(&mut handle).await;
                        continue;
                    }
                }
            }

            self.handle = Some(handle);
            self.state = SessionState::Streaming;
            info!(attempts, resumed_at = ?resume, "reconnected to node");
            self.notify(SessionEvent::Reconnected {
                resumed_at: resume,
                attempts,
            });
            return true;
        }
    }

    /// Mark the stream finished after a stop request or when it is dropped.
    pub(crate) fn finish_stream(&mut self) {
        if matches!(
            self.state,
            SessionState::Streaming | SessionState::Reconnecting
        ) {
            self.state = SessionState::Stopped;
        }
        debug!(last_point = ?self.last_point, "chain sync stopped");
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.is_stopped()
    }

    fn give_up(&mut self, reason: String) -> bool {
        warn!(%reason, "chain sync disconnected");
        self.state = SessionState::Stopped;
        self.notify(SessionEvent::Disconnected { reason });
        false
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.notifications.send(event);
    }

    async fn open_handle(&self, endpoint: &Endpoint) -> Result<(C::Handle, Point)> {
        let connect = self
            .connector
            .connect(&endpoint.target, endpoint.magic, endpoint.role);
        let mut handle = match tokio::time::timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => return Err(SessionError::Connection(e)),
            Err(_) => {
                return Err(SessionError::Connection(TransportError::Timeout(format!(
                    "no handshake within {:?} from {}",
                    self.config.connect_timeout, endpoint.target
                ))))
            }
        };

        match handle.tip().await {
            Ok(tip) => Ok((handle, tip)),
            Err(e) => {
                release(&mut handle).await;
                Err(SessionError::Connection(e))
            }
        }
    }

    async fn release_handle(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            release(&mut handle).await;
        }
    }
}

async fn release<T: Transport>(handle: &mut T) {
    if let Err(e) = handle.disconnect().await {
        debug!(error = %e, "error while closing transport handle");
    }
}
