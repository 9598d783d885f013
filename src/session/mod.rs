//! Per-connection stream session.
//!
//! A session moves through `Starting → Active → Closed`. While active it runs
//! one fetch-encode-send cycle immediately, then one per interval tick, until
//! the client disconnects or the server shuts down.
//!
//! Cycles are strictly sequential: the session waits on exactly one of
//! {stop, tick} between cycles and on exactly one of {stop, fetch} inside a
//! cycle. A failed fetch skips the tick; it never ends the session and never
//! writes anything to the client.

mod sink;

pub use sink::{ChannelSink, EventSink, encode_event};

use snafu::prelude::*;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::emit;
use crate::error::{
    CycleError, EncodeSnafu, FetchSnafu, SessionError, SinkClosed, StreamingUnsupportedSnafu,
};
use crate::metrics::events::{
    EncodeFailed, EventDelivered, FetchFailed, SessionClosed, SessionOpened, StreamingUnsupported,
};
use crate::upstream::BreweryFetcher;

/// Lifecycle of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Active,
    /// Terminal.
    Closed,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Cycles started, including ones abandoned by a disconnect.
    pub cycles: u64,
    /// Frames written to the client.
    pub delivered: u64,
    /// Ticks skipped because the fetch or encode failed.
    pub skipped: u64,
}

/// One client's stream.
pub struct StreamSession<F, S> {
    fetcher: F,
    sink: S,
    interval: Duration,
    shutdown: CancellationToken,
    state: SessionState,
    stats: SessionStats,
    opened_at: Instant,
}

impl<F, S> StreamSession<F, S>
where
    F: BreweryFetcher,
    S: EventSink,
{
    /// Start a session over `sink`.
    ///
    /// Fails with `StreamingUnsupported` if the sink cannot flush frames
    /// incrementally; in that case nothing is ever sent.
    pub fn open(
        fetcher: F,
        sink: S,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            fetcher,
            sink,
            interval,
            shutdown,
            state: SessionState::Starting,
            stats: SessionStats::default(),
            opened_at: Instant::now(),
        };

        if !session.sink.supports_flush() {
            session.transition(SessionState::Closed);
            emit!(StreamingUnsupported);
            return StreamingUnsupportedSnafu.fail();
        }

        session.transition(SessionState::Active);
        emit!(SessionOpened);
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session until the client disconnects or shutdown is requested.
    pub async fn run(mut self) -> SessionStats {
        // Ticks are anchored to session start; a slow fetch delays its own
        // send but the cadence never bursts to catch up.
        let mut ticker = interval_at(self.opened_at + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut flow = self.cycle().await;
        while flow.is_continue() {
            tokio::select! {
                biased;

                _ = self.stopped() => break,
                _ = ticker.tick() => {}
            }
            flow = self.cycle().await;
        }

        self.transition(SessionState::Closed);
        emit!(SessionClosed {
            lifetime: self.opened_at.elapsed(),
        });
        info!(
            cycles = self.stats.cycles,
            delivered = self.stats.delivered,
            skipped = self.stats.skipped,
            "Stream session closed"
        );
        self.stats
    }

    /// One fetch-encode-send cycle. `Break` means the session is over.
    async fn cycle(&mut self) -> ControlFlow<()> {
        self.stats.cycles += 1;

        // Fetch first so an attempt is always made, even if the client is
        // already gone by the time it is polled.
        let fetched = tokio::select! {
            biased;

            result = self.fetcher.fetch_one() => result,
            _ = self.stopped() => {
                debug!("Stopped mid-fetch, discarding result");
                return ControlFlow::Break(());
            }
        };

        // `StreamRecord` serializes infallibly today; an encode failure is
        // still treated like a failed fetch.
        let frame = match fetched
            .context(FetchSnafu)
            .and_then(|record| encode_event(&record).context(EncodeSnafu))
        {
            Ok(frame) => frame,
            Err(e) => {
                self.skip_tick(&e);
                return ControlFlow::Continue(());
            }
        };

        if self.shutdown.is_cancelled() || self.sink.is_closed() {
            debug!("Stopped before send, discarding result");
            return ControlFlow::Break(());
        }

        let bytes = frame.len() as u64;
        let sent = tokio::select! {
            biased;

            _ = self.shutdown.cancelled() => Err(SinkClosed),
            result = self.sink.send(frame) => result,
        };

        match sent {
            Ok(()) => {
                self.stats.delivered += 1;
                emit!(EventDelivered { bytes });
                ControlFlow::Continue(())
            }
            Err(SinkClosed) => {
                debug!("Client gone during send");
                ControlFlow::Break(())
            }
        }
    }

    fn skip_tick(&mut self, error: &CycleError) {
        self.stats.skipped += 1;
        match error {
            CycleError::Fetch { source } => emit!(FetchFailed {
                reason: source.kind(),
            }),
            CycleError::Encode { .. } => emit!(EncodeFailed),
        }
        warn!(error = %error, "Skipping tick");
    }

    /// Resolves on client disconnect or server shutdown.
    async fn stopped(&self) {
        tokio::select! {
            _ = self.shutdown.cancelled() => {}
            _ = self.sink.closed() => {}
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }
}
