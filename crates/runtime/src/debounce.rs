//! Debounced hover lookups.
//!
//! Every pointer move supersedes the previous one: its pending lookup is
//! aborted and a new one is scheduled after the quiet period. Each scheduled
//! lookup carries the [`Generation`] it was started under and may only apply
//! its result while that generation is still current, so a slow lookup for an
//! old position can never overwrite info for a newer one.

use std::sync::{Arc, Weak};
use std::time::Duration;

use foundation::{GeoPoint, Generation};
use lookup::{PixelAttributes, PointLookup};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Attributes under the pointer's resting position.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    /// Where the pointer was, which may differ from `attributes.point` when the
    /// backend snaps to a pixel centre.
    pub pointer: GeoPoint,
    pub attributes: PixelAttributes,
}

/// Token bookkeeping for hover lookups, free of any timer or task machinery.
#[derive(Debug, Default)]
pub struct HoverTokens {
    current: Generation,
    info: Option<HoverInfo>,
    discarded: u64,
}

impl HoverTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new lookup, superseding every earlier one.
    pub fn begin(&mut self) -> Generation {
        self.current.bump()
    }

    /// Supersedes everything and clears the displayed info.
    pub fn invalidate(&mut self) {
        self.current.bump();
        self.info = None;
    }

    pub fn is_current(&self, token: Generation) -> bool {
        self.current == token
    }

    /// Applies `info` if `token` is still current. Returns whether it applied.
    pub fn apply(&mut self, token: Generation, info: HoverInfo) -> bool {
        if !self.is_current(token) {
            self.discarded += 1;
            return false;
        }
        self.info = Some(info);
        true
    }

    pub fn info(&self) -> Option<&HoverInfo> {
        self.info.as_ref()
    }

    /// Results that arrived after being superseded.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

type Listener = Arc<dyn Fn(Option<&HoverInfo>) + Send + Sync>;

struct Shared {
    tokens: HoverTokens,
    pending: Option<JoinHandle<()>>,
    fired: u64,
    listener: Option<Listener>,
}

/// Turns a high-frequency pointer stream into at most one lookup per quiet
/// window. Must be driven from inside a tokio runtime.
pub struct HoverDebouncer {
    lookup: Arc<dyn PointLookup>,
    quiet: Duration,
    shared: Arc<Mutex<Shared>>,
}

impl HoverDebouncer {
    pub fn new(lookup: Arc<dyn PointLookup>, quiet: Duration) -> Self {
        Self {
            lookup,
            quiet,
            shared: Arc::new(Mutex::new(Shared {
                tokens: HoverTokens::new(),
                pending: None,
                fired: 0,
                listener: None,
            })),
        }
    }

    /// Called with the new hover info (or `None` when cleared) after every
    /// change to what is displayed.
    pub fn set_listener(&self, listener: impl Fn(Option<&HoverInfo>) + Send + Sync + 'static) {
        self.shared.lock().listener = Some(Arc::new(listener));
    }

    pub fn on_pointer_move(&self, pointer: GeoPoint) {
        let mut shared = self.shared.lock();
        let token = shared.tokens.begin();
        if let Some(pending) = shared.pending.take() {
            pending.abort();
        }

        let lookup = Arc::clone(&self.lookup);
        let weak = Arc::downgrade(&self.shared);
        let quiet = self.quiet;
        shared.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            run_lookup(lookup, weak, token, pointer).await;
        }));
    }

    pub fn on_pointer_leave(&self) {
        let listener = {
            let mut shared = self.shared.lock();
            shared.tokens.invalidate();
            if let Some(pending) = shared.pending.take() {
                pending.abort();
            }
            shared.listener.clone()
        };
        if let Some(listener) = listener {
            listener(None);
        }
    }

    /// Waits for the scheduled lookup, if any, to run to completion.
    pub async fn settle(&self) {
        let pending = self.shared.lock().pending.take();
        if let Some(pending) = pending {
            let _ = pending.await;
        }
    }

    pub fn current(&self) -> Option<HoverInfo> {
        self.shared.lock().tokens.info().cloned()
    }

    /// Lookups that survived their quiet period and went to the backend.
    pub fn fired(&self) -> u64 {
        self.shared.lock().fired
    }

    pub fn discarded(&self) -> u64 {
        self.shared.lock().tokens.discarded()
    }
}

impl Drop for HoverDebouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.shared.lock().pending.take() {
            pending.abort();
        }
    }
}

async fn run_lookup(
    lookup: Arc<dyn PointLookup>,
    shared: Weak<Mutex<Shared>>,
    token: Generation,
    pointer: GeoPoint,
) {
    {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let mut shared = shared.lock();
        if !shared.tokens.is_current(token) {
            return;
        }
        shared.fired += 1;
    }

    let result = lookup.try_query_pixel(pointer).await;

    let Some(shared) = shared.upgrade() else {
        return;
    };
    let (info, listener) = {
        let mut shared = shared.lock();
        let attributes = match result {
            Ok(attributes) => attributes,
            // Keep whatever is displayed.
            Err(err) if err.is_out_of_coverage() => {
                debug!("hover at {pointer} is off-raster");
                return;
            }
            Err(err) => {
                warn!("hover lookup at {pointer} failed: {err}");
                return;
            }
        };
        let info = HoverInfo {
            pointer,
            attributes,
        };
        if !shared.tokens.apply(token, info.clone()) {
            debug!("hover result for {pointer} superseded");
            return;
        }
        (info, shared.listener.clone())
    };
    if let Some(listener) = listener {
        listener(Some(&info));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use foundation::GeoPoint;
    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;
    use lookup::{LookupError, PixelAttributes, PointLookup, StatusCode, WeatherSnapshot};
    use parking_lot::Mutex;

    use super::{HoverDebouncer, HoverInfo, HoverTokens};

    #[derive(Default)]
    struct FakeLookup {
        calls: Mutex<Vec<GeoPoint>>,
        delays_ms: HashMap<u64, u64>,
        uncovered_lat: Option<f64>,
    }

    impl FakeLookup {
        fn calls(&self) -> Vec<GeoPoint> {
            self.calls.lock().clone()
        }
    }

    fn attrs(point: GeoPoint) -> PixelAttributes {
        let mut a = PixelAttributes::uncovered(point);
        a.zone = format!("zone@{}", point.lat);
        a
    }

    impl PointLookup for FakeLookup {
        fn try_query_pixel(
            &self,
            point: GeoPoint,
        ) -> BoxFuture<'_, Result<PixelAttributes, LookupError>> {
            self.calls.lock().push(point);
            let delay = self.delays_ms.get(&(point.lat as u64)).copied().unwrap_or(0);
            let uncovered = self.uncovered_lat == Some(point.lat);
            async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                if uncovered {
                    return Err(LookupError::Status(StatusCode::NOT_FOUND));
                }
                Ok(attrs(point))
            }
            .boxed()
        }

        fn query_weather(&self, _point: GeoPoint) -> BoxFuture<'_, Option<WeatherSnapshot>> {
            async { None }.boxed()
        }
    }

    fn p(i: u32) -> GeoPoint {
        GeoPoint::new(f64::from(i), 75.0)
    }

    fn info(i: u32) -> HoverInfo {
        HoverInfo {
            pointer: p(i),
            attributes: attrs(p(i)),
        }
    }

    #[test]
    fn stale_token_cannot_apply() {
        let mut tokens = HoverTokens::new();
        let t3 = tokens.begin();
        let t5 = tokens.begin();
        assert!(tokens.apply(t5, info(5)));
        assert!(!tokens.apply(t3, info(3)));
        assert_eq!(tokens.info(), Some(&info(5)));
        assert_eq!(tokens.discarded(), 1);

        tokens.invalidate();
        assert!(tokens.info().is_none());
        assert!(!tokens.apply(t5, info(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_moves_fires_once_for_last_position() {
        let fake = Arc::new(FakeLookup::default());
        let hover = HoverDebouncer::new(fake.clone(), Duration::from_millis(200));

        for i in 1..=5 {
            hover.on_pointer_move(p(i));
            tokio::time::sleep(Duration::from_millis(40)).await;
        }
        assert!(fake.calls().is_empty());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(fake.calls(), vec![p(5)]);
        assert_eq!(hover.fired(), 1);
        assert_eq!(hover.current(), Some(info(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_for_old_position_never_lands() {
        let mut fake = FakeLookup::default();
        fake.delays_ms.insert(3, 1_000);
        let fake = Arc::new(fake);
        let hover = HoverDebouncer::new(fake.clone(), Duration::from_millis(200));

        hover.on_pointer_move(p(3));
        tokio::time::sleep(Duration::from_millis(250)).await;
        // P3's lookup is in flight now.
        assert_eq!(fake.calls(), vec![p(3)]);

        hover.on_pointer_move(p(5));
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(fake.calls(), vec![p(3), p(5)]);
        assert_eq!(hover.current(), Some(info(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn leave_cancels_pending_and_clears() {
        let fake = Arc::new(FakeLookup::default());
        let hover = HoverDebouncer::new(fake.clone(), Duration::from_millis(200));
        let notified = Arc::new(Mutex::new(Vec::new()));
        let sink = notified.clone();
        hover.set_listener(move |info| sink.lock().push(info.map(|i| i.pointer)));

        hover.on_pointer_move(p(1));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(hover.current().is_some());

        hover.on_pointer_move(p(2));
        hover.on_pointer_leave();
        assert!(hover.current().is_none());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(hover.current().is_none());
        assert_eq!(fake.calls(), vec![p(1)]);
        assert_eq!(*notified.lock(), vec![Some(p(1)), None]);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_waits_for_scheduled_lookup() {
        let fake = Arc::new(FakeLookup::default());
        let hover = HoverDebouncer::new(fake.clone(), Duration::from_millis(200));
        hover.settle().await;

        hover.on_pointer_move(p(4));
        hover.settle().await;
        assert_eq!(hover.current(), Some(info(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_keeps_previous_info() {
        let fake = Arc::new(FakeLookup {
            uncovered_lat: Some(9.0),
            ..FakeLookup::default()
        });
        let hover = HoverDebouncer::new(fake.clone(), Duration::from_millis(200));

        hover.on_pointer_move(p(1));
        tokio::time::sleep(Duration::from_millis(300)).await;
        hover.on_pointer_move(p(9));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(fake.calls(), vec![p(1), p(9)]);
        assert_eq!(hover.current(), Some(info(1)));
    }
}
