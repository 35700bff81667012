//! Drives a `ConversionState` from timer ticks, fetch completions and user actions

use crate::core::currency::{Currency, CurrencyPair};
use crate::core::rate::{FetchError, RateFetcher, RateSnapshot};
use crate::core::refresh::RefreshTimer;
use crate::core::state::ConversionState;
use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

/// Default period between automatic refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    SelectSource(Currency),
    SelectDestination(Currency),
    EditAmount(String),
    Convert,
}

#[derive(Debug)]
pub enum Event {
    Tick {
        generation: u64,
    },
    Fetched {
        seq: u64,
        result: Result<RateSnapshot, FetchError>,
    },
}

/// Owns the state machine and the refresh timer for one converter instance.
///
/// All mutation happens through `&mut self`; background tasks only send
/// events back over the channel.
pub struct Controller {
    fetcher: Arc<dyn RateFetcher>,
    state: ConversionState,
    interval: Duration,
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
    timer: Option<RefreshTimer>,
    timer_generation: u64,
}

impl Controller {
    pub fn new(fetcher: Arc<dyn RateFetcher>, pair: CurrencyPair, interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            state: ConversionState::new(pair),
            interval,
            tx,
            rx,
            timer: None,
            timer_generation: 0,
        }
    }

    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Starts the refresh cycle for the current pair.
    pub fn activate(&mut self) {
        info!(pair = %self.state.pair(), interval = ?self.interval, "Activating converter");
        self.restart_cycle();
    }

    /// Stops the refresh timer. In-flight fetches still complete.
    pub fn deactivate(&mut self) {
        self.timer = None;
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Applies one event. Returns `true` when the visible state changed.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Tick { generation } => {
                if self.timer.as_ref().map(RefreshTimer::generation) != Some(generation) {
                    debug!(generation, "Ignoring tick from a stopped timer");
                    return false;
                }
                self.spawn_fetch();
                false
            }
            Event::Fetched { seq, result } => self.state.apply_fetch(seq, result),
        }
    }

    /// Applies a user action. Conversion failures leave the displayed
    /// value untouched and are returned to the caller.
    pub fn handle_action(&mut self, action: UserAction) -> Result<bool> {
        match action {
            UserAction::SelectSource(source) => {
                let changed = self.state.select_source(source)?;
                self.on_pair_selected(changed);
                Ok(changed)
            }
            UserAction::SelectDestination(destination) => {
                let changed = self.state.select_destination(destination)?;
                self.on_pair_selected(changed);
                Ok(changed)
            }
            UserAction::EditAmount(text) => {
                self.state.set_amount(&text);
                Ok(true)
            }
            UserAction::Convert => self
                .state
                .convert()
                .map(|_| true)
                .map_err(|e| anyhow!(e)),
        }
    }

    fn on_pair_selected(&mut self, changed: bool) {
        if changed && self.is_active() {
            self.restart_cycle();
        }
    }

    fn restart_cycle(&mut self) {
        // Tear down the old timer before its replacement starts ticking.
        self.timer = None;
        self.timer_generation += 1;
        self.timer = Some(RefreshTimer::start(
            self.timer_generation,
            self.interval,
            self.tx.clone(),
            |generation| Event::Tick { generation },
        ));
        self.spawn_fetch();
    }

    fn spawn_fetch(&mut self) {
        let seq = self.state.begin_fetch();
        let pair = self.state.pair();
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        debug!(seq, %pair, "Issuing rate fetch");
        tokio::spawn(async move {
            let result = fetcher.fetch(&pair).await;
            // The controller may be gone; nothing left to update then.
            let _ = tx.send(Event::Fetched { seq, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{FETCH_ERROR_MESSAGE, RateStatus};
    use async_trait::async_trait;
    use chrono::Local;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct MockFetcher {
        rates: HashMap<CurrencyPair, f64>,
        delays: Mutex<Vec<Duration>>,
        calls: Mutex<Vec<(CurrencyPair, Instant)>>,
    }

    impl MockFetcher {
        fn with_rate(mut self, source: Currency, destination: Currency, rate: f64) -> Self {
            self.rates
                .insert(CurrencyPair::new(source, destination).unwrap(), rate);
            self
        }

        fn with_delays(self, delays: Vec<Duration>) -> Self {
            *self.delays.lock().unwrap() = delays;
            self
        }

        fn calls(&self) -> Vec<(CurrencyPair, Instant)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RateFetcher for MockFetcher {
        async fn fetch(&self, pair: &CurrencyPair) -> Result<RateSnapshot, FetchError> {
            self.calls.lock().unwrap().push((*pair, Instant::now()));
            let delay = {
                let mut delays = self.delays.lock().unwrap();
                if delays.is_empty() {
                    Duration::ZERO
                } else {
                    delays.remove(0)
                }
            };
            tokio::time::sleep(delay).await;
            match self.rates.get(pair) {
                Some(rate) => Ok(RateSnapshot::new(*pair, *rate, Local::now())),
                None => Err(FetchError::Transport("HTTP error: 500".into())),
            }
        }
    }

    fn usd_brl() -> CurrencyPair {
        CurrencyPair::new(Currency::Usd, Currency::Brl).unwrap()
    }

    async fn pump_until_fetched(controller: &mut Controller) -> bool {
        loop {
            match controller.next_event().await {
                Some(event @ Event::Fetched { .. }) => return controller.handle_event(event),
                Some(event) => {
                    controller.handle_event(event);
                }
                None => panic!("event channel closed"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_activation_fetches_immediately() {
        let fetcher = Arc::new(MockFetcher::default().with_rate(Currency::Usd, Currency::Brl, 5.2317));
        let mut controller =
            Controller::new(fetcher.clone(), usd_brl(), DEFAULT_REFRESH_INTERVAL);
        assert_eq!(controller.state().status(), &RateStatus::Loading);

        let started = Instant::now();
        controller.activate();
        assert!(pump_until_fetched(&mut controller).await);

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(controller.state().display_rate(), "5.2317");
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_refreshes_every_interval() {
        let fetcher = Arc::new(MockFetcher::default().with_rate(Currency::Usd, Currency::Brl, 5.0));
        let mut controller =
            Controller::new(fetcher.clone(), usd_brl(), DEFAULT_REFRESH_INTERVAL);
        let started = Instant::now();
        controller.activate();

        for _ in 0..3 {
            pump_until_fetched(&mut controller).await;
        }

        let offsets: Vec<Duration> = fetcher
            .calls()
            .iter()
            .map(|(_, at)| at.duration_since(started))
            .collect();
        assert_eq!(
            offsets,
            vec![Duration::ZERO, Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_sets_error() {
        let fetcher = Arc::new(MockFetcher::default());
        let mut controller = Controller::new(fetcher, usd_brl(), DEFAULT_REFRESH_INTERVAL);
        controller.activate();
        pump_until_fetched(&mut controller).await;

        assert_eq!(
            controller.state().status(),
            &RateStatus::Error(FETCH_ERROR_MESSAGE.to_string())
        );
        assert_eq!(controller.state().display_rate(), "N/A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pair_change_restarts_cycle() {
        let fetcher = Arc::new(
            MockFetcher::default()
                .with_rate(Currency::Usd, Currency::Brl, 5.0)
                .with_rate(Currency::Eur, Currency::Brl, 6.0),
        );
        let mut controller =
            Controller::new(fetcher.clone(), usd_brl(), DEFAULT_REFRESH_INTERVAL);
        let started = Instant::now();
        controller.activate();
        pump_until_fetched(&mut controller).await;

        // Mid-cycle: a tick for the old pair is due at 2s.
        tokio::time::advance(Duration::from_millis(1500)).await;
        controller
            .handle_action(UserAction::SelectSource(Currency::Eur))
            .unwrap();
        assert_eq!(controller.state().status(), &RateStatus::Loading);

        pump_until_fetched(&mut controller).await;
        pump_until_fetched(&mut controller).await;

        let calls = fetcher.calls();
        let eur_brl = CurrencyPair::new(Currency::Eur, Currency::Brl).unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, usd_brl());
        assert_eq!(calls[1], (eur_brl, started + Duration::from_millis(1500)));
        assert_eq!(calls[2], (eur_brl, started + Duration::from_millis(3500)));
        assert_eq!(controller.state().display_rate(), "6.0000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_tick_is_ignored() {
        let fetcher = Arc::new(MockFetcher::default().with_rate(Currency::Usd, Currency::Brl, 5.0));
        let mut controller =
            Controller::new(fetcher.clone(), usd_brl(), DEFAULT_REFRESH_INTERVAL);
        controller.activate();
        pump_until_fetched(&mut controller).await;

        assert!(!controller.handle_event(Event::Tick { generation: 0 }));
        tokio::task::yield_now().await;
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_loses_to_newer() {
        // First fetch hangs for 3s, the tick-driven second one answers at once.
        let fetcher = Arc::new(
            MockFetcher::default()
                .with_rate(Currency::Usd, Currency::Brl, 5.0)
                .with_delays(vec![Duration::from_secs(3)]),
        );
        let mut controller =
            Controller::new(fetcher.clone(), usd_brl(), DEFAULT_REFRESH_INTERVAL);
        controller.activate();

        assert!(pump_until_fetched(&mut controller).await);
        let fresh = controller.state().snapshot().unwrap().clone();

        // The slow first completion arrives afterwards and is dropped.
        assert!(!pump_until_fetched(&mut controller).await);
        assert_eq!(controller.state().snapshot(), Some(&fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_convert_through_actions() {
        let fetcher = Arc::new(MockFetcher::default().with_rate(Currency::Usd, Currency::Brl, 5.2317));
        let mut controller = Controller::new(fetcher, usd_brl(), DEFAULT_REFRESH_INTERVAL);

        controller
            .handle_action(UserAction::EditAmount("10".into()))
            .unwrap();
        assert!(controller.handle_action(UserAction::Convert).is_err());

        controller.activate();
        pump_until_fetched(&mut controller).await;
        assert!(controller.handle_action(UserAction::Convert).unwrap());
        assert_eq!(controller.state().converted(), Some("52.32"));

        controller
            .handle_action(UserAction::EditAmount("".into()))
            .unwrap();
        assert!(controller.handle_action(UserAction::Convert).is_err());
        assert_eq!(controller.state().converted(), Some("52.32"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_selection_keeps_cycle() {
        let fetcher = Arc::new(MockFetcher::default().with_rate(Currency::Usd, Currency::Brl, 5.0));
        let mut controller =
            Controller::new(fetcher.clone(), usd_brl(), DEFAULT_REFRESH_INTERVAL);
        controller.activate();
        pump_until_fetched(&mut controller).await;

        let err = controller
            .handle_action(UserAction::SelectDestination(Currency::Gbp))
            .unwrap_err();
        assert_eq!(err.to_string(), "GBP is not a supported destination currency");
        assert_eq!(controller.state().pair(), usd_brl());
        assert!(controller.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_stops_refresh() {
        let fetcher = Arc::new(MockFetcher::default().with_rate(Currency::Usd, Currency::Brl, 5.0));
        let mut controller =
            Controller::new(fetcher.clone(), usd_brl(), DEFAULT_REFRESH_INTERVAL);
        controller.activate();
        pump_until_fetched(&mut controller).await;

        controller.deactivate();
        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(fetcher.calls().len(), 1);
    }
}
