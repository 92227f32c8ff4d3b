use crate::config::WindowConfig;
use crate::error::Result;
use crate::{QuadContainer, WindowInstance};
use oxigraph::model::Quad;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Report strategy for window content emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportStrategy {
    /// Reserved, never emits.
    NonEmptyContent,
    OnContentChange,
    #[default]
    OnWindowClose,
    /// Reserved, never emits.
    Periodic,
}

impl ReportStrategy {
    pub fn is_reserved(&self) -> bool {
        matches!(self, ReportStrategy::NonEmptyContent | ReportStrategy::Periodic)
    }
}

/// Tick mechanism for window progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tick {
    #[default]
    TimeDriven,
    /// Reserved, never emits.
    TupleDriven,
    /// Reserved, never emits.
    BatchDriven,
}

/// Output stream type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamType {
    RStream,
    IStream,
    DStream,
}

/// Callback type for window content emission
pub type WindowCallback = Arc<dyn Fn(QuadContainer) + Send + Sync>;

/// CSPARQL Window implementation
///
/// Keeps every live `[open, close)` span of a sliding window together with its
/// content, advances a watermark from event timestamps, buffers late events for
/// a later sweep and hands finished windows to `RStream` subscribers.
///
/// All mutation goes through `&mut self`; callers that share a window between
/// threads wrap it in a single lock so that `add` and the late-element sweep
/// never interleave.
pub struct CSPARQLWindow {
    pub name: String,
    pub width: i64,
    pub slide: i64,
    /// High-water event time seen so far. Events behind it are late.
    pub time: i64,
    pub t0: i64,
    pub max_delay: i64,
    pub active_windows: HashMap<WindowInstance, QuadContainer>,
    pub report: ReportStrategy,
    pub tick: Tick,
    current_watermark: i64,
    late_buffer: BTreeMap<i64, HashSet<Quad>>,
    pending_triggers: BTreeSet<WindowInstance>,
    late_sweep_interval: Duration,
    dropped_late_events: u64,
    stopped: bool,
    callbacks: HashMap<StreamType, Vec<WindowCallback>>,
}

impl CSPARQLWindow {
    pub fn new(
        name: String,
        width: i64,
        slide: i64,
        report: ReportStrategy,
        tick: Tick,
        start_time: i64,
        max_delay: i64,
    ) -> Result<Self> {
        Self::from_config(
            WindowConfig::new(name, width, slide)
                .with_report(report)
                .with_tick(tick)
                .with_start_time(start_time)
                .with_max_delay(max_delay),
        )
    }

    pub fn from_config(config: WindowConfig) -> Result<Self> {
        config.validate()?;

        if config.report.is_reserved() {
            warn!(
                window = %config.name,
                report = ?config.report,
                "report strategy is not implemented, window will never emit"
            );
        }
        if config.tick != Tick::TimeDriven {
            warn!(
                window = %config.name,
                tick = ?config.tick,
                "tick mode is not implemented, window will never emit"
            );
        }

        let late_sweep_interval = config.late_sweep_interval();
        Ok(Self {
            name: config.name,
            width: config.width,
            slide: config.slide,
            time: config.start_time,
            t0: config.start_time,
            max_delay: config.max_delay,
            active_windows: HashMap::new(),
            report: config.report,
            tick: config.tick,
            current_watermark: config.start_time,
            late_buffer: BTreeMap::new(),
            pending_triggers: BTreeSet::new(),
            late_sweep_interval,
            dropped_late_events: 0,
            stopped: false,
            callbacks: HashMap::new(),
        })
    }

    /// Get window content at a specific timestamp
    /// Returns the window with the smallest close time that contains the timestamp
    pub fn get_content(&self, timestamp: i64) -> Option<&QuadContainer> {
        self.active_windows
            .iter()
            .filter(|(window, _)| window.open <= timestamp && timestamp <= window.close)
            .min_by_key(|(window, _)| window.close)
            .map(|(_, container)| container)
    }

    /// Add a quad to the window at the given timestamp
    pub fn add(&mut self, quad: Quad, timestamp: i64) {
        if self.stopped {
            debug!(window = %self.name, timestamp, "window stopped, ignoring element");
            return;
        }

        trace!(window = %self.name, timestamp, quad = %quad, "received element");

        if self.is_event_late(timestamp) {
            self.buffer_late_event(quad, timestamp);
            return;
        }

        let to_evict = self.process_event(quad, timestamp);
        self.evict_windows(to_evict);
    }

    pub fn is_event_late(&self, timestamp: i64) -> bool {
        timestamp < self.time
    }

    fn buffer_late_event(&mut self, quad: Quad, timestamp: i64) {
        let delay = self.time.saturating_sub(timestamp);
        if delay > self.max_delay {
            self.dropped_late_events += 1;
            error!(
                window = %self.name,
                timestamp,
                delay,
                max_delay = self.max_delay,
                "late element is out of the allowed delay, dropping"
            );
            return;
        }

        warn!(
            window = %self.name,
            timestamp,
            delay,
            "late element buffered for out of order processing"
        );
        self.late_buffer.entry(timestamp).or_default().insert(quad);
    }

    /// Scope the element, append it to its windows, advance the watermark and
    /// record the pending trigger. Returns the windows the element closed.
    fn process_event(&mut self, quad: Quad, t_e: i64) -> Vec<WindowInstance> {
        if t_e > self.time {
            self.time = t_e;
        }

        self.scope(t_e);

        let mut to_evict = Vec::new();
        for (window, container) in &mut self.active_windows {
            if window.contains(t_e) {
                trace!(window = %self.name, instance = %window, "adding element");
                container.add(quad.clone(), t_e);
            } else if t_e >= window.close {
                trace!(window = %self.name, instance = %window, "scheduling for eviction");
                to_evict.push(*window);
            }
        }

        self.update_watermark(t_e);
        self.add_pending_trigger(self.get_window_instance(t_e));

        to_evict
    }

    fn evict_windows(&mut self, to_evict: Vec<WindowInstance>) {
        for window in to_evict {
            if self.active_windows.remove(&window).is_some() {
                debug!(window = %self.name, instance = %window, "evicting");
            }
        }
    }

    /// Closing bound of the first window created by `scope(t_e)`, aligned on
    /// multiples of `slide` from `t0`.
    fn closing_bound(&self, t_e: i64) -> i64 {
        self.t0 + ceil_div(t_e - self.t0, self.slide) * self.slide
    }

    /// The window instance whose trigger decision an element at `t_e`
    /// schedules: the earliest-closing window that contains `t_e`.
    pub fn get_window_instance(&self, t_e: i64) -> WindowInstance {
        let close = self.t0 + (floor_div(t_e - self.t0, self.slide) + 1) * self.slide;
        WindowInstance::new(close - self.width, close)
    }

    /// Record a window as awaiting a trigger decision. Returns false when the
    /// same span is already pending.
    pub fn add_pending_trigger(&mut self, window: WindowInstance) -> bool {
        self.pending_triggers.insert(window)
    }

    /// Advance the watermark. Never regresses; a stale value is a no-op.
    pub fn update_watermark(&mut self, new_time: i64) {
        if new_time > self.current_watermark {
            self.current_watermark = new_time;
            self.check_watermark();
        } else {
            debug!(
                window = %self.name,
                watermark = self.current_watermark,
                proposed = new_time,
                "watermark not advanced"
            );
        }
    }

    fn check_watermark(&mut self) {
        let horizon = self.current_watermark.saturating_sub(self.max_delay);
        let to_evict: Vec<WindowInstance> = self
            .active_windows
            .keys()
            .filter(|window| window.close <= horizon)
            .copied()
            .collect();

        // Trigger decisions run before eviction.
        self.emit_on_trigger(self.current_watermark);

        for window in to_evict {
            if self.active_windows.remove(&window).is_some() {
                debug!(
                    window = %self.name,
                    instance = %window,
                    watermark = self.current_watermark,
                    "watermark evicting window"
                );
            }
        }
    }

    fn emit_on_trigger(&mut self, watermark: i64) {
        if self.stopped {
            return;
        }

        let pending: Vec<WindowInstance> = self.pending_triggers.iter().copied().collect();
        let mut emissions = Vec::new();

        for lookup in pending {
            let Some((stored, content)) = self.active_windows.get_key_value(&lookup) else {
                debug!(window = %self.name, instance = %lookup, "pending window is no longer active");
                self.pending_triggers.remove(&lookup);
                continue;
            };
            let stored = *stored;

            if !self.compute_report(&stored, watermark) {
                continue;
            }
            self.pending_triggers.remove(&lookup);

            if stored.has_triggered && self.report == ReportStrategy::OnWindowClose {
                debug!(window = %self.name, instance = %stored, "window already triggered");
                continue;
            }

            emissions.push((stored, content.clone()));
            self.mark_triggered(&stored);
        }

        for (window, content) in emissions {
            info!(
                window = %self.name,
                instance = %window,
                watermark,
                quads = content.len(),
                "window triggers"
            );
            self.emit(StreamType::RStream, content);
        }
    }

    /// Compute whether to report this window based on the report strategy
    fn compute_report(&self, window: &WindowInstance, watermark: i64) -> bool {
        if self.tick != Tick::TimeDriven {
            return false;
        }
        match self.report {
            ReportStrategy::OnWindowClose => window.close <= watermark,
            ReportStrategy::OnContentChange => true,
            ReportStrategy::NonEmptyContent | ReportStrategy::Periodic => false,
        }
    }

    /// Set the trigger flag of the active window with the same span.
    /// Returns false when no such window is active.
    pub fn mark_triggered(&mut self, window: &WindowInstance) -> bool {
        match self.active_windows.remove_entry(window) {
            Some((mut stored, content)) => {
                stored.set_triggered(true);
                self.active_windows.insert(stored, content);
                true
            }
            None => false,
        }
    }

    /// Calculate and create windows based on the event time
    pub fn scope(&mut self, t_e: i64) {
        let c_sup = self.closing_bound(t_e);
        let mut o_i = c_sup - self.width;

        debug!(
            window = %self.name,
            first_open = o_i,
            first_close = c_sup,
            "calculating the windows to open"
        );

        while o_i <= t_e {
            self.compute_window_if_absent(WindowInstance::new(o_i, o_i + self.width));
            o_i += self.slide;
        }
    }

    /// Add window if it doesn't already exist. Returns true when it was created.
    fn compute_window_if_absent(&mut self, key: WindowInstance) -> bool {
        if self.active_windows.contains_key(&key) {
            return false;
        }
        trace!(window = %self.name, instance = %key, "opening window");
        self.active_windows.insert(key, QuadContainer::empty());
        true
    }

    /// Subscribe a callback to window emissions
    pub fn subscribe<F>(&mut self, stream_type: StreamType, callback: F)
    where
        F: Fn(QuadContainer) + Send + Sync + 'static,
    {
        if stream_type != StreamType::RStream {
            warn!(
                window = %self.name,
                stream = ?stream_type,
                "only RStream is emitted, subscriber will not be called"
            );
        }
        self.callbacks
            .entry(stream_type)
            .or_default()
            .push(Arc::new(callback));
    }

    /// Emit window content to subscribers
    fn emit(&self, stream_type: StreamType, content: QuadContainer) {
        if let Some(callbacks) = self.callbacks.get(&stream_type) {
            for callback in callbacks {
                callback(content.clone());
            }
        }
    }

    /// Re-admit every buffered late element in ascending timestamp order and
    /// clear the buffer.
    pub fn process_late_elements(&mut self) {
        if self.stopped || self.late_buffer.is_empty() {
            return;
        }

        let buffer = std::mem::take(&mut self.late_buffer);
        debug!(
            window = %self.name,
            timestamps = buffer.len(),
            elements = buffer.values().map(HashSet::len).sum::<usize>(),
            "processing late elements"
        );

        for (timestamp, elements) in buffer {
            for element in elements {
                let to_evict = self.process_event(element, timestamp);
                self.evict_windows(to_evict);
            }
        }
    }

    /// Stop the window: later elements and sweeps are ignored and nothing is
    /// emitted. Subscribers are released.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.late_buffer.clear();
        self.pending_triggers.clear();
        self.callbacks.clear();
        info!(window = %self.name, "window stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn set_current_time(&mut self, t: i64) {
        self.time = t;
    }

    pub fn get_current_watermark(&self) -> i64 {
        self.current_watermark
    }

    pub fn get_active_window_count(&self) -> usize {
        self.active_windows.len()
    }

    /// Bounds of every active window, ordered by close.
    pub fn get_active_window_ranges(&self) -> Vec<(i64, i64)> {
        let mut windows: Vec<&WindowInstance> = self.active_windows.keys().collect();
        windows.sort();
        windows.into_iter().map(|w| (w.open, w.close)).collect()
    }

    /// Number of buffered late elements across all timestamps.
    pub fn late_buffer_len(&self) -> usize {
        self.late_buffer.values().map(HashSet::len).sum()
    }

    pub fn late_buffer_timestamps(&self) -> Vec<i64> {
        self.late_buffer.keys().copied().collect()
    }

    pub fn pending_trigger_count(&self) -> usize {
        self.pending_triggers.len()
    }

    pub fn dropped_late_events(&self) -> u64 {
        self.dropped_late_events
    }

    pub fn late_sweep_interval(&self) -> Duration {
        self.late_sweep_interval
    }
}

// Both helpers expect a positive denominator.
fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    if numerator % denominator > 0 {
        quotient + 1
    } else {
        quotient
    }
}

fn floor_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    if numerator % denominator < 0 {
        quotient - 1
    } else {
        quotient
    }
}
