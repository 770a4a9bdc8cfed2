//! Reel Simulator
//!
//! One reel window showing [`SLOTS_PER_REEL`] symbol slots. While spinning,
//! every slot scrolls down at the same rate and wraps at the bottom of the
//! scroll range; each wrap gives the slot a fresh random symbol. Stopping
//! schedules a settle that snaps the slots back to rest with sharp textures.
//!
//! ```text
//!   offset(t) = (offset0 + rate · t) mod (3 · H)
//!
//!   ┌────────────┐  y = 0
//!   │  slot 0    │
//!   ├────────────┤  y = H
//!   │  slot 1    │
//!   ├────────────┤  y = 2H
//!   │  slot 2    │
//!   └────────────┘  y = 3H  (wraps to 0)
//! ```

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ReelError, ReelResult};
use crate::render::{Rect, SymbolQuad};
use crate::texture::TextureTable;
use crate::timer::TimerQueue;

/// Number of symbol slots on every reel
pub const SLOTS_PER_REEL: usize = 3;

/// Completion callback for [`ReelSimulator::stop`]
pub type StopCallback = Box<dyn FnOnce() + Send>;

// ═══════════════════════════════════════════════════════════════════════════════
// SYMBOL SLOT
// ═══════════════════════════════════════════════════════════════════════════════

/// One visual symbol position on a reel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolSlot {
    /// Vertical offset inside the reel, in `[0, total_height)`
    offset: f64,
    /// Offset seen at the previous scroll sample
    last_sampled: f64,
    /// Assigned symbol (index into the texture table)
    symbol: usize,
    /// Whether the blurred variant is displayed
    blurred: bool,
}

impl SymbolSlot {
    fn at_rest(index: usize, slot_height: f64, symbol: usize) -> Self {
        let offset = index as f64 * slot_height;
        Self {
            offset,
            last_sampled: offset,
            symbol,
            blurred: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn last_sampled(&self) -> f64 {
        self.last_sampled
    }

    pub fn symbol(&self) -> usize {
        self.symbol
    }

    pub fn is_blurred(&self) -> bool {
        self.blurred
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCROLL STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// In-flight scroll animation of all slots
#[derive(Debug, Clone, Copy)]
struct Scroll {
    /// Clock time the scroll started
    started_at: f64,
    /// Slot offsets at start
    base: [f64; SLOTS_PER_REEL],
    /// Distance travelled at the previous sample
    sampled_travel: f64,
}

/// Wrap `value` into `[0, total)`
#[inline]
fn wrap_offset(value: f64, total: f64) -> f64 {
    let wrapped = value.rem_euclid(total);
    // rem_euclid can round up to `total` for values just below a multiple
    if wrapped >= total { 0.0 } else { wrapped }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REEL SIMULATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Simulation of a single reel
pub struct ReelSimulator<T> {
    /// Reel position in the game (0 = leftmost)
    index: usize,
    /// Shared sharp/blurred textures
    textures: Arc<TextureTable<T>>,
    /// Reel window
    bounds: Rect,
    slot_height: f64,
    slots: [SymbolSlot; SLOTS_PER_REEL],
    spinning: bool,
    scroll: Option<Scroll>,
    /// Scroll speed (px per second)
    scroll_rate: f64,
    /// Pending settles, one per stop request
    settles: TimerQueue<Option<StopCallback>>,
    /// Reel clock (seconds)
    now: f64,
    rng: StdRng,
    /// Wraps observed since creation
    wrap_count: u64,
}

impl<T> ReelSimulator<T> {
    /// Create a reel at rest with random sharp symbols
    pub fn new(
        index: usize,
        textures: Arc<TextureTable<T>>,
        bounds: Rect,
        scroll_rate: f64,
    ) -> ReelResult<Self> {
        Self::with_rng(index, textures, bounds, scroll_rate, StdRng::from_os_rng())
    }

    /// Create with a seeded RNG for reproducible symbol draws
    pub fn with_seed(
        index: usize,
        textures: Arc<TextureTable<T>>,
        bounds: Rect,
        scroll_rate: f64,
        seed: u64,
    ) -> ReelResult<Self> {
        Self::with_rng(index, textures, bounds, scroll_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        index: usize,
        textures: Arc<TextureTable<T>>,
        bounds: Rect,
        scroll_rate: f64,
        mut rng: StdRng,
    ) -> ReelResult<Self> {
        if !(bounds.height > 0.0 && bounds.height.is_finite()) {
            return Err(ReelError::InvalidConfig(format!(
                "reel {} height must be > 0, got {}",
                index, bounds.height
            )));
        }
        if !(scroll_rate > 0.0 && scroll_rate.is_finite()) {
            return Err(ReelError::InvalidConfig(format!(
                "reel {} scroll rate must be > 0, got {}",
                index, scroll_rate
            )));
        }
        if textures.is_empty() {
            return Err(ReelError::EmptyTextureTable);
        }

        let slot_height = bounds.height / SLOTS_PER_REEL as f64;
        let symbol_count = textures.len();
        let slots = std::array::from_fn(|i| {
            SymbolSlot::at_rest(i, slot_height, rng.random_range(0..symbol_count))
        });

        Ok(Self {
            index,
            textures,
            bounds,
            slot_height,
            slots,
            spinning: false,
            scroll: None,
            scroll_rate,
            settles: TimerQueue::new(),
            now: 0.0,
            rng,
            wrap_count: 0,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Height of one slot (`H`)
    pub fn slot_height(&self) -> f64 {
        self.slot_height
    }

    /// Total scroll range (`3 · H`)
    pub fn total_height(&self) -> f64 {
        self.slot_height * SLOTS_PER_REEL as f64
    }

    pub fn slots(&self) -> &[SymbolSlot; SLOTS_PER_REEL] {
        &self.slots
    }

    /// Symbols top to bottom by slot index
    pub fn symbols(&self) -> [usize; SLOTS_PER_REEL] {
        std::array::from_fn(|i| self.slots[i].symbol)
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Whether a scroll animation is in flight
    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some()
    }

    /// Number of stop requests waiting to settle
    pub fn pending_stops(&self) -> usize {
        self.settles.len()
    }

    /// Reel clock (seconds)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Earliest pending settle time
    pub fn next_deadline(&self) -> Option<f64> {
        self.settles.next_deadline()
    }

    /// Wraps observed since creation
    pub fn wrap_count(&self) -> u64 {
        self.wrap_count
    }

    pub fn scroll_rate(&self) -> f64 {
        self.scroll_rate
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN / STOP
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start the continuous scroll. No-op while already spinning.
    pub fn spin(&mut self) {
        if self.spinning {
            return;
        }

        for slot in &mut self.slots {
            slot.blurred = true;
            slot.last_sampled = slot.offset;
        }

        self.scroll = Some(Scroll {
            started_at: self.now,
            base: std::array::from_fn(|i| self.slots[i].offset),
            sampled_travel: 0.0,
        });
        self.spinning = true;

        log::debug!("Reel {} spinning at {:.1} px/s", self.index, self.scroll_rate);
    }

    /// Settle the reel `delay_secs` from now, then call `on_complete`
    ///
    /// An idle reel is already stopped: the callback runs immediately.
    pub fn stop(&mut self, delay_secs: f64, on_complete: Option<StopCallback>) {
        if !self.spinning {
            if let Some(callback) = on_complete {
                callback();
            }
            return;
        }

        let delay = if delay_secs.is_finite() && delay_secs >= 0.0 {
            delay_secs
        } else {
            log::warn!(
                "Reel {}: invalid stop delay {}, stopping without delay",
                self.index,
                delay_secs
            );
            0.0
        };

        self.settles.schedule(self.now + delay, on_complete);
        log::debug!("Reel {} settles at t={:.3}", self.index, self.now + delay);
    }

    /// Advance the reel clock by `dt` seconds
    pub fn tick(&mut self, dt: f64) {
        if dt > 0.0 {
            self.advance_to(self.now + dt);
        }
    }

    /// Advance the reel clock to `target`, settling on the way when due
    ///
    /// The clock never runs backwards.
    pub fn advance_to(&mut self, target: f64) {
        if target < self.now {
            return;
        }

        while let Some(due) = self.settles.next_deadline().filter(|due| *due <= target) {
            let at = due.max(self.now);
            self.sample_scroll(at);
            self.now = at;
            self.settle();
        }

        self.sample_scroll(target);
        self.now = target;
    }

    /// Cancel the scroll and every pending settle without firing callbacks
    pub fn teardown(&mut self) {
        let dropped = self.settles.cancel_all();
        if self.scroll.take().is_some() || dropped > 0 {
            log::debug!(
                "Reel {} torn down ({} pending stop(s) cancelled)",
                self.index,
                dropped
            );
        }
        self.spinning = false;
    }

    /// Sample the scroll at clock time `at`
    fn sample_scroll(&mut self, at: f64) {
        let Some(scroll) = self.scroll.as_mut() else {
            return;
        };

        let total = self.slot_height * SLOTS_PER_REEL as f64;
        let travel = self.scroll_rate * (at - scroll.started_at).max(0.0);
        let previous_travel = scroll.sampled_travel;
        scroll.sampled_travel = travel;
        let base = scroll.base;

        let symbol_count = self.textures.len();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let unwrapped = base[i] + travel;
            let offset = wrap_offset(unwrapped, total);

            // Every boundary crossed since the last sample counts, not only
            // the one visible as `offset < last_sampled`.
            let mut wraps =
                ((unwrapped / total).floor() - ((base[i] + previous_travel) / total).floor()) as u64;
            if wraps == 0 && offset < slot.last_sampled {
                wraps = 1;
            }

            for _ in 0..wraps {
                slot.symbol = self.rng.random_range(0..symbol_count);
            }
            if wraps > 0 {
                self.wrap_count += wraps;
                log::trace!(
                    "Reel {} slot {} wrapped {}x -> symbol {}",
                    self.index,
                    i,
                    wraps,
                    slot.symbol
                );
            }

            slot.last_sampled = offset;
            slot.offset = offset;
        }
    }

    /// Snap to rest with fresh sharp symbols, then fire every waiting callback
    fn settle(&mut self) {
        let callbacks: Vec<StopCallback> = self
            .settles
            .drain()
            .into_iter()
            .filter_map(|timer| timer.payload)
            .collect();

        self.scroll = None;
        let symbol_count = self.textures.len();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            *slot = SymbolSlot::at_rest(i, self.slot_height, self.rng.random_range(0..symbol_count));
        }
        self.spinning = false;

        log::debug!(
            "Reel {} settled at t={:.3} on {:?}",
            self.index,
            self.now,
            self.symbols()
        );

        for callback in callbacks {
            callback();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RENDERING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Clip rectangle of the reel window
    pub fn mask(&self) -> Rect {
        self.bounds
    }

    /// Textured rectangles for the current frame
    ///
    /// A slot that runs past the bottom of the scroll range is drawn a second
    /// time above the window so the column stays contiguous.
    pub fn quads(&self) -> Vec<SymbolQuad<'_, T>> {
        let total = self.total_height();
        let mut quads = Vec::with_capacity(SLOTS_PER_REEL + 1);

        for (i, slot) in self.slots.iter().enumerate() {
            let Some(texture) = self.textures.texture(slot.symbol, slot.blurred) else {
                continue;
            };
            let quad = |offset: f64| SymbolQuad {
                reel: self.index,
                slot: i,
                rect: Rect::new(
                    self.bounds.x,
                    self.bounds.y + offset,
                    self.bounds.width,
                    self.slot_height,
                ),
                symbol: slot.symbol,
                blurred: slot.blurred,
                texture,
            };

            quads.push(quad(slot.offset));
            if slot.offset + self.slot_height > total {
                quads.push(quad(slot.offset - total));
            }
        }

        quads
    }
}

impl<T> fmt::Debug for ReelSimulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReelSimulator")
            .field("index", &self.index)
            .field("bounds", &self.bounds)
            .field("slots", &self.slots)
            .field("spinning", &self.spinning)
            .field("pending_stops", &self.settles.len())
            .field("now", &self.now)
            .finish()
    }
}

impl<T> Drop for ReelSimulator<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RATE: f64 = 10_000.0 / 3.0;

    fn test_reel(seed: u64) -> ReelSimulator<&'static str> {
        let textures = TextureTable::new(
            vec!["A", "B", "C", "D", "E", "F", "G", "S"],
            vec!["A~", "B~", "C~", "D~", "E~", "F~", "G~", "S~"],
        )
        .unwrap();
        ReelSimulator::with_seed(
            0,
            Arc::new(textures),
            Rect::new(0.0, 0.0, 220.0, 810.0),
            RATE,
            seed,
        )
        .unwrap()
    }

    fn counter_callback(counter: &Arc<AtomicUsize>) -> Option<StopCallback> {
        let counter = Arc::clone(counter);
        Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn assert_spacing(reel: &ReelSimulator<&'static str>) {
        let total = reel.total_height();
        for i in 0..SLOTS_PER_REEL {
            let offset = reel.slots()[i].offset();
            assert!(offset >= 0.0 && offset < total, "offset {} out of range", offset);
            for j in (i + 1)..SLOTS_PER_REEL {
                let diff = (reel.slots()[j].offset() - offset).rem_euclid(total);
                let expected = (j - i) as f64 * reel.slot_height();
                let error = (diff - expected).abs().min(total - (diff - expected).abs());
                assert!(error < 1e-6, "spacing {} vs {}", diff, expected);
            }
        }
    }

    #[test]
    fn test_new_reel_at_rest() {
        let reel = test_reel(1);
        assert!(!reel.is_spinning());
        assert_relative_eq!(reel.slot_height(), 270.0);
        assert_relative_eq!(reel.total_height(), 810.0);
        for (i, slot) in reel.slots().iter().enumerate() {
            assert_relative_eq!(slot.offset(), i as f64 * 270.0);
            assert!(!slot.is_blurred());
            assert!(slot.symbol() < 8);
        }
    }

    #[test]
    fn test_new_rejects_bad_geometry() {
        let textures = Arc::new(TextureTable::new(vec![0u8], vec![1u8]).unwrap());
        assert!(ReelSimulator::new(0, Arc::clone(&textures), Rect::new(0.0, 0.0, 10.0, 0.0), RATE).is_err());
        assert!(ReelSimulator::new(0, textures, Rect::new(0.0, 0.0, 10.0, 30.0), 0.0).is_err());
    }

    #[test]
    fn test_spin_blurs_current_symbols() {
        let mut reel = test_reel(2);
        let before = reel.symbols();
        reel.spin();

        assert!(reel.is_spinning());
        assert!(reel.is_scrolling());
        assert_eq!(reel.symbols(), before);
        assert!(reel.slots().iter().all(|s| s.is_blurred()));
    }

    #[test]
    fn test_spin_is_idempotent() {
        let mut once = test_reel(3);
        let mut twice = test_reel(3);

        once.spin();
        twice.spin();
        twice.spin();

        for _ in 0..50 {
            once.tick(1.0 / 60.0);
            twice.tick(1.0 / 60.0);
        }
        assert_eq!(once.slots(), twice.slots());
        assert_eq!(once.wrap_count(), twice.wrap_count());
    }

    #[test]
    fn test_offsets_stay_in_range_and_spaced() {
        let mut reel = test_reel(4);
        reel.spin();

        for frame in 0..600 {
            // uneven frame times
            let dt = if frame % 7 == 0 { 0.05 } else { 1.0 / 60.0 };
            reel.tick(dt);
            assert_spacing(&reel);
        }
        assert!(reel.wrap_count() > 0);
    }

    #[test]
    fn test_offset_follows_closed_form() {
        let mut reel = test_reel(5);
        reel.spin();
        reel.tick(0.1);

        let expected = (RATE * 0.1).rem_euclid(810.0);
        assert_relative_eq!(reel.slots()[0].offset(), expected, epsilon = 1e-9);
        assert_relative_eq!(
            reel.slots()[1].offset(),
            (270.0 + RATE * 0.1).rem_euclid(810.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_wrap_detected_on_single_crossing() {
        let mut reel = test_reel(6);
        reel.spin();

        // slot 2 starts at 540 and crosses 810 after 270 px
        reel.tick(200.0 / RATE);
        assert_eq!(reel.wrap_count(), 0);
        reel.tick(100.0 / RATE);
        assert_eq!(reel.wrap_count(), 1);
        assert!(reel.slots()[2].offset() < reel.slots()[1].offset());
    }

    #[test]
    fn test_multiple_wraps_in_one_tick_are_counted() {
        let mut reel = test_reel(7);
        reel.spin();

        // 3.5 cycles in one frame: slots 0 and 1 wrap 3 times, slot 2 four times
        reel.tick(3.5 * 810.0 / RATE);
        assert_eq!(reel.wrap_count(), 10);
    }

    #[test]
    fn test_stop_on_idle_reel_completes_synchronously() {
        let mut reel = test_reel(8);
        let before = *reel.slots();
        let counter = Arc::new(AtomicUsize::new(0));

        reel.stop(1.0, counter_callback(&counter));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(*reel.slots(), before);
        assert_eq!(reel.pending_stops(), 0);

        reel.stop(0.0, None);
        assert_eq!(*reel.slots(), before);
    }

    #[test]
    fn test_stop_settles_after_delay() {
        let mut reel = test_reel(9);
        let counter = Arc::new(AtomicUsize::new(0));

        reel.spin();
        reel.tick(0.5);
        reel.stop(0.4, counter_callback(&counter));

        reel.tick(0.3);
        assert!(reel.is_spinning());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        reel.tick(0.2);
        assert!(!reel.is_spinning());
        assert!(!reel.is_scrolling());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        for (i, slot) in reel.slots().iter().enumerate() {
            assert_relative_eq!(slot.offset(), i as f64 * 270.0);
            assert!(!slot.is_blurred());
        }

        // no mutation after settle
        let settled = *reel.slots();
        let wraps = reel.wrap_count();
        reel.tick(5.0);
        assert_eq!(*reel.slots(), settled);
        assert_eq!(reel.wrap_count(), wraps);
    }

    #[test]
    fn test_settle_observed_by_callback_is_final() {
        let mut reel = test_reel(10);
        let seen = Arc::new(Mutex::new(None));

        reel.spin();
        reel.tick(0.25);
        let seen_clone = Arc::clone(&seen);
        reel.stop(
            0.0,
            Some(Box::new(move || {
                *seen_clone.lock() = Some(true);
            })),
        );
        assert!(reel.is_spinning());
        assert!(seen.lock().is_none());

        reel.tick(0.0001);
        assert_eq!(*seen.lock(), Some(true));
        assert!(reel.slots().iter().all(|s| !s.is_blurred()));
    }

    #[test]
    fn test_second_stop_folds_into_first_settle() {
        let mut reel = test_reel(11);
        let counter = Arc::new(AtomicUsize::new(0));

        reel.spin();
        reel.stop(0.5, counter_callback(&counter));
        reel.stop(0.2, counter_callback(&counter));
        assert_eq!(reel.pending_stops(), 2);
        assert_relative_eq!(reel.next_deadline().unwrap(), 0.2);

        reel.tick(0.3);
        assert!(!reel.is_spinning());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(reel.pending_stops(), 0);
    }

    #[test]
    fn test_negative_delay_is_clamped() {
        let mut reel = test_reel(12);
        reel.spin();
        reel.stop(-3.0, None);
        assert_relative_eq!(reel.next_deadline().unwrap(), 0.0);
        reel.tick(0.01);
        assert!(!reel.is_spinning());
    }

    #[test]
    fn test_teardown_cancels_without_callbacks() {
        let mut reel = test_reel(13);
        let counter = Arc::new(AtomicUsize::new(0));

        reel.spin();
        reel.stop(0.1, counter_callback(&counter));
        reel.teardown();

        reel.tick(1.0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!reel.is_spinning());
        assert!(!reel.is_scrolling());

        reel.spin();
        reel.stop(0.1, counter_callback(&counter));
        drop(reel);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_respin_after_settle() {
        let mut reel = test_reel(14);
        reel.spin();
        reel.stop(0.0, None);
        reel.tick(0.01);
        assert!(!reel.is_spinning());

        reel.spin();
        assert!(reel.is_spinning());
        reel.tick(0.1);
        assert_relative_eq!(reel.slots()[0].offset(), RATE * 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_quads_cover_window() {
        let mut reel = test_reel(15);
        assert_eq!(reel.quads().len(), 3);
        assert!(reel.quads().iter().all(|q| !q.blurred));

        reel.spin();
        reel.tick(100.0 / RATE);
        let quads = reel.quads();

        // slot 2 runs off the bottom and is mirrored above the window
        assert_eq!(quads.len(), 4);
        let mirrored: Vec<_> = quads.iter().filter(|q| q.slot == 2).collect();
        assert_eq!(mirrored.len(), 2);
        assert_relative_eq!(mirrored[1].rect.y, 640.0 - 810.0, epsilon = 1e-9);
        assert!(quads.iter().all(|q| q.blurred && q.texture.ends_with('~')));
    }
}
