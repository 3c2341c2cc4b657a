// Copyright (C) 2026-present The Translytics Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A module that provides minute-bucket aggregation of delivery events and a
//! fixed-width moving average over the bucketed series.
//!
//! The main components are:
//! - `Aggregator`: a trait defining how a stream of items is folded into an
//!   aggregate
//! - `MinuteTotalsAggregator`: folds delivery events into per-minute
//!   duration totals plus the observed range
//! - `DeliveryAggregate`: the immutable result of the fold
//! - `SlidingWindow`: bounded FIFO of per-minute totals with positive-only
//!   averaging
//! - `MovingAverageIter`: iterator sweeping the observed range one minute at
//!   a time
//!
//! Example usage:
//! ```
//! use translytics_analytics::aggregation::{Aggregator, MinuteTotalsAggregator};
//! use translytics_analytics::delivery::DeliveryEvent;
//!
//! # fn events() -> Vec<DeliveryEvent> { Vec::new() }
//! let mut aggregator = MinuteTotalsAggregator::init(());
//! for event in events() {
//!     aggregator.push(event);
//! }
//! if let Some(aggregate) = aggregator.flush() {
//!     for record in aggregate.moving_average(10) {
//!         println!("{}", serde_json::to_string(&record).unwrap());
//!     }
//! }
//! ```

use crate::delivery::{AverageRecord, DeliveryEvent};
use chrono::{Duration, NaiveDateTime, Timelike};
use std::collections::{BTreeMap, VecDeque};

/// A trait for defining aggregation logic
pub trait Aggregator<Init, Input, Output> {
    fn init(init: Init) -> Self;
    fn push(&mut self, item: Input);
    fn flush(self) -> Output;
}

/// Helper function to return the start of the minute containing the given
/// timestamp
fn minute_start(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap()
}

/// The minute a delivery is attributed to: its timestamp truncated to the
/// whole minute and advanced by one minute, i.e. the first minute boundary
/// by which the delivery had completed.
pub fn effective_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    minute_start(timestamp) + Duration::minutes(1)
}

/// Folds delivery events into per-minute duration totals.
///
/// The observed range is tracked in input order: the first pushed event
/// fixes the start of the sweep (one minute before its effective minute) and
/// the last pushed event fixes the end.
#[derive(Debug, Clone, Default)]
pub struct MinuteTotalsAggregator {
    totals: BTreeMap<NaiveDateTime, u64>,
    first_minute: Option<NaiveDateTime>,
    last_minute: Option<NaiveDateTime>,
}

impl Aggregator<(), DeliveryEvent, Option<DeliveryAggregate>> for MinuteTotalsAggregator {
    fn init(_: ()) -> Self {
        Self::default()
    }

    fn push(&mut self, event: DeliveryEvent) {
        let minute = effective_minute(event.timestamp());
        *self.totals.entry(minute).or_insert(0) += event.duration();
        if self.first_minute.is_none() {
            // The sweep starts one step before the first delivery minute, so
            // the first emitted record lands on a window with no deliveries.
            self.first_minute = Some(minute - Duration::minutes(1));
        }
        self.last_minute = Some(minute);
    }

    /// Returns `None` when no event was pushed: an empty log has no observed
    /// range and produces no records.
    fn flush(self) -> Option<DeliveryAggregate> {
        match (self.first_minute, self.last_minute) {
            (Some(first_minute), Some(last_minute)) => Some(DeliveryAggregate {
                totals: self.totals,
                first_minute,
                last_minute,
            }),
            _ => None,
        }
    }
}

/// Immutable per-minute duration totals plus the inclusive sweep range.
///
/// Minutes without deliveries have no entry and read back as zero through
/// [`DeliveryAggregate::total_for`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeliveryAggregate {
    totals: BTreeMap<NaiveDateTime, u64>,
    first_minute: NaiveDateTime,
    last_minute: NaiveDateTime,
}

impl DeliveryAggregate {
    pub const fn first_minute(&self) -> NaiveDateTime {
        self.first_minute
    }

    pub const fn last_minute(&self) -> NaiveDateTime {
        self.last_minute
    }

    /// Summed delivery duration for a minute, zero when no delivery is
    /// attributed to it.
    pub fn total_for(&self, minute: NaiveDateTime) -> u64 {
        self.totals.get(&minute).copied().unwrap_or(0)
    }

    /// Sweep every minute from `first_minute` to `last_minute` inclusive,
    /// yielding one [`AverageRecord`] per minute with the moving average
    /// over the trailing `window_size` minutes.
    pub fn moving_average(&self, window_size: usize) -> MovingAverageIter<'_> {
        MovingAverageIter {
            aggregate: self,
            window: SlidingWindow::new(window_size),
            cursor: self.first_minute,
            // With out-of-order input the range tracked in input order can be
            // empty; the sweep then yields nothing.
            done: self.last_minute < self.first_minute,
        }
    }
}

/// Bounded FIFO of per-minute duration totals.
///
/// Pushing beyond the capacity evicts the oldest total, at most one eviction
/// per push. The average only counts minutes that actually had deliveries
/// (strictly positive totals) and is 0.0 when there is none in the window.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    queue: VecDeque<u64>,
    capacity: usize,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    pub fn push(&mut self, total: u64) {
        self.queue.push_back(total);
        if self.queue.len() > self.capacity {
            self.queue.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn average(&self) -> f64 {
        let mut sum: u64 = 0;
        let mut minutes_with_deliveries: u32 = 0;
        for &total in &self.queue {
            if total > 0 {
                sum += total;
                minutes_with_deliveries += 1;
            }
        }
        if minutes_with_deliveries == 0 {
            0.0
        } else {
            sum as f64 / f64::from(minutes_with_deliveries)
        }
    }
}

/// An iterator sweeping a [`DeliveryAggregate`] one minute at a time.
///
/// Each step pushes the swept minute's total onto the window and yields the
/// resulting moving average, in minute-ascending order.
#[derive(Debug, Clone)]
pub struct MovingAverageIter<'a> {
    aggregate: &'a DeliveryAggregate,
    window: SlidingWindow,
    cursor: NaiveDateTime,
    done: bool,
}

impl Iterator for MovingAverageIter<'_> {
    type Item = AverageRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let minute = self.cursor;
        self.window.push(self.aggregate.total_for(minute));
        if minute < self.aggregate.last_minute() {
            self.cursor = minute + Duration::minutes(1);
        } else {
            self.done = true;
        }
        Some(AverageRecord::new(minute, self.window.average()))
    }
}
