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

//! Analytics for translation delivery logs: minute bucketing of delivery
//! durations and a fixed-width moving average over the bucketed series.
//!
//! The main components are:
//! - [`delivery`]: the delivery event and output record models plus the
//!   JSON-line decode step
//! - [`aggregation`]: the minute-totals fold and the moving-window sweep
//!
//! Data flows one way: raw events → per-minute totals (+ observed range) →
//! windowed averages → output records.

pub mod aggregation;
pub mod delivery;
