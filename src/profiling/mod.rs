//! Chrome Trace (flame-style) execution profiler.
//!
//! A **feature-gated** profiling API. When the `profiling` feature is enabled,
//! the scheduler records a span per round and per tier, and [`profiler::shutdown`]
//! writes a **Chrome Trace Event JSON** file that can be inspected using:
//!
//! - `chrome://tracing`
//! - <https://ui.perfetto.dev>
//!
//! When the feature is disabled, all profiling calls compile to no-ops.
//!
//! ## Usage
//!
//! ```no_run
//! use ecdb::profiler;
//!
//! profiler::init("profile/trace.json");
//! profiler::thread_name("Main");
//!
//! {
//!     let _g = profiler::span("simulation::round")
//!         .arg("round", profiler::Arg::U64(0));
//!     // run a round
//! }
//!
//! profiler::shutdown().expect("trace written");
//! ```
//!
//! ## Design notes
//!
//! - Spans are recorded using RAII guards (`SpanGuard`)
//! - Events are timestamped using a monotonic clock
//! - Each OS thread is assigned a stable logical thread ID
//! - Output follows the Chrome Trace `"X"` (complete event) format

pub mod profiler;
