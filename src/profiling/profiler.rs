//! Chrome Trace ("flame style") profiling.
//!
//! Feature-gated with `--features profiling`.
//!
//! Usage:
//!   ecdb::profiler::init("profile/trace.json");
//!   {
//!     let _g = ecdb::profiler::span("Scheduler::round");
//!     // run a round...
//!   }
//!   ecdb::profiler::shutdown()?;

use std::borrow::Cow;
use std::io;
use std::path::Path;

#[cfg(feature = "profiling")]
mod enabled {
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::Instant;

    use serde_json::{json, Map, Value};

    use super::*;


    struct ProfilerState {
        start: Instant,
        out_path: PathBuf,
        is_on: AtomicBool,
        events: Mutex<Vec<Value>>,
    }

    impl ProfilerState {
        fn now_us(&self) -> u64 {
            self.start.elapsed().as_micros() as u64
        }

        fn events(&self) -> MutexGuard<'_, Vec<Value>> {
            self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    static STATE: OnceLock<ProfilerState> = OnceLock::new();
    static NEXT_TID: AtomicU64 = AtomicU64::new(1);

    thread_local! {
        static TID: u64 = NEXT_TID.fetch_add(1, Ordering::Relaxed);
    }

    fn tid() -> u64 {
        TID.with(|t| *t)
    }

    fn active_state() -> Option<&'static ProfilerState> {
        STATE.get().filter(|st| st.is_on.load(Ordering::Acquire))
    }

    impl super::Arg {
        fn into_json(self) -> Value {
            match self {
                super::Arg::Str(s) => Value::String(s),
                super::Arg::U64(v) => json!(v),
                super::Arg::I64(v) => json!(v),
                // serde_json maps non-finite floats to null
                super::Arg::F64(v) => json!(v),
                super::Arg::Bool(v) => Value::Bool(v),
            }
        }
    }

    /// Initialize the profiler and set the output path.
    ///
    /// Only the first call has an effect.
    pub fn init<P: AsRef<Path>>(path: P) {
        let _ = STATE.set(ProfilerState {
            start: Instant::now(),
            out_path: path.as_ref().to_path_buf(),
            is_on: AtomicBool::new(true),
            events: Mutex::new(Vec::new()),
        });
    }

    /// Stop recording and write the Chrome Trace JSON.
    pub fn shutdown() -> io::Result<()> {
        let Some(st) = STATE.get() else {
            return Ok(());
        };
        st.is_on.store(false, Ordering::Release);

        let events = std::mem::take(&mut *st.events());
        if let Some(parent) = st.out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut w = BufWriter::new(File::create(&st.out_path)?);
        serde_json::to_writer(&mut w, &json!({ "traceEvents": events }))?;
        w.flush()
    }

    /// Assign a human-friendly thread name (shown in Perfetto/Chrome tracing).
    pub fn thread_name(name: impl Into<String>) {
        let Some(st) = active_state() else {
            return;
        };
        let event = json!({
            "name": "thread_name",
            "ph": "M",
            "ts": st.now_us(),
            "pid": 1,
            "tid": tid(),
            "args": { "name": name.into() },
        });
        st.events().push(event);
    }

    /// Create a profiling span.
    pub fn span(name: impl Into<super::SpanName>) -> SpanGuard {
        match active_state() {
            Some(st) => SpanGuard {
                name: name.into().0.into_owned(),
                ts0: st.now_us(),
                tid: tid(),
                args: Map::new(),
                active: true,
            },
            None => SpanGuard::disabled(),
        }
    }

    /// A RAII guard that records a Chrome Trace complete event on drop.
    pub struct SpanGuard {
        name: String,
        ts0: u64,
        tid: u64,
        args: Map<String, Value>,
        active: bool,
    }

    impl SpanGuard {
        fn disabled() -> Self {
            Self { name: String::new(), ts0: 0, tid: 0, args: Map::new(), active: false }
        }

        /// Attach an argument to this span (builder-style).
        #[inline]
        pub fn arg(mut self, key: impl Into<String>, value: super::Arg) -> Self {
            if self.active {
                self.args.insert(key.into(), value.into_json());
            }
            self
        }
    }

    impl Drop for SpanGuard {
        fn drop(&mut self) {
            if !self.active {
                return;
            }
            let Some(st) = active_state() else {
                return;
            };
            let dur = st.now_us().saturating_sub(self.ts0);
            let mut event = json!({
                "name": std::mem::take(&mut self.name),
                "cat": "ecdb",
                "ph": "X",
                "ts": self.ts0,
                "dur": dur,
                "pid": 1,
                "tid": self.tid,
            });
            if !self.args.is_empty() {
                event["args"] = Value::Object(std::mem::take(&mut self.args));
            }
            st.events().push(event);
        }
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use super::*;

    /// Initialize profiler (no-op when profiling is disabled).
    #[inline]
    pub fn init<P: AsRef<Path>>(_path: P) {}

    /// Shut down profiler (no-op).
    #[inline]
    pub fn shutdown() -> io::Result<()> {
        Ok(())
    }

    /// Set thread name (no-op).
    #[inline]
    pub fn thread_name(_name: impl Into<String>) {}

    /// Create profiling span (no-op).
    #[inline]
    pub fn span(_name: impl Into<super::SpanName>) -> SpanGuard {
        SpanGuard
    }

    /// No-op span guard.
    pub struct SpanGuard;

    impl SpanGuard {
        /// Attach an argument to this span (builder-style; no-op).
        #[inline]
        pub fn arg(self, _key: impl Into<String>, _value: super::Arg) -> Self {
            self
        }
    }
}

/// A span name; accepts `&'static str`, `String`, or `Cow<'static, str>`.
pub struct SpanName(pub Cow<'static, str>);

impl From<&'static str> for SpanName {
    fn from(s: &'static str) -> Self {
        SpanName(Cow::Borrowed(s))
    }
}

impl From<String> for SpanName {
    fn from(s: String) -> Self {
        SpanName(Cow::Owned(s))
    }
}

impl From<Cow<'static, str>> for SpanName {
    fn from(s: Cow<'static, str>) -> Self {
        SpanName(s)
    }
}

/// Argument value for profiling spans.
///
/// Serialized into the `args` field of Chrome Trace events.
pub enum Arg {
    /// UTF-8 string value.
    Str(String),

    /// Unsigned 64-bit integer value.
    U64(u64),

    /// Signed 64-bit integer value.
    I64(i64),

    /// 64-bit floating-point value.
    F64(f64),

    /// Boolean value.
    Bool(bool),
}

#[cfg(feature = "profiling")]
pub use enabled::{init, shutdown, span, thread_name, SpanGuard};

#[cfg(not(feature = "profiling"))]
pub use disabled::{init, shutdown, span, thread_name, SpanGuard};
