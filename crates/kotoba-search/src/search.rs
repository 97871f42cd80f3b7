use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use kotoba_core::{Dictionary, DictionaryFormat, Query, QueryFlags, Record, Relevance, SearchError};

pub const DEFAULT_CAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Searching,
    Canceling,
    Finishing,
}

/// How the last run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Canceled,
    Failed,
}

/// Most records kept per relevance tier; `0` disables the tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caps {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl Caps {
    pub const fn uniform(cap: usize) -> Self {
        Self {
            high: cap,
            medium: cap,
            low: cap,
        }
    }

    pub fn get(&self, relevance: Relevance) -> usize {
        match relevance {
            Relevance::High => self.high,
            Relevance::Medium => self.medium,
            Relevance::Low => self.low,
        }
    }
}

impl Default for Caps {
    fn default() -> Self {
        Self::uniform(DEFAULT_CAP)
    }
}

impl From<[usize; 3]> for Caps {
    fn from([high, medium, low]: [usize; 3]) -> Self {
        Self { high, medium, low }
    }
}

/// A record popped from a bucket; the consumer owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub relevance: Relevance,
    pub record: Record<'static>,
}

struct State {
    status: SearchStatus,
    buckets: [VecDeque<Record<'static>>; 3],
    /// Records ever added per tier this run; pulls don't free cap space
    added: [usize; 3],
    bytes_consumed: u64,
    total_bytes: u64,
    outcome: Option<Outcome>,
}

impl State {
    fn new() -> Self {
        Self {
            status: SearchStatus::Idle,
            buckets: Default::default(),
            added: [0; 3],
            bytes_consumed: 0,
            total_bytes: 0,
            outcome: None,
        }
    }

    fn reset(&mut self, total_bytes: u64) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.added = [0; 3];
        self.bytes_consumed = 0;
        self.total_bytes = total_bytes;
        self.outcome = None;
    }

    fn tiers_full(&self, caps: &Caps, tiers: &[Relevance]) -> bool {
        tiers.iter().all(|r| self.added[r.index()] >= caps.get(*r))
    }
}

struct Shared {
    query: Arc<Query>,
    dictionary: Arc<Dictionary>,
    caps: Caps,
    cancel_requested: AtomicBool,
    state: Mutex<State>,
    /// Signalled whenever the status returns to `Idle`
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One query over one dictionary file.
///
/// A search can be started again once it is idle; every run opens its own
/// file handle and starts from empty buckets.
pub struct Search {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Search {
    /// Rejects queries that were never compiled or were compiled for another format
    pub fn new(query: Arc<Query>, dictionary: Arc<Dictionary>, caps: Caps) -> Result<Self, SearchError> {
        if !query.is_compiled() {
            return Err(SearchError::QueryNotCompiled);
        }
        if query.format() != dictionary.format() {
            return Err(SearchError::FormatMismatch {
                query: query.format().as_str(),
                dictionary: dictionary.format().as_str(),
            });
        }

        Ok(Self {
            shared: Arc::new(Shared {
                query,
                dictionary,
                caps,
                cancel_requested: AtomicBool::new(false),
                state: Mutex::new(State::new()),
                idle: Condvar::new(),
            }),
            worker: Mutex::new(None),
        })
    }

    pub fn query(&self) -> &Query {
        &self.shared.query
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.shared.dictionary
    }

    pub fn caps(&self) -> Caps {
        self.shared.caps
    }

    /// Open the dictionary and scan it, on a worker thread when `background`
    /// is set, otherwise before returning.
    pub fn start(&self, background: bool) -> Result<(), SearchError> {
        if self.status() != SearchStatus::Idle {
            return Err(SearchError::AlreadyRunning);
        }
        // the previous worker is done once the status is idle
        self.join_worker();

        // opened outside the state lock
        let dictionary = &self.shared.dictionary;
        let opened = dictionary.open().map(|file| {
            let total_bytes = file
                .metadata()
                .map(|m| m.len())
                .ok()
                .or_else(|| dictionary.length_hint())
                .unwrap_or(0);
            (file, total_bytes)
        });

        let file = {
            let mut state = self.shared.lock();
            if state.status != SearchStatus::Idle {
                return Err(SearchError::AlreadyRunning);
            }
            match opened {
                Ok((file, total_bytes)) => {
                    state.reset(total_bytes);
                    state.status = SearchStatus::Searching;
                    self.shared.cancel_requested.store(false, Ordering::Release);
                    file
                }
                Err(source) => {
                    tracing::warn!(
                        dictionary = dictionary.name(),
                        path = %dictionary.path().display(),
                        error = %source,
                        "Failed to open dictionary"
                    );
                    state.reset(0);
                    state.outcome = Some(Outcome::Failed);
                    return Err(SearchError::DictionaryFileUnavailable {
                        path: dictionary.path().to_path_buf(),
                        source,
                    });
                }
            }
        };

        tracing::debug!(
            dictionary = self.shared.dictionary.name(),
            query = self.shared.query.raw_text(),
            background,
            "Search started"
        );

        if !background {
            scan(&self.shared, file);
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("kotoba-search".to_owned())
            .spawn(move || scan(&shared, file));

        match spawned {
            Ok(handle) => {
                *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn search worker");
                let mut state = self.shared.lock();
                state.status = SearchStatus::Idle;
                state.outcome = Some(Outcome::Failed);
                drop(state);
                self.shared.idle.notify_all();
                Err(SearchError::WorkerSpawn(e))
            }
        }
    }

    /// Stop a running scan and return once the worker has exited and the
    /// file is closed. Results already bucketed stay put. No-op when idle.
    pub fn cancel(&self) {
        {
            let mut state = self.shared.lock();
            if state.status != SearchStatus::Idle {
                self.shared.cancel_requested.store(true, Ordering::Release);
                if state.status == SearchStatus::Searching {
                    state.status = SearchStatus::Canceling;
                }
                tracing::debug!(dictionary = self.shared.dictionary.name(), "Canceling search");

                while state.status != SearchStatus::Idle {
                    state = self
                        .shared
                        .idle
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
        self.join_worker();
    }

    /// Block until the current run ends
    pub fn wait(&self) -> Option<Outcome> {
        let outcome = {
            let mut state = self.shared.lock();
            while state.status != SearchStatus::Idle {
                state = self
                    .shared
                    .idle
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            state.outcome
        };
        self.join_worker();
        outcome
    }

    /// Pop the best available result.
    ///
    /// While the scan is live only high relevance results come out, so a
    /// later high match can't be preceded by a weaker one.
    pub fn pull_result(&self) -> Option<SearchResult> {
        let mut state = self.shared.lock();
        let tiers: &[Relevance] = match state.status {
            SearchStatus::Searching => &[Relevance::High],
            _ => &Relevance::ALL,
        };
        tiers.iter().find_map(|relevance| {
            state.buckets[relevance.index()]
                .pop_front()
                .map(|record| SearchResult {
                    relevance: *relevance,
                    record,
                })
        })
    }

    pub fn status(&self) -> SearchStatus {
        self.shared.lock().status
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.shared.lock().outcome
    }

    /// Fraction of the file scanned, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        let state = self.shared.lock();
        if state.outcome == Some(Outcome::Completed) {
            return 1.0;
        }
        if state.total_bytes == 0 {
            return 0.0;
        }
        (state.bytes_consumed as f64 / state.total_bytes as f64).clamp(0.0, 1.0)
    }

    /// Results waiting in each bucket, high first
    pub fn counts(&self) -> [usize; 3] {
        let state = self.shared.lock();
        [
            state.buckets[0].len(),
            state.buckets[1].len(),
            state.buckets[2].len(),
        ]
    }

    /// Records added to the `relevance` bucket during the current run
    pub fn total_results(&self, relevance: Relevance) -> usize {
        self.shared.lock().added[relevance.index()]
    }

    fn join_worker(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Search worker panicked");
            }
        }
    }
}

impl Drop for Search {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Puts the search back to idle however the scan ends, panics included
struct ScanGuard<'a> {
    shared: &'a Shared,
    outcome: Outcome,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.status = SearchStatus::Idle;
        state.outcome = Some(self.outcome);

        tracing::debug!(
            dictionary = self.shared.dictionary.name(),
            outcome = ?self.outcome,
            high = state.added[0],
            medium = state.added[1],
            low = state.added[2],
            "Search finished"
        );

        drop(state);
        self.shared.idle.notify_all();
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('＃')
}

/// Relevance of one raw line, or `None` when it is skipped or doesn't match
fn evaluate<'l>(
    format: DictionaryFormat,
    query: &Query,
    line: &'l str,
    line_number: usize,
) -> Option<(Relevance, Record<'l>)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);
    if line.trim().is_empty() || is_comment(line) {
        return None;
    }

    let record = match format.parse_record(line) {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!(line = line_number, error = %e, "Skipping record");
            return None;
        }
    };

    let relevance = format.relevance(&record, query)?;
    Some((relevance, record))
}

fn scan(shared: &Shared, file: File) {
    let mut guard = ScanGuard {
        shared,
        outcome: Outcome::Failed,
    };

    let format = shared.dictionary.format();
    let query = shared.query.as_ref();
    let tiers: &[Relevance] = if query.flags().contains(QueryFlags::EXACT) {
        &[Relevance::High]
    } else {
        &Relevance::ALL
    };

    let mut reader = BufReader::new(file);
    let mut buf = Vec::with_capacity(256);
    let mut consumed = 0u64;
    let mut line_number = 0usize;

    loop {
        if shared.cancel_requested.load(Ordering::Acquire) {
            guard.outcome = Outcome::Canceled;
            break;
        }

        buf.clear();
        let read = match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                let mut state = shared.lock();
                if state.status == SearchStatus::Searching {
                    state.status = SearchStatus::Finishing;
                    guard.outcome = Outcome::Completed;
                } else {
                    guard.outcome = Outcome::Canceled;
                }
                break;
            }
            Ok(read) => read,
            Err(e) => {
                tracing::error!(dictionary = shared.dictionary.name(), error = %e, "Failed to read dictionary");
                break;
            }
        };
        consumed += read as u64;
        line_number += 1;

        let matched = match std::str::from_utf8(&buf) {
            Ok(line) => evaluate(format, query, line, line_number),
            Err(_) => {
                tracing::debug!(line = line_number, "Skipping line that is not UTF-8");
                None
            }
        };

        let mut state = shared.lock();
        state.bytes_consumed = consumed;
        if state.status != SearchStatus::Searching {
            guard.outcome = Outcome::Canceled;
            break;
        }

        if let Some((relevance, record)) = matched {
            let slot = relevance.index();
            if tiers.contains(&relevance) && state.added[slot] < shared.caps.get(relevance) {
                state.buckets[slot].push_back(record.into_owned());
                state.added[slot] += 1;
            }
        }

        if state.tiers_full(&shared.caps, tiers) {
            tracing::debug!(line = line_number, "Every bucket is full, stopping early");
            guard.outcome = Outcome::Completed;
            state.status = SearchStatus::Finishing;
            break;
        }
    }
    // reader and its file handle are dropped before the guard reports idle
    drop(reader);
    drop(guard);
}
