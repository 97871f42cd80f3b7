use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use kotoba_core::{Dictionary, DictionaryFormat, Query, QueryFlags, Relevance, compile_query};
use kotoba_search::{Caps, Outcome, Search, SearchError, SearchStatus};
use tempfile::{NamedTempFile, TempPath};

/// Written and closed, so only the search itself can hold it open
fn dictionary_file(lines: &[&str]) -> TempPath {
    let mut file = NamedTempFile::new().expect("temp file");
    for line in lines {
        writeln!(file, "{line}").expect("write line");
    }
    file.flush().expect("flush");
    file.into_temp_path()
}

fn edict(path: &Path) -> Arc<Dictionary> {
    Arc::new(Dictionary::new("English", path, DictionaryFormat::EdictLike))
}

fn query(text: &str, flags: QueryFlags) -> Arc<Query> {
    Arc::new(compile_query(text, DictionaryFormat::EdictLike, flags).expect("query compiles"))
}

/// Mostly non-matching lines with a cat every thousand entries
fn large_dictionary() -> TempPath {
    let mut file = NamedTempFile::new().expect("temp file");
    for i in 0..200_000 {
        if i % 1000 == 0 {
            writeln!(file, "猫 [ねこ] /(n) cat/(P)/").expect("write line");
        } else {
            writeln!(file, "犬{i} [いぬ] /(n) dog number {i}/").expect("write line");
        }
    }
    file.flush().expect("flush");
    file.into_temp_path()
}

#[test]
fn test_results_come_out_best_first() {
    let file = dictionary_file(&[
        "# EDICT header comment",
        "子猫 [こねこ] /(n) kitten/",
        "not an edict line",
        "猫の手 [ねこのて] /(exp) extra help/",
        "",
        "猫 [ねこ] /(n) cat/(P)/",
        "犬 [いぬ] /(n) dog/",
        "猫 [びょう] /(n) cat (archaic reading)/",
    ]);
    let search = Search::new(query("猫", QueryFlags::default()), edict(&file), Caps::default()).unwrap();

    search.start(false).unwrap();
    assert_eq!(search.status(), SearchStatus::Idle);
    assert_eq!(search.outcome(), Some(Outcome::Completed));
    assert_eq!(search.progress(), 1.0);
    assert_eq!(search.counts(), [2, 1, 1]);

    let pulled: Vec<(Relevance, String)> = std::iter::from_fn(|| search.pull_result())
        .map(|r| (r.relevance, r.record.headline().to_string()))
        .collect();
    assert_eq!(
        pulled,
        vec![
            (Relevance::High, "猫".to_string()),
            (Relevance::High, "猫".to_string()),
            (Relevance::Medium, "猫の手".to_string()),
            (Relevance::Low, "子猫".to_string()),
        ]
    );
    assert!(search.pull_result().is_none());
}

#[test]
fn test_high_bucket_keeps_file_order() {
    let file = dictionary_file(&["猫 [ねこ] /(n) cat/(P)/", "猫 [びょう] /(n) cat/"]);
    let search = Search::new(query("猫", QueryFlags::default()), edict(&file), Caps::default()).unwrap();
    search.start(false).unwrap();

    let first = search.pull_result().unwrap();
    assert!(first.record.is_important());
    let second = search.pull_result().unwrap();
    assert!(!second.record.is_important());
}

#[test]
fn test_buckets_never_exceed_caps() {
    let lines: Vec<String> = (0..50)
        .map(|i| match i % 2 {
            0 => format!("猫 [ねこ] /(n) cat {i}/"),
            _ => format!("子猫{i} [こねこ] /(n) kitten/"),
        })
        .collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let file = dictionary_file(&lines);

    let caps = Caps::from([3, 5, 4]);
    let search = Search::new(query("猫", QueryFlags::default()), edict(&file), caps).unwrap();
    search.start(false).unwrap();

    assert_eq!(search.total_results(Relevance::High), 3);
    assert_eq!(search.total_results(Relevance::Medium), 0);
    assert_eq!(search.total_results(Relevance::Low), 4);
    assert_eq!(search.counts(), [3, 0, 4]);

    // pulling doesn't reopen space in a finished run
    while search.pull_result().is_some() {}
    assert_eq!(search.counts(), [0, 0, 0]);
    assert_eq!(search.total_results(Relevance::High), 3);
}

#[test]
fn test_zero_cap_disables_tier() {
    let file = dictionary_file(&["猫 [ねこ] /(n) cat/", "子猫 [こねこ] /(n) kitten/"]);
    let caps = Caps { high: 10, medium: 10, low: 0 };
    let search = Search::new(query("猫", QueryFlags::default()), edict(&file), caps).unwrap();
    search.start(false).unwrap();
    assert_eq!(search.counts(), [1, 0, 0]);
}

#[test]
fn test_stops_once_every_bucket_is_full() {
    let file = large_dictionary();
    let caps = Caps::from([1, 0, 0]);
    let search = Search::new(query("猫", QueryFlags::default()), edict(&file), caps).unwrap();
    search.start(false).unwrap();

    assert_eq!(search.outcome(), Some(Outcome::Completed));
    assert_eq!(search.counts(), [1, 0, 0]);
    // progress reports completion even though the scan stopped early
    assert_eq!(search.progress(), 1.0);
}

#[test]
fn test_exact_mode_keeps_only_high() {
    let file = dictionary_file(&["猫 [ねこ] /(n) cat/", "子猫 [こねこ] /(n) kitten/", "猫の手 [ねこのて] /(exp) extra help/"]);
    let flags = QueryFlags::default() | QueryFlags::EXACT;
    let search = Search::new(query("猫", flags), edict(&file), Caps::default()).unwrap();
    search.start(false).unwrap();
    assert_eq!(search.counts(), [1, 0, 0]);
}

#[test]
fn test_missing_file_fails_once_and_goes_idle() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("edict.utf8");
    let search = Search::new(query("cat", QueryFlags::default()), edict(&missing), Caps::default()).unwrap();

    match search.start(true) {
        Err(SearchError::DictionaryFileUnavailable { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected DictionaryFileUnavailable, got {other:?}"),
    }
    assert_eq!(search.status(), SearchStatus::Idle);
    assert_eq!(search.outcome(), Some(Outcome::Failed));
    assert!(search.pull_result().is_none());

    // cancel after a failed start is a no-op
    search.cancel();
    assert_eq!(search.status(), SearchStatus::Idle);
}

#[test]
fn test_rejects_unusable_queries() {
    let file = dictionary_file(&["猫 [ねこ] /(n) cat/"]);

    let parsed = Query::parse("cat", DictionaryFormat::EdictLike, QueryFlags::default()).unwrap();
    let result = Search::new(Arc::new(parsed), edict(&file), Caps::default());
    assert!(matches!(result, Err(SearchError::QueryNotCompiled)));

    let kanji = compile_query("S5", DictionaryFormat::KanjiLike, QueryFlags::default()).unwrap();
    let result = Search::new(Arc::new(kanji), edict(&file), Caps::default());
    assert!(matches!(
        result,
        Err(SearchError::FormatMismatch {
            query: "kanji",
            dictionary: "edict"
        })
    ));
}

#[test]
fn test_background_search_can_be_waited_on() {
    let file = large_dictionary();
    let search = Search::new(query("cat", QueryFlags::default()), edict(&file), Caps::default()).unwrap();

    search.start(true).unwrap();
    assert_eq!(search.wait(), Some(Outcome::Completed));
    assert_eq!(search.total_results(Relevance::High), 200);
    assert_eq!(search.progress(), 1.0);
}

#[test]
fn test_live_pulls_only_return_high() {
    let mut file = NamedTempFile::new().expect("temp file");
    for i in 0..150_000 {
        let line = match i % 3 {
            0 => "猫 [ねこ] /(n) cat/",
            1 => "猫の手 [ねこのて] /(exp) extra help/",
            _ => "子猫 [こねこ] /(n) kitten/",
        };
        writeln!(file, "{line}").expect("write line");
    }
    file.flush().expect("flush");
    let file = file.into_temp_path();

    let caps = Caps::uniform(1_000_000);
    let search = Search::new(query("猫", QueryFlags::default()), edict(&file), caps).unwrap();
    search.start(true).unwrap();

    let mut pulled = [0usize; 3];
    loop {
        let result = search.pull_result();
        // status never returns to Searching within a run, so it held during the pull
        if search.status() != SearchStatus::Searching {
            if let Some(result) = result {
                pulled[result.relevance.index()] += 1;
            }
            break;
        }
        if let Some(result) = result {
            assert_eq!(result.relevance, Relevance::High, "weaker result pulled mid-scan");
            pulled[0] += 1;
        }
    }

    assert_eq!(search.wait(), Some(Outcome::Completed));
    while let Some(result) = search.pull_result() {
        pulled[result.relevance.index()] += 1;
    }
    assert_eq!(pulled, [50_000, 50_000, 50_000]);
}

#[test]
fn test_restart_begins_from_empty_buckets() {
    let file = dictionary_file(&["猫 [ねこ] /(n) cat/"]);
    let search = Search::new(query("cat", QueryFlags::default()), edict(&file), Caps::default()).unwrap();

    search.start(false).unwrap();
    search.start(false).unwrap();
    assert_eq!(search.counts(), [1, 0, 0]);

    search.start(true).unwrap();
    search.wait();
    assert_eq!(search.counts(), [1, 0, 0]);
}

#[cfg(target_os = "linux")]
fn holds_open(path: &Path) -> bool {
    let Ok(target) = path.canonicalize() else {
        return false;
    };
    std::fs::read_dir("/proc/self/fd")
        .expect("proc fd listing")
        .filter_map(Result::ok)
        .filter_map(|entry| std::fs::read_link(entry.path()).ok())
        .any(|link| link == target)
}

#[cfg(target_os = "linux")]
#[test]
fn test_status_answers_while_dictionary_opens() {
    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("edict.utf8");
    let made = std::process::Command::new("mkfifo").arg(&fifo).status().expect("mkfifo");
    assert!(made.success());

    let search = Arc::new(Search::new(query("cat", QueryFlags::default()), edict(&fifo), Caps::default()).unwrap());
    let opener = {
        let search = search.clone();
        std::thread::spawn(move || search.start(false))
    };
    // opening a fifo blocks until a writer shows up
    std::thread::sleep(Duration::from_millis(100));

    let (tx, rx) = std::sync::mpsc::channel();
    {
        let search = search.clone();
        std::thread::spawn(move || {
            let _ = tx.send((search.status(), search.pull_result().is_none()));
        });
    }
    let answered = rx.recv_timeout(Duration::from_secs(2));

    let mut writer = std::fs::OpenOptions::new().write(true).open(&fifo).expect("open fifo");
    writeln!(writer, "猫 [ねこ] /(n) cat/").expect("write line");
    drop(writer);

    assert_eq!(answered, Ok((SearchStatus::Idle, true)));
    opener.join().expect("opener panicked").unwrap();
    assert_eq!(search.counts(), [1, 0, 0]);
}

#[test]
fn test_cancel_mid_stream_stops_worker() {
    let file = large_dictionary();
    let search = Search::new(query("猫", QueryFlags::default()), edict(&file), Caps::default()).unwrap();

    search.start(true).unwrap();
    search.cancel();

    assert_eq!(search.status(), SearchStatus::Idle);
    let outcome = search.outcome();
    assert!(matches!(outcome, Some(Outcome::Canceled | Outcome::Completed)));
    if outcome == Some(Outcome::Canceled) {
        assert!(search.progress() < 1.0);
    }

    #[cfg(target_os = "linux")]
    assert!(!holds_open(&file), "dictionary handle left open after cancel");

    let counts = search.counts();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(search.counts(), counts, "results added after cancel");

    // cancelling twice is harmless
    search.cancel();
    assert_eq!(search.status(), SearchStatus::Idle);
}

#[test]
fn test_drop_cancels_running_search() {
    let file = large_dictionary();
    let search = Search::new(query("猫", QueryFlags::default()), edict(&file), Caps::default()).unwrap();
    search.start(true).unwrap();
    drop(search);

    #[cfg(target_os = "linux")]
    assert!(!holds_open(&file));
}
