use kotoba_core::Relevance;
use kotoba_core::types::{AppEvent, DisplayResult};

use crate::output::{format_result, render};

fn cat() -> DisplayResult {
    DisplayResult {
        relevance: Relevance::High,
        term: "猫".to_string(),
        reading: "ねこ".to_string(),
        definition: "cat".to_string(),
        important: true,
    }
}

#[test]
fn test_plain_lines() {
    assert_eq!(format_result(&cat()), "[H] 猫 [ねこ] cat (P)");

    let bare = DisplayResult {
        relevance: Relevance::Low,
        reading: String::new(),
        important: false,
        ..cat()
    };
    assert_eq!(format_result(&bare), "[L] 猫 cat");
}

#[test]
fn test_json_lines() {
    let lines = render(&AppEvent::ShowResults(vec![cat()]), true).unwrap();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["term"], "猫");
    assert_eq!(value["relevance"], "High");
    assert_eq!(value["important"], true);
}

#[test]
fn test_empty_search_says_so() {
    let finished = AppEvent::SearchFinished {
        dictionary: "English".to_string(),
        total: 0,
    };
    assert_eq!(render(&finished, false).unwrap(), vec!["No results found"]);

    let finished = AppEvent::SearchFinished {
        dictionary: "English".to_string(),
        total: 4,
    };
    assert!(render(&finished, false).unwrap().is_empty());
}

#[test]
fn test_prompt_commands() {
    use crate::input::parse_line;

    assert!(matches!(parse_line(":dict Kanji"), Some(AppEvent::SelectDictionary(n)) if n == "Kanji"));
    assert!(matches!(parse_line(":cancel"), Some(AppEvent::CancelSearch)));
    assert!(matches!(parse_line(":quit"), Some(AppEvent::Shutdown)));
    assert!(matches!(parse_line("  猫  "), Some(AppEvent::TextInput(t)) if t == "猫"));
    assert!(parse_line("   ").is_none());
}
