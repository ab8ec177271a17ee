//! Property tests for console-level invariants: configuration validation,
//! keybindings, navigation cycling and currency formatting.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use fidus_tui::config::{ThemeConfig, TuiConfig};
use fidus_tui::keys::{map_key, Action};
use fidus_tui::nav::View;
use fidus_tui::views::helpers::format_currency;
use proptest::prelude::*;

fn base_config() -> TuiConfig {
    TuiConfig {
        api_base_url: "http://localhost:3333".to_string(),
        request_timeout_ms: 5_000,
        refresh_interval_ms: 2_000,
        cache_ttl_ms: 60_000,
        persistence_path: "tmp/fidus-tui.json".into(),
        log_path: "tmp/fidus-tui.log".into(),
        theme: ThemeConfig {
            name: "midnight".to_string(),
        },
    }
}

#[test]
fn config_accepts_valid_values() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn config_requires_http_base_url() {
    let mut config = base_config();
    config.api_base_url = "localhost:3333".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_zero_timeouts() {
    let mut config = base_config();
    config.request_timeout_ms = 0;
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.refresh_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.cache_ttl_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_known_theme() {
    let mut config = base_config();
    config.theme = ThemeConfig {
        name: "daylight".to_string(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn config_parses_from_toml() {
    let toml = r#"
        api_base_url = "http://localhost:3333"
        request_timeout_ms = 5000
        refresh_interval_ms = 2000
        cache_ttl_ms = 60000
        persistence_path = "tmp/state.json"
        log_path = "tmp/console.log"

        [theme]
        name = "midnight"
    "#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fidus-tui.toml");
    std::fs::write(&path, toml).unwrap();

    let config = TuiConfig::from_path(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.api_base_url, "http://localhost:3333");
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

proptest! {
    /// Digits 1..=5 switch to the matching view index; every other digit
    /// maps either beyond the view list or to nothing.
    #[test]
    fn keybinding_digits_switch_views(digit in 1u8..=5u8) {
        let ch = char::from(b'0' + digit);
        match map_key(key(KeyCode::Char(ch))) {
            Some(Action::SwitchView(index)) => {
                prop_assert_eq!(index, (digit - 1) as usize);
                prop_assert!(View::from_index(index).is_some());
            }
            other => prop_assert!(false, "unexpected action: {:?}", other),
        }
    }

    /// View titles are non-empty for every view.
    #[test]
    fn view_titles_never_empty(index in 0usize..View::all().len()) {
        let view = View::from_index(index).unwrap();
        prop_assert!(!view.title().is_empty());
    }

    /// Cycling forward through all views returns to the start.
    #[test]
    fn view_next_cycles(index in 0usize..View::all().len()) {
        let view = View::from_index(index).unwrap();
        let mut current = view;
        for _ in 0..View::all().len() {
            current = current.next();
        }
        prop_assert_eq!(current, view);
    }

    /// Cycling backward through all views returns to the start.
    #[test]
    fn view_previous_cycles(index in 0usize..View::all().len()) {
        let view = View::from_index(index).unwrap();
        let mut current = view;
        for _ in 0..View::all().len() {
            current = current.previous();
        }
        prop_assert_eq!(current, view);
    }

    /// next() and previous() are inverses.
    #[test]
    fn view_next_previous_inverse(index in 0usize..View::all().len()) {
        let view = View::from_index(index).unwrap();
        prop_assert_eq!(view.next().previous(), view);
        prop_assert_eq!(view.previous().next(), view);
    }

    /// Currency formatting always carries two decimals and parses back to
    /// the rounded amount.
    #[test]
    fn currency_has_two_decimals(value in 0.0f64..1_000_000_000.0) {
        let text = format_currency(value);
        prop_assert!(text.starts_with('$'));
        let decimals = text.rsplit('.').next().unwrap();
        prop_assert_eq!(decimals.len(), 2);

        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        let cents: u64 = digits.parse().unwrap();
        prop_assert_eq!(cents, (value * 100.0).round() as u64);
    }
}
