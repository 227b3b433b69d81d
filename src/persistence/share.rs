//! Share links: a card's setup packed into a URL fragment.
//!
//! The fragment is `share=<base64>` where the payload is the UTF-8 JSON
//! object `{ "s": size, "f": 1|0, "w": win, "g": [goals] }`, encoded with the
//! standard base64 alphabet.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::Value;

use crate::bingo_engine::models::{BoardSize, GameSession, GoalPool, SessionSetup, WinCondition};
use crate::persistence::{error::ShareError, schema::fields};

const SHARE_PREFIX: &str = "share=";

#[derive(Serialize)]
struct SharePayload<'a> {
    s: BoardSize,
    f: u8,
    w: WinCondition,
    g: &'a GoalPool,
}

/// `share=<base64>` for the given setup, without the leading `#`.
pub fn encode_share(setup: &SessionSetup) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(&SharePayload {
        s: setup.size,
        f: u8::from(setup.free),
        w: setup.win,
        g: &setup.goals,
    })?;
    Ok(format!("{SHARE_PREFIX}{}", STANDARD.encode(json)))
}

/// A full link: `base` with any existing fragment replaced.
pub fn share_url(base: &str, setup: &SessionSetup) -> Result<String, serde_json::Error> {
    let base = base.split('#').next().unwrap_or(base);
    Ok(format!("{base}#{}", encode_share(setup)?))
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Extract and decode a share payload from a fragment or whole URL.
pub fn decode_share(fragment: &str) -> Result<SessionSetup, ShareError> {
    let start = fragment.find(SHARE_PREFIX).ok_or(ShareError::Missing)? + SHARE_PREFIX.len();
    let encoded: String = fragment[start..].chars().take_while(|&c| is_base64_char(c)).collect();
    if encoded.is_empty() {
        return Err(ShareError::Missing);
    }

    let json = String::from_utf8(STANDARD.decode(encoded)?)?;
    let value: Value = serde_json::from_str(&json)?;
    let obj = value.as_object().ok_or(ShareError::MissingGoals)?;
    if !obj.get("g").map_or(false, Value::is_array) {
        return Err(ShareError::MissingGoals);
    }

    Ok(SessionSetup {
        size: BoardSize::clamped(fields::int(obj, "s").filter(|&n| n != 0).unwrap_or(5)),
        free: fields::flag(obj, "f"),
        win: fields::win(obj, "w"),
        goals: fields::goals(obj, "g"),
    })
}

/// A session built from a shared setup: no board, no progress.
pub fn apply_share(setup: SessionSetup) -> GameSession {
    GameSession::new(setup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> SessionSetup {
        SessionSetup {
            size: BoardSize::clamped(4),
            free: false,
            win: WinCondition::Blackout,
            goals: GoalPool::from_lines(["Read", "Run 5k", "Café visit"]),
        }
    }

    #[test]
    fn link_carries_the_setup() {
        let url = share_url("https://example.test/bingo#old", &setup()).unwrap();
        assert!(url.starts_with("https://example.test/bingo#share="));
        assert_eq!(decode_share(&url).unwrap(), setup());
    }

    #[test]
    fn payload_shape() {
        let encoded = encode_share(&setup()).unwrap();
        let raw = STANDARD.decode(&encoded[SHARE_PREFIX.len()..]).unwrap();
        let value: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["s"], 4);
        assert_eq!(value["f"], 0);
        assert_eq!(value["w"], "blackout");
        assert_eq!(value["g"][2], "Café visit");
    }

    #[test]
    fn decode_is_lenient_about_goals_and_trailing_text() {
        let json = r#"{"s":"9","f":1,"w":"2","g":["a",3,"",null,"A"]}"#;
        let fragment = format!("#foo&share={}&x=1", STANDARD.encode(json));
        let decoded = decode_share(&fragment).unwrap();
        assert_eq!(decoded.size.get(), 5);
        assert!(decoded.free);
        assert_eq!(decoded.win, WinCondition::Lines(2));
        assert_eq!(decoded.goals.goals(), &["a".to_string(), "3".to_string()]);
    }

    #[test]
    fn decode_failures() {
        assert!(matches!(decode_share("#nothing"), Err(ShareError::Missing)));
        assert!(matches!(decode_share("#share="), Err(ShareError::Missing)));
        assert!(matches!(decode_share("#share=abc"), Err(ShareError::Base64(_))));
        let no_goals = format!("share={}", STANDARD.encode(r#"{"s":3,"g":"x"}"#));
        assert!(matches!(decode_share(&no_goals), Err(ShareError::MissingGoals)));
        let not_json = format!("share={}", STANDARD.encode("hello"));
        assert!(matches!(decode_share(&not_json), Err(ShareError::Json(_))));
    }

    #[test]
    fn applying_a_share_clears_progress() {
        let s = apply_share(setup());
        assert!(s.board.is_empty());
        assert_eq!(s.score, 0);
        assert_eq!(s.goal_pool.len(), 3);
        assert!(!s.free_enabled);
    }
}
