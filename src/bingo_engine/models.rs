use std::fmt;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Text used to pad a board when the goal pool runs short.
pub const PLACEHOLDER_GOAL: &str = "Your goal here";

/// Text of the free-space tile.
pub const FREE_SPACE_TEXT: &str = "Free";

/// Strike budget granted on every fresh board or mark reset.
pub const STRIKES_MAX: u8 = 3;

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// One cell of the bingo card.
///
/// `text` and `checked` are required when deserializing; `free` and `skipped`
/// default to `false` so tiles written before skipping existed still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub text: String,
    pub checked: bool,
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub skipped: bool,
}

impl Tile {
    /// An unchecked goal tile.
    pub fn goal(text: impl Into<String>) -> Self {
        Tile { text: text.into(), checked: false, free: false, skipped: false }
    }

    /// The permanently checked center tile.
    pub fn free_space() -> Self {
        Tile { text: FREE_SPACE_TEXT.to_string(), checked: true, free: true, skipped: false }
    }

    /// Free and skipped tiles ignore plain taps.
    pub fn is_locked(&self) -> bool {
        self.free || self.skipped
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match (self.free, self.skipped, self.checked) {
            (true, _, _)      => "*",
            (_, true, _)      => "~",
            (_, _, true)      => "x",
            _                 => " ",
        };
        write!(f, "[{}] {}", mark, self.text)
    }
}

/// Row-major tiles; empty means no board has been generated yet.
pub type Board = Vec<Tile>;

// ---------------------------------------------------------------------------
// Setup values
// ---------------------------------------------------------------------------

/// Edge length of the card, always within `3..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct BoardSize(u8);

impl BoardSize {
    pub const MIN: u8 = 3;
    pub const MAX: u8 = 5;

    /// Clamp any integer into the supported range.
    pub fn clamped(n: i64) -> Self {
        BoardSize(n.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn tile_count(self) -> usize {
        self.get() * self.get()
    }

    pub fn is_odd(self) -> bool {
        self.0 % 2 == 1
    }

    /// Index of the middle tile (`floor(size*size/2)`).
    pub fn center(self) -> usize {
        self.tile_count() / 2
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        BoardSize(5)
    }
}

impl From<u8> for BoardSize {
    fn from(n: u8) -> Self {
        BoardSize::clamped(n as i64)
    }
}

impl From<BoardSize> for u8 {
    fn from(size: BoardSize) -> Self {
        size.0
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.0, self.0)
    }
}

/// What it takes to win a card.
///
/// The wire form is the string used by the setup select: `"1"`, `"2"`, `"3"`,
/// `"5"` or `"blackout"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WinCondition {
    /// At least this many completed lines.
    Lines(u8),
    /// Every tile checked.
    Blackout,
}

impl WinCondition {
    /// Lenient parse: `"blackout"`, otherwise the leading integer when it is
    /// at least 1, otherwise one line.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("blackout") {
            return WinCondition::Blackout;
        }
        let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
        match digits.parse::<u64>() {
            Ok(n) if n >= 1 => WinCondition::Lines(n.min(u8::MAX as u64) as u8),
            _               => WinCondition::Lines(1),
        }
    }

    /// Lines required, or `None` for blackout.
    pub fn required_lines(self) -> Option<usize> {
        match self {
            WinCondition::Lines(n) => Some(n as usize),
            WinCondition::Blackout => None,
        }
    }

    pub fn is_blackout(self) -> bool {
        matches!(self, WinCondition::Blackout)
    }
}

impl Default for WinCondition {
    fn default() -> Self {
        WinCondition::Lines(1)
    }
}

impl fmt::Display for WinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinCondition::Lines(n) => write!(f, "{}", n),
            WinCondition::Blackout => write!(f, "blackout"),
        }
    }
}

impl Serialize for WinCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WinCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(i64),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Text(s)   => Ok(WinCondition::parse(&s)),
            Wire::Number(n) if n >= 1 => Ok(WinCondition::Lines(n.min(u8::MAX as i64) as u8)),
            Wire::Number(n) => Err(de::Error::custom(format!("win condition must be positive, got {n}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Goal pool
// ---------------------------------------------------------------------------

/// Candidate goal texts, unique case-insensitively, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct GoalPool(Vec<String>);

impl GoalPool {
    pub fn new() -> Self {
        GoalPool(Vec::new())
    }

    /// Build a pool from raw entries, trimming and dropping blanks and
    /// case-insensitive repeats (first spelling wins).
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pool = GoalPool::new();
        for line in lines {
            pool.push(line.as_ref());
        }
        pool
    }

    /// Split a newline-separated block of goals, as typed into the setup box.
    pub fn from_text(text: &str) -> Self {
        GoalPool::from_lines(text.lines())
    }

    /// The built-in goals used when the player has not entered any.
    pub fn sample() -> Self {
        GoalPool::from_lines(SAMPLE_GOALS)
    }

    /// Add one goal; returns `false` when it was blank or already present.
    pub fn push(&mut self, goal: &str) -> bool {
        let goal = goal.trim();
        if goal.is_empty() || self.contains(goal) {
            return false;
        }
        self.0.push(goal.to_string());
        true
    }

    /// Case-insensitive membership.
    pub fn contains(&self, goal: &str) -> bool {
        let key = goal.trim().to_lowercase();
        self.0.iter().any(|g| g.to_lowercase() == key)
    }

    pub fn goals(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One goal per line, the inverse of [`GoalPool::from_text`].
    pub fn to_text(&self) -> String {
        self.0.join("\n")
    }
}

impl From<Vec<String>> for GoalPool {
    fn from(lines: Vec<String>) -> Self {
        GoalPool::from_lines(lines)
    }
}

impl From<GoalPool> for Vec<String> {
    fn from(pool: GoalPool) -> Self {
        pool.0
    }
}

const SAMPLE_GOALS: [&str; 25] = [
    "Read 20 pages",
    "Write 200 words",
    "Journal 5 minutes",
    "Drink 2L of water",
    "Walk 20 minutes",
    "Stretch 10 minutes",
    "Tidy one small area",
    "Meditate 5 minutes",
    "Plan tomorrow (3 tasks)",
    "No social media for 1 hour",
    "Practice a skill 15 minutes",
    "Learn 10 new words",
    "Send a kind message",
    "Cook a healthy meal",
    "Do a 10-minute workout",
    "Sleep by a set time",
    "Review finances for 10 minutes",
    "Read a chapter",
    "Listen to an educational podcast",
    "Do one hard thing you're avoiding",
    "Clean your desk",
    "Take a short break outside",
    "Write 3 gratitudes",
    "Declutter 5 items",
    "Organize your notes",
];

/// Everything the setup screen configures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetup {
    pub size: BoardSize,
    pub free: bool,
    pub win: WinCondition,
    pub goals: GoalPool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Start,
    Play,
    Over,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Start => write!(f, "start"),
            Screen::Play  => write!(f, "play"),
            Screen::Over  => write!(f, "over"),
        }
    }
}

/// The three limited-use tile actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrikeAction {
    Edit,
    Skip,
    Replace,
}

impl fmt::Display for StrikeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrikeAction::Edit    => write!(f, "edit"),
            StrikeAction::Skip    => write!(f, "skip"),
            StrikeAction::Replace => write!(f, "replace"),
        }
    }
}

/// The complete state of one game: setup, board, score and clock.
///
/// Timestamps are Unix milliseconds; `started_at == 0` means the clock has not
/// started. `screen` and `editing` are view state and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub size: BoardSize,
    pub free_enabled: bool,
    pub win_condition: WinCondition,
    pub goal_pool: GoalPool,
    pub board: Board,
    pub started_at: i64,
    /// Unclamped; may go negative after penalties.
    pub score: i64,
    pub bingos: usize,
    pub won: bool,
    pub last_bingo_lines_key: String,
    pub strikes_left: u8,
    pub timer_paused: bool,
    pub paused_at: i64,
    pub accumulated_pause_ms: i64,
    pub elapsed_ms_at_win: i64,
    pub keep_playing_dismissed: bool,
    pub screen: Screen,
    /// Tile whose strike-paid editor is open.
    pub editing: Option<usize>,
}

impl GameSession {
    pub fn new(setup: SessionSetup) -> Self {
        GameSession {
            size: setup.size,
            free_enabled: setup.free,
            win_condition: setup.win,
            goal_pool: setup.goals,
            ..GameSession::default()
        }
    }

    pub fn setup(&self) -> SessionSetup {
        SessionSetup {
            size: self.size,
            free: self.free_enabled,
            win: self.win_condition,
            goals: self.goal_pool.clone(),
        }
    }

    /// True once a board matching the current size exists.
    pub fn has_board(&self) -> bool {
        !self.board.is_empty() && self.board.len() == self.size.tile_count()
    }

    /// Index of the free tile for the current setup, if any.
    pub fn free_index(&self) -> Option<usize> {
        if self.free_enabled && self.size.is_odd() {
            Some(self.size.center())
        } else {
            None
        }
    }

    /// Goal texts a full board needs.
    pub fn goals_needed(&self) -> usize {
        self.size.tile_count() - usize::from(self.free_index().is_some())
    }

    pub fn marked_count(&self) -> usize {
        self.board.iter().filter(|t| t.checked).count()
    }

    /// Score as shown to the player.
    pub fn display_score(&self) -> i64 {
        self.score.max(0)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession {
            size: BoardSize::default(),
            free_enabled: true,
            win_condition: WinCondition::default(),
            goal_pool: GoalPool::new(),
            board: Vec::new(),
            started_at: 0,
            score: 0,
            bingos: 0,
            won: false,
            last_bingo_lines_key: String::new(),
            strikes_left: STRIKES_MAX,
            timer_paused: false,
            paused_at: 0,
            accumulated_pause_ms: 0,
            elapsed_ms_at_win: 0,
            keep_playing_dismissed: false,
            screen: Screen::Start,
            editing: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_size_clamps_into_range() {
        assert_eq!(BoardSize::clamped(1).get(), 3);
        assert_eq!(BoardSize::clamped(4).get(), 4);
        assert_eq!(BoardSize::clamped(99).get(), 5);
        assert_eq!(BoardSize::clamped(5).center(), 12);
    }

    #[test]
    fn win_condition_parses_leniently() {
        assert_eq!(WinCondition::parse("blackout"), WinCondition::Blackout);
        assert_eq!(WinCondition::parse("3"), WinCondition::Lines(3));
        assert_eq!(WinCondition::parse("2 lines"), WinCondition::Lines(2));
        assert_eq!(WinCondition::parse("0"), WinCondition::Lines(1));
        assert_eq!(WinCondition::parse("nonsense"), WinCondition::Lines(1));
    }

    #[test]
    fn win_condition_wire_form() {
        let json = serde_json::to_string(&WinCondition::Blackout).unwrap();
        assert_eq!(json, "\"blackout\"");
        let back: WinCondition = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(back, WinCondition::Lines(5));
        let numeric: WinCondition = serde_json::from_str("2").unwrap();
        assert_eq!(numeric, WinCondition::Lines(2));
    }

    #[test]
    fn goal_pool_dedupes_case_insensitively() {
        let pool = GoalPool::from_text("  Read  \nread\n\nWalk\nREAD\nwalk ");
        assert_eq!(pool.goals(), &["Read".to_string(), "Walk".to_string()]);
        assert!(pool.contains("WALK"));
    }

    #[test]
    fn sample_pool_fills_a_five_by_five_card() {
        assert_eq!(GoalPool::sample().len(), 25);
    }

    #[test]
    fn tile_requires_text_and_checked() {
        let legacy: Tile = serde_json::from_str(r#"{"text":"a","checked":true,"free":false}"#).unwrap();
        assert!(!legacy.skipped);
        assert!(serde_json::from_str::<Tile>(r#"{"checked":true}"#).is_err());
        assert!(serde_json::from_str::<Tile>(r#"{"text":"a"}"#).is_err());
    }

    #[test]
    fn goals_needed_accounts_for_free_space() {
        let mut s = GameSession::default();
        assert_eq!(s.goals_needed(), 24);
        s.size = BoardSize::clamped(4);
        assert_eq!(s.goals_needed(), 16);
        assert_eq!(s.free_index(), None);
    }
}
