use std::collections::HashSet;
use crate::bingo_engine::models::{Tile, WinCondition};

/// Every line that can complete a bingo on a `size`×`size` card.
///
/// Always `2*size + 2` lines: rows, then columns, then the main diagonal and
/// the anti-diagonal. Each line lists row-major board indices.
pub fn candidate_lines(size: usize) -> Vec<Vec<usize>> {
    let mut lines = Vec::with_capacity(2 * size + 2);
    for r in 0..size {
        lines.push((0..size).map(|c| r * size + c).collect());
    }
    for c in 0..size {
        lines.push((0..size).map(|r| r * size + c).collect());
    }
    lines.push((0..size).map(|i| i * size + i).collect());
    lines.push((0..size).map(|i| i * size + (size - 1 - i)).collect());
    lines
}

/// Result of scanning a board for completed lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEvaluation {
    pub bingo_count: usize,
    pub winning_lines: Vec<Vec<usize>>,
}

impl LineEvaluation {
    /// Board-wide key of the completed lines, see [`board_key`].
    pub fn key(&self) -> String {
        board_key(&self.winning_lines)
    }
}

/// Count the lines whose tiles are all checked.
///
/// Free and skipped tiles count because they are checked. Indices beyond the
/// end of a short board count as unchecked.
pub fn evaluate_lines(board: &[Tile], size: usize) -> LineEvaluation {
    let winning_lines: Vec<Vec<usize>> = candidate_lines(size)
        .into_iter()
        .filter(|line| line.iter().all(|&i| board.get(i).map_or(false, |t| t.checked)))
        .collect();
    LineEvaluation { bingo_count: winning_lines.len(), winning_lines }
}

/// Canonical key of one line: its indices sorted and comma-joined.
pub fn line_key(line: &[usize]) -> String {
    let mut sorted = line.to_vec();
    sorted.sort_unstable();
    sorted.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}

/// Canonical key of a set of lines: line keys sorted and pipe-joined.
pub fn board_key(lines: &[Vec<usize>]) -> String {
    let mut keys: Vec<String> = lines.iter().map(|l| line_key(l)).collect();
    keys.sort();
    keys.join("|")
}

/// Lines present in `next_key` that were not in `prev_key`.
pub fn newly_completed(prev_key: &str, next_key: &str) -> usize {
    let prev: HashSet<&str> = prev_key.split('|').filter(|k| !k.is_empty()).collect();
    next_key
        .split('|')
        .filter(|k| !k.is_empty())
        .collect::<HashSet<&str>>()
        .into_iter()
        .filter(|k| !prev.contains(k))
        .count()
}

/// Does the board satisfy the win condition?
///
/// Blackout needs a non-empty board with every tile checked; otherwise the
/// completed-line count must reach the target.
pub fn is_win(board: &[Tile], bingos: usize, condition: WinCondition) -> bool {
    match condition.required_lines() {
        Some(need) => bingos >= need,
        None       => !board.is_empty() && board.iter().all(|t| t.checked),
    }
}
