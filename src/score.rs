//! Score accumulation and high score leaderboard
//!
//! Boss death and mini-game kills report flat bonuses through [`ScoreSink`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Receiver for score bonuses
pub trait ScoreSink {
    fn add_score(&mut self, amount: u32);
}

/// Running score for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub total: u64,
    /// Number of individual awards received
    pub awards: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreSink for ScoreBoard {
    fn add_score(&mut self, amount: u32) {
        self.total += u64::from(amount);
        self.awards += 1;
    }
}

/// Leaderboard length
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished run on the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Whether the run finished the arcade stage
    pub escaped: bool,
    /// Unix timestamp (ms) of the run
    pub timestamp: f64,
}

/// Top runs, best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero never ranks; otherwise the score must beat the last entry of a full board
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0
            && (self.entries.len() < MAX_HIGH_SCORES
                || self.entries.last().is_none_or(|last| score > last.score))
    }

    /// Insert a finished run. Returns its 1-based rank, or None if it did not place.
    /// Ties rank below the runs already on the board.
    pub fn record(&mut self, score: u64, escaped: bool, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let index = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(
            index,
            HighScoreEntry {
                score,
                escaped,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Read the board from JSON; a missing file is an empty board
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no high score file at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let scores: HighScores = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        log::info!("loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string(self)?)?;
        log::debug!("saved {} high scores", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoreboard_accumulates() {
        let mut board = ScoreBoard::new();
        board.add_score(100);
        board.add_score(5000);
        assert_eq!(board.total, 5100);
        assert_eq!(board.awards, 2);
    }

    #[test]
    fn test_leaderboard_orders_and_truncates() {
        let mut scores = HighScores::new();
        for i in 1..=12u64 {
            scores.record(i * 10, false, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(120));
        assert!(!scores.qualifies(20));
        assert_eq!(scores.record(1000, true, 0.0), Some(1));
    }

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!HighScores::new().qualifies(0));
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("maze-escape-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_board_survives_save_and_load() {
        let path = temp_path("scores");
        let mut scores = HighScores::new();
        scores.record(300, false, 1_000.0);
        scores.record(900, true, 2_000.0);
        scores.save(&path).unwrap();

        let loaded = HighScores::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let got: Vec<_> = loaded
            .entries
            .iter()
            .map(|e| (e.score, e.escaped, e.timestamp))
            .collect();
        assert_eq!(got, vec![(900, true, 2_000.0), (300, false, 1_000.0)]);
    }

    #[test]
    fn test_missing_file_loads_empty_board() {
        let scores = HighScores::load(temp_path("absent")).unwrap();
        assert!(scores.entries.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "[not a board").unwrap();
        let err = HighScores::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, crate::MazeError::Json(_)));
    }

    #[test]
    fn test_tie_ranks_below_existing() {
        let mut scores = HighScores::new();
        scores.record(500, false, 0.0);
        assert_eq!(scores.record(500, true, 1.0), Some(2));
        assert!(!scores.entries[0].escaped);
    }
}
