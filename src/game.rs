use std::fmt;

use crate::error::{ChartId, ScrapeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    Smb1,
    Smb2,
    Smb2Pal,
    SmbDx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Score,
    Time,
}

impl Game {
    pub const ALL: [Game; 4] = [Game::Smb1, Game::Smb2, Game::Smb2Pal, Game::SmbDx];

    /// Parses the single-letter code used at the prompt.
    pub fn from_letter(letter: &str) -> Result<Self, ScrapeError> {
        match letter.trim().to_lowercase().as_str() {
            "1" => Ok(Game::Smb1),
            "2" => Ok(Game::Smb2),
            "p" => Ok(Game::Smb2Pal),
            "d" => Ok(Game::SmbDx),
            other => Err(ScrapeError::configuration(format!(
                "unknown game {other:?} (expected 1, 2, p or d)"
            ))),
        }
    }

    /// Directory name under the output root.
    pub fn name(self) -> &'static str {
        match self {
            Game::Smb1 => "smb1",
            Game::Smb2 => "smb2",
            Game::Smb2Pal => "smb2pal",
            Game::SmbDx => "smbdx",
        }
    }
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Score, Mode::Time];

    pub fn from_letter(letter: &str) -> Result<Self, ScrapeError> {
        match letter.trim().to_lowercase().as_str() {
            "s" => Ok(Mode::Score),
            "t" => Ok(Mode::Time),
            other => Err(ScrapeError::configuration(format!(
                "unknown mode {other:?} (expected s or t)"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Score => "score",
            Mode::Time => "time",
        }
    }

    /// Column title for the value column.
    pub fn column_title(self) -> &'static str {
        match self {
            Mode::Score => "Score",
            Mode::Time => "Time",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub game: Game,
    pub mode: Mode,
}

impl Selection {
    pub fn new(game: Game, mode: Mode) -> Self {
        Self { game, mode }
    }

    pub fn from_letters(game: &str, mode: &str) -> Result<Self, ScrapeError> {
        Ok(Self::new(Game::from_letter(game)?, Mode::from_letter(mode)?))
    }

    /// Every known selection, in the order an "all charts" run visits them.
    pub fn all() -> impl Iterator<Item = Selection> {
        Game::ALL
            .into_iter()
            .flat_map(|game| Mode::ALL.into_iter().map(move |mode| Selection::new(game, mode)))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.game, self.mode)
    }
}

/// Inclusive range of chart ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartRange {
    pub start: ChartId,
    pub end: ChartId,
}

impl ChartRange {
    pub fn ids(self) -> impl Iterator<Item = ChartId> {
        self.start..=self.end
    }
}

const CHART_RANGES: &[(Game, Mode, ChartRange)] = &[
    (
        Game::Smb1,
        Mode::Score,
        ChartRange {
            start: 1054,
            end: 1171,
        },
    ),
    (
        Game::Smb1,
        Mode::Time,
        ChartRange {
            start: 141568,
            end: 141666,
        },
    ),
    (
        Game::Smb2,
        Mode::Score,
        ChartRange {
            start: 1401,
            end: 1550,
        },
    ),
    (
        Game::Smb2,
        Mode::Time,
        ChartRange {
            start: 141667,
            end: 141959,
        },
    ),
    (
        Game::Smb2Pal,
        Mode::Score,
        ChartRange {
            start: 22451,
            end: 22600,
        },
    ),
    (
        Game::Smb2Pal,
        Mode::Time,
        ChartRange {
            start: 141804,
            end: 141949,
        },
    ),
    (
        Game::SmbDx,
        Mode::Score,
        ChartRange {
            start: 14888,
            end: 16412,
        },
    ),
    (
        Game::SmbDx,
        Mode::Time,
        ChartRange {
            start: 141271,
            end: 141558,
        },
    ),
];

/// Looks up the chart id range for a selection. `None` means the table has
/// no entry, which the orchestrator treats as a configuration error.
pub fn resolve_range(selection: Selection) -> Option<ChartRange> {
    CHART_RANGES
        .iter()
        .find(|(game, mode, _)| *game == selection.game && *mode == selection.mode)
        .map(|(_, _, range)| *range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_selection_has_an_ordered_range() {
        for selection in Selection::all() {
            let range = resolve_range(selection).unwrap();
            assert!(range.start <= range.end, "{selection}: {range:?}");
        }
        assert_eq!(Selection::all().count(), 8);
    }

    #[test]
    fn letters_are_case_insensitive() {
        let selection = Selection::from_letters("P", " T\n").unwrap();
        assert_eq!(selection, Selection::new(Game::Smb2Pal, Mode::Time));
    }

    #[test]
    fn unknown_letters_are_configuration_errors() {
        assert!(matches!(
            Selection::from_letters("3", "s"),
            Err(ScrapeError::Configuration { .. })
        ));
        assert!(matches!(
            Selection::from_letters("1", "x"),
            Err(ScrapeError::Configuration { .. })
        ));
    }

    #[test]
    fn smb1_score_range() {
        let range = resolve_range(Selection::new(Game::Smb1, Mode::Score)).unwrap();
        assert_eq!(range, ChartRange { start: 1054, end: 1171 });
        assert_eq!(range.ids().count(), 118);
    }
}
