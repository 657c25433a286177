use crate::{
    error::ChartId,
    game::{Game, Mode, Selection},
};

/// Inclusive id interval, optionally only applying to one game.
#[derive(Debug, Clone, Copy)]
pub struct SkippedInterval {
    pub lo: ChartId,
    pub hi: ChartId,
    pub game: Option<Game>,
}

impl SkippedInterval {
    fn covers(&self, chart_id: ChartId, game: Game) -> bool {
        let in_scope = self.game.is_none_or(|scoped| scoped == game);
        in_scope && (self.lo..=self.hi).contains(&chart_id)
    }
}

/// Chart that sits outside its selection's contiguous range.
#[derive(Debug, Clone, Copy)]
pub struct ExtraChart {
    pub game: Game,
    pub mode: Mode,
    pub chart_id: ChartId,
}

/// Known anomalies in the site's id space: retired or duplicated charts to
/// skip, and relocated charts to fetch in addition to the range.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionPolicy {
    pub skipped_ids: &'static [ChartId],
    pub skipped_intervals: &'static [SkippedInterval],
    pub extra_charts: &'static [ExtraChart],
}

pub const KNOWN_EXCLUSIONS: ExclusionPolicy = ExclusionPolicy {
    skipped_ids: &[1154, 16403, 141607, 141660, 141774],
    skipped_intervals: &[
        SkippedInterval {
            lo: 15188,
            hi: 16401,
            game: None,
        },
        // SMB2 PAL time charts live inside the SMB2 time range.
        SkippedInterval {
            lo: 141804,
            hi: 141949,
            game: Some(Game::Smb2),
        },
    ],
    extra_charts: &[
        ExtraChart {
            game: Game::Smb1,
            mode: Mode::Score,
            chart_id: 367365,
        },
        ExtraChart {
            game: Game::Smb1,
            mode: Mode::Time,
            chart_id: 367366,
        },
    ],
};

impl Default for ExclusionPolicy {
    fn default() -> Self {
        KNOWN_EXCLUSIONS
    }
}

impl ExclusionPolicy {
    pub fn is_skipped(&self, chart_id: ChartId, game: Game) -> bool {
        self.skipped_ids.contains(&chart_id)
            || self
                .skipped_intervals
                .iter()
                .any(|interval| interval.covers(chart_id, game))
    }

    /// Ids processed after the main range, without consulting `is_skipped`.
    pub fn extra_ids(&self, selection: Selection) -> Vec<ChartId> {
        self.extra_charts
            .iter()
            .filter(|extra| extra.game == selection.game && extra.mode == selection.mode)
            .map(|extra| extra.chart_id)
            .collect()
    }
}
