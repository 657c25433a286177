use std::{collections::HashSet, path::PathBuf, sync::Mutex};

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};

use crate::{
    chart_parser::{derive_chart_name, parse_chart_page},
    chart_writer::{ensure_directory, selection_dir, write_chart},
    config::{ParseFailurePolicy, ScrapingConfig},
    error::{ChartId, ScrapeError},
    exclusions::ExclusionPolicy,
    game::{Selection, resolve_range},
    record::{Record, normalize},
    requests::PageSource,
};

/// One chart that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOutcome {
    pub chart_id: ChartId,
    pub name: String,
    pub path: PathBuf,
    pub records_written: usize,
    pub records_dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub charts_written: Vec<ChartOutcome>,
    pub charts_excluded: usize,
    pub charts_failed: Vec<(ChartId, String)>,
}

impl RunSummary {
    pub fn records_written(&self) -> usize {
        self.charts_written.iter().map(|c| c.records_written).sum()
    }

    pub fn records_dropped(&self) -> usize {
        self.charts_written.iter().map(|c| c.records_dropped).sum()
    }
}

pub struct ScrapeOrchestrator<'a, S> {
    source: &'a S,
    config: &'a ScrapingConfig,
    exclusions: ExclusionPolicy,
}

impl<'a, S: PageSource> ScrapeOrchestrator<'a, S> {
    pub fn new(source: &'a S, config: &'a ScrapingConfig) -> Self {
        Self {
            source,
            config,
            exclusions: ExclusionPolicy::default(),
        }
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionPolicy) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// The ids a run visits: the range minus exclusions, then the extras.
    pub fn chart_ids(&self, selection: Selection) -> Result<(Vec<ChartId>, usize), ScrapeError> {
        let range = resolve_range(selection).ok_or_else(|| {
            ScrapeError::configuration(format!("no chart range known for {selection}"))
        })?;

        let (kept, excluded): (Vec<ChartId>, Vec<ChartId>) = range
            .ids()
            .partition(|&id| !self.exclusions.is_skipped(id, selection.game));
        for id in &excluded {
            debug!("chart {id} excluded from {selection}");
        }

        let ids = kept
            .into_iter()
            .chain(self.exclusions.extra_ids(selection))
            .collect();
        Ok((ids, excluded.len()))
    }

    pub async fn run(&self, selection: Selection) -> Result<RunSummary, ScrapeError> {
        let (ids, excluded) = self.chart_ids(selection)?;

        let dir = selection_dir(&self.config.output_dir, selection);
        match ensure_directory(&dir) {
            Ok(true) => info!("{} created", dir.display()),
            Ok(false) => info!("{} already exists, continuing", dir.display()),
            // Each chart will report its own write failure.
            Err(e) => error!("could not create {}: {e}", dir.display()),
        }

        info!("Beginning data collection for {selection} ({} charts)", ids.len());

        let mut summary = RunSummary {
            charts_excluded: excluded,
            ..RunSummary::default()
        };

        let claimed_names = Mutex::new(HashSet::new());
        let mut charts = stream::iter(ids)
            .map(|chart_id| self.process_chart(selection, chart_id, &claimed_names))
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some(result) = charts.next().await {
            match result {
                Ok(outcome) => summary.charts_written.push(outcome),
                Err(e @ (ScrapeError::Parse { .. } | ScrapeError::MalformedTitle { .. }))
                    if self.config.on_parse_failure == ParseFailurePolicy::Abort =>
                {
                    error!("{e}; aborting {selection}");
                    return Err(e);
                }
                Err(e) => {
                    warn!("skipping chart: {e}");
                    let chart_id = e.chart_id().unwrap_or_default();
                    summary.charts_failed.push((chart_id, e.to_string()));
                }
            }
        }

        info!(
            "Data collection of {selection} complete: {} charts, {} records",
            summary.charts_written.len(),
            summary.records_written()
        );
        Ok(summary)
    }

    async fn process_chart(
        &self,
        selection: Selection,
        chart_id: ChartId,
        claimed_names: &Mutex<HashSet<String>>,
    ) -> Result<ChartOutcome, ScrapeError> {
        let markup = self
            .source
            .fetch_chart(chart_id)
            .await
            .map_err(|source| ScrapeError::Fetch {
                chart_id,
                source: source.into(),
            })?;

        let page = parse_chart_page(chart_id, &markup)?;
        let name = claim_name(
            claimed_names,
            derive_chart_name(chart_id, &page.title_tokens, selection)?,
            chart_id,
        );
        info!("Getting {name} data (chart {chart_id})...");

        let profile = self.config.profile_for(selection.mode);
        let mut records: Vec<Record> = Vec::with_capacity(page.rows.len());
        let mut records_dropped = 0;
        for (row_index, row) in page.rows.iter().enumerate() {
            match normalize(row, selection.mode, profile) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    records_dropped += 1;
                    warn!("{}", ScrapeError::normalization(chart_id, row_index, reason));
                }
            }
        }

        let path = selection_dir(&self.config.output_dir, selection).join(format!("{name}.csv"));
        let records_written =
            write_chart(chart_id, &path, &profile.header(selection.mode), &records)?;

        Ok(ChartOutcome {
            chart_id,
            name,
            path,
            records_written,
            records_dropped,
        })
    }

    /// Every selection in turn. `on_finished` sees each completed selection
    /// as soon as it is done, so an abort later on does not hide earlier runs.
    pub async fn run_all(
        &self,
        mut on_finished: impl FnMut(Selection, &RunSummary),
    ) -> Result<Vec<(Selection, RunSummary)>, ScrapeError> {
        let mut summaries = Vec::new();
        for selection in Selection::all() {
            let summary = self.run(selection).await?;
            on_finished(selection, &summary);
            summaries.push((selection, summary));
        }
        Ok(summaries)
    }
}

/// Reserves a file name within one selection. A second chart with the same
/// title gets its id appended instead of overwriting the first file.
fn claim_name(claimed: &Mutex<HashSet<String>>, name: String, chart_id: ChartId) -> String {
    let mut claimed = claimed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if claimed.insert(name.clone()) {
        return name;
    }
    let unique = format!("{name}-{chart_id}");
    warn!("chart {chart_id}: name {name:?} already written in this run, using {unique:?}");
    claimed.insert(unique.clone());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Game, Mode};

    struct NoPages;

    impl PageSource for NoPages {
        async fn fetch_chart(&self, chart_id: ChartId) -> anyhow::Result<String> {
            anyhow::bail!("no page for {chart_id}")
        }
    }

    #[test]
    fn repeated_names_get_the_chart_id() {
        let claimed = Mutex::new(HashSet::new());
        assert_eq!(claim_name(&claimed, "floor-1".into(), 1054), "floor-1");
        assert_eq!(claim_name(&claimed, "floor-1".into(), 1055), "floor-1-1055");
        assert_eq!(claim_name(&claimed, "floor-2".into(), 1056), "floor-2");
    }

    #[test]
    fn smb1_ids_skip_1154_and_end_with_extra() {
        let config = ScrapingConfig::default();
        let orchestrator = ScrapeOrchestrator::new(&NoPages, &config);
        let (ids, excluded) = orchestrator
            .chart_ids(Selection::new(Game::Smb1, Mode::Score))
            .unwrap();
        assert_eq!(excluded, 1);
        assert!(!ids.contains(&1154));
        assert_eq!(ids.first(), Some(&1054));
        assert_eq!(ids.last(), Some(&367365));
        assert_eq!(ids.len(), 118);
    }

    #[test]
    fn smb2_time_drops_pal_interval() {
        let config = ScrapingConfig::default();
        let orchestrator = ScrapeOrchestrator::new(&NoPages, &config);
        let (ids, _) = orchestrator
            .chart_ids(Selection::new(Game::Smb2, Mode::Time))
            .unwrap();
        assert!(!ids.iter().any(|id| (141804..=141949).contains(id)));
        assert!(ids.contains(&141803));
        assert!(ids.contains(&141950));
    }

    #[tokio::test]
    async fn fetch_failures_do_not_abort_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScrapingConfig {
            output_dir: dir.path().to_path_buf(),
            on_parse_failure: ParseFailurePolicy::Abort,
            ..ScrapingConfig::default()
        };
        let orchestrator = ScrapeOrchestrator::new(&NoPages, &config);
        let summary = orchestrator
            .run(Selection::new(Game::Smb1, Mode::Time))
            .await
            .unwrap();
        assert!(summary.charts_written.is_empty());
        assert_eq!(summary.charts_failed.len(), 98);
        assert!(dir.path().join("smb1").join("time").is_dir());
    }

    /// Fails every fetch, except for one chart whose page is broken.
    struct OneBrokenPage(ChartId);

    impl PageSource for OneBrokenPage {
        async fn fetch_chart(&self, chart_id: ChartId) -> anyhow::Result<String> {
            if chart_id == self.0 {
                return Ok("<p>maintenance</p>".to_string());
            }
            anyhow::bail!("no page for {chart_id}")
        }
    }

    #[tokio::test]
    async fn run_all_reports_finished_selections_before_an_abort() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScrapingConfig {
            output_dir: dir.path().to_path_buf(),
            on_parse_failure: ParseFailurePolicy::Abort,
            ..ScrapingConfig::default()
        };
        // First chart of the second selection (smb1 time).
        let source = OneBrokenPage(141568);
        let orchestrator = ScrapeOrchestrator::new(&source, &config);

        let mut finished = Vec::new();
        let err = orchestrator
            .run_all(|selection, summary| finished.push((selection, summary.charts_failed.len())))
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::Parse { chart_id: 141568, .. }));
        assert_eq!(finished, vec![(Selection::new(Game::Smb1, Mode::Score), 118)]);
    }
}
