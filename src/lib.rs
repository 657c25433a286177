mod chart_parser;
mod chart_writer;
mod config;
mod error;
mod exclusions;
mod game;
mod orchestrator;
mod ratelimit;
mod record;
mod requests;
mod scraping_context;
mod text_manipulators;

pub use chart_parser::{ChartPage, RawRow, derive_chart_name, parse_chart_page};
pub use chart_writer::{selection_dir, write_chart};
pub use config::{LoadFromEnv, ParseFailurePolicy, ScrapingConfig};
pub use error::{ChartId, NormalizationFailure, ScrapeError};
pub use exclusions::{ExclusionPolicy, ExtraChart, KNOWN_EXCLUSIONS, SkippedInterval};
pub use game::{ChartRange, Game, Mode, Selection, resolve_range};
pub use orchestrator::{ChartOutcome, RunSummary, ScrapeOrchestrator};
pub use record::{NO_PROOF, Profile, ProfileColumn, Record, normalize};
pub use requests::{PageSource, RequestClient};
pub use scraping_context::ScrapingContext;
pub use text_manipulators::{format_username, remove_leading_zero};
