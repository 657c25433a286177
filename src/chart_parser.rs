use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::{
    error::{ChartId, ScrapeError},
    game::{Game, Mode, Selection},
    text_manipulators::extract_text,
};

const SEPARATOR: &str = "→";
const EN_DASH: &str = "–";
// "high score -" sits between the separator and the name on SMB2 score charts.
const SMB2_SCORE_PREFIX_LEN: usize = 3;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("#breadcrumb"));
// An explicit scoreboard table, or any table holding leaderboard rows.
static ROW_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"table.scoreboard, table tr[class*="chart-"]"#));
static STANDARD_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr.chart-standard"));
static DISPLAY_NAME: LazyLock<Selector> =
    LazyLock::new(|| selector("div.user-identification b"));
static DETAILS: LazyLock<Selector> = LazyLock::new(|| selector("div.details small"));
static PROOF_LINK: LazyLock<Selector> = LazyLock::new(|| selector("td.data a"));
static VALUE: LazyLock<Selector> = LazyLock::new(|| selector("span.bigger"));
static RANK: LazyLock<Selector> = LazyLock::new(|| selector("td.pos"));

/// One leaderboard row as found in the markup, before any cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub display_name: Option<String>,
    pub details: Option<String>,
    pub proof_href: Option<String>,
    pub value: Option<String>,
    pub rank: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPage {
    pub title_tokens: Vec<String>,
    pub rows: Vec<RawRow>,
}

pub fn parse_chart_page(chart_id: ChartId, markup: &str) -> Result<ChartPage, ScrapeError> {
    let document = Html::parse_document(markup);

    let title = document
        .select(&TITLE)
        .next()
        .ok_or(ScrapeError::Parse {
            chart_id,
            element: "breadcrumb title",
        })?;
    let title_tokens = extract_text(title)
        .split_whitespace()
        .map(str::to_string)
        .collect();

    if document.select(&ROW_CONTAINER).next().is_none() {
        return Err(ScrapeError::Parse {
            chart_id,
            element: "leaderboard table",
        });
    }

    let rows = document.select(&STANDARD_ROW).map(parse_row).collect();

    Ok(ChartPage { title_tokens, rows })
}

fn first_text(row: ElementRef, selector: &Selector) -> Option<String> {
    row.select(selector).next().map(extract_text)
}

fn parse_row(row: ElementRef) -> RawRow {
    RawRow {
        display_name: first_text(row, &DISPLAY_NAME),
        details: first_text(row, &DETAILS),
        proof_href: row
            .select(&PROOF_LINK)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .map(str::to_string),
        value: first_text(row, &VALUE),
        rank: first_text(row, &RANK),
    }
}

/// Builds the file-safe chart name from the breadcrumb tokens: everything
/// after the second separator, lower-cased and joined with '-'.
pub fn derive_chart_name(
    chart_id: ChartId,
    title_tokens: &[String],
    selection: Selection,
) -> Result<String, ScrapeError> {
    let malformed = |reason| ScrapeError::MalformedTitle {
        chart_id,
        title: title_tokens.join(" "),
        reason,
    };

    let second_separator = title_tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.as_str() == SEPARATOR)
        .map(|(i, _)| i)
        .nth(1)
        .ok_or_else(|| malformed("fewer than two separators"))?;

    let mut start = second_separator + 1;
    if matches!(selection.game, Game::Smb2 | Game::Smb2Pal) && selection.mode == Mode::Score {
        start += SMB2_SCORE_PREFIX_LEN;
    }

    let name = title_tokens
        .get(start..)
        .unwrap_or_default()
        .iter()
        .filter(|token| token.as_str() != EN_DASH)
        .map(|token| token.to_lowercase().replace(['/', '\\'], "-"))
        .collect::<Vec<_>>()
        .join("-");

    if name.is_empty() {
        return Err(malformed("no chart name after separator"));
    }
    Ok(name)
}
