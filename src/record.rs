use serde::Deserialize;

use crate::{
    chart_parser::RawRow,
    error::NormalizationFailure,
    game::Mode,
    text_manipulators::{format_username, format_value, split_date},
};

pub const NO_PROOF: &str = "none";

/// Which optional column the output carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Trailing free-text platform column, no rank.
    Platform,
    /// Leading rank column, no platform.
    Rank,
}

impl Profile {
    pub fn header(self, mode: Mode) -> Vec<&'static str> {
        let shared = [
            "Name",
            mode.column_title(),
            "Day",
            "Month",
            "Year",
            "Monkey",
            "Proof",
        ];
        match self {
            Profile::Platform => shared.into_iter().chain(["Platform"]).collect(),
            Profile::Rank => ["Rank"].into_iter().chain(shared).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileColumn {
    Rank(String),
    Platform(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub value: String,
    pub day: String,
    pub month: String,
    pub year: String,
    pub monkey: String,
    pub proof: String,
    pub extra: ProfileColumn,
}

impl Record {
    /// Fields in header order.
    pub fn fields(&self) -> Vec<&str> {
        let shared: [&str; 7] = [
            &self.name,
            &self.value,
            &self.day,
            &self.month,
            &self.year,
            &self.monkey,
            &self.proof,
        ];
        match &self.extra {
            ProfileColumn::Platform(platform) => {
                shared.into_iter().chain([platform.as_str()]).collect()
            }
            ProfileColumn::Rank(rank) => [rank.as_str()].into_iter().chain(shared).collect(),
        }
    }
}

/// Named positions in the whitespace-split details line,
/// e.g. `2020-01-05 · Monkey: AiAi · GameCube`.
struct Details<'a> {
    date: &'a str,
    monkey: &'a str,
    platform: String,
}

impl<'a> Details<'a> {
    const DATE: usize = 0;
    const MONKEY: usize = 3;
    const PLATFORM_FROM: usize = 5;

    fn parse(text: &'a str) -> Result<Self, NormalizationFailure> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let date = tokens
            .get(Self::DATE)
            .copied()
            .ok_or(NormalizationFailure::MissingField("submission date"))?;
        let monkey = tokens
            .get(Self::MONKEY)
            .copied()
            .ok_or(NormalizationFailure::MissingField("monkey"))?;
        let platform = tokens
            .get(Self::PLATFORM_FROM..)
            .unwrap_or_default()
            .join(" ");
        Ok(Self {
            date,
            monkey,
            platform,
        })
    }
}

/// Keeps the proof link only when it looks like a URL; the site puts a
/// non-link fallback in the same cell otherwise.
pub fn detect_proof(href: &str) -> String {
    if href.contains("http") {
        href.to_string()
    } else {
        NO_PROOF.to_string()
    }
}

fn parse_rank(raw: &str) -> Result<u32, NormalizationFailure> {
    let stripped: String = raw.split_whitespace().collect();
    stripped
        .parse()
        .map_err(|_| NormalizationFailure::MalformedRank(stripped))
}

pub fn normalize(
    row: &RawRow,
    mode: Mode,
    profile: Profile,
) -> Result<Record, NormalizationFailure> {
    let display_name = row
        .display_name
        .as_deref()
        .ok_or(NormalizationFailure::MissingField("display name"))?;
    let name = format_username(display_name)?;

    let details = row
        .details
        .as_deref()
        .ok_or(NormalizationFailure::MissingField("details"))?;
    let details = Details::parse(details)?;
    let (day, month, year) = split_date(details.date)?;

    let proof = row
        .proof_href
        .as_deref()
        .map(detect_proof)
        .ok_or(NormalizationFailure::MissingField("proof link"))?;

    let value = row
        .value
        .as_deref()
        .map(|raw| format_value(raw, mode))
        .ok_or(NormalizationFailure::MissingField("score/time value"))?;

    let extra = match profile {
        Profile::Platform => ProfileColumn::Platform(details.platform),
        Profile::Rank => {
            let rank = row
                .rank
                .as_deref()
                .ok_or(NormalizationFailure::MissingField("rank"))?;
            ProfileColumn::Rank(parse_rank(rank)?.to_string())
        }
    };

    Ok(Record {
        name,
        value,
        day,
        month,
        year,
        monkey: details.monkey.to_string(),
        proof,
        extra,
    })
}
