use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One CV document. The `uuid` is generated once and stays the child key
/// under the owner's CV collection for the CV's lifetime.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CVInfo {
    pub uuid: String,
    pub title: String,
    pub resume: Resume,
    pub cover_letter: CoverLetter,
    pub last_modified: String,
}

impl CVInfo {
    pub fn new(
        title: impl Into<String>,
        resume: Resume,
        cover_letter: CoverLetter,
        last_modified: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            title: title.into(),
            resume,
            cover_letter,
            last_modified: last_modified.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub categories: Vec<ResumeCategory>,
}

impl Resume {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCategory {
    pub title: String,
    pub items: Vec<ResumeItem>,
}

/// One entry within a CV category, e.g. one job or one school.
///
/// `period` is rendered `"YYYY.MM - YYYY.MM"`, or `"YYYY.MM - In progress"`
/// while the entry is still running.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResumeItem {
    pub period: String,
    pub title: String,
    pub second_title: String,
    pub description: String,
}

impl ResumeItem {
    pub fn new(
        period: impl Into<String>,
        title: impl Into<String>,
        second_title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            period: period.into(),
            title: title.into(),
            second_title: second_title.into(),
            description: description.into(),
        }
    }

    pub fn entrance_year(&self) -> Option<i32> {
        self.period_bounds().0.map(|(year, _)| year)
    }

    pub fn entrance_month(&self) -> Option<u32> {
        self.period_bounds().0.map(|(_, month)| month)
    }

    pub fn end_year(&self) -> Option<i32> {
        self.period_bounds().1.map(|(year, _)| year)
    }

    pub fn end_month(&self) -> Option<u32> {
        self.period_bounds().1.map(|(_, month)| month)
    }

    #[allow(clippy::type_complexity)]
    fn period_bounds(&self) -> (Option<(i32, u32)>, Option<(i32, u32)>) {
        let mut parts = self.period.splitn(2, " - ");
        let entrance = parts.next().and_then(parse_year_month);
        let end = parts.next().and_then(parse_year_month);
        (entrance, end)
    }
}

fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.trim().split_once('.')?;
    Some((year.parse().ok()?, month.parse().ok()?))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    pub contents: String,
}

impl CoverLetter {
    pub fn empty() -> Self {
        Self::default()
    }
}
