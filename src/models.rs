use std::fmt::Display;

use serde::{Deserialize, Serialize};

const COVER_HOST_URL: &str = "https://meo.comick.pictures";

#[derive(Debug, Clone, Deserialize)]
pub struct TitlePayload {
    pub comic: ComicPayload,
    #[serde(default)]
    pub authors: Option<Vec<PersonPayload>>,
    #[serde(default)]
    pub artists: Option<Vec<PersonPayload>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComicPayload {
    pub hid: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub md_titles: Vec<AltTitlePayload>,
    #[serde(default)]
    pub md_covers: Vec<CoverPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AltTitlePayload {
    pub title: String,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverPayload {
    pub b2key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonPayload {
    pub name: String,
}

/// Entry of the trending list and of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct ComicSummaryPayload {
    pub hid: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub md_covers: Vec<CoverPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterListPayload {
    #[serde(default)]
    pub chapters: Vec<ChapterPayload>,
    #[serde(default)]
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterPayload {
    pub hid: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub chap: Option<String>,
    #[serde(default)]
    pub vol: Option<String>,
    pub lang: String,
    #[serde(default)]
    pub group_name: Option<Vec<String>>,
}

/// Title metadata shown above the chapter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleDetail {
    pub hid: String,
    pub slug: String,
    pub title: String,
    pub alternative_titles: Vec<String>,
    pub year: Option<i32>,
    pub authors: Option<String>,
    pub artists: Option<String>,
    pub description: Option<String>,
    pub cover_key: Option<String>,
}

impl TitleDetail {
    pub fn sanitized_description(&self) -> Vec<String> {
        self.description
            .as_deref()
            .map(|desc| {
                desc.trim()
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn cover_url(&self) -> Option<String> {
        self.cover_key
            .as_ref()
            .map(|key| format!("{COVER_HOST_URL}/{key}"))
    }
}

impl From<TitlePayload> for TitleDetail {
    fn from(payload: TitlePayload) -> Self {
        let join_names = |people: Option<Vec<PersonPayload>>| {
            people.map(|people| {
                people
                    .into_iter()
                    .map(|person| person.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
        };

        let comic = payload.comic;
        TitleDetail {
            hid: comic.hid,
            slug: comic.slug,
            title: comic.title,
            alternative_titles: comic
                .md_titles
                .into_iter()
                .filter(|alt| alt.lang.as_deref() == Some("en"))
                .map(|alt| alt.title)
                .collect(),
            year: comic.year,
            authors: join_names(payload.authors),
            artists: join_names(payload.artists),
            description: non_blank(comic.desc),
            cover_key: comic.md_covers.into_iter().next().map(|cover| cover.b2key),
        }
    }
}

/// A title as listed before it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSummary {
    pub hid: String,
    pub slug: String,
    pub title: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub cover_key: Option<String>,
}

impl TitleSummary {
    pub fn cover_url(&self) -> Option<String> {
        self.cover_key
            .as_ref()
            .map(|key| format!("{COVER_HOST_URL}/{key}"))
    }
}

impl Display for TitleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({year})", self.title),
            None => write!(f, "{}", self.title),
        }
    }
}

impl From<ComicSummaryPayload> for TitleSummary {
    fn from(payload: ComicSummaryPayload) -> Self {
        TitleSummary {
            hid: payload.hid,
            slug: payload.slug,
            title: payload.title,
            year: payload.year,
            description: non_blank(payload.desc),
            cover_key: payload.md_covers.into_iter().next().map(|cover| cover.b2key),
        }
    }
}

/// One chapter as delivered by the catalog, never mutated after the fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRecord {
    pub id: String,
    pub title: Option<String>,
    pub group_name: Option<String>,
    pub volume: Option<String>,
    pub chapter_number: Option<String>,
    pub language: String,
}

impl ChapterRecord {
    pub const UNKNOWN_LABEL: &'static str = "Unknown Chapter";

    /// Title, then chapter number, then volume.
    pub fn display_label(&self) -> String {
        self.title
            .as_ref()
            .or(self.chapter_number.as_ref())
            .or(self.volume.as_ref())
            .cloned()
            .unwrap_or_else(|| Self::UNKNOWN_LABEL.to_string())
    }
}

impl From<ChapterPayload> for ChapterRecord {
    fn from(payload: ChapterPayload) -> Self {
        ChapterRecord {
            id: payload.hid,
            title: non_blank(payload.title),
            group_name: non_blank(payload.group_name.and_then(|names| names.into_iter().next())),
            volume: non_blank(payload.vol),
            chapter_number: non_blank(payload.chap),
            language: payload.lang,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
