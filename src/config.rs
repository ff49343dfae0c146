use std::path::PathBuf;

use clap::Parser;
use reqwest::Url;

use crate::{errors::CatalogErrors, models::ChapterRecord};

pub const DEFAULT_API_URL: &str = "https://api.comick.fun";
pub const READER_URL: &str = "https://comick.io";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:145.0) Gecko/20100101 Firefox/145.0";

/// Which chapter translations reach the chapter tree.
///
/// Defaults to English only. Titles routinely list every translation of every
/// chapter, so the browser shows one language unless told otherwise; records in
/// other languages are dropped without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterLanguage {
    Only(String),
    All,
}

impl Default for ChapterLanguage {
    fn default() -> Self {
        ChapterLanguage::Only("en".to_string())
    }
}

impl ChapterLanguage {
    pub fn accepts(&self, record: &ChapterRecord) -> bool {
        match self {
            ChapterLanguage::Only(lang) => record.language.eq_ignore_ascii_case(lang),
            ChapterLanguage::All => true,
        }
    }

    pub fn retain(&self, mut records: Vec<ChapterRecord>) -> Vec<ChapterRecord> {
        records.retain(|record| self.accepts(record));
        records
    }
}

#[derive(Parser, Debug, Clone)]
pub struct Args {
    #[arg(help = "slug of the title in the URL: comick.io/comic/<SLUG>")]
    pub slug: Option<String>,

    #[arg(
        short,
        long,
        conflicts_with = "slug",
        help = "search titles instead of opening one directly"
    )]
    pub search: Option<String>,

    #[arg(long, default_value = "en", help = "only list chapters in this language")]
    pub lang: String,

    #[arg(long, conflicts_with = "lang", help = "list chapters in every language")]
    pub all_languages: bool,

    #[arg(long, help = "JSON file remembering the last read chapter per title")]
    pub read_state: Option<PathBuf>,

    #[arg(long, env = "COMICK_API_URL", default_value = DEFAULT_API_URL)]
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub user_agent: String,
    pub language: ChapterLanguage,
    pub read_state_path: Option<PathBuf>,
}

impl Config {
    pub fn for_base_url(base_url: Url) -> Self {
        Config {
            base_url,
            user_agent: USER_AGENT.to_string(),
            language: ChapterLanguage::default(),
            read_state_path: None,
        }
    }

    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let language = if args.all_languages {
            ChapterLanguage::All
        } else {
            ChapterLanguage::Only(args.lang.trim().to_ascii_lowercase())
        };

        Ok(Config {
            language,
            read_state_path: args.read_state.clone(),
            ..Config::for_base_url(normalize_base_url(&args.base_url)?)
        })
    }
}

/// Parses the API root: http(s) with a host, no query or fragment.
pub fn normalize_base_url(raw: &str) -> Result<Url, CatalogErrors> {
    let invalid = || CatalogErrors::InvalidBaseUrl(raw.to_string());

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    let supported = matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|host| !host.is_empty())
        && url.query().is_none()
        && url.fragment().is_none();
    if !supported {
        return Err(invalid());
    }
    Ok(url)
}
