//! INI configuration: a `[DEFAULT]` section plus one section per query.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use ini::{Ini, ParseOption, Properties};
use notifier_core::{Query, SearchParams};
use regex::Regex;
use thiserror::Error;

pub const DEFAULT_SECTION: &str = "DEFAULT";

const EMAIL_KEY: &str = "e-mail";
const RESULTS_PATH_KEY: &str = "results path";
const QUERY_KEY: &str = "query";
const RETSTART_KEY: &str = "retstart";
const RETMAX_KEY: &str = "retmax";
const MINDATE_KEY: &str = "mindate";
const MAXDATE_KEY: &str = "maxdate";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("e-mail pattern"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}(/\d{1,2}(/\d{1,2})?)?$").expect("date pattern"));

/// Fatal configuration problems; the run stops before any fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0:?} config file does not exist")]
    Missing(PathBuf),
    #[error("{path:?} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },
    #[error("DEFAULT {0} is not defined")]
    DefaultMissing(&'static str),
    #[error("DEFAULT {param} has an invalid value {value:?}")]
    DefaultInvalid { param: &'static str, value: String },
    #[error("{0} is not a syntactically valid e-mail")]
    EmailSyntax(String),
}

/// A query section that was skipped; the rest of the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query {0} is not valid: missing search term")]
    MissingTerm(String),
    #[error("query {name} is not valid: {option} = {value:?}")]
    InvalidOption {
        name: String,
        option: &'static str,
        value: String,
    },
    #[error("query {0} is defined more than once")]
    Duplicate(String),
}

/// Values taken from `[DEFAULT]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub email: String,
    pub results_dir: PathBuf,
    pub defaults: SearchParams,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: Settings,
    pub queries: Vec<Query>,
    pub skipped: Vec<QueryError>,
}

/// Loads the configuration file and, if given, an extra queries file.
///
/// `fallback_results` is used when `[DEFAULT]` has no `results path`.
pub fn load(
    config_path: &Path,
    queries_path: Option<&Path>,
    fallback_results: &Path,
) -> Result<AppConfig, ConfigError> {
    let config = read_ini(config_path)?;
    let settings = parse_settings(&config, fallback_results)?;

    let mut sources = vec![&config];
    let extra = queries_path.map(read_ini).transpose()?;
    sources.extend(extra.as_ref());

    let (queries, skipped) = parse_queries(&sources, &settings.defaults);
    Ok(AppConfig {
        settings,
        queries,
        skipped,
    })
}

fn read_ini(path: &Path) -> Result<Ini, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    // Search terms are full of quotes and brackets; take values verbatim.
    let option = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    Ini::load_from_file_opt(path, option).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_settings(ini: &Ini, fallback_results: &Path) -> Result<Settings, ConfigError> {
    let defaults = ini.section(Some(DEFAULT_SECTION));
    let required = |key: &'static str| -> Result<String, ConfigError> {
        defaults
            .and_then(|props| lookup(props, key))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::DefaultMissing(key))
    };

    let email = required(EMAIL_KEY)?;
    if !EMAIL_RE.is_match(&email) {
        return Err(ConfigError::EmailSyntax(email));
    }

    let retstart = parse_count(RETSTART_KEY, &required(RETSTART_KEY)?)?;
    let retmax = parse_count(RETMAX_KEY, &required(RETMAX_KEY)?)?;
    let mindate = required(MINDATE_KEY)?;
    if !DATE_RE.is_match(&mindate) {
        return Err(ConfigError::DefaultInvalid {
            param: MINDATE_KEY,
            value: mindate,
        });
    }

    let results_dir = defaults
        .and_then(|props| lookup(props, RESULTS_PATH_KEY))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(expand_home)
        .unwrap_or_else(|| fallback_results.to_path_buf());

    Ok(Settings {
        email,
        results_dir,
        defaults: SearchParams {
            retstart,
            retmax,
            mindate: Some(mindate),
            maxdate: None,
        },
    })
}

fn parse_count(param: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::DefaultInvalid {
        param,
        value: value.to_string(),
    })
}

/// Builds one [`Query`] per non-DEFAULT section, in file order, across all
/// sources. Invalid or repeated sections are returned separately.
pub fn parse_queries(sources: &[&Ini], defaults: &SearchParams) -> (Vec<Query>, Vec<QueryError>) {
    let mut queries = Vec::new();
    let mut skipped = Vec::new();
    let mut names = HashSet::new();

    for ini in sources {
        for (section, props) in ini.iter() {
            let Some(name) = section.filter(|name| *name != DEFAULT_SECTION) else {
                continue;
            };
            if !names.insert(name.to_string()) {
                skipped.push(QueryError::Duplicate(name.to_string()));
                continue;
            }
            match parse_query(name, props, defaults) {
                Ok(query) => queries.push(query),
                Err(err) => skipped.push(err),
            }
        }
    }
    (queries, skipped)
}

fn parse_query(name: &str, props: &Properties, defaults: &SearchParams) -> Result<Query, QueryError> {
    let term = lookup(props, QUERY_KEY)
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .ok_or_else(|| QueryError::MissingTerm(name.to_string()))?;

    let option = |key: &'static str| lookup(props, key).map(str::trim).filter(|v| !v.is_empty());
    let invalid = |option: &'static str, value: &str| QueryError::InvalidOption {
        name: name.to_string(),
        option,
        value: value.to_string(),
    };
    let count = |key: &'static str, fallback: u32| match option(key) {
        Some(raw) => raw.parse::<u32>().map_err(|_| invalid(key, raw)),
        None => Ok(fallback),
    };
    let date = |key: &'static str, fallback: &Option<String>| match option(key) {
        Some(raw) if DATE_RE.is_match(raw) => Ok(Some(raw.to_string())),
        Some(raw) => Err(invalid(key, raw)),
        None => Ok(fallback.clone()),
    };

    let params = SearchParams {
        retstart: count(RETSTART_KEY, defaults.retstart)?,
        retmax: count(RETMAX_KEY, defaults.retmax)?,
        mindate: date(MINDATE_KEY, &defaults.mindate)?,
        maxdate: date(MAXDATE_KEY, &defaults.maxdate)?,
    };
    Ok(Query::new(name, term, params))
}

/// Option names match regardless of case, so `E-mail` and `RetMax` work.
fn lookup<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(key))
        .map(|(_, value)| value)
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    }
}
