//! Loading the route and stop documents at startup.

use std::fmt;
use std::path::PathBuf;

use headway_transit::{Route, Schedule, Stop};
use serde::de::DeserializeOwned;

/// Where a document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSource {
    File(PathBuf),
    Url(String),
}

impl ScheduleSource {
    /// `http://` and `https://` locations are URLs, anything else a file path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for ScheduleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Progress messages for the presentation layer while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadProgress {
    Fetching { source: String },
    Parsing { source: String },
    Ready { routes: usize, stops: usize },
    Failed { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DataFetchError {
    #[error("Failed to read {source_name}: {error}")]
    Read {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to fetch {url}: {error}")]
    Http {
        url: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("Failed to parse {source_name}: {error}")]
    Parse {
        source_name: String,
        #[source]
        error: serde_json::Error,
    },
}

/// Fetch and parse both documents.
///
/// Every step is reported through `progress`; a failure is reported as
/// [`LoadProgress::Failed`] before it is returned.
pub async fn load_schedule(
    routes: &ScheduleSource,
    stops: &ScheduleSource,
    mut progress: impl FnMut(LoadProgress),
) -> Result<Schedule, DataFetchError> {
    match load_documents(routes, stops, &mut progress).await {
        Ok(schedule) => {
            progress(LoadProgress::Ready {
                routes: schedule.routes().len(),
                stops: schedule.stops().len(),
            });
            Ok(schedule)
        }
        Err(err) => {
            progress(LoadProgress::Failed {
                message: err.to_string(),
            });
            Err(err)
        }
    }
}

async fn load_documents(
    routes: &ScheduleSource,
    stops: &ScheduleSource,
    progress: &mut impl FnMut(LoadProgress),
) -> Result<Schedule, DataFetchError> {
    let routes: Vec<Route> = load_document(routes, progress).await?;
    let stops: Vec<Stop> = load_document(stops, progress).await?;

    let schedule = Schedule::from_documents(routes, stops);
    let dangling = schedule.dangling_stop_references();
    if !dangling.is_empty() {
        tracing::warn!("{} stop ids referenced by shapes are missing from the stop list", dangling.len());
    }
    tracing::info!(
        "loaded {} routes and {} stops",
        schedule.routes().len(),
        schedule.stops().len()
    );
    Ok(schedule)
}

async fn load_document<T: DeserializeOwned>(
    source: &ScheduleSource,
    progress: &mut impl FnMut(LoadProgress),
) -> Result<T, DataFetchError> {
    let source_name = source.to_string();
    progress(LoadProgress::Fetching {
        source: source_name.clone(),
    });
    let bytes = fetch(source).await?;

    progress(LoadProgress::Parsing {
        source: source_name.clone(),
    });
    serde_json::from_slice(&bytes).map_err(|error| DataFetchError::Parse { source_name, error })
}

async fn fetch(source: &ScheduleSource) -> Result<Vec<u8>, DataFetchError> {
    match source {
        ScheduleSource::File(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|error| DataFetchError::Read {
                    source_name: path.display().to_string(),
                    error,
                })
        }
        ScheduleSource::Url(url) => {
            let http_error = |error: reqwest::Error| DataFetchError::Http {
                url: url.clone(),
                error,
            };
            let response = reqwest::get(url.as_str())
                .await
                .and_then(|r| r.error_for_status())
                .map_err(http_error)?;
            let bytes = response.bytes().await.map_err(http_error)?;
            tracing::debug!("downloaded {} bytes from {url}", bytes.len());
            Ok(bytes.to_vec())
        }
    }
}
