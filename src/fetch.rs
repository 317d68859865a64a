//! Download the latest intake and outcome exports from the open-data portal

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::error::util::ensure_directory;
use crate::error::{Error, Result};

/// CSV export of the Austin Animal Center intake dataset
pub const DEFAULT_INTAKES_URL: &str =
    "https://data.austintexas.gov/api/views/wter-evkm/rows.csv?accessType=DOWNLOAD";

/// CSV export of the Austin Animal Center outcome dataset
pub const DEFAULT_OUTCOMES_URL: &str =
    "https://data.austintexas.gov/api/views/9t4d-g238/rows.csv?accessType=DOWNLOAD";

/// Where to fetch each table from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSources {
    pub intakes_url: String,
    pub outcomes_url: String,
}

impl Default for DatasetSources {
    fn default() -> Self {
        Self {
            intakes_url: DEFAULT_INTAKES_URL.to_string(),
            outcomes_url: DEFAULT_OUTCOMES_URL.to_string(),
        }
    }
}

/// Local copies of the downloaded tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedDatasets {
    pub intakes: PathBuf,
    pub outcomes: PathBuf,
}

async fn download(
    client: &reqwest::Client,
    url: &str,
    target: &Path,
    label: &str,
) -> Result<u64> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!("Failed to retrieve {label} data, status code {status}");
        return Err(Error::InvalidInput(format!(
            "request for {label} data returned status {status}"
        )));
    }

    let body = response.bytes().await?;
    tokio::fs::write(target, &body)
        .await
        .map_err(|e| {
            Error::io_error_with_source(format!("Failed to save {label} data"), e).with_path(target)
        })?;

    let rows = body.iter().filter(|&&b| b == b'\n').count().saturating_sub(1) as u64;
    info!("Downloaded {label} data ({rows} rows) to {}", target.display());
    Ok(rows)
}

/// Fetch both tables concurrently into `out_dir` as `intakes.csv` and `outcomes.csv`
pub async fn fetch_datasets(
    sources: &DatasetSources,
    out_dir: &Path,
) -> Result<DownloadedDatasets> {
    ensure_directory(out_dir, "downloaded datasets")?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("shelter-outcomes/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let datasets = DownloadedDatasets {
        intakes: out_dir.join("intakes.csv"),
        outcomes: out_dir.join("outcomes.csv"),
    };

    futures::try_join!(
        download(&client, &sources.intakes_url, &datasets.intakes, "intake"),
        download(&client, &sources.outcomes_url, &datasets.outcomes, "outcome"),
    )?;

    Ok(datasets)
}
