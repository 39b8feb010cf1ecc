//! Strategy-based loading of remote and local quote data.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::{
    ComplexData, DataLoadingStrategy, Frame, LocalData, QuoteSource, RemoteData, RemoteSourceName,
};
use crate::config::QuotedInstrument;
use crate::errors::MarketflowError;
use crate::util::fs::make_directory;

/// Format of the timestamp embedded in snapshot file names.
const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Fetches one instrument's history from its configured remote source.
pub struct RemoteDataLoader {
    instrument: QuotedInstrument,
    source: Arc<dyn QuoteSource>,
}

impl RemoteDataLoader {
    /// Creates a loader for one instrument.
    #[must_use]
    pub fn new(instrument: QuotedInstrument, source: Arc<dyn QuoteSource>) -> Self {
        Self { instrument, source }
    }

    /// Fetches the remote history.
    ///
    /// The configured source name is validated against the supported set
    /// before any request goes out.
    pub async fn load_data(&self) -> Result<RemoteData, MarketflowError> {
        let loading = &self.instrument.data_loading;
        let source_name = RemoteSourceName::parse(&loading.remote_data_loading.source_name)?;

        let frame = self
            .source
            .daily_history(&self.instrument.ticker, &loading.remote_data_loading.time_range)
            .await?;

        Ok(RemoteData {
            source: source_name,
            frame,
        })
    }

    /// Fetches the remote history and writes it to a CSV snapshot.
    ///
    /// Writes to `required_file_path` when given, otherwise to the
    /// configured remote file name.
    pub async fn store_data(
        &self,
        required_file_path: Option<&Path>,
    ) -> Result<RemoteData, MarketflowError> {
        let loading = &self.instrument.data_loading;
        let configured = PathBuf::from(&loading.remote_data_loading.file_name);
        let target = required_file_path.unwrap_or(&configured);

        let data = self.load_data().await?;
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                make_directory(parent)?;
            }
        }
        data.frame.write_csv(target, &loading.date_column)?;
        Ok(data)
    }
}

/// Reads one instrument's history from its local CSV snapshot, or pulls it
/// through a remote loader when one is attached.
pub struct LocalDataLoader {
    instrument: QuotedInstrument,
    remote_data_loader: Option<RemoteDataLoader>,
}

impl LocalDataLoader {
    /// Creates a loader that reads the configured local snapshot.
    #[must_use]
    pub fn new(instrument: QuotedInstrument) -> Self {
        Self {
            instrument,
            remote_data_loader: None,
        }
    }

    /// Creates a loader that refreshes the local data from a remote loader.
    #[must_use]
    pub fn with_remote(instrument: QuotedInstrument, remote: RemoteDataLoader) -> Self {
        Self {
            instrument,
            remote_data_loader: Some(remote),
        }
    }

    /// Loads the local history.
    pub async fn load_data(&self) -> Result<LocalData, MarketflowError> {
        let loading = &self.instrument.data_loading;
        let file_path = PathBuf::from(&loading.local_data_loading.file_name);

        let frame = match &self.remote_data_loader {
            None => {
                if !file_path.is_file() {
                    return Err(MarketflowError::Data(format!(
                        "file {} does not exist",
                        file_path.display()
                    )));
                }
                Frame::read_csv(&file_path, &loading.date_column)?
            }
            Some(remote) => remote.load_data().await?.frame,
        };

        Ok(LocalData {
            frame,
            source_path: file_path,
        })
    }

    /// Loads the local history and writes it back as a CSV snapshot.
    pub async fn store_data(
        &self,
        required_file_path: Option<&Path>,
    ) -> Result<LocalData, MarketflowError> {
        let loading = &self.instrument.data_loading;
        let configured = PathBuf::from(&loading.local_data_loading.file_name);
        let target = required_file_path.unwrap_or(&configured);

        let data = self.load_data().await?;
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                make_directory(parent)?;
            }
        }
        data.frame.write_csv(target, &loading.date_column)?;
        Ok(data)
    }
}

/// Loads remote and local history for one instrument according to its
/// configured [`DataLoadingStrategy`].
pub struct StrategyBasedDataLoader {
    instrument: QuotedInstrument,
    source: Arc<dyn QuoteSource>,
}

impl StrategyBasedDataLoader {
    /// Creates a strategy-based loader for one instrument.
    #[must_use]
    pub fn new(instrument: QuotedInstrument, source: Arc<dyn QuoteSource>) -> Self {
        Self { instrument, source }
    }

    /// Loads both halves of the instrument's data.
    ///
    /// The remote history is always fetched and snapshotted, to a
    /// timestamped file under `keep_local_save_remote` and to the `_latest`
    /// file otherwise. Only `load_remote_to_local_and_remote_as_latest`
    /// refreshes the local half; the remaining strategies are not supported
    /// for local data and error out.
    pub async fn load_data(&self) -> Result<ComplexData, MarketflowError> {
        let loading = &self.instrument.data_loading;
        let strategy = DataLoadingStrategy::parse(&loading.data_loading_strategy)?;

        let remote_target = match strategy {
            DataLoadingStrategy::KeepLocalSaveRemote => snapshot_path(
                &loading.remote_data_loading.file_name,
                &Utc::now().format(SNAPSHOT_TIMESTAMP_FORMAT).to_string(),
            ),
            DataLoadingStrategy::KeepLocalSaveRemoteLatest
            | DataLoadingStrategy::LoadRemoteToLocalAndRemoteAsLatest => {
                snapshot_path(&loading.remote_data_loading.file_name, "latest")
            }
        };

        let remote_loader =
            RemoteDataLoader::new(self.instrument.clone(), Arc::clone(&self.source));
        let remote = remote_loader.store_data(Some(&remote_target)).await?;
        info!(
            ticker = %self.instrument.ticker,
            snapshot = %remote_target.display(),
            "stored remote history"
        );

        let local_loader = match strategy {
            DataLoadingStrategy::LoadRemoteToLocalAndRemoteAsLatest => LocalDataLoader::with_remote(
                self.instrument.clone(),
                RemoteDataLoader::new(self.instrument.clone(), Arc::clone(&self.source)),
            ),
            other => {
                return Err(MarketflowError::Unsupported {
                    option: "data loading strategy for local data",
                    value: other.as_str().to_string(),
                    supported: vec![
                        DataLoadingStrategy::LoadRemoteToLocalAndRemoteAsLatest.as_str(),
                    ],
                })
            }
        };
        let local = local_loader.store_data(None).await?;

        Ok(ComplexData { remote, local })
    }
}

/// `data/nvda.csv` + `latest` → `data/nvda_latest.csv`.
fn snapshot_path(configured: &str, suffix: &str) -> PathBuf {
    let configured = Path::new(configured);
    let directory = configured.parent().unwrap_or_else(|| Path::new(""));
    let stem = configured
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = configured
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    directory.join(format!("{stem}_{suffix}{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{sample_config, sample_frame};
    use crate::testing::mocks::StaticQuoteSource;

    fn instrument_in(directory: &Path) -> QuotedInstrument {
        let mut instrument = sample_config().research.target_quoted_instrument;
        instrument.data_loading.remote_data_loading.file_name = directory
            .join("nvda.csv")
            .to_string_lossy()
            .to_string();
        instrument.data_loading.local_data_loading.file_name = directory
            .join("nvda_local.csv")
            .to_string_lossy()
            .to_string();
        instrument
    }

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path("data/nvda.csv", "latest"),
            PathBuf::from("data/nvda_latest.csv")
        );
        assert_eq!(snapshot_path("nvda.csv", "latest"), PathBuf::from("nvda_latest.csv"));
    }

    #[tokio::test]
    async fn test_remote_loader_rejects_unknown_source() {
        let directory = tempfile::tempdir().unwrap();
        let mut instrument = instrument_in(directory.path());
        instrument.data_loading.remote_data_loading.source_name = "Bloomberg".to_string();

        let loader = RemoteDataLoader::new(
            instrument,
            Arc::new(StaticQuoteSource::new(sample_frame())),
        );
        let error = loader.load_data().await.unwrap_err();
        assert!(matches!(error, MarketflowError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_local_loader_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        let loader = LocalDataLoader::new(instrument_in(directory.path()));

        let error = loader.load_data().await.unwrap_err();
        assert!(matches!(error, MarketflowError::Data(_)));
    }

    #[tokio::test]
    async fn test_strategy_loader_refresh_both() {
        let directory = tempfile::tempdir().unwrap();
        let instrument = instrument_in(directory.path());
        let source = Arc::new(StaticQuoteSource::new(sample_frame()));

        let loader = StrategyBasedDataLoader::new(instrument, source.clone());
        let data = loader.load_data().await.unwrap();

        assert_eq!(data.remote.frame, sample_frame());
        assert_eq!(data.local.frame, sample_frame());
        assert!(directory.path().join("nvda_latest.csv").is_file());
        assert!(directory.path().join("nvda_local.csv").is_file());
        // One fetch for the remote snapshot, one refreshing the local half.
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_strategy_loader_keep_local_is_unsupported_for_local_data() {
        let directory = tempfile::tempdir().unwrap();
        let mut instrument = instrument_in(directory.path());
        instrument.data_loading.data_loading_strategy =
            "keep_local_save_remote_latest".to_string();

        let loader = StrategyBasedDataLoader::new(
            instrument,
            Arc::new(StaticQuoteSource::new(sample_frame())),
        );
        let error = loader.load_data().await.unwrap_err();
        assert!(matches!(
            error,
            MarketflowError::Unsupported { option, .. }
                if option == "data loading strategy for local data"
        ));
    }
}
