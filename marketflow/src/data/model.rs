//! Data products and the closed option sets of the acquisition layer.

use indexmap::IndexMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::Frame;
use crate::errors::MarketflowError;

/// The supported remote quote providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteSourceName {
    /// Daily history downloads from Yahoo! Finance.
    YahooFinance,
}

impl RemoteSourceName {
    /// The configuration string of this provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YahooFinance => "Yahoo! Finance",
        }
    }

    /// Every recognized configuration string.
    #[must_use]
    pub fn supported() -> Vec<&'static str> {
        vec![Self::YahooFinance.as_str()]
    }

    /// Parses a configuration string.
    pub fn parse(value: &str) -> Result<Self, MarketflowError> {
        if value == Self::YahooFinance.as_str() {
            Ok(Self::YahooFinance)
        } else {
            Err(MarketflowError::Unsupported {
                option: "remote data source",
                value: value.to_string(),
                supported: Self::supported(),
            })
        }
    }
}

impl fmt::Display for RemoteSourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteSourceName {
    type Err = MarketflowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// How remote and local data are combined for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataLoadingStrategy {
    /// Keep the local snapshot; save the remote history to a timestamped file.
    KeepLocalSaveRemote,
    /// Keep the local snapshot; save the remote history as the `_latest` file.
    KeepLocalSaveRemoteLatest,
    /// Refresh both: the remote history becomes the `_latest` file and the
    /// local snapshot.
    LoadRemoteToLocalAndRemoteAsLatest,
}

impl DataLoadingStrategy {
    /// The configuration string of this strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeepLocalSaveRemote => "keep_local_save_remote",
            Self::KeepLocalSaveRemoteLatest => "keep_local_save_remote_latest",
            Self::LoadRemoteToLocalAndRemoteAsLatest => {
                "load_remote_to_local_and_remote_as_latest"
            }
        }
    }

    /// Every recognized configuration string.
    #[must_use]
    pub fn supported() -> Vec<&'static str> {
        vec![
            Self::KeepLocalSaveRemote.as_str(),
            Self::KeepLocalSaveRemoteLatest.as_str(),
            Self::LoadRemoteToLocalAndRemoteAsLatest.as_str(),
        ]
    }

    /// Parses a configuration string.
    pub fn parse(value: &str) -> Result<Self, MarketflowError> {
        match value {
            "keep_local_save_remote" => Ok(Self::KeepLocalSaveRemote),
            "keep_local_save_remote_latest" => Ok(Self::KeepLocalSaveRemoteLatest),
            "load_remote_to_local_and_remote_as_latest" => {
                Ok(Self::LoadRemoteToLocalAndRemoteAsLatest)
            }
            other => Err(MarketflowError::Unsupported {
                option: "data loading strategy",
                value: other.to_string(),
                supported: Self::supported(),
            }),
        }
    }
}

impl fmt::Display for DataLoadingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataLoadingStrategy {
    type Err = MarketflowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// History fetched from a remote provider.
#[derive(Debug, Clone)]
pub struct RemoteData {
    /// The provider it came from.
    pub source: RemoteSourceName,
    /// The fetched table.
    pub frame: Frame,
}

/// History read from (or written to) a local CSV snapshot.
#[derive(Debug, Clone)]
pub struct LocalData {
    /// The table.
    pub frame: Frame,
    /// The snapshot path it is associated with.
    pub source_path: PathBuf,
}

/// Remote and local history for one instrument, loaded by a strategy.
#[derive(Debug, Clone)]
pub struct ComplexData {
    /// The remote half.
    pub remote: RemoteData,
    /// The local half.
    pub local: LocalData,
}

impl ComplexData {
    /// Picks the remote or the local frame.
    #[must_use]
    pub fn frame(&self, use_remote_data: bool) -> &Frame {
        if use_remote_data {
            &self.remote.frame
        } else {
            &self.local.frame
        }
    }

    /// Mutable variant of [`ComplexData::frame`].
    #[must_use]
    pub fn frame_mut(&mut self, use_remote_data: bool) -> &mut Frame {
        if use_remote_data {
            &mut self.remote.frame
        } else {
            &mut self.local.frame
        }
    }
}

/// Loaded data for all instruments, keyed by ticker in declared order.
pub type InstrumentDataSet = IndexMap<String, ComplexData>;

/// Per-ticker frames restricted to the research time range.
pub type SelectedData = IndexMap<String, Frame>;
