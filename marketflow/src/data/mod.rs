//! Quote data: the in-memory table type, the remote source seam, and the
//! strategy-based loaders.

mod frame;
mod loader;
mod model;
mod source;

pub use frame::Frame;
pub use loader::{LocalDataLoader, RemoteDataLoader, StrategyBasedDataLoader};
pub use model::{
    ComplexData, DataLoadingStrategy, InstrumentDataSet, LocalData, RemoteData, RemoteSourceName,
    SelectedData,
};
pub use source::{HttpQuoteSource, QuoteSource};
