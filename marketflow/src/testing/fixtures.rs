//! Canned configuration and data fixtures.

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;

use crate::config::{
    ColumnNameTending, ColumnTending, Config, DataLoading, DataTransformation, LocalDataLoading,
    MachineLearning, QuotedInstrument, RemoteDataLoading, Reporting, Research, TendingRules,
    TimeRange,
};
use crate::data::Frame;

/// Midnight UTC on 2024-01-`day`.
#[must_use]
pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).single().unwrap_or_default()
}

/// A five-row frame with `open` and `close` columns over 2024-01-01..05.
#[must_use]
pub fn sample_frame() -> Frame {
    let mut columns = IndexMap::new();
    columns.insert("open".to_string(), vec![10.0, 11.0, 12.0, 13.0, 14.0]);
    columns.insert("close".to_string(), vec![10.5, 11.5, 12.5, 13.5, 14.5]);
    Frame::from_columns(vec![day(1), day(2), day(3), day(4), day(5)], columns)
        .unwrap_or_default()
}

fn sample_instrument(ticker: &str, name: &str) -> QuotedInstrument {
    QuotedInstrument {
        ticker: ticker.to_string(),
        name: name.to_string(),
        description: format!("{name} common stock"),
        data_loading: DataLoading {
            data_loading_strategy: "load_remote_to_local_and_remote_as_latest".to_string(),
            remote_data_loading: RemoteDataLoading {
                source_name: "Yahoo! Finance".to_string(),
                file_name: format!("data/{}.csv", ticker.to_lowercase()),
                time_range: TimeRange {
                    begin_time: day(1),
                    end_time: day(5),
                },
            },
            local_data_loading: LocalDataLoading {
                file_name: format!("data/{}_local.csv", ticker.to_lowercase()),
            },
            date_column: "Date".to_string(),
        },
        data_transformation: DataTransformation {
            tending: TendingRules {
                columns: Some(ColumnTending {
                    remove: vec![],
                    names: Some(ColumnNameTending {
                        to_snake_case: true,
                    }),
                }),
            },
            clearing: vec!["drop_incomplete_rows".to_string()],
            treatment: vec!["forward_fill".to_string()],
            scaling: vec![],
        },
    }
}

/// A two-instrument research configuration over 2024-01-01..05.
#[must_use]
pub fn sample_config() -> Config {
    Config {
        research: Research {
            name: "sample-research".to_string(),
            description: "A small research campaign used by the tests.".to_string(),
            machine_learning: MachineLearning {
                time_range: TimeRange {
                    begin_time: day(1),
                    end_time: day(5),
                },
                split_time: day(4),
                cross_validation_strategy: "time_series_split".to_string(),
            },
            target_quoted_instrument: sample_instrument("NVDA", "NVIDIA"),
            quoted_instruments: vec![sample_instrument("AMD", "AMD")],
            reporting: Reporting::default(),
        },
    }
}

/// The YAML document equivalent of [`sample_config`].
#[must_use]
pub fn sample_config_yaml() -> String {
    r#"
config:
  research:
    name: sample-research
    description: A small research campaign used by the tests.
    machine_learning:
      time_range:
        begin_time: 2024-01-01T00:00:00Z
        end_time: 2024-01-05T00:00:00Z
      split_time: 2024-01-04T00:00:00Z
      cross_validation_strategy: time_series_split
    target_quoted_instrument:
      ticker: NVDA
      name: NVIDIA
      description: NVIDIA common stock
      data_loading:
        data_loading_strategy: load_remote_to_local_and_remote_as_latest
        remote_data_loading:
          source_name: Yahoo! Finance
          file_name: data/nvda.csv
          time_range:
            begin_time: 2024-01-01T00:00:00Z
            end_time: 2024-01-05T00:00:00Z
        local_data_loading:
          file_name: data/nvda_local.csv
        date_column: Date
      data_transformation:
        tending:
          columns:
            names:
              to_snake_case: true
        clearing:
          - drop_incomplete_rows
        treatment:
          - forward_fill
    quoted_instruments:
      - ticker: AMD
        name: AMD
        description: AMD common stock
        data_loading:
          data_loading_strategy: load_remote_to_local_and_remote_as_latest
          remote_data_loading:
            source_name: Yahoo! Finance
            file_name: data/amd.csv
            time_range:
              begin_time: 2024-01-01T00:00:00Z
              end_time: 2024-01-05T00:00:00Z
          local_data_loading:
            file_name: data/amd_local.csv
          date_column: Date
"#
    .to_string()
}
