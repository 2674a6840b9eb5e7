/// Data layer: trip types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → TripTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ TripTable  │  Vec<Trip> with derived month / week_day
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  month / day selection → filtered TripTable
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
