/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawRow, check column contract
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  validate rows → MaterialRecord + failure list
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ MaterialDataset │  Vec<MaterialRecord>, column indices, version
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐     ┌──────────┐
///   │  filter   │ ──▶ │ summary  │ ──▶ │  export  │
///   └──────────┘     └──────────┘     └──────────┘
///        ▲
///        │ memoised by (dataset version, filter hash)
///   ┌──────────┐
///   │  cache    │
///   └──────────┘
/// ```
pub mod cache;
pub mod clean;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
