/// Data layer: loading, cleaning, ordering and splitting tables.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (typed cells)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  drop empties, coerce, percent-scale, sort_key order → Table
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  split    │  cut at a split-point label → 1 or 2 Tables
///   └──────────┘
/// ```
pub mod columns;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod sort_key;
pub mod split;
