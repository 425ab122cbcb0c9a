//! Column semantic resolution.
//!
//! Datasets name the same concept differently (`CUSTOMER_NAME`, `customer`, `Buyer_Ref`). The
//! [`ColumnResolver`] maps a logical concept to whatever column a given dataset actually has.
//!
//! ```rust
//! use tabular_insights::semantic::ColumnResolver;
//!
//! let resolver = ColumnResolver::new();
//! let columns = vec!["Order_Id".to_string(), "Ship_Mode".to_string()];
//! assert_eq!(resolver.resolve(&columns, "ship_mode").as_deref(), Some("Ship_Mode"));
//! assert_eq!(resolver.resolve(&columns, "region"), None);
//! ```

mod registry;
mod resolver;

pub use registry::{ConceptMapping, default_mappings};
pub use resolver::{
    CacheStats, ColumnResolver, DataSourceValidation, MappingSuggestion, MatchStrategy,
};
