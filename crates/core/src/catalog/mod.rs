//! Catalog records: categories, products, and filter criteria.

pub mod category;
pub mod filter;
pub mod product;

pub use category::{Category, CategoryForest, CategoryNode, build_category_tree};
pub use filter::FilterCriteria;
pub use product::{Product, newest_first};
