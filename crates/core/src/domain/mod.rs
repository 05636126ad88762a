pub mod preferences;
pub mod product;
pub mod recommendation;
