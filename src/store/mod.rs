pub mod artifact;
pub mod catalog;
pub mod similarity;

pub use artifact::load_store;
pub use catalog::MovieCatalog;
pub use similarity::SimilarityMatrix;
