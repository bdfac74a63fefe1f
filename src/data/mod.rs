pub mod dataset;
pub mod loader;
pub mod cleaner;
pub mod splitter;
pub mod normalizer;

pub use dataset::{RawDataset, RawRecord, Samples, CLASS_NAMES, NUM_FEATURES};
pub use loader::{load_dataset, load_iris};
pub use cleaner::{clean, CleaningStats};
pub use splitter::{stratified_split, Split};
pub use normalizer::{normalize, StandardScaler};
