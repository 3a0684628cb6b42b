//! Level layouts: generation, the stored format, and storage backends

pub mod format;
pub mod generator;
pub mod source;

pub use format::{BrickSpec, Level, level_id, parse_level_number};
pub use generator::{Layout, generate_level};
pub use source::{LevelDir, LevelSource, LevelSummary, MemoryLevels, Procedural, create_sample_levels, save_level};
