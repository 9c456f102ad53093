pub mod chunker;
pub mod numeric_guard;
pub mod translator;

pub use chunker::split_chunks;
pub use numeric_guard::{protect_numbers, restore_numbers, NumberPlaceholderMap};
pub use translator::{ChunkedTranslator, Translation};
