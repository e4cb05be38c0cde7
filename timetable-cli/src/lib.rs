// All reconstruction lives in timetable-render-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod fetcher;

// Re-export core types for convenience
pub use timetable_render_core::*;

// Re-export CLI utilities
pub use fetcher::HttpRenderSource;
