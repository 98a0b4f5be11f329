pub mod cache;
#[cfg(feature = "tokio-runtime")]
pub mod loader;

// Re-exports for convenience
pub use cache::{TileCache, TileKey};
#[cfg(feature = "tokio-runtime")]
pub use loader::{TileLoader, TileLoaderConfig};
