//! Configuration for slotstore
//!
//! Centralized configuration with sensible defaults.

/// Stride used when the caller passes a non-positive hint, or when an
/// existing header holds a non-positive value.
pub const DEFAULT_STRIDE: i32 = 128;

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Layout Configuration
    // -------------------------------------------------------------------------
    /// Slot stride hint in bytes. Only used when the file does not exist yet;
    /// an existing file always keeps the stride stored in its header.
    /// Values `<= 0` fall back to [`DEFAULT_STRIDE`].
    pub stride: i32,

    // -------------------------------------------------------------------------
    // Write Configuration
    // -------------------------------------------------------------------------
    /// What happens to the file handle after each write
    pub sync_strategy: SyncStrategy,
}

/// Durability of a single write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Flush the handle before closing it (data reaches the OS, not the disk)
    Flush,

    /// fsync data after every write (safest, slowest)
    EveryWrite,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            sync_strategy: SyncStrategy::Flush,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the slot stride hint (in bytes)
    pub fn stride(mut self, stride: i32) -> Self {
        self.config.stride = stride;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
