//! Configuration for diskbuffer.
//!
//! Default geometry constants plus [`StoreConfig`], the validated set of
//! open parameters shared by the frame store and the record log.

use crate::common::{Error, Result};

/// Default page size in bytes (64KB).
///
/// Pages are the unit of in-memory buffering for the file tail and the
/// unit of disk reads for every older frame.
pub const DEFAULT_PAGE_SIZE: usize = 1 << 16;

/// Default frame size in bytes (2KB), 32 frames per default page.
pub const DEFAULT_FRAME_SIZE: usize = DEFAULT_PAGE_SIZE / 32;

/// Geometry of a frame file.
///
/// # Example
/// ```
/// use diskbuffer::StoreConfig;
///
/// let config = StoreConfig::builder()
///     .page_size(4096)
///     .frame_size(512)
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.frames_per_page(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bytes per page. Must be a non-zero multiple of `frame_size`.
    pub page_size: usize,

    /// Bytes per frame. Must be non-zero.
    pub frame_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Check the geometry invariants.
    ///
    /// # Errors
    /// Returns `Error::Config` if either size is zero or the page size is
    /// not a whole number of frames.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("'page_size' must be positive".into()));
        }
        if self.frame_size == 0 {
            return Err(Error::Config("'frame_size' must be positive".into()));
        }
        if self.page_size % self.frame_size != 0 {
            return Err(Error::Config(format!(
                "'frame_size' ({}) must be a factor of 'page_size' ({})",
                self.frame_size, self.page_size
            )));
        }
        Ok(())
    }

    /// Number of frames held by one page.
    #[inline]
    pub fn frames_per_page(&self) -> usize {
        self.page_size / self.frame_size
    }
}

/// Builder for [`StoreConfig`].
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the page size (in bytes).
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the frame size (in bytes).
    pub fn frame_size(mut self, size: usize) -> Self {
        self.config.frame_size = size;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        assert!(DEFAULT_PAGE_SIZE.is_power_of_two());
        assert_eq!(DEFAULT_PAGE_SIZE, 65536);
        assert_eq!(DEFAULT_FRAME_SIZE, 2048);

        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frames_per_page(), 32);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = StoreConfig::builder().page_size(0).build();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = StoreConfig::builder().frame_size(0).build();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_page_must_be_multiple_of_frame() {
        let config = StoreConfig::builder().page_size(1000).frame_size(64).build();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = StoreConfig::builder().page_size(1024).frame_size(64).build();
        assert!(config.validate().is_ok());
        assert_eq!(config.frames_per_page(), 16);
    }
}
