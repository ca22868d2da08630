//! Codec configuration.

use std::str::FromStr;

use crate::error::FrameError;

/// Which parts of a frame the JSON codec writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Inclusion {
    /// Schema and data (default).
    #[default]
    All,
    /// Only the `schema` object.
    SchemaOnly,
    /// Only the `data` object.
    DataOnly,
}

impl Inclusion {
    /// Parse from an option value (`all`, `schema`, `data`).
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Self::All),
            "schema" | "schema_only" => Some(Self::SchemaOnly),
            "data" | "data_only" => Some(Self::DataOnly),
            _ => None,
        }
    }

    /// Whether the `schema` object is written.
    #[must_use]
    pub fn schema(self) -> bool {
        matches!(self, Self::All | Self::SchemaOnly)
    }

    /// Whether the `data` object is written.
    #[must_use]
    pub fn data(self) -> bool {
        matches!(self, Self::All | Self::DataOnly)
    }
}

impl FromStr for Inclusion {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_opt(s).ok_or_else(|| FrameError::InvalidConfig {
            key: "inclusion".into(),
            message: format!("expected one of all, schema, data; got '{s}'"),
        })
    }
}

/// Configuration for [`JsonCodec`](crate::json::JsonCodec).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Which parts of a frame `encode` writes.
    pub inclusion: Inclusion,

    /// Maximum number of idle buffers kept by the codec's buffer pool.
    pub pool_capacity: usize,

    /// Capacity of freshly allocated output buffers.
    pub initial_buffer_bytes: usize,

    /// Buffers that grew beyond this size are dropped instead of recycled.
    pub max_retained_buffer_bytes: usize,

    /// Reject unknown canonical type names in a schema.
    ///
    /// When `false`, unknown names decode as nullable strings, matching
    /// older producers.
    pub strict_type_names: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            inclusion: Inclusion::All,
            pool_capacity: 16,
            initial_buffer_bytes: 4 * 1024,
            max_retained_buffer_bytes: 4 * 1024 * 1024,
            strict_type_names: true,
        }
    }
}

impl CodecConfig {
    /// Sets the inclusion mode.
    #[must_use]
    pub fn with_inclusion(mut self, inclusion: Inclusion) -> Self {
        self.inclusion = inclusion;
        self
    }

    /// Sets the buffer pool capacity.
    #[must_use]
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Sets the initial buffer size.
    #[must_use]
    pub fn with_initial_buffer_bytes(mut self, bytes: usize) -> Self {
        self.initial_buffer_bytes = bytes;
        self
    }

    /// Sets the retention limit for pooled buffers.
    #[must_use]
    pub fn with_max_retained_buffer_bytes(mut self, bytes: usize) -> Self {
        self.max_retained_buffer_bytes = bytes;
        self
    }

    /// Enables or disables strict type-name checking.
    #[must_use]
    pub fn with_strict_type_names(mut self, strict: bool) -> Self {
        self.strict_type_names = strict;
        self
    }

    /// Checks that the sizes are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidConfig`] if the initial buffer size
    /// exceeds the retention limit.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.initial_buffer_bytes > self.max_retained_buffer_bytes {
            return Err(FrameError::InvalidConfig {
                key: "initial_buffer_bytes".into(),
                message: format!(
                    "{} exceeds max_retained_buffer_bytes {}",
                    self.initial_buffer_bytes, self.max_retained_buffer_bytes
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusion_from_str_opt() {
        assert_eq!(Inclusion::from_str_opt("ALL"), Some(Inclusion::All));
        assert_eq!(Inclusion::from_str_opt("schema"), Some(Inclusion::SchemaOnly));
        assert_eq!(Inclusion::from_str_opt("Data"), Some(Inclusion::DataOnly));
        assert_eq!(Inclusion::from_str_opt("rows"), None);
        assert!("rows".parse::<Inclusion>().is_err());
    }

    #[test]
    fn test_inclusion_parts() {
        assert!(Inclusion::All.schema() && Inclusion::All.data());
        assert!(Inclusion::SchemaOnly.schema() && !Inclusion::SchemaOnly.data());
        assert!(!Inclusion::DataOnly.schema() && Inclusion::DataOnly.data());
    }

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.inclusion, Inclusion::All);
        assert_eq!(config.pool_capacity, 16);
        assert!(config.strict_type_names);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_initial_buffer() {
        let config = CodecConfig::default()
            .with_initial_buffer_bytes(1024)
            .with_max_retained_buffer_bytes(512);
        assert!(matches!(
            config.validate(),
            Err(FrameError::InvalidConfig { ref key, .. }) if key == "initial_buffer_bytes"
        ));
    }
}
