//! Per-field build configuration.
use h3o::Resolution;

use crate::error::{Error, Result};
use crate::field::normalize::{DegeneratePolicy, Normalizer};
use crate::field::DisplayScale;

/// Configuration for building one scored field.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Name used in logs, events and reports.
    pub label: String,
    /// Grid resolution the region is tiled at.
    pub resolution: Resolution,
    /// Seed of the jitter sequence. Each field starts its own sequence from it.
    pub seed: u32,
    /// Width of the jitter band added to each normalized score.
    pub jitter_amplitude: f64,
    /// Mapping from score to display unit.
    pub display: DisplayScale,
    /// Handling of flat raw fields.
    pub degenerate: DegeneratePolicy,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            label: "field".into(),
            resolution: Resolution::Six,
            seed: 42,
            jitter_amplitude: 0.05,
            display: DisplayScale::default(),
            degenerate: DegeneratePolicy::Zero,
        }
    }
}

impl FieldConfig {
    /// Creates a new [`FieldConfig`] with the given label and default settings.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_jitter_amplitude(mut self, jitter_amplitude: f64) -> Self {
        self.jitter_amplitude = jitter_amplitude;
        self
    }

    pub fn with_display(mut self, display: DisplayScale) -> Self {
        self.display = display;
        self
    }

    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    /// The normalizer described by this configuration.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.jitter_amplitude)
            .with_policy(self.degenerate)
            .with_display(self.display)
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::InvalidConfig("field label must not be empty".into()));
        }
        self.normalizer().validate()
    }
}

/// Converts a numeric resolution (0 to 15) into an [`h3o::Resolution`].
pub fn parse_resolution(value: u8) -> Result<Resolution> {
    Resolution::try_from(value)
        .map_err(|e| Error::InvalidConfig(format!("resolution {value}: {e}")))
}
