use std::time::Duration;

use crate::constants::{DEFAULT_FLOATING_OFFSET, DEFAULT_RIGHT_PADDING, DEFAULT_SAFETY_MARGIN};
use crate::error::ConfigError;

/// Settings read by the status bar for the length of a session.
///
/// Changing `use_floating_window` (or anything else) on a live bar goes
/// through `StatusBar::reconfigure`, which tears down and rebuilds.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBarConfig {
    /// Multiplier applied to the measured text width when reserving space,
    /// for hosts that draw the status text larger than console text.
    pub text_scale_factor: f32,
    /// Blank columns kept between the status text and the right edge.
    pub right_padding: u16,
    /// `None` disables periodic updates.
    pub update_interval: Option<Duration>,
    pub use_floating_window: bool,
    /// Also write the text into status consoles as owned content.
    pub include_status_console: bool,
    pub safety_margin: u16,
    pub floating_offset: (i16, i16),
}

impl StatusBarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.text_scale_factor.is_finite() || self.text_scale_factor <= 0.0 {
            return Err(ConfigError::InvalidScale(self.text_scale_factor));
        }
        if self.update_interval == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            text_scale_factor: 1.0,
            right_padding: DEFAULT_RIGHT_PADDING,
            update_interval: Some(Duration::from_secs(1)),
            use_floating_window: false,
            include_status_console: true,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            floating_offset: DEFAULT_FLOATING_OFFSET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(StatusBarConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_or_nan_scale() {
        for scale in [0.0_f32, -1.0, f32::INFINITY] {
            let config = StatusBarConfig {
                text_scale_factor: scale,
                ..StatusBarConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidScale(scale)));
        }
        let config = StatusBarConfig {
            text_scale_factor: f32::NAN,
            ..StatusBarConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidScale(_))
        ));
    }

    #[test]
    fn zero_interval_is_rejected_but_none_is_fine() {
        let mut config = StatusBarConfig {
            update_interval: Some(Duration::ZERO),
            ..StatusBarConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
        config.update_interval = None;
        assert_eq!(config.validate(), Ok(()));
    }
}
