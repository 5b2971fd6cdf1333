use std::str::FromStr;

use log::debug;

use crate::ConfigError;

/// Receiver options controlling raw measurement and ephemeris handling.
///
/// Parsed from the usual whitespace separated option string, e.g.
/// `"-TADJ=1.0 -INVCP"`. Everything is off by default.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecoderConfig {
    /// `-TADJ=<sec>`: round observation time tags to multiples of this interval
    pub time_tag_interval: Option<f64>,
    /// `-INVCP`: invert carrier phase polarity of legacy raw measurements
    pub invert_carrier_phase: bool,
    /// `-EPHALL`: store every decoded ephemeris, changed or not
    pub keep_all_ephemerides: bool,
    /// `-STD_SLIP=<n>`: carrier phase std-dev slip threshold
    pub std_slip: Option<u8>,
}

impl DecoderConfig {
    pub fn with_time_tag_interval(mut self, interval: f64) -> Self {
        self.time_tag_interval = (interval > 0.0).then_some(interval);
        self
    }

    pub fn with_inverted_carrier_phase(mut self) -> Self {
        self.invert_carrier_phase = true;
        self
    }

    pub fn with_all_ephemerides(mut self) -> Self {
        self.keep_all_ephemerides = true;
        self
    }

    pub fn with_std_slip(mut self, threshold: u8) -> Self {
        self.std_slip = (threshold > 0).then_some(threshold);
        self
    }
}

fn parse_value<T: FromStr>(option: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        option,
        value: value.to_string(),
    })
}

impl FromStr for DecoderConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = Self::default();
        for token in s.split_whitespace() {
            if let Some(value) = token.strip_prefix("-TADJ=") {
                config = config.with_time_tag_interval(parse_value("-TADJ", value)?);
            } else if let Some(value) = token.strip_prefix("-STD_SLIP=") {
                config = config.with_std_slip(parse_value("-STD_SLIP", value)?);
            } else if token == "-INVCP" {
                config = config.with_inverted_carrier_phase();
            } else if token == "-EPHALL" {
                config = config.with_all_ephemerides();
            } else {
                debug!("ignoring receiver option {}", token);
            }
        }
        Ok(config)
    }
}
