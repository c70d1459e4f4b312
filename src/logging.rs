use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Output layout of the fmt subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
    Pretty,
}

impl LogFormat {
    /// Unrecognized names fall back to `Compact`
    pub fn from_name(name: &str) -> Self {
        match name {
            "pretty" => LogFormat::Pretty,
            "full" => LogFormat::Full,
            _ => LogFormat::Compact,
        }
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match LogFormat::from_name(&settings.format) {
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Full => subscriber.init(),
        LogFormat::Compact => subscriber.compact().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("full"), LogFormat::Full);
        assert_eq!(LogFormat::from_name("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_name("json"), LogFormat::Compact);
    }

    #[test]
    fn test_default_settings_are_compact() {
        let settings = LoggingSettings::default();
        assert_eq!(LogFormat::from_name(&settings.format), LogFormat::Compact);
    }
}
