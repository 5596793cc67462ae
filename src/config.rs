//! Configuration: engine settings passed to the registry, server settings read from the environment.

use std::ops::RangeInclusive;

/// Settings the engine needs at runtime. Passed explicitly to
/// [`TournamentRegistry::new`](crate::registry::TournamentRegistry::new).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// Ratings given to generated placeholder entrants.
    pub rating_range: RangeInclusive<u32>,
    /// Placeholder names are this prefix followed by a sequence number.
    pub placeholder_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rating_range: 400..=4000,
            placeholder_prefix: "Player #".to_string(),
        }
    }
}

/// Settings for the web binary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read HOST, PORT, RATING_MIN and RATING_MAX, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ServerConfig::from_env`] but with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or(&lookup, "PORT", defaults.port);

        let default_range = defaults.engine.rating_range;
        let min = parse_or(&lookup, "RATING_MIN", *default_range.start());
        let max = parse_or(&lookup, "RATING_MAX", *default_range.end());
        let rating_range = if min <= max {
            min..=max
        } else {
            log::warn!(
                "RATING_MIN {} is above RATING_MAX {}; using {:?}",
                min,
                max,
                default_range
            );
            default_range
        };

        Self {
            host,
            port,
            engine: EngineConfig {
                rating_range,
                ..defaults.engine
            },
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}; using {}", key, raw, default);
            default
        }),
    }
}
