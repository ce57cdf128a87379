use std::env;

/// Environment variable that switches debug bookkeeping on.
pub const DEBUG_ENV_VAR: &str = "MODULE_CONTEXT_DEBUG";

/// Runtime settings shared by a [`Registry`](crate::Registry) and every
/// factory it creates.
///
/// In debug mode each factory also records the results of uncached calls
/// under synthetic names, and counts them. Those entries are for inspection
/// only and never answer a lookup.
///
/// # Examples
///
/// ```
/// use module_context_core::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.debug);
///
/// let settings = Settings::default().with_debug(true);
/// assert!(settings.debug);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub debug: bool,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// `MODULE_CONTEXT_DEBUG` enables debug mode when set to `1`, `true`,
    /// `yes` or `on` (case-insensitive). Any other value, or no value, leaves
    /// it off.
    pub fn from_env() -> Self {
        let debug = env::var(DEBUG_ENV_VAR)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        Self { debug }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_flag() {
        for value in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(parse_flag(value), "{value} should enable debug");
        }
        for value in ["", "0", "false", "off", "debug"] {
            assert!(!parse_flag(value), "{value} should not enable debug");
        }
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(DEBUG_ENV_VAR, "true");
        assert!(Settings::from_env().debug);

        env::set_var(DEBUG_ENV_VAR, "0");
        assert!(!Settings::from_env().debug);

        env::remove_var(DEBUG_ENV_VAR);
        assert!(!Settings::from_env().debug);
    }
}
