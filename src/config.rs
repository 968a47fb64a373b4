/// Session settings. Defaults match a plain per-frame callback; see
/// [`SessionConfig::from_env`] for the environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Initial packed-buffer capacity in bytes. The buffer grows on demand.
    pub initial_buffer_capacity: usize,
    /// Run the plane packer on every frame.
    pub pack_images: bool,
    /// Log the distance/timestamp line every Nth frame (0 = never).
    pub log_every: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_buffer_capacity: 1,
            pack_images: true,
            log_every: 1,
        }
    }
}

impl SessionConfig {
    pub const ENV_INITIAL_CAPACITY: &'static str = "ARFRAME_INITIAL_CAPACITY";
    pub const ENV_PACK_IMAGES: &'static str = "ARFRAME_PACK_IMAGES";
    pub const ENV_LOG_EVERY: &'static str = "ARFRAME_LOG_EVERY";

    /// Defaults overridden by `ARFRAME_*` environment variables.
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            initial_buffer_capacity: read_env_usize(
                Self::ENV_INITIAL_CAPACITY,
                defaults.initial_buffer_capacity,
            ),
            pack_images: read_env_bool(Self::ENV_PACK_IMAGES, defaults.pack_images),
            log_every: read_env_u32(Self::ENV_LOG_EVERY, defaults.log_every),
        }
    }

    pub fn with_initial_buffer_capacity(mut self, capacity: usize) -> Self {
        self.initial_buffer_capacity = capacity;
        self
    }

    pub fn with_pack_images(mut self, pack_images: bool) -> Self {
        self.pack_images = pack_images;
        self
    }

    pub fn with_log_every(mut self, log_every: u32) -> Self {
        self.log_every = log_every;
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn read_env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn read_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn read_env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("Off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let config = SessionConfig::default()
            .with_initial_buffer_capacity(4096)
            .with_pack_images(false)
            .with_log_every(30);
        assert_eq!(config.initial_buffer_capacity, 4096);
        assert!(!config.pack_images);
        assert_eq!(config.log_every, 30);
    }

    #[test]
    fn test_env_fallback_on_missing_or_garbage() {
        assert_eq!(read_env_usize("ARFRAME_TEST_UNSET_CAPACITY", 7), 7);
        assert!(read_env_bool("ARFRAME_TEST_UNSET_PACK", true));
        assert_eq!(read_env_u32("ARFRAME_TEST_UNSET_LOG", 3), 3);
    }

    // Only test in the crate that sets the ARFRAME_* variables.
    #[test]
    fn test_from_env_reads_trimmed_and_mixed_case_values() {
        std::env::set_var(SessionConfig::ENV_INITIAL_CAPACITY, " 4096 ");
        std::env::set_var(SessionConfig::ENV_PACK_IMAGES, "OFF");
        std::env::set_var(SessionConfig::ENV_LOG_EVERY, "garbage");

        let config = SessionConfig::from_env();

        std::env::remove_var(SessionConfig::ENV_INITIAL_CAPACITY);
        std::env::remove_var(SessionConfig::ENV_PACK_IMAGES);
        std::env::remove_var(SessionConfig::ENV_LOG_EVERY);

        assert_eq!(config.initial_buffer_capacity, 4096);
        assert!(!config.pack_images);
        assert_eq!(config.log_every, SessionConfig::default().log_every);
        assert_eq!(config.log_every, 1);
    }
}
