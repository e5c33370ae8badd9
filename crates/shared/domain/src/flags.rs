use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Per-option behaviour flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct OptionFlags: u8 {
        /// The option may be changed in user preferences.
        const USER_PREFS = 1 << 0;
        /// The option is written even when it equals its default.
        const PERSIST = 1 << 1;
    }
}

bitflags! {
    /// Optional server-side features that change what some options can do.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Capabilities: u32 {
        const ZIP = 1 << 0;
        const GZIP = 1 << 1;
        const BZIP2 = 1 << 2;
        const ICONV = 1 << 3;
        const MBSTRING = 1 << 4;
        const RECODE = 1 << 5;

        const ALL = Self::ZIP.bits()
            | Self::GZIP.bits()
            | Self::BZIP2.bits()
            | Self::ICONV.bits()
            | Self::MBSTRING.bits()
            | Self::RECODE.bits();
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<&str> for Capabilities {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Self::ZIP,
            "gzip" | "gz" => Self::GZIP,
            "bzip2" | "bz2" => Self::BZIP2,
            "iconv" => Self::ICONV,
            "mbstring" | "mb" => Self::MBSTRING,
            "recode" => Self::RECODE,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

/// Serialized as a list of lowercase names, e.g. `["zip", "gzip"]`.
impl Serialize for Capabilities {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names: Vec<String> =
            self.iter_names().filter(|(name, _)| *name != "ALL").map(|(n, _)| n.to_lowercase()).collect();
        names.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Capabilities {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names.iter().map(|n| Self::from(n.as_str())).fold(Self::empty(), |acc, c| acc | c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_names_parse_case_insensitively() {
        assert_eq!(Capabilities::from("GZip"), Capabilities::GZIP);
        assert_eq!(Capabilities::from("bz2"), Capabilities::BZIP2);
        assert_eq!(Capabilities::from("unknown"), Capabilities::empty());
    }

    #[test]
    fn capabilities_use_name_lists() {
        let caps: Capabilities = serde_json::from_str(r#"["zip", "iconv", "nope"]"#).unwrap();
        assert_eq!(caps, Capabilities::ZIP | Capabilities::ICONV);
        assert_eq!(serde_json::to_string(&caps).unwrap(), r#"["zip","iconv"]"#);
    }
}
