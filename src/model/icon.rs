use serde::{Deserialize, Serialize};

/// Icon identifiers a feature can carry. Rendering maps these through a
/// lookup table; unknown keys from older data fall back to `Feature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IconKey {
    Bug,
    Design,
    Research,
    Docs,
    Infra,
    Idea,
    Release,
    /// Also the catch-all for unknown keys, so it must stay last
    #[default]
    #[serde(other)]
    Feature,
}

impl IconKey {
    pub const ALL: [IconKey; 8] = [
        IconKey::Feature,
        IconKey::Bug,
        IconKey::Design,
        IconKey::Research,
        IconKey::Docs,
        IconKey::Infra,
        IconKey::Idea,
        IconKey::Release,
    ];

    pub fn key(self) -> &'static str {
        match self {
            IconKey::Feature => "feature",
            IconKey::Bug => "bug",
            IconKey::Design => "design",
            IconKey::Research => "research",
            IconKey::Docs => "docs",
            IconKey::Infra => "infra",
            IconKey::Idea => "idea",
            IconKey::Release => "release",
        }
    }

    pub fn parse(s: &str) -> Option<IconKey> {
        IconKey::ALL.into_iter().find(|k| k.key() == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_falls_back_to_feature() {
        let k: IconKey = serde_json::from_str("\"rocket-ship\"").unwrap();
        assert_eq!(k, IconKey::Feature);
        let k: IconKey = serde_json::from_str("\"bug\"").unwrap();
        assert_eq!(k, IconKey::Bug);
        assert_eq!(serde_json::to_string(&IconKey::Feature).unwrap(), "\"feature\"");
        assert_eq!(IconKey::default(), IconKey::Feature);
    }

    #[test]
    fn parse_matches_key() {
        for k in IconKey::ALL {
            assert_eq!(IconKey::parse(k.key()), Some(k));
        }
        assert_eq!(IconKey::parse("nope"), None);
    }
}
