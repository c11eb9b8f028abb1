//! Paper colors available for the page background.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Named paper color, stored by name in documents and preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    White,
    Red,
    Blue,
    Green,
    Purple,
    Pink,
    Brown,
    Ash,
}

impl ColorName {
    /// Every color, in menu order.
    pub const ALL: [ColorName; 8] = [
        ColorName::White,
        ColorName::Red,
        ColorName::Blue,
        ColorName::Green,
        ColorName::Purple,
        ColorName::Pink,
        ColorName::Brown,
        ColorName::Ash,
    ];

    /// Name as written to files and used for menu item ids.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Brown => "brown",
            Self::Ash => "ash",
        }
    }

    /// Parse a color name, case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Background color of the paper.
    pub fn background(self) -> &'static str {
        match self {
            Self::White => "#fffcf6",
            Self::Red => "#cc6b6b",
            Self::Blue => "#9db5de",
            Self::Green => "#9ddebb",
            Self::Purple => "#9f84d0",
            Self::Pink => "#ffd4f9",
            Self::Brown => "#a98b6a",
            Self::Ash => "#282828",
        }
    }

    /// Translucent tint used for ink drawn on this paper.
    pub fn tint(self) -> &'static str {
        match self {
            Self::White => "hsla(40 32% 85% / 50%)",
            Self::Red => "rgb(165 78 78 / 50%)",
            Self::Blue => "rgb(118 141 181 / 50%)",
            Self::Green => "rgb(98 183 137 / 50%)",
            Self::Purple => "rgb(126 100 173 / 50%)",
            Self::Pink => "rgb(206 158 199 / 50%)",
            Self::Brown => "rgb(144 111 72 / 50%)",
            Self::Ash => "rgb(15 15 15 / 50%)",
        }
    }
}

impl std::fmt::Display for ColorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a random paper color. Never picks `ash`, which is reserved for an
/// explicit choice.
pub fn random_color() -> ColorName {
    let candidates: Vec<ColorName> = ColorName::ALL
        .into_iter()
        .filter(|c| *c != ColorName::Ash)
        .collect();
    *candidates.choose(&mut rand::rng()).unwrap_or(&ColorName::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&ColorName::Purple).unwrap();
        assert_eq!(json, "\"purple\"");
        let parsed: ColorName = serde_json::from_str("\"ash\"").unwrap();
        assert_eq!(parsed, ColorName::Ash);
    }

    #[test]
    fn test_unknown_color_rejected() {
        assert!(serde_json::from_str::<ColorName>("\"teal\"").is_err());
        assert_eq!(ColorName::parse("teal"), None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ColorName::parse("Blue"), Some(ColorName::Blue));
        assert_eq!(ColorName::parse(" brown "), Some(ColorName::Brown));
    }

    #[test]
    fn test_random_color_never_ash() {
        for _ in 0..500 {
            assert_ne!(random_color(), ColorName::Ash);
        }
    }

    #[test]
    fn test_palette_values() {
        assert_eq!(ColorName::White.background(), "#fffcf6");
        assert_eq!(ColorName::Ash.tint(), "rgb(15 15 15 / 50%)");
        assert_eq!(ColorName::Red.to_string(), "red");
    }
}
