use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notion text and block colors.
///
/// Background variants serialize with Notion's `_background` suffix.
/// Colors Notion adds later decode as [`Color::Other`] and are written back
/// as `default`; [`FromStr`](std::str::FromStr) still rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    GrayBackground,
    BrownBackground,
    RedBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
    Other,
}

impl std::str::FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Color::Default),
            "gray" => Ok(Color::Gray),
            "brown" => Ok(Color::Brown),
            "red" => Ok(Color::Red),
            "orange" => Ok(Color::Orange),
            "yellow" => Ok(Color::Yellow),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            "purple" => Ok(Color::Purple),
            "pink" => Ok(Color::Pink),
            "gray_background" => Ok(Color::GrayBackground),
            "brown_background" => Ok(Color::BrownBackground),
            "red_background" => Ok(Color::RedBackground),
            "orange_background" => Ok(Color::OrangeBackground),
            "yellow_background" => Ok(Color::YellowBackground),
            "green_background" => Ok(Color::GreenBackground),
            "blue_background" => Ok(Color::BlueBackground),
            "purple_background" => Ok(Color::PurpleBackground),
            "pink_background" => Ok(Color::PinkBackground),
            _ => Err(ValidationError::InvalidColor(s.to_string())),
        }
    }
}

impl Color {
    /// Convert to the Notion wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Default => "default",
            Color::Gray => "gray",
            Color::Brown => "brown",
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Purple => "purple",
            Color::Pink => "pink",
            Color::GrayBackground => "gray_background",
            Color::BrownBackground => "brown_background",
            Color::RedBackground => "red_background",
            Color::OrangeBackground => "orange_background",
            Color::YellowBackground => "yellow_background",
            Color::GreenBackground => "green_background",
            Color::BlueBackground => "blue_background",
            Color::PurpleBackground => "purple_background",
            Color::PinkBackground => "pink_background",
            Color::Other => "default",
        }
    }

    /// Check if this is a background color
    pub fn is_background(&self) -> bool {
        self.as_str().ends_with("_background")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Color::Other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_color_parsing() {
        assert_eq!(Color::from_str("red").unwrap(), Color::Red);
        assert_eq!(
            Color::from_str("gray_background").unwrap(),
            Color::GrayBackground
        );
        assert!(Color::from_str("invalid").is_err());
    }

    #[test]
    fn test_color_wire_names_round_trip() {
        for name in ["default", "blue", "pink_background"] {
            let color = Color::from_str(name).unwrap();
            assert_eq!(color.as_str(), name);
            assert_eq!(serde_json::to_value(color).unwrap(), name);
        }
        assert!(Color::BlueBackground.is_background());
        assert!(!Color::Blue.is_background());
    }

    #[test]
    fn test_unknown_wire_colors_decode_leniently() {
        let color: Color = serde_json::from_str("\"teal_background\"").unwrap();
        assert_eq!(color, Color::Other);
        assert!(!color.is_background());
        assert_eq!(serde_json::to_value(color).unwrap(), "default");
        assert!(Color::from_str("teal_background").is_err());
    }
}
