#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceCategory {
    GameConsole,
    Other,
    PersonalComputer,
    SmartTv,
    Smartphone,
    Tablet,
    #[default]
    Unknown,
}

impl DeviceCategory {
    /// Map a catalog device name onto a category. Unrecognized names are `Unknown`.
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "game console" => Self::GameConsole,
            "other" => Self::Other,
            "personal computer" => Self::PersonalComputer,
            "smart tv" => Self::SmartTv,
            "smartphone" => Self::Smartphone,
            "tablet" => Self::Tablet,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GameConsole => "Game console",
            Self::Other => "Other",
            Self::PersonalComputer => "Personal computer",
            Self::SmartTv => "Smart TV",
            Self::Smartphone => "Smartphone",
            Self::Tablet => "Tablet",
            Self::Unknown => super::UNKNOWN,
        }
    }
}
