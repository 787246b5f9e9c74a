use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    None,

    Natural,
    Landscape,
    Astro,
    Flora,
    Fauna,
    Water,

    Artificial,
    City,
    Architecture,
    Transport,
    Road,

    People,
    Portrait,
    Street,
    Environmental,
    Adventure,
    Event,

    Other,
    Abstract,
    Food,
    Product,
}

impl Style {
    pub const ALL: [Style; 22] = [
        Style::None,
        Style::Natural,
        Style::Landscape,
        Style::Astro,
        Style::Flora,
        Style::Fauna,
        Style::Water,
        Style::Artificial,
        Style::City,
        Style::Architecture,
        Style::Transport,
        Style::Road,
        Style::People,
        Style::Portrait,
        Style::Street,
        Style::Environmental,
        Style::Adventure,
        Style::Event,
        Style::Other,
        Style::Abstract,
        Style::Food,
        Style::Product,
    ];

    pub fn id(self) -> u8 {
        match self {
            Style::None => 0,
            Style::Natural => 10,
            Style::Landscape => 11,
            Style::Astro => 12,
            Style::Flora => 13,
            Style::Fauna => 14,
            Style::Water => 15,
            Style::Artificial => 20,
            Style::City => 21,
            Style::Architecture => 22,
            Style::Transport => 23,
            Style::Road => 24,
            Style::People => 30,
            Style::Portrait => 31,
            Style::Street => 32,
            Style::Environmental => 33,
            Style::Adventure => 34,
            Style::Event => 35,
            Style::Other => 90,
            Style::Abstract => 91,
            Style::Food => 92,
            Style::Product => 93,
        }
    }

    pub fn from_id(id: u8) -> Option<Style> {
        Style::ALL.into_iter().find(|style| style.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Style::None => "none",
            Style::Natural => "natural",
            Style::Landscape => "landscape",
            Style::Astro => "astro",
            Style::Flora => "flora",
            Style::Fauna => "fauna",
            Style::Water => "water",
            Style::Artificial => "artificial",
            Style::City => "city",
            Style::Architecture => "architecture",
            Style::Transport => "transport",
            Style::Road => "road",
            Style::People => "people",
            Style::Portrait => "portrait",
            Style::Street => "street",
            Style::Environmental => "environmental",
            Style::Adventure => "adventure",
            Style::Event => "event",
            Style::Other => "other",
            Style::Abstract => "abstract",
            Style::Food => "food",
            Style::Product => "product",
        }
    }

    pub fn from_name(name: &str) -> Option<Style> {
        let name = name.trim();
        Style::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::Style;

    #[test]
    fn ids_are_unique_and_round_trip() {
        for style in Style::ALL {
            assert_eq!(Style::from_id(style.id()), Some(style));
            assert_eq!(Style::from_name(style.name()), Some(style));
        }
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert_eq!(Style::from_id(1), None);
        assert_eq!(Style::from_id(99), None);
    }

    #[test]
    fn name_lookup_ignores_case() {
        assert_eq!(Style::from_name("Landscape"), Some(Style::Landscape));
        assert_eq!(Style::from_name("selfie"), None);
    }
}
