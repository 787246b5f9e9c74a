use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    #[default]
    None,
    Bad,
    Decent,
    Good,
    VeryGood,
    Best,
}

impl Rating {
    pub const ALL: [Rating; 6] = [
        Rating::None,
        Rating::Bad,
        Rating::Decent,
        Rating::Good,
        Rating::VeryGood,
        Rating::Best,
    ];

    pub fn id(self) -> u8 {
        match self {
            Rating::None => 0,
            Rating::Bad => 1,
            Rating::Decent => 2,
            Rating::Good => 3,
            Rating::VeryGood => 4,
            Rating::Best => 5,
        }
    }

    pub fn from_id(id: u8) -> Option<Rating> {
        Rating::ALL.into_iter().find(|rating| rating.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Rating::None => "none",
            Rating::Bad => "bad",
            Rating::Decent => "decent",
            Rating::Good => "good",
            Rating::VeryGood => "very_good",
            Rating::Best => "best",
        }
    }

    pub fn from_name(name: &str) -> Option<Rating> {
        let name = name.trim();
        Rating::ALL
            .into_iter()
            .find(|rating| rating.name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::Rating;

    #[test]
    fn ids_round_trip() {
        for rating in Rating::ALL {
            assert_eq!(Rating::from_id(rating.id()), Some(rating));
            assert_eq!(Rating::from_name(rating.name()), Some(rating));
        }
        assert_eq!(Rating::from_id(6), None);
    }
}
