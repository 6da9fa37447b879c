use serde::{Deserialize, Serialize};

/// Four-level difficulty classification attached to every committed crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    /// Ordinal rating carried on the wire.
    pub const fn rating(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
            Self::Expert => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        }
    }

    pub const fn from_rating(rating: u8) -> Option<Self> {
        match rating {
            1 => Some(Self::Easy),
            2 => Some(Self::Medium),
            3 => Some(Self::Hard),
            4 => Some(Self::Expert),
            _ => None,
        }
    }

    /// Maps the numeric key row onto a classification.
    pub fn from_digit(digit: char) -> Option<Self> {
        let rating = digit.to_digit(10)?;
        Self::from_rating(u8::try_from(rating).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_cover_one_through_four() {
        for difficulty in Difficulty::ALL {
            assert_eq!(
                Difficulty::from_rating(difficulty.rating()),
                Some(difficulty)
            );
        }
        assert_eq!(Difficulty::from_rating(0), None);
        assert_eq!(Difficulty::from_rating(5), None);
    }

    #[test]
    fn labels_are_distinct_and_human() {
        assert_eq!(Difficulty::Easy.label(), "Easy");
        assert_eq!(Difficulty::Expert.label(), "Expert");
        for (i, a) in Difficulty::ALL.iter().enumerate() {
            for b in &Difficulty::ALL[i + 1..] {
                assert_ne!(a.label(), b.label());
            }
        }
    }

    #[test]
    fn from_digit_accepts_only_the_bound_keys() {
        assert_eq!(Difficulty::from_digit('1'), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_digit('4'), Some(Difficulty::Expert));
        assert_eq!(Difficulty::from_digit('5'), None);
        assert_eq!(Difficulty::from_digit('0'), None);
        assert_eq!(Difficulty::from_digit('x'), None);
    }
}
