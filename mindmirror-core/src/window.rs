use crate::mood::ParseError;
use serde::{Deserialize, Serialize};

/// Days of history requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LookbackWindow {
    #[default]
    Week,
    TwoWeeks,
    Month,
}

impl LookbackWindow {
    pub const ALL: [LookbackWindow; 3] = [
        LookbackWindow::Week,
        LookbackWindow::TwoWeeks,
        LookbackWindow::Month,
    ];

    pub fn days(self) -> u32 {
        match self {
            LookbackWindow::Week => 7,
            LookbackWindow::TwoWeeks => 14,
            LookbackWindow::Month => 30,
        }
    }

    pub fn label(self) -> String {
        format!("{} days", self.days())
    }
}

impl TryFrom<u32> for LookbackWindow {
    type Error = ParseError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(LookbackWindow::Week),
            14 => Ok(LookbackWindow::TwoWeeks),
            30 => Ok(LookbackWindow::Month),
            other => Err(ParseError::UnsupportedWindow(other)),
        }
    }
}

impl From<LookbackWindow> for u32 {
    fn from(w: LookbackWindow) -> Self {
        w.days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_three_windows_exist() {
        assert_eq!(LookbackWindow::try_from(14).unwrap(), LookbackWindow::TwoWeeks);
        assert_eq!(
            LookbackWindow::try_from(10),
            Err(ParseError::UnsupportedWindow(10))
        );
        let days: Vec<u32> = LookbackWindow::ALL.iter().map(|w| w.days()).collect();
        assert_eq!(days, vec![7, 14, 30]);
    }

    #[test]
    fn serializes_as_day_count() {
        assert_eq!(serde_json::to_string(&LookbackWindow::Month).unwrap(), "30");
        let w: LookbackWindow = serde_json::from_str("7").unwrap();
        assert_eq!(w, LookbackWindow::Week);
        assert!(serde_json::from_str::<LookbackWindow>("8").is_err());
    }
}
