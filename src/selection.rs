// 🎛️ Filter Selection - the only piece of session state
//
// Owned by whoever drives the render loop (terminal app, browser page) and
// changed only through the named transitions below. Every transition is a
// plain overwrite: selecting the active filter again changes nothing.

use crate::merchant::VoucherType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which merchants are currently shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSelection {
    #[default]
    All,
    Tmoney,
    Culture,
}

impl FilterSelection {
    pub fn code(&self) -> &'static str {
        match self {
            FilterSelection::All => "all",
            FilterSelection::Tmoney => "tmoney",
            FilterSelection::Culture => "culture",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FilterSelection::All => "All",
            FilterSelection::Tmoney => "T-money",
            FilterSelection::Culture => "Culture Voucher",
        }
    }

    /// The voucher type this selection narrows to, if any
    pub fn voucher_type(&self) -> Option<VoucherType> {
        match self {
            FilterSelection::All => None,
            FilterSelection::Tmoney => Some(VoucherType::Tmoney),
            FilterSelection::Culture => Some(VoucherType::Culture),
        }
    }

    pub fn matches(&self, voucher_type: VoucherType) -> bool {
        self.voucher_type().map_or(true, |wanted| wanted == voucher_type)
    }
}

impl From<VoucherType> for FilterSelection {
    fn from(voucher_type: VoucherType) -> Self {
        match voucher_type {
            VoucherType::Tmoney => FilterSelection::Tmoney,
            VoucherType::Culture => FilterSelection::Culture,
        }
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown selection '{0}' (expected all, tmoney or culture)")]
pub struct UnknownSelection(pub String);

impl FromStr for FilterSelection {
    type Err = UnknownSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterSelection::All),
            "tmoney" => Ok(FilterSelection::Tmoney),
            "culture" => Ok(FilterSelection::Culture),
            _ => Err(UnknownSelection(s.to_string())),
        }
    }
}

/// User intents that change the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectTmoney,
    SelectCulture,
    SelectAll,
}

impl Action {
    /// Pure reducer: the selection that results from this action.
    /// The previous selection never matters (last write wins).
    pub fn reduce(self, _current: FilterSelection) -> FilterSelection {
        match self {
            Action::SelectTmoney => FilterSelection::Tmoney,
            Action::SelectCulture => FilterSelection::Culture,
            Action::SelectAll => FilterSelection::All,
        }
    }
}

/// Session-scoped holder for the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    current: FilterSelection,
}

impl SelectionState {
    /// Starts at [`FilterSelection::All`]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> FilterSelection {
        self.current
    }

    pub fn select_tmoney(&mut self) {
        self.apply(Action::SelectTmoney);
    }

    pub fn select_culture(&mut self) {
        self.apply(Action::SelectCulture);
    }

    pub fn select_all(&mut self) {
        self.apply(Action::SelectAll);
    }

    /// Apply an action, returning the new selection
    pub fn apply(&mut self, action: Action) -> FilterSelection {
        self.current = action.reduce(self.current);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_selection_is_all() {
        assert_eq!(SelectionState::new().current(), FilterSelection::All);
        assert_eq!(FilterSelection::default(), FilterSelection::All);
    }

    #[test]
    fn test_transitions_overwrite() {
        let mut state = SelectionState::new();

        state.select_tmoney();
        assert_eq!(state.current(), FilterSelection::Tmoney);

        state.select_culture();
        assert_eq!(state.current(), FilterSelection::Culture);

        state.select_all();
        assert_eq!(state.current(), FilterSelection::All);
    }

    #[test]
    fn test_reselecting_is_not_a_toggle() {
        let mut state = SelectionState::new();
        state.select_tmoney();
        state.select_tmoney();
        assert_eq!(state.current(), FilterSelection::Tmoney);
    }

    #[test]
    fn test_every_state_reaches_every_state() {
        let states = [FilterSelection::All, FilterSelection::Tmoney, FilterSelection::Culture];
        let actions = [
            (Action::SelectAll, FilterSelection::All),
            (Action::SelectTmoney, FilterSelection::Tmoney),
            (Action::SelectCulture, FilterSelection::Culture),
        ];

        for from in states {
            for (action, expected) in actions {
                assert_eq!(action.reduce(from), expected, "{from:?} --{action:?}-->");
            }
        }
    }

    #[test]
    fn test_matches() {
        assert!(FilterSelection::All.matches(VoucherType::Tmoney));
        assert!(FilterSelection::All.matches(VoucherType::Culture));
        assert!(FilterSelection::Tmoney.matches(VoucherType::Tmoney));
        assert!(!FilterSelection::Tmoney.matches(VoucherType::Culture));
        assert!(FilterSelection::Culture.matches(VoucherType::Culture));
        assert!(!FilterSelection::Culture.matches(VoucherType::Tmoney));
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!("all".parse(), Ok(FilterSelection::All));
        assert_eq!("TMoney".parse(), Ok(FilterSelection::Tmoney));
        assert_eq!("culture".parse(), Ok(FilterSelection::Culture));
        assert_eq!(
            "books".parse::<FilterSelection>(),
            Err(UnknownSelection("books".to_string()))
        );
    }

    #[test]
    fn test_selection_from_voucher_type() {
        assert_eq!(FilterSelection::from(VoucherType::Tmoney), FilterSelection::Tmoney);
        assert_eq!(FilterSelection::from(VoucherType::Culture), FilterSelection::Culture);
    }
}
