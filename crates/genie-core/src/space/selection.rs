//! Space selection lifecycle.
//!
//! ```text
//! NoSelection --spaces fetched--> SpacesListed --pick + confirm--> SpaceActive
//!      ^                                                              |
//!      +-------------------- logout / change agent -------------------+
//! ```
//!
//! `SpaceActive` is the only state in which the chat UI is shown; every other
//! state shows the selection overlay.

use super::model::Space;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value of the disabled picker entry shown when no spaces are available.
pub const NO_SPACES_SENTINEL: &str = "no_spaces_found";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please select an Agent.")]
    NothingSelected,
}

/// Coarse phase of the lifecycle, for views and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPhase {
    NoSelection,
    SpacesListed,
    SpaceActive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    NoSelection,
    SpacesListed {
        spaces: Vec<Space>,
    },
    SpaceActive {
        spaces: Vec<Space>,
        space: Space,
    },
}

impl SelectionState {
    pub fn phase(&self) -> SelectionPhase {
        match self {
            Self::NoSelection => SelectionPhase::NoSelection,
            Self::SpacesListed { .. } => SelectionPhase::SpacesListed,
            Self::SpaceActive { .. } => SelectionPhase::SpaceActive,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::SpaceActive { .. })
    }

    /// Spaces known to the picker, empty before the first listing.
    pub fn spaces(&self) -> &[Space] {
        match self {
            Self::NoSelection => &[],
            Self::SpacesListed { spaces } | Self::SpaceActive { spaces, .. } => spaces,
        }
    }

    pub fn active_space(&self) -> Option<&Space> {
        match self {
            Self::SpaceActive { space, .. } => Some(space),
            _ => None,
        }
    }

    /// Records a fresh listing.
    ///
    /// An active selection survives a refresh; otherwise the state becomes
    /// `SpacesListed` (an empty listing is still a listing).
    pub fn list(&mut self, listed: Vec<Space>) {
        match self {
            Self::SpaceActive { spaces, .. } => *spaces = listed,
            _ => *self = Self::SpacesListed { spaces: listed },
        }
    }

    /// Confirms the picker's current value.
    ///
    /// Blank values and the "no spaces" sentinel are rejected and leave the
    /// state unchanged. An id missing from the listing is accepted as a bare
    /// space so the welcome banner falls back to its defaults.
    pub fn confirm(&mut self, space_id: Option<&str>) -> Result<Space, SelectionError> {
        let space_id = space_id
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != NO_SPACES_SENTINEL)
            .ok_or(SelectionError::NothingSelected)?;

        let spaces = self.spaces().to_vec();
        let space = spaces
            .iter()
            .find(|s| s.space_id == space_id)
            .cloned()
            .unwrap_or_else(|| Space::bare(space_id));

        *self = Self::SpaceActive {
            spaces,
            space: space.clone(),
        };
        Ok(space)
    }

    /// Drops the selection and the listing (logout or change agent).
    pub fn clear(&mut self) {
        *self = Self::NoSelection;
    }
}
