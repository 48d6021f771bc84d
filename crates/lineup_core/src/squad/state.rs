//! In-progress squad selection.
//!
//! The selection is only mutated through [`super::evaluator::SquadEvaluator`],
//! so every addition has passed the size, budget and slot checks.

use crate::error::SquadError;
use crate::models::{AthleteId, Formation, Price};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadState {
    pub(crate) selected: Vec<AthleteId>,
    formation: Formation,
    pub(crate) captain: Option<AthleteId>,
    budget: Price,
}

impl SquadState {
    /// Empty selection with the default formation.
    pub fn new(budget: Price) -> Self {
        Self::with_formation(budget, Formation::DEFAULT)
    }

    pub fn with_formation(budget: Price, formation: Formation) -> Self {
        Self { selected: Vec::new(), formation, captain: None, budget }
    }

    /// Selected ids in the order they were added.
    pub fn selected_ids(&self) -> &[AthleteId] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: AthleteId) -> bool {
        self.selected.contains(&id)
    }

    pub fn formation(&self) -> Formation {
        self.formation
    }

    /// Switch formation. The current selection is kept as is; only the slot
    /// limits enforced on later additions change.
    pub fn set_formation(&mut self, formation: Formation) {
        if formation != self.formation {
            tracing::debug!(from = %self.formation, to = %formation, "formation changed");
        }
        self.formation = formation;
    }

    pub fn captain(&self) -> Option<AthleteId> {
        self.captain
    }

    pub fn set_captain(&mut self, id: AthleteId) -> Result<(), SquadError> {
        if !self.is_selected(id) {
            return Err(SquadError::CaptainNotSelected(id));
        }
        self.captain = Some(id);
        Ok(())
    }

    pub fn clear_captain(&mut self) {
        self.captain = None;
    }

    /// Captain used at commit time: the chosen one, else the first pick.
    pub fn effective_captain(&self) -> Option<AthleteId> {
        self.captain.or_else(|| self.selected.first().copied())
    }

    pub fn budget(&self) -> Price {
        self.budget
    }

    pub fn set_budget(&mut self, budget: Price) {
        self.budget = budget;
    }
}
