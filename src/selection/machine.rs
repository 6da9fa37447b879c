use super::Difficulty;
use crate::geometry::SelectionArea;

/// Gesture phases. `Idle` means no classification has ever been chosen;
/// only `Armed` can start a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Armed,
    Selecting,
}

/// Where a pointer-down landed inside the overlay. Presses on child
/// controls (close button, classification picker) never start gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    Control,
}

/// A finished drag together with the classification that was active when
/// the gesture was initiated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedGesture {
    pub area: SelectionArea,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: SelectionPhase,
    pub to: SelectionPhase,
}

#[derive(Debug)]
pub struct SelectionMachine {
    phase: SelectionPhase,
    difficulty: Option<Difficulty>,
    selection: Option<SelectionArea>,
    gesture_difficulty: Option<Difficulty>,
    pointer_captured: bool,
    chooser_minimized: bool,
    transition_history: Vec<PhaseTransition>,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self {
            phase: SelectionPhase::Idle,
            difficulty: None,
            selection: None,
            gesture_difficulty: None,
            pointer_captured: false,
            chooser_minimized: false,
            transition_history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn selection(&self) -> Option<SelectionArea> {
        self.selection
    }

    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    /// Whether the full-screen classification chooser has condensed into
    /// the status bar. Presentation state only; never gates input.
    pub fn chooser_minimized(&self) -> bool {
        self.chooser_minimized
    }

    /// Chooses the active classification. Arms the machine on the first
    /// choice; re-choosing while armed or mid-gesture updates the active
    /// classification without touching gesture state. Returns true when
    /// this was the first choice ever made.
    pub fn choose_difficulty(&mut self, difficulty: Difficulty) -> bool {
        let first = self.difficulty.is_none();
        self.difficulty = Some(difficulty);
        if first {
            self.chooser_minimized = true;
        }
        if self.phase == SelectionPhase::Idle {
            self.set_phase(SelectionPhase::Armed);
        }
        first
    }

    /// Starts a gesture at the press point. Rejected (silently) while no
    /// classification has ever been chosen, when the press landed on a
    /// child control, or when a gesture is already running.
    pub fn pointer_down(&mut self, target: PointerTarget, x: f64, y: f64) -> bool {
        if target != PointerTarget::Background {
            return false;
        }
        let Some(difficulty) = self.difficulty else {
            tracing::debug!("pointer-down ignored: no classification chosen");
            return false;
        };
        if self.phase == SelectionPhase::Selecting {
            return false;
        }

        self.selection = Some(SelectionArea::begin(x, y));
        self.gesture_difficulty = Some(difficulty);
        self.pointer_captured = true;
        self.set_phase(SelectionPhase::Selecting);
        true
    }

    /// Last-value-wins update of the trailing corner. Ignored outside an
    /// active gesture.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if self.phase != SelectionPhase::Selecting {
            return;
        }
        if let Some(area) = self.selection.as_mut() {
            area.extend(x, y);
        }
    }

    /// Completes the gesture: releases pointer capture, clears the stored
    /// rectangle, and returns it with its initiation-time classification.
    /// The caller judges whether the rectangle is large enough to crop.
    pub fn pointer_up(&mut self) -> Option<CompletedGesture> {
        if self.phase != SelectionPhase::Selecting {
            return None;
        }
        self.pointer_captured = false;
        self.set_phase(SelectionPhase::Armed);
        let area = self.selection.take()?;
        let difficulty = self.gesture_difficulty.take()?;
        Some(CompletedGesture { area, difficulty })
    }

    /// Escape path: abandons any capture and clears the selection. The
    /// classification survives, so the machine lands in `Armed` once a
    /// classification has ever been chosen.
    pub fn cancel(&mut self) {
        self.selection = None;
        self.gesture_difficulty = None;
        self.pointer_captured = false;
        let next = if self.difficulty.is_some() {
            SelectionPhase::Armed
        } else {
            SelectionPhase::Idle
        };
        if self.phase != next {
            self.set_phase(next);
        }
    }

    fn set_phase(&mut self, next: SelectionPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "selection phase transition");
        self.transition_history.push(PhaseTransition {
            from: self.phase,
            to: next,
        });
        self.phase = next;
    }
}

impl Default for SelectionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl SelectionMachine {
    fn history(&self) -> &[PhaseTransition] {
        &self.transition_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_down_is_rejected_while_idle() {
        let mut machine = SelectionMachine::new();
        assert!(!machine.pointer_down(PointerTarget::Background, 10.0, 10.0));
        assert_eq!(machine.phase(), SelectionPhase::Idle);
        assert_eq!(machine.selection(), None);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn pointer_down_on_child_control_never_starts_a_gesture() {
        let mut machine = SelectionMachine::new();
        machine.choose_difficulty(Difficulty::Medium);
        assert!(!machine.pointer_down(PointerTarget::Control, 10.0, 10.0));
        assert_eq!(machine.phase(), SelectionPhase::Armed);
        assert_eq!(machine.selection(), None);
    }

    #[test]
    fn first_classification_arms_and_minimizes_chooser() {
        let mut machine = SelectionMachine::new();
        assert!(!machine.chooser_minimized());
        assert!(machine.choose_difficulty(Difficulty::Hard));
        assert!(machine.chooser_minimized());
        assert_eq!(machine.phase(), SelectionPhase::Armed);
        // A second choice is not "first" and does not reset anything.
        assert!(!machine.choose_difficulty(Difficulty::Easy));
        assert_eq!(machine.difficulty(), Some(Difficulty::Easy));
    }

    #[test]
    fn gesture_tracks_trailing_corner_with_fixed_anchor() {
        let mut machine = SelectionMachine::new();
        machine.choose_difficulty(Difficulty::Easy);
        assert!(machine.pointer_down(PointerTarget::Background, 100.0, 100.0));
        assert!(machine.pointer_captured());

        machine.pointer_move(140.0, 90.0);
        machine.pointer_move(200.0, 200.0);
        let area = machine.selection().expect("gesture should be tracked");
        assert_eq!((area.start_x, area.start_y), (100.0, 100.0));
        assert_eq!((area.end_x, area.end_y), (200.0, 200.0));
    }

    #[test]
    fn pointer_up_returns_gesture_and_clears_state() {
        let mut machine = SelectionMachine::new();
        machine.choose_difficulty(Difficulty::Hard);
        machine.pointer_down(PointerTarget::Background, 10.0, 20.0);
        machine.pointer_move(110.0, 220.0);

        let gesture = machine.pointer_up().expect("gesture should complete");
        assert_eq!(gesture.difficulty, Difficulty::Hard);
        assert_eq!((gesture.area.end_x, gesture.area.end_y), (110.0, 220.0));
        assert_eq!(machine.phase(), SelectionPhase::Armed);
        assert_eq!(machine.selection(), None);
        assert!(!machine.pointer_captured());
        // A stray second up is ignored.
        assert_eq!(machine.pointer_up(), None);
    }

    #[test]
    fn reclassifying_mid_gesture_keeps_the_initiation_tag() {
        let mut machine = SelectionMachine::new();
        machine.choose_difficulty(Difficulty::Easy);
        machine.pointer_down(PointerTarget::Background, 0.0, 0.0);
        machine.pointer_move(50.0, 50.0);
        machine.choose_difficulty(Difficulty::Expert);
        assert_eq!(machine.phase(), SelectionPhase::Selecting);

        let gesture = machine.pointer_up().expect("gesture should complete");
        assert_eq!(gesture.difficulty, Difficulty::Easy);
        // The next gesture picks up the new classification.
        machine.pointer_down(PointerTarget::Background, 0.0, 0.0);
        let gesture = machine.pointer_up().expect("gesture should complete");
        assert_eq!(gesture.difficulty, Difficulty::Expert);
    }

    #[test]
    fn cancel_clears_selection_but_keeps_classification() {
        let mut machine = SelectionMachine::new();
        machine.choose_difficulty(Difficulty::Medium);
        machine.pointer_down(PointerTarget::Background, 5.0, 5.0);
        machine.pointer_move(80.0, 80.0);

        machine.cancel();
        assert_eq!(machine.phase(), SelectionPhase::Armed);
        assert_eq!(machine.selection(), None);
        assert!(!machine.pointer_captured());
        assert_eq!(machine.difficulty(), Some(Difficulty::Medium));
        // Pointer-up after cancel has nothing to complete.
        assert_eq!(machine.pointer_up(), None);
    }

    #[test]
    fn cancel_while_idle_stays_idle() {
        let mut machine = SelectionMachine::new();
        machine.cancel();
        assert_eq!(machine.phase(), SelectionPhase::Idle);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn transitions_are_recorded_in_order() {
        let mut machine = SelectionMachine::new();
        machine.choose_difficulty(Difficulty::Easy);
        machine.pointer_down(PointerTarget::Background, 0.0, 0.0);
        let _ = machine.pointer_up();

        assert_eq!(
            machine.history(),
            &[
                PhaseTransition {
                    from: SelectionPhase::Idle,
                    to: SelectionPhase::Armed,
                },
                PhaseTransition {
                    from: SelectionPhase::Armed,
                    to: SelectionPhase::Selecting,
                },
                PhaseTransition {
                    from: SelectionPhase::Selecting,
                    to: SelectionPhase::Armed,
                },
            ]
        );
    }
}
