//! Committed strokes and undo/redo transitions.

use crate::stroke::Stroke;

/// Whether a gesture is currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryState {
    /// No gesture; undo, redo and clear are allowed.
    #[default]
    Idle,
    /// A stroke is being drawn and has not been committed yet.
    Drawing,
}

/// Ordered committed strokes plus the redo buffer.
///
/// Redo is single-branch: committing, or beginning a new stroke, drops
/// every undone stroke.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    committed: Vec<Stroke>,
    redo_buffer: Vec<Stroke>,
    state: HistoryState,
}

impl HistoryStack {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HistoryState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == HistoryState::Drawing
    }

    /// Strokes in commit order.
    pub fn committed(&self) -> &[Stroke] {
        &self.committed
    }

    /// Undone strokes; the last element is the next one to redo.
    pub fn redo_buffer(&self) -> &[Stroke] {
        &self.redo_buffer
    }

    pub fn can_undo(&self) -> bool {
        self.state == HistoryState::Idle && !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.state == HistoryState::Idle && !self.redo_buffer.is_empty()
    }

    /// Enter the drawing state for a fresh gesture.
    ///
    /// Returns false if a gesture is already in progress.
    pub fn begin_stroke(&mut self) -> bool {
        if self.is_drawing() {
            log::debug!("begin_stroke ignored: already drawing");
            return false;
        }
        self.state = HistoryState::Drawing;
        self.redo_buffer.clear();
        true
    }

    /// Commit the stroke of the gesture in progress and return to idle.
    ///
    /// Returns false if no gesture was in progress.
    pub fn end_stroke(&mut self, stroke: Stroke) -> bool {
        if !self.is_drawing() {
            log::debug!("end_stroke ignored: not drawing");
            return false;
        }
        self.state = HistoryState::Idle;
        self.commit(stroke)
    }

    /// Leave the drawing state without committing anything.
    pub fn abort_stroke(&mut self) {
        self.state = HistoryState::Idle;
    }

    /// Append a finished stroke and drop the redo buffer.
    ///
    /// Ignored while a gesture is in progress; that gesture lands through
    /// [`HistoryStack::end_stroke`].
    pub fn commit(&mut self, stroke: Stroke) -> bool {
        if self.is_drawing() {
            log::debug!("commit ignored: stroke in progress");
            return false;
        }
        self.committed.push(stroke);
        self.redo_buffer.clear();
        log::trace!("committed stroke #{}", self.committed.len());
        true
    }

    /// Move the last committed stroke onto the redo buffer.
    ///
    /// Returns the remaining strokes, or `None` if nothing changed.
    pub fn undo(&mut self) -> Option<&[Stroke]> {
        if self.is_drawing() {
            return None;
        }
        let stroke = self.committed.pop()?;
        self.redo_buffer.push(stroke);
        Some(&self.committed)
    }

    /// Move the most recently undone stroke back onto the committed list.
    ///
    /// Returns the resulting strokes, or `None` if nothing changed.
    pub fn redo(&mut self) -> Option<&[Stroke]> {
        if self.is_drawing() {
            return None;
        }
        let stroke = self.redo_buffer.pop()?;
        self.committed.push(stroke);
        Some(&self.committed)
    }

    /// Empty both stacks. Ignored mid-stroke.
    pub fn clear(&mut self) -> bool {
        if self.is_drawing() {
            log::debug!("clear ignored: stroke in progress");
            return false;
        }
        self.committed.clear();
        self.redo_buffer.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{Brush, SamplePoint, StrokeColor};
    use kurbo::Point;

    fn stroke_at(x: f64) -> Stroke {
        Stroke::begin(
            Brush::pen(StrokeColor::black(), 2.0),
            SamplePoint::new(Point::new(x, x), None),
        )
    }

    #[test]
    fn test_commit_appends() {
        let mut history = HistoryStack::new();
        assert!(history.commit(stroke_at(1.0)));
        assert!(history.commit(stroke_at(2.0)));
        assert_eq!(history.committed().len(), 2);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_then_redo_restores() {
        let mut history = HistoryStack::new();
        history.commit(stroke_at(1.0));
        history.commit(stroke_at(2.0));
        let before = history.committed().to_vec();

        assert_eq!(history.undo().map(|s| s.len()), Some(1));
        assert_eq!(history.redo_buffer().len(), 1);
        assert_eq!(history.redo().map(|s| s.len()), Some(2));
        assert_eq!(history.committed(), before.as_slice());
        assert!(history.redo_buffer().is_empty());
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut history = HistoryStack::new();
        history.commit(stroke_at(1.0));
        history.commit(stroke_at(2.0));
        history.undo();
        history.undo();
        assert_eq!(history.redo_buffer().len(), 2);

        history.commit(stroke_at(3.0));
        assert!(history.redo_buffer().is_empty());
        assert_eq!(history.committed().len(), 1);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = HistoryStack::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.committed().is_empty());
    }

    #[test]
    fn test_drawing_blocks_undo_redo_clear() {
        let mut history = HistoryStack::new();
        history.commit(stroke_at(1.0));
        history.commit(stroke_at(2.0));
        history.undo();

        assert!(history.begin_stroke());
        assert_eq!(history.state(), HistoryState::Drawing);
        // Beginning a gesture invalidates stale redo state.
        assert!(history.redo_buffer().is_empty());

        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(!history.clear());
        assert!(!history.commit(stroke_at(9.0)));
        assert_eq!(history.committed().len(), 1);

        assert!(history.end_stroke(stroke_at(3.0)));
        assert_eq!(history.state(), HistoryState::Idle);
        assert_eq!(history.committed().len(), 2);
    }

    #[test]
    fn test_end_stroke_requires_drawing() {
        let mut history = HistoryStack::new();
        assert!(!history.end_stroke(stroke_at(1.0)));
        assert!(history.committed().is_empty());
        assert!(history.begin_stroke());
        assert!(!history.begin_stroke());
    }

    #[test]
    fn test_abort_stroke_commits_nothing() {
        let mut history = HistoryStack::new();
        history.begin_stroke();
        history.abort_stroke();
        assert_eq!(history.state(), HistoryState::Idle);
        assert!(history.committed().is_empty());
    }

    #[test]
    fn test_clear_empties_both() {
        let mut history = HistoryStack::new();
        history.commit(stroke_at(1.0));
        history.commit(stroke_at(2.0));
        history.undo();
        assert!(history.clear());
        assert!(history.committed().is_empty());
        assert!(history.redo_buffer().is_empty());
    }
}
