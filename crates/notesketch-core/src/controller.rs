//! Translates pointer input into strokes.

use crate::history::HistoryStack;
use crate::stroke::{Brush, SamplePoint, Stroke};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Platform-independent pointer event, in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        pressure: Option<f64>,
    },
    Move {
        position: Point,
        pressure: Option<f64>,
    },
    Up,
    Cancel,
}

/// What a pointer event did to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerOutcome {
    /// Nothing changed.
    Ignored,
    /// A new stroke was started.
    Started,
    /// A point was appended to the live stroke.
    Extended,
    /// The live stroke was committed to history.
    Committed,
}

impl ControllerOutcome {
    /// Whether the visible surface needs a redraw.
    pub fn needs_redraw(self) -> bool {
        !matches!(self, ControllerOutcome::Ignored)
    }
}

/// Builds the in-progress stroke and hands it to the history on release.
#[derive(Debug, Clone, Default)]
pub struct StrokeController {
    /// Brush applied to strokes started through [`StrokeController::handle_event`].
    pub brush: Brush,
    in_progress: Option<Stroke>,
}

impl StrokeController {
    /// Create a controller with the default brush.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller with a given brush.
    pub fn with_brush(brush: Brush) -> Self {
        Self {
            brush,
            in_progress: None,
        }
    }

    /// The stroke being drawn, if any.
    pub fn in_progress(&self) -> Option<&Stroke> {
        self.in_progress.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.in_progress.is_some()
    }

    /// Dispatch an event, using the controller's brush for new strokes.
    pub fn handle_event(
        &mut self,
        history: &mut HistoryStack,
        event: PointerEvent,
    ) -> ControllerOutcome {
        match event {
            PointerEvent::Down { position, pressure } => {
                let brush = self.brush;
                self.pointer_down(history, position, pressure, brush)
            }
            PointerEvent::Move { position, pressure } => self.pointer_move(position, pressure),
            PointerEvent::Up => self.pointer_up(history),
            PointerEvent::Cancel => self.pointer_cancel(history),
        }
    }

    /// Begin a stroke with a single point.
    ///
    /// Ignored while another stroke is in progress.
    pub fn pointer_down(
        &mut self,
        history: &mut HistoryStack,
        position: Point,
        pressure: Option<f64>,
        brush: Brush,
    ) -> ControllerOutcome {
        if self.in_progress.is_some() || !history.begin_stroke() {
            log::debug!("pointer down ignored: stroke already in progress");
            return ControllerOutcome::Ignored;
        }
        let first = SamplePoint::new(position, pressure);
        self.in_progress = Some(Stroke::begin(brush, first));
        log::trace!("stroke started at ({}, {}) with {:?}", position.x, position.y, brush.tool);
        ControllerOutcome::Started
    }

    /// Append a sample to the live stroke.
    pub fn pointer_move(&mut self, position: Point, pressure: Option<f64>) -> ControllerOutcome {
        match self.in_progress.as_mut() {
            Some(stroke) => {
                stroke.push(SamplePoint::new(position, pressure));
                ControllerOutcome::Extended
            }
            None => ControllerOutcome::Ignored,
        }
    }

    /// Commit the live stroke.
    pub fn pointer_up(&mut self, history: &mut HistoryStack) -> ControllerOutcome {
        let Some(stroke) = self.in_progress.take() else {
            return ControllerOutcome::Ignored;
        };
        let points = stroke.len();
        if history.end_stroke(stroke) {
            log::trace!("stroke committed with {} points", points);
            ControllerOutcome::Committed
        } else {
            ControllerOutcome::Ignored
        }
    }

    /// Cancellation keeps what was drawn: it commits exactly like release.
    pub fn pointer_cancel(&mut self, history: &mut HistoryStack) -> ControllerOutcome {
        self.pointer_up(history)
    }

    /// Drop the live stroke without committing it.
    pub fn discard(&mut self, history: &mut HistoryStack) {
        if self.in_progress.take().is_some() {
            log::debug!("discarding in-progress stroke");
        }
        history.abort_stroke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryState;
    use crate::stroke::{StrokeColor, ToolKind};

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            pressure: None,
        }
    }

    fn move_to(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
            pressure: None,
        }
    }

    #[test]
    fn test_gesture_commits_all_points() {
        let mut history = HistoryStack::new();
        let mut controller = StrokeController::with_brush(Brush::pen(StrokeColor::black(), 4.0));

        assert_eq!(controller.handle_event(&mut history, down(10.0, 10.0)), ControllerOutcome::Started);
        assert_eq!(history.state(), HistoryState::Drawing);
        assert_eq!(controller.handle_event(&mut history, move_to(20.0, 10.0)), ControllerOutcome::Extended);
        assert_eq!(controller.handle_event(&mut history, move_to(20.0, 20.0)), ControllerOutcome::Extended);
        assert_eq!(controller.in_progress().map(Stroke::len), Some(3));
        assert!(history.committed().is_empty());

        assert_eq!(controller.handle_event(&mut history, PointerEvent::Up), ControllerOutcome::Committed);
        assert!(!controller.is_drawing());
        assert_eq!(history.state(), HistoryState::Idle);
        assert_eq!(history.committed().len(), 1);
        assert_eq!(history.committed()[0].len(), 3);
        assert_eq!(history.committed()[0].width, 4.0);
    }

    #[test]
    fn test_tap_commits_single_point() {
        let mut history = HistoryStack::new();
        let mut controller = StrokeController::new();
        controller.handle_event(&mut history, down(5.0, 5.0));
        controller.handle_event(&mut history, PointerEvent::Up);
        assert_eq!(history.committed().len(), 1);
        assert_eq!(history.committed()[0].len(), 1);
    }

    #[test]
    fn test_cancel_commits() {
        let mut history = HistoryStack::new();
        let mut controller = StrokeController::new();
        controller.handle_event(&mut history, down(0.0, 0.0));
        controller.handle_event(&mut history, move_to(3.0, 4.0));
        assert_eq!(
            controller.handle_event(&mut history, PointerEvent::Cancel),
            ControllerOutcome::Committed
        );
        assert_eq!(history.committed().len(), 1);
        assert_eq!(history.committed()[0].len(), 2);
    }

    #[test]
    fn test_idle_events_are_ignored() {
        let mut history = HistoryStack::new();
        let mut controller = StrokeController::new();
        assert_eq!(controller.handle_event(&mut history, move_to(1.0, 1.0)), ControllerOutcome::Ignored);
        assert_eq!(controller.handle_event(&mut history, PointerEvent::Up), ControllerOutcome::Ignored);
        assert_eq!(controller.handle_event(&mut history, PointerEvent::Cancel), ControllerOutcome::Ignored);
        assert!(history.committed().is_empty());
    }

    #[test]
    fn test_second_down_is_ignored() {
        let mut history = HistoryStack::new();
        let mut controller = StrokeController::new();
        controller.handle_event(&mut history, down(0.0, 0.0));
        assert_eq!(controller.handle_event(&mut history, down(50.0, 50.0)), ControllerOutcome::Ignored);
        controller.handle_event(&mut history, PointerEvent::Up);
        let stroke = &history.committed()[0];
        assert_eq!(stroke.len(), 1);
        assert_eq!(stroke.points()[0].x, 0.0);
    }

    #[test]
    fn test_down_clears_redo() {
        let mut history = HistoryStack::new();
        let mut controller = StrokeController::new();
        controller.handle_event(&mut history, down(0.0, 0.0));
        controller.handle_event(&mut history, PointerEvent::Up);
        history.undo();
        assert_eq!(history.redo_buffer().len(), 1);

        controller.handle_event(&mut history, down(1.0, 1.0));
        assert!(history.redo_buffer().is_empty());
    }

    #[test]
    fn test_explicit_brush_and_pressure() {
        let mut history = HistoryStack::new();
        let mut controller = StrokeController::new();
        controller.pointer_down(&mut history, Point::new(0.0, 0.0), Some(0.25), Brush::eraser(12.0));
        controller.pointer_move(Point::new(1.0, 0.0), None);
        controller.pointer_up(&mut history);

        let stroke = &history.committed()[0];
        assert_eq!(stroke.tool, ToolKind::Eraser);
        assert_eq!(stroke.width, 12.0);
        assert_eq!(stroke.points()[0].pressure, 0.25);
        assert_eq!(stroke.points()[1].pressure, 1.0);
    }

    #[test]
    fn test_discard_returns_to_idle() {
        let mut history = HistoryStack::new();
        let mut controller = StrokeController::new();
        controller.handle_event(&mut history, down(0.0, 0.0));
        controller.discard(&mut history);
        assert!(!controller.is_drawing());
        assert_eq!(history.state(), HistoryState::Idle);
        assert!(history.committed().is_empty());
    }
}
