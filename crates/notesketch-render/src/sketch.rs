//! Sketch pad: the drawing surface attached to one note.
//!
//! Owns the history, the input controller and the raster surface, and is
//! the only thing the host note editor talks to. Every mutation redraws
//! synchronously and then notifies the host listener with the new snapshot.

use crate::codec;
use crate::surface::RasterSurface;
use kurbo::Point;
use notesketch_core::{
    Brush, ControllerOutcome, HistoryStack, PointerEvent, SketchConfig, Snapshot, Stroke,
    StrokeController, SurfaceConfig,
};

/// Host callback receiving the sketch's snapshot after each change.
pub type SnapshotListener = Box<dyn FnMut(Option<&Snapshot>)>;

/// Drawing surface with undo/redo and snapshot exchange.
pub struct SketchPad {
    history: HistoryStack,
    controller: StrokeController,
    surface: RasterSurface,
    listener: Option<SnapshotListener>,
}

impl SketchPad {
    /// Mount a blank sketch.
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            history: HistoryStack::new(),
            controller: StrokeController::new(),
            surface: RasterSurface::new(config),
            listener: None,
        }
    }

    /// Mount a blank sketch from host settings.
    pub fn from_config(config: &SketchConfig) -> Self {
        Self {
            history: HistoryStack::new(),
            controller: StrokeController::with_brush(config.brush),
            surface: RasterSurface::new(config.surface)
                .with_pressure_sensitivity(config.pressure_sensitive),
            listener: None,
        }
    }

    /// Register the host callback, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl FnMut(Option<&Snapshot>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Strokes committed since mount or the last clear/load.
    pub fn committed(&self) -> &[Stroke] {
        self.history.committed()
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.controller.in_progress()
    }

    pub fn is_drawing(&self) -> bool {
        self.controller.is_drawing()
    }

    pub fn brush(&self) -> Brush {
        self.controller.brush
    }

    /// Brush for the next stroke. The stroke in progress keeps its own.
    pub fn set_brush(&mut self, brush: Brush) {
        self.controller.brush = brush;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Dispatch a pointer event.
    pub fn handle_event(&mut self, event: PointerEvent) -> ControllerOutcome {
        let outcome = self.controller.handle_event(&mut self.history, event);
        self.settle(outcome);
        outcome
    }

    /// Begin a stroke with the active brush.
    pub fn pointer_down(&mut self, position: Point, pressure: Option<f64>) -> ControllerOutcome {
        self.handle_event(PointerEvent::Down { position, pressure })
    }

    /// Begin a stroke with an explicit brush.
    pub fn pointer_down_with(
        &mut self,
        position: Point,
        pressure: Option<f64>,
        brush: Brush,
    ) -> ControllerOutcome {
        let outcome = self
            .controller
            .pointer_down(&mut self.history, position, pressure, brush);
        self.settle(outcome);
        outcome
    }

    pub fn pointer_move(&mut self, position: Point, pressure: Option<f64>) -> ControllerOutcome {
        self.handle_event(PointerEvent::Move { position, pressure })
    }

    pub fn pointer_up(&mut self) -> ControllerOutcome {
        self.handle_event(PointerEvent::Up)
    }

    /// Commits the stroke in progress, like [`SketchPad::pointer_up`].
    pub fn pointer_cancel(&mut self) -> ControllerOutcome {
        self.handle_event(PointerEvent::Cancel)
    }

    /// Undo the last stroke. Returns false if nothing changed.
    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        self.redraw();
        self.notify();
        true
    }

    /// Redo the last undone stroke. Returns false if nothing changed.
    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        self.redraw();
        self.notify();
        true
    }

    /// Follow a viewport size or pixel-density change.
    ///
    /// A stroke in progress keeps drawing: its points are logical units.
    pub fn resize(&mut self, config: SurfaceConfig) {
        self.surface.resize(config);
        self.redraw();
    }

    /// Current encoded sketch, or `None` if nothing is committed.
    pub fn get_snapshot(&self) -> Option<Snapshot> {
        match codec::encode(&self.surface, self.history.committed()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Failed to encode snapshot: {}", e);
                None
            }
        }
    }

    /// Replace the visible content.
    ///
    /// `None` blanks the sketch. A snapshot is drawn as a raster backdrop and
    /// stroke history restarts empty; vector history is not recovered from
    /// pixels. A snapshot that fails to decode is ignored and the sketch is
    /// left as it was.
    pub fn load_snapshot(&mut self, snapshot: Option<&Snapshot>) {
        let backdrop = match snapshot {
            Some(snapshot) => match codec::decode_image(snapshot) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("Ignoring undecodable snapshot: {}", e);
                    return;
                }
            },
            None => None,
        };

        self.reset();
        self.surface.set_backdrop(backdrop);
        self.redraw();
    }

    /// Erase everything and tell the host there is no sketch anymore.
    pub fn clear(&mut self) {
        self.reset();
        self.surface.set_backdrop(None);
        self.surface.clear();
        self.notify();
    }

    /// Drop the gesture in progress and both history stacks.
    fn reset(&mut self) {
        self.controller.discard(&mut self.history);
        self.history.clear();
    }

    fn settle(&mut self, outcome: ControllerOutcome) {
        if outcome.needs_redraw() {
            self.redraw();
        }
        if outcome == ControllerOutcome::Committed {
            self.notify();
        }
    }

    /// Redraw committed strokes plus the live preview.
    fn redraw(&mut self) {
        let live = self.controller.in_progress();
        self.surface
            .redraw_all(self.history.committed().iter().chain(live));
    }

    fn notify(&mut self) {
        if self.listener.is_none() {
            return;
        }
        let snapshot = self.get_snapshot();
        if let Some(listener) = self.listener.as_mut() {
            listener(snapshot.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notesketch_core::{HistoryState, StrokeColor, ToolKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pad() -> SketchPad {
        SketchPad::new(SurfaceConfig::new(1.0, 40.0, 40.0).unwrap())
    }

    fn draw_line(pad: &mut SketchPad, from: (f64, f64), to: (f64, f64)) {
        pad.pointer_down(Point::new(from.0, from.1), None);
        pad.pointer_move(Point::new(to.0, to.1), None);
        pad.pointer_up();
    }

    fn recorder(pad: &mut SketchPad) -> Rc<RefCell<Vec<Option<Snapshot>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        pad.set_listener(move |snapshot| sink.borrow_mut().push(snapshot.cloned()));
        log
    }

    #[test]
    fn test_live_preview_redraws_in_progress_stroke() {
        let mut pad = pad();
        pad.pointer_down(Point::new(5.0, 20.0), None);
        pad.pointer_move(Point::new(30.0, 20.0), None);
        assert!(pad.is_drawing());
        assert!(pad.committed().is_empty());
        assert_eq!(pad.surface().pixel(20, 20).map(|p| p[3]), Some(255));
        assert!(pad.get_snapshot().is_none());
    }

    #[test]
    fn test_listener_notified_on_commit_undo_redo_clear() {
        let mut pad = pad();
        let log = recorder(&mut pad);

        draw_line(&mut pad, (5.0, 5.0), (30.0, 30.0));
        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].is_some());

        pad.undo();
        pad.redo();
        pad.clear();
        let log = log.borrow();
        assert_eq!(log.len(), 4);
        assert!(log[1].is_none());
        assert!(log[2].is_some());
        assert!(log[3].is_none());
    }

    #[test]
    fn test_moves_do_not_notify() {
        let mut pad = pad();
        let log = recorder(&mut pad);
        pad.pointer_down(Point::new(1.0, 1.0), None);
        pad.pointer_move(Point::new(2.0, 2.0), None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_undo_redo_noops_when_unavailable() {
        let mut pad = pad();
        let log = recorder(&mut pad);
        assert!(!pad.undo());
        assert!(!pad.redo());

        pad.pointer_down(Point::new(1.0, 1.0), None);
        assert!(!pad.undo());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_undo_mid_stroke_keeps_history() {
        let mut pad = pad();
        draw_line(&mut pad, (5.0, 5.0), (10.0, 5.0));
        pad.pointer_down(Point::new(20.0, 20.0), None);
        assert!(!pad.undo());
        assert_eq!(pad.committed().len(), 1);
        pad.pointer_up();
        assert_eq!(pad.committed().len(), 2);
    }

    #[test]
    fn test_brush_applies_to_next_stroke() {
        let mut pad = pad();
        pad.set_brush(Brush::new(ToolKind::Pen, StrokeColor::new(0, 128, 0), 6.0));
        draw_line(&mut pad, (5.0, 5.0), (10.0, 5.0));
        pad.pointer_down_with(Point::new(1.0, 1.0), None, Brush::eraser(2.0));
        pad.pointer_up();

        assert_eq!(pad.committed()[0].color, StrokeColor::new(0, 128, 0));
        assert_eq!(pad.committed()[0].width, 6.0);
        assert_eq!(pad.committed()[1].tool, ToolKind::Eraser);
        assert_eq!(pad.brush().width, 6.0);
    }

    #[test]
    fn test_resize_redraws_committed_and_live() {
        let mut pad = pad();
        draw_line(&mut pad, (5.0, 5.0), (35.0, 5.0));
        pad.pointer_down(Point::new(5.0, 30.0), None);
        pad.pointer_move(Point::new(35.0, 30.0), None);

        pad.resize(SurfaceConfig::new(2.0, 40.0, 40.0).unwrap());
        assert_eq!(pad.surface().width(), 80);
        assert_eq!(pad.surface().pixel(40, 10).map(|p| p[3]), Some(255));
        assert_eq!(pad.surface().pixel(40, 60).map(|p| p[3]), Some(255));

        pad.pointer_move(Point::new(35.0, 35.0), None);
        pad.pointer_up();
        assert_eq!(pad.committed().len(), 2);
        assert_eq!(pad.committed()[1].len(), 3);
    }

    #[test]
    fn test_clear_mid_stroke_discards_gesture() {
        let mut pad = pad();
        draw_line(&mut pad, (5.0, 5.0), (30.0, 5.0));
        pad.pointer_down(Point::new(10.0, 10.0), None);
        pad.clear();

        assert!(!pad.is_drawing());
        assert_eq!(pad.history().state(), HistoryState::Idle);
        assert!(pad.committed().is_empty());
        assert!(pad.surface().is_blank());
        // The released pointer no longer commits anything.
        assert_eq!(pad.pointer_up(), ControllerOutcome::Ignored);
        assert!(pad.committed().is_empty());
    }

    #[test]
    fn test_bad_snapshot_keeps_current_sketch() {
        let mut pad = pad();
        draw_line(&mut pad, (5.0, 5.0), (30.0, 5.0));
        let before = pad.surface().pixels().clone();

        pad.load_snapshot(Some(&Snapshot::new("data:image/png;base64,garbage")));
        assert_eq!(pad.committed().len(), 1);
        assert_eq!(pad.surface().pixels().as_raw(), before.as_raw());
    }

    #[test]
    fn test_undo_after_load_reports_no_strokes_but_keeps_backdrop() {
        let mut source = pad();
        draw_line(&mut source, (5.0, 5.0), (35.0, 5.0));
        let snapshot = source.get_snapshot().unwrap();

        let mut pad = pad();
        let log = recorder(&mut pad);
        pad.load_snapshot(Some(&snapshot));
        assert!(log.borrow().is_empty());

        draw_line(&mut pad, (5.0, 30.0), (35.0, 30.0));
        pad.undo();
        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert!(log[1].is_none());
        assert!(pad.surface().has_backdrop());
        assert_eq!(pad.surface().pixel(20, 5).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_strokes_draw_over_loaded_backdrop() {
        let mut source = pad();
        draw_line(&mut source, (5.0, 5.0), (35.0, 5.0));
        let snapshot = source.get_snapshot().unwrap();

        let mut pad = pad();
        pad.load_snapshot(Some(&snapshot));
        assert!(pad.committed().is_empty());
        assert!(pad.get_snapshot().is_none());

        draw_line(&mut pad, (5.0, 30.0), (35.0, 30.0));
        assert_eq!(pad.surface().pixel(20, 5).map(|p| p[3]), Some(255));
        assert_eq!(pad.surface().pixel(20, 30).map(|p| p[3]), Some(255));
        assert!(pad.get_snapshot().is_some());

        // Undoing the new stroke leaves the backdrop in place.
        pad.undo();
        assert_eq!(pad.surface().pixel(20, 5).map(|p| p[3]), Some(255));
        assert_eq!(pad.surface().pixel(20, 30).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_from_config_uses_brush_and_pressure() {
        let config = SketchConfig {
            brush: Brush::pen(StrokeColor::new(0, 0, 255), 8.0),
            surface: SurfaceConfig::new(1.0, 20.0, 20.0).unwrap(),
            pressure_sensitive: true,
        };
        let mut pad = SketchPad::from_config(&config);
        pad.pointer_down(Point::new(2.0, 10.0), Some(0.25));
        pad.pointer_move(Point::new(18.0, 10.0), Some(0.25));
        pad.pointer_up();

        assert_eq!(pad.committed()[0].color, StrokeColor::new(0, 0, 255));
        assert_eq!(pad.surface().pixel(10, 10), Some([0, 0, 255, 255]));
        assert_eq!(pad.surface().pixel(10, 13).map(|p| p[3]), Some(0));
    }
}
