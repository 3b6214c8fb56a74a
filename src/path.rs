// The drag path and the callbacks that grow it.
// Visual: every mouse move while dragging adds one straight segment to the scratch.

use crate::types::Point;
use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point), // starts a new subpath (one per drag)
    LineTo(Point), // extends the current subpath
}

/// Append-only list of drawing commands. Never shrinks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokePath {
    commands: Vec<PathCommand>,
}

impl StrokePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) {
        self.commands.push(PathCommand::MoveTo(p));
    }

    pub fn line_to(&mut self, p: Point) {
        self.commands.push(PathCommand::LineTo(p));
    }

    #[cfg(test)]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Build a tiny-skia path. None when there is nothing strokeable.
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut pb = tiny_skia::PathBuilder::with_capacity(self.commands.len(), self.commands.len());
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => pb.move_to(p.x, p.y),
                PathCommand::LineTo(p) => pb.line_to(p.x, p.y),
            }
        }
        pb.finish()
    }
}

/// Something that can be asked to paint again.
pub trait Redraw {
    fn redraw(&self);
}

/// The window loop's redraw target: a dirty bit it takes once per frame.
#[derive(Default)]
pub struct RedrawFlag {
    dirty: Cell<bool>,
}

impl RedrawFlag {
    pub fn take(&self) -> bool {
        self.dirty.replace(false)
    }
}

impl Redraw for RedrawFlag {
    fn redraw(&self) {
        self.dirty.set(true);
    }
}

/// Owns the path for one mounted drawing surface.
/// Dropping the store is the unmount: outstanding handlers go inert.
pub struct StrokePathStore {
    path: Rc<RefCell<StrokePath>>,
    redraw: Rc<dyn Redraw>,
}

impl StrokePathStore {
    pub fn new(redraw: Rc<dyn Redraw>) -> Self {
        Self { path: Rc::new(RefCell::new(StrokePath::new())), redraw }
    }

    /// The single writer. Holds only weak references.
    pub fn handler(&self) -> GestureHandler {
        GestureHandler {
            path: Rc::downgrade(&self.path),
            redraw: Rc::downgrade(&self.redraw),
        }
    }

    /// Latest path for the renderer.
    pub fn snapshot(&self) -> Ref<'_, StrokePath> {
        self.path.borrow()
    }

    #[cfg(test)]
    pub(crate) fn downgrade(&self) -> Weak<RefCell<StrokePath>> {
        Rc::downgrade(&self.path)
    }
}

/// Gesture callbacks bound to one store.
/// Each call mutates the path, then requests exactly one redraw.
#[derive(Clone)]
pub struct GestureHandler {
    path: Weak<RefCell<StrokePath>>,
    redraw: Weak<dyn Redraw>,
}

impl GestureHandler {
    pub fn on_start(&self, p: Point) {
        self.apply(|path| path.move_to(p));
    }

    pub fn on_update(&self, p: Point) {
        self.apply(|path| path.line_to(p));
    }

    pub fn dispatch(&self, event: crate::gesture::GestureEvent) {
        match event {
            crate::gesture::GestureEvent::Start(p) => self.on_start(p),
            crate::gesture::GestureEvent::Update(p) => self.on_update(p),
        }
    }

    fn apply(&self, mutate: impl FnOnce(&mut StrokePath)) {
        // Unmounted: nothing to touch.
        let (Some(path), Some(redraw)) = (self.path.upgrade(), self.redraw.upgrade()) else {
            return;
        };
        mutate(&mut path.borrow_mut());
        redraw.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureEvent;

    /// Records the path length seen at each redraw, and whether the path was still borrowed.
    #[derive(Default)]
    struct Recorder {
        path: RefCell<Weak<RefCell<StrokePath>>>,
        seen: RefCell<Vec<Option<usize>>>,
    }

    impl Redraw for Recorder {
        fn redraw(&self) {
            let len = self
                .path
                .borrow()
                .upgrade()
                .and_then(|p| p.try_borrow().ok().map(|p| p.len()));
            self.seen.borrow_mut().push(len);
        }
    }

    fn recorded_store() -> (StrokePathStore, Rc<Recorder>) {
        let rec = Rc::new(Recorder::default());
        let store = StrokePathStore::new(rec.clone());
        *rec.path.borrow_mut() = store.downgrade();
        (store, rec)
    }

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_start_then_updates_builds_one_subpath() {
        let (store, _rec) = recorded_store();
        let h = store.handler();
        h.on_start(p(1.0, 1.0));
        h.on_update(p(2.0, 3.0));
        h.on_update(p(4.0, 5.0));
        assert_eq!(
            store.snapshot().commands(),
            &[
                PathCommand::MoveTo(p(1.0, 1.0)),
                PathCommand::LineTo(p(2.0, 3.0)),
                PathCommand::LineTo(p(4.0, 5.0)),
            ]
        );
    }

    #[test]
    fn test_second_drag_appends_new_subpath() {
        let (store, _rec) = recorded_store();
        let h = store.handler();
        h.dispatch(GestureEvent::Start(p(0.0, 0.0)));
        h.dispatch(GestureEvent::Update(p(5.0, 0.0)));
        h.dispatch(GestureEvent::Start(p(9.0, 9.0)));
        let snap = store.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.commands()[0], PathCommand::MoveTo(p(0.0, 0.0)));
        assert_eq!(snap.commands()[2], PathCommand::MoveTo(p(9.0, 9.0)));
    }

    #[test]
    fn test_every_update_is_kept_even_when_tiny() {
        let (store, _rec) = recorded_store();
        let h = store.handler();
        h.on_start(p(0.0, 0.0));
        for _ in 0..10 {
            h.on_update(p(0.0, 0.0));
        }
        assert_eq!(store.snapshot().len(), 11);
    }

    #[test]
    fn test_one_redraw_per_callback_after_mutation() {
        let (store, rec) = recorded_store();
        let h = store.handler();
        h.on_start(p(0.0, 0.0));
        h.on_update(p(1.0, 0.0));
        h.on_update(p(2.0, 0.0));
        // Some(n): the path was readable (mutation finished) and had n commands.
        assert_eq!(*rec.seen.borrow(), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_callbacks_after_unmount_are_noops() {
        let (store, rec) = recorded_store();
        let h = store.handler();
        h.on_start(p(0.0, 0.0));
        let weak = store.downgrade();
        drop(store);
        h.on_update(p(3.0, 3.0));
        h.on_start(p(4.0, 4.0));
        assert!(weak.upgrade().is_none());
        assert_eq!(rec.seen.borrow().len(), 1);
    }

    #[test]
    fn test_redraw_flag_is_taken_once() {
        let flag = Rc::new(RedrawFlag::default());
        let store = StrokePathStore::new(flag.clone());
        store.handler().on_start(p(1.0, 1.0));
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_to_skia_needs_a_segment() {
        let mut path = StrokePath::new();
        assert!(path.to_skia().is_none());
        path.move_to(p(1.0, 1.0));
        path.line_to(p(10.0, 1.0));
        assert!(path.to_skia().is_some());
    }
}
