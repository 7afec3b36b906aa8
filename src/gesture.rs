//! Gesture state machine that turns pointer events into a committed ROI.
//!
//! Inbound events are queued and processed synchronously in arrival order.
//! The ROI is always held in native frame pixels; display coordinates only
//! exist on the way in (pointer positions) and on the way out (overlay).

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use crate::error::RoiError;
use crate::geometry::{DisplayPoint, DisplayRect, Frame, ImageLayout, NativePoint, Roi, ViewportGeometry};
use crate::layout::VerticalAlign;
use crate::mapper::CoordinateMapper;

/// Rectangles must be strictly larger than this many native pixels on both
/// sides to be committed; smaller releases are treated as accidental taps.
pub const DEFAULT_MIN_ROI_SIZE: u32 = 10;

/// Identifies the pointer (mouse button, touch id) that owns a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointerId(pub u64);

/// Receives the outcome of gestures.
pub trait RoiObserver {
    /// Called exactly once per committed gesture, with native coordinates.
    fn on_roi_selected(&mut self, roi: Roi);
    /// Called for every explicit cancel request.
    fn on_cancelled(&mut self);
}

/// Observer that ignores everything.
impl RoiObserver for () {
    fn on_roi_selected(&mut self, _roi: Roi) {}
    fn on_cancelled(&mut self) {}
}

/// Inbound messages from the hosting surface.
///
/// Binding a frame is not an event: it can fail and is done through
/// [`RoiTool::initialize`].
#[derive(Debug, Clone, PartialEq)]
pub enum RoiEvent {
    ViewportResized(ViewportGeometry),
    ViewportMeasured(ImageLayout),
    PointerDown { pointer: PointerId, position: DisplayPoint },
    PointerMove { pointer: PointerId, position: DisplayPoint },
    /// The position is not used: release freezes the last computed ROI.
    PointerUp { pointer: PointerId, position: DisplayPoint },
    Cancel,
}

impl RoiEvent {
    fn is_pointer(&self) -> bool {
        matches!(
            self,
            RoiEvent::PointerDown { .. } | RoiEvent::PointerMove { .. } | RoiEvent::PointerUp { .. }
        )
    }
}

/// In-flight drag between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSession {
    /// Pointer sequence the session was started in.
    pub sequence: u64,
    pub pointer: PointerId,
    pub anchor: NativePoint,
    pub roi: Roi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Drawing(GestureSession),
    Committed(Roi),
}

/// Visual treatment of the rectangle currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStyle {
    Provisional,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiOverlay {
    pub rect: DisplayRect,
    pub style: OverlayStyle,
}

/// Queued event tagged with the pointer sequence it was issued in.
#[derive(Debug, Clone)]
struct Pending {
    sequence: u64,
    event: RoiEvent,
}

/// ROI drawing tool.
pub struct RoiTool<O> {
    mapper: Option<CoordinateMapper>,
    state: GestureState,
    queue: VecDeque<Pending>,
    /// Advanced by `cancel` and `initialize`; pointer events from an older
    /// sequence are dropped.
    sequence: u64,
    min_size: u32,
    align: VerticalAlign,
    observer: O,
}

impl<O: RoiObserver> RoiTool<O> {
    pub fn new(observer: O) -> Self {
        Self {
            mapper: None,
            state: GestureState::Idle,
            queue: VecDeque::new(),
            sequence: 0,
            min_size: DEFAULT_MIN_ROI_SIZE,
            align: VerticalAlign::Top,
            observer,
        }
    }

    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    /// Vertical placement used for frames bound after this call.
    pub fn with_vertical_align(mut self, align: VerticalAlign) -> Self {
        self.align = align;
        self
    }

    /// Bind a frame and viewport. Any previous gesture or committed ROI
    /// belongs to the old frame and is dropped. On error the tool is left
    /// unbound and ignores pointer input.
    pub fn initialize(&mut self, frame: Frame, viewport: ViewportGeometry) -> Result<(), RoiError> {
        self.state = GestureState::Idle;
        self.queue.clear();
        self.sequence += 1;
        self.mapper = None;
        let mapper = CoordinateMapper::new(frame, viewport, self.align)?;
        debug!(
            width = mapper.frame().native_width(),
            height = mapper.frame().native_height(),
            uri = mapper.frame().image_uri(),
            geometry = ?mapper.geometry(),
            "frame initialized"
        );
        self.mapper = Some(mapper);
        Ok(())
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Mapper of the bound frame.
    pub fn mapper(&self) -> Result<&CoordinateMapper, RoiError> {
        self.mapper.as_ref().ok_or(RoiError::NotInitialized)
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// ROI being dragged right now.
    pub fn in_progress(&self) -> Option<Roi> {
        match self.state {
            GestureState::Drawing(session) => Some(session.roi),
            _ => None,
        }
    }

    pub fn committed(&self) -> Option<Roi> {
        match self.state {
            GestureState::Committed(roi) => Some(roi),
            _ => None,
        }
    }

    /// Queue an event without processing it.
    pub fn enqueue(&mut self, event: RoiEvent) {
        self.queue.push_back(Pending {
            sequence: self.sequence,
            event,
        });
    }

    /// Drain the queue in arrival order.
    pub fn process_pending(&mut self) {
        while let Some(Pending { sequence, event }) = self.queue.pop_front() {
            if event.is_pointer() && sequence != self.sequence {
                trace!(sequence, current = self.sequence, ?event, "late pointer event dropped");
                continue;
            }
            self.apply(event);
        }
    }

    /// Queue `event` and process everything pending.
    pub fn handle(&mut self, event: RoiEvent) {
        self.enqueue(event);
        self.process_pending();
    }

    pub fn pointer_down(&mut self, pointer: PointerId, position: DisplayPoint) {
        self.handle(RoiEvent::PointerDown { pointer, position });
    }

    pub fn pointer_move(&mut self, pointer: PointerId, position: DisplayPoint) {
        self.handle(RoiEvent::PointerMove { pointer, position });
    }

    pub fn pointer_up(&mut self, pointer: PointerId, position: DisplayPoint) {
        self.handle(RoiEvent::PointerUp { pointer, position });
    }

    pub fn viewport_measured(&mut self, layout: ImageLayout) {
        self.handle(RoiEvent::ViewportMeasured(layout));
    }

    pub fn viewport_resized(&mut self, viewport: ViewportGeometry) {
        self.handle(RoiEvent::ViewportResized(viewport));
    }

    /// Cancel right away. Pointer events still queued from before the
    /// call belong to the cancelled sequence and never take effect.
    pub fn cancel(&mut self) {
        self.sequence += 1;
        self.apply(RoiEvent::Cancel);
    }

    fn apply(&mut self, event: RoiEvent) {
        match event {
            RoiEvent::ViewportResized(viewport) => {
                if let Some(mapper) = self.mapper.as_mut() {
                    if let Err(e) = mapper.set_viewport(viewport) {
                        warn!("viewport rejected: {e}");
                    }
                }
            }
            RoiEvent::ViewportMeasured(layout) => {
                if let Some(mapper) = self.mapper.as_mut() {
                    mapper.set_layout(layout);
                }
            }
            RoiEvent::PointerDown { pointer, position } => self.start(pointer, position),
            RoiEvent::PointerMove { pointer, position } => self.drag(pointer, position),
            RoiEvent::PointerUp { pointer, .. } => self.release(pointer),
            RoiEvent::Cancel => {
                debug!(state = ?self.state, "selection cancelled");
                self.state = GestureState::Idle;
                self.observer.on_cancelled();
            }
        }
    }

    /// Session owned by `pointer` in the current sequence.
    fn session_for(&self, pointer: PointerId) -> Option<GestureSession> {
        match self.state {
            GestureState::Drawing(session)
                if session.pointer == pointer && session.sequence == self.sequence =>
            {
                Some(session)
            }
            _ => None,
        }
    }

    fn start(&mut self, pointer: PointerId, position: DisplayPoint) {
        let Some(anchor) = self.mapper.as_ref().and_then(|m| m.to_native(position)) else {
            return;
        };
        if let GestureState::Drawing(previous) = self.state {
            debug!(pointer = ?previous.pointer, "gesture restarted before release");
        }
        self.state = GestureState::Drawing(GestureSession {
            sequence: self.sequence,
            pointer,
            anchor,
            roi: Roi::at(anchor),
        });
        debug!(sequence = self.sequence, ?anchor, "drawing started");
    }

    fn drag(&mut self, pointer: PointerId, position: DisplayPoint) {
        let Some(mut session) = self.session_for(pointer) else {
            trace!(?pointer, "move outside of a gesture ignored");
            return;
        };
        let Some(mapper) = self.mapper.as_ref() else {
            return;
        };
        let Some(current) = mapper.to_native(position) else {
            return;
        };
        session.roi = Roi::spanning(session.anchor, current).clamped_to(mapper.frame());
        self.state = GestureState::Drawing(session);
    }

    /// Freeze the ROI computed by the last move and commit it if it is
    /// large enough.
    fn release(&mut self, pointer: PointerId) {
        let Some(session) = self.session_for(pointer) else {
            trace!(?pointer, "release outside of a gesture ignored");
            return;
        };
        let roi = session.roi;
        if roi.exceeds(self.min_size) {
            info!(
                sequence = session.sequence,
                x = roi.x,
                y = roi.y,
                width = roi.width,
                height = roi.height,
                "roi selected"
            );
            self.state = GestureState::Committed(roi);
            self.observer.on_roi_selected(roi);
        } else {
            debug!(?roi, "selection below minimum size discarded");
            self.state = GestureState::Idle;
        }
    }

    /// Rectangle to paint, in display coordinates.
    pub fn overlay(&self) -> Option<RoiOverlay> {
        let (roi, style) = match self.state {
            GestureState::Idle => return None,
            GestureState::Drawing(session) => (session.roi, OverlayStyle::Provisional),
            GestureState::Committed(roi) => (roi, OverlayStyle::Final),
        };
        let rect = self.mapper.as_ref()?.to_display(&roi)?;
        Some(RoiOverlay { rect, style })
    }

    /// Header text shown above the frame.
    pub fn status_label(&self) -> String {
        match self.committed() {
            Some(roi) => format!("Selected ROI: {}×{} px", roi.width, roi.height),
            None => "Draw a rectangle for ROI".to_string(),
        }
    }
}
