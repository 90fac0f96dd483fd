//! Floating surface placement.
//!
//! A popover is anchored to a trigger element: it sits on the preferred side
//! of the anchor, flips to the other side when it does not fit, stays inside
//! the viewport, and closes when the user interacts anywhere else.

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// A viewport without bounds; nothing ever overflows it.
    pub const UNBOUNDED: Size = Size {
        width: f64::INFINITY,
        height: f64::INFINITY,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

/// Side of the anchor the surface is placed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Bottom,
    Top,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Side::Bottom => Side::Top,
            Side::Top => Side::Bottom,
        }
    }
}

/// Placement options for the dropdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopperOptions {
    /// Preferred side
    pub placement: Side,

    /// Gap between anchor and surface
    pub offset: f64,

    /// Minimum distance to the viewport edges
    pub padding: f64,

    /// Minimum distance between the arrow and the surface corners
    pub arrow_padding: f64,
}

impl Default for PopperOptions {
    fn default() -> Self {
        Self {
            placement: Side::Bottom,
            offset: 10.0,
            padding: 10.0,
            arrow_padding: 10.0,
        }
    }
}

/// Computed surface placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub side: Side,

    /// Arrow offset from the surface's left edge
    pub arrow_x: f64,
}

/// Place a surface of size `floating` next to `anchor`.
pub fn compute_position(
    anchor: Rect,
    floating: Size,
    viewport: Size,
    options: &PopperOptions,
) -> Position {
    let fits = |side: Side| match side {
        Side::Bottom => {
            anchor.bottom() + options.offset + floating.height <= viewport.height - options.padding
        }
        Side::Top => anchor.y - options.offset - floating.height >= options.padding,
    };

    let preferred = options.placement;
    let side = if !fits(preferred) && fits(preferred.opposite()) {
        preferred.opposite()
    } else {
        preferred
    };

    let y = match side {
        Side::Bottom => anchor.bottom() + options.offset,
        Side::Top => anchor.y - options.offset - floating.height,
    };

    let max_x = (viewport.width - options.padding - floating.width).max(options.padding);
    let x = (anchor.center_x() - floating.width / 2.0).clamp(options.padding, max_x);

    let max_arrow = (floating.width - options.arrow_padding).max(options.arrow_padding);
    let arrow_x = (anchor.center_x() - x).clamp(options.arrow_padding, max_arrow);

    Position {
        x,
        y,
        side,
        arrow_x,
    }
}

/// Open state and layout inputs of a popover.
#[derive(Debug, Clone)]
pub struct Popover {
    open: bool,
    anchor: Option<Rect>,
    surface: Size,
    viewport: Size,
    options: PopperOptions,
}

impl Default for Popover {
    fn default() -> Self {
        Self::new(PopperOptions::default())
    }
}

impl Popover {
    pub fn new(options: PopperOptions) -> Self {
        Self {
            open: false,
            anchor: None,
            surface: Size::default(),
            viewport: Size::UNBOUNDED,
            options,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn set_anchor(&mut self, anchor: Rect) {
        self.anchor = Some(anchor);
    }

    pub fn set_surface_size(&mut self, size: Size) {
        self.surface = size;
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Current placement, if open and anchored. Always reflects the latest
    /// layout inputs.
    pub fn position(&self) -> Option<Position> {
        if !self.open {
            return None;
        }

        let anchor = self.anchor?;
        Some(compute_position(
            anchor,
            self.surface,
            self.viewport,
            &self.options,
        ))
    }

    /// Bounds of the open surface.
    pub fn surface_rect(&self) -> Option<Rect> {
        self.position()
            .map(|p| Rect::new(p.x, p.y, self.surface.width, self.surface.height))
    }

    /// Whether an interaction at `point` happened outside the trigger and the
    /// surface.
    pub fn is_outside(&self, point: Point) -> bool {
        let in_anchor = self.anchor.is_some_and(|a| a.contains(point));
        let in_surface = self.surface_rect().is_some_and(|s| s.contains(point));
        !in_anchor && !in_surface
    }
}
