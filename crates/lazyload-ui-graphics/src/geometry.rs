//! Rectangles and insets for element bounds and observer roots.

/// Axis-aligned rectangle in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grows the rectangle outward by `insets` (negative insets shrink it).
    pub fn outset(&self, insets: EdgeInsets) -> Self {
        Self {
            x: self.x - insets.left,
            y: self.y - insets.top,
            width: (self.width + insets.horizontal_sum()).max(0.0),
            height: (self.height + insets.vertical_sum()).max(0.0),
        }
    }

    /// Overlapping region of two rectangles.
    ///
    /// Edge-adjacent rectangles produce a zero-sized intersection rather than
    /// `None`, matching how an observer treats a touching target as
    /// intersecting.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Fraction of `self` that lies inside `root`, in `[0, 1]`.
    ///
    /// A zero-area target counts as fully visible when it touches `root` and
    /// invisible otherwise.
    pub fn intersection_ratio(&self, root: &Rect) -> f32 {
        let Some(overlap) = self.intersect(root) else {
            return 0.0;
        };
        let area = self.area();
        if area <= 0.0 {
            return 1.0;
        }
        (overlap.area() / area).clamp(0.0, 1.0)
    }
}

/// Per-edge margins, used for the observer's root margin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    /// Same margin above and below; nothing at the sides.
    pub fn vertical(margin: f32) -> Self {
        Self {
            top: margin,
            bottom: margin,
            ..Self::ZERO
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn horizontal_sum(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical_sum(&self) -> f32 {
        self.top + self.bottom
    }
}
