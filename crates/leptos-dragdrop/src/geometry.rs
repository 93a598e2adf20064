//! Screen Geometry
//!
//! Points and rectangles in client (viewport) coordinates.

/// A point in client coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Vector from `origin` to this point
    pub fn delta_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Corners in the order top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right(), self.top),
            Point::new(self.left, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left && other.top >= self.top && other.right() <= self.right() && other.bottom() <= self.bottom()
    }

    pub fn translate(&self, delta: Point) -> Rect {
        Rect::new(self.left + delta.x, self.top + delta.y, self.width, self.height)
    }

    /// Same size, moved so the top-left corner sits at `origin`
    pub fn moved_to(&self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, self.width, self.height)
    }

    pub fn from_dom(rect: &web_sys::DomRect) -> Rect {
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_corners_and_center() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        let [tl, tr, bl, br] = r.corners();
        assert_eq!(tl, Point::new(10.0, 20.0));
        assert_eq!(tr, Point::new(110.0, 20.0));
        assert_eq!(bl, Point::new(10.0, 70.0));
        assert_eq!(br, Point::new(110.0, 70.0));
        assert_eq!(r.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_translate_keeps_size() {
        let r = Rect::new(0.0, 0.0, 40.0, 30.0).translate(Point::new(5.0, -5.0));
        assert_eq!(r, Rect::new(5.0, -5.0, 40.0, 30.0));
        assert_eq!(r.moved_to(Point::new(1.0, 2.0)), Rect::new(1.0, 2.0, 40.0, 30.0));
    }

    #[test]
    fn test_contains() {
        let lane = Rect::new(0.0, 0.0, 250.0, 600.0);
        assert!(lane.contains(&Rect::new(10.0, 10.0, 200.0, 80.0)));
        assert!(lane.contains(&lane));
        assert!(!lane.contains(&Rect::new(200.0, 10.0, 200.0, 80.0)));
    }
}
