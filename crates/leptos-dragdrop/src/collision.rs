//! Collision Detection
//!
//! Nearest-corner proximity between the dragged rectangle and drop zones.
//! Unlike bounding-box overlap this still resolves a target when the card
//! straddles two narrow neighbouring columns.

use crate::geometry::Rect;

/// A registered drop zone and its measured rectangle
#[derive(Clone, Debug, PartialEq)]
pub struct Droppable {
    pub id: String,
    pub rect: Rect,
}

impl Droppable {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self { id: id.into(), rect }
    }
}

/// Mean distance between corresponding corners of two rectangles
pub fn corner_distance(a: &Rect, b: &Rect) -> f64 {
    a.corners()
        .iter()
        .zip(b.corners().iter())
        .map(|(p, q)| p.distance(*q))
        .sum::<f64>()
        / 4.0
}

/// Drop zone whose corners are closest to the dragged rectangle.
/// Ties go to the zone registered first.
pub fn closest_corners<'a>(active: &Rect, droppables: &'a [Droppable]) -> Option<&'a Droppable> {
    droppables
        .iter()
        .map(|d| (corner_distance(active, &d.rect), d))
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, d)| d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn lanes() -> Vec<Droppable> {
        vec![
            Droppable::new("new", Rect::new(0.0, 0.0, 250.0, 600.0)),
            Droppable::new("in-attendance", Rect::new(266.0, 0.0, 250.0, 600.0)),
            Droppable::new("contacted", Rect::new(532.0, 0.0, 250.0, 600.0)),
        ]
    }

    #[test]
    fn test_empty_has_no_target() {
        assert!(closest_corners(&Rect::new(0.0, 0.0, 10.0, 10.0), &[]).is_none());
    }

    #[test]
    fn test_picks_lane_under_card() {
        let card = Rect::new(270.0, 0.0, 250.0, 600.0);
        assert_eq!(closest_corners(&card, &lanes()).unwrap().id, "in-attendance");
    }

    #[test]
    fn test_straddling_card_resolves_to_nearer_lane() {
        // Two thirds of the card sits over the third lane
        let card = Rect::new(450.0, 0.0, 250.0, 600.0);
        assert_eq!(closest_corners(&card, &lanes()).unwrap().id, "contacted");
    }

    #[test]
    fn test_card_sized_targets_beat_lanes_when_aligned() {
        let mut zones = lanes();
        zones.push(Droppable::new("lead-7", Rect::new(282.0, 60.0, 218.0, 90.0)));
        let card = Rect::new(0.0, 0.0, 218.0, 90.0).translate(Point::new(285.0, 58.0));
        assert_eq!(closest_corners(&card, &zones).unwrap().id, "lead-7");
    }

    #[test]
    fn test_tie_goes_to_first() {
        let zones = vec![
            Droppable::new("a", Rect::new(0.0, 0.0, 10.0, 10.0)),
            Droppable::new("b", Rect::new(0.0, 0.0, 10.0, 10.0)),
        ];
        assert_eq!(closest_corners(&Rect::new(0.0, 0.0, 10.0, 10.0), &zones).unwrap().id, "a");
    }
}
