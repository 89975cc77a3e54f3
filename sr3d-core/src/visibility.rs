/// Bounding-volume visibility against the camera frustum
use crate::camera::Frustum;
use crate::math::Vec4;

/// Result of testing a bounding box against the frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Intersect,
    Outside,
}

impl Containment {
    /// Inside or intersecting
    pub fn is_visible(self) -> bool {
        !matches!(self, Containment::Outside)
    }
}

/// Classify the 8 box corners against the 6 frustum planes.
///
/// A corner is outside a plane when its signed distance is negative. A plane
/// with no corner inside makes the whole box `Outside` immediately; a plane
/// with corners on both sides downgrades the result to `Intersect` but the
/// remaining planes are still checked, since one of them may reject the box.
pub fn classify(corners: &[Vec4; 8], frustum: &Frustum) -> Containment {
    let mut result = Containment::Inside;

    for plane in frustum.planes() {
        let mut outside = 0;
        let mut inside = 0;

        // Stop scanning once the plane is known to be crossed
        for corner in corners {
            if plane.signed_distance(corner) < 0.0 {
                outside += 1;
            } else {
                inside += 1;
            }
            if outside > 0 && inside > 0 {
                break;
            }
        }

        if inside == 0 {
            return Containment::Outside;
        } else if outside > 0 {
            result = Containment::Intersect;
        }
    }

    result
}
