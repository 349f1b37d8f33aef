//! Binary region masks built from landmark subsets.
//!
//! Masks are 0/255 single-channel grids, created per effect invocation and
//! never persisted. Out-of-bounds landmark indices shrink the point set; an
//! empty or degenerate point set yields an all-zero mask, which the calling
//! effect treats as a no-op for that region.

use crate::landmarks::LandmarkSet;
use image::{GrayImage, Luma};
use imageproc::{
    distance_transform::Norm,
    drawing::{draw_line_segment_mut, draw_polygon_mut},
    geometry::convex_hull,
    morphology::dilate,
    point::Point,
};

const FILL: Luma<u8> = Luma([255u8]);

/// Convex hull of every landmark in the set, filled. Used for whole-face masks.
pub fn convex_hull_mask(width: u32, height: u32, face: &LandmarkSet) -> GrayImage {
    let points = face.all_pixel_points(width, height);
    let mut mask = GrayImage::new(width, height);

    if points.is_empty() {
        return mask;
    }

    fill_polygon(&mut mask, convex_hull(points));
    mask
}

/// Hull vertices of the whole face, for outline drawing.
pub fn convex_hull_points(width: u32, height: u32, face: &LandmarkSet) -> Vec<Point<i32>> {
    let points = face.all_pixel_points(width, height);
    if points.is_empty() {
        return Vec::new();
    }

    convex_hull(points)
}

/// An explicit index subset treated as a closed polygon boundary, filled.
/// Used for eyes, lips and teeth.
pub fn polygon_mask(width: u32, height: u32, face: &LandmarkSet, indices: &[usize]) -> GrayImage {
    let points = face.pixel_points(indices, width, height);
    let mut mask = GrayImage::new(width, height);
    fill_polygon(&mut mask, points);
    mask
}

/// The same index subset interpreted as an open stroke, expanded by one 3x3
/// dilation. Used for eyelash regions (thin curved feature, not an area).
pub fn polyline_mask(width: u32, height: u32, face: &LandmarkSet, indices: &[usize]) -> GrayImage {
    let points = face.pixel_points(indices, width, height);
    let mut mask = GrayImage::new(width, height);

    if points.len() < 2 {
        return mask;
    }

    for pair in points.windows(2) {
        draw_line_segment_mut(
            &mut mask,
            (pair[0].x as f32, pair[0].y as f32),
            (pair[1].x as f32, pair[1].y as f32),
            FILL,
        );
    }

    dilate(&mask, Norm::LInf, 1)
}

pub fn is_empty_mask(mask: &GrayImage) -> bool {
    mask.pixels().all(|p| p[0] == 0)
}

fn fill_polygon(mask: &mut GrayImage, points: Vec<Point<i32>>) {
    // draw_polygon_mut requires an open point list with no repeated endpoint.
    let mut boundary: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for point in points {
        if boundary.last() != Some(&point) {
            boundary.push(point);
        }
    }
    while boundary.len() > 1 && boundary.first() == boundary.last() {
        boundary.pop();
    }

    if boundary.len() < 3 {
        return;
    }

    draw_polygon_mut(mask, &boundary, FILL);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_face() -> LandmarkSet {
        // 4 corners of a centered square on a 100x100 canvas.
        LandmarkSet::new(vec![(0.2, 0.2), (0.8, 0.2), (0.8, 0.8), (0.2, 0.8)])
    }

    #[test]
    fn test_polygon_mask_fills_interior() {
        let mask = polygon_mask(100, 100, &square_face(), &[0, 1, 2, 3]);

        assert_eq!(mask.get_pixel(50, 50)[0], 255);
        assert_eq!(mask.get_pixel(5, 5)[0], 0);
        assert_eq!(mask.get_pixel(95, 50)[0], 0);
    }

    #[test]
    fn test_out_of_bounds_indices_shrink_point_set() {
        let mask = polygon_mask(100, 100, &square_face(), &[0, 1, 900, 2, 3]);
        assert_eq!(mask.get_pixel(50, 50)[0], 255);
    }

    #[test]
    fn test_all_out_of_bounds_yields_zero_mask() {
        let mask = polygon_mask(100, 100, &square_face(), &[400, 401, 402]);
        assert!(is_empty_mask(&mask));

        let mask = polyline_mask(100, 100, &square_face(), &[400, 401]);
        assert!(is_empty_mask(&mask));
    }

    #[test]
    fn test_degenerate_polygon_yields_zero_mask() {
        let mask = polygon_mask(100, 100, &square_face(), &[0, 1]);
        assert!(is_empty_mask(&mask));

        let mask = polygon_mask(100, 100, &LandmarkSet::default(), &[0, 1, 2]);
        assert!(is_empty_mask(&mask));
    }

    #[test]
    fn test_polyline_mask_is_dilated_stroke() {
        let mask = polyline_mask(100, 100, &square_face(), &[0, 1]);

        // The stroke runs along y=20; dilation widens it to a band.
        assert_eq!(mask.get_pixel(50, 20)[0], 255);
        assert_eq!(mask.get_pixel(50, 19)[0], 255);
        assert_eq!(mask.get_pixel(50, 21)[0], 255);
        assert_eq!(mask.get_pixel(50, 40)[0], 0);

        // Open stroke: no segment between the first and last point.
        let mask = polyline_mask(100, 100, &square_face(), &[0, 1, 2]);
        assert_eq!(mask.get_pixel(50, 80)[0], 0);
    }

    #[test]
    fn test_convex_hull_mask_covers_inner_points() {
        let face = LandmarkSet::new(vec![
            (0.2, 0.2),
            (0.8, 0.2),
            (0.8, 0.8),
            (0.2, 0.8),
            (0.5, 0.5), // interior point, must not change the hull
        ]);
        let mask = convex_hull_mask(100, 100, &face);

        assert_eq!(mask.get_pixel(50, 50)[0], 255);
        assert_eq!(mask.get_pixel(3, 3)[0], 0);
    }

    #[test]
    fn test_empty_landmark_set_yields_zero_hull() {
        let mask = convex_hull_mask(100, 100, &LandmarkSet::default());
        assert!(is_empty_mask(&mask));
        assert!(convex_hull_points(100, 100, &LandmarkSet::default()).is_empty());
    }
}
