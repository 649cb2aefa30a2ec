use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use crate::error::{FruitError, Result};
use crate::models::{Contour, Region};

/// Outer boundaries of the top-level foreground regions, in raster scan order
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| Contour::new(c.points))
        .collect()
}

/// Keep the contour with the largest perimeter and drop the rest.
///
/// The first contour in scan order wins ties.
pub fn select_largest(contours: Vec<Contour>) -> Result<Region> {
    let found = contours.len();
    let mut best: Option<(Contour, f64)> = None;

    for contour in contours {
        let perimeter = contour.perimeter();
        log::debug!("Contour with {} points, perimeter {:.2}", contour.len(), perimeter);
        let larger = best.as_ref().map_or(true, |(_, largest)| perimeter > *largest);
        if larger {
            best = Some((contour, perimeter));
        }
    }

    let (contour, perimeter) =
        best.ok_or_else(|| FruitError::no_region("no contours found in mask"))?;

    if perimeter <= 0.0 {
        return Err(FruitError::no_region(format!(
            "largest contour is degenerate ({} points)",
            contour.len()
        )));
    }

    let area = contour.area();
    Ok(Region {
        contour,
        perimeter,
        area,
        contours_found: found,
        contours_discarded: found - 1,
    })
}

/// Find the external contours of a mask and select the fruit boundary
pub fn select_region(mask: &GrayImage) -> Result<Region> {
    let contours = find_external_contours(mask);
    let region = select_largest(contours)?;
    log::info!(
        "Number of contours: {}, {} removed",
        region.contours_found,
        region.contours_discarded
    );
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::point::Point;

    fn square_at(x: i32, y: i32, side: i32) -> Contour {
        Contour::new(vec![
            Point::new(x, y),
            Point::new(x + side, y),
            Point::new(x + side, y + side),
            Point::new(x, y + side),
        ])
    }

    #[test]
    fn test_largest_perimeter_kept() {
        let region = select_largest(vec![
            square_at(0, 0, 2),
            square_at(10, 10, 8),
            square_at(30, 30, 4),
        ])
        .unwrap();
        assert_eq!(region.contour, square_at(10, 10, 8));
        assert_eq!(region.contours_found, 3);
        assert_eq!(region.contours_discarded, 2);
        assert!((region.perimeter - 32.0).abs() < 1e-9);
        assert!((region.area - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_contour_wins_tie() {
        let region = select_largest(vec![square_at(50, 0, 5), square_at(0, 50, 5)]).unwrap();
        assert_eq!(region.contour, square_at(50, 0, 5));
    }

    #[test]
    fn test_no_contours_is_segmentation_error() {
        let err = select_largest(Vec::new()).unwrap_err();
        assert!(matches!(err, FruitError::NoRegion { .. }));
    }

    #[test]
    fn test_single_pixel_region_is_degenerate() {
        let err = select_largest(vec![Contour::new(vec![Point::new(4, 4)])]).unwrap_err();
        assert!(matches!(err, FruitError::NoRegion { .. }));
    }
}
