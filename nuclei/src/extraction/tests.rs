use glam::DVec2;

use super::*;

fn small_config() -> Config {
    let config = Config {
        window_half_size: 3,
        padding_slack: 2,
        min_nucleus_size: 2,
        max_nucleus_size: 100,
        ..Config::default()
    };
    config.validate();
    config
}

fn identity_geometry() -> TileGeometry {
    TileGeometry {
        offset_x: 0,
        offset_y: 0,
        resize_factor: 1,
    }
}

/// 20x20 label map with `label` on the given rectangle (inclusive bounds).
fn labels_with_rect(x0: usize, y0: usize, x1: usize, y1: usize, label: u32) -> Buffer2<u32> {
    Buffer2::from_fn(20, 20, |x, y| {
        if (x0..=x1).contains(&x) && (y0..=y1).contains(&y) {
            label
        } else {
            0
        }
    })
}

#[test]
fn test_square_basin_maps_to_global_polygon() {
    let labels = labels_with_rect(8, 8, 10, 10, 1);
    let nucleus = extract_nucleus(&labels, (9, 9), &small_config(), &identity_geometry()).unwrap();

    assert_eq!(nucleus.pixel_area, 9);
    assert_eq!(nucleus.native_area, 9);
    // Window origin (6, 6) minus margin 5
    assert_eq!(
        nucleus.polygon,
        vec![
            DVec2::new(3.0, 3.0),
            DVec2::new(3.0, 5.0),
            DVec2::new(5.0, 5.0),
            DVec2::new(5.0, 3.0),
        ]
    );
}

#[test]
fn test_resize_factor_and_offset() {
    let labels = labels_with_rect(8, 8, 10, 10, 4);
    let geometry = TileGeometry {
        offset_x: 1000,
        offset_y: 2000,
        resize_factor: 2,
    };
    let nucleus = extract_nucleus(&labels, (9, 9), &small_config(), &geometry).unwrap();

    assert_eq!(nucleus.pixel_area, 9);
    assert_eq!(nucleus.native_area, 2);
    assert_eq!(nucleus.polygon[0], DVec2::new(1001.5, 2001.5));
    assert_eq!(nucleus.polygon[2], DVec2::new(1002.5, 2002.5));
}

#[test]
fn test_seed_outside_basins_is_unlabeled() {
    let labels = labels_with_rect(8, 8, 10, 10, 1);
    let result = extract_nucleus(&labels, (14, 14), &small_config(), &identity_geometry());
    assert_eq!(result, Err(Rejection::Unlabeled));
}

#[test]
fn test_small_basin_is_rejected() {
    let labels = labels_with_rect(8, 8, 10, 10, 1);
    let config = Config {
        min_nucleus_size: 10,
        ..small_config()
    };
    let result = extract_nucleus(&labels, (9, 9), &config, &identity_geometry());
    assert_eq!(result, Err(Rejection::TooSmall));
}

#[test]
fn test_basin_covering_window_is_rejected() {
    let labels = Buffer2::new_filled(20, 20, 2u32);
    let result = extract_nucleus(&labels, (9, 9), &small_config(), &identity_geometry());
    assert_eq!(result, Err(Rejection::WindowOverflow));
}

#[test]
fn test_thin_line_is_degenerate() {
    let labels = labels_with_rect(8, 9, 10, 9, 1);
    let result = extract_nucleus(&labels, (9, 9), &small_config(), &identity_geometry());
    assert_eq!(result, Err(Rejection::DegenerateContour));
}

#[test]
fn test_holes_count_toward_area() {
    // 5x5 ring of label 1 around a pixel of label 2
    let mut labels = labels_with_rect(7, 7, 11, 11, 1);
    labels[(9, 9)] = 2;
    let config = Config {
        min_nucleus_size: 25,
        ..small_config()
    };
    let nucleus = extract_nucleus(&labels, (8, 8), &config, &identity_geometry()).unwrap();
    assert_eq!(nucleus.pixel_area, 25);
    assert_eq!(nucleus.polygon.len(), 4);
}

#[test]
fn test_basin_is_clipped_to_window() {
    // Basin wider than the 7x7 window but not covering it vertically
    let labels = labels_with_rect(5, 8, 14, 10, 1);
    let nucleus = extract_nucleus(&labels, (9, 9), &small_config(), &identity_geometry()).unwrap();
    assert_eq!(nucleus.pixel_area, 21);
}

#[test]
fn test_extract_nuclei_keeps_seed_order_and_counts_rejections() {
    let mut labels = labels_with_rect(6, 6, 8, 8, 1);
    for y in 11..=13 {
        for x in 10..=12 {
            labels[(x, y)] = 2;
        }
    }
    let seeds = BitBuffer2::from_fn(20, 20, |x, y| {
        (x, y) == (7, 7) || (x, y) == (11, 12) || (x, y) == (14, 6)
    });

    let extraction = extract_nuclei(&labels, &seeds, &small_config(), &identity_geometry());
    assert_eq!(extraction.nuclei.len(), 2);
    assert_eq!(extraction.nuclei[0].polygon[0], DVec2::new(1.0, 1.0));
    assert_eq!(extraction.nuclei[1].polygon[0], DVec2::new(5.0, 6.0));
    assert_eq!(extraction.rejections.unlabeled, 1);
    assert_eq!(extraction.rejections.total(), 1);
}

#[test]
fn test_rejection_counts_record() {
    let mut counts = RejectionCounts::default();
    counts.record(Rejection::TooSmall);
    counts.record(Rejection::TooSmall);
    counts.record(Rejection::DegenerateContour);
    assert_eq!(counts.too_small, 2);
    assert_eq!(counts.degenerate_contour, 1);
    assert_eq!(counts.total(), 3);
}

#[test]
fn test_second_seed_in_same_basin_is_duplicate() {
    let labels = labels_with_rect(7, 7, 11, 11, 1);
    let seeds = BitBuffer2::from_fn(20, 20, |x, y| (x, y) == (9, 8) || (x, y) == (9, 10));

    let extraction = extract_nuclei(&labels, &seeds, &small_config(), &identity_geometry());
    assert_eq!(extraction.nuclei.len(), 1);
    assert_eq!(extraction.nuclei[0].pixel_area, 25);
    assert_eq!(extraction.rejections.duplicate_basin, 1);
}
