use super::*;

fn mask_from_rows(rows: &[&str]) -> BitBuffer2 {
    let width = rows[0].len();
    BitBuffer2::from_fn(width, rows.len(), |x, y| rows[y].as_bytes()[x] == b'#')
}

fn dilate_naive(mask: &BitBuffer2, radius: usize) -> BitBuffer2 {
    BitBuffer2::from_fn(mask.width(), mask.height(), |x, y| {
        let r = radius as isize;
        (-r..=r).any(|dy| {
            (-r..=r).any(|dx| {
                let sx = x as isize + dx;
                let sy = y as isize + dy;
                sx >= 0
                    && sy >= 0
                    && (sx as usize) < mask.width()
                    && (sy as usize) < mask.height()
                    && mask.get_xy(sx as usize, sy as usize)
            })
        })
    })
}

#[test]
fn test_dilate_single_pixel_radius_one() {
    let mask = mask_from_rows(&[".....", ".....", "..#..", ".....", "....."]);
    let dilated = dilate_mask(&mask, 1);

    assert_eq!(dilated.count_ones(), 9);
    for y in 1..=3 {
        for x in 1..=3 {
            assert!(dilated.get_xy(x, y));
        }
    }
    assert!(!dilated.get_xy(0, 2));
}

#[test]
fn test_dilate_clips_at_border() {
    let mask = mask_from_rows(&["#...", "....", "....", "...#"]);
    let dilated = dilate_mask(&mask, 1);
    assert_eq!(dilated.count_ones(), 8);
    assert!(dilated.get_xy(1, 1));
    assert!(dilated.get_xy(2, 2));
    assert!(!dilated.get_xy(2, 0));
}

#[test]
fn test_dilate_radius_zero_is_copy() {
    let mask = mask_from_rows(&["#.#", "...", ".#."]);
    assert_eq!(dilate_mask(&mask, 0), mask);
}

#[test]
fn test_dilate_matches_naive_across_words() {
    let mask = BitBuffer2::from_fn(200, 9, |x, y| (x * 7 + y * 13) % 41 == 0);
    for radius in [1, 2, 5, 63, 70] {
        assert_eq!(dilate_mask(&mask, radius), dilate_naive(&mask, radius), "radius {radius}");
    }
}

#[test]
fn test_dilate_word_edges() {
    let mut mask = BitBuffer2::new_default(130, 3);
    mask.set_xy(63, 1, true);
    mask.set_xy(64, 1, true);
    mask.set_xy(129, 1, true);
    let dilated = dilate_mask(&mask, 1);
    assert_eq!(dilated, dilate_naive(&mask, 1));
    assert!(dilated.get_xy(62, 0));
    assert!(dilated.get_xy(65, 2));
    assert!(dilated.get_xy(128, 0));
}

#[test]
fn test_fill_holes_ring() {
    let mask = mask_from_rows(&[".....", ".###.", ".#.#.", ".###.", "....."]);
    let filled = fill_holes(&mask);
    assert!(filled.get_xy(2, 2));
    assert_eq!(filled.count_ones(), 9);
}

#[test]
fn test_fill_holes_keeps_open_cavity() {
    // The cavity touches the border through the gap on the right
    let mask = mask_from_rows(&["####.", "#..#.", "#....", "####."]);
    let filled = fill_holes(&mask);
    assert_eq!(filled, mask);
}

#[test]
fn test_fill_holes_diagonal_leak_is_not_a_connection() {
    // Background touches the outside only diagonally, so it is a hole
    let mask = mask_from_rows(&["###..", "#.#..", "##.##", "...##"]);
    let filled = fill_holes(&mask);
    assert!(filled.get_xy(1, 1));
    assert!(!filled.get_xy(2, 2));
}

#[test]
fn test_fill_holes_full_and_empty() {
    let full = BitBuffer2::new_filled(4, 4, true);
    assert_eq!(fill_holes(&full), full);
    let empty = BitBuffer2::new_default(4, 4);
    assert_eq!(fill_holes(&empty), empty);
}

#[test]
fn test_fill_holes_nested() {
    let mask = mask_from_rows(&[
        "#######", "#.....#", "#.###.#", "#.#.#.#", "#.###.#", "#.....#", "#######",
    ]);
    let filled = fill_holes(&mask);
    assert_eq!(filled.count_ones(), 49);
}
