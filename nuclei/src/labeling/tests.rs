//! Tests for connected component labeling.

use super::*;

fn mask_from_rows(rows: &[&str]) -> BitBuffer2 {
    let width = rows[0].len();
    BitBuffer2::from_fn(width, rows.len(), |x, y| rows[y].as_bytes()[x] == b'#')
}

#[test]
fn empty_mask() {
    let mask = BitBuffer2::new_default(4, 4);
    let label_map = LabelMap::from_mask(&mask, Connectivity::Four);

    assert_eq!(label_map.num_labels(), 0);
    assert!(label_map.labels().iter().all(|&l| l == 0));
}

#[test]
fn zero_sized_mask() {
    let mask = BitBuffer2::new_default(0, 0);
    let label_map = LabelMap::from_mask(&mask, Connectivity::Eight);
    assert_eq!(label_map.num_labels(), 0);
    assert_eq!(label_map.width(), 0);
}

#[test]
fn single_pixel() {
    let mask = mask_from_rows(&["....", ".#..", "....", "...."]);
    let label_map = LabelMap::from_mask(&mask, Connectivity::Four);

    assert_eq!(label_map.num_labels(), 1);
    assert_eq!(label_map.label_at(1, 1), 1);
    assert_eq!(label_map.labels().iter().filter(|&&l| l == 1).count(), 1);
}

#[test]
fn diagonal_pixels_depend_on_connectivity() {
    // #..
    // .#.
    // ..#
    let mask = mask_from_rows(&["#..", ".#.", "..#"]);

    let four = LabelMap::from_mask(&mask, Connectivity::Four);
    assert_eq!(four.num_labels(), 3);

    let eight = LabelMap::from_mask(&mask, Connectivity::Eight);
    assert_eq!(eight.num_labels(), 1);
    assert_eq!(eight.label_at(2, 2), 1);
}

#[test]
fn u_shape_merges_into_one_label() {
    // #...#
    // #...#
    // #####
    let mask = mask_from_rows(&["#...#", "#...#", "#####"]);
    let label_map = LabelMap::from_mask(&mask, Connectivity::Four);

    assert_eq!(label_map.num_labels(), 1);
    assert!(label_map.labels().iter().all(|&l| l == 0 || l == 1));
    assert_eq!(label_map.component_sizes(), vec![9]);
}

#[test]
fn labels_follow_row_major_first_appearance() {
    // ...#.
    // #..#.
    // #....
    let mask = mask_from_rows(&["...#.", "#..#.", "#...."]);
    let label_map = LabelMap::from_mask(&mask, Connectivity::Four);

    assert_eq!(label_map.num_labels(), 2);
    assert_eq!(label_map.label_at(3, 0), 1);
    assert_eq!(label_map.label_at(3, 1), 1);
    assert_eq!(label_map.label_at(0, 1), 2);
    assert_eq!(label_map.label_at(0, 2), 2);
}

#[test]
fn merged_component_keeps_earliest_label() {
    // .#..#
    // .#..#
    // .####
    // #....
    let mask = mask_from_rows(&[".#..#", ".#..#", ".####", "#...."]);

    let four = LabelMap::from_mask(&mask, Connectivity::Four);
    assert_eq!(four.num_labels(), 2);
    assert_eq!(four.label_at(4, 0), 1);
    assert_eq!(four.label_at(0, 3), 2);

    let eight = LabelMap::from_mask(&mask, Connectivity::Eight);
    assert_eq!(eight.num_labels(), 1);
}

#[test]
fn runs_across_word_boundaries() {
    let width = 150;
    let mask = BitBuffer2::from_fn(width, 3, |x, y| match y {
        0 => (60..70).contains(&x),
        1 => x == 69 || x >= 128,
        _ => x == 149,
    });
    let label_map = LabelMap::from_mask(&mask, Connectivity::Four);

    assert_eq!(label_map.num_labels(), 2);
    assert_eq!(label_map.label_at(60, 0), 1);
    assert_eq!(label_map.label_at(69, 1), 1);
    assert_eq!(label_map.label_at(128, 1), 2);
    assert_eq!(label_map.label_at(149, 2), 2);
    assert_eq!(label_map.component_sizes(), vec![11, 23]);
}

#[test]
fn full_mask_is_single_component() {
    let mask = BitBuffer2::new_filled(128, 4, true);
    let label_map = LabelMap::from_mask(&mask, Connectivity::Four);
    assert_eq!(label_map.num_labels(), 1);
    assert_eq!(label_map.component_sizes(), vec![512]);
}

#[test]
fn comb_requires_union_of_many_runs() {
    // #.#.#.#
    // #######
    let mask = mask_from_rows(&["#.#.#.#", "#######"]);
    let label_map = LabelMap::from_mask(&mask, Connectivity::Four);
    assert_eq!(label_map.num_labels(), 1);
    assert_eq!(label_map[6], 1);
}
