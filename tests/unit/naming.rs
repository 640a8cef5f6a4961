use std::path::PathBuf;

use catalog_uploader::files::{generate_display_name, is_sentinel, FALLBACK_NAME};

fn name_of(file: &str, tags: &[&str], max: usize) -> String {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    generate_display_name(&PathBuf::from(file), &tags, max)
}

#[test]
fn test_non_ascii_letters_are_dropped() {
    // Cleaning keeps ASCII alphanumerics only
    assert_eq!(name_of("café.png", &[], 50), "Caf");
    assert_eq!(name_of("naïve_shirt.png", &[], 50), "Nave Shirt");
}

#[test]
fn test_fully_non_ascii_stem_falls_back() {
    assert_eq!(name_of("日本語.png", &[], 50), FALLBACK_NAME);
}

#[test]
fn test_ascii_words_survive_next_to_non_ascii() {
    // The kana segment vanishes, the ASCII word remains
    assert_eq!(name_of("ドラゴン_shirt.png", &[], 50), "Shirt");
}

#[test]
fn test_uppercase_input_is_normalized() {
    assert_eq!(name_of("ROBLOX_FIRE_DRAGON.PNG", &[], 50), "Fire Dragon");
}

#[test]
fn test_digits_survive_cleaning() {
    assert_eq!(name_of("pants_2024-summer.png", &[], 50), "2024 Summer");
}

#[test]
fn test_directory_components_are_ignored() {
    assert_eq!(
        name_of("uploads/batch_7/roblox_ice_wing.png", &[], 50),
        "Ice Wing"
    );
}

#[test]
fn test_prefix_suffix_and_separators_combined() {
    assert_eq!(
        name_of("roblox_neon-tiger.stripes_upload.png", &[], 50),
        "Neon Tiger Stripes"
    );
}

#[test]
fn test_first_tag_fits_exactly_at_the_budget_edge() {
    // Base "Red Shirt" is 9 chars; the tag budget reserves 2 beyond the
    // name, so " abc" (4 chars) needs max_length >= 15
    assert_eq!(name_of("red_shirt.png", &["abc"], 15), "Red Shirt abc");
    assert_eq!(name_of("red_shirt.png", &["abc"], 14), "Red Shirt");
}

#[test]
fn test_second_tag_dropped_at_the_budget_edge() {
    // " abc" + ", de" = 8 chars of tags; fits at 19, not at 18
    assert_eq!(
        name_of("red_shirt.png", &["abc", "de"], 19),
        "Red Shirt abc, de"
    );
    assert_eq!(name_of("red_shirt.png", &["abc", "de"], 18), "Red Shirt abc");
}

#[test]
fn test_appending_stops_at_the_first_tag_that_misses() {
    // ", x" would fit after "cool", but "extended edition" ends the loop
    assert_eq!(
        name_of("red_shirt.png", &["cool", "extended edition", "x"], 20),
        "Red Shirt cool"
    );
}

#[test]
fn test_generated_fallback_is_a_sentinel() {
    let name = name_of("###.png", &[], 50);
    assert!(is_sentinel(&name));
    assert!(!is_sentinel(&name_of("red_shirt.png", &[], 50)));
}
