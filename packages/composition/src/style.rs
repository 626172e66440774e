//! Categorical styling for geology units.

use geology_map_models::{CategoryStyle, Rgb, VectorLayer};

/// The 20-step categorical palette used for geology units (`tab20`).
pub const TAB20: [Rgb; 20] = [
    Rgb::from_hex(0x1f_77_b4),
    Rgb::from_hex(0xae_c7_e8),
    Rgb::from_hex(0xff_7f_0e),
    Rgb::from_hex(0xff_bb_78),
    Rgb::from_hex(0x2c_a0_2c),
    Rgb::from_hex(0x98_df_8a),
    Rgb::from_hex(0xd6_27_28),
    Rgb::from_hex(0xff_98_96),
    Rgb::from_hex(0x94_67_bd),
    Rgb::from_hex(0xc5_b0_d5),
    Rgb::from_hex(0x8c_56_4b),
    Rgb::from_hex(0xc4_9c_94),
    Rgb::from_hex(0xe3_77_c2),
    Rgb::from_hex(0xf7_b6_d2),
    Rgb::from_hex(0x7f_7f_7f),
    Rgb::from_hex(0xc7_c7_c7),
    Rgb::from_hex(0xbc_bd_22),
    Rgb::from_hex(0xdb_db_8d),
    Rgb::from_hex(0x17_be_cf),
    Rgb::from_hex(0x9e_da_e5),
];

/// Distinct category values of `layer` in first-encountered order.
#[must_use]
pub fn unique_categories(layer: &VectorLayer, attribute: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    layer
        .features
        .iter()
        .map(|feature| feature.category(attribute))
        .filter(|category| seen.insert(category.clone()))
        .collect()
}

/// Samples a discrete ramp at `t` in `[0, 1]`.
///
/// Returns `None` only for an empty ramp.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn sample_ramp(ramp: &[Rgb], t: f64) -> Option<Rgb> {
    let last = ramp.len().checked_sub(1)?;
    let step = (t.clamp(0.0, 1.0) * ramp.len() as f64).floor() as usize;
    ramp.get(step.min(last)).copied()
}

/// Ramp position of category `index` out of `count`.
#[allow(clippy::cast_precision_loss)]
fn ramp_position(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    }
}

/// Assigns a colour from `ramp` to each category, spreading the categories
/// evenly across the ramp.
///
/// Duplicate categories keep their first colour. With more categories than
/// ramp steps, colours repeat.
#[must_use]
pub fn resolve_styles_with(categories: &[String], ramp: &[Rgb]) -> CategoryStyle {
    let mut style = CategoryStyle::default();
    let count = categories.len();

    for (index, category) in categories.iter().enumerate() {
        if let Some(color) = sample_ramp(ramp, ramp_position(index, count)) {
            style.insert(category.clone(), color);
        }
    }

    style
}

/// Assigns a [`TAB20`] colour to each category.
#[must_use]
pub fn resolve_styles(categories: &[String]) -> CategoryStyle {
    let style = resolve_styles_with(categories, &TAB20);
    if categories.len() > TAB20.len() {
        log::warn!(
            "{} geology units but only {} distinct colours; some colours will repeat",
            categories.len(),
            TAB20.len()
        );
    }
    style
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use geo::{MultiPolygon, polygon};
    use geology_map_models::{GeoFeature, Properties};

    use super::*;

    fn categories(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Unit {i}")).collect()
    }

    fn feature(unit: Option<&str>) -> GeoFeature {
        let mut props = Properties::new();
        if let Some(unit) = unit {
            props.insert("UNIT_NAME".to_string(), unit.into());
        }
        GeoFeature::new(
            MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 0.0),
            ]]),
            props,
        )
    }

    #[test]
    fn unique_categories_keep_first_encounter_order() {
        let layer = VectorLayer::new(
            vec![
                feature(Some("Shale")),
                feature(Some("Basalt")),
                feature(Some("Shale")),
                feature(None),
                feature(Some("Alluvium")),
                feature(None),
            ],
            None,
        );
        assert_eq!(
            unique_categories(&layer, "UNIT_NAME"),
            ["Shale", "Basalt", "Unknown", "Alluvium"]
        );
    }

    #[test]
    fn sampling_takes_floor_step_and_clamps_the_end() {
        assert_eq!(sample_ramp(&TAB20, 0.0), Some(TAB20[0]));
        assert_eq!(sample_ramp(&TAB20, 0.049), Some(TAB20[0]));
        assert_eq!(sample_ramp(&TAB20, 0.05), Some(TAB20[1]));
        assert_eq!(sample_ramp(&TAB20, 0.5), Some(TAB20[10]));
        assert_eq!(sample_ramp(&TAB20, 1.0), Some(TAB20[19]));
        assert_eq!(sample_ramp(&[], 0.5), None);
    }

    #[test]
    fn single_category_takes_first_colour() {
        let style = resolve_styles(&categories(1));
        assert_eq!(style.get("Unit 0"), Some(TAB20[0]));
    }

    #[test]
    fn two_categories_span_the_ramp() {
        let style = resolve_styles(&categories(2));
        assert_eq!(style.get("Unit 0"), Some(TAB20[0]));
        assert_eq!(style.get("Unit 1"), Some(TAB20[19]));
    }

    #[test]
    fn resolution_is_deterministic() {
        for n in [1, 3, 7, 20, 33] {
            assert_eq!(resolve_styles(&categories(n)), resolve_styles(&categories(n)));
        }
    }

    #[test]
    fn injective_up_to_palette_size() {
        for n in 1..=TAB20.len() {
            let style = resolve_styles(&categories(n));
            assert_eq!(style.len(), n);
            let colors: BTreeSet<String> = style.iter().map(|(_, c)| c.to_hex()).collect();
            assert_eq!(colors.len(), n, "collision among {n} categories");
        }
    }

    #[test]
    fn colours_repeat_beyond_palette_size() {
        let style = resolve_styles(&categories(25));
        assert_eq!(style.len(), 25);
        let colors: BTreeSet<String> = style.iter().map(|(_, c)| c.to_hex()).collect();
        assert!(colors.len() <= TAB20.len());
    }

    #[test]
    fn style_preserves_category_order() {
        let cats = categories(5);
        let style = resolve_styles(&cats);
        let ordered: Vec<&str> = style.iter().map(|(name, _)| name).collect();
        assert_eq!(ordered, ["Unit 0", "Unit 1", "Unit 2", "Unit 3", "Unit 4"]);
    }
}
