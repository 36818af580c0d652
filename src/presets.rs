//! Built-in templates for the common app-icon targets.
//!
//! `icolib gen-templates` writes these into the template directory so they
//! can be edited like any other template.

use crate::template::{ExportTemplate, Item};

/// Every iOS / iTunes app-icon size, `@2x`/`@3x` suffixes in the names.
pub fn ios() -> ExportTemplate {
    const SIZES: &[(u32, &str)] = &[
        (20, "Icon-20"),
        (40, "Icon-20@2x"),
        (60, "Icon-20@3x"),
        (29, "Icon-29"),
        (58, "Icon-29@2x"),
        (87, "Icon-29@3x"),
        (40, "Icon-40"),
        (80, "Icon-40@2x"),
        (120, "Icon-40@3x"),
        (50, "Icon-50"),
        (100, "Icon-50@2x"),
        (57, "Icon-57"),
        (114, "Icon-57@2x"),
        (120, "Icon-60@2x"),
        (180, "Icon-60@3x"),
        (72, "Icon-72"),
        (144, "Icon-72@2x"),
        (76, "Icon-76"),
        (152, "Icon-76@2x"),
        (167, "Icon-167"),
        (512, "iTunesArtwork"),
        (1024, "iTunesArtwork@2x"),
    ];
    ExportTemplate::new("iOS", "iOS", "Icon-%w").with_items(
        SIZES
            .iter()
            .map(|&(side, name)| Item::square(side, Some(name))),
    )
}

/// Launcher icons, one per density bucket under `drawable-*`.
///
/// The first entry has no pattern and lands at `drawable/icon` through the
/// fallback.
pub fn android() -> ExportTemplate {
    ExportTemplate::new("Android", "Android", "drawable/icon")
        .with_item(Item::square(72, None))
        .with_item(Item::square(72, Some("drawable-hdpi/icon")))
        .with_item(Item::square(48, Some("drawable-mdpi/icon")))
        .with_item(Item::square(96, Some("drawable-xhdpi/icon")))
        .with_item(Item::square(144, Some("drawable-xxhdpi/icon")))
        .with_item(Item::square(192, Some("drawable-xxxhdpi/icon")))
}

pub fn all() -> Vec<ExportTemplate> {
    vec![ios(), android()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn resolved_names(template: &ExportTemplate) -> Vec<String> {
        template
            .items()
            .iter()
            .map(|item| template.resolve_name(item).unwrap())
            .collect()
    }

    #[test]
    fn ios_covers_every_size() {
        let t = ios();
        assert_eq!(t.name, "iOS");
        assert_eq!(t.output_directory, "iOS");
        assert_eq!(t.items().len(), 22);
        assert!(t.items().iter().all(|i| i.width == i.height));

        let names = resolved_names(&t);
        assert_eq!(names[0], "Icon-20");
        assert_eq!(names[13], "Icon-60@2x");
        assert_eq!(names[21], "iTunesArtwork@2x");
        assert_eq!(t.items()[21].width, 1024);
    }

    #[test]
    fn ios_names_are_unique() {
        let names = resolved_names(&ios());
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn android_first_item_uses_fallback() {
        let t = android();
        assert_eq!(t.items().len(), 6);
        assert_eq!(t.items()[0].naming_pattern, None);
        assert_eq!(
            resolved_names(&t),
            vec![
                "drawable/icon",
                "drawable-hdpi/icon",
                "drawable-mdpi/icon",
                "drawable-xhdpi/icon",
                "drawable-xxhdpi/icon",
                "drawable-xxxhdpi/icon",
            ]
        );
    }

    #[test]
    fn presets_survive_xml() {
        for preset in all() {
            let xml = preset.to_xml().unwrap();
            assert_eq!(ExportTemplate::from_xml(&xml).unwrap(), preset);
        }
    }
}
