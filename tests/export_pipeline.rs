//! End-to-end tests through the public API: real PNG files, templates saved
//! to and loaded from disk, and the `image`-crate codec.

use icolib::export::{IconExporter, ItemError};
use icolib::imaging::{Channels, Color, ImageCodec, Operation, RustBackend, process_file};
use icolib::presets;
use icolib::template::{ExportTemplate, Item, TemplateStore};
use std::path::Path;
use tempfile::TempDir;

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255])
    });
    img.save(path).unwrap();
}

#[test]
fn gen_templates_then_export_ios() {
    let tmp = TempDir::new().unwrap();
    let store = TemplateStore::new(tmp.path().join("templates"));
    for preset in presets::all() {
        store.save(&preset).unwrap();
    }
    let source = tmp.path().join("logo.png");
    write_png(&source, 64, 64);

    let template = store.load("iOS").unwrap();
    let report = IconExporter::new(&template)
        .export_icons(&source, &tmp.path().join("output"))
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.items.len(), 22);

    let backend = RustBackend::new();
    let ios = tmp.path().join("output/iOS");
    for (name, side) in [
        ("Icon-20.png", 20),
        ("Icon-20@2x.png", 40),
        ("Icon-60@3x.png", 180),
        ("iTunesArtwork@2x.png", 1024),
    ] {
        let decoded = backend.decode(&ios.join(name)).unwrap();
        assert_eq!(decoded.dimensions(), (side, side), "{name}");
    }
}

#[test]
fn android_export_uses_density_directories() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("logo.png");
    write_png(&source, 32, 32);

    let template = presets::android();
    let report = IconExporter::new(&template)
        .export_icons(&source, tmp.path())
        .unwrap();

    assert!(report.is_complete());
    for rel in [
        "Android/drawable/icon.png",
        "Android/drawable-hdpi/icon.png",
        "Android/drawable-xxxhdpi/icon.png",
    ] {
        assert!(tmp.path().join(rel).is_file(), "{rel} missing");
    }
}

#[test]
fn partial_failure_writes_the_other_items() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("logo.png");
    write_png(&source, 16, 16);
    let template = ExportTemplate::new("Partial", "out", "icon-%w")
        .with_item(Item::square(8, None))
        .with_item(Item::new(0, 8, Some("zero")))
        .with_item(Item::square(12, None));

    let report = IconExporter::new(&template)
        .export_icons(&source, tmp.path())
        .unwrap();

    assert_eq!(report.succeeded(), 2);
    assert!(matches!(
        report.items[1].result,
        Err(ItemError::InvalidDimensions { .. })
    ));
    assert!(tmp.path().join("out/icon-8.png").is_file());
    assert!(!tmp.path().join("out/zero.png").exists());
    assert!(tmp.path().join("out/icon-12.png").is_file());
}

#[test]
fn export_of_missing_source_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let template = presets::ios();
    let result =
        IconExporter::new(&template).export_icons(&tmp.path().join("nope.png"), tmp.path());
    assert!(result.is_err());
    assert!(!tmp.path().join("iOS").exists());
}

#[test]
fn template_file_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("custom.xml");
    let template = ExportTemplate::new("Custom", "Web", "favicon-%wx%h")
        .with_item(Item::square(16, None))
        .with_item(Item::new(180, 180, Some("apple-touch-icon")));

    template.save(&path).unwrap();
    assert_eq!(ExportTemplate::load(&path).unwrap(), template);
}

#[test]
fn invert_channels_file() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("logo.png");
    write_png(&source, 4, 4);

    let written = process_file(
        &RustBackend::new(),
        &source,
        &tmp.path().join("inverted.jpg"),
        &Operation::InvertChannels(Channels::R | Channels::B),
    )
    .unwrap();

    assert_eq!(written, tmp.path().join("inverted.png"));
    let pixel = RustBackend::new().decode(&written).unwrap().get(1, 2).unwrap();
    assert_eq!(pixel, Color::argb(255, 255 - 4, 8, 127));
}
