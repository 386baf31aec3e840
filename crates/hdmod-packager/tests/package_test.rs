#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests writing complete mod trees and reading them back

use std::io::Read;
use std::path::Path;

use hdmod_formats::tables::AlignmentTable;
use hdmod_formats::{CanonicalName, Scale};
use hdmod_packager::{
    AnimationManifest, BundleKey, CONTENT_FILE, ModBundle, ModDescriptor, ModPackager,
    PackageError,
};
use hdmod_sprites::FrameAsset;
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;

const TABLE: &str = "\
defname;imagename;group;frame;left_margin;top_margin;full_width;full_height
AVWMINE;AVWMINE1;0;1;0;0;4;4
AVWMINE;AVWMINE0;0;0;0;0;4;4
";

fn frame(group: &str, name: &str, shade: u8) -> FrameAsset {
    FrameAsset {
        group: CanonicalName::new(group),
        name: CanonicalName::new(name),
        pixels: RgbaImage::from_pixel(4, 4, Rgba([shade, shade, shade, 255])),
        shadow: None,
    }
}

fn bundles(scale: Scale) -> (ModBundle, ModBundle) {
    let table = AlignmentTable::from_reader(TABLE.as_bytes()).unwrap();

    let mut common = ModBundle::new(BundleKey { scale, localized: false });
    // Insertion order differs from archive order on purpose
    common.add_bitmap(&frame("BITMAPS", "TPMAGE", 9)).unwrap();
    common.add_bitmap(&frame("BITMAPS", "ADVMAP", 3)).unwrap();
    common
        .add_sprite_group(
            &CanonicalName::new("AVWMINE"),
            &[frame("AVWMINE", "AVWMINE1", 1), frame("AVWMINE", "AVWMINE0", 2)],
            &[],
            table.group("AVWMINE"),
        )
        .unwrap();

    let mut localized = ModBundle::new(BundleKey { scale, localized: true });
    localized.add_bitmap(&frame("BITMAPS", "GAMSELBK", 5)).unwrap();
    localized.add_bitmap(&frame("BITMAPS", "CAMPBACK", 6)).unwrap();
    (common, localized)
}

fn zip_members(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).unwrap();
            (file.name().to_string(), bytes)
        })
        .collect()
}

#[test]
fn writes_sorted_members_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let packager = ModPackager::new(dir.path(), "FR").unwrap();
    let (common, localized) = bundles(Scale::X2);
    packager
        .write_scale(Scale::X2, &common, &localized, || false)
        .unwrap();

    let members = zip_members(&packager.scale_dir(Scale::X2).join(CONTENT_FILE));
    let names: Vec<_> = members.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "data2x/ADVMAP.png",
            "data2x/TPMAGE.png",
            "sprites2x/AVWMINE.json",
            "sprites2x/AVWMINE/AVWMINE0.png",
            "sprites2x/AVWMINE/AVWMINE1.png",
        ]
    );

    let manifest: AnimationManifest = serde_json::from_slice(&members[2].1).unwrap();
    assert_eq!(manifest.basepath, "AVWMINE/");
    let files: Vec<_> = manifest.images.iter().map(|i| i.file.as_str()).collect();
    assert_eq!(files, vec!["AVWMINE0.png", "AVWMINE1.png"]);

    let translation = packager.translation_dir(Scale::X2);
    assert!(translation.ends_with("x2_translation_fr"));
    let localized_names: Vec<_> = zip_members(&translation.join(CONTENT_FILE))
        .into_iter()
        .map(|(n, _)| n)
        .collect();
    assert_eq!(localized_names, vec!["data2x/CAMPBACK.png".to_string()]);

    let descriptor: ModDescriptor =
        serde_json::from_slice(&std::fs::read(translation.join("mod.json")).unwrap()).unwrap();
    assert_eq!(descriptor.name, "HD Localisation (french) (x2)");
    assert_eq!(descriptor.language.as_deref(), Some("french"));
}

#[test]
fn reruns_are_byte_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    for dir in [first.path(), second.path()] {
        let packager = ModPackager::new(dir, "RU").unwrap();
        let (common, localized) = bundles(Scale::X3);
        packager
            .write_scale(Scale::X3, &common, &localized, || false)
            .unwrap();
    }

    for relative in [
        "hd_version/mod.json",
        "hd_version/mods/x3/mod.json",
        "hd_version/mods/x3/content.zip",
        "hd_version/mods/x3_translation_ru/content.zip",
    ] {
        let a = std::fs::read(first.path().join(relative)).unwrap();
        let b = std::fs::read(second.path().join(relative)).unwrap();
        assert!(a == b, "{relative} differs between runs");
    }
}

#[test]
fn unknown_locale_is_rejected_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let result = ModPackager::new(dir.path(), "XX");
    assert!(matches!(result, Err(PackageError::UnknownLocale(_))));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
