//! Test utilities shared by the format test modules

use crate::pak::{BuilderChunk, PakBuilder, compress_zlib};

/// Compress `data` as one zlib stream
pub fn zlib(data: &[u8]) -> Vec<u8> {
    compress_zlib(data).expect("zlib compression")
}

/// Directive line in the field order the parser expects
pub fn directive_line(name: &str, image: u32, x: i32, y: i32, w: u32, h: u32, rotation: u8) -> String {
    format!("{name} {image} 0 0 0 0 {x} {y} {w} {h} {rotation} 0")
}

/// Archive with one entry per `(id, directive, chunks)` triple
pub fn build_archive(entries: Vec<(&str, String, Vec<BuilderChunk>)>) -> Vec<u8> {
    let mut builder = PakBuilder::new();
    for (id, directive, chunks) in entries {
        builder = builder.add_entry(id, &directive, chunks).expect("add entry");
    }
    builder.build().expect("build archive")
}
