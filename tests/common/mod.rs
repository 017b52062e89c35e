//! Synthetic DXD/DXZ fixtures written under the system temp dir.
#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Unique per test process so parallel test binaries never collide.
pub fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dxd_reader_tests_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir.join(name)
}

pub fn write_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = temp_path(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

pub fn write_zip(name: &str, members: &[(&str, &[u8])]) -> PathBuf {
    let path = temp_path(name);
    let file = File::create(&path).expect("create archive");
    let mut zip = ZipWriter::new(file);
    for (member, bytes) in members {
        zip.start_file(*member, SimpleFileOptions::default())
            .expect("start member");
        zip.write_all(bytes).expect("write member");
    }
    zip.finish().expect("finish archive");
    path
}

/// `<Setup>` block naming one channel per data type entry.
pub fn setup_xml(channels: &[(&str, &str, f64)]) -> Vec<u8> {
    let mut xml = String::from("<?xml version=\"1.0\"?><Setup><Channels>");
    for (name, data_type, rate) in channels {
        xml.push_str(&format!(
            "<Channel Name=\"{}\" SampleRate=\"{}\" Unit=\"g\" DataType=\"{}\"/>",
            name, rate, data_type
        ));
    }
    xml.push_str("</Channels></Setup>");
    xml.into_bytes()
}

/// Row-major interleaved payload; sample `s` of channel `c` is `s * 10 + c`.
pub fn interleaved_payload(samples: usize, channels: usize, data_type: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for s in 0..samples {
        for c in 0..channels {
            let v = (s * 10 + c) as i64;
            match data_type {
                "int16" => out.write_i16::<LittleEndian>(v as i16).unwrap(),
                "int32" => out.write_i32::<LittleEndian>(v as i32).unwrap(),
                "float32" => out.write_f32::<LittleEndian>(v as f32).unwrap(),
                "float64" => out.write_f64::<LittleEndian>(v as f64).unwrap(),
                other => panic!("unsupported fixture type {other}"),
            }
        }
    }
    out
}

/// Setup block for `names` followed by an interleaved int16 payload.
pub fn structured_recording(names: &[&str], samples: usize) -> Vec<u8> {
    let channels: Vec<_> = names.iter().map(|n| (*n, "int16", 2000.0)).collect();
    let mut bytes = setup_xml(&channels);
    bytes.extend(interleaved_payload(samples, names.len(), "int16"));
    bytes
}
