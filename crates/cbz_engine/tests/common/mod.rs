#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use cbz_engine::{ChannelSink, PipelineEvent};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

/// 8x8 single-colour PNG.
pub fn png_bytes(color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(8, 8, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

pub fn html_page(title: Option<&str>, body: &str) -> String {
    let head = title
        .map(|t| format!("<title>{t}</title>"))
        .unwrap_or_default();
    format!("<!DOCTYPE html><html><head>{head}</head><body>{body}</body></html>")
}

pub async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

pub async fn mount_image(server: &MockServer, route: &str, bytes: Vec<u8>, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(bytes, "image/png")
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

pub fn channel_sink() -> (Arc<ChannelSink>, mpsc::Receiver<PipelineEvent>) {
    let (tx, rx) = mpsc::channel();
    (Arc::new(ChannelSink::new(tx)), rx)
}

/// `(entry name, bytes)` in archive order.
pub fn archive_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            (entry.name().to_string(), bytes)
        })
        .collect()
}

/// Mean RGB of a decoded image.
pub fn mean_rgb(bytes: &[u8]) -> [u8; 3] {
    let img = image::load_from_memory(bytes).unwrap().to_rgb8();
    let count = u64::from(img.width()) * u64::from(img.height());
    let mut sums = [0u64; 3];
    for pixel in img.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel);
        }
    }
    sums.map(|sum| (sum / count) as u8)
}

pub fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
