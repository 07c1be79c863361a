//! Perceptual hash store (C1): thumbnail decoding, variant generation, and
//! the pHash transform itself.

use std::f64::consts::PI;

use image::{imageops, DynamicImage, GenericImageView, ImageBuffer, Luma};
use tracing::debug;

/// A 64-bit perceptual hash (hash_size=8 ⇒ 8×8 bits).
pub type PHash = u64;

/// Read-only contract C1 exposes to the rest of the pipeline: an ordered
/// list of hashes for an entry key, in match-priority order.
pub trait HashStore {
    fn hashes_of(&self, entry_key: &str) -> Vec<PHash>;
}

/// An in-memory store, useful for tests and for seeding C3 in isolation.
#[derive(Debug, Default, Clone)]
pub struct MemoryHashStore {
    entries: std::collections::HashMap<String, Vec<PHash>>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry_key: impl Into<String>, hashes: Vec<PHash>) {
        self.entries.insert(entry_key.into(), hashes);
    }
}

impl HashStore for MemoryHashStore {
    fn hashes_of(&self, entry_key: &str) -> Vec<PHash> {
        self.entries.get(entry_key).cloned().unwrap_or_default()
    }
}

/// Produces the ordered, de-duplicated list of hashes for one entry's raw
/// thumbnail blobs (§4.2). An undecodable thumbnail simply contributes no
/// images; if every thumbnail is undecodable the entry is an orphan.
pub fn entry_hashes(thumbnails: &[Vec<u8>]) -> Vec<PHash> {
    let mut ordered = Vec::new();
    for data in thumbnails {
        match image::load_from_memory(data) {
            Ok(image) => {
                for variant in candidate_images(&image) {
                    ordered.push(phash(&variant, 8));
                }
            }
            Err(err) => {
                debug!(%err, "undecodable thumbnail, entry becomes an orphan for this image");
            }
        }
    }
    deduplicate_preserving_order(ordered)
}

fn deduplicate_preserving_order(hashes: Vec<PHash>) -> Vec<PHash> {
    let mut seen = std::collections::HashSet::new();
    hashes.into_iter().filter(|h| seen.insert(*h)).collect()
}

/// Generates the ordered variant list described in §4.2: original, an
/// optional border-trimmed copy, then left-half/rotated copies of every
/// landscape image produced so far.
fn candidate_images(original: &DynamicImage) -> Vec<DynamicImage> {
    let mut images = vec![original.clone()];
    if let Some(trimmed) = trim_border(original) {
        images.push(trimmed);
    }

    let mut extra = Vec::new();
    for image in &images {
        let (width, height) = image.dimensions();
        if width > height {
            extra.push(image.crop_imm(0, 0, width / 2, height));
            extra.push(image.rotate90());
            extra.push(image.rotate270());
        }
    }
    images.append(&mut extra);
    images
}

/// Crops to the bounding box of pixels differing from the background color
/// sampled at `(0, 0)`, provided that box is non-empty and strictly smaller
/// than the original image.
fn trim_border(image: &DynamicImage) -> Option<DynamicImage> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let background = *rgb.get_pixel(0, 0);

    let (mut min_x, mut min_y) = (width, height);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut any = false;

    for y in 0..height {
        for x in 0..width {
            let pixel = rgb.get_pixel(x, y);
            if pixel != &background {
                any = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    if !any {
        return None;
    }

    let box_width = max_x - min_x + 1;
    let box_height = max_y - min_y + 1;
    if box_width >= width && box_height >= height {
        return None;
    }

    Some(image.crop_imm(min_x, min_y, box_width, box_height))
}

/// The pHash transform (§4.2.1): greyscale, resize to `hash_size *
/// highfreq_factor`, 2-D DCT-II, take the top-left `hash_size × hash_size`
/// block, threshold against the median of its non-DC coefficients.
pub fn phash(image: &DynamicImage, hash_size: u32) -> PHash {
    const HIGHFREQ_FACTOR: u32 = 4;
    let side = hash_size * HIGHFREQ_FACTOR;

    let grey: ImageBuffer<Luma<u8>, Vec<u8>> = imageops::resize(
        &image.to_luma8(),
        side,
        side,
        imageops::FilterType::Lanczos3,
    );

    let samples: Vec<Vec<f64>> = (0..side as usize)
        .map(|y| (0..side as usize).map(|x| grey.get_pixel(x as u32, y as u32).0[0] as f64).collect())
        .collect();

    let low_freq = dct_2d_low_freq(&samples, hash_size as usize);

    let mut coefficients: Vec<f64> = Vec::with_capacity((hash_size * hash_size) as usize);
    for row in &low_freq {
        coefficients.extend_from_slice(row);
    }

    let mut non_dc: Vec<f64> = coefficients[1..].to_vec();
    non_dc.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = median_of_sorted(&non_dc);

    let mut bits: u64 = 0;
    for (i, &value) in coefficients.iter().enumerate() {
        if value > median {
            bits |= 1 << (63 - i);
        }
    }
    bits
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Unnormalised 1-D DCT-II, the first `k_max` coefficients only.
fn dct_1d_first_k(input: &[f64], k_max: usize) -> Vec<f64> {
    let n = input.len();
    (0..k_max)
        .map(|k| {
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n as f64)).cos())
                .sum();
            2.0 * sum
        })
        .collect()
}

/// The top-left `size × size` block of the 2-D DCT-II of `samples`.
fn dct_2d_low_freq(samples: &[Vec<f64>], size: usize) -> Vec<Vec<f64>> {
    let n = samples.len();

    // Transform each column, keeping only the first `size` coefficients.
    let mut column_pass = vec![vec![0.0; n]; size];
    for x in 0..n {
        let column: Vec<f64> = (0..n).map(|y| samples[y][x]).collect();
        let transformed = dct_1d_first_k(&column, size);
        for (k, value) in transformed.into_iter().enumerate() {
            column_pass[k][x] = value;
        }
    }

    // Transform each resulting row, keeping only the first `size` coefficients.
    column_pass
        .into_iter()
        .map(|row| dct_1d_first_k(&row, size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn solid_image_has_no_trim() {
        let image = solid(16, 16, [10, 10, 10]);
        assert!(trim_border(&image).is_none());
    }

    #[test]
    fn trims_to_the_non_background_region() {
        let mut img = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
        for y in 4..8 {
            for x in 4..8 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let trimmed = trim_border(&DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(trimmed.dimensions(), (4, 4));
    }

    #[test]
    fn landscape_images_gain_half_and_rotation_variants() {
        let image = solid(20, 10, [0, 128, 255]);
        let variants = candidate_images(&image);
        // original + left-half + rotate90 + rotate270 (no trim: solid image)
        assert_eq!(variants.len(), 4);
    }

    #[test]
    fn portrait_images_only_get_the_original() {
        let image = solid(10, 20, [0, 128, 255]);
        let variants = candidate_images(&image);
        assert_eq!(variants.len(), 1);
    }

    #[test]
    fn phash_is_stable_for_the_same_image() {
        let image = solid(32, 32, [10, 20, 30]);
        assert_eq!(phash(&image, 8), phash(&image, 8));
    }

    #[test]
    fn distinct_images_usually_hash_differently() {
        let a = solid(32, 32, [0, 0, 0]);
        let mut img = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
        for y in 0..32 {
            for x in 0..32 {
                if (x + y) % 2 == 0 {
                    img.put_pixel(x, y, Rgb([255, 255, 255]));
                }
            }
        }
        let b = DynamicImage::ImageRgb8(img);
        assert_ne!(phash(&a, 8), phash(&b, 8));
    }

    #[test]
    fn entry_hashes_dedup_preserving_order() {
        assert_eq!(
            deduplicate_preserving_order(vec![1, 2, 1, 3, 2]),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn undecodable_thumbnail_yields_no_hashes() {
        let hashes = entry_hashes(&[vec![0u8, 1, 2, 3]]);
        assert!(hashes.is_empty());
    }
}
