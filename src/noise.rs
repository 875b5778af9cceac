//! Improved Perlin noise and the images derived from it.
//!
//! [`PerlinNoise`] implements Ken Perlin's improved gradient noise over a
//! seeded permutation table. Values are remapped to `[0, 1]` so they can be
//! used directly as heights or grey levels.

use std::path::Path;

use anyhow::Context as _;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Size of the noise image written by [`PerlinNoise::save_noise_image`].
pub const NOISE_IMAGE_SIZE: u32 = 512;

#[derive(Clone, Debug)]
pub struct PerlinNoise {
    // 0..256 shuffled, then repeated once so `p[i + 1]` never needs wrapping.
    p: Vec<usize>,
    seed: u64,
}

impl PerlinNoise {
    pub fn new(seed: u64) -> Self {
        let mut p: Vec<usize> = (0..256).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        p.shuffle(&mut rng);
        p.extend_from_within(..);
        Self { p, seed }
    }

    /// Seed from the wall clock.
    pub fn from_entropy() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Gradient noise at `(x, y, z)`, in `[0, 1]`.
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let p = &self.p;
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let zi = (z.floor() as i64 & 255) as usize;

        let x = x - x.floor();
        let y = y - y.floor();
        let z = z - z.floor();

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let a = p[xi] + yi;
        let aa = p[a] + zi;
        let ab = p[a + 1] + zi;
        let b = p[xi + 1] + yi;
        let ba = p[b] + zi;
        let bb = p[b + 1] + zi;

        let res = lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z)),
                lerp(u, grad(p[ab], x, y - 1.0, z), grad(p[bb], x - 1.0, y - 1.0, z)),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa + 1], x, y, z - 1.0),
                    grad(p[ba + 1], x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(p[ab + 1], x, y - 1.0, z - 1.0),
                    grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );
        ((res + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Sum of `octaves` noise layers, each at double the frequency and
    /// `persistence` times the amplitude of the previous one.
    pub fn fbm(&self, x: f64, y: f64, z: f64, octaves: u32, persistence: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;
        for _ in 0..octaves.max(1) {
            total += self.noise(x * frequency, y * frequency, z * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }
        total / max_value
    }

    /// Greyscale RGB image of `noise(x / w * frequency, y / h * frequency, 0)`.
    pub fn noise_image(&self, width: u32, height: u32, frequency: f64) -> image::RgbImage {
        image::RgbImage::from_fn(width, height, |x, y| {
            let value = self.noise(
                x as f64 / width as f64 * frequency,
                y as f64 / height as f64 * frequency,
                0.0,
            );
            let grey = (value * 255.0) as u8;
            image::Rgb([grey, grey, grey])
        })
    }

    /// Writes the 512x512 noise image as a JPEG and as raw RGB bytes.
    pub fn save_noise_image(
        &self,
        jpg_path: impl AsRef<Path>,
        raw_path: impl AsRef<Path>,
    ) -> anyhow::Result<image::RgbImage> {
        let img = self.noise_image(NOISE_IMAGE_SIZE, NOISE_IMAGE_SIZE, 1.0);
        let (min, max) = img
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), px| (lo.min(px[0]), hi.max(px[0])));
        log::debug!("noise image range: {min}..={max}");

        let jpg_path = jpg_path.as_ref();
        let file = std::fs::File::create(jpg_path)
            .with_context(|| format!("creating {}", jpg_path.display()))?;
        let mut writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, 100)
            .encode_image(&img)
            .with_context(|| format!("encoding {}", jpg_path.display()))?;

        let raw_path = raw_path.as_ref();
        std::fs::write(raw_path, img.as_raw())
            .with_context(|| format!("writing {}", raw_path.display()))?;
        Ok(img)
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of `(x, y, z)` with one of 12 cube-edge gradients picked by
/// the low four bits of `hash`.
pub fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}
