use scene_sandbox::noise::{NOISE_IMAGE_SIZE, PerlinNoise, fade, grad, lerp};

#[test]
fn same_seed_gives_same_noise() {
    let a = PerlinNoise::new(42);
    let b = PerlinNoise::new(42);
    for i in 0..50 {
        let (x, y, z) = (i as f64 * 0.37, i as f64 * 0.11, 0.5);
        assert_eq!(a.noise(x, y, z), b.noise(x, y, z));
    }
}

#[test]
fn different_seeds_differ_somewhere() {
    let a = PerlinNoise::new(1);
    let b = PerlinNoise::new(2);
    let differs = (0..100).any(|i| {
        let x = i as f64 * 0.173 + 0.05;
        a.noise(x, x * 0.5, 0.25) != b.noise(x, x * 0.5, 0.25)
    });
    assert!(differs);
}

#[test]
fn noise_stays_in_unit_range() {
    let noise = PerlinNoise::new(7);
    for x in 0..40 {
        for y in 0..40 {
            let v = noise.noise(x as f64 * 0.13, y as f64 * 0.29, 1.7);
            assert!((0.0..=1.0).contains(&v), "noise {v} out of range");
        }
    }
}

#[test]
fn noise_is_one_half_on_lattice_points() {
    let noise = PerlinNoise::new(99);
    for (x, y, z) in [(0.0, 0.0, 0.0), (3.0, 5.0, 1.0), (-2.0, 7.0, 4.0)] {
        assert!((noise.noise(x, y, z) - 0.5).abs() < 1e-12);
    }
}

#[test]
fn fbm_stays_in_unit_range() {
    let noise = PerlinNoise::new(3);
    for i in 0..100 {
        let v = noise.fbm(i as f64 * 0.07, i as f64 * 0.03, 0.5, 4, 0.5);
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn fade_and_lerp_hit_their_endpoints() {
    assert_eq!(fade(0.0), 0.0);
    assert_eq!(fade(1.0), 1.0);
    assert!((fade(0.5) - 0.5).abs() < 1e-12);
    assert_eq!(lerp(0.0, 2.0, 6.0), 2.0);
    assert_eq!(lerp(1.0, 2.0, 6.0), 6.0);
    assert_eq!(lerp(0.25, 2.0, 6.0), 3.0);
}

#[test]
fn grad_picks_edge_gradients() {
    // h = 0: x + y
    assert_eq!(grad(0, 1.0, 2.0, 3.0), 3.0);
    // h = 1: -x + y
    assert_eq!(grad(1, 1.0, 2.0, 3.0), 1.0);
    // h = 12: y + x
    assert_eq!(grad(12, 1.0, 2.0, 3.0), 3.0);
    // only the low four bits count
    assert_eq!(grad(16, 1.0, 2.0, 3.0), grad(0, 1.0, 2.0, 3.0));
}

#[test]
fn noise_image_has_requested_size_and_grey_pixels() {
    let noise = PerlinNoise::new(11);
    let image = noise.noise_image(32, 16, 1.0);
    assert_eq!(image.dimensions(), (32, 16));
    for pixel in image.pixels() {
        assert_eq!(pixel[0], pixel[1]);
        assert_eq!(pixel[1], pixel[2]);
    }
}

#[test]
fn save_noise_image_writes_jpeg_and_raw_bytes() {
    let dir = std::env::temp_dir().join(format!("scene-sandbox-noise-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let jpg = dir.join("noise.jpg");
    let raw = dir.join("noise.raw");

    let image = PerlinNoise::new(5)
        .save_noise_image(&jpg, &raw)
        .expect("noise image saved");

    assert_eq!(image.dimensions(), (NOISE_IMAGE_SIZE, NOISE_IMAGE_SIZE));
    let raw_bytes = std::fs::read(&raw).expect("raw file");
    assert_eq!(raw_bytes.len(), (NOISE_IMAGE_SIZE * NOISE_IMAGE_SIZE * 3) as usize);
    let decoded = image::open(&jpg).expect("jpeg decodes");
    assert_eq!(decoded.width(), NOISE_IMAGE_SIZE);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn save_noise_image_reports_unwritable_paths() {
    let missing = std::path::Path::new("/nonexistent-dir-for-sure/noise.jpg");
    let result = PerlinNoise::new(5).save_noise_image(missing, missing.with_extension("raw"));
    assert!(result.is_err());
}
