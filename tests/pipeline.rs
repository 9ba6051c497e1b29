// SPDX-License-Identifier: MIT OR Apache-2.0

use image::{GrayImage, ImageFormat, Luma};
use libfusion::prelude::*;
use ndarray::Array2;
use std::path::Path;

/// Integer-valued 64x64 test scene: gradient plus sine texture.
fn base_scene() -> Array2<f32> {
    Array2::from_shape_fn((64, 64), |(r, c)| {
        let x = c as f32;
        let y = r as f32;
        let value = 110.0 + 70.0 * (0.31 * x).sin() + 40.0 * (0.47 * y).cos() + 0.3 * (x - y);
        value.round().clamp(0.0, 255.0)
    })
}

/// Deterministic noise via a simple LCG, uniform-ish in [-amplitude, amplitude].
fn noisy_scene(seed: u64, amplitude: f32) -> Array2<f32> {
    let mut lcg = seed;
    base_scene().mapv(|value| {
        lcg = lcg.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let uniform = ((lcg >> 32) as f32) / (u32::MAX as f32) * 2.0 - 1.0;
        (value + uniform * amplitude).round().clamp(0.0, 255.0)
    })
}

fn write_gray_png(image: &Array2<f32>, path: &Path) {
    let (rows, cols) = image.dim();
    let gray = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([image[[y as usize, x as usize]] as u8])
    });
    gray.save_with_format(path, ImageFormat::Png).unwrap();
}

fn high_pass_energy(decomposition: &Decomposition) -> f64 {
    decomposition
        .high_pass_levels()
        .iter()
        .flat_map(|level| level.iter())
        .map(|coefficient| f64::from(coefficient.norm_sqr()))
        .sum()
}

#[test]
fn both_methods_produce_a_64x64_png() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.png");
    let second = dir.path().join("second.png");
    write_gray_png(&noisy_scene(11, 10.0), &first);
    write_gray_png(&noisy_scene(97, 10.0), &second);

    for method in [MergeMethod::Mean, MergeMethod::SeparatePhase] {
        let output = dir.path().join(format!("fused_{}.png", method.name()));
        let options = FusionOptions {
            method,
            ..FusionOptions::default()
        };
        run(&output, &[first.clone(), second.clone()], &options).unwrap();

        let fused = image::open(&output).unwrap();
        assert_eq!(fused.color(), image::ColorType::Rgb8);
        let fused = fused.to_rgb8();
        assert_eq!(fused.dimensions(), (64, 64));
    }
}

#[test]
fn separate_phase_preserves_at_least_as_much_detail_as_mean() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.png");
    let second = dir.path().join("second.png");
    write_gray_png(&noisy_scene(3, 12.0), &first);
    write_gray_png(&noisy_scene(71, 12.0), &second);

    let options = FusionOptions::default();
    let frames = vec![
        load_frame(&first, options.level_count, options.filters).unwrap(),
        load_frame(&second, options.level_count, options.filters).unwrap(),
    ];

    let mean_energy = high_pass_energy(&merge(&frames, MergeMethod::Mean).unwrap());
    let phase_energy = high_pass_energy(&merge(&frames, MergeMethod::SeparatePhase).unwrap());

    assert!(
        phase_energy >= mean_energy,
        "separate_phase energy {phase_energy} should not fall below mean energy {mean_energy}"
    );
}

#[test]
fn fusing_identical_copies_reproduces_the_frame() {
    let dir = tempfile::tempdir().unwrap();
    let frame_path = dir.path().join("frame.png");
    let scene = base_scene();
    write_gray_png(&scene, &frame_path);

    for method in [MergeMethod::Mean, MergeMethod::SeparatePhase] {
        let output = dir.path().join(format!("self_{}.png", method.name()));
        let options = FusionOptions {
            method,
            ..FusionOptions::default()
        };
        run(&output, &[frame_path.clone(), frame_path.clone()], &options).unwrap();

        let fused = image::open(&output).unwrap().to_rgb8();
        for (r, row) in scene.outer_iter().enumerate() {
            for (c, &expected) in row.iter().enumerate() {
                let got = f32::from(fused.get_pixel(c as u32, r as u32).0[0]);
                // Reconstruction drift of well under one grey level may
                // still flip the truncation by one.
                assert!(
                    (got - expected).abs() <= 1.0,
                    "pixel ({r}, {c}): got {got}, expected {expected}"
                );
            }
        }
    }
}

#[test]
fn merging_a_frame_with_itself_round_trips_through_the_transform() {
    let scene = base_scene();
    let config = FilterConfig::default();

    for method in [MergeMethod::Mean, MergeMethod::SeparatePhase] {
        let frame = forward(&scene, 4, config).unwrap();
        let merged = merge(&[frame.clone(), frame], method).unwrap();
        let reconstructed = inverse(&merged, config);

        for (a, b) in scene.iter().zip(reconstructed.iter()) {
            assert!(
                (a - b).abs() < 1e-2,
                "{} self-merge drifted: {a} vs {b}",
                method.name()
            );
        }
    }
}

#[test]
fn empty_input_list_fails_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.png");

    let err = run(&output, &[], &FusionOptions::default()).unwrap_err();
    assert!(matches!(err, FusionError::NoInputImages));
    assert!(!output.exists(), "no output may be written on failure");
}

#[test]
fn zero_level_count_fails_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.png");
    let missing = dir.path().join("does_not_exist.png");

    let options = FusionOptions {
        level_count: 0,
        ..FusionOptions::default()
    };
    // The input path is unreadable, so reaching the loader would fail with
    // a Load error instead of the expected configuration error.
    let err = run(&output, &[missing], &options).unwrap_err();
    assert!(matches!(err, FusionError::InvalidLevelCount));
    assert!(!output.exists());
}

#[test]
fn unknown_merge_method_fails_fast_with_alternatives() {
    let err = MergeMethod::from_name("sharpest").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("sharpest"));
    assert!(message.contains("mean"));
    assert!(message.contains("separate_phase"));
}

#[test]
fn unreadable_input_aborts_the_run_naming_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.png");
    let good = dir.path().join("good.png");
    let missing = dir.path().join("missing.png");
    write_gray_png(&base_scene(), &good);

    let err = run(&output, &[good, missing.clone()], &FusionOptions::default()).unwrap_err();
    match err {
        FusionError::Load { path, .. } => assert_eq!(path, missing),
        other => panic!("expected Load error, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn frames_of_different_sizes_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.png");
    let small = dir.path().join("small.png");
    let large = dir.path().join("large.png");
    write_gray_png(&Array2::from_elem((32, 32), 128.0), &small);
    write_gray_png(&Array2::from_elem((64, 64), 128.0), &large);

    let err = run(&output, &[large, small], &FusionOptions::default()).unwrap_err();
    match err {
        FusionError::ShapeMismatch { frame, .. } => assert_eq!(frame, 1),
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
    assert!(!output.exists());
}
