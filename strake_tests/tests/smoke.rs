// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End to end rasterization checks on frames small enough to reason about
//! pixel by pixel.

use strake::peniko::Color;
use strake::{LineStyle, ViewTransform};
use strake_tests::{render_lines_sync, RenderedImage, TestLine, TestParams};

/// A thickness 0.25 band around `y = 0` covers a quarter of the clip square,
/// i.e. an eighth of the texture rows, and its edges land exactly on pixel
/// boundaries of a 64x64 target.
fn assert_red_band(image: &RenderedImage) {
    let mut red_count = 0;
    let mut black_count = 0;
    for pixel in image.data.chunks_exact(4) {
        let &[r, g, b, a] = pixel else { unreachable!() };
        let is_red = r == 255 && g == 0 && b == 0 && a == 255;
        let is_black = r == 0 && g == 0 && b == 0 && a == 255;
        match (is_red, is_black) {
            (true, false) => red_count += 1,
            (false, true) => black_count += 1,
            _ => panic!("Got unexpected pixel {pixel:?}"),
        }
    }
    assert_eq!(red_count, 64 * 8);
    assert_eq!(black_count, 64 * 64 - 64 * 8);
}

fn red_band_line() -> TestLine {
    TestLine::new(
        [-1.0, 1.0],
        [0.0, 0.0],
        LineStyle::new(Color::RED).with_thickness(0.25),
    )
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn horizontal_band() {
    let params = TestParams::new("horizontal_band", 64, 64);
    let image = render_lines_sync(&[red_band_line()], &params).unwrap();
    assert_red_band(&image);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn horizontal_band_msaa() {
    // The band edges lie on pixel boundaries, so multisampling must resolve
    // to the same frame as the single sample render.
    let params = TestParams {
        sample_count: 4,
        ..TestParams::new("horizontal_band_msaa", 64, 64)
    };
    let image = render_lines_sync(&[red_band_line()], &params).unwrap();
    assert_red_band(&image);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn viewed_band() {
    // The same band, but described in data coordinates and mapped onto clip
    // space by the view transform.
    let params = TestParams {
        view: Some(ViewTransform::new([0.2, 1.0], [-1.0, 0.0])),
        ..TestParams::new("viewed_band", 64, 64)
    };
    let line = TestLine::new(
        [0.0, 10.0],
        [0.0, 0.0],
        LineStyle::new(Color::RED).with_thickness(0.25),
    );
    let image = render_lines_sync(&[line], &params).unwrap();
    assert_red_band(&image);
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn clear_only() {
    let color = Color::PLUM;
    let params = TestParams {
        base_color: color,
        ..TestParams::new("clear_only", 64, 64)
    };
    let image = render_lines_sync(&[], &params).unwrap();
    for pixel in image.data.chunks_exact(4) {
        let &[r, g, b, a] = pixel else { unreachable!() };
        let image_color = Color::rgba8(r, g, b, a);
        if image_color != color {
            panic!("Got {image_color:?}, expected clear colour {color:?}");
        }
    }
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn single_point_is_skipped() {
    // A one point polyline has no segment to draw; the frame stays clear.
    let line = TestLine::new(
        [0.0],
        [0.0],
        LineStyle::new(Color::RED).with_thickness(1.0),
    );
    let params = TestParams::new("single_point_is_skipped", 64, 64);
    let image = render_lines_sync(&[line], &params).unwrap();
    for pixel in image.data.chunks_exact(4) {
        let &[r, g, b, a] = pixel else { unreachable!() };
        assert_eq!([r, g, b, a], [0, 0, 0, 255]);
    }
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn later_lines_draw_on_top() {
    let wide_red = TestLine::new(
        [-1.0, 1.0],
        [0.0, 0.0],
        LineStyle::new(Color::RED).with_thickness(0.5),
    );
    let narrow_blue = TestLine::new(
        [-1.0, 1.0],
        [0.0, 0.0],
        LineStyle::new(Color::BLUE).with_thickness(0.25),
    );
    let params = TestParams::new("later_lines_draw_on_top", 64, 64);
    let image = render_lines_sync(&[wide_red, narrow_blue], &params).unwrap();
    // Inside the narrow band only the later line shows.
    assert_eq!(image.pixel(32, 30), [0, 0, 255, 255]);
    // Between the band edges the wide line shows through.
    assert_eq!(image.pixel(32, 26), [255, 0, 0, 255]);
}
