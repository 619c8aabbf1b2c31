// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnostic overlay geometry and drawing for vertical float gauges
//!
//! Geometry is computed first ([`GaugeOverlay::compute`]) so the pixel rows
//! can be checked without decoding an image; [`GaugeOverlay::draw`] then
//! paints it onto an RGB buffer.

use image::{Rgb, RgbImage};

use crate::service::{CamConfig, GaugeMeasurement};

/// Gauge body outline and scale marks
pub const BODY_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Calibration and float lines
pub const MEASURE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Thickness of scale marks and horizontal lines
pub const LINE_WIDTH: u32 = 10;

/// Thickness of the body outline
pub const BOX_LINE_WIDTH: u32 = 3;

/// A horizontal segment at `row`, spanning columns `x0..=x1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HLine {
    pub x0: i64,
    pub x1: i64,
    pub row: i64,
}

/// Everything drawn onto a measured image, in pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeOverlay {
    /// Body outline as `[left, top, right, bottom]`, `None` if off-image
    pub body: Option<[u32; 4]>,
    /// Marks at every 10% of the body height, left of the body
    pub scale_marks: Vec<HLine>,
    pub max_line: HLine,
    pub min_line: HLine,
    pub float_line: HLine,
}

impl GaugeOverlay {
    pub fn compute(
        msr: &GaugeMeasurement,
        cam_config: &CamConfig,
        img_width: u32,
        img_height: u32,
    ) -> Self {
        let w = img_width as f64;
        let h = img_height as f64;
        let body = normalize_box(
            [
                msr.body_left as f64 / w,
                msr.body_top as f64 / h,
                msr.body_right as f64 / w,
                msr.body_bottom as f64 / h,
            ],
            (img_width, img_height),
        );

        // Marks use the inclusive pixel extent of the body
        let mark_height = msr.body_height() as f64 + 1.0;
        let mark_width = 0.1 * (msr.body_width() as f64 + 1.0);
        let mark_x0 = (msr.body_left as f64 - mark_width).round() as i64;
        let scale_marks = (0..=100)
            .step_by(10)
            .map(|perc| HLine {
                x0: mark_x0,
                x1: msr.body_left,
                row: (msr.body_top as f64 + mark_height * perc as f64 / 100.0).round() as i64,
            })
            .collect();

        let height = msr.body_height() as f64;
        let max_row = (msr.body_top as f64 + cam_config.max_perc * height).round() as i64;
        let min_row = (msr.body_bottom as f64 - cam_config.min_perc * height).round() as i64;

        Self {
            body,
            scale_marks,
            max_line: HLine {
                x0: msr.body_left,
                x1: msr.body_right,
                row: max_row,
            },
            min_line: HLine {
                x0: msr.body_left,
                x1: msr.body_right,
                row: min_row,
            },
            float_line: HLine {
                x0: msr.body_left,
                x1: msr.body_right,
                row: msr.float_top,
            },
        }
    }

    pub fn draw(&self, img: &mut RgbImage) {
        if let Some(body) = self.body {
            draw_rect(img, body, BODY_COLOR, BOX_LINE_WIDTH);
        }
        for mark in &self.scale_marks {
            draw_hline(img, *mark, BODY_COLOR, LINE_WIDTH);
        }
        draw_hline(img, self.max_line, MEASURE_COLOR, LINE_WIDTH);
        draw_hline(img, self.min_line, MEASURE_COLOR, LINE_WIDTH);
        draw_hline(img, self.float_line, MEASURE_COLOR, LINE_WIDTH);
    }
}

/// Scale a box from 0..1 space into pixel coordinates, clamped to image bounds
pub fn normalize_box(bbox_norm: [f64; 4], dims: (u32, u32)) -> Option<[u32; 4]> {
    let (w, h) = dims;
    if w == 0 || h == 0 {
        return None;
    }
    let clamp = |v: f64, max: u32| -> u32 { v.round().max(0.0).min((max - 1) as f64) as u32 };
    let x0 = clamp(bbox_norm[0] * w as f64, w);
    let y0 = clamp(bbox_norm[1] * h as f64, h);
    let x1 = clamp(bbox_norm[2] * w as f64, w);
    let y1 = clamp(bbox_norm[3] * h as f64, h);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some([x0, y0, x1, y1])
}

/// Draw a rectangle border with the given thickness, growing inwards
pub fn draw_rect(img: &mut RgbImage, bbox_px: [u32; 4], color: Rgb<u8>, thickness: u32) {
    let (w, h) = img.dimensions();
    let [x0, y0, x1, y1] = bbox_px;
    for t in 0..thickness {
        let xx0 = x0.saturating_add(t);
        let yy0 = y0.saturating_add(t);
        let xx1 = x1.saturating_sub(t);
        let yy1 = y1.saturating_sub(t);
        if xx0 >= w || yy0 >= h || xx1 >= w || yy1 >= h || xx0 > xx1 || yy0 > yy1 {
            continue;
        }
        for x in xx0..=xx1 {
            img.put_pixel(x, yy0, color);
            img.put_pixel(x, yy1, color);
        }
        for y in yy0..=yy1 {
            img.put_pixel(xx0, y, color);
            img.put_pixel(xx1, y, color);
        }
    }
}

/// Draw a horizontal line of the given thickness centred on `line.row`
///
/// Parts of the line outside the image are clipped.
pub fn draw_hline(img: &mut RgbImage, line: HLine, color: Rgb<u8>, thickness: u32) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || thickness == 0 {
        return;
    }
    let half = (thickness / 2) as i64;
    let top = line.row.saturating_sub(half).max(0);
    let bottom = line
        .row
        .saturating_sub(half)
        .saturating_add(thickness as i64 - 1)
        .min(h as i64 - 1);
    let left = line.x0.min(line.x1).max(0);
    let right = line.x0.max(line.x1).min(w as i64 - 1);
    if top > bottom || left > right {
        return;
    }
    for y in top..=bottom {
        for x in left..=right {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}
