//! Analog clock face rasterization.
//!
//! Draws hour/minute/second hands, the twelve hour ticks and digital
//! date/time labels into an [`RgbImage`] sized for the logical panel
//! square. The caller pushes the image through the chain mapper like any
//! other frame.

use chrono::{DateTime, Datelike, Local, Timelike};
use image::{Rgb, RgbImage};
use std::f64::consts::PI;

const HAND: Rgb<u8> = Rgb([200, 200, 200]);
const SECOND_HAND: Rgb<u8> = Rgb([200, 0, 0]);
const LABEL: Rgb<u8> = Rgb([255, 255, 255]);

/// Render the clock face for the given instant into a `size`x`size` image.
pub fn clock_face(size: u32, now: &DateTime<Local>) -> RgbImage {
    let mut img = RgbImage::new(size, size);
    let s = size as i32;
    let center = s / 2;

    let hour = (now.hour() % 12) as f64;
    let minute = now.minute() as f64;
    let second = now.second() as f64;

    draw_hand(&mut img, center, center, hour / 12.0 * 360.0, s / 3, HAND, 3);
    draw_hand(
        &mut img,
        center,
        center,
        minute / 60.0 * 360.0,
        s / 2 - 10,
        HAND,
        2,
    );
    draw_hand(
        &mut img,
        center,
        center,
        second / 60.0 * 360.0,
        s / 2 - 5,
        SECOND_HAND,
        1,
    );

    for i in 0..12 {
        let angle = i as f64 / 12.0 * 2.0 * PI;
        let (sin, cos) = angle.sin_cos();
        let x1 = center + (cos * (s as f64 / 2.0 - 1.0)) as i32;
        let y1 = center + (sin * (s as f64 / 2.0 - 1.0)) as i32;
        let x2 = center + (cos * (s as f64 / 2.0 - 10.0)) as i32;
        let y2 = center + (sin * (s as f64 / 2.0 - 10.0)) as i32;
        draw_line(&mut img, x1, y1, x2, y2, HAND);
    }

    let date = format!("{:02}.{:02}.{}", now.day(), now.month(), now.year());
    let time = format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second());
    draw_label_centered(&mut img, center, s - 28, &date);
    draw_label_centered(&mut img, center, s - 13, &time);

    img
}

fn draw_hand(img: &mut RgbImage, x: i32, y: i32, angle_deg: f64, length: i32, color: Rgb<u8>, width: i32) {
    // Zero degrees points at twelve.
    let rad = (angle_deg - 90.0) * PI / 180.0;
    let end_x = x + (length as f64 * rad.cos()) as i32;
    let end_y = y + (length as f64 * rad.sin()) as i32;
    draw_thick_line(img, x, y, end_x, end_y, color, width);
}

/// Bresenham line, clipped to the image bounds.
fn draw_line(img: &mut RgbImage, mut x1: i32, mut y1: i32, x2: i32, y2: i32, color: Rgb<u8>) {
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        put_pixel(img, x1, y1, color);
        if x1 == x2 && y1 == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x1 += sx;
        }
        if e2 < dx {
            err += dx;
            y1 += sy;
        }
    }
}

fn draw_thick_line(img: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb<u8>, width: i32) {
    if width <= 1 {
        draw_line(img, x1, y1, x2, y2, color);
        return;
    }
    for dy in -width / 2..=width / 2 {
        for dx in -width / 2..=width / 2 {
            draw_line(img, x1 + dx, y1 + dy, x2 + dx, y2 + dy, color);
        }
    }
}

fn put_pixel(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

// ── Label font ─────────────────────────────────────────────────────
// 3x5 glyphs for digits and the two separators, column-major-free:
// each glyph is five rows of three bits, MSB on the left.

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const GLYPH_ADVANCE: i32 = 4;

fn glyph(c: u8) -> Option<[u8; 5]> {
    let rows = match c {
        b'0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        b'1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        b'2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        b'3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        b'4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        b'5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        b'6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        b'7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        b'8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        b'9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        b'.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        b':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        _ => return None,
    };
    Some(rows)
}

fn draw_label_centered(img: &mut RgbImage, cx: i32, y: i32, text: &str) {
    let total = text.len() as i32 * GLYPH_ADVANCE;
    let mut x = cx - total / 2;
    for &c in text.as_bytes() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits >> (GLYPH_WIDTH - 1 - col) & 1 == 1 {
                        put_pixel(img, x + col, y + row as i32, LABEL);
                    }
                }
            }
        }
        x += GLYPH_ADVANCE;
    }
}
