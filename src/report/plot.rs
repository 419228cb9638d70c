use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::TrainError;
use crate::report::decode::{Snapshot, SNAPSHOT_ROWS};

const PANEL_W: u32 = 320;
const PANEL_H: u32 = 220;
const MARGIN: u32 = 16;
const GRID_COLS: u32 = 3;
const GRID_ROWS: u32 = 2;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([90, 90, 90]);
const LOSS: Rgb<u8> = Rgb([31, 119, 180]);
const TRUE_BIT: Rgb<u8> = Rgb([214, 39, 40]);
const PREDICTED_BIT: Rgb<u8> = Rgb([44, 160, 44]);

/// Draws the training chart and writes it as a PNG to `path`.
pub fn render_training_plot(
    loss_history: &[f64],
    snapshot: Option<&Snapshot>,
    path: impl AsRef<Path>,
) -> Result<(), TrainError> {
    draw_training_plot(loss_history, snapshot).save(path)?;
    Ok(())
}

/// 2×3 grid: the loss curve in the first panel, then one true-vs-predicted
/// bit chart per snapshot row.  Bars span a y-range of [0, 2]; true bits are
/// drawn at height 1, predicted bits at 0.5 on top of them.
pub fn draw_training_plot(loss_history: &[f64], snapshot: Option<&Snapshot>) -> RgbImage {
    let mut img = RgbImage::from_pixel(PANEL_W * GRID_COLS, PANEL_H * GRID_ROWS, WHITE);

    draw_loss_panel(&mut img, panel_origin(0), loss_history);

    if let Some(snapshot) = snapshot {
        for (i, row) in snapshot.rows.iter().take(SNAPSHOT_ROWS).enumerate() {
            let origin = panel_origin(i as u32 + 1);
            draw_axes(&mut img, origin);
            draw_bits(&mut img, origin, &row.true_bits, 1.0, TRUE_BIT);
            draw_bits(&mut img, origin, &row.predicted_bits, 0.5, PREDICTED_BIT);
        }
    }

    img
}

fn panel_origin(index: u32) -> (u32, u32) {
    ((index % GRID_COLS) * PANEL_W, (index / GRID_COLS) * PANEL_H)
}

/// Inner plotting area of a panel as (left, top, width, height).
fn plot_area(origin: (u32, u32)) -> (u32, u32, u32, u32) {
    (origin.0 + MARGIN, origin.1 + MARGIN, PANEL_W - 2 * MARGIN, PANEL_H - 2 * MARGIN)
}

fn draw_axes(img: &mut RgbImage, origin: (u32, u32)) {
    let (left, top, w, h) = plot_area(origin);
    let bottom = top + h;
    for x in left..=left + w {
        img.put_pixel(x, bottom, AXIS);
    }
    for y in top..=bottom {
        img.put_pixel(left, y, AXIS);
    }
}

fn draw_loss_panel(img: &mut RgbImage, origin: (u32, u32), losses: &[f64]) {
    draw_axes(img, origin);
    let finite: Vec<f64> = losses.iter().copied().filter(|l| l.is_finite()).collect();
    if finite.len() < 2 {
        return;
    }
    let (left, top, w, h) = plot_area(origin);
    let max = finite.iter().copied().fold(f64::MIN, f64::max).max(f64::EPSILON);
    let last = (finite.len() - 1) as f64;

    let to_px = |i: usize, loss: f64| -> (f64, f64) {
        let x = left as f64 + i as f64 / last * w as f64;
        let y = (top + h) as f64 - (loss / max).clamp(0.0, 1.0) * h as f64;
        (x, y)
    };

    for (i, pair) in finite.windows(2).enumerate() {
        let from = to_px(i, pair[0]);
        let to = to_px(i + 1, pair[1]);
        draw_line(img, from, to, LOSS);
    }
}

fn draw_bits(img: &mut RgbImage, origin: (u32, u32), bits: &[u8], height: f64, color: Rgb<u8>) {
    if bits.is_empty() {
        return;
    }
    let (left, top, w, h) = plot_area(origin);
    let slot = w / bits.len() as u32;
    let bar_h = (height / 2.0 * h as f64) as u32;
    let bottom = top + h;

    for (i, &bit) in bits.iter().enumerate() {
        if bit == 0 {
            continue;
        }
        let x0 = left + 1 + i as u32 * slot;
        for x in x0..x0 + slot.saturating_sub(1) {
            for y in bottom - bar_h..bottom {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn draw_line(img: &mut RgbImage, from: (f64, f64), to: (f64, f64), color: Rgb<u8>) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as usize;
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        if x >= 0.0 && y >= 0.0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::decode::SeriesComparison;

    fn snapshot() -> Snapshot {
        Snapshot {
            rows: vec![SeriesComparison {
                a: 3,
                b: 5,
                predicted_sum: 9,
                true_bits: vec![0, 0, 0, 1, 0, 0, 0, 0],
                predicted_bits: vec![1, 0, 0, 1, 0, 0, 0, 0],
            }],
        }
    }

    #[test]
    fn chart_has_grid_dimensions() {
        let img = draw_training_plot(&[0.7, 0.6, 0.5], Some(&snapshot()));
        assert_eq!(img.dimensions(), (PANEL_W * 3, PANEL_H * 2));
    }

    #[test]
    fn bit_panel_paints_true_and_predicted_colors() {
        let img = draw_training_plot(&[], Some(&snapshot()));
        let pixels: Vec<&Rgb<u8>> = img.pixels().collect();
        assert!(pixels.iter().any(|&&p| p == TRUE_BIT));
        assert!(pixels.iter().any(|&&p| p == PREDICTED_BIT));
    }

    #[test]
    fn non_finite_losses_are_skipped() {
        let img = draw_training_plot(&[0.7, f64::NAN, f64::INFINITY, 0.4], None);
        assert!(img.pixels().any(|&p| p == LOSS));
    }

    #[test]
    fn writes_png_file() {
        let path = std::env::temp_dir().join(format!("bitadd_plot_{}.png", std::process::id()));
        render_training_plot(&[0.9, 0.5, 0.3], Some(&snapshot()), &path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
