use crate::core::model::ReportTable;
use anyhow::Result;
use std::fmt::Write as FmtWrite;

const WIDTH: f64 = 860.0;
const LEFT: f64 = 170.0;
const RIGHT: f64 = 24.0;
const TOP: f64 = 12.0;
const ROW_H: f64 = 64.0;
const AXIS_H: f64 = 16.0;
const RADIUS: f64 = 4.0;
const COLORS: [&str; 5] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];

/// One strip per metric, each scaled to its own range, one dot per sample.
pub fn svg(table: &ReportTable) -> Result<String> {
    let keys = table.metric_keys();
    let plot_w = WIDTH - LEFT - RIGHT;
    let h = TOP * 2.0 + keys.len() as f64 * (ROW_H + AXIS_H);
    let mut out = String::with_capacity(16 * 1024);

    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        WIDTH, h, WIDTH, h
    )?;
    writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#fff\"/>",
        WIDTH, h
    )?;

    for (row, key) in keys.iter().enumerate() {
        let top = TOP + row as f64 * (ROW_H + AXIS_H);
        let points: Vec<(&str, f64)> = table
            .iter()
            .filter_map(|(s, r)| r.get(key).map(|v| (s, v)))
            .filter(|(_, v)| v.is_finite())
            .collect();
        let (lo, hi) = strip_domain(points.iter().map(|(_, v)| *v));

        let fill = if row % 2 == 0 { "#f7f7f7" } else { "#fdfdfd" };
        writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"#e5e5e5\"/>",
            LEFT, top, plot_w, ROW_H, fill
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#333\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            LEFT - 8.0,
            top + ROW_H / 2.0,
            escape_svg(key)
        )?;
        draw_x_axis_ticks(&mut out, LEFT, top, plot_w, ROW_H, lo, hi, 5)?;

        let color = COLORS[row % COLORS.len()];
        let xs: Vec<f64> = points
            .iter()
            .map(|(_, v)| LEFT + (v - lo) / (hi - lo) * plot_w)
            .collect();
        let offsets = swarm_offsets(&xs, RADIUS, ROW_H / 2.0 - RADIUS);
        for (((sample, value), x), dy) in points.iter().zip(&xs).zip(&offsets) {
            writeln!(
                out,
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\" fill-opacity=\"0.75\"><title>{}: {}</title></circle>",
                x,
                top + ROW_H / 2.0 + dy,
                RADIUS,
                color,
                escape_svg(sample),
                fmt_tick(*value)
            )?;
        }
    }

    writeln!(out, "</svg>")?;
    Ok(out)
}

/// Padded, tick-aligned axis range for one strip.
fn strip_domain<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if !min_v.is_finite() || !max_v.is_finite() {
        return (0.0, 1.0);
    }
    if (max_v - min_v).abs() < 1e-9 {
        let pad = (min_v.abs() * 0.1).max(1.0);
        return (min_v - pad, max_v + pad);
    }
    let (start, step, count) = nice_ticks(min_v, max_v, 5);
    (start, start + step * (count - 1) as f64)
}

/// Vertical offsets that keep dots from overlapping. Each dot takes the
/// smallest offset (0, +d, -d, +2d, ...) clear of every dot already placed,
/// capped at `max_offset`.
fn swarm_offsets(xs: &[f64], radius: f64, max_offset: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..xs.len()).collect();
    order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));

    let min_dist = radius * 2.0;
    let mut placed: Vec<(f64, f64)> = Vec::with_capacity(xs.len());
    let mut offsets = vec![0.0; xs.len()];
    for i in order {
        let x = xs[i];
        let mut k = 0usize;
        let dy = loop {
            let step = k.div_ceil(2) as f64 * min_dist;
            let candidate = if k % 2 == 1 { step } else { -step };
            if candidate.abs() > max_offset {
                break 0.0;
            }
            let clear = placed.iter().all(|&(px, py)| {
                let dx = px - x;
                let dy = py - candidate;
                dx * dx + dy * dy >= min_dist * min_dist
            });
            if clear {
                break candidate;
            }
            k += 1;
        };
        placed.push((x, dy));
        offsets[i] = dy;
    }
    offsets
}

#[allow(clippy::too_many_arguments)]
fn draw_x_axis_ticks(
    out: &mut String,
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
    min_x: f64,
    max_x: f64,
    ticks: usize,
) -> Result<()> {
    if ticks < 2 || (max_x - min_x).abs() < 1e-9 {
        return Ok(());
    }
    let (start, step, count) = nice_ticks(min_x, max_x, ticks);
    for i in 0..count {
        let v = start + step * i as f64;
        if v < min_x - 1e-9 || v > max_x + 1e-9 {
            continue;
        }
        let x = left + ((v - min_x) / (max_x - min_x).max(1e-6)) * plot_w;
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#eee\"/>",
            x,
            top,
            x,
            top + plot_h
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"#666\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>",
            x,
            top + plot_h + 3.0,
            fmt_tick(v)
        )?;
    }
    Ok(())
}

pub(crate) fn fmt_tick(v: f64) -> String {
    if (v - v.round()).abs() < 0.001 {
        format!("{}", v.round() as i64)
    } else if v.abs() < 10.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.1}", v)
    }
}

fn nice_ticks(min: f64, max: f64, ticks: usize) -> (f64, f64, usize) {
    let range = (max - min).abs().max(1e-9);
    let rough = range / (ticks as f64 - 1.0);
    let mag = 10f64.powf(rough.abs().log10().floor());
    let norm = rough / mag;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag;
    let start = (min / step).floor() * step;
    let end = (max / step).ceil() * step;
    let count = ((end - start) / step).round() as usize + 1;
    (start, step, count)
}

pub(crate) fn escape_svg(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
