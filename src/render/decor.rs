//! Vector decorations drawn with plotters over the painted pixels.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::geometry::{self, Rect};
use super::raster::gradient_offset;
use super::text::{Label, draw_label};
use super::{HistCell, ImageCell, Ink, render_err};
use crate::error::Result;
use crate::scale::{format_tick, nice_ticks};
use crate::scalebar::{LabelPosition, Scalebar, ScalebarLocation};
use crate::style::Orientation;
use crate::theme::{Theme, parse_color};

type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

fn outline(root: &Root<'_>, rect: Rect, color: RGBColor, width: f64) -> Result<()> {
    root.draw(&Rectangle::new(
        [(rect.x, rect.y), (rect.right() - 1, rect.bottom() - 1)],
        color.stroke_width(width.round().max(1.0) as u32),
    ))
    .map_err(render_err)
}

fn line(root: &Root<'_>, from: (i32, i32), to: (i32, i32), color: RGBColor, width: f64) -> Result<()> {
    root.draw(&PathElement::new(
        [from, to],
        color.stroke_width(width.round().max(1.0) as u32),
    ))
    .map_err(render_err)
}

pub(super) fn draw_image_cell(
    root: &Root<'_>,
    cell: &ImageCell<'_>,
    theme: &Theme,
    ink: &Ink,
) -> Result<()> {
    let m = &ink.metrics;
    let image = cell.frame.image;
    let style = &cell.spec.style;

    if !cell.despine {
        outline(root, image, ink.foreground, m.line_px)?;
    }
    if style.showticks {
        draw_axis_ticks(root, cell, ink)?;
    }
    if let Some(cbar) = cell.frame.colorbar {
        draw_colorbar(root, cell, cbar, ink)?;
    }
    if let Some(bar) = &cell.scalebar {
        draw_scalebar(root, cell, bar, theme, ink)?;
    }

    if let Some(heading) = cell.spec.heading() {
        draw_label(
            root,
            ink.text,
            ink.foreground,
            Label {
                text: &heading,
                at: (image.center().0, image.y - (m.title_px * 0.3).round() as i32),
                size_px: m.title_px,
                pos: Pos::new(HPos::Center, VPos::Bottom),
                rotate: false,
            },
        )?;
    }
    if let Some(row_label) = &cell.spec.row_label {
        let ticks = if style.showticks { m.font_px * 3.0 } else { 0.0 };
        let x = image.x - (ticks + m.title_px * 0.7).round() as i32;
        draw_label(
            root,
            ink.text,
            ink.foreground,
            Label {
                text: row_label,
                at: (x, image.center().1),
                size_px: m.title_px,
                pos: Pos::new(HPos::Center, VPos::Center),
                rotate: true,
            },
        )?;
    }
    Ok(())
}

/// Pixel-index ticks along the bottom and left image edges.
fn draw_axis_ticks(root: &Root<'_>, cell: &ImageCell<'_>, ink: &Ink) -> Result<()> {
    let m = &ink.metrics;
    let image = cell.frame.image;
    let (rows, cols) = cell.spec.image.dim();
    let tick_len = (m.font_px * 0.35).round().max(2.0) as i32;

    for t in nice_ticks(0.0, cols.saturating_sub(1) as f64, 5) {
        let x = image.x + ((t + 0.5) / cols as f64 * image.width as f64).round() as i32;
        line(root, (x, image.bottom()), (x, image.bottom() + tick_len), ink.foreground, m.line_px * 0.6)?;
        draw_label(
            root,
            ink.text,
            ink.foreground,
            Label {
                text: &format_tick(t),
                at: (x, image.bottom() + tick_len + 2),
                size_px: m.font_px,
                pos: Pos::new(HPos::Center, VPos::Top),
                rotate: false,
            },
        )?;
    }
    for t in nice_ticks(0.0, rows.saturating_sub(1) as f64, 5) {
        let y = image.y + ((t + 0.5) / rows as f64 * image.height as f64).round() as i32;
        line(root, (image.x - tick_len, y), (image.x, y), ink.foreground, m.line_px * 0.6)?;
        draw_label(
            root,
            ink.text,
            ink.foreground,
            Label {
                text: &format_tick(t),
                at: (image.x - tick_len - 2, y),
                size_px: m.font_px,
                pos: Pos::new(HPos::Right, VPos::Center),
                rotate: false,
            },
        )?;
    }
    Ok(())
}

fn draw_colorbar(root: &Root<'_>, cell: &ImageCell<'_>, cbar: Rect, ink: &Ink) -> Result<()> {
    let m = &ink.metrics;
    let style = &cell.spec.style;
    let orientation = style.orientation;
    let limits = &cell.limits;
    let gradient = geometry::colorbar_gradient(cbar, orientation, limits.extend);
    let (cx, cy) = cbar.center();

    if limits.extend.has_min() {
        let tip = match orientation {
            Orientation::Vertical => vec![
                (cbar.x, gradient.bottom()),
                (cbar.right() - 1, gradient.bottom()),
                (cx, cbar.bottom() - 1),
            ],
            Orientation::Horizontal => vec![
                (gradient.x, cbar.y),
                (gradient.x, cbar.bottom() - 1),
                (cbar.x, cy),
            ],
        };
        root.draw(&Polygon::new(tip, rgb(cell.cmap.sample(0.0)).filled()))
            .map_err(render_err)?;
    }
    if limits.extend.has_max() {
        let tip = match orientation {
            Orientation::Vertical => vec![
                (cbar.x, gradient.y - 1),
                (cbar.right() - 1, gradient.y - 1),
                (cx, cbar.y),
            ],
            Orientation::Horizontal => vec![
                (gradient.right(), cbar.y),
                (gradient.right(), cbar.bottom() - 1),
                (cbar.right() - 1, cy),
            ],
        };
        root.draw(&Polygon::new(tip, rgb(cell.cmap.sample(1.0)).filled()))
            .map_err(render_err)?;
    }
    if !cell.despine {
        outline(root, gradient, ink.foreground, m.line_px * 0.6)?;
    }

    // tick marks are hidden, only labels are drawn
    let gap = (m.font_px * 0.3).round() as i32;
    for tick in &cell.cbar_ticks {
        let t = style.norm.normalize(*tick, limits.vmin, limits.vmax);
        if !(-1e-9..=1.0 + 1e-9).contains(&t) {
            continue;
        }
        let (x, y) = gradient_offset(gradient, orientation, t);
        let (at, pos) = match orientation {
            Orientation::Vertical => ((x + gap, y), Pos::new(HPos::Left, VPos::Center)),
            Orientation::Horizontal => ((x, y + gap), Pos::new(HPos::Center, VPos::Top)),
        };
        draw_label(
            root,
            ink.text,
            ink.foreground,
            Label {
                text: &format_tick(*tick),
                at,
                size_px: m.font_px,
                pos,
                rotate: false,
            },
        )?;
    }

    if let Some(text) = &style.cbar_label {
        let offset = (m.font_px * 3.5 + m.title_px * 0.7).round() as i32;
        let (at, rotate) = match orientation {
            Orientation::Vertical => ((cbar.right() + offset, cy), true),
            Orientation::Horizontal => {
                ((cx, cbar.bottom() + (m.font_px * 1.8 + m.title_px * 0.7).round() as i32), false)
            }
        };
        draw_label(
            root,
            ink.text,
            ink.foreground,
            Label {
                text,
                at,
                size_px: m.title_px,
                pos: Pos::new(HPos::Center, VPos::Center),
                rotate,
            },
        )?;
    }
    Ok(())
}

fn draw_scalebar(
    root: &Root<'_>,
    cell: &ImageCell<'_>,
    bar: &Scalebar,
    theme: &Theme,
    ink: &Ink,
) -> Result<()> {
    let sb = &theme.scalebar;
    let image = cell.frame.image;
    let cols = cell.spec.image.dim().1.max(1);
    let color = rgb(parse_color(&sb.color)?);

    let bar_w = (bar.length_px * image.width as f64 / cols as f64).round().max(1.0) as i32;
    let bar_h = (sb.height_fraction * image.height as f64).round().max(1.0) as i32;
    let margin = (0.03 * image.width.min(image.height) as f64).round().max(2.0) as i32;
    let with_label = ink.text && sb.label_position != LabelPosition::None;
    let label_h = if with_label { ink.metrics.font_px.round() as i32 } else { 0 };
    let gap = if with_label { (ink.metrics.font_px * 0.2).round() as i32 } else { 0 };
    let block_h = bar_h + gap + label_h;

    let x = match sb.location {
        ScalebarLocation::LowerRight | ScalebarLocation::UpperRight => image.right() - margin - bar_w,
        ScalebarLocation::LowerLeft | ScalebarLocation::UpperLeft => image.x + margin,
        ScalebarLocation::LowerCenter | ScalebarLocation::UpperCenter => image.center().0 - bar_w / 2,
    };
    let top = match sb.location {
        ScalebarLocation::LowerRight | ScalebarLocation::LowerLeft | ScalebarLocation::LowerCenter => {
            image.bottom() - margin - block_h
        }
        _ => image.y + margin,
    };
    let (bar_y, label_y, label_v) = match sb.label_position {
        LabelPosition::Bottom => (top, top + bar_h + gap, VPos::Top),
        _ => (top + label_h + gap, top + label_h, VPos::Bottom),
    };

    if sb.box_alpha > 0.0 {
        let pad = margin / 2;
        let box_color = rgb(parse_color(&sb.box_color)?);
        root.draw(&Rectangle::new(
            [(x - pad, top - pad), (x + bar_w + pad, top + block_h + pad)],
            box_color.mix(sb.box_alpha).filled(),
        ))
        .map_err(render_err)?;
    }
    root.draw(&Rectangle::new(
        [(x, bar_y), (x + bar_w - 1, bar_y + bar_h - 1)],
        color.filled(),
    ))
    .map_err(render_err)?;

    if with_label {
        draw_label(
            root,
            ink.text,
            color,
            Label {
                text: &bar.label(),
                at: (x + bar_w / 2, label_y),
                size_px: ink.metrics.font_px,
                pos: Pos::new(HPos::Center, label_v),
                rotate: false,
            },
        )?;
    }
    Ok(())
}

pub(super) fn draw_histogram(root: &Root<'_>, cell: &HistCell<'_>, ink: &Ink) -> Result<()> {
    let m = &ink.metrics;
    let p = cell.plot;
    let style = &cell.spec.style;
    let (lo, hi) = cell.range;
    let bins = cell.counts.len().max(1);
    let peak = cell.counts.iter().copied().max().unwrap_or(0).max(1) as f64;
    let values_vertical = cell.spec.orientation == Orientation::Vertical;

    for (i, count) in cell.counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let centre = lo + (i as f64 + 0.5) * (hi - lo) / bins as f64;
        let t = style.norm.normalize(centre, cell.limits.vmin, cell.limits.vmax);
        let color = rgb(cell.cmap.sample(if t.is_nan() { 0.0 } else { t }));
        let frac = *count as f64 / peak;

        let corners = if values_vertical {
            let y1 = p.bottom() - (i as f64 * p.height as f64 / bins as f64).round() as i32;
            let y0 = p.bottom() - ((i + 1) as f64 * p.height as f64 / bins as f64).round() as i32;
            let len = (frac * p.width as f64).round() as i32;
            [(p.x, y0), (p.x + len.max(1) - 1, (y1 - 1).max(y0))]
        } else {
            let x0 = p.x + (i as f64 * p.width as f64 / bins as f64).round() as i32;
            let x1 = p.x + ((i + 1) as f64 * p.width as f64 / bins as f64).round() as i32;
            let len = (frac * p.height as f64).round() as i32;
            [(x0, p.bottom() - len.max(1)), ((x1 - 1).max(x0), p.bottom() - 1)]
        };
        root.draw(&Rectangle::new(corners, color.filled()))
            .map_err(render_err)?;
    }

    line(root, (p.x, p.y), (p.x, p.bottom()), ink.foreground, m.line_px)?;
    line(root, (p.x, p.bottom()), (p.right(), p.bottom()), ink.foreground, m.line_px)?;

    for tick in nice_ticks(lo, hi, 3) {
        let t = (tick - lo) / (hi - lo);
        let (at, pos) = if values_vertical {
            let y = p.bottom() - (t * p.height as f64).round() as i32;
            ((p.x - 4, y), Pos::new(HPos::Right, VPos::Center))
        } else {
            let x = p.x + (t * p.width as f64).round() as i32;
            ((x, p.bottom() + 4), Pos::new(HPos::Center, VPos::Top))
        };
        draw_label(
            root,
            ink.text,
            ink.foreground,
            Label {
                text: &format_tick(tick),
                at,
                size_px: m.font_px,
                pos,
                rotate: false,
            },
        )?;
    }

    if let Some(title) = &style.title {
        draw_label(
            root,
            ink.text,
            ink.foreground,
            Label {
                text: title,
                at: (p.center().0, p.y - (m.title_px * 0.3).round() as i32),
                size_px: m.title_px,
                pos: Pos::new(HPos::Center, VPos::Bottom),
                rotate: false,
            },
        )?;
    }
    Ok(())
}
