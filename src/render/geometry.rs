use crate::grid::layout::GridShape;
use crate::scale::Extend;
use crate::style::Orientation;
use crate::theme::Theme;

/// Colorbar thickness as a fraction of the image side it runs along.
const CBAR_FRACTION: f64 = 1.0 / 20.0;
/// Gap between image and colorbar as a fraction of the colorbar thickness.
const CBAR_PAD: f64 = 0.5;

/// Pixel rectangle inside a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` lies completely inside this rectangle.
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrink each side by the given amount, never below one pixel.
    fn shrink(&self, left: f64, top: f64, right: f64, bottom: f64) -> Rect {
        let w = (self.width as f64 - left - right).max(1.0);
        let h = (self.height as f64 - top - bottom).max(1.0);
        let left = left.min(self.width as f64 - 1.0).max(0.0);
        let top = top.min(self.height as f64 - 1.0).max(0.0);
        Rect::new(
            self.x + left.round() as i32,
            self.y + top.round() as i32,
            w.round() as u32,
            h.round() as u32,
        )
    }
}

/// Context-dependent sizes in pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Metrics {
    pub title_px: f64,
    pub font_px: f64,
    pub line_px: f64,
}

impl Metrics {
    pub fn new(theme: &Theme) -> Self {
        Self {
            title_px: theme.pt_to_px(theme.context.title_size()),
            font_px: theme.pt_to_px(theme.context.font_size()),
            line_px: theme.pt_to_px(theme.context.line_width()).max(1.0),
        }
    }

    fn band(&self) -> f64 {
        self.title_px * 1.4
    }
}

/// Rectangle of cell `index` in a figure of `size` pixels.
pub(crate) fn cell_rect(shape: GridShape, index: usize, size: (u32, u32)) -> Rect {
    let (row, col) = shape.cell_position(index);
    let (w, h) = (size.0 as usize, size.1 as usize);
    let x0 = col * w / shape.cols;
    let x1 = (col + 1) * w / shape.cols;
    let y0 = row * h / shape.rows;
    let y1 = (row + 1) * h / shape.rows;
    Rect::new(
        x0 as i32,
        y0 as i32,
        (x1 - x0).max(1) as u32,
        (y1 - y0).max(1) as u32,
    )
}

/// What surrounds an image inside its cell.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameOptions {
    pub title: bool,
    pub row_label: bool,
    pub showticks: bool,
    /// Orientation and whether the colorbar carries a label
    pub cbar: Option<(Orientation, bool)>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ImageFrame {
    pub image: Rect,
    pub colorbar: Option<Rect>,
}

fn padding(cell: Rect) -> f64 {
    (0.04 * cell.width.min(cell.height) as f64).max(2.0)
}

/// Place an image of `data_dim` (rows, cols) and its colorbar in `cell`,
/// keeping the data aspect ratio.
pub(crate) fn frame_image(
    cell: Rect,
    data_dim: (usize, usize),
    opts: FrameOptions,
    m: &Metrics,
) -> ImageFrame {
    let pad = padding(cell);
    let (mut left, mut top, mut right, mut bottom) = (pad, pad, pad, pad);
    if opts.title {
        top += m.band();
    }
    if opts.row_label {
        left += m.band();
    }
    if opts.showticks {
        left += m.font_px * 3.0;
        bottom += m.font_px * 1.8;
    }
    match opts.cbar {
        Some((Orientation::Vertical, label)) => {
            right += m.font_px * 3.5 + if label { m.band() } else { 0.0 };
        }
        Some((Orientation::Horizontal, label)) => {
            bottom += m.font_px * 1.8 + if label { m.band() } else { 0.0 };
        }
        None => {}
    }
    let area = cell.shrink(left, top, right, bottom);

    let (rows, cols) = data_dim;
    let aspect = cols.max(1) as f64 / rows.max(1) as f64;
    let extra = CBAR_FRACTION * (1.0 + CBAR_PAD);
    let (aw, ah) = (area.width as f64, area.height as f64);

    let (iw, ih, bw, bh) = match opts.cbar {
        None => {
            let ih = ah.min(aw / aspect);
            (ih * aspect, ih, ih * aspect, ih)
        }
        Some((Orientation::Vertical, _)) => {
            let ih = ah.min(aw / (aspect + extra));
            (ih * aspect, ih, ih * (aspect + extra), ih)
        }
        Some((Orientation::Horizontal, _)) => {
            let iw = aw.min(ah / (1.0 / aspect + extra));
            (iw, iw / aspect, iw, iw * (1.0 / aspect + extra))
        }
    };

    let x = area.x + ((aw - bw) / 2.0).max(0.0).round() as i32;
    let y = area.y + ((ah - bh) / 2.0).max(0.0).round() as i32;
    let image = Rect::new(x, y, iw.round().max(1.0) as u32, ih.round().max(1.0) as u32);

    let colorbar = opts.cbar.map(|(orientation, _)| match orientation {
        Orientation::Vertical => {
            let thickness = (image.height as f64 * CBAR_FRACTION).round().max(1.0);
            let gap = (thickness * CBAR_PAD).round().max(1.0) as i32;
            Rect::new(image.right() + gap, image.y, thickness as u32, image.height)
        }
        Orientation::Horizontal => {
            let thickness = (image.width as f64 * CBAR_FRACTION).round().max(1.0);
            let gap = (thickness * CBAR_PAD).round().max(1.0) as i32;
            Rect::new(image.x, image.bottom() + gap, image.width, thickness as u32)
        }
    });

    ImageFrame { image, colorbar }
}

/// Plot area of a non-image cell (histogram), leaving room for axis labels.
pub(crate) fn frame_plot(cell: Rect, title: bool, m: &Metrics) -> Rect {
    let pad = padding(cell);
    let top = pad + if title { m.band() } else { 0.0 };
    cell.shrink(pad + m.font_px * 3.5, top, pad, pad + m.font_px * 1.8)
}

/// Part of the colorbar covered by the gradient; extended ends leave room
/// for the triangles.
pub(crate) fn colorbar_gradient(cbar: Rect, orientation: Orientation, extend: Extend) -> Rect {
    let (length, thickness) = match orientation {
        Orientation::Vertical => (cbar.height, cbar.width),
        Orientation::Horizontal => (cbar.width, cbar.height),
    };
    let ext = thickness.min(length / 4);
    let low = if extend.has_min() { ext } else { 0 };
    let high = if extend.has_max() { ext } else { 0 };
    let inner = length.saturating_sub(low + high).max(1);
    match orientation {
        // max at the top
        Orientation::Vertical => Rect::new(cbar.x, cbar.y + high as i32, cbar.width, inner),
        Orientation::Horizontal => Rect::new(cbar.x + low as i32, cbar.y, inner, cbar.height),
    }
}
