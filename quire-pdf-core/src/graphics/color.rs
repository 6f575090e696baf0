#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A color in one of the device color spaces, with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Color {
    Gray(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
}

impl Color {
    /// Creates an RGB color with values clamped to 0.0-1.0.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    /// Creates an RGB color from 8-bit components.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    pub fn gray(value: f64) -> Self {
        Color::Gray(value.clamp(0.0, 1.0))
    }

    pub fn gray8(value: u8) -> Self {
        Color::Gray(value as f64 / 255.0)
    }

    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Color::Cmyk(
            c.clamp(0.0, 1.0),
            m.clamp(0.0, 1.0),
            y.clamp(0.0, 1.0),
            k.clamp(0.0, 1.0),
        )
    }

    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    pub fn white() -> Self {
        Color::Gray(1.0)
    }

    /// Stroking operator (`G`, `RG` or `K`).
    pub fn stroke_op(&self) -> String {
        self.op(false)
    }

    /// Non-stroking operator (`g`, `rg` or `k`).
    pub fn fill_op(&self) -> String {
        self.op(true)
    }

    fn op(&self, fill: bool) -> String {
        let (gray, rgb, cmyk) = if fill { ("g", "rg", "k") } else { ("G", "RG", "K") };
        match *self {
            Color::Gray(v) => format!("{v:.3} {gray}"),
            // pure black goes out as gray
            Color::Rgb(r, g, b) if r == 0.0 && g == 0.0 && b == 0.0 => format!("0.000 {gray}"),
            Color::Rgb(r, g, b) => format!("{r:.3} {g:.3} {b:.3} {rgb}"),
            Color::Cmyk(c, m, y, k) => format!("{c:.3} {m:.3} {y:.3} {k:.3} {cmyk}"),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}
