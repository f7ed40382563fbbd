//! Column width distribution.
//!
//! Fixed-width columns get their own width (clipped to their min/max). Auto columns start at
//! their natural, content-measured width; leftover viewport space is then shared between the
//! expanding auto columns proportionally to their expand ratios, honoring max widths by
//! iterating to a fixed point, and finally honoring min widths by scooting space back from
//! the columns that can spare it.

use alloc::vec::Vec;

use crate::column::{Column, ExpandRatio};

/// Slack below which a pixel difference is treated as rounding noise.
const PX_EPSILON: f64 = 1e-9;

/// How fractional per-ratio shares are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubpixelPolicy {
    /// Shares are exact floating point values.
    #[default]
    Fractional,
    /// Shares are floored to whole pixels and the remainder is handed out one pixel at a
    /// time, so the total still matches the distributed budget exactly.
    WholePixels,
}

/// Width-relevant configuration of one visible column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WidthInput {
    /// Fixed user width, or `None` for auto.
    pub width: Option<f64>,
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub expand_ratio: ExpandRatio,
    /// Content-measured width used for auto columns.
    pub natural_width: f64,
}

impl WidthInput {
    pub fn auto(natural_width: f64) -> Self {
        Self {
            width: None,
            min_width: None,
            max_width: None,
            expand_ratio: ExpandRatio::Default,
            natural_width,
        }
    }

    pub fn fixed(width: f64) -> Self {
        Self {
            width: Some(width),
            ..Self::auto(0.0)
        }
    }

    pub fn from_column(column: &Column, natural_width: f64) -> Self {
        Self {
            width: column.width(),
            min_width: column.min_width(),
            max_width: column.max_width(),
            expand_ratio: column.expand_ratio(),
            natural_width,
        }
    }

    pub fn with_min(mut self, px: f64) -> Self {
        self.min_width = Some(px);
        self
    }

    pub fn with_max(mut self, px: f64) -> Self {
        self.max_width = Some(px);
        self
    }

    pub fn with_ratio(mut self, ratio: u32) -> Self {
        self.expand_ratio = ExpandRatio::Ratio(ratio);
        self
    }

    fn min(&self) -> f64 {
        self.min_width.unwrap_or(0.0)
    }

    fn max(&self) -> f64 {
        self.max_width.unwrap_or(f64::INFINITY)
    }

    fn is_auto(&self) -> bool {
        self.width.is_none()
    }

    fn clipped(&self, px: f64) -> f64 {
        // max first, then min: a min above max has been rejected at configuration time.
        let px = if px > self.max() { self.max() } else { px };
        if px < self.min() { self.min() } else { px }
    }

    fn ratio(&self, default_ratios: bool) -> u32 {
        match self.expand_ratio {
            ExpandRatio::Ratio(r) => r,
            ExpandRatio::Default if default_ratios => 1,
            ExpandRatio::Default => 0,
        }
    }
}

/// Which branch of the algorithm produced a [`WidthResolution`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionMode {
    /// The columns need at least the whole viewport; nothing was expanded.
    SelfSizing,
    /// There was leftover space but no column could take it.
    Unexpanded,
    /// Leftover space was distributed by expand ratio.
    Expanded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WidthResolution {
    /// Final widths, in the same order as the inputs.
    pub widths: Vec<f64>,
    pub mode: ResolutionMode,
}

impl WidthResolution {
    pub fn total(&self) -> f64 {
        self.widths.iter().sum()
    }
}

/// Resolves final pixel widths for `columns` (visible columns in display order) inside a
/// viewport `viewport_width` pixels wide.
pub fn resolve_column_widths(
    columns: &[WidthInput],
    viewport_width: f64,
    policy: SubpixelPolicy,
) -> WidthResolution {
    let n = columns.len();
    let mut widths = alloc::vec![0.0f64; n];

    if columns_wider_than(columns, viewport_width) {
        for (w, c) in widths.iter_mut().zip(columns) {
            *w = c.clipped(c.width.unwrap_or(c.natural_width));
        }
        vtrace!(columns = n, viewport_width, "resolve_column_widths: self-sizing");
        return WidthResolution {
            widths,
            mode: ResolutionMode::SelfSizing,
        };
    }

    let default_ratios = columns
        .iter()
        .all(|c| c.expand_ratio == ExpandRatio::Default);

    // Phase 1: fixed widths and natural widths of the auto columns.
    let mut reserved = 0.0f64;
    let mut expanding: Vec<(usize, u32)> = Vec::new();
    let mut total_ratio: u64 = 0;
    for (i, c) in columns.iter().enumerate() {
        match c.width {
            Some(px) => {
                widths[i] = c.clipped(px);
                reserved += widths[i];
            }
            None => {
                let max = c.max();
                let natural = if c.natural_width > max {
                    max
                } else {
                    c.natural_width.max(0.0)
                };
                widths[i] = natural;
                reserved += natural;
                let ratio = c.ratio(default_ratios);
                if natural < max && ratio > 0 {
                    expanding.push((i, ratio));
                    total_ratio += ratio as u64;
                }
            }
        }
    }

    let mut pixels = viewport_width - reserved;
    if pixels <= 0.0 {
        clip_auto_columns(columns, &mut widths);
        return WidthResolution {
            widths,
            mode: ResolutionMode::SelfSizing,
        };
    }
    if total_ratio == 0 {
        vtrace!(leftover = pixels, "resolve_column_widths: nothing to expand");
        let mode = restore_min_widths(columns, &[], &mut widths, policy, ResolutionMode::Unexpanded);
        return WidthResolution { widths, mode };
    }

    // Phase 2: clamp columns that would exceed their max until nothing changes.
    loop {
        let per_ratio = pixels / total_ratio as f64;
        let mut maxed_out = false;
        expanding.retain(|&(i, ratio)| {
            let max = columns[i].max();
            let expanded = widths[i] + per_ratio * ratio as f64;
            if max <= expanded {
                total_ratio -= ratio as u64;
                pixels -= max - widths[i];
                widths[i] = max;
                maxed_out = true;
                false
            } else {
                true
            }
        });
        if !maxed_out || expanding.is_empty() {
            break;
        }
    }

    let mode = if expanding.is_empty() {
        ResolutionMode::Unexpanded
    } else {
        debug_assert!(
            pixels > 0.0,
            "ran out of pixels to distribute ({pixels}px to {total_ratio} ratios)"
        );
        distribute(&expanding, total_ratio, pixels.max(0.0), columns, &mut widths, policy);
        ResolutionMode::Expanded
    };

    let mode = restore_min_widths(columns, &expanding, &mut widths, policy, mode);
    WidthResolution { widths, mode }
}

/// Phase 3: raises cramped auto columns to their min and takes the space back, first from
/// the still expanding columns by ratio, then evenly from any auto column above its min.
///
/// Returns [`ResolutionMode::SelfSizing`] when the space cannot be found, since the columns
/// then overflow the viewport.
fn restore_min_widths(
    columns: &[WidthInput],
    expanding: &[(usize, u32)],
    widths: &mut [f64],
    policy: SubpixelPolicy,
    mode: ResolutionMode,
) -> ResolutionMode {
    let mut deficit = 0.0f64;
    let mut raised: Vec<usize> = Vec::new();
    for (i, c) in columns.iter().enumerate() {
        if c.is_auto() && widths[i] < c.min() {
            deficit += c.min() - widths[i];
            widths[i] = c.min();
            raised.push(i);
        }
    }
    if deficit <= PX_EPSILON {
        return mode;
    }

    let expanding: Vec<(usize, u32)> = expanding
        .iter()
        .copied()
        .filter(|(i, _)| !raised.contains(i))
        .collect();
    deficit = give_back(deficit, &expanding, columns, widths, policy);

    if deficit > PX_EPSILON {
        let autos: Vec<(usize, u32)> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_auto())
            .map(|(i, _)| (i, 1))
            .collect();
        deficit = give_back(deficit, &autos, columns, widths, policy);
    }

    if deficit > PX_EPSILON {
        vwarn!(
            overflow = deficit,
            "resolve_column_widths: min widths exceed the viewport"
        );
        return ResolutionMode::SelfSizing;
    }
    mode
}

/// Shrinks `donors` towards their min widths by ratio until `deficit` pixels are freed.
/// Returns what could not be freed.
fn give_back(
    mut deficit: f64,
    donors: &[(usize, u32)],
    columns: &[WidthInput],
    widths: &mut [f64],
    policy: SubpixelPolicy,
) -> f64 {
    while deficit > PX_EPSILON {
        let open: Vec<(usize, u32)> = donors
            .iter()
            .copied()
            .filter(|&(i, ratio)| ratio > 0 && widths[i] - columns[i].min() > PX_EPSILON)
            .collect();
        let total: u64 = open.iter().map(|&(_, r)| r as u64).sum();
        if total == 0 {
            break;
        }
        let per_ratio = match policy {
            SubpixelPolicy::Fractional => deficit / total as f64,
            SubpixelPolicy::WholePixels => floor_px(deficit / total as f64),
        };

        let mut taken = 0.0f64;
        for &(i, ratio) in &open {
            let left = deficit - taken;
            if left <= PX_EPSILON {
                break;
            }
            // Whole pixels: below one pixel per ratio, hand the rest out one pixel at a time.
            let want = if per_ratio > 0.0 {
                per_ratio * ratio as f64
            } else {
                left.min(1.0)
            };
            let take = want.min(widths[i] - columns[i].min()).min(left);
            widths[i] -= take;
            taken += take;
        }
        if taken <= 0.0 {
            break;
        }
        deficit -= taken;
    }
    deficit.max(0.0)
}

fn columns_wider_than(columns: &[WidthInput], viewport_width: f64) -> bool {
    let mut free = viewport_width;
    for c in columns {
        if let Some(w) = c.width {
            free -= c.clipped(w);
        } else if let Some(min) = c.min_width {
            free -= min;
        }
    }
    free < 0.0
}

fn clip_auto_columns(columns: &[WidthInput], widths: &mut [f64]) {
    for (w, c) in widths.iter_mut().zip(columns) {
        if c.is_auto() {
            *w = c.clipped(*w);
        }
    }
}

fn distribute(
    expanding: &[(usize, u32)],
    total_ratio: u64,
    pixels: f64,
    columns: &[WidthInput],
    widths: &mut [f64],
    policy: SubpixelPolicy,
) {
    let per_ratio = match policy {
        SubpixelPolicy::Fractional => pixels / total_ratio as f64,
        SubpixelPolicy::WholePixels => floor_px(pixels / total_ratio as f64),
    };
    let mut leftover = pixels;
    for &(i, ratio) in expanding {
        let share = per_ratio * ratio as f64;
        widths[i] += share;
        leftover -= share;
    }

    if policy == SubpixelPolicy::Fractional {
        return;
    }

    // Hand out whole leftover pixels round-robin, never pushing a column past its max.
    while leftover >= 1.0 {
        let mut gave = false;
        for &(i, _) in expanding {
            if leftover < 1.0 {
                break;
            }
            if widths[i] + 1.0 <= columns[i].max() {
                widths[i] += 1.0;
                leftover -= 1.0;
                gave = true;
            }
        }
        if !gave {
            break;
        }
    }
    // The sub-pixel rest goes to the last columns with room for it.
    for &(i, _) in expanding.iter().rev() {
        if leftover <= 0.0 {
            break;
        }
        let take = leftover.min(columns[i].max() - widths[i]);
        if take > 0.0 {
            widths[i] += take;
            leftover -= take;
        }
    }
}

/// Floors a non-negative pixel value without relying on `std` float intrinsics.
fn floor_px(v: f64) -> f64 {
    if v <= 0.0 { 0.0 } else { (v as u64) as f64 }
}
