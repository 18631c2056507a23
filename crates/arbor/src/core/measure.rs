//! Pure pieces of the measure/arrange protocol.
//!
//! `Core::measure` and `Core::arrange` drive the recursion; everything that turns numbers
//! into other numbers lives here so it can be tested without a tree. All numeric repair
//! happens in this module: NaN and negative inputs are replaced with documented defaults and
//! never reach a widget or a stored bound.

use tracing::debug;

use crate::{
    geom::{Rect, Size},
    layout::{Align, Layout},
};

/// Repair a measurement bound: NaN means "unconstrained" and becomes +infinity, negative
/// becomes zero.
pub fn sanitize_available(available: Size) -> Size {
    let fix = |v: f32, axis: &str| {
        if v.is_nan() {
            debug!(axis, "NaN availability treated as unbounded");
            f32::INFINITY
        } else if v < 0.0 {
            debug!(axis, value = v, "negative availability clamped to zero");
            0.0
        } else {
            v
        }
    };
    Size::new(fix(available.w, "w"), fix(available.h, "h"))
}

/// Repair a size returned from a widget's measure override. NaN and negative become zero;
/// infinity becomes the finite availability on that axis, or zero if that is unbounded too.
pub fn sanitize_measured(measured: Size, available: Size) -> Size {
    let fix = |v: f32, avail: f32, axis: &str| {
        if v.is_nan() || v < 0.0 {
            debug!(axis, value = v, "invalid measured size replaced with zero");
            0.0
        } else if v.is_infinite() {
            let out = if avail.is_finite() { avail } else { 0.0 };
            debug!(axis, out, "infinite measured size clamped");
            out
        } else {
            v
        }
    };
    Size::new(
        fix(measured.w, available.w, "w"),
        fix(measured.h, available.h, "h"),
    )
}

/// Repair an arrange slot. A non-finite origin becomes zero; a non-finite or negative extent
/// becomes the node's desired size on that axis, or zero when that is not finite either.
pub fn sanitize_slot(slot: Rect, desired: Size) -> Rect {
    let origin = |v: f32, axis: &str| {
        if v.is_finite() {
            v
        } else {
            debug!(axis, value = v, "non-finite arrange origin replaced with zero");
            0.0
        }
    };
    let extent = |v: f32, fallback: f32, axis: &str| {
        if v.is_finite() && v >= 0.0 {
            v
        } else {
            let out = if fallback.is_finite() { fallback.max(0.0) } else { 0.0 };
            debug!(axis, value = v, out, "invalid arrange extent replaced");
            out
        }
    };
    Rect::new(
        origin(slot.x, "x"),
        origin(slot.y, "y"),
        extent(slot.w, desired.w, "w"),
        extent(slot.h, desired.h, "h"),
    )
}

/// Availability for a widget's content box: margin and padding are removed, then any size
/// request or maximum caps what is left. Unusable requests and bounds are ignored.
pub fn content_available(available: Size, layout: &Layout) -> Size {
    let outer = available.deflate(layout.margin);
    let w = match layout.requested_width() {
        Some(w) => layout.clamp_width(w),
        None => match layout.width_cap() {
            Some(max) => outer.w.min(max),
            None => outer.w,
        },
    };
    let h = match layout.requested_height() {
        Some(h) => layout.clamp_height(h),
        None => match layout.height_cap() {
            Some(max) => outer.h.min(max),
            None => outer.h,
        },
    };
    Size::new(w, h).deflate(layout.padding)
}

/// Desired size from a content size: padding is added, requests override, clamps apply, and
/// finally margin is added.
pub fn desired_from_content(content: Size, layout: &Layout) -> Size {
    let padded = content.inflate(layout.padding);
    let w = layout.clamp_width(layout.requested_width().unwrap_or(padded.w));
    let h = layout.clamp_height(layout.requested_height().unwrap_or(padded.h));
    Size::new(w.max(0.0), h.max(0.0)).inflate(layout.margin)
}

/// Resolve one axis of an arrange: returns the offset within the area and the extent.
fn resolve_axis(
    area: f32,
    natural: f32,
    request: Option<f32>,
    align: Align,
    clamp: impl Fn(f32) -> f32,
) -> (f32, f32) {
    let size = match (request, align) {
        (Some(r), _) => clamp(r),
        (None, Align::Fill) => clamp(area),
        (None, _) => clamp(natural.min(area)),
    };
    let slack = (area - size).max(0.0);
    let offset = match (align, request) {
        (Align::Start, _) => 0.0,
        (Align::End, _) => slack,
        (Align::Center, _) | (Align::Fill, Some(_)) => slack / 2.0,
        (Align::Fill, None) => 0.0,
    };
    (offset, size.max(0.0))
}

/// Resolve the box a node occupies inside the slot its parent grants.
///
/// The margin is removed from the slot first. On each axis, an explicit size request wins,
/// otherwise `Fill` takes the whole area and the other alignments take the natural (desired
/// minus margin) size limited to the area. Alignment then positions the box within the slack;
/// a `Fill` box with a request is centered. Min/max clamps apply to the final extent.
pub fn resolve_arrange(slot: Rect, desired: Size, layout: &Layout) -> Rect {
    let area = slot.deflate(layout.margin);
    let natural = desired.deflate(layout.margin);
    let (dx, w) = resolve_axis(
        area.w,
        natural.w,
        layout.requested_width(),
        layout.horizontal,
        |v| layout.clamp_width(v),
    );
    let (dy, h) = resolve_axis(
        area.h,
        natural.h,
        layout.requested_height(),
        layout.vertical,
        |v| layout.clamp_height(v),
    );
    Rect::new(area.x + dx, area.y + dy, w, h)
}

/// The padded content rectangle of a box, in the box's local space.
pub fn content_rect(bounds: Rect, layout: &Layout) -> Rect {
    bounds.size().rect().deflate(layout.padding)
}
