use dioxus::prelude::*;

/// Gap between adjacent slices, in degrees.
pub const PADDING_ANGLE: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DonutSlice {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
    pub display: String,
}

impl DonutSlice {
    pub fn new(label: &str, value: f64, color: &'static str, display: String) -> Self {
        Self {
            label: label.to_string(),
            value,
            color,
            display,
        }
    }
}

/// Start and end angle (degrees, clockwise from 12 o'clock) of each slice.
/// Zero or negative values get no arc.
pub fn slice_angles(values: &[f64], padding: f32) -> Vec<Option<(f32, f32)>> {
    let positive: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() && *v > 0.0 { *v } else { 0.0 })
        .collect();
    let total: f64 = positive.iter().sum();
    let drawn = positive.iter().filter(|v| **v > 0.0).count();
    if total <= 0.0 {
        return vec![None; values.len()];
    }
    let pad = if drawn > 1 { padding } else { 0.0 };
    let available = 360.0 - pad * drawn as f32;
    let mut cursor = 0.0f32;
    positive
        .iter()
        .map(|v| {
            if *v <= 0.0 {
                return None;
            }
            let sweep = available * (*v / total) as f32;
            let start = cursor;
            cursor += sweep + pad;
            Some((start, start + sweep))
        })
        .collect()
}

fn polar(cx: f32, cy: f32, r: f32, ang: f32) -> (f32, f32) {
    // 0 degrees points up
    let rad = (ang - 90.0).to_radians();
    (cx + r * rad.cos(), cy + r * rad.sin())
}

fn arc_path(cx: f32, cy: f32, r: f32, a0: f32, a1: f32) -> String {
    // a full circle collapses to a point; stop just short of it
    let a1 = if a1 - a0 >= 360.0 { a0 + 359.99 } else { a1 };
    let (x0, y0) = polar(cx, cy, r, a0);
    let (x1, y1) = polar(cx, cy, r, a1);
    let large_arc = if (a1 - a0).abs() >= 180.0 { 1 } else { 0 };
    format!("M {x0:.3} {y0:.3} A {r:.3} {r:.3} 0 {large_arc} 1 {x1:.3} {y1:.3}")
}

#[allow(non_snake_case)]
#[component]
pub fn Donut(
    slices: Vec<DonutSlice>,
    size: i32,
    inner_radius: i32,
    outer_radius: i32,
    children: Element,
) -> Element {
    let c = (size as f32) / 2.0;
    let stroke = (outer_radius - inner_radius).max(1) as f32;
    let r = inner_radius as f32 + stroke / 2.0;
    let values: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let arcs: Vec<(String, &'static str, String)> = slice_angles(&values, PADDING_ANGLE)
        .into_iter()
        .zip(slices.iter())
        .filter_map(|(angles, slice)| {
            angles.map(|(a0, a1)| {
                (
                    arc_path(c, c, r, a0, a1),
                    slice.color,
                    format!("{}: {}", slice.label, slice.display),
                )
            })
        })
        .collect();

    let size_attr = size.to_string();
    let view_box = format!("0 0 {size} {size}");
    let stroke_width = format!("{stroke:.1}");
    let container_style = format!("width:{size}px;height:{size}px");

    rsx! {
        div { class: "donut",
            div { class: "donut-chart", style: "{container_style}",
                svg { width: "{size_attr}", height: "{size_attr}", view_box: "{view_box}",
                    // Track
                    circle { cx: "{c}", cy: "{c}", r: "{r}", fill: "none", stroke: "#e2e8f0", stroke_width: "{stroke_width}" }
                    for (i, (d, color, tip)) in arcs.into_iter().enumerate() {
                        path { key: "{i}", d: "{d}", fill: "none", stroke: "{color}", stroke_width: "{stroke_width}",
                            title { "{tip}" }
                        }
                    }
                }
                // Center content
                div { class: "donut-center", {children} }
            }
            div { class: "donut-legend",
                for slice in slices.iter() {
                    div { key: "{slice.label}", class: "legend-item",
                        span { class: "legend-dot", style: "background:{slice.color}" }
                        span { "{slice.label}: {slice.display}" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_slices_share_the_circle_minus_padding() {
        let angles = slice_angles(&[25.0, 75.0], 4.0);
        let (a0, a1) = angles[0].unwrap();
        let (b0, b1) = angles[1].unwrap();
        assert_eq!(a0, 0.0);
        assert!((a1 - 88.0).abs() < 1e-3);
        assert!((b0 - 92.0).abs() < 1e-3);
        assert!((b1 - 356.0).abs() < 1e-3);
    }

    #[test]
    fn single_slice_has_no_padding() {
        let angles = slice_angles(&[0.0, 10.0], 4.0);
        assert_eq!(angles[0], None);
        assert_eq!(angles[1], Some((0.0, 360.0)));
    }

    #[test]
    fn nothing_to_draw_for_zero_totals() {
        assert_eq!(slice_angles(&[0.0, -3.0, f64::NAN], 4.0), vec![None, None, None]);
    }

    #[test]
    fn full_circle_arc_is_drawable() {
        let d = arc_path(50.0, 50.0, 40.0, 0.0, 360.0);
        assert!(d.contains(" 0 1 1 "), "{d}");
    }
}
