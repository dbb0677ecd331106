//! Optional SVG rendering of a solved CVRP solution: one colored polyline per
//! route, depot marked distinctly, customers labeled with their dense index.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::instance::Instance;
use crate::solution::Solution;

#[cfg(feature = "resvg")]
use resvg::render;
#[cfg(feature = "resvg")]
use resvg::tiny_skia::{Pixmap, Transform};
#[cfg(feature = "resvg")]
use resvg::usvg;
#[cfg(feature = "resvg")]
use resvg::usvg::TreeParsing;
#[cfg(feature = "resvg")]
use resvg::FitTo;

/// Palette cycled across routes so adjacent routes in the list are visually
/// distinguishable even without a legend.
const ROUTE_COLORS: &[&str] = &[
    "#e74c3c", "#2980b9", "#27ae60", "#f39c12", "#8e44ad", "#16a085", "#d35400", "#2c3e50",
];

pub struct Visualizer {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer { width: 900.0, height: 900.0, margin: 50.0, node_radius: 6.0 }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render every route as a depot-bracketed polyline, colored by route index.
    pub fn generate_svg(&self, instance: &Instance, solution: &Solution) -> String {
        let (min_x, max_x, min_y, max_y) = self.bounds(instance);
        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        let mut svg = String::new();
        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #3498db; stroke: #2c3e50; stroke-width: 1.5; }}
    .depot {{ fill: #2c3e50; stroke: #000000; stroke-width: 1.5; }}
    .label {{ font-family: Arial; font-size: 9px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">{} | cost={:.2} | vehicles={}</text>
"##,
            self.margin,
            instance.name,
            solution.cost,
            solution.num_vehicles()
        ));

        let depot = instance.depot();
        let (dx, dy) = transform(instance.nodes[depot].x, instance.nodes[depot].y);

        for (ridx, route) in solution.routes().iter().enumerate() {
            let color = ROUTE_COLORS[ridx % ROUTE_COLORS.len()];
            let mut points = Vec::with_capacity(route.len() + 2);
            points.push((dx, dy));
            for &c in &route.customers {
                points.push(transform(instance.nodes[c].x, instance.nodes[c].y));
            }
            points.push((dx, dy));

            let path: Vec<String> = points.iter().map(|(x, y)| format!("{:.2},{:.2}", x, y)).collect();
            svg.push_str(&format!(
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>
"#,
                path.join(" "),
                color
            ));

            for &c in &route.customers {
                let (cx, cy) = transform(instance.nodes[c].x, instance.nodes[c].y);
                svg.push_str(&format!(
                    r#"<circle cx="{:.2}" cy="{:.2}" r="{}" class="node"/>
<text x="{:.2}" y="{:.2}" class="label">{}</text>
"#,
                    cx,
                    cy,
                    self.node_radius,
                    cx + self.node_radius + 1.0,
                    cy - self.node_radius,
                    instance.nodes[c].id
                ));
            }
        }

        svg.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" class="depot"/>
"#,
            dx,
            dy,
            self.node_radius * 1.3
        ));

        svg.push_str("</svg>\n");
        svg
    }

    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())
    }

    /// Render an SVG string to a PNG file. Requires the `resvg` feature;
    /// without it, this simply writes the SVG text and returns an error
    /// describing the missing feature (matching the "optional plotter" spec
    /// surface: callers that only pass `--plot` still get the `.svg`).
    #[cfg(feature = "resvg")]
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("usvg parse error: {e}")))?;
        let mut pixmap = Pixmap::new(self.width as u32, self.height as u32)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "failed to create pixmap"))?;
        render(&tree, FitTo::Original, Transform::default(), pixmap.as_mut())
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "resvg render failed"))?;
        pixmap
            .save_png(path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("save_png failed: {e}")))
    }

    #[cfg(not(feature = "resvg"))]
    pub fn save_png<P: AsRef<Path>>(&self, _svg: &str, _path: P) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "PNG rendering requires building with --features resvg",
        ))
    }

    fn bounds(&self, instance: &Instance) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for node in &instance.nodes {
            min_x = min_x.min(node.x);
            max_x = max_x.max(node.x);
            min_y = min_y.min(node.y);
            max_y = max_y.max(node.y);
        }
        (min_x, max_x, min_y, max_y)
    }
}
