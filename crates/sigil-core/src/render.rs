//! Offscreen rasterization of the tessellated domain.
//!
//! The canvas starts opaque white; the domain disk is filled black and the
//! cell walls are stroked white, so the post-processing pass can separate
//! background from inked pixels by the red channel alone.

use crate::config::LogoConfig;
use crate::geometry::Circle;
use crate::mesh::PolyMesh;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Half-extent of the world viewport; gives the unit domain a 1 % margin.
pub const VIEW_MARGIN: f64 = 1.01;

/// Stretch factor for facets crossing the domain boundary.
pub const SPIKE_EXTENSION: f64 = 1.1;

const POINTS_PER_INCH: f64 = 72.0;

const CANVAS_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const DOMAIN_COLOR: [u8; 3] = [0, 0, 0];
const LINE_COLOR: [u8; 3] = [255, 255, 255];

/// A 2-point segment in world coordinates.
pub type Edge = [[f64; 2]; 2];

/// Scoped raster target: created, drawn into, and consumed within one render
/// call, so no drawing state outlives the rasterization.
pub struct RenderContext {
    size: u32,
    scale: f64,
    image: RgbaImage,
}

impl RenderContext {
    /// Square canvas of `size` pixels, opaque white, mapping the world
    /// viewport `[-VIEW_MARGIN, VIEW_MARGIN]^2` with the y axis pointing up.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            scale: size as f64 / (2.0 * VIEW_MARGIN),
            image: RgbaImage::from_pixel(size, size, CANVAS_COLOR),
        }
    }

    fn to_px(&self, p: [f64; 2]) -> [f64; 2] {
        [
            (p[0] + VIEW_MARGIN) * self.scale,
            (VIEW_MARGIN - p[1]) * self.scale,
        ]
    }

    /// Fill a disk with a one-pixel anti-aliased rim, no edge stroke.
    pub fn fill_disk(&mut self, circle: &Circle, color: [u8; 3]) {
        let center = self.to_px(circle.center);
        let radius = circle.radius * self.scale;
        let row_bytes = self.size as usize * 4;
        let buffer: &mut [u8] = &mut self.image;
        buffer
            .par_chunks_exact_mut(row_bytes)
            .enumerate()
            .for_each(|(row, line)| {
                let dy = row as f64 + 0.5 - center[1];
                for (col, px) in line.chunks_exact_mut(4).enumerate() {
                    let dx = col as f64 + 0.5 - center[0];
                    let dist = (dx * dx + dy * dy).sqrt() - radius;
                    let coverage = (0.5 - dist).clamp(0.0, 1.0);
                    if coverage > 0.0 {
                        blend(px, color, coverage);
                    }
                }
            });
    }

    /// Stroke a round-capped segment of `width_px` pixels.
    pub fn stroke_segment(&mut self, a: [f64; 2], b: [f64; 2], width_px: f64, color: [u8; 3]) {
        let pa = self.to_px(a);
        let pb = self.to_px(b);
        let half = width_px * 0.5;
        let reach = half + 1.0;
        let max_px = (self.size - 1) as f64;
        let min_x = (pa[0].min(pb[0]) - reach).floor().clamp(0.0, max_px) as u32;
        let max_x = (pa[0].max(pb[0]) + reach).ceil().clamp(0.0, max_px) as u32;
        let min_y = (pa[1].min(pb[1]) - reach).floor().clamp(0.0, max_px) as u32;
        let max_y = (pa[1].max(pb[1]) + reach).ceil().clamp(0.0, max_px) as u32;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f64 + 0.5, y as f64 + 0.5];
                let dist = segment_distance(p, pa, pb);
                let coverage = (half - dist + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let px = self.image.get_pixel_mut(x, y);
                    blend_pixel(px, color, coverage);
                }
            }
        }
    }

    /// Tear down the context and hand the raster over.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

fn blend(px: &mut [u8], color: [u8; 3], coverage: f64) {
    for ch in 0..3 {
        let src = color[ch] as f64;
        let dst = px[ch] as f64;
        px[ch] = (src * coverage + dst * (1.0 - coverage)).round() as u8;
    }
    px[3] = 255;
}

fn blend_pixel(px: &mut Rgba<u8>, color: [u8; 3], coverage: f64) {
    blend(&mut px.0, color, coverage);
}

/// Euclidean distance from `p` to the segment `ab`.
fn segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
    let t = if len_sq > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dx = ap[0] - t * ab[0];
    let dy = ap[1] - t * ab[1];
    (dx * dx + dy * dy).sqrt()
}

/// Stroke width in pixels: `line_width_scale * canvas_size / 100` interpreted
/// as printer's points and converted at the configured raster density.
pub fn stroke_width_px(config: &LogoConfig) -> f64 {
    let points = config.line_width_scale * config.canvas_size as f64 / 100.0;
    points * config.dpi as f64 / POINTS_PER_INCH
}

/// Facets with exactly one endpoint on the domain boundary, stretched by
/// `SPIKE_EXTENSION` from the interior endpoint through the boundary one.
/// Facets with zero or two boundary endpoints are left alone.
pub fn boundary_spikes(mesh: &PolyMesh, domain: &Circle) -> Vec<Edge> {
    let mut spikes = Vec::new();
    for facet in &mesh.facets {
        let a = mesh.points[facet[0]];
        let b = mesh.points[facet[1]];
        match (domain.on_boundary(a), domain.on_boundary(b)) {
            (true, false) => {
                let u = [a[0] - b[0], a[1] - b[1]];
                spikes.push([
                    [b[0] + SPIKE_EXTENSION * u[0], b[1] + SPIKE_EXTENSION * u[1]],
                    b,
                ]);
            }
            (false, true) => {
                let u = [b[0] - a[0], b[1] - a[1]];
                spikes.push([
                    a,
                    [a[0] + SPIKE_EXTENSION * u[0], a[1] + SPIKE_EXTENSION * u[1]],
                ]);
            }
            _ => {}
        }
    }
    spikes
}

/// Rasterize the mesh: black domain disk, white interior cell walls, and the
/// pre-computed boundary spikes overshooting the circle edge.
pub fn render_mesh(
    mesh: &PolyMesh,
    spikes: &[Edge],
    domain: &Circle,
    config: &LogoConfig,
) -> RgbaImage {
    let mut ctx = RenderContext::new(config.canvas_size);
    ctx.fill_disk(domain, DOMAIN_COLOR);

    let width_px = stroke_width_px(config);
    for (facet, pair) in mesh.facets.iter().zip(&mesh.facet_neighbors) {
        // Walls facing outside the domain stay invisible.
        if pair[0] < 0 || pair[1] < 0 {
            continue;
        }
        ctx.stroke_segment(
            mesh.points[facet[0]],
            mesh.points[facet[1]],
            width_px,
            LINE_COLOR,
        );
    }
    for edge in spikes {
        ctx.stroke_segment(edge[0], edge[1], width_px, LINE_COLOR);
    }
    ctx.into_image()
}
