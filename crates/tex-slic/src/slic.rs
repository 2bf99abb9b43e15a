//! SLIC superpixel segmentation.
//!
//! # Overview
//!
//! [`SlicSegmenter`] implements simple linear iterative clustering over a
//! float RGBA buffer. Clusters are seeded on a regular `s x s` grid, each
//! center perturbed within a small neighborhood to the position of lowest
//! image gradient, and each cluster mean initialized to its grid cell
//! average. The caller then drives [`SlicSegmenter::step`] a fixed number
//! of times; no convergence test is performed.
//!
//! One step runs four phases:
//!
//! 1. reset accumulators and assignments (steps after the first)
//! 2. assignment of every pixel to the nearest cluster among those whose
//!    `2s x 2s` neighborhood covers it, parallelized over pixel rows
//! 3. mean update with optional outlier rejection and recentering
//! 4. per-channel standard deviation update
//!
//! The color distance is `sqrt(dr^2 + dg^2 + db^2 * da^2)`; note the blue
//! and alpha squares multiply rather than add. Segmentations produced by
//! this metric are load-bearing downstream, so the metric is frozen.

use rayon::prelude::*;
use tracing::debug;

use tex_core::PixelBuffer;

use crate::error::{SlicError, SlicResult};

/// Tuning parameters for the segmentation.
#[derive(Debug, Clone, Copy)]
pub struct SlicParams {
    /// Superpixel grid spacing `s`; width and height must be multiples.
    pub superpixel_size: u32,
    /// Compactness `m`, the weight of spatial distance against color
    /// distance.
    pub compactness: f32,
    /// Outlier threshold in standard deviations; zero disables rejection.
    pub outlier_threshold: f32,
    /// Odd diameter of the seed perturbation neighborhood, below
    /// `superpixel_size`.
    pub gradient_neighborhood: u32,
    /// Move cluster centers to their accepted-pixel centroid each step.
    pub recenter: bool,
}

#[derive(Debug, Clone, Default)]
struct Cluster {
    i: u32,
    j: u32,
    x: i32,
    y: i32,
    count: u32,
    sum_x: i64,
    sum_y: i64,
    sum_pixel: [f32; 4],
    sum_sq_dev: [f32; 4],
}

#[derive(Debug, Clone, Copy)]
struct Assignment {
    cluster: u32,
    dist: f32,
}

/// Iterative SLIC segmenter over a float RGBA buffer.
pub struct SlicSegmenter {
    input: PixelBuffer,
    params: SlicParams,
    kw: u32,
    kh: u32,
    clusters: Vec<Cluster>,
    assignments: Vec<Option<Assignment>>,
    mean: PixelBuffer,
    stddev: PixelBuffer,
    outlier_mask: PixelBuffer,
}

impl SlicSegmenter {
    /// Seeds the cluster grid over `input`.
    ///
    /// `input` must be float RGBA with both dimensions at least
    /// `superpixel_size` and divisible by it; the gradient neighborhood
    /// must be odd and smaller than `superpixel_size`.
    pub fn new(input: PixelBuffer, params: SlicParams) -> SlicResult<Self> {
        if input.format() != tex_core::F32_RGBA {
            return Err(SlicError::InvalidInput(format!(
                "{:?}/{:?} (float RGBA required)",
                input.element(),
                input.layout()
            )));
        }

        let s = params.superpixel_size;
        let n = params.gradient_neighborhood;
        if s == 0 || input.width() < s || input.height() < s {
            return Err(SlicError::InvalidInput(format!(
                "{}x{} smaller than superpixel size {s}",
                input.width(),
                input.height()
            )));
        }
        if input.width() % s != 0 || input.height() % s != 0 {
            return Err(SlicError::InvalidInput(format!(
                "{}x{} not divisible by superpixel size {s}",
                input.width(),
                input.height()
            )));
        }
        if n >= s || n % 2 != 1 {
            return Err(SlicError::InvalidParameter(format!(
                "gradient neighborhood {n} (odd and below {s} required)"
            )));
        }

        let kw = input.width() / s;
        let kh = input.height() / s;
        debug!(kw, kh, s, "seeding superpixel grid");

        let mean = PixelBuffer::new(kw, kh, kw, kh, tex_core::F32_RGBA)?;
        let stddev = PixelBuffer::new(kw, kh, kw, kh, tex_core::F32_RGBA)?;
        let outlier_mask = PixelBuffer::new(
            input.width(),
            input.height(),
            input.stride(),
            input.vstride(),
            tex_core::F32_RGBA,
        )?;

        let pixels = input.width() as usize * input.height() as usize;
        let mut segmenter = Self {
            input,
            params,
            kw,
            kh,
            clusters: vec![Cluster::default(); (kw * kh) as usize],
            assignments: vec![None; pixels],
            mean,
            stddev,
            outlier_mask,
        };
        segmenter.seed()?;
        Ok(segmenter)
    }

    /// Sum of the horizontal and vertical RGBA L2 gradient norms.
    fn gradient(&self, x: i64, y: i64) -> SlicResult<f32> {
        let p0 = self.input.clamped_pixel_f32(x + 1, y)?;
        let m0 = self.input.clamped_pixel_f32(x - 1, y)?;
        let zp = self.input.clamped_pixel_f32(x, y + 1)?;
        let zm = self.input.clamped_pixel_f32(x, y - 1)?;

        let mut gx = 0.0f32;
        let mut gy = 0.0f32;
        for c in 0..4 {
            let dx = p0[c] - m0[c];
            let dy = zp[c] - zm[c];
            gx += dx * dx;
            gy += dy * dy;
        }
        Ok(gx.sqrt() + gy.sqrt())
    }

    fn seed(&mut self) -> SlicResult<()> {
        let s = self.params.superpixel_size as i64;
        let n = self.params.gradient_neighborhood as i64;

        for i in 0..self.kh {
            for j in 0..self.kw {
                let cx = s * j as i64 + s / 2;
                let cy = s * i as i64 + s / 2;

                // perturb the center to the lowest gradient in the
                // neighborhood
                let x0 = cx - n / 2;
                let y0 = cy - n / 2;
                let mut best = (cx, cy, 0.0f32);
                for y in y0..y0 + n {
                    for x in x0..x0 + n {
                        let g = self.gradient(x, y)?;
                        if (x == x0 && y == y0) || g < best.2 {
                            best = (x, y, g);
                        }
                    }
                }

                // grid cell average seeds the cluster mean
                let mut avg = [0.0f32; 4];
                for y in (s * i as i64)..(s * (i as i64 + 1)) {
                    for x in (s * j as i64)..(s * (j as i64 + 1)) {
                        let pixel = self.input.pixel_f32(x as u32, y as u32)?;
                        for c in 0..4 {
                            avg[c] += pixel[c];
                        }
                    }
                }
                let area = (s * s) as f32;
                for c in avg.iter_mut() {
                    *c /= area;
                }

                let cluster = &mut self.clusters[(i * self.kw + j) as usize];
                cluster.i = i;
                cluster.j = j;
                cluster.x = best.0 as i32;
                cluster.y = best.1 as i32;
                self.mean.set_pixel_f32(j, i, avg)?;
            }
        }
        Ok(())
    }

    fn color_distance(mean: [f32; 4], pixel: [f32; 4]) -> f32 {
        let dr = pixel[0] - mean[0];
        let dg = pixel[1] - mean[1];
        let db = pixel[2] - mean[2];
        let da = pixel[3] - mean[3];
        // the blue and alpha squares multiply, not add
        (dr * dr + dg * dg + db * db * da * da).sqrt()
    }

    /// Runs one segmentation step.
    ///
    /// `step_index` is the zero-based iteration number; outlier rejection
    /// only activates from the second step on. The residual is not
    /// computed and the return value is always zero.
    pub fn step(&mut self, step_index: u32) -> SlicResult<f32> {
        let width = self.input.width();
        let height = self.input.height();
        let s = self.params.superpixel_size as i32;
        let spatial_weight = self.params.compactness / self.params.superpixel_size as f32;

        if step_index > 0 {
            for cluster in &mut self.clusters {
                cluster.count = 0;
                cluster.sum_x = 0;
                cluster.sum_y = 0;
                cluster.sum_pixel = [0.0; 4];
                cluster.sum_sq_dev = [0.0; 4];
            }
            self.assignments.fill(None);
        }

        // assignment: pixel rows in parallel, clusters visited in
        // row-major order so distance ties keep the first-seen cluster
        let input = &self.input;
        let clusters = &self.clusters;
        let mean = &self.mean;
        self.assignments
            .par_chunks_mut(width as usize)
            .enumerate()
            .try_for_each(|(y, row)| -> SlicResult<()> {
                let y = y as i32;
                let near_row: Vec<(u32, &Cluster)> = clusters
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| (c.y - y).abs() <= s)
                    .map(|(k, c)| (k as u32, c))
                    .collect();

                for (x, slot) in row.iter_mut().enumerate() {
                    let pixel = input.pixel_f32(x as u32, y as u32)?;
                    let x = x as i32;
                    for &(k, cluster) in &near_row {
                        if (cluster.x - x).abs() > s {
                            continue;
                        }
                        let avg = mean.pixel_f32(cluster.j, cluster.i)?;
                        let dx = (x - cluster.x) as f32;
                        let dy = (y - cluster.y) as f32;
                        let dist = Self::color_distance(avg, pixel)
                            + spatial_weight * (dx * dx + dy * dy).sqrt();
                        match slot {
                            Some(a) if a.dist <= dist => {}
                            _ => *slot = Some(Assignment { cluster: k, dist }),
                        }
                    }
                }
                Ok(())
            })?;

        // mean pass with optional outlier rejection against the previous
        // iteration's statistics
        let reject = step_index > 0 && self.params.outlier_threshold > 0.0;
        let sdx = self.params.outlier_threshold;
        const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
        const CLEAR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
        for y in 0..height {
            for x in 0..width {
                let Some(a) = self.assignments[(y * width + x) as usize] else {
                    continue;
                };
                let pixel = self.input.pixel_f32(x, y)?;
                let cluster = &self.clusters[a.cluster as usize];

                if reject {
                    let avg = self.mean.pixel_f32(cluster.j, cluster.i)?;
                    let dev = self.stddev.pixel_f32(cluster.j, cluster.i)?;
                    let outlier =
                        (0..4).any(|c| (pixel[c] - avg[c]).abs() > sdx * dev[c]);
                    if outlier {
                        self.outlier_mask.set_pixel_f32(x, y, RED)?;
                        continue;
                    }
                    self.outlier_mask.set_pixel_f32(x, y, CLEAR)?;
                }

                let cluster = &mut self.clusters[a.cluster as usize];
                cluster.count += 1;
                cluster.sum_x += x as i64;
                cluster.sum_y += y as i64;
                for c in 0..4 {
                    cluster.sum_pixel[c] += pixel[c];
                }
            }
        }

        for cluster in &mut self.clusters {
            if cluster.count == 0 {
                continue;
            }
            if self.params.recenter {
                cluster.x = (cluster.sum_x / cluster.count as i64) as i32;
                cluster.y = (cluster.sum_y / cluster.count as i64) as i32;
            }
            let mut avg = [0.0f32; 4];
            for c in 0..4 {
                avg[c] = cluster.sum_pixel[c] / cluster.count as f32;
            }
            self.mean.set_pixel_f32(cluster.j, cluster.i, avg)?;
        }

        // squared deviation from the new mean over every assigned pixel,
        // rejected outliers included
        for y in 0..height {
            for x in 0..width {
                let Some(a) = self.assignments[(y * width + x) as usize] else {
                    continue;
                };
                let pixel = self.input.pixel_f32(x, y)?;
                let cluster = &self.clusters[a.cluster as usize];
                let avg = self.mean.pixel_f32(cluster.j, cluster.i)?;

                let cluster = &mut self.clusters[a.cluster as usize];
                for c in 0..4 {
                    let d = pixel[c] - avg[c];
                    cluster.sum_sq_dev[c] += d * d;
                }
            }
        }

        for cluster in &mut self.clusters {
            if cluster.count == 0 {
                continue;
            }
            let mut dev = [0.0f32; 4];
            for c in 0..4 {
                dev[c] = (cluster.sum_sq_dev[c] / cluster.count as f32).sqrt();
            }
            self.stddev.set_pixel_f32(cluster.j, cluster.i, dev)?;
        }

        debug!(step_index, "slic step complete");
        Ok(0.0)
    }

    /// Cluster grid width.
    #[inline]
    pub fn grid_width(&self) -> u32 {
        self.kw
    }

    /// Cluster grid height.
    #[inline]
    pub fn grid_height(&self) -> u32 {
        self.kh
    }

    /// Number of clusters.
    #[inline]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// The segmented input.
    #[inline]
    pub fn input(&self) -> &PixelBuffer {
        &self.input
    }

    /// Per-cluster mean colors as a grid-sized float RGBA buffer.
    #[inline]
    pub fn mean(&self) -> &PixelBuffer {
        &self.mean
    }

    /// Per-cluster standard deviations as a grid-sized float RGBA buffer.
    #[inline]
    pub fn stddev(&self) -> &PixelBuffer {
        &self.stddev
    }

    /// Full-size mask of rejected pixels, painted opaque red.
    #[inline]
    pub fn outlier_mask(&self) -> &PixelBuffer {
        &self.outlier_mask
    }

    /// Maps a grid-sized per-cluster feature buffer back onto the pixel
    /// grid via the recorded assignments.
    pub fn render(&self, features: &PixelBuffer) -> SlicResult<PixelBuffer> {
        if features.format() != tex_core::F32_RGBA
            || features.width() != self.kw
            || features.height() != self.kh
        {
            return Err(SlicError::InvalidInput(format!(
                "feature buffer {}x{} {:?}/{:?} (grid-sized float RGBA required)",
                features.width(),
                features.height(),
                features.element(),
                features.layout()
            )));
        }

        let width = self.input.width();
        let height = self.input.height();
        let mut out = PixelBuffer::new(width, height, width, height, tex_core::F32_RGBA)?;
        for y in 0..height {
            for x in 0..width {
                let Some(a) = self.assignments[(y * width + x) as usize] else {
                    continue;
                };
                let cluster = &self.clusters[a.cluster as usize];
                let pixel = features.pixel_f32(cluster.j, cluster.i)?;
                out.set_pixel_f32(x, y, pixel)?;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(s: u32) -> SlicParams {
        SlicParams {
            superpixel_size: s,
            compactness: 10.0,
            outlier_threshold: 0.0,
            gradient_neighborhood: 1,
            recenter: false,
        }
    }

    fn quadrants(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h, w, h, tex_core::F32_RGBA).unwrap();
        for y in 0..h {
            for x in 0..w {
                let r = if x < w / 2 { 0.2 } else { 0.8 };
                let g = if y < h / 2 { 0.3 } else { 0.7 };
                buf.set_pixel_f32(x, y, [r, g, 0.5, 1.0]).unwrap();
            }
        }
        buf
    }

    #[test]
    fn test_new_validation() {
        let input = quadrants(8, 8);
        assert!(SlicSegmenter::new(input.clone(), params(3)).is_err()); // 8 % 3
        assert!(SlicSegmenter::new(input.clone(), params(16)).is_err()); // too big

        let mut p = params(4);
        p.gradient_neighborhood = 2; // even
        assert!(SlicSegmenter::new(input.clone(), p).is_err());
        let mut p = params(4);
        p.gradient_neighborhood = 5; // >= s
        assert!(SlicSegmenter::new(input, p).is_err());

        let bytes = PixelBuffer::new(8, 8, 8, 8, tex_core::U8_RGBA).unwrap();
        assert!(SlicSegmenter::new(bytes, params(4)).is_err());
    }

    #[test]
    fn test_grid_setup() {
        let slic = SlicSegmenter::new(quadrants(8, 8), params(4)).unwrap();
        assert_eq!((slic.grid_width(), slic.grid_height()), (2, 2));
        assert_eq!(slic.cluster_count(), 4);
    }

    #[test]
    fn test_full_coverage_after_step() {
        let mut slic = SlicSegmenter::new(quadrants(8, 8), params(4)).unwrap();
        slic.step(0).unwrap();
        assert!(slic.assignments.iter().all(|a| a.is_some()));
    }

    #[test]
    fn test_quadrant_means() {
        // four uniform quadrants with s equal to the quadrant size
        // converge immediately
        let mut slic = SlicSegmenter::new(quadrants(8, 8), params(4)).unwrap();
        slic.step(0).unwrap();

        let mean = slic.mean();
        let tl = mean.pixel_f32(0, 0).unwrap();
        assert_relative_eq!(tl[0], 0.2, epsilon = 1e-5);
        assert_relative_eq!(tl[1], 0.3, epsilon = 1e-5);
        let br = mean.pixel_f32(1, 1).unwrap();
        assert_relative_eq!(br[0], 0.8, epsilon = 1e-5);
        assert_relative_eq!(br[1], 0.7, epsilon = 1e-5);

        // uniform quadrants have zero deviation
        let dev = slic.stddev().pixel_f32(0, 0).unwrap();
        assert_relative_eq!(dev[0], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_step_returns_zero_residual() {
        let mut slic = SlicSegmenter::new(quadrants(8, 8), params(4)).unwrap();
        assert_eq!(slic.step(0).unwrap(), 0.0);
        assert_eq!(slic.step(1).unwrap(), 0.0);
    }

    #[test]
    fn test_render_maps_cluster_features() {
        let mut slic = SlicSegmenter::new(quadrants(8, 8), params(4)).unwrap();
        slic.step(0).unwrap();

        let out = slic.render(&slic.mean().clone()).unwrap();
        assert_eq!((out.width(), out.height()), (8, 8));
        // every pixel carries its quadrant's mean color
        let p = out.pixel_f32(1, 1).unwrap();
        assert_relative_eq!(p[0], 0.2, epsilon = 1e-5);
        let p = out.pixel_f32(7, 7).unwrap();
        assert_relative_eq!(p[0], 0.8, epsilon = 1e-5);

        let wrong = PixelBuffer::new(3, 3, 3, 3, tex_core::F32_RGBA).unwrap();
        assert!(slic.render(&wrong).is_err());
    }

    #[test]
    fn test_outlier_rejection_marks_mask() {
        // one hot pixel in an otherwise uniform image
        let mut input = PixelBuffer::new(8, 8, 8, 8, tex_core::F32_RGBA).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                input.set_pixel_f32(x, y, [0.5, 0.5, 0.5, 1.0]).unwrap();
            }
        }
        input.set_pixel_f32(1, 1, [1.0, 0.5, 0.5, 1.0]).unwrap();

        let mut p = params(4);
        p.outlier_threshold = 2.0;
        let mut slic = SlicSegmenter::new(input, p).unwrap();
        slic.step(0).unwrap();
        slic.step(1).unwrap();

        let mask = slic.outlier_mask();
        assert_relative_eq!(mask.pixel_f32(1, 1).unwrap()[0], 1.0);
        assert_relative_eq!(mask.pixel_f32(5, 5).unwrap()[0], 0.0);
    }
}
