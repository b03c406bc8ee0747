use nalgebra::Vector3;
use std::cell::UnsafeCell;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Number of striped color locks. One lock per pixel would be wasteful;
/// striping keeps contention low at a fraction of the memory.
const COLOR_LOCK_STRIPES: usize = 512;

/// Color + depth target with optional supersampling (the software stand-in
/// for the original window's 4x MSAA hint). Depth lives in atomics so the
/// rasterizer can test-and-write from rayon workers; color writes go through
/// striped locks.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    /// f32 depth stored as bit patterns; INFINITY when cleared.
    depth: Vec<AtomicU32>,
    /// Linear RGB samples. Interior mutability is safe because every write
    /// path holds the stripe lock for the target index.
    color: UnsafeCell<Vec<Vector3<f32>>>,
    locks: Vec<Mutex<()>>,
}

// Safety: depth is atomic and color writes are serialized per stripe.
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        let inf = f32::INFINITY.to_bits();
        let depth = (0..size).map(|_| AtomicU32::new(inf)).collect();
        let locks = (0..COLOR_LOCK_STRIPES).map(|_| Mutex::new(())).collect();

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            depth,
            color: UnsafeCell::new(vec![Vector3::zeros(); size]),
            locks,
        }
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    /// Resets every sample. `shade` receives the *output* pixel coordinate,
    /// so backgrounds resolve to the same color for all samples of a pixel.
    pub fn clear_with(&mut self, depth: f32, shade: impl Fn(usize, usize) -> Vector3<f32>) {
        let bits = depth.to_bits();
        for d in &self.depth {
            d.store(bits, Ordering::Relaxed);
        }

        let buffer = self.color.get_mut();
        for sy in 0..self.buffer_height {
            let py = sy / self.sample_count;
            for sx in 0..self.buffer_width {
                buffer[sy * self.buffer_width + sx] = shade(sx / self.sample_count, py);
            }
        }
    }

    /// Atomic depth test; on success the depth buffer already holds the new
    /// value and the caller may write the color.
    #[inline]
    pub fn depth_test_and_update(&self, x: usize, y: usize, new_depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let slot = &self.depth[self.index(x, y)];
        let new_bits = new_depth.to_bits();

        let mut seen = slot.load(Ordering::Relaxed);
        loop {
            if new_depth >= f32::from_bits(seen) {
                return false;
            }
            match slot.compare_exchange_weak(seen, new_bits, Ordering::Acquire, Ordering::Relaxed) {
                Ok(_) => return true,
                Err(actual) => seen = actual,
            }
        }
    }

    /// Writes one sample. Only call after a successful depth test.
    #[inline]
    pub fn write_color(&self, x: usize, y: usize, color: Vector3<f32>) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        let _guard = self.locks[idx % self.locks.len()].lock().unwrap();
        // Safe: this stripe's lock is held.
        unsafe {
            (&mut (*self.color.get()))[idx] = color;
        }
    }

    /// Resolves an output pixel by box-filtering its samples. Intended for
    /// after rendering finishes; reads are unsynchronized.
    pub fn resolve_pixel(&self, x: usize, y: usize) -> Option<Vector3<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let buffer = unsafe { &*self.color.get() };

        if self.sample_count == 1 {
            return Some(buffer[self.index(x, y)]);
        }

        let mut sum = Vector3::zeros();
        let (sx, sy) = (x * self.sample_count, y * self.sample_count);
        for dy in 0..self.sample_count {
            for dx in 0..self.sample_count {
                sum += buffer[self.index(sx + dx, sy + dy)];
            }
        }
        Some(sum / (self.sample_count * self.sample_count) as f32)
    }

    /// Raw depth readback for one sample, mainly for tests.
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(f32::from_bits(
            self.depth[self.index(x, y)].load(Ordering::Relaxed),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_accepts_closer_rejects_farther() {
        let fb = FrameBuffer::new(4, 4, 1);
        assert!(fb.depth_test_and_update(1, 1, 0.5));
        assert!(!fb.depth_test_and_update(1, 1, 0.7));
        assert!(fb.depth_test_and_update(1, 1, 0.2));
        assert_eq!(fb.depth_at(1, 1), Some(0.2));
    }

    #[test]
    fn clear_resets_depth_and_color() {
        let mut fb = FrameBuffer::new(2, 2, 1);
        fb.depth_test_and_update(0, 0, 0.1);
        fb.write_color(0, 0, Vector3::new(1.0, 0.0, 0.0));

        fb.clear_with(f32::INFINITY, |_, _| Vector3::new(0.2, 0.2, 0.2));
        assert_eq!(fb.depth_at(0, 0), Some(f32::INFINITY));
        assert_eq!(fb.resolve_pixel(0, 0), Some(Vector3::new(0.2, 0.2, 0.2)));
    }

    #[test]
    fn resolve_averages_samples() {
        let mut fb = FrameBuffer::new(1, 1, 2);
        fb.clear_with(f32::INFINITY, |_, _| Vector3::zeros());
        // Paint two of the four samples white.
        fb.write_color(0, 0, Vector3::new(1.0, 1.0, 1.0));
        fb.write_color(1, 0, Vector3::new(1.0, 1.0, 1.0));
        let resolved = fb.resolve_pixel(0, 0).unwrap();
        assert!((resolved.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let fb = FrameBuffer::new(2, 2, 1);
        assert!(!fb.depth_test_and_update(10, 0, 0.1));
        assert!(fb.resolve_pixel(2, 0).is_none());
    }
}
