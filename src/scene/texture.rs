use image::{DynamicImage, GenericImageView};
use log::info;
use nalgebra::Vector3;
use std::path::Path;
use std::sync::Arc;

/// A 2D texture with bilinear sampling. UVs wrap (repeat) on both axes.
#[derive(Debug, Clone)]
pub struct Texture {
    image: Arc<DynamicImage>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let image =
            image::open(path).map_err(|e| format!("failed to load texture {path:?}: {e}"))?;
        let (width, height) = (image.width(), image.height());
        info!("loaded texture {path:?} ({width}x{height})");
        Ok(Self {
            image: Arc::new(image),
            width,
            height,
        })
    }

    /// Samples a color map: bilinear filter plus sRGB -> linear conversion
    /// (gamma 2.2 approximation). Use for albedo and emissive maps.
    pub fn sample_color(&self, u: f32, v: f32) -> Vector3<f32> {
        let raw = self.sample_data(u, v);
        Vector3::new(raw.x.powf(2.2), raw.y.powf(2.2), raw.z.powf(2.2))
    }

    /// Samples raw data in [0, 1] without color-space conversion. Use for
    /// normal maps and metallic/roughness/AO packs, which are not colors.
    pub fn sample_data(&self, u: f32, v: f32) -> Vector3<f32> {
        // Repeat wrapping via fract, shifted into [0, 1) for negatives.
        let wrap = |t: f32| {
            let f = t.fract();
            if f < 0.0 { f + 1.0 } else { f }
        };
        let u = wrap(u);
        let v = wrap(v);

        // Pixel centers sit at half-texel offsets; V flips to image rows.
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5;

        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let wx = x - x.floor();
        let wy = y - y.floor();

        let c00 = self.texel(x0, y0);
        let c10 = self.texel(x0 + 1, y0);
        let c01 = self.texel(x0, y0 + 1);
        let c11 = self.texel(x0 + 1, y0 + 1);

        let top = c00 * (1.0 - wx) + c10 * wx;
        let bottom = c01 * (1.0 - wx) + c11 * wx;
        top * (1.0 - wy) + bottom * wy
    }

    fn texel(&self, x: i32, y: i32) -> Vector3<f32> {
        let w = self.width as i32;
        let h = self.height as i32;
        // Euclidean modulo so negative coordinates wrap correctly.
        let x = ((x % w) + w) % w;
        let y = ((y % h) + h) % h;
        let pixel = self.image.get_pixel(x as u32, y as u32);
        Vector3::new(
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn checker() -> Texture {
        // 2x2: white / black in opposite corners.
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 0, 255]));
        Texture {
            image: Arc::new(DynamicImage::ImageRgba8(img)),
            width: 2,
            height: 2,
        }
    }

    #[test]
    fn samples_texel_centers_exactly() {
        let tex = checker();
        // (0.25, 0.75) is the center of the top-left (white) texel.
        let white = tex.sample_data(0.25, 0.75);
        assert!((white.x - 1.0).abs() < 1e-6);
        let black = tex.sample_data(0.75, 0.75);
        assert!(black.x.abs() < 1e-6);
    }

    #[test]
    fn uv_wraps_outside_unit_range() {
        let tex = checker();
        let a = tex.sample_data(0.25, 0.75);
        let b = tex.sample_data(1.25, 0.75);
        let c = tex.sample_data(-0.75, 0.75);
        assert!((a - b).norm() < 1e-6);
        assert!((a - c).norm() < 1e-6);
    }

    #[test]
    fn color_sampling_applies_gamma() {
        let tex = checker();
        let mid = tex.sample_data(0.5, 0.5); // bilinear blend of all four texels
        let linear = tex.sample_color(0.5, 0.5);
        assert!(linear.x < mid.x); // gamma 2.2 darkens midtones
    }
}
