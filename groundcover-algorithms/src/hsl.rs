use groundcover_core::{cloud::PointCloud, nalgebra::Vector3, Result};

pub const HUE_LAYER: &str = "H";
pub const SATURATION_LAYER: &str = "S";
pub const LIGHTNESS_LAYER: &str = "L";

/// A color in hue/saturation/lightness space. `h` is in degrees in `[0, 360)`, `s` and `l` are in `[0, 1]`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Converts an 8-bit RGB color into HSL. Greys (including black and white) have hue and saturation `0`
///
/// # Examples
///
/// ```
/// # use groundcover_core::nalgebra::Vector3;
/// # use groundcover_algorithms::hsl::rgb_to_hsl;
/// let blue = rgb_to_hsl(&Vector3::new(0, 0, 255));
/// assert_eq!(blue.h, 240.0);
/// assert_eq!(blue.s, 1.0);
/// assert_eq!(blue.l, 0.5);
/// ```
pub fn rgb_to_hsl(color: &Vector3<u8>) -> Hsl {
    let r = color.x as f64 / 255.0;
    let g = color.y as f64 / 255.0;
    let b = color.z as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;
    if delta == 0.0 {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let sector = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let h = (sector * 60.0) % 360.0;

    Hsl { h, s, l }
}

/// Computes the HSL representation of every point color of `cloud` and writes it into the layers `H`, `S` and `L`
pub fn compute_hsl_layers(cloud: &mut PointCloud) -> Result<()> {
    let count = cloud.len();
    let mut hues = Vec::with_capacity(count);
    let mut saturations = Vec::with_capacity(count);
    let mut lightnesses = Vec::with_capacity(count);
    for color in cloud.colors() {
        let hsl = rgb_to_hsl(color);
        hues.push(hsl.h);
        saturations.push(hsl.s);
        lightnesses.push(hsl.l);
    }

    cloud.store_layer(HUE_LAYER, &hues)?;
    cloud.store_layer(SATURATION_LAYER, &saturations)?;
    cloud.store_layer(LIGHTNESS_LAYER, &lightnesses)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_primaries() {
        let red = rgb_to_hsl(&Vector3::new(255, 0, 0));
        assert_eq!((red.h, red.s, red.l), (0.0, 1.0, 0.5));
        let green = rgb_to_hsl(&Vector3::new(0, 255, 0));
        assert_eq!((green.h, green.s, green.l), (120.0, 1.0, 0.5));
        let magenta = rgb_to_hsl(&Vector3::new(255, 0, 255));
        assert_approx_eq!(magenta.h, 300.0);
    }

    #[test]
    fn test_greys() {
        for value in [0u8, 128, 255].iter() {
            let grey = rgb_to_hsl(&Vector3::new(*value, *value, *value));
            assert_eq!(grey.h, 0.0);
            assert_eq!(grey.s, 0.0);
            assert_approx_eq!(grey.l, *value as f64 / 255.0);
        }
    }

    #[test]
    fn test_hue_stays_below_360() {
        // Red dominant with a little more blue than green lands just below 360 degrees
        let hsl = rgb_to_hsl(&Vector3::new(255, 0, 1));
        assert!(hsl.h > 359.0 && hsl.h < 360.0);
    }

    #[test]
    fn test_mixed_colors() {
        let grass = rgb_to_hsl(&Vector3::new(40, 140, 40));
        assert_approx_eq!(grass.h, 120.0);
        assert_approx_eq!(grass.l, 180.0 / 510.0);

        let purple = rgb_to_hsl(&Vector3::new(140, 60, 160));
        assert_approx_eq!(purple.h, 288.0);
        assert_approx_eq!(purple.l, 220.0 / 510.0);
        assert_approx_eq!(purple.s, 100.0 / 220.0);
    }

    #[test]
    fn test_compute_hsl_layers() {
        let mut cloud = PointCloud::from_points(
            "hsl",
            vec![Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0)],
            vec![Vector3::new(0, 0, 255), Vector3::new(255, 255, 255)],
        )
        .unwrap();
        compute_hsl_layers(&mut cloud).unwrap();
        assert_eq!(cloud.read_layer(HUE_LAYER).unwrap(), &[240.0, 0.0]);
        assert_eq!(cloud.read_layer(SATURATION_LAYER).unwrap(), &[1.0, 0.0]);
        assert_eq!(cloud.read_layer(LIGHTNESS_LAYER).unwrap(), &[0.5, 1.0]);
    }
}
