//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};

/// 3D position vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            Self::ZERO
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// Linear RGB color with components nominally in 0..1
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };
    pub const CYAN: Self = Self { r: 0.0, g: 1.0, b: 1.0 };
    pub const MAGENTA: Self = Self { r: 1.0, g: 0.0, b: 1.0 };
    pub const YELLOW: Self = Self { r: 1.0, g: 1.0, b: 0.0 };
    pub const RED: Self = Self { r: 1.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// 0xRRGGBB, each channel mapped onto 0..1
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    /// Parse "#RRGGBB" (leading '#' optional)
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    /// HSL to RGB. Hue wraps into 0..1, saturation and lightness are clamped.
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = l as f32;
            return Self::new(v, v, v);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        Self {
            r: hue_to_channel(q, p, h + 1.0 / 3.0) as f32,
            g: hue_to_channel(q, p, h) as f32,
            b: hue_to_channel(q, p, h - 1.0 / 3.0) as f32,
        }
    }

    pub fn lerp(&self, target: &Self, t: f32) -> Self {
        Self {
            r: self.r + (target.r - self.r) * t,
            g: self.g + (target.g - self.g) * t,
            b: self.b + (target.b - self.b) * t,
        }
    }

    pub fn to_hex_string(&self) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    pub fn channels(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

/// Row-major 3x3 rotation matrix
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Mat3 {
    pub rows: [[f32; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Self = Self {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Rotation of `angle` radians around a unit `axis` (Rodrigues form)
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let Vec3 { x, y, z } = axis;
        Self {
            rows: [
                [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
                [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
                [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
            ],
        }
    }

    pub fn rotation_z(angle: f32) -> Self {
        Self::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), angle)
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3 {
            x: r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            y: r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            z: r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        }
    }
}

/// Placement of one member of an instanced group (asteroid, cloud billboard)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct InstanceTransform {
    pub position: Vec3,
    /// Euler angles (XYZ order), radians
    pub rotation: Vec3,
    pub scale: f32,
}

/// Heading (radians around +Y) that turns an object at `position` to face the origin.
///
/// Uses the camera convention: yaw 0 looks down -Z.
pub fn yaw_towards_origin(position: Vec3) -> f32 {
    position.x.atan2(position.z)
}

/// Hermite smoothstep of `x` between `edge0` and `edge1`
pub fn smoothstep(x: f32, edge0: f32, edge1: f32) -> f32 {
    if x <= edge0 {
        return 0.0;
    }
    if x >= edge1 {
        return 1.0;
    }
    let t = (x - edge0) / (edge1 - edge0);
    t * t * (3.0 - 2.0 * t)
}

/// Per-frame lerp factor `k` tuned at 60 Hz, rescaled for a frame of `dt` seconds
pub fn frame_blend(k: f32, dt: f32) -> f32 {
    1.0 - (1.0 - k).powf(60.0 * dt.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        let sum = a + b;
        assert_eq!(sum.x, 5.0);
        assert_eq!(sum.y, 7.0);
        assert_eq!(sum.z, 9.0);

        let diff = b - a;
        assert_eq!(diff.x, 3.0);

        let scaled = a * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);

        assert_eq!(a.dot(&b), 32.0);
        let c = Vec3::new(1.0, 0.0, 0.0).cross(&Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(c, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_vec3_normalize() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        let n = v.normalize();
        assert!((n.length() - 1.0).abs() < 0.001);
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::from_hex(0x00ffff), Color::CYAN);
        assert_eq!(Color::parse_hex("#FF0000"), Some(Color::RED));
        assert_eq!(Color::parse_hex("ff00"), None);
        assert_eq!(Color::YELLOW.to_hex_string(), "#FFFF00");
    }

    #[test]
    fn test_color_hsl() {
        let red = Color::from_hsl(0.0, 1.0, 0.5);
        assert!((red.r - 1.0).abs() < 1e-6 && red.g.abs() < 1e-6 && red.b.abs() < 1e-6);

        let grey = Color::from_hsl(0.3, 0.0, 0.25);
        assert_eq!(grey, Color::new(0.25, 0.25, 0.25));

        // hue wraps
        assert_eq!(Color::from_hsl(1.25, 0.6, 0.4), Color::from_hsl(0.25, 0.6, 0.4));
    }

    #[test]
    fn test_axis_angle_rotation() {
        let m = Mat3::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), std::f32::consts::FRAC_PI_2);
        let v = m.apply(Vec3::new(1.0, 0.0, 0.0));
        assert!(v.x.abs() < 1e-6);
        assert!((v.z + 1.0).abs() < 1e-6);

        let identity = Mat3::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), 0.0);
        assert_eq!(identity.apply(Vec3::new(2.0, 3.0, 4.0)), Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_yaw_faces_origin() {
        // an object on +Z faces -Z, i.e. yaw 0
        assert!(yaw_towards_origin(Vec3::new(0.0, 0.0, 10.0)).abs() < 1e-6);
        // an object on +X turns a quarter turn to look down -X
        let yaw = yaw_towards_origin(Vec3::new(10.0, 0.0, 0.0));
        assert!((yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_frame_blend() {
        assert!((frame_blend(0.1, 1.0 / 60.0) - 0.1).abs() < 1e-6);
        // two half frames equal one full frame
        let half = frame_blend(0.05, 1.0 / 120.0);
        let two_halves = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((two_halves - 0.05).abs() < 1e-6);
        assert_eq!(frame_blend(0.1, 0.0), 0.0);
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0, 0.2, 0.9), 0.0);
        assert_eq!(smoothstep(1.0, 0.2, 0.9), 1.0);
        assert!((smoothstep(0.55, 0.2, 0.9) - 0.5).abs() < 1e-6);
    }
}
