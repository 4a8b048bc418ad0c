//! Rotation primitives - bone-local orientation as quaternion or Euler angles
//!
//! Euler angles follow the rig convention: degrees, applied Z then X then Y
//! (composed as `Y * X * Z`), each angle reported in `[0, 360)`.

/// Bone-local Euler angles in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl EulerAngles {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Angles as an `[x, y, z]` array, in wire order
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Largest per-axis angular distance to `other`, wrapping at 360
    pub fn max_delta(&self, other: &EulerAngles) -> f32 {
        angle_delta(self.x, other.x)
            .max(angle_delta(self.y, other.y))
            .max(angle_delta(self.z, other.z))
    }

    /// Same orientation within `tolerance` degrees on every axis
    pub fn approx_eq(&self, other: &EulerAngles, tolerance: f32) -> bool {
        self.max_delta(other) <= tolerance
    }
}

/// Shortest distance between two angles in degrees
pub fn angle_delta(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

fn normalize_degrees(deg: f64) -> f32 {
    let wrapped = deg.rem_euclid(360.0) as f32 + 0.0;
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit quaternion rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quat {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    /// Convert a tracker rotation (right-handed) into the rig's left-handed
    /// frame by mirroring along Z.
    pub fn flip_z(self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: -self.z,
            w: -self.w,
        }
    }

    pub fn from_euler(e: EulerAngles) -> Self {
        let hx = (e.x as f64).to_radians() * 0.5;
        let hy = (e.y as f64).to_radians() * 0.5;
        let hz = (e.z as f64).to_radians() * 0.5;
        let (sx, cx) = hx.sin_cos();
        let (sy, cy) = hy.sin_cos();
        let (sz, cz) = hz.sin_cos();

        Self {
            x: (cy * sx * cz + cx * sy * sz) as f32,
            y: (cx * sy * cz - sx * cy * sz) as f32,
            z: (cx * cy * sz - sx * sy * cz) as f32,
            w: (cx * cy * cz + sx * sy * sz) as f32,
        }
    }

    pub fn to_euler(self) -> EulerAngles {
        let q = self.normalize();
        let (x, y, z, w) = (q.x as f64, q.y as f64, q.z as f64, q.w as f64);

        let sin_pitch = (2.0 * (w * x - y * z)).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();

        let (yaw, roll) = if sin_pitch.abs() > 0.99999 {
            // Gimbal lock: fold roll into yaw
            let yaw = (-2.0 * (x * z - w * y)).atan2(1.0 - 2.0 * (y * y + z * z));
            (yaw, 0.0)
        } else {
            let yaw = (2.0 * (w * y + x * z)).atan2(1.0 - 2.0 * (x * x + y * y));
            let roll = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (x * x + z * z));
            (yaw, roll)
        };

        EulerAngles {
            x: normalize_degrees(pitch.to_degrees()),
            y: normalize_degrees(yaw.to_degrees()),
            z: normalize_degrees(roll.to_degrees()),
        }
    }

    pub fn dot(&self, other: &Quat) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Same orientation, accounting for `q == -q`
    pub fn same_orientation(&self, other: &Quat, tolerance: f32) -> bool {
        1.0 - self.normalize().dot(&other.normalize()).abs() <= tolerance
    }

    pub fn normalize(&self) -> Quat {
        let len = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if len < 0.0001 {
            return Quat::identity();
        }
        Quat {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
            w: self.w / len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_zero_euler() {
        let e = Quat::identity().to_euler();
        assert!(e.approx_eq(&EulerAngles::zero(), 1e-4));
    }

    #[test]
    fn test_single_axis_round_trip() {
        for e in [
            EulerAngles::new(10.5, 0.0, 0.0),
            EulerAngles::new(0.0, 0.0, 90.25),
            EulerAngles::new(0.0, 200.0, 0.0),
        ] {
            let back = Quat::from_euler(e).to_euler();
            assert!(back.approx_eq(&e, 1e-2), "{:?} -> {:?}", e, back);
        }
    }

    #[test]
    fn test_euler_is_normalized() {
        let e = Quat::from_euler(EulerAngles::new(-30.0, 0.0, 0.0)).to_euler();
        assert!((e.x - 330.0).abs() < 1e-3);
        assert!(e.y >= 0.0 && e.y < 360.0);
    }

    #[test]
    fn test_gimbal_lock_keeps_orientation() {
        let original = Quat::from_euler(EulerAngles::new(90.0, 30.0, 20.0));
        let back = Quat::from_euler(original.to_euler());
        assert!(original.same_orientation(&back, 1e-4));
    }

    #[test]
    fn test_flip_z() {
        let q = Quat::new(0.1, 0.2, 0.3, 0.9).flip_z();
        assert_eq!(q, Quat::new(0.1, 0.2, -0.3, -0.9));
    }

    #[test]
    fn test_angle_delta_wraps() {
        assert!((angle_delta(359.5, 0.5) - 1.0).abs() < 1e-4);
        assert!((angle_delta(10.0, 20.0) - 10.0).abs() < 1e-4);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn euler_round_trip_keeps_orientation(
                x in -85.0f32..85.0,
                y in -360.0f32..360.0,
                z in -360.0f32..360.0,
            ) {
                let q = Quat::from_euler(EulerAngles::new(x, y, z));
                let e = q.to_euler();
                prop_assert!(q.same_orientation(&Quat::from_euler(e), 1e-5));
                for angle in e.to_array() {
                    prop_assert!((0.0..360.0).contains(&angle));
                }
            }
        }
    }
}
