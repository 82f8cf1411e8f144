/// Magnitudes at or below this are treated as "no direction".
pub const EPSILON: f32 = 1.0e-6;

pub(crate) fn sqrt(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrtf(value)
    }
}

pub(crate) fn floor(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.floor()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::floorf(value)
    }
}

/// A 3D vector used for positions, directions and forces.
///
/// The simulation runs on the horizontal XZ plane, so `y` is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn dot(&self, other: &Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn length(&self) -> f32 {
        sqrt(self.length_squared())
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Unit vector in the same direction, or zero when the vector is too
    /// short to have a meaningful direction.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > EPSILON {
            *self / len
        } else {
            Self::ZERO
        }
    }

    /// Clips the vector to at most `max` in length.
    pub fn truncate_length(&self, max: f32) -> Self {
        if max <= 0.0 {
            return Self::ZERO;
        }
        let len_sq = self.length_squared();
        if len_sq > max * max {
            *self * (max / sqrt(len_sq))
        } else {
            *self
        }
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        (*self - *other).length()
    }

    pub fn distance_squared(&self, other: &Vec3) -> f32 {
        (*self - *other).length_squared()
    }

    /// Projection onto the horizontal plane.
    pub fn with_y_zero(&self) -> Self {
        Vec3::new(self.x, 0.0, self.z)
    }

    /// Remaps a point outside the sphere (`center`, `radius`) to the
    /// diametrically opposite side, `2 * radius` back along its offset.
    ///
    /// The step is repeated until the point is inside, so a point at any
    /// finite distance lands within the sphere.
    pub fn spherical_wrap_around(&self, center: Vec3, radius: f32) -> Self {
        let offset = *self - center;
        let r = offset.length();
        if r <= radius || !r.is_finite() {
            return *self;
        }
        let span = radius * 2.0;
        let steps = -floor(-(r - radius) / span);
        let wrapped = (r - steps * span).clamp(-radius, radius);
        center + (offset / r) * wrapped
    }
}

impl core::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl core::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl core::ops::Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl core::ops::Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl core::ops::Div<f32> for Vec3 {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Vec3::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl core::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl core::ops::SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}
