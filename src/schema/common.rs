//! Building blocks shared by the telemetry and scoring layouts

crate::record! {
    /// Three-component vector in the simulator's coordinate system.
    pub struct Vec3 {
        "x" => x: f64,
        "y" => y: f64,
        "z" => z: f64,
    }
}

impl Vec3 {
    /// Euclidean length, when every component is known.
    pub fn magnitude(&self) -> Option<f64> {
        let (x, y, z) = (self.x?, self.y?, self.z?);
        Some((x * x + y * y + z * z).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_needs_all_components() {
        let v = Vec3 { x: Some(3.0), y: Some(4.0), z: Some(0.0) };
        assert_eq!(v.magnitude(), Some(5.0));
        assert_eq!(Vec3 { z: None, ..v }.magnitude(), None);
    }
}
