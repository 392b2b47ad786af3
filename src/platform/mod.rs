//! Platform layer
//!
//! The simulation never touches the host directly. On the web a
//! `wasm-bindgen` wrapper exposes a session to the JavaScript renderer;
//! native hosts drive [`crate::sim::Session`] themselves.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Flatten positions into `[x, y, z, ...]` for host buffers
pub fn position_buffer(points: impl IntoIterator<Item = glam::Vec3>) -> Vec<f32> {
    points.into_iter().flat_map(|p| p.to_array()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_position_buffer() {
        let buf = position_buffer([Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
        assert_eq!(buf, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(position_buffer(std::iter::empty()).is_empty());
    }
}
