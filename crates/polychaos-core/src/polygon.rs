use std::f64::consts::TAU;

use glam::DVec2;

/// Regular polygon vertices on a circle of `radius` around the origin.
///
/// Vertex `i` sits at angle `2π·i/vertex_count`, so the order is angle-ascending
/// starting on the positive x axis.
pub fn polygon_vertices(vertex_count: usize, radius: f64) -> Vec<DVec2> {
    (0..vertex_count)
        .map(|i| {
            let angle = TAU * i as f64 / vertex_count as f64;
            DVec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn triangle_starts_on_positive_x_axis() {
        let vertices = polygon_vertices(3, 2.0);
        assert_eq!(vertices.len(), 3);
        assert_relative_eq!(vertices[0].x, 2.0);
        assert_relative_eq!(vertices[0].y, 0.0);
        assert_relative_eq!(vertices[1].x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(vertices[1].y, 3f64.sqrt(), epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn vertices_are_evenly_spaced_on_the_circle(count in 3usize..=12, radius in 0.1f64..100.0) {
            let vertices = polygon_vertices(count, radius);
            prop_assert_eq!(vertices.len(), count);
            let step = TAU / count as f64;
            for (i, vertex) in vertices.iter().enumerate() {
                prop_assert!((vertex.length() - radius).abs() < 1e-9 * radius.max(1.0));
                let next = vertices[(i + 1) % count];
                let between = vertex.angle_between(next).abs();
                prop_assert!((between - step).abs() < 1e-9);
            }
        }
    }
}
