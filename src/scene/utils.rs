use crate::scene::model::Model;
use nalgebra::Point3;

/// Recenters the model at the origin and scales it to fit a [-1, 1] cube
/// (with a little margin). Returns the original center and the scale used.
pub fn normalize_and_center_model(model: &mut Model) -> (Point3<f32>, f32) {
    let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
    let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);
    let mut any = false;

    for mesh in &model.meshes {
        for vertex in &mesh.vertices {
            min = min.coords.inf(&vertex.position.coords).into();
            max = max.coords.sup(&vertex.position.coords).into();
            any = true;
        }
    }
    if !any {
        return (Point3::origin(), 1.0);
    }

    let center = nalgebra::center(&min, &max);
    let extent = max - min;
    let largest = extent.x.max(extent.y).max(extent.z);
    let scale = if largest > 1e-6 { 1.8 / largest } else { 1.0 };

    for mesh in &mut model.meshes {
        for vertex in &mut mesh.vertices {
            vertex.position = Point3::from((vertex.position - center) * scale);
        }
    }

    (center, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::material::PbrMaterial;
    use crate::scene::mesh::Mesh;

    #[test]
    fn normalization_centers_and_bounds_the_model() {
        let mut mesh = Mesh::ground_plane(40.0, 0);
        for vertex in &mut mesh.vertices {
            vertex.position.x += 100.0; // push it far off-center
        }
        let mut model = Model::new(vec![mesh], vec![PbrMaterial::default()]);

        let (center, scale) = normalize_and_center_model(&mut model);
        assert!((center.x - 100.0).abs() < 1e-4);
        assert!(scale > 0.0);

        for vertex in &model.meshes[0].vertices {
            assert!(vertex.position.coords.norm() <= 1.8);
        }
    }

    #[test]
    fn empty_model_is_left_alone() {
        let mut model = Model::new(vec![], vec![]);
        let (center, scale) = normalize_and_center_model(&mut model);
        assert_eq!(center, Point3::origin());
        assert_eq!(scale, 1.0);
    }
}
