use crate::core::geometry::Vertex;
use crate::scene::material::PbrMaterial;
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use log::{info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use std::path::Path;

/// Loads an OBJ file into a [`Model`], triangulated and single-indexed.
///
/// MTL materials are mapped onto the metallic-roughness model on a best
/// effort basis (diffuse -> albedo, shininess -> roughness). Missing normals
/// are reconstructed from face geometry; tangents are always rebuilt from
/// the UV layout since OBJ has no way to store them.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Model, String> {
    let path = path.as_ref();
    let (obj_meshes, obj_materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .map_err(|e| format!("failed to load OBJ {path:?}: {e}"))?;

    let materials = match obj_materials {
        Ok(raw) => raw.iter().map(convert_material).collect(),
        Err(e) => {
            warn!("MTL for {path:?} not usable ({e}), using default material");
            Vec::new()
        }
    };

    let mut meshes = Vec::with_capacity(obj_meshes.len());
    for obj_mesh in &obj_meshes {
        let mesh = &obj_mesh.mesh;
        let vertex_count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();
        let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

        let mut vertices = Vec::with_capacity(vertex_count);
        for i in 0..vertex_count {
            let position = Point3::new(
                mesh.positions[3 * i],
                mesh.positions[3 * i + 1],
                mesh.positions[3 * i + 2],
            );
            let normal = if has_normals {
                Vector3::new(
                    mesh.normals[3 * i],
                    mesh.normals[3 * i + 1],
                    mesh.normals[3 * i + 2],
                )
            } else {
                Vector3::zeros()
            };
            let texcoord = if has_uvs {
                Vector2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
            } else {
                Vector2::zeros()
            };
            vertices.push(Vertex::new(position, normal, texcoord));
        }

        let mut out = Mesh::new(
            vertices,
            mesh.indices.clone(),
            mesh.material_id.unwrap_or(0),
        );
        if !has_normals {
            compute_normals(&mut out);
        }
        compute_tangents(&mut out);
        meshes.push(out);
    }

    let materials = if materials.is_empty() {
        vec![PbrMaterial::default()]
    } else {
        materials
    };

    let triangles: usize = meshes.iter().map(|m| m.indices.len() / 3).sum();
    info!(
        "loaded {path:?}: {} mesh(es), {triangles} triangles, {} material(s)",
        meshes.len(),
        materials.len()
    );
    Ok(Model::new(meshes, materials))
}

fn convert_material(raw: &tobj::Material) -> PbrMaterial {
    let mut material = PbrMaterial::default();
    if let Some(diffuse) = raw.diffuse {
        material.albedo = Vector3::new(diffuse[0], diffuse[1], diffuse[2]);
    }
    // OBJ shininess runs 0..1000; high shininess means low roughness.
    if let Some(shininess) = raw.shininess {
        material.roughness = (1.0 - (shininess / 1000.0).clamp(0.0, 1.0)).max(0.05);
    }
    material
}

/// Area-weighted vertex normals from face geometry.
fn compute_normals(mesh: &mut Mesh) {
    let mut accum = vec![Vector3::zeros(); mesh.vertices.len()];
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let edge1 = mesh.vertices[b].position - mesh.vertices[a].position;
        let edge2 = mesh.vertices[c].position - mesh.vertices[a].position;
        let face = edge1.cross(&edge2);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    for (vertex, normal) in mesh.vertices.iter_mut().zip(accum) {
        vertex.normal = if normal.norm() > 1e-8 {
            normal.normalize()
        } else {
            Vector3::y()
        };
    }
}

/// Per-vertex tangents from the UV gradient, Gram-Schmidt orthogonalized
/// against the normal. Needed for normal mapping.
fn compute_tangents(mesh: &mut Mesh) {
    let mut accum = vec![Vector3::zeros(); mesh.vertices.len()];
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (v0, v1, v2) = (&mesh.vertices[a], &mesh.vertices[b], &mesh.vertices[c]);

        let edge1 = v1.position - v0.position;
        let edge2 = v2.position - v0.position;
        let duv1 = v1.texcoord - v0.texcoord;
        let duv2 = v2.texcoord - v0.texcoord;

        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() < 1e-8 {
            continue;
        }
        let tangent = (edge1 * duv2.y - edge2 * duv1.y) / det;
        accum[a] += tangent;
        accum[b] += tangent;
        accum[c] += tangent;
    }

    for (vertex, tangent) in mesh.vertices.iter_mut().zip(accum) {
        let ortho = tangent - vertex.normal * vertex.normal.dot(&tangent);
        vertex.tangent = if ortho.norm() > 1e-8 {
            ortho.normalize()
        } else {
            // Degenerate UVs; pick anything perpendicular to the normal.
            let pick = if vertex.normal.x.abs() < 0.9 {
                Vector3::x()
            } else {
                Vector3::y()
            };
            vertex.normal.cross(&pick).normalize()
        };
    }
}
