//! Mesh extraction
//!
//! Reads vertex positions, normals, UVs, and the triangle index list
//! from the field tree, validates the indices, and writes a Wavefront
//! OBJ file plus a sidecar with the counts and submesh boundaries.
//! Coordinates are written with 6 decimal digits so output is
//! deterministic and diffable.

use super::{with_ext, write_sidecar};
use bundlerip_core::{Asset, ExtractError, FieldTree, FieldValue, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct MeshData {
    vertices: Vec<[f64; 3]>,
    normals: Vec<[f64; 3]>,
    uvs: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    // (first triangle, triangle count) per submesh
    submeshes: Vec<(usize, usize)>,
}

pub fn extract(asset: &Asset, base: &Path) -> Result<Vec<PathBuf>> {
    let fields = asset.read_fields()?;
    let mesh = parse(fields, &asset.kind)?;

    let stem = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("Mesh_{}", asset.path_id));

    let obj_path = with_ext(base, "obj");
    std::fs::write(&obj_path, render_obj(&mesh, &stem))?;

    let sidecar = write_sidecar(
        base,
        &json!({
            "vertices": mesh.vertices.len(),
            "triangles": mesh.triangles.len(),
            "submeshes": mesh
                .submeshes
                .iter()
                .map(|&(first, count)| json!({
                    "first_triangle": first,
                    "triangle_count": count,
                }))
                .collect::<Vec<_>>(),
        }),
    )?;

    Ok(vec![obj_path, sidecar])
}

fn parse(fields: &FieldTree, kind: &bundlerip_core::AssetKind) -> Result<MeshData> {
    let vertices = vec3_array(fields, "m_Vertices")?
        .ok_or_else(|| ExtractError::missing_field("m_Vertices", kind.name()))?;
    let normals = vec3_array(fields, "m_Normals")?.unwrap_or_default();
    let uvs = vec2_array(fields, "m_UV0")?.unwrap_or_default();

    if !normals.is_empty() && normals.len() != vertices.len() {
        return Err(ExtractError::invalid_data(format!(
            "normal count {} does not match vertex count {}",
            normals.len(),
            vertices.len()
        )));
    }
    if !uvs.is_empty() && uvs.len() != vertices.len() {
        return Err(ExtractError::invalid_data(format!(
            "UV count {} does not match vertex count {}",
            uvs.len(),
            vertices.len()
        )));
    }

    let indices = match fields.get("m_Indices") {
        Some(FieldValue::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_i64()
                    .and_then(|i| usize::try_from(i).ok())
                    .ok_or_else(|| ExtractError::invalid_data("non-integer triangle index"))
            })
            .collect::<Result<Vec<usize>>>()?,
        _ => return Err(ExtractError::missing_field("m_Indices", kind.name())),
    };
    if indices.len() % 3 != 0 {
        return Err(ExtractError::invalid_data(format!(
            "index count {} is not a multiple of 3",
            indices.len()
        )));
    }
    for &index in &indices {
        if index >= vertices.len() {
            return Err(ExtractError::invalid_data(format!(
                "triangle index {} out of range ({} vertices)",
                index,
                vertices.len()
            )));
        }
    }
    let triangles: Vec<[usize; 3]> = indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();

    let mut submeshes = Vec::new();
    if let Some(FieldValue::Array(subs)) = fields.get("m_SubMeshes") {
        for sub in subs {
            let first = sub
                .get("firstIndex")
                .and_then(FieldValue::as_i64)
                .unwrap_or(0);
            let count = sub
                .get("indexCount")
                .and_then(FieldValue::as_i64)
                .unwrap_or(0);
            if first < 0 || count < 0 {
                return Err(ExtractError::invalid_data(format!(
                    "negative submesh range (first {}, count {})",
                    first, count
                )));
            }
            let end = first.checked_add(count).ok_or_else(|| {
                ExtractError::invalid_data(format!(
                    "submesh range starting at {} with {} indices overflows",
                    first, count
                ))
            })?;
            if end as usize > indices.len() {
                return Err(ExtractError::invalid_data(format!(
                    "submesh range {}..{} exceeds {} indices",
                    first,
                    end,
                    indices.len()
                )));
            }
            submeshes.push((first as usize / 3, count as usize / 3));
        }
    }
    if submeshes.is_empty() {
        submeshes.push((0, triangles.len()));
    }

    Ok(MeshData {
        vertices,
        normals,
        uvs,
        triangles,
        submeshes,
    })
}

fn render_obj(mesh: &MeshData, name: &str) -> String {
    let mut obj = String::new();
    obj.push_str(&format!("# Mesh: {}\n", name));
    obj.push_str(&format!("# Vertices: {}\n", mesh.vertices.len()));
    obj.push_str(&format!("# Triangles: {}\n", mesh.triangles.len()));
    obj.push_str(&format!("o {}\n", name));

    for v in &mesh.vertices {
        obj.push_str(&format!("v {:.6} {:.6} {:.6}\n", v[0], v[1], v[2]));
    }
    for n in &mesh.normals {
        obj.push_str(&format!("vn {:.6} {:.6} {:.6}\n", n[0], n[1], n[2]));
    }
    for t in &mesh.uvs {
        obj.push_str(&format!("vt {:.6} {:.6}\n", t[0], t[1]));
    }

    let has_normals = !mesh.normals.is_empty();
    let has_uvs = !mesh.uvs.is_empty();
    for (group, &(first, count)) in mesh.submeshes.iter().enumerate() {
        if mesh.submeshes.len() > 1 {
            obj.push_str(&format!("g submesh_{}\n", group));
        }
        for triangle in mesh.triangles.iter().skip(first).take(count) {
            obj.push_str("f");
            for &index in triangle {
                let i = index + 1; // OBJ is 1-based
                match (has_uvs, has_normals) {
                    (true, true) => obj.push_str(&format!(" {}/{}/{}", i, i, i)),
                    (true, false) => obj.push_str(&format!(" {}/{}", i, i)),
                    (false, true) => obj.push_str(&format!(" {}//{}", i, i)),
                    (false, false) => obj.push_str(&format!(" {}", i)),
                }
            }
            obj.push('\n');
        }
    }
    obj
}

fn vec3_array(fields: &FieldTree, key: &str) -> Result<Option<Vec<[f64; 3]>>> {
    let Some(flat) = float_array(fields, key)? else {
        return Ok(None);
    };
    if flat.len() % 3 != 0 {
        return Err(ExtractError::invalid_data(format!(
            "{} length {} is not a multiple of 3",
            key,
            flat.len()
        )));
    }
    Ok(Some(flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()))
}

fn vec2_array(fields: &FieldTree, key: &str) -> Result<Option<Vec<[f64; 2]>>> {
    let Some(flat) = float_array(fields, key)? else {
        return Ok(None);
    };
    if flat.len() % 2 != 0 {
        return Err(ExtractError::invalid_data(format!(
            "{} length {} is not a multiple of 2",
            key,
            flat.len()
        )));
    }
    Ok(Some(flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect()))
}

fn float_array(fields: &FieldTree, key: &str) -> Result<Option<Vec<f64>>> {
    match fields.get(key) {
        None | Some(FieldValue::Null) => Ok(None),
        Some(FieldValue::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| ExtractError::invalid_data(format!("{}: non-numeric entry", key)))
            })
            .collect::<Result<Vec<f64>>>()
            .map(Some),
        Some(other) => Err(ExtractError::invalid_data(format!(
            "{}: expected array, got {}",
            key, other
        ))),
    }
}
