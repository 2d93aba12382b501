//! GLB scene loading.
//!
//! Parses a binary glTF container into a renderable scene: one [`Drawable`]
//! per triangle-list primitive, each carrying positions, indices, optional
//! normals and a neutral display material. Source materials and textures
//! are ignored. A fixed 180° rotation about X is stored as the root
//! transform to correct the asset pipeline's axis convention.

use std::f32::consts::PI;
use std::path::Path;

use glam::Mat4;
use gltf::mesh::Mode;
use serde::Serialize;

use crate::bounds::{merge, Bounds};
use crate::error::{SceneError, SceneResult};

/// Nodes nested deeper than this are ignored.
const MAX_NODE_DEPTH: usize = 128;

/// Flat display material substituted for every primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMaterial {
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
}

impl DisplayMaterial {
    /// Light gray, opaque.
    pub const NEUTRAL_GRAY: DisplayMaterial = DisplayMaterial {
        base_color: [0.827, 0.827, 0.827, 1.0],
    };
}

/// One renderable primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub positions: Vec<[f32; 3]>,
    /// Present only when the source normal count matches the position count.
    pub normals: Option<Vec<[f32; 3]>>,
    /// Triangle list indices; synthesized as `0..n` when the source has none.
    pub indices: Vec<u32>,
    /// Whether the primitive carries joint bindings.
    pub skinned: bool,
    pub material: DisplayMaterial,
    pub bounds: Bounds,
}

impl Drawable {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A mesh and its drawable primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMesh {
    pub name: Option<String>,
    pub primitives: Vec<Drawable>,
}

impl SceneMesh {
    /// Union of the primitive bounds in mesh space.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut acc = None;
        for drawable in &self.primitives {
            merge(&mut acc, drawable.bounds);
        }
        acc
    }
}

/// A node in the scene tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: Option<String>,
    pub local: Mat4,
    /// Index into [`Scene::meshes`].
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub children: Vec<SceneNode>,
}

/// A loaded scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub meshes: Vec<SceneMesh>,
    pub roots: Vec<SceneNode>,
    /// Number of nodes in the document.
    pub node_count: usize,
    /// Number of skins in the document.
    pub skin_count: usize,
    /// Upright correction applied above every root.
    pub root_transform: Mat4,
}

/// Aggregate counts for inspection output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    pub mesh_count: usize,
    pub node_count: usize,
    pub skin_count: usize,
    pub drawable_count: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

impl Scene {
    /// All drawables in mesh order.
    pub fn drawables(&self) -> impl Iterator<Item = &Drawable> {
        self.meshes.iter().flat_map(|m| m.primitives.iter())
    }

    pub fn has_skin(&self) -> bool {
        self.skin_count > 0
    }

    /// World-space bounds of every mesh reachable from the roots, including
    /// the root transform. Meshes not referenced by any node are placed at
    /// the root.
    pub fn world_bounds(&self) -> Option<Bounds> {
        let mut acc = None;
        let mut referenced = vec![false; self.meshes.len()];
        for root in &self.roots {
            self.accumulate(root, self.root_transform, &mut acc, &mut referenced);
        }
        for (mesh, seen) in self.meshes.iter().zip(referenced) {
            if !seen {
                if let Some(b) = mesh.bounds() {
                    merge(&mut acc, b.transformed(&self.root_transform));
                }
            }
        }
        acc
    }

    fn accumulate(
        &self,
        node: &SceneNode,
        parent: Mat4,
        acc: &mut Option<Bounds>,
        referenced: &mut [bool],
    ) {
        let world = parent * node.local;
        if let Some(index) = node.mesh {
            if let Some(mesh) = self.meshes.get(index) {
                referenced[index] = true;
                if let Some(b) = mesh.bounds() {
                    merge(acc, b.transformed(&world));
                }
            }
        }
        for child in &node.children {
            self.accumulate(child, world, acc, referenced);
        }
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            mesh_count: self.meshes.len(),
            node_count: self.node_count,
            skin_count: self.skin_count,
            drawable_count: self.drawables().count(),
            vertex_count: self.drawables().map(Drawable::vertex_count).sum(),
            triangle_count: self.drawables().map(Drawable::triangle_count).sum(),
        }
    }
}

/// Loads a scene, logging and swallowing any failure.
pub fn load_scene(path: &Path) -> Option<Scene> {
    match parse_scene(path) {
        Ok(scene) => {
            let stats = scene.stats();
            tracing::info!(
                "Loaded {}: {} meshes, {} drawables, {} vertices",
                path.display(),
                stats.mesh_count,
                stats.drawable_count,
                stats.vertex_count
            );
            Some(scene)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "GLB load failed");
            None
        }
    }
}

/// Parses a GLB/glTF file.
pub fn parse_scene(path: &Path) -> SceneResult<Scene> {
    let gltf = gltf::Gltf::open(path).map_err(|e| SceneError::Load {
        path: path.to_path_buf(),
        source: e,
    })?;
    let gltf::Gltf { document, blob } = gltf;
    let buffers =
        gltf::import_buffers(&document, path.parent(), blob).map_err(SceneError::Buffers)?;
    build_scene(&document, &buffers)
}

/// Parses GLB bytes held in memory.
pub fn parse_scene_slice(bytes: &[u8]) -> SceneResult<Scene> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, None, blob).map_err(SceneError::Buffers)?;
    build_scene(&document, &buffers)
}

fn build_scene(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> SceneResult<Scene> {
    let meshes: Vec<SceneMesh> = document
        .meshes()
        .map(|mesh| SceneMesh {
            name: mesh.name().map(str::to_string),
            primitives: mesh
                .primitives()
                .filter_map(|p| read_primitive(&p, buffers))
                .collect(),
        })
        .collect();

    if meshes.iter().all(|m| m.primitives.is_empty()) {
        return Err(SceneError::NoDrawables {
            meshes: meshes.len(),
        });
    }

    let roots = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().map(|n| build_node(&n, 0)).collect(),
        None => {
            let mut is_child = vec![false; document.nodes().count()];
            for node in document.nodes() {
                for child in node.children() {
                    is_child[child.index()] = true;
                }
            }
            document
                .nodes()
                .filter(|n| !is_child[n.index()])
                .map(|n| build_node(&n, 0))
                .collect()
        }
    };

    Ok(Scene {
        meshes,
        roots,
        node_count: document.nodes().count(),
        skin_count: document.skins().count(),
        root_transform: Mat4::from_rotation_x(PI),
    })
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Option<Drawable> {
    if primitive.mode() != Mode::Triangles {
        tracing::debug!("Skipping primitive with mode {:?}", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    if positions.is_empty() {
        return None;
    }
    let vertex_count = positions.len();

    let normals = reader.read_normals().and_then(|iter| {
        let normals: Vec<[f32; 3]> = iter.collect();
        if normals.len() == vertex_count {
            Some(normals)
        } else {
            tracing::debug!(
                "Dropping normals: {} normals for {} positions",
                normals.len(),
                vertex_count
            );
            None
        }
    });

    let indices: Vec<u32> = match reader.read_indices() {
        Some(read) => read.into_u32().collect(),
        None => (0..vertex_count as u32).collect(),
    };
    if indices.iter().any(|&i| i as usize >= vertex_count) {
        tracing::warn!("Skipping primitive with out-of-range indices");
        return None;
    }

    let bounds = Bounds::from_points(&positions)?;

    Some(Drawable {
        skinned: reader.read_joints(0).is_some(),
        positions,
        normals,
        indices,
        material: DisplayMaterial::NEUTRAL_GRAY,
        bounds,
    })
}

fn build_node(node: &gltf::Node, depth: usize) -> SceneNode {
    let children = if depth >= MAX_NODE_DEPTH {
        tracing::warn!("Node hierarchy deeper than {}, truncating", MAX_NODE_DEPTH);
        Vec::new()
    } else {
        node.children().map(|c| build_node(&c, depth + 1)).collect()
    };
    SceneNode {
        name: node.name().map(str::to_string),
        local: Mat4::from_cols_array_2d(&node.transform().matrix()),
        mesh: node.mesh().map(|m| m.index()),
        skin: node.skin().map(|s| s.index()),
        children,
    }
}
