//! GLB container encoding.
//!
//! A GLB file is a 12-byte header (`glTF`, version 2, total length) followed
//! by a JSON chunk padded with spaces and an optional binary chunk padded
//! with zeros. [`GlbFixture`] assembles small single-mesh files from raw
//! vertex data; the diagnostics use it to probe the parser and the test
//! suites use it to build edge-case inputs without files on disk.

use serde_json::{json, Value};

/// Container magic.
pub const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const COMPONENT_F32: u32 = 5126;
const COMPONENT_U16: u32 = 5123;

/// Returns true if `bytes` starts with a GLB header.
pub fn is_glb(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[..4] == GLB_MAGIC
}

/// Wraps a JSON document and binary payload into a GLB container.
pub fn encode_glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let json_bytes = json.as_bytes();
    let json_padding = (4 - json_bytes.len() % 4) % 4;
    let padded_json_len = json_bytes.len() + json_padding;
    let bin_padding = (4 - bin.len() % 4) % 4;
    let padded_bin_len = bin.len() + bin_padding;

    let mut total_len = 12 + 8 + padded_json_len;
    if !bin.is_empty() {
        total_len += 8 + padded_bin_len;
    }

    let mut glb = Vec::with_capacity(total_len);
    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&(total_len as u32).to_le_bytes());

    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(b' ').take(json_padding));

    if !bin.is_empty() {
        glb.extend_from_slice(&(padded_bin_len as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        glb.extend_from_slice(bin);
        glb.extend(std::iter::repeat(0u8).take(bin_padding));
    }

    glb
}

/// Builder for single-mesh GLB files.
#[derive(Debug, Clone)]
pub struct GlbFixture {
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    indices: Option<Vec<u16>>,
    include_mesh: bool,
    skinned: bool,
    extra_nodes: usize,
    translation: Option<[f32; 3]>,
}

impl GlbFixture {
    /// One triangle with indices, no normals, no skin.
    pub fn triangle() -> Self {
        Self {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]],
            normals: None,
            indices: Some(vec![0, 1, 2]),
            include_mesh: true,
            skinned: false,
            extra_nodes: 0,
            translation: None,
        }
    }

    /// A single empty node and no meshes.
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            indices: None,
            include_mesh: false,
            skinned: false,
            extra_nodes: 0,
            translation: None,
        }
    }

    pub fn with_positions(mut self, positions: Vec<[f32; 3]>) -> Self {
        self.positions = positions;
        self
    }

    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u16>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Drops the index accessor.
    pub fn without_indices(mut self) -> Self {
        self.indices = None;
        self
    }

    /// Adds a skin whose single joint is a child node.
    pub fn skinned(mut self) -> Self {
        self.skinned = true;
        self.extra_nodes = self.extra_nodes.max(1);
        self
    }

    /// Adds `count` empty child nodes under the mesh node.
    pub fn with_extra_nodes(mut self, count: usize) -> Self {
        self.extra_nodes = count;
        self
    }

    /// Sets the mesh node's translation.
    pub fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = Some(translation);
        self
    }

    /// Encodes the fixture.
    pub fn build(&self) -> Vec<u8> {
        let mut bin = Vec::new();
        let mut views: Vec<Value> = Vec::new();
        let mut accessors: Vec<Value> = Vec::new();
        let mut attributes = serde_json::Map::new();
        let mut primitive = serde_json::Map::new();

        if self.include_mesh {
            let position_accessor = push_vec3(&mut bin, &mut views, &mut accessors, &self.positions, true);
            attributes.insert("POSITION".to_string(), json!(position_accessor));

            if let Some(normals) = &self.normals {
                let normal_accessor = push_vec3(&mut bin, &mut views, &mut accessors, normals, false);
                attributes.insert("NORMAL".to_string(), json!(normal_accessor));
            }

            if let Some(indices) = &self.indices {
                let offset = bin.len();
                for idx in indices {
                    bin.extend_from_slice(&idx.to_le_bytes());
                }
                while bin.len() % 4 != 0 {
                    bin.push(0);
                }
                views.push(json!({
                    "buffer": 0,
                    "byteOffset": offset,
                    "byteLength": indices.len() * 2,
                }));
                accessors.push(json!({
                    "bufferView": views.len() - 1,
                    "componentType": COMPONENT_U16,
                    "count": indices.len(),
                    "type": "SCALAR",
                }));
                primitive.insert("indices".to_string(), json!(accessors.len() - 1));
            }
            primitive.insert("attributes".to_string(), Value::Object(attributes));
        }

        let children: Vec<usize> = (1..=self.extra_nodes).collect();
        let mut root = serde_json::Map::new();
        root.insert("name".to_string(), json!("root"));
        if self.include_mesh {
            root.insert("mesh".to_string(), json!(0));
        }
        if self.skinned {
            root.insert("skin".to_string(), json!(0));
        }
        if let Some(t) = self.translation {
            root.insert("translation".to_string(), json!(t));
        }
        if !children.is_empty() {
            root.insert("children".to_string(), json!(children));
        }

        let mut nodes = vec![Value::Object(root)];
        for i in 1..=self.extra_nodes {
            nodes.push(json!({ "name": format!("joint_{}", i) }));
        }

        let mut doc = json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [ { "nodes": [0] } ],
            "nodes": nodes,
        });
        if self.include_mesh {
            doc["meshes"] = json!([ { "name": "body", "primitives": [ Value::Object(primitive) ] } ]);
            doc["accessors"] = json!(accessors);
            doc["bufferViews"] = json!(views);
            doc["buffers"] = json!([ { "byteLength": bin.len() } ]);
        }
        if self.skinned {
            doc["skins"] = json!([ { "joints": [1] } ]);
        }

        encode_glb(&doc.to_string(), &bin)
    }
}

/// The smallest valid single-triangle GLB.
pub fn minimal_triangle_glb() -> Vec<u8> {
    GlbFixture::triangle().build()
}

fn push_vec3(
    bin: &mut Vec<u8>,
    views: &mut Vec<Value>,
    accessors: &mut Vec<Value>,
    data: &[[f32; 3]],
    with_bounds: bool,
) -> usize {
    let offset = bin.len();
    for v in data {
        for c in v {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    views.push(json!({
        "buffer": 0,
        "byteOffset": offset,
        "byteLength": data.len() * 12,
    }));
    let mut accessor = json!({
        "bufferView": views.len() - 1,
        "componentType": COMPONENT_F32,
        "count": data.len(),
        "type": "VEC3",
    });
    if with_bounds {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in data {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        if data.is_empty() {
            min = [0.0; 3];
            max = [0.0; 3];
        }
        accessor["min"] = json!(min);
        accessor["max"] = json!(max);
    }
    accessors.push(accessor);
    accessors.len() - 1
}
