use strata_blocks::registry::MAX_LIGHT;
use strata_blocks::{BlockCatalog, BlockType, TextureAtlas, UvRect};
use strata_chunk::{CHUNK_VOLUME, Chunk, ChunkCoord, ChunkStore};
use strata_geom::Vec3;

use crate::constants::{OPAQUE_ALPHA, TRANSPARENT_ALPHA, VISUAL_LIGHT_MIN};
use crate::face::Face;
use crate::mesh_build::{MeshData, MeshPass};
use crate::padded::Padded;

#[derive(Default, Clone, Debug)]
pub struct ChunkMeshes {
    pub opaque: MeshData,
    pub transparent: MeshData,
}

impl ChunkMeshes {
    pub fn pass(&self, pass: MeshPass) -> &MeshData {
        match pass {
            MeshPass::Opaque => &self.opaque,
            MeshPass::Transparent => &self.transparent,
        }
    }

    pub fn byte_size(&self) -> usize {
        self.opaque.byte_size() + self.transparent.byte_size()
    }
}

struct Quad {
    corners: [Vec3; 4],
    normal: Vec3,
    uv: UvRect,
    colors: [[u8; 4]; 4],
}

impl Quad {
    fn centroid(&self) -> Vec3 {
        (self.corners[0] + self.corners[1] + self.corners[2] + self.corners[3]) / 4.0
    }
}

#[inline]
fn in_pass(catalog: &BlockCatalog, pass: MeshPass, kind: BlockType) -> bool {
    match pass {
        MeshPass::Opaque => catalog.is_opaque(kind),
        MeshPass::Transparent => catalog.is_transparent_solid(kind),
    }
}

#[inline]
fn shade(light: f32, alpha: u8) -> [u8; 4] {
    let v = ((light / f32::from(MAX_LIGHT)) * 255.0).round().clamp(0.0, 255.0) as u8;
    let v = v.max(VISUAL_LIGHT_MIN);
    [v, v, v, alpha]
}

fn collect_quads(
    padded: &Padded,
    chunk: &Chunk,
    catalog: &BlockCatalog,
    atlas: &TextureAtlas,
    pass: MeshPass,
) -> Vec<Quad> {
    let alpha = match pass {
        MeshPass::Opaque => OPAQUE_ALPHA,
        MeshPass::Transparent => TRANSPARENT_ALPHA,
    };
    let mut quads = Vec::new();
    for i in 0..CHUNK_VOLUME {
        let b = &chunk.blocks()[i];
        if !in_pass(catalog, pass, b.kind) {
            continue;
        }
        let (x, y, z) = Chunk::delinearize(i);
        let (x, y, z) = (x as i32, y as i32, z as i32);
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            // Unloaded neighbors never hide a face.
            let hidden = padded
                .get(x + dx, y + dy, z + dz)
                .is_some_and(|n| in_pass(catalog, pass, n.kind));
            if hidden {
                continue;
            }
            let offs = face.corners();
            let corners = offs.map(|o| (b.pos + o).as_vec3());
            let colors = offs.map(|o| shade(padded.corner_light(x + o.x, y + o.y, z + o.z), alpha));
            quads.push(Quad {
                corners,
                normal: face.normal(),
                uv: atlas.uv(b.kind, face.role()),
                colors,
            });
        }
    }
    quads
}

/// Builds one pass of the chunk at `coord`. Faces between two blocks of the
/// same pass are culled; a missing neighbor chunk leaves the boundary face
/// visible. With a camera, transparent faces come out far to near.
pub fn build_chunk_mesh(
    store: &ChunkStore,
    coord: ChunkCoord,
    catalog: &BlockCatalog,
    atlas: &TextureAtlas,
    pass: MeshPass,
    camera: Option<Vec3>,
) -> MeshData {
    let (Some(padded), Some(chunk)) = (Padded::gather(store, coord), store.get(coord)) else {
        return MeshData::default();
    };
    emit(collect_quads(&padded, chunk, catalog, atlas, pass), pass, camera)
}

/// Both passes, sharing one neighborhood gather.
pub fn build_chunk_meshes(
    store: &ChunkStore,
    coord: ChunkCoord,
    catalog: &BlockCatalog,
    atlas: &TextureAtlas,
    camera: Option<Vec3>,
) -> ChunkMeshes {
    let (Some(padded), Some(chunk)) = (Padded::gather(store, coord), store.get(coord)) else {
        return ChunkMeshes::default();
    };
    let opaque = emit(
        collect_quads(&padded, chunk, catalog, atlas, MeshPass::Opaque),
        MeshPass::Opaque,
        camera,
    );
    let transparent = emit(
        collect_quads(&padded, chunk, catalog, atlas, MeshPass::Transparent),
        MeshPass::Transparent,
        camera,
    );
    log::trace!(
        target: "mesh",
        "chunk {:?}: {} opaque, {} transparent faces",
        coord,
        opaque.face_count(),
        transparent.face_count()
    );
    ChunkMeshes { opaque, transparent }
}

fn emit(mut quads: Vec<Quad>, pass: MeshPass, camera: Option<Vec3>) -> MeshData {
    if let (MeshPass::Transparent, Some(cam)) = (pass, camera) {
        let mut keyed: Vec<(f32, Quad)> = quads
            .into_iter()
            .map(|q| ((q.centroid() - cam).length_sq(), q))
            .collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        quads = keyed.into_iter().map(|(_, q)| q).collect();
    }
    let mut mesh = MeshData::default();
    mesh.reserve_quads(quads.len());
    for q in &quads {
        mesh.add_quad(q.corners, q.normal, q.uv, q.colors);
    }
    mesh
}
