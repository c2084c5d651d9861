use hashbrown::HashMap;
use strata_chunk::ChunkCoord;
use strata_mesh_cpu::{MeshData, MeshPass};

/// The renderer seen from the engine. Only the main thread calls into it,
/// so implementations need not be `Send`.
pub trait RenderBackend {
    type Handle;

    fn upload(&mut self, coord: ChunkCoord, pass: MeshPass, mesh: &MeshData) -> Self::Handle;
    fn release(&mut self, handle: Self::Handle);
    fn draw(&mut self, handle: &Self::Handle);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessHandle {
    pub id: u64,
    pub coord: ChunkCoord,
    pub pass: MeshPass,
    pub bytes: usize,
    pub faces: usize,
}

/// Backend with no GPU behind it: tracks what would be resident and what
/// was drawn.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u64,
    resident: HashMap<u64, HeadlessHandle>,
    uploads: usize,
    releases: usize,
    draws: Vec<(ChunkCoord, MeshPass)>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    #[inline]
    pub fn releases(&self) -> usize {
        self.releases
    }

    #[inline]
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    pub fn resident_bytes(&self) -> usize {
        self.resident.values().map(|h| h.bytes).sum()
    }

    /// The live upload for one chunk pass, if any.
    pub fn resident(&self, coord: ChunkCoord, pass: MeshPass) -> Option<&HeadlessHandle> {
        self.resident
            .values()
            .find(|h| h.coord == coord && h.pass == pass)
    }

    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        let mut v: Vec<ChunkCoord> = self.resident.values().map(|h| h.coord).collect();
        v.sort();
        v.dedup();
        v
    }

    /// Draw calls since the last call, in submission order.
    pub fn take_draws(&mut self) -> Vec<(ChunkCoord, MeshPass)> {
        std::mem::take(&mut self.draws)
    }
}

impl RenderBackend for HeadlessBackend {
    type Handle = HeadlessHandle;

    fn upload(&mut self, coord: ChunkCoord, pass: MeshPass, mesh: &MeshData) -> HeadlessHandle {
        self.next_id += 1;
        let handle = HeadlessHandle {
            id: self.next_id,
            coord,
            pass,
            bytes: mesh.byte_size(),
            faces: mesh.face_count(),
        };
        self.resident.insert(handle.id, handle.clone());
        self.uploads += 1;
        handle
    }

    fn release(&mut self, handle: HeadlessHandle) {
        if self.resident.remove(&handle.id).is_some() {
            self.releases += 1;
        } else {
            log::warn!("release of unknown mesh handle {}", handle.id);
        }
    }

    fn draw(&mut self, handle: &HeadlessHandle) {
        self.draws.push((handle.coord, handle.pass));
    }
}
