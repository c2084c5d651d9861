use strata_blocks::BlockType;
use strata_geom::IVec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructureKind {
    Tree,
    Wisp,
}

/// World cells a structure writes, all or nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructurePlan {
    pub kind: StructureKind,
    pub cells: Vec<(IVec3, BlockType)>,
}

/// Log trunk rising from the block above `anchor`, with a cube of leaves
/// of `canopy_radius` centred on the trunk top. Leaves never replace the
/// trunk column.
pub fn plan_tree(anchor: IVec3, trunk_height: i32, canopy_radius: i32) -> StructurePlan {
    let trunk_height = trunk_height.max(1);
    let r = canopy_radius.max(0);
    let top = anchor.offset(0, trunk_height, 0);
    let mut cells = Vec::with_capacity((trunk_height + (2 * r + 1).pow(3)) as usize);
    for dy in 1..=trunk_height {
        cells.push((anchor.offset(0, dy, 0), BlockType::WoodLog));
    }
    for dy in -r..=r {
        for dz in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dz == 0 && dy <= 0 {
                    continue;
                }
                cells.push((top.offset(dx, dy, dz), BlockType::Leaves));
            }
        }
    }
    StructurePlan {
        kind: StructureKind::Tree,
        cells,
    }
}

/// A single emissive block `height` cells above `anchor`. The cells between
/// must be clear too so wisps never float inside terrain.
pub fn plan_wisp(anchor: IVec3, height: i32) -> StructurePlan {
    let height = height.max(1);
    let mut cells: Vec<(IVec3, BlockType)> = (1..height)
        .map(|dy| (anchor.offset(0, dy, 0), BlockType::Air))
        .collect();
    cells.push((anchor.offset(0, height, 0), BlockType::Wisp));
    StructurePlan {
        kind: StructureKind::Wisp,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_cells_are_unique_and_shaped() {
        let a = IVec3::new(0, 10, 0);
        let plan = plan_tree(a, 5, 2);
        let logs: Vec<_> = plan.cells.iter().filter(|c| c.1 == BlockType::WoodLog).collect();
        assert_eq!(logs.len(), 5);
        assert_eq!(logs.last().unwrap().0, IVec3::new(0, 15, 0));
        // 5x5x5 cube minus the three trunk cells it overlaps.
        let leaves = plan.cells.iter().filter(|c| c.1 == BlockType::Leaves).count();
        assert_eq!(leaves, 125 - 3);
        let mut seen = std::collections::HashSet::new();
        assert!(plan.cells.iter().all(|c| seen.insert(c.0)));
        assert!(plan.cells.iter().any(|c| c.0 == IVec3::new(0, 17, 0)));
    }

    #[test]
    fn wisp_requires_clear_column() {
        let plan = plan_wisp(IVec3::new(1, 1, 1), 3);
        assert_eq!(plan.cells.len(), 3);
        assert_eq!(plan.cells[2], (IVec3::new(1, 4, 1), BlockType::Wisp));
        assert!(plan.cells[..2].iter().all(|c| c.1 == BlockType::Air));
    }
}
