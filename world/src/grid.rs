//! Dense cell storage backing the world's map.

use fire_brigade_core::{CellCoord, CellFire, FireId, FireState, GridView, RobotId, Terrain};

/// Row-major layers describing terrain, fires and occupancy of every cell.
///
/// The water-source registry mirrors the terrain layer: it is rebuilt when the
/// grid is configured and patched whenever an administrative edit turns a cell
/// into water or dries it out.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cell_size_meters: u32,
    terrain: Vec<Terrain>,
    fires: Vec<Option<CellFire>>,
    occupancy: Vec<Option<RobotId>>,
    water_sources: Vec<CellCoord>,
}

impl Grid {
    pub(crate) fn new(columns: u32, rows: u32, cell_size_meters: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cell_size_meters,
            terrain: vec![Terrain::Open; capacity],
            fires: vec![None; capacity],
            occupancy: vec![None; capacity],
            water_sources: Vec::new(),
        }
    }

    pub(crate) fn view(&self) -> GridView<'_> {
        GridView::new(
            self.columns,
            self.rows,
            self.cell_size_meters,
            &self.terrain,
            &self.fires,
            &self.water_sources,
        )
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    pub(crate) fn terrain(&self, cell: CellCoord) -> Option<Terrain> {
        self.index(cell)
            .and_then(|index| self.terrain.get(index).copied())
    }

    /// Replaces the terrain of a cell, keeping the water registry in sync.
    pub(crate) fn set_terrain(&mut self, cell: CellCoord, terrain: Terrain) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };

        let previous = std::mem::replace(&mut self.terrain[index], terrain);
        match (previous == Terrain::Water, terrain == Terrain::Water) {
            (false, true) => self.water_sources.push(cell),
            (true, false) => self.water_sources.retain(|source| *source != cell),
            _ => {}
        }
        true
    }

    pub(crate) fn fire(&self, cell: CellCoord) -> Option<CellFire> {
        self.index(cell)
            .and_then(|index| self.fires.get(index).copied().flatten())
    }

    pub(crate) fn attach_fire(&mut self, cell: CellCoord, fire: FireId) {
        if let Some(slot) = self.index(cell).and_then(|index| self.fires.get_mut(index)) {
            debug_assert!(slot.is_none(), "cell already carries a fire");
            *slot = Some(CellFire {
                id: fire,
                state: FireState::Active,
            });
        }
    }

    pub(crate) fn set_fire_state(&mut self, cell: CellCoord, state: FireState) {
        if let Some(Some(fire)) = self.index(cell).and_then(|index| self.fires.get_mut(index)) {
            fire.state = state;
        }
    }

    pub(crate) fn detach_fire(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.fires.get_mut(index)) {
            *slot = None;
        }
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<RobotId> {
        self.index(cell)
            .and_then(|index| self.occupancy.get(index).copied().flatten())
    }

    pub(crate) fn occupy(&mut self, cell: CellCoord, robot: RobotId) {
        if let Some(slot) = self.index(cell).and_then(|index| self.occupancy.get_mut(index)) {
            *slot = Some(robot);
        }
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.occupancy.get_mut(index)) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_registry_tracks_terrain_edits() {
        let mut grid = Grid::new(3, 3, 100);
        let lake = CellCoord::new(1, 1);

        assert!(grid.set_terrain(lake, Terrain::Water));
        assert!(grid.set_terrain(lake, Terrain::Water));
        assert_eq!(grid.view().water_sources(), &[lake]);

        assert!(grid.set_terrain(lake, Terrain::Forest));
        assert!(grid.view().water_sources().is_empty());
        assert!(!grid.set_terrain(CellCoord::new(3, 0), Terrain::Water));
    }

    #[test]
    fn fire_layer_follows_attach_and_detach() {
        let mut grid = Grid::new(2, 2, 100);
        let cell = CellCoord::new(1, 0);
        let fire = FireId::new(4);

        grid.attach_fire(cell, fire);
        assert!(grid.view().has_active_fire(cell));

        grid.set_fire_state(cell, FireState::Targeted);
        assert_eq!(
            grid.fire(cell),
            Some(CellFire {
                id: fire,
                state: FireState::Targeted,
            })
        );
        assert!(!grid.view().is_hazard(cell));

        grid.detach_fire(cell);
        assert_eq!(grid.fire(cell), None);
    }

    #[test]
    fn occupancy_ignores_out_of_bounds_cells() {
        let mut grid = Grid::new(2, 1, 100);
        let robot = RobotId::new(0);

        grid.occupy(CellCoord::new(5, 5), robot);
        assert_eq!(grid.occupant(CellCoord::new(5, 5)), None);

        grid.occupy(CellCoord::new(1, 0), robot);
        assert_eq!(grid.occupant(CellCoord::new(1, 0)), Some(robot));
        grid.vacate(CellCoord::new(1, 0));
        assert_eq!(grid.occupant(CellCoord::new(1, 0)), None);
        assert_eq!(grid.dimensions(), (2, 1));
        assert!(grid.contains(CellCoord::new(1, 0)));
    }
}
