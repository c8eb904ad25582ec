use crate::infra::{AgentId, EnvError, EnvResult, Position};

use super::map::ObstacleGrid;

/// Mutable overlay marking the cells agents currently sit on, with its own copy of the walls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMap {
    rows: usize,
    cols: usize,
    walls: Vec<bool>,
    occupied: Vec<bool>,
}

impl OccupancyMap {
    /// Build the overlay from the start positions, rejecting starts on walls,
    /// outside the grid, or shared by two agents.
    pub fn initialise<I>(obstacles: &ObstacleGrid, starts: I) -> EnvResult<Self>
    where
        I: IntoIterator<Item = (AgentId, Position)>,
    {
        let walls: Vec<bool> = obstacles.iter().map(|(pos, _)| obstacles.is_wall(pos)).collect();
        let mut map = Self {
            rows: obstacles.rows(),
            cols: obstacles.cols(),
            occupied: vec![false; walls.len()],
            walls,
        };

        for (agent, start) in starts {
            let Some(idx) = map.index(start) else {
                return Err(EnvError::configuration(format!(
                    "start position {} of agent {} is outside the {}x{} grid",
                    start, agent, map.rows, map.cols
                )));
            };
            if map.walls[idx] {
                return Err(EnvError::Overlap {
                    agent,
                    kind: "start",
                    position: start,
                    with: "obstacles",
                });
            }
            if map.occupied[idx] {
                return Err(EnvError::Overlap {
                    agent,
                    kind: "start",
                    position: start,
                    with: "another agent",
                });
            }
            map.occupied[idx] = true;
        }

        Ok(map)
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.rows && (pos.col as usize) < self.cols
    }

    /// True iff in bounds and neither a wall nor occupied.
    pub fn is_free(&self, pos: Position) -> bool {
        self.index(pos)
            .is_some_and(|idx| !self.walls[idx] && !self.occupied[idx])
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|idx| self.occupied[idx])
    }

    /// Clear `from` and mark `to`. Legality must already be established by the caller.
    pub fn move_agent(&mut self, from: Position, to: Position) {
        if let Some(idx) = self.index(from) {
            self.occupied[idx] = false;
        }
        if let Some(idx) = self.index(to) {
            self.occupied[idx] = true;
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|o| **o).count()
    }

    /// Number of cells that are both a wall and occupied; always zero unless the overlay is corrupt.
    pub fn occupied_walls(&self) -> usize {
        self.occupied
            .iter()
            .zip(&self.walls)
            .filter(|(occupied, wall)| **occupied && **wall)
            .count()
    }

    pub fn occupied_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.occupied
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .map(|(idx, _)| Position::new((idx / self.cols) as i32, (idx % self.cols) as i32))
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.is_in_bounds(pos) {
            Some(pos.row as usize * self.cols + pos.col as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ObstacleGrid {
        ObstacleGrid::from_rows(&["000", "010", "000"]).unwrap()
    }

    #[test]
    fn test_initialise_marks_starts() {
        let grid = grid();
        let map = OccupancyMap::initialise(
            &grid,
            [(0, Position::new(0, 0)), (1, Position::new(2, 2))],
        )
        .unwrap();

        assert_eq!(map.occupied_count(), 2);
        assert!(map.is_occupied(Position::new(0, 0)));
        assert!(!map.is_free(Position::new(0, 0)));
        assert!(!map.is_free(Position::new(1, 1)), "walls are never free");
        assert!(map.is_free(Position::new(0, 1)));
        assert!(!map.is_free(Position::new(-1, 0)));
        assert!(!map.is_free(Position::new(0, 3)));
    }

    #[test]
    fn test_start_on_wall_is_overlap() {
        let err = OccupancyMap::initialise(&grid(), [(3, Position::new(1, 1))]).unwrap_err();
        assert_eq!(
            err,
            EnvError::Overlap {
                agent: 3,
                kind: "start",
                position: Position::new(1, 1),
                with: "obstacles",
            }
        );
        assert!(err.to_string().contains("(1, 1)"));
    }

    #[test]
    fn test_shared_start_is_overlap() {
        let err = OccupancyMap::initialise(
            &grid(),
            [(0, Position::new(0, 0)), (1, Position::new(0, 0))],
        )
        .unwrap_err();
        assert!(matches!(err, EnvError::Overlap { agent: 1, .. }));
    }

    #[test]
    fn test_start_out_of_bounds() {
        let err = OccupancyMap::initialise(&grid(), [(0, Position::new(5, 0))]).unwrap_err();
        assert!(matches!(err, EnvError::Configuration { .. }));
    }

    #[test]
    fn test_move_agent_updates_overlay() {
        let mut map = OccupancyMap::initialise(&grid(), [(0, Position::new(0, 0))]).unwrap();
        map.move_agent(Position::new(0, 0), Position::new(0, 1));

        assert!(map.is_free(Position::new(0, 0)));
        assert!(map.is_occupied(Position::new(0, 1)));
        assert_eq!(map.occupied_count(), 1);
        assert_eq!(map.occupied_walls(), 0);
        assert_eq!(
            map.occupied_positions().collect::<Vec<_>>(),
            vec![Position::new(0, 1)]
        );
    }
}
