use crate::infra::{EnvError, EnvResult, Position};

/// Built-in layouts, one string per row, `0` = free and `1` = wall.
const PRESETS: &[(&str, &[&str])] = &[
    ("4x4", &["0000", "0101", "0001", "1000"]),
    (
        "8x8",
        &[
            "00000000", "00000000", "00010000", "00000100", "00010000", "01100010", "01001010",
            "00010000",
        ],
    ),
];

pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}

pub fn preset(name: &str) -> Option<&'static [&'static str]> {
    PRESETS
        .iter()
        .find(|(preset_name, _)| *preset_name == name)
        .map(|(_, rows)| *rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Free,
    Wall,
}

/// Where the wall layout comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSource {
    Preset(String),
    Custom(Vec<String>),
}

impl MapSource {
    /// Pick the obstacle source; exactly one of the two must be given.
    pub fn resolve(map_name: Option<&str>, custom_map: Option<&[String]>) -> EnvResult<Self> {
        match (map_name, custom_map) {
            (Some(_), Some(_)) => Err(EnvError::configuration(
                "both a map name and a custom map were provided, expected exactly one",
            )),
            (None, None) => Err(EnvError::configuration(
                "either a map name or a custom map must be provided",
            )),
            (Some(name), None) => Ok(MapSource::Preset(name.to_string())),
            (None, Some(rows)) => Ok(MapSource::Custom(rows.to_vec())),
        }
    }
}

/// Static wall layout. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl ObstacleGrid {
    pub fn parse(source: &MapSource) -> EnvResult<Self> {
        match source {
            MapSource::Preset(name) => {
                let rows = preset(name).ok_or_else(|| {
                    EnvError::configuration(format!(
                        "unknown map '{}', available maps: {}",
                        name,
                        preset_names().collect::<Vec<_>>().join(", ")
                    ))
                })?;
                Self::from_rows(rows)
            }
            MapSource::Custom(rows) => Self::from_rows(rows),
        }
    }

    pub fn from_rows<S: AsRef<str>>(layout: &[S]) -> EnvResult<Self> {
        let Some(first) = layout.first() else {
            return Err(EnvError::malformed_map("the map has no rows"));
        };
        let cols = first.as_ref().chars().count();
        if cols == 0 {
            return Err(EnvError::malformed_map("the map has no columns"));
        }

        let mut cells = Vec::with_capacity(layout.len() * cols);
        for (row_idx, row) in layout.iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count();
            if len != cols {
                return Err(EnvError::malformed_map(format!(
                    "row {} has length {}, expected {}",
                    row_idx, len, cols
                )));
            }
            for (col_idx, ch) in row.chars().enumerate() {
                let cell = match ch {
                    '0' => Cell::Free,
                    '1' => Cell::Wall,
                    other => {
                        return Err(EnvError::malformed_map(format!(
                            "invalid character '{}' at ({}, {})",
                            other, row_idx, col_idx
                        )));
                    }
                };
                cells.push(cell);
            }
        }

        Ok(Self {
            rows: layout.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.rows && (pos.col as usize) < self.cols
    }

    /// Cell at `pos`, or `None` when out of bounds
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.cell(pos) == Some(Cell::Wall)
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Wall).count()
    }

    pub fn num_states(&self) -> usize {
        self.rows * self.cols
    }

    /// Flat state index `row * cols + col`
    pub fn to_state(&self, pos: Position) -> Option<usize> {
        self.index(pos)
    }

    pub fn to_position(&self, state: usize) -> Option<Position> {
        if state >= self.num_states() {
            return None;
        }
        Some(Position::new(
            (state / self.cols) as i32,
            (state % self.cols) as i32,
        ))
    }

    /// Row-major iteration over every cell
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            (
                Position::new((idx / self.cols) as i32, (idx % self.cols) as i32),
                *cell,
            )
        })
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

    #[test]
    fn test_parse_presets() {
        let small = ObstacleGrid::parse(&MapSource::Preset("4x4".into())).unwrap();
        assert_eq!((small.rows(), small.cols()), (4, 4));
        assert_eq!(small.wall_count(), 4);
        assert!(small.is_wall(Position::new(1, 1)));
        assert!(small.is_wall(Position::new(1, 3)));
        assert!(small.is_wall(Position::new(2, 3)));
        assert!(small.is_wall(Position::new(3, 0)));

        let large = ObstacleGrid::parse(&MapSource::Preset("8x8".into())).unwrap();
        assert_eq!((large.rows(), large.cols()), (8, 8));
        assert_eq!(large.wall_count(), 10);
        assert!(large.is_wall(Position::new(2, 3)));
        assert!(large.is_wall(Position::new(6, 4)));
        assert!(!large.is_wall(Position::new(0, 0)));
    }

    #[test]
    fn test_unknown_preset() {
        let err = ObstacleGrid::parse(&MapSource::Preset("16x16".into())).unwrap_err();
        assert!(matches!(err, EnvError::Configuration { .. }));
    }

    #[test]
    fn test_resolve_source() {
        let rows = vec!["01".to_string()];
        assert!(matches!(
            MapSource::resolve(None, None),
            Err(EnvError::Configuration { .. })
        ));
        assert!(matches!(
            MapSource::resolve(Some("4x4"), Some(rows.as_slice())),
            Err(EnvError::Configuration { .. })
        ));
        assert_eq!(
            MapSource::resolve(Some("4x4"), None).unwrap(),
            MapSource::Preset("4x4".into())
        );
        assert_eq!(
            MapSource::resolve(None, Some(rows.as_slice())).unwrap(),
            MapSource::Custom(rows.clone())
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = ObstacleGrid::from_rows(&["000", "00", "000"]).unwrap_err();
        assert!(matches!(err, EnvError::MalformedMap { .. }));
    }

    #[test]
    fn test_bad_character_rejected() {
        let err = ObstacleGrid::from_rows(&["0E0", "000"]).unwrap_err();
        assert!(matches!(err, EnvError::MalformedMap { .. }));
        let err = ObstacleGrid::from_rows::<&str>(&[]).unwrap_err();
        assert!(matches!(err, EnvError::MalformedMap { .. }));
    }

    #[test]
    fn test_state_conversion() {
        let grid = ObstacleGrid::from_rows(&["000", "010"]).unwrap();
        assert_eq!(grid.num_states(), 6);
        assert_eq!(grid.to_state(Position::new(1, 2)), Some(5));
        assert_eq!(grid.to_position(4), Some(Position::new(1, 1)));
        assert_eq!(grid.to_state(Position::new(2, 0)), None);
        assert_eq!(grid.to_position(6), None);
        assert!(grid.cell(Position::new(-1, 0)).is_none());
    }
}
