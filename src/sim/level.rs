/// Level descriptors: text format, parsing and the built-in catalog.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files)
///   2. Built-in embedded levels
///
/// ## Descriptor format (`.txt`):
///   Header lines in any order, then the map:
///   ```
///   columns: 9
///   rows: 5
///   pushes: 1
///   position: 20
///   teleports: 21-23,23-21
///   skulls: 22,31
///   map:
///   XXXXXXXXX
///   ...
///   ```
///   `position` is the hero's start cell, `pushes` the push par used
///   for scoring, `skulls` the skull start cells, `teleports` a list
///   of `entry-exit` cell pairs. All cells are row-major indices
///   (`row * columns + col`). The value of a header line is whatever
///   follows its last `:`, with whitespace stripped. Unknown header
///   lines are ignored; map rows may be longer than `columns` and
///   anything after the last map row is ignored.
///
/// ## Tile legend:
///   'X' = Block           '*' = Floor         'S' = Ice
///   'D' = Destination     'T' = Portal        'E' = Empty (void)
///   anything else = Floor
use std::path::Path;

use crate::domain::entity::CellIx;
use crate::domain::tile::Tile;
use crate::error::LevelError;

/// Parsed level definition, immutable once built.
#[derive(Clone, Debug)]
pub struct LevelDescriptor {
    pub name: String,
    pub columns: usize,
    pub rows: usize,
    pub tiles: Vec<Tile>,
    pub hero_start: CellIx,
    pub skull_starts: Vec<CellIx>,
    pub portals: Vec<(CellIx, CellIx)>,
    pub par_pushes: u32,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse one descriptor file; the file stem becomes the level name.
pub fn load_level_file(path: &Path) -> Result<LevelDescriptor, LevelError> {
    let text = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    parse_level(&name, &text)
}

/// All `*.txt` descriptors in a directory, sorted by file name.
/// Files that fail to parse are skipped with a warning on stderr.
pub fn load_from_directory(dir: &Path) -> Vec<LevelDescriptor> {
    let mut found: Vec<(String, LevelDescriptor)> = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().map_or(false, |e| e == "txt") {
            continue;
        }
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        match load_level_file(&path) {
            Ok(level) => found.push((filename, level)),
            Err(e) => eprintln!("Warning: skipping level {}: {}", path.display(), e),
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    found.into_iter().map(|(_, level)| level).collect()
}

// ══════════════════════════════════════════════════════════════
// Descriptor parsing
// ══════════════════════════════════════════════════════════════

/// Parse a descriptor from text. Every malformed input maps to a
/// specific `LevelError`; nothing partial is returned.
pub fn parse_level(name: &str, text: &str) -> Result<LevelDescriptor, LevelError> {
    let mut columns: Option<usize> = None;
    let mut rows: Option<usize> = None;
    let mut par_pushes: u32 = 0;
    let mut position: Option<usize> = None;
    let mut skull_cells: Vec<usize> = Vec::new();
    let mut teleport_cells: Vec<(usize, usize)> = Vec::new();

    let mut lines = text.lines();
    let mut saw_map = false;
    for line in lines.by_ref() {
        if line.starts_with("columns") {
            columns = Some(int_field("columns", line)?);
        } else if line.starts_with("rows") {
            rows = Some(int_field("rows", line)?);
        } else if line.starts_with("pushes") {
            par_pushes = int_field("pushes", line)?;
        } else if line.starts_with("position") {
            position = Some(int_field("position", line)?);
        } else if line.starts_with("skulls") {
            skull_cells = cell_list("skulls", line)?;
        } else if line.starts_with("teleports") {
            teleport_cells = pair_list("teleports", line)?;
        } else if line.starts_with("map:") {
            saw_map = true;
            break;
        }
    }

    if !saw_map {
        return Err(LevelError::MissingField { field: "map" });
    }
    let columns = columns.ok_or(LevelError::MissingField { field: "columns" })?;
    let rows = rows.ok_or(LevelError::MissingField { field: "rows" })?;
    let position = position.ok_or(LevelError::MissingField { field: "position" })?;
    if columns == 0 {
        return Err(bad_value("columns", "0"));
    }
    if rows == 0 {
        return Err(bad_value("rows", "0"));
    }

    let mut tiles = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        let line = match lines.next() {
            Some(line) => line,
            None => {
                return Err(LevelError::MapTooShort {
                    declared: rows,
                    found: row,
                })
            }
        };
        let cells: Vec<char> = line.chars().collect();
        if cells.len() < columns {
            return Err(LevelError::RowTooShort {
                row,
                declared: columns,
                found: cells.len(),
            });
        }
        for &ch in &cells[..columns] {
            tiles.push(tile_for(ch));
        }
    }

    let descriptor = LevelDescriptor {
        name: name.to_string(),
        columns,
        rows,
        tiles,
        hero_start: CellIx(position),
        skull_starts: skull_cells.iter().map(|&c| CellIx(c)).collect(),
        portals: teleport_cells
            .iter()
            .map(|&(a, b)| (CellIx(a), CellIx(b)))
            .collect(),
        par_pushes,
    };
    validate(&descriptor)?;
    Ok(descriptor)
}

fn tile_for(ch: char) -> Tile {
    match ch {
        'X' => Tile::Block,
        'S' => Tile::Ice,
        'D' => Tile::Destination,
        'T' => Tile::Portal,
        'E' => Tile::Empty,
        _ => Tile::Floor,
    }
}

/// Value of a `key: value` line: the text after the last ':', with
/// all whitespace stripped.
fn field_value(line: &str) -> String {
    let tail = line.rsplit(':').next().unwrap_or("");
    tail.chars().filter(|c| !c.is_whitespace()).collect()
}

fn int_field<T: std::str::FromStr>(field: &'static str, line: &str) -> Result<T, LevelError> {
    let value = field_value(line);
    value.parse().map_err(|_| LevelError::BadNumber {
        field,
        value: value.clone(),
    })
}

fn cell_list(field: &'static str, line: &str) -> Result<Vec<usize>, LevelError> {
    let value = field_value(line);
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|item| item.parse().map_err(|_| bad_value(field, item)))
        .collect()
}

fn pair_list(field: &'static str, line: &str) -> Result<Vec<(usize, usize)>, LevelError> {
    let value = field_value(line);
    if value.is_empty() {
        return Ok(Vec::new());
    }
    let mut pairs = Vec::new();
    for item in value.split(',') {
        let mut ends = item.split('-');
        match (ends.next(), ends.next(), ends.next()) {
            (Some(a), Some(b), None) => pairs.push((
                a.parse().map_err(|_| bad_value(field, item))?,
                b.parse().map_err(|_| bad_value(field, item))?,
            )),
            _ => return Err(bad_value(field, item)),
        }
    }
    Ok(pairs)
}

fn bad_value(field: &'static str, value: &str) -> LevelError {
    LevelError::BadNumber {
        field,
        value: value.to_string(),
    }
}

// ══════════════════════════════════════════════════════════════
// Validation
// ══════════════════════════════════════════════════════════════

/// Reject any descriptor a board could not be built from: start cells
/// off the grid or on impossible tiles, overlapping starts, and
/// portal tiles whose teleport wiring is absent or ambiguous.
/// Teleport entries whose source is not a portal tile are inert and
/// tolerated, matching what shipped level files contain.
fn validate(level: &LevelDescriptor) -> Result<(), LevelError> {
    let cells = level.columns * level.rows;
    let in_bounds = |what: &'static str, cell: CellIx| -> Result<(), LevelError> {
        if cell.0 < cells {
            Ok(())
        } else {
            Err(LevelError::CellOutOfBounds {
                what,
                cell: cell.0,
                cells,
            })
        }
    };

    in_bounds("position", level.hero_start)?;
    if !matches!(
        level.tiles[level.hero_start.0],
        Tile::Floor | Tile::Ice | Tile::Destination
    ) {
        return Err(LevelError::HeroOnBadTile {
            cell: level.hero_start.0,
        });
    }

    for (i, &skull) in level.skull_starts.iter().enumerate() {
        in_bounds("skulls", skull)?;
        if !matches!(level.tiles[skull.0], Tile::Floor | Tile::Ice) {
            return Err(LevelError::SkullOnBadTile { cell: skull.0 });
        }
        if skull == level.hero_start || level.skull_starts[..i].contains(&skull) {
            return Err(LevelError::SkullCollision { cell: skull.0 });
        }
    }

    for &(entry, exit) in &level.portals {
        in_bounds("teleports", entry)?;
        in_bounds("teleports", exit)?;
        if level.tiles[exit.0].is_solid() {
            return Err(LevelError::PortalExitSolid { cell: exit.0 });
        }
    }

    // Every portal tile needs exactly one outgoing teleport.
    for (cell, tile) in level.tiles.iter().enumerate() {
        if *tile != Tile::Portal {
            continue;
        }
        let wired = level
            .portals
            .iter()
            .filter(|(from, _)| from.0 == cell)
            .count();
        if wired == 0 {
            return Err(LevelError::UnwiredPortal { cell });
        }
        if wired > 1 {
            return Err(LevelError::DoubledPortal { cell });
        }
    }

    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDescriptor> {
    vec![
        make_level(
            "Crypt 1 - First Push",
            2,
            (2, 2),
            &[(2, 3)],
            &[],
            &[
                "XXXXXXX",
                "X*****X",
                "X****DX",
                "X*****X",
                "XXXXXXX",
            ],
        ),
        make_level(
            "Crypt 2 - Cold Feet",
            1,
            (2, 2),
            &[(2, 3)],
            &[],
            &[
                "XXXXXXXXX",
                "X*******X",
                "X***SSD*X",
                "X*******X",
                "XXXXXXXXX",
            ],
        ),
        make_level(
            "Crypt 3 - Skating Rink",
            2,
            (4, 3),
            &[(3, 4)],
            &[],
            &[
                "XXXXXXXXX",
                "X**SSS**X",
                "X*******X",
                "X*****D*X",
                "X*******X",
                "XXXXXXXXX",
            ],
        ),
        make_level(
            "Crypt 4 - Mirror Gate",
            1,
            (2, 1),
            &[(2, 2)],
            &[((2, 3), (2, 5))],
            &[
                "XXXXXXXXX",
                "X***X***X",
                "X**TX*D*X",
                "X***X***X",
                "XXXXXXXXX",
            ],
        ),
        make_level(
            "Crypt 5 - Round Trip",
            2,
            (1, 1),
            &[(2, 2), (4, 2)],
            &[((3, 2), (3, 8)), ((3, 8), (3, 2))],
            &[
                "XXXXXXXXXXX",
                "X****X****X",
                "X****X**D*X",
                "X*T**X**T*X",
                "X****X**D*X",
                "X****X****X",
                "XXXXXXXXXXX",
            ],
        ),
        make_level(
            "Crypt 6 - Deep Freeze",
            4,
            (6, 5),
            &[(4, 3), (4, 7)],
            &[],
            &[
                "XXXXXXXXXXX",
                "X*********X",
                "X*SSSSSSS*X",
                "X*********X",
                "X*********X",
                "X*D*****D*X",
                "X*********X",
                "XXXXXXXXXXX",
            ],
        ),
    ]
}

fn make_level(
    name: &str,
    par: u32,
    hero: (usize, usize),
    skulls: &[(usize, usize)],
    teleports: &[((usize, usize), (usize, usize))],
    map: &[&str],
) -> LevelDescriptor {
    let rows = map.len();
    let columns = map[0].len();
    let at = |(row, col): (usize, usize)| CellIx(row * columns + col);
    let mut tiles = Vec::with_capacity(columns * rows);
    for row in map {
        for ch in row.chars() {
            tiles.push(tile_for(ch));
        }
    }
    LevelDescriptor {
        name: name.to_string(),
        columns,
        rows,
        tiles,
        hero_start: at(hero),
        skull_starts: skulls.iter().map(|&rc| at(rc)).collect(),
        portals: teleports.iter().map(|&(a, b)| (at(a), at(b))).collect(),
        par_pushes: par,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<LevelDescriptor, LevelError> {
        parse_level("test", text)
    }

    const SMALL: &str = "\
columns: 5
rows: 3
pushes: 1
position: 6
skulls: 7
map:
XXXXX
X***X
XXXXX
";

    // ── happy path ──

    #[test]
    fn parses_a_minimal_level() {
        let level = parse(SMALL).unwrap();
        assert_eq!(level.name, "test");
        assert_eq!(level.columns, 5);
        assert_eq!(level.rows, 3);
        assert_eq!(level.par_pushes, 1);
        assert_eq!(level.hero_start, CellIx(6));
        assert_eq!(level.skull_starts, vec![CellIx(7)]);
        assert!(level.portals.is_empty());
        assert_eq!(level.tiles.len(), 15);
        assert_eq!(level.tiles[0], Tile::Block);
        assert_eq!(level.tiles[6], Tile::Floor);
    }

    #[test]
    fn legend_maps_every_tile_kind() {
        let text = "\
columns: 7
rows: 1
position: 1
teleports: 4-1
map:
X*SDTE?
";
        let level = parse(text).unwrap();
        assert_eq!(
            level.tiles,
            vec![
                Tile::Block,
                Tile::Floor,
                Tile::Ice,
                Tile::Destination,
                Tile::Portal,
                Tile::Empty,
                Tile::Floor, // unknown characters read as floor
            ]
        );
    }

    #[test]
    fn value_is_taken_after_the_last_colon() {
        let text = "\
columns :  5
rows: 3
pushes: 0
position:   6
map:
XXXXX
X***X
XXXXX
";
        let level = parse(text).unwrap();
        assert_eq!(level.columns, 5);
        assert_eq!(level.hero_start, CellIx(6));
        assert_eq!(level.par_pushes, 0);
    }

    #[test]
    fn teleport_pairs_and_skull_lists_parse() {
        let text = "\
columns: 5
rows: 3
position: 6
skulls: 7,8
teleports: 2-6,3-8
map:
XXTTX
X***X
XXXXX
";
        let level = parse(text).unwrap();
        assert_eq!(level.skull_starts, vec![CellIx(7), CellIx(8)]);
        assert_eq!(
            level.portals,
            vec![(CellIx(2), CellIx(6)), (CellIx(3), CellIx(8))]
        );
    }

    #[test]
    fn long_rows_and_trailing_lines_are_ignored() {
        let text = "\
columns: 5
rows: 3
position: 6
flavor: something unrecognized
map:
XXXXX???
X***X
XXXXX
leftover junk
";
        let level = parse(text).unwrap();
        assert_eq!(level.tiles.len(), 15);
        assert_eq!(level.tiles[4], Tile::Block);
    }

    #[test]
    fn hero_may_start_on_a_destination() {
        let text = "\
columns: 5
rows: 3
position: 6
map:
XXXXX
XD**X
XXXXX
";
        assert!(parse(text).is_ok());
    }

    // ── header errors ──

    #[test]
    fn missing_fields_are_errors() {
        let no_map = "columns: 5\nrows: 3\nposition: 6\n";
        assert!(matches!(
            parse(no_map),
            Err(LevelError::MissingField { field: "map" })
        ));

        let no_columns = "rows: 3\nposition: 6\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(no_columns),
            Err(LevelError::MissingField { field: "columns" })
        ));

        let no_rows = "columns: 5\nposition: 6\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(no_rows),
            Err(LevelError::MissingField { field: "rows" })
        ));

        let no_position = "columns: 5\nrows: 3\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(no_position),
            Err(LevelError::MissingField { field: "position" })
        ));
    }

    #[test]
    fn non_numeric_field_is_an_error() {
        let text = "columns: five\nrows: 3\nposition: 6\nmap:\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::BadNumber { field: "columns", .. })
        ));
    }

    #[test]
    fn zero_dimension_is_an_error() {
        let text = "columns: 0\nrows: 3\nposition: 0\nmap:\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::BadNumber { field: "columns", .. })
        ));
    }

    #[test]
    fn malformed_teleport_pair_is_an_error() {
        let text = "columns: 5\nrows: 3\nposition: 6\nteleports: 4\nmap:\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::BadNumber { field: "teleports", .. })
        ));
    }

    // ── map errors ──

    #[test]
    fn short_map_is_an_error() {
        let text = "columns: 5\nrows: 3\nposition: 6\nmap:\nXXXXX\nX***X\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::MapTooShort { declared: 3, found: 2 })
        ));
    }

    #[test]
    fn short_row_is_an_error() {
        let text = "columns: 5\nrows: 3\nposition: 6\nmap:\nXXXXX\nX*X\nXXXXX\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::RowTooShort { row: 1, declared: 5, found: 3 })
        ));
    }

    // ── placement errors ──

    #[test]
    fn out_of_bounds_cells_are_errors() {
        let position = "columns: 5\nrows: 3\nposition: 99\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(position),
            Err(LevelError::CellOutOfBounds { what: "position", cell: 99, cells: 15 })
        ));

        let skull = "columns: 5\nrows: 3\nposition: 6\nskulls: 99\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(skull),
            Err(LevelError::CellOutOfBounds { what: "skulls", .. })
        ));

        let teleport =
            "columns: 5\nrows: 3\nposition: 6\nteleports: 2-99\nmap:\nXXTXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(teleport),
            Err(LevelError::CellOutOfBounds { what: "teleports", .. })
        ));
    }

    #[test]
    fn hero_on_a_wall_is_an_error() {
        let text = "columns: 5\nrows: 3\nposition: 0\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::HeroOnBadTile { cell: 0 })
        ));
    }

    #[test]
    fn skull_on_a_destination_is_an_error() {
        let text = "columns: 5\nrows: 3\nposition: 6\nskulls: 7\nmap:\nXXXXX\nX*D*X\nXXXXX\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::SkullOnBadTile { cell: 7 })
        ));
    }

    #[test]
    fn overlapping_starts_are_errors() {
        let dup = "columns: 5\nrows: 3\nposition: 6\nskulls: 7,7\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(dup),
            Err(LevelError::SkullCollision { cell: 7 })
        ));

        let on_hero = "columns: 5\nrows: 3\nposition: 6\nskulls: 6\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(on_hero),
            Err(LevelError::SkullCollision { cell: 6 })
        ));
    }

    // ── portal wiring ──

    #[test]
    fn unwired_portal_is_an_error() {
        let text = "columns: 5\nrows: 3\nposition: 6\nmap:\nXXTXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::UnwiredPortal { cell: 2 })
        ));
    }

    #[test]
    fn doubled_portal_is_an_error() {
        let text =
            "columns: 5\nrows: 3\nposition: 6\nteleports: 2-6,2-8\nmap:\nXXTXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::DoubledPortal { cell: 2 })
        ));
    }

    #[test]
    fn teleport_exit_into_a_wall_is_an_error() {
        let text = "columns: 5\nrows: 3\nposition: 6\nteleports: 2-0\nmap:\nXXTXX\nX***X\nXXXXX\n";
        assert!(matches!(
            parse(text),
            Err(LevelError::PortalExitSolid { cell: 0 })
        ));
    }

    #[test]
    fn inert_teleport_entries_are_tolerated() {
        // Source cell 8 is floor, not a portal: the entry can never
        // fire and parses fine.
        let text = "columns: 5\nrows: 3\nposition: 6\nteleports: 8-7\nmap:\nXXXXX\nX***X\nXXXXX\n";
        assert!(parse(text).is_ok());
    }

    // ── catalog ──

    #[test]
    fn embedded_levels_all_validate() {
        let levels = embedded_levels();
        assert!(!levels.is_empty());
        for level in &levels {
            assert!(validate(level).is_ok(), "bad embedded level {}", level.name);
            assert!(!level.skull_starts.is_empty(), "{} has no skulls", level.name);
            assert!(level.par_pushes > 0, "{} has no push par", level.name);
            assert_eq!(
                level.tiles.len(),
                level.columns * level.rows,
                "{} has a ragged map",
                level.name
            );
            // A level must offer at least as many pads as skulls.
            let pads = level
                .tiles
                .iter()
                .filter(|t| **t == Tile::Destination)
                .count();
            assert!(pads >= level.skull_starts.len(), "{} lacks pads", level.name);
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_level_file(Path::new("/nonexistent/skulldozer-level.txt")).unwrap_err();
        assert!(matches!(err, LevelError::Io(_)));
    }
}
