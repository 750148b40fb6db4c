//! # Visibility
//!
//! Field of view via symmetric shadowcasting, plus the permanent record of
//! every tile the player has ever seen.
//!
//! The light area is scanned as four quadrants. Each quadrant is processed
//! row by row moving away from the origin, and each row keeps a pair of
//! slopes bounding the part not yet shadowed. Slopes are exact fractions, so
//! no floating point rounding can open gaps in walls.

use crate::{Position, TileMap};
use std::collections::HashSet;

/// A slope `num / den` measured from the origin, `den` always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slope {
    num: i32,
    den: i32,
}

impl Slope {
    fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Slope through the near edge of the tile at `col` in a row at `depth`.
    fn through_tile(depth: i32, col: i32) -> Self {
        Self::new(2 * col - 1, 2 * depth)
    }
}

#[derive(Debug, Clone, Copy)]
struct Row {
    depth: i32,
    start: Slope,
    end: Slope,
}

impl Row {
    fn first() -> Self {
        Self {
            depth: 1,
            start: Slope::new(-1, 1),
            end: Slope::new(1, 1),
        }
    }

    /// `depth * start`, rounded half up.
    fn min_col(&self) -> i32 {
        (2 * self.depth * self.start.num + self.start.den).div_euclid(2 * self.start.den)
    }

    /// `depth * end`, rounded half down.
    fn max_col(&self) -> i32 {
        -((self.end.den - 2 * self.depth * self.end.num).div_euclid(2 * self.end.den))
    }

    /// Floor tiles are lit only when their centre lies inside the row's slopes.
    fn is_symmetric(&self, col: i32) -> bool {
        col * self.start.den >= self.depth * self.start.num
            && col * self.end.den <= self.depth * self.end.num
    }

    fn next(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Quadrant {
    North,
    East,
    South,
    West,
}

impl Quadrant {
    const ALL: [Quadrant; 4] = [
        Quadrant::North,
        Quadrant::East,
        Quadrant::South,
        Quadrant::West,
    ];

    fn transform(self, origin: Position, depth: i32, col: i32) -> Position {
        match self {
            Quadrant::North => Position::new(origin.x + col, origin.y - depth),
            Quadrant::South => Position::new(origin.x + col, origin.y + depth),
            Quadrant::East => Position::new(origin.x + depth, origin.y + col),
            Quadrant::West => Position::new(origin.x - depth, origin.y + col),
        }
    }
}

/// Computes every tile in line of sight of `origin` up to `radius` rows away.
///
/// Opaque tiles that bound the lit area are included, as a wall you can see
/// is visible. The origin is always included. Coordinates are not clipped to
/// any bounds; callers filter as needed.
///
/// # Examples
///
/// ```
/// use delve::{compute_visible, Position};
///
/// // An open field: everything within the radius is lit
/// let visible = compute_visible(Position::new(0, 0), 2, |_| true);
/// assert_eq!(visible.len(), 25);
///
/// // Solid rock: only the viewer and the surrounding walls
/// let visible = compute_visible(Position::new(0, 0), 2, |_| false);
/// assert_eq!(visible.len(), 9);
/// ```
pub fn compute_visible<F>(origin: Position, radius: i32, is_transparent: F) -> HashSet<Position>
where
    F: Fn(Position) -> bool,
{
    let mut visible = HashSet::new();
    visible.insert(origin);

    if radius <= 0 {
        return visible;
    }

    for quadrant in Quadrant::ALL {
        let mut rows = vec![Row::first()];

        while let Some(mut row) = rows.pop() {
            if row.depth > radius {
                continue;
            }

            // None until the first tile of the row, then whether the last tile was a wall
            let mut previous_wall: Option<bool> = None;

            for col in row.min_col()..=row.max_col() {
                let pos = quadrant.transform(origin, row.depth, col);
                let is_wall = !is_transparent(pos);

                if is_wall || row.is_symmetric(col) {
                    visible.insert(pos);
                }

                match previous_wall {
                    Some(true) if !is_wall => {
                        row.start = Slope::through_tile(row.depth, col);
                    }
                    Some(false) if is_wall => {
                        let mut next = row.next();
                        next.end = Slope::through_tile(row.depth, col);
                        rows.push(next);
                    }
                    _ => {}
                }

                previous_wall = Some(is_wall);
            }

            if previous_wall == Some(false) {
                rows.push(row.next());
            }
        }
    }

    visible
}

/// What the player can see right now and what they have seen before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    /// Tiles lit by the last recompute
    pub visible: HashSet<Position>,
    /// Every tile ever lit on this level; only grows
    pub explored: HashSet<Position>,
}

impl Visibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `visible` with the view from `origin` and folds it into `explored`.
    pub fn recompute(&mut self, origin: Position, radius: i32, map: &TileMap) {
        self.visible = compute_visible(origin, radius, |pos| map.is_transparent(pos))
            .into_iter()
            .filter(|pos| map.is_valid_position(*pos))
            .collect();
        self.explored.extend(self.visible.iter().copied());
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.visible.contains(&pos)
    }

    pub fn is_explored(&self, pos: Position) -> bool {
        self.explored.contains(&pos)
    }

    /// Forgets everything, used when a new level starts.
    pub fn reset(&mut self) {
        self.visible.clear();
        self.explored.clear();
    }
}
