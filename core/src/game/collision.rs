use super::grid::Grid;
use super::types::MoveClass;

/// Classifies a proposed head move against pre-tick occupancy. First match
/// wins: wall, self, apple, clear.
///
/// `vacated` is the single cell the snake frees this tick (the tail-end
/// snapshot, or the head itself when the tail is empty); moving onto it is
/// not a self collision.
pub fn classify(
    proposed: i64,
    previous: usize,
    side: usize,
    grid: &Grid,
    vacated: usize,
) -> MoveClass {
    if proposed < 0 || proposed >= (side * side) as i64 {
        return MoveClass::WallCollision;
    }
    let proposed = proposed as usize;

    // Horizontal moves stay within their row: stepping left out of the
    // leftmost column or right out of the rightmost column is a wall hit,
    // not a wrap to the adjacent row.
    if previous % side == 0 && proposed + 1 == previous {
        return MoveClass::WallCollision;
    }
    if (previous + 1) % side == 0 && proposed == previous + 1 && proposed % side == 0 {
        return MoveClass::WallCollision;
    }

    if grid.is_occupied(proposed) && proposed != vacated {
        return MoveClass::SelfCollision;
    }

    if grid.has_apple(proposed) {
        return MoveClass::AppleHit;
    }

    MoveClass::Clear
}
