//! Procedural level generation
//!
//! The layout shape is fixed per level number; strengths (for some layouts)
//! and powerups are rolled from the caller's RNG.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::format::{BrickSpec, Level};
use crate::consts::{BRICK_GAP, BRICK_HEIGHT, BRICK_MAX_STRENGTH, BRICK_WIDTH, POWERUP_CHANCE};

/// Base grid size
const ROWS: i32 = 6;
const COLS: i32 = 10;

/// Chance a cell of the random layout holds a brick
const RANDOM_FILL: f64 = 0.8;

/// Extra rows beyond this are far below any playfield
const MAX_EXTRA_ROWS: u32 = 64;

/// Layout algorithm for a level number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Level 1: centered 6x10 block, strength by row
    Rows,
    /// Level 2: Manhattan diamond around the grid center
    Diamond,
    /// Level 3: alternating cells
    Checkerboard,
    /// Level 4 and up: sparse grid, stronger bricks as levels climb
    Random,
}

impl Layout {
    pub fn for_level(number: u32) -> Self {
        match number {
            0 | 1 => Layout::Rows,
            2 => Layout::Diamond,
            3 => Layout::Checkerboard,
            _ => Layout::Random,
        }
    }
}

/// Horizontal distance between neighbouring brick origins
fn pitch_x() -> f32 {
    BRICK_WIDTH + BRICK_GAP
}

/// Vertical distance between neighbouring brick origins
fn pitch_y() -> f32 {
    BRICK_HEIGHT + BRICK_GAP
}

/// Strength weights for the random layout, clamped so none is negative
pub fn strength_weights(level: u32) -> [u32; 4] {
    let l = level as i64;
    [5 - l / 2, l, l / 2, l / 3].map(|w| w.clamp(0, u32::MAX as i64) as u32)
}

/// Generate the layout for `number`
pub fn generate_level<R: Rng + ?Sized>(number: u32, screen_width: f32, rng: &mut R) -> Level {
    let layout = Layout::for_level(number);
    let mut level = Level::new(number);
    level.bricks = match layout {
        Layout::Rows => rows(screen_width),
        Layout::Diamond => diamond(),
        Layout::Checkerboard => checkerboard(rng),
        Layout::Random => random(number, rng),
    };
    roll_powerups(&mut level.bricks, rng);

    log::debug!(
        "Generated level {} ({:?}): {} bricks",
        number,
        layout,
        level.bricks.len()
    );
    level
}

fn rows(screen_width: f32) -> Vec<BrickSpec> {
    let total_width = COLS as f32 * BRICK_WIDTH + (COLS - 1) as f32 * BRICK_GAP;
    let start_x = ((screen_width - total_width) / 2.0).floor();

    let mut bricks = Vec::with_capacity((ROWS * COLS) as usize);
    for row in 0..ROWS {
        for col in 0..COLS {
            let x = start_x + col as f32 * pitch_x();
            let y = row as f32 * pitch_y() + 50.0;
            bricks.push(BrickSpec::new(x, y, (row + 1).min(BRICK_MAX_STRENGTH)));
        }
    }
    bricks
}

fn diamond() -> Vec<BrickSpec> {
    let (center_row, center_col) = (ROWS / 2, COLS / 2);
    let mut bricks = Vec::new();
    for row in 0..ROWS + 2 {
        for col in 0..COLS + 2 {
            let dist = (col - center_col).abs() + (row - center_row).abs();
            if dist <= ROWS {
                let x = col as f32 * pitch_x() + 25.0;
                let y = row as f32 * pitch_y() + 40.0;
                bricks.push(BrickSpec::new(x, y, (4 - dist / 2).max(1)));
            }
        }
    }
    bricks
}

fn checkerboard<R: Rng + ?Sized>(rng: &mut R) -> Vec<BrickSpec> {
    let mut bricks = Vec::new();
    for row in 0..ROWS + 2 {
        for col in 0..COLS + 2 {
            if (row + col) % 2 == 0 {
                let x = col as f32 * pitch_x() + 25.0;
                let y = row as f32 * pitch_y() + 40.0;
                bricks.push(BrickSpec::new(x, y, rng.random_range(1..=3)));
            }
        }
    }
    bricks
}

fn random<R: Rng + ?Sized>(number: u32, rng: &mut R) -> Vec<BrickSpec> {
    // An all-zero weight table falls back to strength 1
    let weights = WeightedIndex::new(strength_weights(number)).ok();
    let row_count = ROWS + (number / 2).min(MAX_EXTRA_ROWS) as i32;

    let mut bricks = Vec::new();
    for row in 0..row_count {
        for col in 0..COLS {
            if rng.random::<f64>() < RANDOM_FILL {
                let x = col as f32 * pitch_x() + 50.0;
                let y = row as f32 * pitch_y() + 40.0;
                let strength = match &weights {
                    Some(dist) => dist.sample(rng) as i32 + 1,
                    None => 1,
                };
                bricks.push(BrickSpec::new(x, y, strength.clamp(1, BRICK_MAX_STRENGTH)));
            }
        }
    }
    bricks
}

fn roll_powerups<R: Rng + ?Sized>(bricks: &mut [BrickSpec], rng: &mut R) {
    for brick in bricks {
        let has_powerup = rng.random::<f64>() < POWERUP_CHANCE;
        let powerup_type = if has_powerup { rng.random_range(0..=7) } else { 0 };
        brick.has_powerup = Some(has_powerup);
        brick.powerup_type = Some(powerup_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SCREEN_WIDTH;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_level_one_rows() {
        let level = generate_level(1, SCREEN_WIDTH, &mut rng());
        assert_eq!(level.id, "level-1");
        assert!(!level.editor_version);
        assert_eq!(level.bricks.len(), 60);

        let strengths: Vec<i32> = level.bricks.iter().map(|b| b.strength).collect();
        let expected: Vec<i32> = (0..6).flat_map(|r| [(r + 1).min(4); 10]).collect();
        assert_eq!(strengths, expected);

        // Centered: 16 units of margin on each side of an 800 wide screen
        assert_eq!(level.bricks[0].x, 16.0);
        assert_eq!(level.bricks[9].x, 16.0 + 9.0 * 77.0);
        assert_eq!(level.bricks[0].y, 50.0);
        assert_eq!(level.bricks[59].y, 50.0 + 5.0 * 22.0);
    }

    #[test]
    fn test_diamond_shape() {
        let level = generate_level(2, SCREEN_WIDTH, &mut rng());
        // Center cell (row 3, col 5) is full strength
        let center = level
            .bricks
            .iter()
            .find(|b| b.x == 5.0 * 77.0 + 25.0 && b.y == 3.0 * 22.0 + 40.0)
            .unwrap();
        assert_eq!(center.strength, 4);
        assert!(level.bricks.iter().all(|b| (1..=4).contains(&b.strength)));

        // Corner (row 0, col 11) is distance 9, outside the diamond
        assert!(!level.bricks.iter().any(|b| b.x == 11.0 * 77.0 + 25.0 && b.y == 40.0));
    }

    #[test]
    fn test_checkerboard_cells() {
        let level = generate_level(3, SCREEN_WIDTH, &mut rng());
        assert_eq!(level.bricks.len(), 48);
        for b in &level.bricks {
            let col = ((b.x - 25.0) / 77.0).round() as i32;
            let row = ((b.y - 40.0) / 22.0).round() as i32;
            assert_eq!((row + col) % 2, 0);
            assert!((1..=3).contains(&b.strength));
        }
    }

    #[test]
    fn test_random_layout_bounds() {
        let level = generate_level(8, SCREEN_WIDTH, &mut rng());
        let max_cells = (6 + 4) * 10;
        assert!(!level.bricks.is_empty());
        assert!(level.bricks.len() <= max_cells);
        assert!(level.bricks.iter().all(|b| (1..=4).contains(&b.strength)));
    }

    #[test]
    fn test_weights_never_negative() {
        assert_eq!(strength_weights(4), [3, 4, 2, 1]);
        assert_eq!(strength_weights(12), [0, 12, 6, 4]);
        assert_eq!(strength_weights(30)[0], 0);
    }

    #[test]
    fn test_high_level_generates_only_heavier_bricks() {
        // Weight for strength 1 is zero from level 10 onward
        let level = generate_level(20, SCREEN_WIDTH, &mut rng());
        assert!(level.bricks.iter().all(|b| b.strength >= 2));
    }

    #[test]
    fn test_every_brick_gets_powerup_fields() {
        let level = generate_level(5, SCREEN_WIDTH, &mut rng());
        for b in &level.bricks {
            let kind = b.powerup_type.unwrap();
            match b.has_powerup {
                Some(true) => assert!((0..=7).contains(&kind)),
                Some(false) => assert_eq!(kind, 0),
                None => panic!("missing has_powerup"),
            }
        }
    }

    #[test]
    fn test_powerup_rate_converges() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut total = 0usize;
        let mut with_powerup = 0usize;
        for _ in 0..400 {
            let level = generate_level(1, SCREEN_WIDTH, &mut rng);
            total += level.bricks.len();
            with_powerup += level.bricks.iter().filter(|b| b.has_powerup == Some(true)).count();
        }
        let rate = with_powerup as f64 / total as f64;
        assert!((rate - 0.3).abs() < 0.015, "rate {rate}");
    }

    #[test]
    fn test_same_seed_same_level() {
        let a = generate_level(6, SCREEN_WIDTH, &mut Pcg32::seed_from_u64(9));
        let b = generate_level(6, SCREEN_WIDTH, &mut Pcg32::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
