//! Target selection shared by every turret archetype.

use echo_defence_core::{EnemyId, TargetMode};
use glam::Vec2;

use crate::enemy::Enemy;

/// Cloaked enemies become visible to turrets within this distance.
pub const STEALTH_PROXIMITY: f32 = 70.0;
/// Penalty per squared world unit of distance, separating near-equal scores.
pub const TARGET_TIE_BREAK: f32 = 1e-6;

/// Parameters of a target search.
#[derive(Clone, Copy, Debug)]
pub struct TargetQuery<'a> {
    /// Search centre.
    pub origin: Vec2,
    /// Search radius.
    pub range: f32,
    /// Ranking policy.
    pub mode: TargetMode,
    /// Whether flying enemies qualify.
    pub hits_flying: bool,
    /// Enemies to skip.
    pub exclude: &'a [EnemyId],
}

impl<'a> TargetQuery<'a> {
    /// Query without exclusions.
    #[must_use]
    pub fn new(origin: Vec2, range: f32, mode: TargetMode, hits_flying: bool) -> Self {
        Self {
            origin,
            range,
            mode,
            hits_flying,
            exclude: &[],
        }
    }

    /// Returns the query with the given exclusions.
    #[must_use]
    pub fn excluding(self, exclude: &'a [EnemyId]) -> Self {
        Self { exclude, ..self }
    }

    /// Whether `enemy` is a legal target.
    #[must_use]
    pub fn admits(&self, enemy: &Enemy) -> bool {
        enemy.is_alive()
            && (self.hits_flying || !enemy.flying)
            && enemy.position.distance(self.origin) <= self.range
            && enemy.is_visible_from(self.origin, STEALTH_PROXIMITY)
            && !self.exclude.contains(&enemy.id)
    }
}

/// Ranking score of `enemy` under `mode`; higher is preferred.
#[must_use]
pub fn target_score(enemy: &Enemy, mode: TargetMode, origin: Vec2) -> f32 {
    let base = match mode {
        TargetMode::First => enemy.path_distance,
        TargetMode::Last => -enemy.path_distance,
        TargetMode::Strongest => enemy.hp,
        TargetMode::MostShield => enemy.shield,
        TargetMode::MostArmor => enemy.effective_armor() * 100.0,
    };
    base - TARGET_TIE_BREAK * enemy.position.distance_squared(origin)
}

/// Index of the best legal target, earliest registry order winning ties.
#[must_use]
pub fn acquire_target(enemies: &[Enemy], query: &TargetQuery<'_>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, enemy) in enemies.iter().enumerate() {
        if !query.admits(enemy) {
            continue;
        }
        let score = target_score(enemy, query.mode, query.origin);
        if best.map_or(true, |(_, current)| score > current) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

/// Index of the closest legal target.
#[must_use]
pub fn nearest_target(enemies: &[Enemy], query: &TargetQuery<'_>) -> Option<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| query.admits(enemy))
        .map(|(index, enemy)| (index, enemy.position.distance_squared(query.origin)))
        .fold(None, |best: Option<(usize, f32)>, (index, distance)| match best {
            Some((_, current)) if current <= distance => best,
            _ => Some((index, distance)),
        })
        .map(|(index, _)| index)
}

/// Index of the enemy with the given identifier.
#[must_use]
pub fn find_enemy(enemies: &[Enemy], id: EnemyId) -> Option<usize> {
    enemies.iter().position(|enemy| enemy.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_defence_core::{EnemyKind, WaveScalar};

    fn enemy(id: u32, kind: EnemyKind, position: Vec2, path_distance: f32) -> Enemy {
        let mut enemy = Enemy::new(EnemyId::new(id), kind, None, WaveScalar::IDENTITY, false);
        enemy.position = position;
        enemy.path_distance = path_distance;
        enemy
    }

    #[test]
    fn modes_rank_by_their_metric() {
        let enemies = vec![
            enemy(1, EnemyKind::Grunt, Vec2::new(10.0, 0.0), 300.0),
            enemy(2, EnemyKind::Armored, Vec2::new(20.0, 0.0), 100.0),
            enemy(3, EnemyKind::Shielded, Vec2::new(30.0, 0.0), 200.0),
        ];
        let pick = |mode| {
            acquire_target(&enemies, &TargetQuery::new(Vec2::ZERO, 200.0, mode, false))
                .map(|index| enemies[index].id.get())
        };
        assert_eq!(pick(TargetMode::First), Some(1));
        assert_eq!(pick(TargetMode::Last), Some(2));
        assert_eq!(pick(TargetMode::Strongest), Some(2));
        assert_eq!(pick(TargetMode::MostShield), Some(3));
        assert_eq!(pick(TargetMode::MostArmor), Some(2));
    }

    #[test]
    fn closer_enemy_wins_a_tie() {
        let enemies = vec![
            enemy(1, EnemyKind::Grunt, Vec2::new(90.0, 0.0), 50.0),
            enemy(2, EnemyKind::Grunt, Vec2::new(20.0, 0.0), 50.0),
        ];
        let query = TargetQuery::new(Vec2::ZERO, 100.0, TargetMode::Strongest, false);
        assert_eq!(acquire_target(&enemies, &query), Some(1));
    }

    #[test]
    fn flyers_need_anti_air() {
        let enemies = vec![enemy(1, EnemyKind::Flyer, Vec2::new(10.0, 0.0), 0.0)];
        let ground = TargetQuery::new(Vec2::ZERO, 100.0, TargetMode::First, false);
        assert_eq!(acquire_target(&enemies, &ground), None);
        let air = TargetQuery::new(Vec2::ZERO, 100.0, TargetMode::First, true);
        assert_eq!(acquire_target(&enemies, &air), Some(0));
    }

    #[test]
    fn cloaked_enemies_hide_until_close_or_revealed() {
        let mut enemies = vec![enemy(1, EnemyKind::Wraith, Vec2::new(120.0, 0.0), 0.0)];
        let query = TargetQuery::new(Vec2::ZERO, 200.0, TargetMode::First, true);
        assert_eq!(acquire_target(&enemies, &query), None);

        enemies[0].position = Vec2::new(STEALTH_PROXIMITY - 1.0, 0.0);
        assert_eq!(acquire_target(&enemies, &query), Some(0));

        enemies[0].position = Vec2::new(120.0, 0.0);
        enemies[0].reveal(1.0);
        assert_eq!(acquire_target(&enemies, &query), Some(0));
    }

    #[test]
    fn handled_and_excluded_enemies_are_skipped() {
        let mut enemies = vec![
            enemy(1, EnemyKind::Grunt, Vec2::new(10.0, 0.0), 10.0),
            enemy(2, EnemyKind::Grunt, Vec2::new(15.0, 0.0), 5.0),
        ];
        enemies[0].handled = true;
        let query = TargetQuery::new(Vec2::ZERO, 100.0, TargetMode::First, false);
        assert_eq!(acquire_target(&enemies, &query), Some(1));
        let excluded = [EnemyId::new(2)];
        assert_eq!(acquire_target(&enemies, &query.excluding(&excluded)), None);
        assert_eq!(nearest_target(&enemies, &query), Some(1));
    }
}
