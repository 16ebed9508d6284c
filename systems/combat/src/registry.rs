//! Ownership of every live combat entity.

use echo_defence_core::{
    CellCoord, EnemyId, EnemyKind, PathGraph, SpawnEvent, TurretId, TurretKind, WaveScalar,
};

use crate::{enemy::Enemy, projectile::Projectile, turret::Turret, zone::Zone};

/// Spacing along the path between swarmlings released together.
pub const CHILD_SPACING: f32 = 6.0;

/// Live enemies, turrets, projectiles, and zones, plus identifier allocation.
///
/// Enemies whose death or leak has been handled stay in the registry until
/// the next [`EntityRegistry::sweep`].
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) turrets: Vec<Turret>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) traps: Vec<Zone>,
    pub(crate) lingering: Vec<Zone>,
    next_enemy: u32,
    next_turret: u32,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Mutable access to an enemy.
    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    /// Turrets in construction order.
    #[must_use]
    pub fn turrets(&self) -> &[Turret] {
        &self.turrets
    }

    /// Looks up a turret.
    #[must_use]
    pub fn turret(&self, id: TurretId) -> Option<&Turret> {
        self.turrets.iter().find(|turret| turret.id == id)
    }

    /// Mutable access to a turret.
    pub fn turret_mut(&mut self, id: TurretId) -> Option<&mut Turret> {
        self.turrets.iter_mut().find(|turret| turret.id == id)
    }

    /// Turret standing on `cell`.
    #[must_use]
    pub fn turret_at(&self, cell: CellCoord) -> Option<&Turret> {
        self.turrets.iter().find(|turret| turret.cell == cell)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Deployed trap zones.
    #[must_use]
    pub fn traps(&self) -> &[Zone] {
        &self.traps
    }

    /// Lingering fire zones.
    #[must_use]
    pub fn lingering(&self) -> &[Zone] {
        &self.lingering
    }

    /// Enemies that still count towards clearing the wave.
    #[must_use]
    pub fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|enemy| !enemy.handled).count()
    }

    fn allocate_enemy(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy);
        self.next_enemy = self.next_enemy.wrapping_add(1);
        id
    }

    /// Spawns a scheduled enemy at the start of the path.
    pub fn spawn(&mut self, event: &SpawnEvent, path: &PathGraph) -> EnemyId {
        self.spawn_at(event, path, 0.0)
    }

    /// Spawns an enemy `distance` along the path.
    pub fn spawn_at(&mut self, event: &SpawnEvent, path: &PathGraph, distance: f32) -> EnemyId {
        let id = self.allocate_enemy();
        self.enemies.push(Enemy::spawn(id, event, path, distance));
        id
    }

    /// Spawns `count` swarmlings trailing back from `distance`.
    pub fn spawn_children(
        &mut self,
        scalar: WaveScalar,
        distance: f32,
        count: u32,
        path: &PathGraph,
    ) -> Vec<EnemyId> {
        let event = SpawnEvent {
            time: 0.0,
            kind: EnemyKind::Swarmling,
            scalar,
            elite: None,
            is_miniboss: false,
        };
        (0..count)
            .map(|index| {
                let offset = index as f32 * CHILD_SPACING;
                self.spawn_at(&event, path, (distance - offset).max(0.0))
            })
            .collect()
    }

    /// Inserts a restored enemy, keeping identifier allocation ahead of it.
    pub fn insert_enemy(&mut self, enemy: Enemy) {
        self.next_enemy = self.next_enemy.max(enemy.id.get().wrapping_add(1));
        self.enemies.push(enemy);
    }

    /// Builds a turret and returns its identifier.
    pub fn add_turret(
        &mut self,
        kind: TurretKind,
        cell: CellCoord,
        cell_size: f32,
        boosted: bool,
    ) -> TurretId {
        let id = TurretId::new(self.next_turret);
        self.next_turret = self.next_turret.wrapping_add(1);
        self.turrets.push(Turret::new(id, kind, cell, cell_size, boosted));
        id
    }

    /// Inserts a restored turret, keeping identifier allocation ahead of it.
    pub fn insert_turret(&mut self, turret: Turret) {
        self.next_turret = self.next_turret.max(turret.id.get().wrapping_add(1));
        self.turrets.push(turret);
    }

    /// Removes a turret, its projectiles, and its zones.
    pub fn remove_turret(&mut self, id: TurretId) -> Option<Turret> {
        let index = self.turrets.iter().position(|turret| turret.id == id)?;
        self.projectiles.retain(|projectile| projectile.owner != id);
        self.traps.retain(|zone| zone.owner != id);
        self.lingering.retain(|zone| zone.owner != id);
        Some(self.turrets.remove(index))
    }

    /// Inserts a restored trap zone.
    pub fn insert_trap(&mut self, zone: Zone) {
        self.traps.push(zone);
    }

    /// Inserts a restored lingering fire zone.
    pub fn insert_lingering(&mut self, zone: Zone) {
        self.lingering.push(zone);
    }

    /// Drops enemies handled during a previous tick.
    pub fn sweep(&mut self) {
        self.enemies.retain(|enemy| !enemy.handled);
    }

    /// Removes every enemy, projectile, and zone, keeping turrets.
    pub fn clear_field(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
        self.traps.clear();
        self.lingering.clear();
    }

    /// Removes everything and resets identifier allocation.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn path() -> PathGraph {
        PathGraph::new(vec![Vec2::ZERO, Vec2::new(500.0, 0.0)])
    }

    fn grunt() -> SpawnEvent {
        SpawnEvent {
            time: 0.0,
            kind: EnemyKind::Grunt,
            scalar: WaveScalar::IDENTITY,
            elite: None,
            is_miniboss: false,
        }
    }

    #[test]
    fn identifiers_are_unique_and_restores_stay_ahead() {
        let mut registry = EntityRegistry::new();
        let first = registry.spawn(&grunt(), &path());
        let second = registry.spawn(&grunt(), &path());
        assert_ne!(first, second);

        let restored = Enemy::new(
            EnemyId::new(40),
            EnemyKind::Grunt,
            None,
            WaveScalar::IDENTITY,
            false,
        );
        registry.insert_enemy(restored);
        assert_eq!(registry.spawn(&grunt(), &path()), EnemyId::new(41));
    }

    #[test]
    fn handled_enemies_linger_until_swept() {
        let mut registry = EntityRegistry::new();
        let id = registry.spawn(&grunt(), &path());
        registry.enemy_mut(id).expect("enemy exists").handled = true;
        assert_eq!(registry.enemies().len(), 1);
        assert_eq!(registry.living_enemies(), 0);
        registry.sweep();
        assert!(registry.enemies().is_empty());
    }

    #[test]
    fn children_trail_behind_the_parent() {
        let mut registry = EntityRegistry::new();
        let ids = registry.spawn_children(WaveScalar::IDENTITY, 100.0, 3, &path());
        assert_eq!(ids.len(), 3);
        let distances: Vec<f32> = registry
            .enemies()
            .iter()
            .map(|enemy| enemy.path_distance)
            .collect();
        assert_eq!(distances, vec![100.0, 94.0, 88.0]);
    }

    #[test]
    fn removing_a_turret_frees_its_cell() {
        let mut registry = EntityRegistry::new();
        let cell = CellCoord::new(3, 3);
        let id = registry.add_turret(TurretKind::Bolt, cell, 40.0, false);
        assert!(registry.turret_at(cell).is_some());
        assert!(registry.remove_turret(id).is_some());
        assert!(registry.turret_at(cell).is_none());
        assert!(registry.remove_turret(id).is_none());
    }
}
