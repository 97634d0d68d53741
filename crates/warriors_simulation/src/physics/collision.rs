//! Collision classification (layers / masks) + headless footprint geometry
//!
//! Каждое тело в симуляции классифицировано одним `CollisionLayer`.
//! Scene queries фильтруются `LayerMask`. Для rapier это `CollisionGroups`,
//! для headless backend — прямое сравнение `Footprint::layer`.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionGroups, Group};

/// Классификация коллайдера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum CollisionLayer {
    /// Террейн, стены, платформы, барьеры
    Ground,
    Player,
    Enemy,
    Projectile,
    /// Труп: маленький, не блокирует проход, не получает урон
    Corpse,
    /// Trigger-only зона (никогда не детонирует снаряды)
    Trigger,
    Pickup,
}

impl CollisionLayer {
    pub const fn bits(self) -> u32 {
        match self {
            CollisionLayer::Ground => 1 << 0,
            CollisionLayer::Player => 1 << 1,
            CollisionLayer::Enemy => 1 << 2,
            CollisionLayer::Projectile => 1 << 3,
            CollisionLayer::Corpse => 1 << 4,
            CollisionLayer::Trigger => 1 << 5,
            CollisionLayer::Pickup => 1 << 6,
        }
    }

    pub fn group(self) -> Group {
        Group::from_bits_truncate(self.bits())
    }

    /// С какими слоями тело этого слоя физически взаимодействует
    pub fn interacts_with(self) -> LayerMask {
        match self {
            CollisionLayer::Ground => LayerMask::ALL,
            CollisionLayer::Player | CollisionLayer::Enemy => {
                LayerMask::GROUND | LayerMask::ACTORS | LayerMask::PROJECTILE
            }
            CollisionLayer::Projectile => LayerMask::GROUND | LayerMask::ACTORS,
            CollisionLayer::Corpse => LayerMask::GROUND,
            CollisionLayer::Trigger | CollisionLayer::Pickup => LayerMask::from(CollisionLayer::Player),
        }
    }

    /// Rapier groups для коллайдера этого слоя
    pub fn collision_groups(self) -> CollisionGroups {
        CollisionGroups::new(self.group(), self.interacts_with().group())
    }
}

/// Набор слоёв (фильтр scene query)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const GROUND: LayerMask = LayerMask(CollisionLayer::Ground.bits());
    pub const ACTORS: LayerMask =
        LayerMask(CollisionLayer::Player.bits() | CollisionLayer::Enemy.bits());
    pub const PROJECTILE: LayerMask = LayerMask(CollisionLayer::Projectile.bits());

    pub fn contains(self, layer: CollisionLayer) -> bool {
        self.0 & layer.bits() != 0
    }

    pub fn group(self) -> Group {
        Group::from_bits_truncate(self.0)
    }
}

impl From<CollisionLayer> for LayerMask {
    fn from(layer: CollisionLayer) -> Self {
        LayerMask(layer.bits())
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        LayerMask(self.0 | rhs.0)
    }
}

/// Axis-aligned footprint тела (headless геометрия + классификация)
///
/// Есть у каждого тела независимо от backend: по нему определяется слой
/// при обработке попаданий, и на нём работают headless queries.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Footprint {
    pub half_extents: Vec2,
    pub layer: CollisionLayer,
    /// Sensor не блокирует движение (триггеры, пикапы, снаряды)
    pub sensor: bool,
}

impl Footprint {
    pub fn solid(layer: CollisionLayer, half_extents: Vec2) -> Self {
        Self {
            half_extents,
            layer,
            sensor: false,
        }
    }

    pub fn sensor(layer: CollisionLayer, half_extents: Vec2) -> Self {
        Self {
            half_extents,
            layer,
            sensor: true,
        }
    }

    pub fn aabb(&self, center: Vec2) -> Rect {
        Rect::from_center_half_size(center, self.half_extents)
    }

    pub fn overlaps_circle(&self, center: Vec2, circle: Vec2, radius: f32) -> bool {
        let rect = self.aabb(center);
        let closest = circle.clamp(rect.min, rect.max);
        closest.distance_squared(circle) <= radius * radius
    }

    pub fn overlaps_box(&self, center: Vec2, other_center: Vec2, other_half: Vec2) -> bool {
        let delta = (center - other_center).abs();
        delta.x <= self.half_extents.x + other_half.x && delta.y <= self.half_extents.y + other_half.y
    }

    /// Slab test: расстояние вдоль луча до входа в AABB (None = мимо)
    pub fn ray_distance(&self, center: Vec2, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<f32> {
        let rect = self.aabb(center);
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for axis in 0..2 {
            let (o, d, lo, hi) = (origin[axis], dir[axis], rect.min[axis], rect.max[axis]);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t1, mut t2) = ((lo - o) * inv, (hi - o) * inv);
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks() {
        assert!(LayerMask::ACTORS.contains(CollisionLayer::Enemy));
        assert!(!LayerMask::ACTORS.contains(CollisionLayer::Corpse));
        assert!((LayerMask::GROUND | LayerMask::from(CollisionLayer::Pickup)).contains(CollisionLayer::Pickup));
        assert!(!CollisionLayer::Corpse.interacts_with().contains(CollisionLayer::Player));
    }

    #[test]
    fn test_circle_overlap() {
        let ground = Footprint::solid(CollisionLayer::Ground, Vec2::new(5.0, 0.5));
        assert!(ground.overlaps_circle(Vec2::ZERO, Vec2::new(0.0, 0.6), 0.2));
        assert!(!ground.overlaps_circle(Vec2::ZERO, Vec2::new(0.0, 0.8), 0.2));
        assert!(ground.overlaps_circle(Vec2::ZERO, Vec2::new(5.1, 0.0), 0.2));
    }

    #[test]
    fn test_ray_distance() {
        let wall = Footprint::solid(CollisionLayer::Ground, Vec2::new(0.5, 2.0));
        let hit = wall.ray_distance(Vec2::new(3.0, 0.0), Vec2::ZERO, Vec2::X, 10.0);
        assert_eq!(hit, Some(2.5));
        assert_eq!(wall.ray_distance(Vec2::new(3.0, 0.0), Vec2::ZERO, Vec2::X, 2.0), None);
        assert_eq!(wall.ray_distance(Vec2::new(3.0, 0.0), Vec2::ZERO, -Vec2::X, 10.0), None);
    }
}
