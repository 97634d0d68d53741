//! Physics World Adapter
//!
//! Узкий фасад над физическим движком: overlap / ray queries.
//! Velocity и impulse — это rapier компоненты (`Velocity`, `ExternalImpulse`),
//! их пишут напрямую; интегрирует либо rapier, либо headless backend.
//!
//! # Architecture
//!
//! `PhysicsWorld` trait — то, что потребляет логика (movement, resolver, AI perception).
//! `SceneQueries` — единственная реализация (SystemParam), которая выбирает
//! backend по `PhysicsBackend`:
//! - `Rapier` → `RapierContext::intersections_with_shape` / `cast_ray`
//! - `Headless` → перебор `Footprint` AABB (детерминированный порядок по Entity)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, QueryFilter, ReadRapierContext};

use super::collision::{CollisionLayer, Footprint, LayerMask};

/// Какой backend интегрирует тела и отвечает на queries
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhysicsBackend {
    /// Footprint-геометрия + собственная интеграция (тесты, CLI по умолчанию)
    #[default]
    Headless,
    /// bevy_rapier2d (RapierPhysicsPlugin должен быть добавлен хостом)
    Rapier,
}

/// Ближайшее попадание луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec2,
}

/// Контракт scene queries, который потребляет боевая логика
pub trait PhysicsWorld {
    /// Все не-sensor тела слоёв `mask`, пересекающие круг
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask, exclude: Option<Entity>) -> Vec<Entity>;

    /// Все не-sensor тела слоёв `mask`, пересекающие AABB
    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: LayerMask, exclude: Option<Entity>) -> Vec<Entity>;

    /// Ближайшее тело слоёв `mask` вдоль луча (dir нормализуется)
    fn cast_ray(
        &self,
        origin: Vec2,
        dir: Vec2,
        max_distance: f32,
        mask: LayerMask,
        exclude: Option<Entity>,
    ) -> Option<RayHit>;

    /// Классификация тела (None — тело уже удалено или без footprint)
    fn layer_of(&self, entity: Entity) -> Option<CollisionLayer>;
}

/// SystemParam: scene queries поверх выбранного backend
#[derive(SystemParam)]
pub struct SceneQueries<'w, 's> {
    backend: Res<'w, PhysicsBackend>,
    rapier: ReadRapierContext<'w, 's>,
    footprints: Query<'w, 's, (Entity, &'static Transform, &'static Footprint)>,
}

fn rapier_filter(mask: LayerMask, exclude: Option<Entity>) -> QueryFilter<'static> {
    let mut filter = QueryFilter::new()
        .exclude_sensors()
        .groups(bevy_rapier2d::prelude::CollisionGroups::new(
            bevy_rapier2d::prelude::Group::ALL,
            mask.group(),
        ));
    if let Some(entity) = exclude {
        filter = filter.exclude_collider(entity);
    }
    filter
}

impl SceneQueries<'_, '_> {
    /// Footprints в детерминированном порядке (по Entity)
    fn sorted_footprints(&self, mask: LayerMask, exclude: Option<Entity>) -> Vec<(Entity, Vec2, Footprint)> {
        let mut bodies: Vec<_> = self
            .footprints
            .iter()
            .filter(|(entity, _, footprint)| {
                Some(*entity) != exclude && !footprint.sensor && mask.contains(footprint.layer)
            })
            .map(|(entity, transform, footprint)| (entity, transform.translation.truncate(), *footprint))
            .collect();
        bodies.sort_by_key(|(entity, _, _)| *entity);
        bodies
    }

    fn rapier_overlap(&self, shape: Collider, center: Vec2, mask: LayerMask, exclude: Option<Entity>) -> Vec<Entity> {
        let Ok(context) = self.rapier.single() else {
            crate::logger::log_warning("PhysicsWorld: rapier backend selected but no RapierContext");
            return Vec::new();
        };

        let mut hits = Vec::new();
        context.intersections_with_shape(center, 0.0, &shape, rapier_filter(mask, exclude), |entity| {
            hits.push(entity);
            true // продолжаем поиск: все цели, без single-target cap
        });
        hits.sort();
        hits
    }
}

impl PhysicsWorld for SceneQueries<'_, '_> {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask, exclude: Option<Entity>) -> Vec<Entity> {
        match *self.backend {
            PhysicsBackend::Rapier => self.rapier_overlap(Collider::ball(radius), center, mask, exclude),
            PhysicsBackend::Headless => self
                .sorted_footprints(mask, exclude)
                .into_iter()
                .filter(|(_, body_center, footprint)| footprint.overlaps_circle(*body_center, center, radius))
                .map(|(entity, _, _)| entity)
                .collect(),
        }
    }

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: LayerMask, exclude: Option<Entity>) -> Vec<Entity> {
        match *self.backend {
            PhysicsBackend::Rapier => self.rapier_overlap(
                Collider::cuboid(half_extents.x, half_extents.y),
                center,
                mask,
                exclude,
            ),
            PhysicsBackend::Headless => self
                .sorted_footprints(mask, exclude)
                .into_iter()
                .filter(|(_, body_center, footprint)| footprint.overlaps_box(*body_center, center, half_extents))
                .map(|(entity, _, _)| entity)
                .collect(),
        }
    }

    fn cast_ray(
        &self,
        origin: Vec2,
        dir: Vec2,
        max_distance: f32,
        mask: LayerMask,
        exclude: Option<Entity>,
    ) -> Option<RayHit> {
        let dir = dir.try_normalize()?;

        match *self.backend {
            PhysicsBackend::Rapier => {
                let context = self.rapier.single().ok()?;
                context
                    .cast_ray(origin, dir, max_distance, true, rapier_filter(mask, exclude))
                    .map(|(entity, distance)| RayHit {
                        entity,
                        distance,
                        point: origin + dir * distance,
                    })
            }
            PhysicsBackend::Headless => self
                .sorted_footprints(mask, exclude)
                .into_iter()
                .filter_map(|(entity, body_center, footprint)| {
                    footprint
                        .ray_distance(body_center, origin, dir, max_distance)
                        .map(|distance| (entity, distance))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(entity, distance)| RayHit {
                    entity,
                    distance,
                    point: origin + dir * distance,
                }),
        }
    }

    fn layer_of(&self, entity: Entity) -> Option<CollisionLayer> {
        self.footprints.get(entity).ok().map(|(_, _, footprint)| footprint.layer)
    }
}

/// Ground check: overlap у ног, fallback — короткий луч вниз
///
/// Луч используется только если overlap промахнулся и тело не летит вверх
/// (иначе прыжок "прилипал" бы к платформе сразу после отрыва).
pub fn probe_ground(
    world: &impl PhysicsWorld,
    body: Entity,
    foot: Vec2,
    radius: f32,
    ray_length: f32,
    vertical_velocity: f32,
) -> bool {
    if !world.overlap_circle(foot, radius, LayerMask::GROUND, Some(body)).is_empty() {
        return true;
    }
    vertical_velocity <= 0.0
        && world
            .cast_ray(foot, Vec2::NEG_Y, ray_length, LayerMask::GROUND, Some(body))
            .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory мир для тестов логики поверх `PhysicsWorld`
    #[derive(Default)]
    struct FakeWorld {
        bodies: HashMap<Entity, (Vec2, Footprint)>,
    }

    impl FakeWorld {
        fn sorted(&self, mask: LayerMask, exclude: Option<Entity>) -> Vec<(Entity, Vec2, Footprint)> {
            let mut bodies: Vec<_> = self
                .bodies
                .iter()
                .filter(|(entity, (_, fp))| Some(**entity) != exclude && mask.contains(fp.layer))
                .map(|(entity, (center, fp))| (*entity, *center, *fp))
                .collect();
            bodies.sort_by_key(|(entity, _, _)| *entity);
            bodies
        }
    }

    impl PhysicsWorld for FakeWorld {
        fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask, exclude: Option<Entity>) -> Vec<Entity> {
            self.sorted(mask, exclude)
                .into_iter()
                .filter(|(_, c, fp)| fp.overlaps_circle(*c, center, radius))
                .map(|(e, _, _)| e)
                .collect()
        }

        fn overlap_box(&self, center: Vec2, half: Vec2, mask: LayerMask, exclude: Option<Entity>) -> Vec<Entity> {
            self.sorted(mask, exclude)
                .into_iter()
                .filter(|(_, c, fp)| fp.overlaps_box(*c, center, half))
                .map(|(e, _, _)| e)
                .collect()
        }

        fn cast_ray(&self, origin: Vec2, dir: Vec2, max: f32, mask: LayerMask, exclude: Option<Entity>) -> Option<RayHit> {
            self.sorted(mask, exclude)
                .into_iter()
                .filter_map(|(e, c, fp)| fp.ray_distance(c, origin, dir, max).map(|d| (e, d)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(entity, distance)| RayHit { entity, distance, point: origin + dir * distance })
        }

        fn layer_of(&self, entity: Entity) -> Option<CollisionLayer> {
            self.bodies.get(&entity).map(|(_, fp)| fp.layer)
        }
    }

    fn world_with_floor() -> FakeWorld {
        let mut world = FakeWorld::default();
        world.bodies.insert(
            Entity::from_raw(1),
            (Vec2::new(0.0, -0.5), Footprint::solid(CollisionLayer::Ground, Vec2::new(10.0, 0.5))),
        );
        world
    }

    #[test]
    fn test_probe_ground_overlap() {
        let world = world_with_floor();
        let body = Entity::from_raw(2);
        assert!(probe_ground(&world, body, Vec2::new(0.0, 0.1), 0.2, 0.35, 0.0));
        assert!(!probe_ground(&world, body, Vec2::new(0.0, 1.0), 0.2, 0.35, 0.0));
    }

    #[test]
    fn test_probe_ground_ray_fallback_only_when_not_rising() {
        let world = world_with_floor();
        let body = Entity::from_raw(2);
        // overlap промахивается (0.3 > radius), луч 0.35 достаёт
        assert!(probe_ground(&world, body, Vec2::new(0.0, 0.3), 0.2, 0.35, -1.0));
        assert!(!probe_ground(&world, body, Vec2::new(0.0, 0.3), 0.2, 0.35, 2.0));
    }
}
