//! Uniform spatial grid for collision and proximity queries
//!
//! The arena is partitioned into square cells; every query scans the 3x3
//! neighborhood around a point, with neighbor indices wrapped so cells on
//! opposite edges of the torus are adjacent. The grid is rebuilt from
//! scratch at the start of every step, so queries during a step see the
//! pre-movement picture of the world.

use smallvec::SmallVec;

use crate::game::constants::snake;
use crate::game::state::{Agent, AgentId, Food, FoodId};
use crate::util::torus;
use crate::util::vec2::Vec2;

/// What a body entry in a cell refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRef {
    /// An agent's head
    Head { agent: AgentId },
    /// One segment of an agent's body
    Segment { owner: AgentId, index: usize },
}

impl BodyRef {
    /// The agent this entry belongs to
    pub fn owner(self) -> AgentId {
        match self {
            BodyRef::Head { agent } => agent,
            BodyRef::Segment { owner, .. } => owner,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BodyEntry {
    body: BodyRef,
    position: Vec2,
    radius: f32,
}

#[derive(Debug, Clone, Copy)]
struct FoodEntry {
    id: FoodId,
    position: Vec2,
    radius: f32,
    value: f32,
}

#[derive(Debug, Default)]
struct Cell {
    bodies: Vec<BodyEntry>,
    foods: Vec<FoodEntry>,
}

/// Result of a head collision scan
#[derive(Debug, Default)]
pub struct Collisions {
    /// Every food pellet overlapping the head this step
    pub foods: SmallVec<[FoodId; 4]>,
    /// The rival whose body the head ran into, if any. When several
    /// overlap in the same scan, the last one examined wins.
    pub agent: Option<AgentId>,
}

/// A nearby food pellet, as seen from a query point
#[derive(Debug, Clone, Copy)]
pub struct NearbyFood {
    pub id: FoodId,
    pub position: Vec2,
    pub value: f32,
    pub distance: f32,
}

/// A nearby rival agent, as seen from a query point
#[derive(Debug, Clone, Copy)]
pub struct NearbyAgent {
    pub id: AgentId,
    pub position: Vec2,
    pub length: f32,
    pub distance: f32,
}

/// Flat uniform grid over the toroidal arena
#[derive(Debug)]
pub struct SpatialGrid {
    map_size: f32,
    cell_size: f32,
    grid_dim: usize,
    cells: Vec<Cell>,
}

impl SpatialGrid {
    pub fn new(map_size: f32, cell_size: f32) -> Self {
        let grid_dim = (map_size / cell_size).ceil() as usize;
        let mut cells = Vec::with_capacity(grid_dim * grid_dim);
        cells.resize_with(grid_dim * grid_dim, Cell::default);
        Self {
            map_size,
            cell_size,
            grid_dim,
            cells,
        }
    }

    fn cell_index(&self, position: Vec2) -> usize {
        let p = torus::wrap_point(position, self.map_size);
        let i = ((p.x / self.cell_size) as usize).min(self.grid_dim - 1);
        let j = ((p.y / self.cell_size) as usize).min(self.grid_dim - 1);
        j * self.grid_dim + i
    }

    fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.bodies.clear();
            cell.foods.clear();
        }
    }

    /// Rebuild the index from the current world: every live agent's head
    /// and all of its segments, plus every food pellet
    pub fn rebuild<'a>(
        &mut self,
        agents: impl Iterator<Item = &'a Agent>,
        foods: &[Food],
    ) {
        self.clear();

        for agent in agents {
            let head = BodyEntry {
                body: BodyRef::Head { agent: agent.id },
                position: agent.position,
                radius: agent.head_radius(),
            };
            let idx = self.cell_index(head.position);
            self.cells[idx].bodies.push(head);

            for (i, seg) in agent.segments.iter().enumerate() {
                let entry = BodyEntry {
                    body: BodyRef::Segment {
                        owner: agent.id,
                        index: i,
                    },
                    position: seg.position,
                    radius: seg.width / 2.0,
                };
                let idx = self.cell_index(entry.position);
                self.cells[idx].bodies.push(entry);
            }
        }

        for food in foods {
            let idx = self.cell_index(food.position);
            self.cells[idx].foods.push(FoodEntry {
                id: food.id,
                position: food.position,
                radius: food.radius(),
                value: food.value,
            });
        }
    }

    /// Visit the 3x3 wrapped neighborhood of cells around a point
    fn for_each_neighbor_cell(&self, position: Vec2, mut visit: impl FnMut(&Cell)) {
        let p = torus::wrap_point(position, self.map_size);
        let ci = ((p.x / self.cell_size) as usize).min(self.grid_dim - 1);
        let cj = ((p.y / self.cell_size) as usize).min(self.grid_dim - 1);
        let dim = self.grid_dim as isize;

        for dj in -1..=1isize {
            for di in -1..=1isize {
                let i = (ci as isize + di).rem_euclid(dim) as usize;
                let j = (cj as isize + dj).rem_euclid(dim) as usize;
                visit(&self.cells[j * self.grid_dim + i]);
            }
        }
    }

    /// Scan for everything the given agent's head is touching this step.
    ///
    /// Food overlaps are all reported. For body overlaps, the agent's own
    /// segments near its head are exempt so it can curl without dying;
    /// hits against rival heads and bodies use a forgiveness factor on
    /// the summed radii.
    pub fn check_collisions(&self, agent: &Agent) -> Collisions {
        let mut result = Collisions::default();
        let head = agent.position;
        let head_radius = agent.head_radius();

        self.for_each_neighbor_cell(head, |cell| {
            for food in &cell.foods {
                let d = torus::distance(head, food.position, self.map_size);
                if d < head_radius + food.radius {
                    result.foods.push(food.id);
                }
            }

            for body in &cell.bodies {
                match body.body {
                    BodyRef::Head { agent: other } if other == agent.id => continue,
                    BodyRef::Segment { owner, index }
                        if owner == agent.id
                            && index < snake::SELF_COLLISION_EXEMPT_SEGMENTS =>
                    {
                        continue
                    }
                    _ => {}
                }
                let d = torus::distance(head, body.position, self.map_size);
                if d < (head_radius + body.radius) * snake::COLLISION_FORGIVENESS {
                    result.agent = Some(body.body.owner());
                }
            }
        });

        result
    }

    /// Food pellets within `radius` of a point, nearest first
    pub fn find_nearby_food(&self, position: Vec2, radius: f32) -> Vec<NearbyFood> {
        let mut found = Vec::new();
        self.for_each_neighbor_cell(position, |cell| {
            for entry in &cell.foods {
                let d = torus::distance(position, entry.position, self.map_size);
                if d <= radius {
                    found.push(NearbyFood {
                        id: entry.id,
                        position: entry.position,
                        value: entry.value,
                        distance: d,
                    });
                }
            }
        });
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found
    }

    /// Rival agents whose head is within `radius` of a point, nearest
    /// first. The querying agent itself is excluded.
    pub fn find_nearby_agents<'a>(
        &self,
        position: Vec2,
        radius: f32,
        exclude: AgentId,
        lookup: impl Fn(AgentId) -> Option<&'a Agent>,
    ) -> Vec<NearbyAgent> {
        let mut found = Vec::new();
        self.for_each_neighbor_cell(position, |cell| {
            for entry in &cell.bodies {
                let BodyRef::Head { agent: id } = entry.body else {
                    continue;
                };
                if id == exclude {
                    continue;
                }
                let d = torus::distance(position, entry.position, self.map_size);
                if d <= radius {
                    if let Some(agent) = lookup(id) {
                        found.push(NearbyAgent {
                            id,
                            position: entry.position,
                            length: agent.length,
                            distance: d,
                        });
                    }
                }
            }
        });
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::map;
    use crate::game::state::{Archetype, WorldState};

    const MAP: f32 = 5000.0;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(MAP, MAP / map::GRID_CELL_DIVISOR)
    }

    fn world_with_npc(pos: Vec2, length: f32) -> (WorldState, AgentId) {
        let mut world = WorldState::new(MAP);
        let id = world.alloc_agent_id();
        world.add_npc(Agent::npc(
            id,
            "Rival".to_string(),
            pos,
            Archetype::Normal,
            0.0,
            length,
            MAP,
        ));
        (world, id)
    }

    #[test]
    fn test_all_overlapping_food_reported() {
        let mut world = WorldState::new(MAP);
        let head = world.player().position;
        world.add_food(head + Vec2::new(3.0, 0.0), 10.0, 1.0, 0);
        world.add_food(head + Vec2::new(-3.0, 2.0), 10.0, 1.0, 1);
        world.add_food(head + Vec2::new(500.0, 0.0), 10.0, 1.0, 2);

        let mut g = grid();
        g.rebuild(world.live_agents(), &world.foods);
        let hits = g.check_collisions(world.player());
        assert_eq!(hits.foods.len(), 2);
    }

    #[test]
    fn test_food_detected_across_seam() {
        let mut world = WorldState::new(MAP);
        world.player_mut().position = Vec2::new(1.0, 2500.0);
        world.player_mut().init_segments(MAP);
        world.add_food(Vec2::new(MAP - 2.0, 2500.0), 10.0, 1.0, 0);

        let mut g = grid();
        g.rebuild(world.live_agents(), &world.foods);
        let hits = g.check_collisions(world.player());
        assert_eq!(hits.foods.len(), 1);
    }

    #[test]
    fn test_forgiveness_factor_gates_body_hits() {
        // Player head vs rival segment: radii 10 + 10, threshold 0.8 * 20 = 16
        let head = Vec2::new(2500.0, 2500.0);
        let (mut world, rival) = world_with_npc(Vec2::new(3000.0, 3000.0), 10.0);
        world.player_mut().position = head;
        world.player_mut().init_segments(MAP);

        // Rival segment 0 has radius 10; place it just outside, then just
        // inside the threshold. Exemption only covers an agent's own body.
        for (offset, expect_hit) in [(17.0, false), (15.0, true)] {
            let seg_pos = head + Vec2::new(offset, 0.0);
            world.get_agent_mut(rival).unwrap().segments[0].position = seg_pos;
            let mut g = grid();
            g.rebuild(world.live_agents(), &world.foods);
            let hits = g.check_collisions(world.player());
            assert_eq!(hits.agent.is_some(), expect_hit, "offset {offset}");
            if expect_hit {
                assert_eq!(hits.agent, Some(rival));
            }
        }
    }

    #[test]
    fn test_head_on_head_collision() {
        // Two heads of radius 10, 14 apart: inside the 16-unit threshold
        let head = Vec2::new(2500.0, 2500.0);
        let (mut world, rival) = world_with_npc(Vec2::new(2514.0, 2500.0), 10.0);
        world.player_mut().position = head;
        world.player_mut().init_segments(MAP);

        let mut g = grid();
        g.rebuild(world.live_agents(), &world.foods);
        let hits = g.check_collisions(world.player());
        assert_eq!(hits.agent, Some(rival));
    }

    #[test]
    fn test_segment_hit_resolves_to_owner() {
        let (mut world, rival) = world_with_npc(Vec2::new(2600.0, 2500.0), 10.0);
        // Move a far rival segment onto the player's head
        let head = world.player().position;
        world.get_agent_mut(rival).unwrap().segments[5].position = head;

        let mut g = grid();
        g.rebuild(world.live_agents(), &world.foods);
        let hits = g.check_collisions(world.player());
        assert_eq!(hits.agent, Some(rival));
    }

    #[test]
    fn test_own_near_segments_exempt() {
        let mut world = WorldState::new(MAP);
        // All 10 initial segments are within the exemption window
        let mut g = grid();
        g.rebuild(world.live_agents(), &world.foods);
        let hits = g.check_collisions(world.player());
        assert_eq!(hits.agent, None);

        // A distant own segment dragged onto the head does collide
        world.player_mut().length = 30.0;
        world.player_mut().init_segments(MAP);
        let head = world.player().position;
        world.player_mut().segments[25].position = head;
        g.rebuild(world.live_agents(), &world.foods);
        let hits = g.check_collisions(world.player());
        assert_eq!(hits.agent, Some(world.player_id));
    }

    #[test]
    fn test_nearby_food_sorted_by_distance() {
        let mut world = WorldState::new(MAP);
        let p = Vec2::new(2500.0, 2500.0);
        world.add_food(p + Vec2::new(90.0, 0.0), 10.0, 1.0, 0);
        world.add_food(p + Vec2::new(10.0, 0.0), 10.0, 2.0, 1);
        world.add_food(p + Vec2::new(40.0, 0.0), 10.0, 1.0, 2);

        let mut g = grid();
        g.rebuild(world.live_agents(), &world.foods);
        let near = g.find_nearby_food(p, 300.0);
        assert_eq!(near.len(), 3);
        assert!(near[0].distance <= near[1].distance);
        assert!(near[1].distance <= near[2].distance);
        assert_eq!(near[0].value, 2.0);
    }

    #[test]
    fn test_nearby_agents_excludes_self_and_sorts() {
        let p = Vec2::new(2500.0, 2500.0);
        let (mut world, a) = world_with_npc(p + Vec2::new(200.0, 0.0), 15.0);
        let b = world.alloc_agent_id();
        world.add_npc(Agent::npc(
            b,
            "Closer".to_string(),
            p + Vec2::new(80.0, 0.0),
            Archetype::Aggressive,
            0.0,
            25.0,
            MAP,
        ));
        world.player_mut().position = p;
        world.player_mut().init_segments(MAP);

        let mut g = grid();
        g.rebuild(world.live_agents(), &world.foods);
        let near = g.find_nearby_agents(p, 400.0, world.player_id, |id| world.get_agent(id));
        assert_eq!(near.len(), 2);
        assert_eq!(near[0].id, b);
        assert_eq!(near[1].id, a);
        assert_eq!(near[0].length, 25.0);
    }

    #[test]
    fn test_rebuild_drops_stale_entries() {
        let mut world = WorldState::new(MAP);
        let head = world.player().position;
        let id = world.add_food(head, 10.0, 1.0, 0);

        let mut g = grid();
        g.rebuild(world.live_agents(), &world.foods);
        assert_eq!(g.check_collisions(world.player()).foods.len(), 1);

        world.remove_food(id);
        g.rebuild(world.live_agents(), &world.foods);
        assert!(g.check_collisions(world.player()).foods.is_empty());
    }
}
