//! Router facade with a per-group routing table cache.
//!
//! Each routing group owns a slot publishing an immutable `Arc<RoutingTable>`.
//! Readers clone the `Arc`; rebuilds swap it. A per-slot build lock makes
//! concurrent callers on an uncomputed group share a single build.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, trace, warn};

use crate::config::{CachePolicy, RouterConfig};
use crate::cost::CostPipeline;
use crate::error::{ConfigError, Result, RoutingError};
use crate::graph::GraphBuilder;
use crate::model::{RoutingGroup, Vehicle};
use crate::route::{NoRouteFound, NoRouteReason, Routability, Route, RouteOutcome};
use crate::table::{RoutingTable, ShortestPath};
use crate::traits::{GroupMapper, PlantTopology};

/// Counters describing cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Successful table builds.
    pub table_builds: u64,
    /// Failed table builds.
    pub build_failures: u64,
    /// Groups currently holding a cache slot.
    pub cached_groups: usize,
}

#[derive(Default)]
struct Published {
    table: Option<Arc<RoutingTable>>,
    built_at: Option<Instant>,
    /// Generation of the last completed build attempt.
    attempted: Option<u64>,
    /// Error of the last attempt, if it failed.
    failure: Option<RoutingError>,
}

#[derive(Default)]
struct GroupSlot {
    generation: AtomicU64,
    published: RwLock<Published>,
    build_lock: Mutex<()>,
    last_access: AtomicU64,
}

impl GroupSlot {
    /// The table if it is valid for the current generation.
    fn current(&self, ttl: Option<Duration>) -> Option<Arc<RoutingTable>> {
        let generation = self.generation.load(Ordering::Acquire);
        let published = self.published.read();
        if published.attempted != Some(generation) || published.failure.is_some() {
            return None;
        }
        if let (Some(ttl), Some(built_at)) = (ttl, published.built_at) {
            if built_at.elapsed() >= ttl {
                return None;
            }
        }
        published.table.clone()
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Computes and caches routes for routing groups.
pub struct Router<P: PlantTopology> {
    plant: Arc<P>,
    pipeline: CostPipeline,
    algorithm: Box<dyn ShortestPath>,
    policy: CachePolicy,
    eager_groups: Vec<RoutingGroup>,
    slots: RwLock<HashMap<RoutingGroup, Arc<GroupSlot>>>,
    clock: AtomicU64,
    builds: AtomicU64,
    failures: AtomicU64,
}

impl<P: PlantTopology> Router<P> {
    /// Creates a router from configuration and builds any eager groups.
    pub fn new(plant: Arc<P>, config: RouterConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let mut router = Self::with_parts(
            plant,
            CostPipeline::from_config(&config.evaluators),
            config.algorithm.strategy(),
            config.cache,
        );
        router.eager_groups = config.eager_groups.into_iter().map(RoutingGroup::new).collect();

        info!(
            algorithm = router.algorithm.name(),
            evaluators = ?router.pipeline.evaluator_names(),
            "router configured"
        );
        router.build_eager_groups();
        Ok(router)
    }

    /// Creates a router from explicit parts, e.g. custom evaluators.
    pub fn with_parts(
        plant: Arc<P>,
        pipeline: CostPipeline,
        algorithm: Box<dyn ShortestPath>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            plant,
            pipeline,
            algorithm,
            policy,
            eager_groups: Vec::new(),
            slots: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn plant(&self) -> &P {
        &self.plant
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Computes the cheapest route from `source` to `target` for `group`.
    ///
    /// "No route" is returned as [`RouteOutcome::NoRoute`]. An error means the
    /// group's table could not be built and no earlier table is available.
    pub fn route(&self, source: &str, target: &str, group: &RoutingGroup) -> Result<RouteOutcome> {
        let table = self.table_for(group)?;
        Ok(route_in(&table, source, target))
    }

    /// Routes for a vehicle, classified into its group by `mapper`.
    pub fn route_for_vehicle(
        &self,
        mapper: &dyn GroupMapper,
        vehicle: &Vehicle,
        source: &str,
        target: &str,
    ) -> Result<RouteOutcome> {
        let group = mapper.classify(vehicle);
        self.route(source, target, &group)
    }

    /// Routes from `source` through each destination in order.
    ///
    /// All legs are computed from the same table snapshot. With no
    /// destinations the result is the empty route at `source`.
    pub fn route_through(&self, source: &str, destinations: &[&str], group: &RoutingGroup) -> Result<RouteOutcome> {
        let table = self.table_for(group)?;

        let mut route = match route_in(&table, source, source) {
            RouteOutcome::Found(route) => route,
            no_route => return Ok(no_route),
        };
        for destination in destinations {
            let leg_source = route.target.clone();
            match route_in(&table, &leg_source, destination) {
                RouteOutcome::Found(leg) => route = route.concat(leg),
                no_route => return Ok(no_route),
            }
        }
        Ok(RouteOutcome::Found(route))
    }

    /// Cost of the cheapest route, or `None` if there is none.
    pub fn costs(&self, source: &str, target: &str, group: &RoutingGroup) -> Result<Option<f64>> {
        let table = self.table_for(group)?;
        let graph = table.graph();
        let (Some(s), Some(t)) = (graph.vertex_index(source), graph.vertex_index(target)) else {
            return Ok(None);
        };
        let cost = table.cost(s, t);
        Ok((cost != f64::INFINITY).then_some(cost))
    }

    /// Whether `source` followed by `destinations` can be travelled in order.
    pub fn check_routability(
        &self,
        source: &str,
        destinations: &[&str],
        group: &RoutingGroup,
    ) -> Result<Routability> {
        Ok(match self.route_through(source, destinations, group)? {
            RouteOutcome::Found(_) => Routability::yes(),
            RouteOutcome::NoRoute(no_route) => Routability::no(no_route.to_string()),
        })
    }

    /// Builds tables for `groups` now instead of on first query.
    pub fn prebuild(&self, groups: &[RoutingGroup]) -> Result<()> {
        for group in groups {
            self.table_for(group)?;
        }
        Ok(())
    }

    /// Marks every cached table stale. The next query per group rebuilds.
    pub fn invalidate(&self) {
        let slots = self.slots.read();
        for slot in slots.values() {
            slot.invalidate();
        }
        info!(groups = slots.len(), "invalidated all routing tables");
        drop(slots);

        self.build_eager_groups();
    }

    /// Marks the cached table of one group stale.
    pub fn invalidate_group(&self, group: &RoutingGroup) {
        if let Some(slot) = self.slots.read().get(group) {
            slot.invalidate();
            info!(group = %group, "invalidated routing table");
        }

        if self.eager_groups.contains(group) {
            self.build_eager_groups();
        }
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            table_builds: self.builds.load(Ordering::Relaxed),
            build_failures: self.failures.load(Ordering::Relaxed),
            cached_groups: self.slots.read().len(),
        }
    }

    /// The valid table for `group`, building it if needed.
    ///
    /// If the build fails, the last successfully built table is returned
    /// instead, when there is one.
    pub fn table_for(&self, group: &RoutingGroup) -> Result<Arc<RoutingTable>> {
        let ttl = self.policy.ttl_secs.map(Duration::from_secs);
        let slot = self.slot(group);

        if let Some(table) = slot.current(ttl) {
            trace!(group = %group, "routing table cache hit");
            return Ok(table);
        }

        let _build = slot.build_lock.lock();
        if let Some(table) = slot.current(ttl) {
            trace!(group = %group, "routing table built by concurrent caller");
            return Ok(table);
        }

        let generation = slot.generation.load(Ordering::Acquire);
        {
            let published = slot.published.read();
            if published.attempted == Some(generation) {
                if let Some(err) = &published.failure {
                    return fallback(group, published.table.clone(), err.clone());
                }
            }
        }

        debug!(group = %group, generation, "routing table cache miss");
        match self.build_table(group) {
            Ok(table) => {
                let table = Arc::new(table);
                let mut published = slot.published.write();
                published.table = Some(table.clone());
                published.built_at = Some(Instant::now());
                published.attempted = Some(generation);
                published.failure = None;
                self.builds.fetch_add(1, Ordering::Relaxed);
                Ok(table)
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                error!(group = %group, error = %err, "routing table build failed");
                let mut published = slot.published.write();
                published.attempted = Some(generation);
                published.failure = Some(err.clone());
                fallback(group, published.table.clone(), err)
            }
        }
    }

    fn build_table(&self, group: &RoutingGroup) -> Result<RoutingTable> {
        let started = Instant::now();
        let graph = GraphBuilder::new(&self.pipeline).build(self.plant.points(), self.plant.paths(), group)?;
        let table = self.algorithm.build_table(Arc::new(graph))?;
        debug!(
            group = %group,
            algorithm = self.algorithm.name(),
            vertices = table.graph().vertex_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built routing table"
        );
        Ok(table)
    }

    /// The slot for `group`, created on first use and marked as just accessed.
    ///
    /// Only slots nobody else holds are evicted, so a group being built or
    /// waited on keeps its slot. The map may exceed `max_groups` while every
    /// slot is in use.
    fn slot(&self, group: &RoutingGroup) -> Arc<GroupSlot> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);

        if let Some(slot) = self.slots.read().get(group) {
            slot.last_access.store(tick, Ordering::Relaxed);
            return slot.clone();
        }

        let mut slots = self.slots.write();
        if let Some(slot) = slots.get(group) {
            slot.last_access.store(tick, Ordering::Relaxed);
            return slot.clone();
        }

        if let Some(max_groups) = self.policy.max_groups {
            while slots.len() >= max_groups {
                let idle = slots
                    .iter()
                    .filter(|(_, slot)| Arc::strong_count(slot) == 1)
                    .min_by_key(|(_, slot)| slot.last_access.load(Ordering::Relaxed))
                    .map(|(group, _)| group.clone());
                match idle {
                    Some(evicted) => {
                        slots.remove(&evicted);
                        debug!(group = %evicted, "evicted routing table");
                    }
                    None => {
                        debug!(groups = slots.len(), max_groups, "all routing tables in use, not evicting");
                        break;
                    }
                }
            }
        }

        let slot = Arc::new(GroupSlot::default());
        slot.last_access.store(tick, Ordering::Relaxed);
        slots.insert(group.clone(), slot.clone());
        slot
    }

    fn build_eager_groups(&self) {
        for group in &self.eager_groups {
            if let Err(err) = self.table_for(group) {
                warn!(group = %group, error = %err, "eager routing table build failed");
            }
        }
    }
}

fn fallback(
    group: &RoutingGroup,
    stale: Option<Arc<RoutingTable>>,
    err: RoutingError,
) -> Result<Arc<RoutingTable>> {
    match stale {
        Some(table) => {
            warn!(group = %group, error = %err, "serving stale routing table");
            Ok(table)
        }
        None => Err(err),
    }
}

/// Reconstructs a route from a table.
fn route_in(table: &RoutingTable, source: &str, target: &str) -> RouteOutcome {
    let graph = table.graph();
    let no_route = |reason: NoRouteReason| {
        RouteOutcome::NoRoute(NoRouteFound {
            source: source.to_string(),
            target: target.to_string(),
            group: table.group().clone(),
            reason,
        })
    };

    let Some(s) = graph.vertex_index(source) else {
        return no_route(NoRouteReason::UnknownPoint(source.to_string()));
    };
    let Some(t) = graph.vertex_index(target) else {
        return no_route(NoRouteReason::UnknownPoint(target.to_string()));
    };

    match table.path(s, t) {
        Some(edges) => {
            let (steps, costs): (Vec<_>, Vec<_>) = edges
                .iter()
                .map(|index| {
                    let weighted = graph.edge(*index);
                    (weighted.edge.clone(), weighted.cost)
                })
                .unzip();
            RouteOutcome::Found(Route::new(source, target, table.group().clone(), steps, costs))
        }
        None if graph.physically_reachable(s, t) => no_route(NoRouteReason::AllPathsVetoed),
        None => no_route(NoRouteReason::TargetUnreachable),
    }
}
