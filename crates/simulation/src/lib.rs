use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod config;
pub mod motion;
pub mod rail_grid;
pub mod rail_grid_save;
pub mod rail_params;
pub mod rail_topology;
pub mod track_builder;
pub mod track_catalog;
pub mod track_shapes;
pub mod vehicles;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

use config::DEFAULT_TIMESTEP_HZ;
use rail_grid::RailGrid;
use rail_params::RailParams;
use track_builder::BuildTrackEvent;
use track_catalog::TrackCatalog;
use vehicles::RailVehicleEvent;

// ---------------------------------------------------------------------------
// Saveable trait + registry for the extension map save pattern
// ---------------------------------------------------------------------------

/// A resource persisted through the save file's extension map.
///
/// The save crate never names rail resources directly: it walks the
/// [`SaveableRegistry`], so a new persisted resource only needs an impl and a
/// `register` call in its plugin.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Key in the extension map. Must stay stable across versions.
    const SAVE_KEY: &'static str;

    /// `None` skips the entry, e.g. for an empty grid.
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode bytes via `bitcode::decode`, logging a warning and returning `Default` on failure.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Saveable {}: failed to decode {} bytes, falling back to default: {}",
                key,
                bytes.len(),
                e
            );
            T::default()
        }
    }
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;
pub type ResetFn = Box<dyn Fn(&mut World) + Send + Sync>;

/// Type-erased save/load/reset operations for one registered resource.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
    pub reset_fn: ResetFn,
}

#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Register `T`. A second registration under the same key is ignored
    /// (and trips a debug assertion).
    pub fn register<T: Saveable>(&mut self) {
        let key = T::SAVE_KEY.to_string();
        if self.entries.iter().any(|e| e.key == key) {
            warn!(
                "SaveableRegistry: duplicate key '{}', ignoring second registration",
                key
            );
            debug_assert!(false, "SaveableRegistry: duplicate key '{}'", key);
            return;
        }
        self.entries.push(SaveableEntry {
            key,
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                world.insert_resource(T::load_from_bytes(bytes));
            }),
            reset_fn: Box::new(|world: &mut World| {
                world.insert_resource(T::default());
            }),
        });
    }

    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        let mut extensions = BTreeMap::new();
        for entry in &self.entries {
            if let Some(bytes) = (entry.save_fn)(world) {
                extensions.insert(entry.key.clone(), bytes);
            }
        }
        extensions
    }

    /// Keys absent from `extensions` are reset to their defaults, so a save
    /// made with an empty grid loads as an empty grid.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            match extensions.get(&entry.key) {
                Some(bytes) => (entry.load_fn)(world, bytes),
                None => (entry.reset_fn)(world),
            }
        }
    }

    pub fn reset_all(&self, world: &mut World) {
        for entry in &self.entries {
            (entry.reset_fn)(world);
        }
    }
}

// ---------------------------------------------------------------------------
// Core resources and ordering
// ---------------------------------------------------------------------------

/// Fixed ticks run since startup.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Phases of the rail `FixedUpdate`, chained `Build` -> `Motion`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RailSet {
    /// Tick counter, track edits, catalog rebuilds.
    Build,
    /// Attach scans, then advancing attached vehicles.
    Motion,
}

pub struct RailSimulationPlugin;

impl Plugin for RailSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(DEFAULT_TIMESTEP_HZ))
            .init_resource::<TickCounter>()
            .init_resource::<RailParams>()
            .init_resource::<RailGrid>()
            .init_resource::<TrackCatalog>()
            .add_event::<RailVehicleEvent>()
            .add_event::<BuildTrackEvent>()
            .configure_sets(FixedUpdate, (RailSet::Build, RailSet::Motion).chain())
            .add_systems(
                FixedUpdate,
                (
                    tick_counter,
                    track_builder::apply_build_events,
                    track_catalog::rebuild_catalog.run_if(resource_changed::<RailParams>),
                )
                    .chain()
                    .in_set(RailSet::Build),
            )
            .add_systems(
                FixedUpdate,
                (motion::attach_vehicles, motion::advance_vehicles)
                    .chain()
                    .in_set(RailSet::Motion),
            );

        app.init_resource::<SaveableRegistry>();
        let mut registry = app.world_mut().resource_mut::<SaveableRegistry>();
        registry.register::<RailParams>();
        registry.register::<RailGrid>();
    }
}

pub fn tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

#[cfg(test)]
mod saveable_tests {
    use super::*;

    #[derive(Resource, Default, Debug, PartialEq)]
    struct TestCounter {
        value: u32,
    }

    impl Saveable for TestCounter {
        const SAVE_KEY: &'static str = "test_counter";

        fn save_to_bytes(&self) -> Option<Vec<u8>> {
            if self.value == 0 {
                None
            } else {
                Some(self.value.to_le_bytes().to_vec())
            }
        }

        fn load_from_bytes(bytes: &[u8]) -> Self {
            let value = u32::from_le_bytes(bytes.try_into().unwrap_or([0; 4]));
            TestCounter { value }
        }
    }

    #[test]
    fn test_registry_register_and_save() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 42 });

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();

        let extensions = registry.save_all(&world);
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions["test_counter"], 42u32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_registry_save_skips_default() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 0 });

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();

        assert!(registry.save_all(&world).is_empty(), "default state should be skipped");
    }

    #[test]
    fn test_registry_load_all() {
        let mut world = World::new();
        world.insert_resource(TestCounter::default());

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();

        let mut extensions = BTreeMap::new();
        extensions.insert("test_counter".to_string(), 99u32.to_le_bytes().to_vec());
        registry.load_all(&mut world, &extensions);

        assert_eq!(world.resource::<TestCounter>().value, 99);
    }

    #[test]
    fn test_registry_load_resets_missing_keys() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 5 });

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();

        let mut extensions = BTreeMap::new();
        extensions.insert("unknown_feature".to_string(), vec![0xFF, 0xFF]);
        registry.load_all(&mut world, &extensions);

        assert_eq!(world.resource::<TestCounter>().value, 0);
    }

    #[test]
    fn test_registry_reset_all() {
        let mut world = World::new();
        world.insert_resource(TestCounter { value: 999 });

        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();
        registry.reset_all(&mut world);

        assert_eq!(world.resource::<TestCounter>().value, 0);
    }

    #[test]
    #[should_panic(expected = "duplicate key")]
    fn test_registry_duplicate_key_panics_in_debug() {
        let mut registry = SaveableRegistry::default();
        registry.register::<TestCounter>();
        registry.register::<TestCounter>();
    }

    #[test]
    fn test_plugin_registers_rail_saveables() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(RailSimulationPlugin);
        let registry = app.world().resource::<SaveableRegistry>();
        let keys: Vec<&str> = registry.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["rail_params", "rail_grid"]);
    }
}
