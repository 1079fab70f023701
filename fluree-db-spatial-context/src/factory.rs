//! Spatial context factories.
//!
//! Resolving a [`ContextArgs`] map into a [`SpatialContext`] runs these
//! stages, in order, once each:
//!
//! 1. select the factory: `spatialContextFactory` in the args, else the
//!    caller-supplied fallback name, else [`DefaultContextFactory`]
//! 2. [`init_units`](SpatialContextFactory::init_units) (`units`)
//! 3. [`init_calculator`](SpatialContextFactory::init_calculator) (`distCalculator`)
//! 4. [`init_world_bounds`](SpatialContextFactory::init_world_bounds)
//!    (`worldBounds`, parsed by a bootstrap context)
//! 5. [`new_spatial_context`](SpatialContextFactory::new_spatial_context)
//!
//! Implementations override any of stages 2–5 and are registered by name in
//! a [`FactoryRegistry`]. The factory instance is consumed by
//! [`resolve_context`]; any stage error aborts resolution.

use crate::config::{ContextArgs, CALCULATOR_KEY, FACTORY_KEY, UNITS_KEY, WORLD_BOUNDS_KEY};
use crate::context::SpatialContext;
use crate::distance::{self, DistanceCalculator};
use crate::error::{Result, SpatialError};
use crate::shape::{Rectangle, Shape};
use crate::units::DistanceUnits;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Registry name of [`DefaultContextFactory`].
pub const DEFAULT_FACTORY: &str = "default";
/// Registry name of [`CartesianContextFactory`].
pub const CARTESIAN_FACTORY: &str = "cartesian";

/// Resolves configuration into a [`SpatialContext`], one stage per method.
pub trait SpatialContextFactory: fmt::Debug {
    /// Stage 2: distance units. Defaults to kilometers when unset.
    fn init_units(&self, args: &ContextArgs) -> Result<DistanceUnits> {
        match args.get(UNITS_KEY) {
            Some(name) => DistanceUnits::find(name),
            None => Ok(DistanceUnits::default()),
        }
    }

    /// Stage 3: distance calculator. Left unresolved when unset.
    fn init_calculator(
        &self,
        args: &ContextArgs,
        units: DistanceUnits,
    ) -> Result<Option<DistanceCalculator>> {
        distance::resolve(args.get(CALCULATOR_KEY), units)
    }

    /// Stage 4: world bounds, parsed with a bootstrap context built from
    /// the already-resolved units and calculator.
    fn init_world_bounds(
        &self,
        args: &ContextArgs,
        units: DistanceUnits,
        calculator: Option<DistanceCalculator>,
    ) -> Result<Option<Rectangle>> {
        let Some(literal) = args.get(WORLD_BOUNDS_KEY) else {
            return Ok(None);
        };
        let bootstrap = SpatialContext::bootstrap(units, calculator);
        let bounds = read_world_bounds(&bootstrap, literal)?;
        tracing::debug!(
            min_x = bounds.min_x,
            max_x = bounds.max_x,
            min_y = bounds.min_y,
            max_y = bounds.max_y,
            "Resolved world bounds"
        );
        Ok(Some(bounds))
    }

    /// Stage 5: build the final context.
    fn new_spatial_context(
        &self,
        units: DistanceUnits,
        calculator: Option<DistanceCalculator>,
        world_bounds: Option<Rectangle>,
    ) -> Result<SpatialContext> {
        SpatialContext::new(units, calculator, world_bounds)
    }
}

/// Parse a world bounds literal with a bootstrap context.
///
/// Fails with [`SpatialError::Config`] when the literal is a valid shape but
/// not a rectangle; malformed literals surface as
/// [`SpatialError::ShapeParse`].
pub fn read_world_bounds(bootstrap: &SpatialContext, literal: &str) -> Result<Rectangle> {
    match bootstrap.read_shape(literal)? {
        Shape::Rectangle(r) => Ok(r),
        other => Err(SpatialError::config(format!(
            "expected rectangle for {}, got {}: {}",
            WORLD_BOUNDS_KEY,
            other.kind(),
            literal
        ))),
    }
}

/// Factory with the stock resolution rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultContextFactory;

impl SpatialContextFactory for DefaultContextFactory {}

/// Factory for flat coordinate spaces: units and calculator default to
/// cartesian instead of kilometers / unresolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct CartesianContextFactory;

impl SpatialContextFactory for CartesianContextFactory {
    fn init_units(&self, args: &ContextArgs) -> Result<DistanceUnits> {
        match args.get(UNITS_KEY) {
            Some(name) => DistanceUnits::find(name),
            None => Ok(DistanceUnits::Cartesian),
        }
    }

    fn init_calculator(
        &self,
        args: &ContextArgs,
        units: DistanceUnits,
    ) -> Result<Option<DistanceCalculator>> {
        match args.get(CALCULATOR_KEY) {
            Some(name) => distance::resolve(Some(name), units),
            None => Ok(Some(DistanceCalculator::Cartesian { squared: false })),
        }
    }
}

/// Constructor for a registered factory.
pub type FactoryConstructor =
    Arc<dyn Fn() -> Result<Box<dyn SpatialContextFactory>> + Send + Sync>;

/// Name → factory constructor mapping.
#[derive(Clone)]
pub struct FactoryRegistry {
    constructors: FxHashMap<String, FactoryConstructor>,
}

impl FactoryRegistry {
    /// Registry with no factories. Resolution still falls back to
    /// [`DefaultContextFactory`] when no name is configured.
    pub fn empty() -> Self {
        Self {
            constructors: FxHashMap::default(),
        }
    }

    /// Register (or replace) a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Result<Box<dyn SpatialContextFactory>> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate the factory registered under `name`.
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn SpatialContextFactory>> {
        let constructor = self.constructors.get(name).ok_or_else(|| {
            SpatialError::config(format!("unknown spatial context factory: {}", name))
        })?;
        constructor().map_err(|e| {
            SpatialError::config(format!(
                "failed to create spatial context factory {}: {}",
                name, e
            ))
        })
    }

    /// Stage 1: pick the factory for `args`, consulting `fallback` only when
    /// the args don't name one.
    pub fn select(
        &self,
        args: &ContextArgs,
        fallback: Option<&str>,
    ) -> Result<Box<dyn SpatialContextFactory>> {
        match args.get(FACTORY_KEY).or(fallback) {
            Some(name) => {
                tracing::debug!(factory = name, "Using configured spatial context factory");
                self.instantiate(name)
            }
            None => Ok(Box::new(DefaultContextFactory)),
        }
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(DEFAULT_FACTORY, || Ok(Box::new(DefaultContextFactory)));
        registry.register(CARTESIAN_FACTORY, || Ok(Box::new(CartesianContextFactory)));
        registry
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Run stages 2–5 of `factory` over `args`, consuming the factory.
pub fn resolve_context(
    factory: Box<dyn SpatialContextFactory>,
    args: &ContextArgs,
) -> Result<SpatialContext> {
    let units = factory.init_units(args)?;
    let calculator = factory.init_calculator(args, units)?;
    let world_bounds = factory.init_world_bounds(args, units, calculator)?;
    factory.new_spatial_context(units, calculator, world_bounds)
}

/// Resolve `args` into a spatial context.
///
/// `fallback_factory` stands in for the process-wide factory override; see
/// [`factory_override_from_env`](crate::config::factory_override_from_env).
pub fn make_spatial_context(
    args: &ContextArgs,
    registry: &FactoryRegistry,
    fallback_factory: Option<&str>,
) -> Result<SpatialContext> {
    let factory = registry.select(args, fallback_factory)?;
    resolve_context(factory, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::EARTH_MEAN_RADIUS_MI;
    use std::sync::Mutex;

    fn args(pairs: &[(&str, &str)]) -> ContextArgs {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_args() {
        let ctx = make_spatial_context(&ContextArgs::new(), &FactoryRegistry::default(), None)
            .unwrap();
        assert_eq!(ctx.units(), DistanceUnits::Kilometers);
        assert_eq!(ctx.calculator(), None);
        assert_eq!(ctx.world_bounds(), None);
    }

    #[test]
    fn test_full_args() {
        let args = args(&[
            ("units", "MILES"),
            ("distCalculator", "Haversine"),
            ("worldBounds", "-180 -90 180 90"),
        ]);
        let ctx = make_spatial_context(&args, &FactoryRegistry::default(), None).unwrap();

        assert_eq!(ctx.units(), DistanceUnits::Miles);
        assert_eq!(
            ctx.calculator(),
            Some(DistanceCalculator::Haversine {
                radius: EARTH_MEAN_RADIUS_MI
            })
        );
        assert_eq!(
            ctx.world_bounds(),
            Some(&Rectangle::new(-180.0, 180.0, -90.0, 90.0).unwrap())
        );
    }

    #[test]
    fn test_unknown_units_and_calculator() {
        let registry = FactoryRegistry::default();
        let err = make_spatial_context(&args(&[("units", "parsecs")]), &registry, None).unwrap_err();
        assert!(matches!(err, SpatialError::Config(_)));

        let err = make_spatial_context(&args(&[("distCalculator", "euclid")]), &registry, None)
            .unwrap_err();
        assert!(matches!(err, SpatialError::Config(_)));
    }

    #[test]
    fn test_world_bounds_must_be_rectangle() {
        let registry = FactoryRegistry::default();
        let err = make_spatial_context(&args(&[("worldBounds", "10 20")]), &registry, None)
            .unwrap_err();
        assert!(
            matches!(&err, SpatialError::Config(msg) if msg.contains("expected rectangle")),
            "unexpected error: {}",
            err
        );

        let err = make_spatial_context(&args(&[("worldBounds", "10 20 30")]), &registry, None)
            .unwrap_err();
        assert!(matches!(err, SpatialError::ShapeParse(_)));
    }

    #[test]
    fn test_unknown_factory_name() {
        let registry = FactoryRegistry::default();
        let err = make_spatial_context(
            &args(&[("spatialContextFactory", "com.example.Missing")]),
            &registry,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SpatialError::Config(_)));

        // fallback is only consulted when the args are silent
        let err = make_spatial_context(&ContextArgs::new(), &registry, Some("nope")).unwrap_err();
        assert!(matches!(err, SpatialError::Config(_)));
    }

    #[test]
    fn test_factory_selection_precedence() {
        let registry = FactoryRegistry::default();

        let ctx = make_spatial_context(&ContextArgs::new(), &registry, Some(CARTESIAN_FACTORY))
            .unwrap();
        assert_eq!(ctx.units(), DistanceUnits::Cartesian);

        let ctx = make_spatial_context(
            &args(&[("spatialContextFactory", DEFAULT_FACTORY)]),
            &registry,
            Some(CARTESIAN_FACTORY),
        )
        .unwrap();
        assert_eq!(ctx.units(), DistanceUnits::Kilometers);
    }

    #[test]
    fn test_cartesian_factory_defaults() {
        let ctx = make_spatial_context(
            &args(&[
                ("spatialContextFactory", "cartesian"),
                ("worldBounds", "0 0 1000 500"),
            ]),
            &FactoryRegistry::default(),
            None,
        )
        .unwrap();
        assert_eq!(ctx.units(), DistanceUnits::Cartesian);
        assert_eq!(
            ctx.calculator(),
            Some(DistanceCalculator::Cartesian { squared: false })
        );
        assert_eq!(ctx.world_bounds().map(|b| b.width()), Some(1000.0));
    }

    #[test]
    fn test_failing_constructor_is_wrapped() {
        let mut registry = FactoryRegistry::empty();
        registry.register("broken", || Err(SpatialError::unsupported("no such plugin")));

        let err = registry.instantiate("broken").unwrap_err();
        let SpatialError::Config(msg) = err else {
            panic!("expected config error");
        };
        assert!(msg.contains("broken"));
        assert!(msg.contains("no such plugin"));
    }

    #[derive(Debug)]
    struct RecordingFactory {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RecordingFactory {
        fn record(&self, stage: &'static str) {
            self.calls.lock().unwrap().push(stage);
        }
    }

    impl SpatialContextFactory for RecordingFactory {
        fn init_units(&self, args: &ContextArgs) -> Result<DistanceUnits> {
            self.record("units");
            DefaultContextFactory.init_units(args)
        }

        fn init_calculator(
            &self,
            args: &ContextArgs,
            units: DistanceUnits,
        ) -> Result<Option<DistanceCalculator>> {
            self.record("calculator");
            DefaultContextFactory.init_calculator(args, units)
        }

        fn init_world_bounds(
            &self,
            args: &ContextArgs,
            units: DistanceUnits,
            calculator: Option<DistanceCalculator>,
        ) -> Result<Option<Rectangle>> {
            self.record("bounds");
            // bootstrap sees the calculator resolved in the previous stage
            assert_eq!(calculator, Some(DistanceCalculator::Cartesian { squared: true }));
            DefaultContextFactory.init_world_bounds(args, units, calculator)
        }

        fn new_spatial_context(
            &self,
            units: DistanceUnits,
            calculator: Option<DistanceCalculator>,
            world_bounds: Option<Rectangle>,
        ) -> Result<SpatialContext> {
            self.record("finalize");
            SpatialContext::new(units, calculator, world_bounds)
        }
    }

    #[test]
    fn test_custom_factory_stage_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = FactoryRegistry::default();
        let shared = Arc::clone(&calls);
        registry.register("recording", move || {
            Ok(Box::new(RecordingFactory {
                calls: Arc::clone(&shared),
            }))
        });

        let ctx = make_spatial_context(
            &args(&[
                ("units", "u"),
                ("distCalculator", "cartesian^2"),
                ("worldBounds", "ENVELOPE(0, 10, 10, 0)"),
            ]),
            &registry,
            Some("recording"),
        )
        .unwrap();

        assert_eq!(ctx.units(), DistanceUnits::Cartesian);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["units", "calculator", "bounds", "finalize"]
        );
    }

    #[test]
    fn test_failure_aborts_later_stages() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let factory = Box::new(RecordingFactory {
            calls: Arc::clone(&calls),
        });
        let err = resolve_context(factory, &args(&[("distCalculator", "bogus")])).unwrap_err();
        assert!(matches!(err, SpatialError::Config(_)));
        assert_eq!(*calls.lock().unwrap(), vec!["units", "calculator"]);
    }

    #[test]
    fn test_registry_names() {
        assert_eq!(
            FactoryRegistry::default().names(),
            vec![CARTESIAN_FACTORY, DEFAULT_FACTORY]
        );
        assert!(FactoryRegistry::empty().names().is_empty());
    }
}
