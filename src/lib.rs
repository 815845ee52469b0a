//! choropleth_rs
//!
//! Join tabular values to nested French administrative boundaries and render
//! them as a choropleth. Pairs with the `choro` CLI.
//!
//! ### Features
//! - Quantized color scales (linear or divergent, 3 to 30 buckets)
//! - Seven boundary levels from regions down to IRIS, four drillable at a time
//! - Autofit: zoom and pan onto the matched region, pull in nearby empty shapes
//! - Click, ctrl-click and context-menu selection against a host selection service
//! - Legend with nice ticks, space-grouped tooltips
//! - SVG/PNG output via plotters
//!
//! ### Example
//! ```no_run
//! use choropleth_rs::{DataRow, LocalSelectionManager, UpdateOptions, Viewport, Visual};
//!
//! let geometry = choropleth_rs::storage::load_geometry_dir("maps", "nom")?;
//! let mut visual = Visual::new(geometry, LocalSelectionManager::new());
//! let frame = visual.update(UpdateOptions {
//!     rows: Some(vec![DataRow::new("Bretagne", 12.0), DataRow::new("Normandie", 30.0)]),
//!     objects: serde_json::json!({}),
//!     drill_level: 0,
//!     viewport: Viewport::new(900.0, 600.0),
//! });
//! choropleth_rs::viz::render_frame(&frame, "regions.svg", 900, 600)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod autofit;
pub mod builder;
pub mod color;
pub mod geometry;
pub mod legend;
pub mod models;
pub mod selection;
pub mod settings;
pub mod storage;
pub mod tooltip;
pub mod visual;
pub mod viz;

pub use color::{ColorScale, Rgb, ValueDomain};
pub use geometry::{GeometryCollection, GeometryProvider, InMemoryGeometry};
pub use models::{BoundaryLevel, DataModel, DataPoint, DataRow, SelectionId};
pub use selection::{Interaction, LocalSelectionManager, SelectionAuthority, SelectionState};
pub use settings::VisualSettings;
pub use visual::{Frame, UpdateOptions, Viewport, Visual};
